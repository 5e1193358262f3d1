use crate::core::step::{Objective, RESPOND_TOOL, StepResult};
use crate::tools::ToolRegistry;

pub const PLANNER_TEMPLATE: &str = r#"You are the planning component of a plan-and-execute agent.

Break the objective into an ordered list of concrete steps. Each step either calls one of the available tools or uses the "respond" tool to answer directly. Steps run one at a time, in order, and their results are shown to you the next time you plan.

# Output format
Reply with exactly one JSON object and nothing else.

To continue working, reply with:
{"steps": [{"description": "what this step does", "tool_name": "<tool>", "tool_input": <input matching the tool's schema>}]}

When the results so far fully satisfy the objective, reply with:
{"final_answer": "the answer for the user"}

# Rules
- Only use tool names listed below, or "respond".
- A "respond" step's tool_input is the text of the answer.
- Never contradict a result that has already been recorded. If a step failed, plan around the failure instead of repeating it unchanged.
- Keep plans short. Prefer one step when one step is enough."#;

const MAX_RESULT_CHARS: usize = 2000;

/// Renders the planner request from the objective, tool table and execution history.
pub struct PlanPrompt<'a> {
    objective: &'a Objective,
    history: &'a [StepResult],
    tools: &'a ToolRegistry,
}

impl<'a> PlanPrompt<'a> {
    #[must_use]
    pub const fn new(
        objective: &'a Objective,
        history: &'a [StepResult],
        tools: &'a ToolRegistry,
    ) -> Self {
        Self {
            objective,
            history,
            tools,
        }
    }

    #[must_use]
    pub fn system(&self) -> &'static str {
        PLANNER_TEMPLATE
    }

    #[must_use]
    pub fn build(&self) -> String {
        let mut prompt = String::new();

        prompt.push_str("<tools>\n");
        for spec in self.tools.specs() {
            prompt.push_str(&format!(
                "- {}: {}\n  input schema: {}\n",
                spec.name, spec.description, spec.input_schema
            ));
        }
        prompt.push_str(&format!(
            "- {RESPOND_TOOL}: Answer directly without a tool.\n  input schema: {{\"type\": \"string\"}}\n"
        ));
        prompt.push_str("</tools>\n\n");

        prompt.push_str("<objective>\n");
        prompt.push_str(self.objective.as_str());
        prompt.push_str("\n</objective>\n");

        if self.history.is_empty() {
            prompt.push_str("\nNo steps have been executed yet. Produce the initial plan.\n");
        } else {
            prompt.push_str("\n<history>\n");
            for (index, result) in self.history.iter().enumerate() {
                prompt.push_str(&format_result(index + 1, result));
            }
            prompt.push_str("</history>\n\n");
            prompt.push_str(
                "Revise the plan for the remaining work, or give the final answer if the objective is satisfied.\n",
            );
        }

        prompt
    }
}

fn format_result(number: usize, result: &StepResult) -> String {
    let tool = result.step.tool_name.as_deref().unwrap_or(RESPOND_TOOL);
    let input = result
        .step
        .tool_input
        .as_ref()
        .map_or_else(|| "none".to_string(), ToString::to_string);

    let outcome = match &result.error {
        Some(error) => format!("FAILED ({}): {}", error.kind, error.message),
        None => format!("OK: {}", clip(&result.output_text(), MAX_RESULT_CHARS)),
    };

    format!(
        "{number}. {}\n   tool: {tool}\n   input: {input}\n   result: {outcome}\n",
        result.step.description
    )
}

fn clip(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let head: String = text.chars().take(max_chars).collect();
        format!("{head}... [clipped]")
    }
}
