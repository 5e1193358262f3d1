use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::{AgentError, ErrorInfo};

/// Tool name a step uses to answer directly without touching the registry.
pub const RESPOND_TOOL: &str = "respond";

pub type StepError = ErrorInfo;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Objective(String);

impl Objective {
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl std::fmt::Display for Objective {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Objective {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Objective {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_input: Option<serde_json::Value>,
}

impl Step {
    #[must_use]
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            tool_name: None,
            tool_input: None,
        }
    }

    #[must_use]
    pub fn tool(
        description: impl Into<String>,
        tool_name: impl Into<String>,
        tool_input: serde_json::Value,
    ) -> Self {
        Self {
            description: description.into(),
            tool_name: Some(tool_name.into()),
            tool_input: Some(tool_input),
        }
    }

    #[must_use]
    pub fn respond(description: impl Into<String>, answer: impl Into<String>) -> Self {
        Self::tool(
            description,
            RESPOND_TOOL,
            serde_json::Value::String(answer.into()),
        )
    }

    /// True when the step is answered directly rather than dispatched to a tool.
    #[must_use]
    pub fn is_respond(&self) -> bool {
        self.tool_name.as_deref().is_none_or(|name| name == RESPOND_TOOL)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Plan {
    Steps { steps: Vec<Step> },
    Terminal { final_answer: String },
}

impl Plan {
    #[must_use]
    pub const fn steps(steps: Vec<Step>) -> Self {
        Self::Steps { steps }
    }

    #[must_use]
    pub fn terminal(final_answer: impl Into<String>) -> Self {
        Self::Terminal {
            final_answer: final_answer.into(),
        }
    }

    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Terminal { .. })
    }

    #[must_use]
    pub fn step_list(&self) -> &[Step] {
        match self {
            Self::Steps { steps } => steps,
            Self::Terminal { .. } => &[],
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.step_list().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.step_list().is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepResult {
    pub step: Step,
    pub output: serde_json::Value,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<StepError>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl StepResult {
    #[must_use]
    pub fn success(step: Step, output: serde_json::Value, started_at: DateTime<Utc>) -> Self {
        Self {
            step,
            output,
            success: true,
            error: None,
            started_at,
            finished_at: Utc::now(),
        }
    }

    #[must_use]
    pub fn failure(step: Step, error: &AgentError, started_at: DateTime<Utc>) -> Self {
        Self {
            step,
            output: serde_json::Value::Null,
            success: false,
            error: Some(StepError::from(error)),
            started_at,
            finished_at: Utc::now(),
        }
    }

    /// Output rendered as plain text: strings verbatim, everything else as JSON.
    #[must_use]
    pub fn output_text(&self) -> String {
        match &self.output {
            serde_json::Value::String(s) => s.clone(),
            serde_json::Value::Null => String::new(),
            other => other.to_string(),
        }
    }
}

/// Everything one run knows about itself. Owned by a single run, never shared.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentState {
    pub run_id: Uuid,
    pub objective: Objective,
    pub plan: Option<Plan>,
    history: Vec<StepResult>,
    iteration_count: usize,
}

impl AgentState {
    #[must_use]
    pub fn new(objective: Objective) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            objective,
            plan: None,
            history: Vec::new(),
            iteration_count: 0,
        }
    }

    /// Appends an executed step and advances the iteration counter.
    pub fn record(&mut self, result: StepResult) {
        self.history.push(result);
        self.iteration_count += 1;
    }

    #[must_use]
    pub fn history(&self) -> &[StepResult] {
        &self.history
    }

    #[must_use]
    pub const fn iteration_count(&self) -> usize {
        self.iteration_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_objective_blank_is_empty() {
        assert!(Objective::new("   \n").is_empty());
        assert!(!Objective::new("2+2?").is_empty());
    }

    #[test]
    fn test_step_respond_detection() {
        assert!(Step::new("think").is_respond());
        assert!(Step::respond("answer", "4").is_respond());
        assert!(!Step::tool("add", "calculator", json!("2+2")).is_respond());
    }

    #[test]
    fn test_plan_serialization_shape() {
        let plan = Plan::steps(vec![Step::tool("add", "calculator", json!("2+2"))]);
        let value = serde_json::to_value(&plan).unwrap();
        assert_eq!(value["kind"], "steps");
        assert_eq!(value["steps"][0]["tool_name"], "calculator");

        let terminal = Plan::terminal("4");
        assert!(terminal.is_terminal());
        assert!(terminal.is_empty());
        assert_eq!(serde_json::to_value(&terminal).unwrap()["final_answer"], "4");
    }

    #[test]
    fn test_state_record_is_append_only_and_counts() {
        let mut state = AgentState::new(Objective::new("goal"));
        assert_eq!(state.iteration_count(), 0);

        let first = StepResult::success(Step::new("one"), json!("a"), Utc::now());
        let second = StepResult::failure(
            Step::new("two"),
            &AgentError::UnknownTool("nope".into()),
            Utc::now(),
        );
        state.record(first);
        state.record(second);

        assert_eq!(state.iteration_count(), 2);
        assert_eq!(state.history().len(), 2);
        assert_eq!(state.history()[0].step.description, "one");
        assert!(!state.history()[1].success);
        assert_eq!(
            state.history()[1].error.as_ref().map(|e| e.kind),
            Some(crate::core::ErrorKind::UnknownTool)
        );
    }

    #[test]
    fn test_output_text() {
        let text = StepResult::success(Step::new("s"), json!("4"), Utc::now());
        assert_eq!(text.output_text(), "4");

        let structured = StepResult::success(Step::new("s"), json!({"a": 1}), Utc::now());
        assert_eq!(structured.output_text(), r#"{"a":1}"#);
    }
}
