use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use serde_json::Value;

use crate::core::error::{AgentError, Result};
use crate::core::step::{Plan, RESPOND_TOOL, Step};
use crate::tools::ToolRegistry;

// Only a fence wrapping the whole response; fences inside string values are content.
static SURROUNDING_FENCE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?s)\A```[A-Za-z0-9_-]*[ \t]*\r?\n?(.*)```\z").ok());

#[derive(Debug, Deserialize)]
struct RawPlan {
    #[serde(default)]
    steps: Option<Vec<RawStep>>,
    #[serde(default)]
    final_answer: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct RawStep {
    description: String,
    #[serde(default, alias = "tool")]
    tool_name: Option<String>,
    #[serde(default, alias = "input")]
    tool_input: Option<Value>,
}

/// Parses raw backend output into a [`Plan`], failing with `Planning` on anything malformed.
pub fn parse_plan(text: &str, tools: &ToolRegistry) -> Result<Plan> {
    let body = extract_json_object(text)?;
    let raw: RawPlan = serde_json::from_str(body)
        .map_err(|e| AgentError::Planning(format!("Planner output is not a valid plan: {e}")))?;

    let steps = raw.steps.unwrap_or_default();
    let final_answer = raw.final_answer.filter(|v| !v.is_null());

    match (final_answer, steps.is_empty()) {
        (Some(_), false) => Err(AgentError::Planning(
            "Planner output contains both steps and a final answer".to_string(),
        )),
        (Some(answer), true) => Ok(Plan::terminal(answer_text(answer))),
        (None, true) => Err(AgentError::Planning(
            "Planner output contains neither steps nor a final answer".to_string(),
        )),
        (None, false) => steps
            .into_iter()
            .enumerate()
            .map(|(index, raw)| convert_step(index, raw, tools))
            .collect::<Result<Vec<_>>>()
            .map(Plan::steps),
    }
}

fn convert_step(index: usize, raw: RawStep, tools: &ToolRegistry) -> Result<Step> {
    if raw.description.trim().is_empty() {
        return Err(AgentError::Planning(format!(
            "Step {} has an empty description",
            index + 1
        )));
    }

    let tool_name = raw
        .tool_name
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty());

    if let Some(name) = tool_name.as_deref()
        && name != RESPOND_TOOL
        && !tools.contains(name)
    {
        return Err(AgentError::Planning(format!(
            "Step {} names unknown tool '{name}'",
            index + 1
        )));
    }

    Ok(Step {
        description: raw.description,
        tool_name,
        tool_input: raw.tool_input,
    })
}

fn answer_text(answer: Value) -> String {
    match answer {
        Value::String(text) => text,
        other => other.to_string(),
    }
}

/// Returns the JSON object in `text`: the whole response when it already is one,
/// otherwise the outermost `{...}` span after stripping a surrounding code fence.
fn extract_json_object(text: &str) -> Result<&str> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(AgentError::Planning(
            "Planner returned an empty response".to_string(),
        ));
    }

    if serde_json::from_str::<Value>(trimmed).is_ok_and(|value| value.is_object()) {
        return Ok(trimmed);
    }

    let inner = SURROUNDING_FENCE
        .as_ref()
        .and_then(|re| re.captures(trimmed))
        .and_then(|caps| caps.get(1))
        .map_or(trimmed, |m| m.as_str().trim());

    match (inner.find('{'), inner.rfind('}')) {
        (Some(start), Some(end)) if start < end => Ok(&inner[start..=end]),
        _ => Err(AgentError::Planning(
            "Planner output does not contain a JSON object".to_string(),
        )),
    }
}
