use async_trait::async_trait;
use chrono::Utc;
use schemars::JsonSchema;
use serde::Deserialize;

use crate::core::error::Result;
use crate::tools::TypedTool;

#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct CurrentTimeInput {
    /// Optional strftime pattern, e.g. "%Y-%m-%d". Defaults to RFC 3339.
    #[serde(default)]
    pub format: Option<String>,
}

pub struct CurrentTimeTool;

impl CurrentTimeTool {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Default for CurrentTimeTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TypedTool for CurrentTimeTool {
    type Input = CurrentTimeInput;

    fn name(&self) -> &'static str {
        "current_time"
    }

    fn description(&self) -> &'static str {
        "Return the current UTC date and time. Pass {} for RFC 3339, or {\"format\": \"%Y-%m-%d\"} for a custom strftime pattern."
    }

    async fn execute_typed(&self, input: Self::Input) -> Result<String> {
        let now = Utc::now();
        Ok(match input.format.as_deref() {
            Some(pattern) if !pattern.is_empty() => {
                use std::fmt::Write as _;

                let mut out = String::new();
                // chrono reports unknown specifiers as fmt::Error
                if write!(out, "{}", now.format(pattern)).is_err() {
                    return Err(crate::core::error::AgentError::InvalidToolInput {
                        tool: "current_time".to_string(),
                        reason: format!("invalid format pattern '{pattern}'"),
                    });
                }
                out
            }
            _ => now.to_rfc3339(),
        })
    }
}
