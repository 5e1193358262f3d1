use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;

use crate::core::error::{AgentError, Result};
use crate::core::llm::LLM;
use crate::core::step::{RESPOND_TOOL, Step, StepResult};
use crate::tools::ToolRegistry;

#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    pub max_output_size: usize,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            max_output_size: 64 * 1024,
        }
    }
}

impl ExecutorConfig {
    #[must_use]
    pub fn truncate_output(&self, output: String) -> (String, bool) {
        if output.len() > self.max_output_size {
            let mut cut = self.max_output_size;
            while !output.is_char_boundary(cut) {
                cut -= 1;
            }
            let message = format!(
                "\n\n[Output truncated: {} bytes total, showing first {} bytes]",
                output.len(),
                cut
            );
            (format!("{}{message}", &output[..cut]), true)
        } else {
            (output, false)
        }
    }
}

/// Runs single steps. Every failure is folded into the returned [`StepResult`].
#[derive(Clone, Default)]
pub struct StepExecutor {
    backend: Option<Arc<dyn LLM>>,
    config: ExecutorConfig,
}

impl StepExecutor {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_backend(mut self, backend: Arc<dyn LLM>) -> Self {
        self.backend = Some(backend);
        self
    }

    #[must_use]
    pub fn with_config(mut self, config: ExecutorConfig) -> Self {
        self.config = config;
        self
    }

    pub async fn execute(&self, step: &Step, registry: &ToolRegistry) -> StepResult {
        let started_at = Utc::now();

        let outcome = if step.is_respond() {
            self.respond(step).await
        } else {
            let name = step.tool_name.as_deref().unwrap_or(RESPOND_TOOL);
            let input = step.tool_input.clone().unwrap_or(Value::Null);
            registry.invoke(name, input).await
        };

        match outcome {
            Ok(output) => StepResult::success(step.clone(), self.bound(output), started_at),
            Err(e) => {
                tracing::warn!(
                    tool = step.tool_name.as_deref().unwrap_or(RESPOND_TOOL),
                    error = %e,
                    "Step failed"
                );
                StepResult::failure(step.clone(), &e, started_at)
            }
        }
    }

    async fn respond(&self, step: &Step) -> Result<Value> {
        if let Some(input) = &step.tool_input {
            return Ok(input.clone());
        }

        let Some(backend) = self.backend.as_ref() else {
            return Ok(Value::String(step.description.clone()));
        };

        let prompt = format!(
            "Carry out the following step and reply with the result only.\n\nStep: {}",
            step.description
        );
        let answer = backend.generate(&prompt).await?;
        let answer = answer.trim();
        if answer.is_empty() {
            return Err(AgentError::Provider(
                "Backend returned an empty answer".to_string(),
            ));
        }
        Ok(Value::String(answer.to_string()))
    }

    fn bound(&self, output: Value) -> Value {
        match output {
            Value::String(text) => {
                let (text, truncated) = self.config.truncate_output(text);
                if truncated {
                    tracing::debug!(limit = self.config.max_output_size, "Truncated step output");
                }
                Value::String(text)
            }
            other => other,
        }
    }
}

impl std::fmt::Debug for StepExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StepExecutor")
            .field("backend", &self.backend.as_ref().map(|b| b.name().to_string()))
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::ErrorKind;
    use crate::providers::mock::{MockLLM, MockResponse};
    use crate::tools::{CalculatorTool, TypedTool};
    use async_trait::async_trait;
    use schemars::JsonSchema;
    use serde::Deserialize;
    use serde_json::json;

    fn registry() -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(CalculatorTool::new())).unwrap();
        registry
    }

    #[tokio::test]
    async fn test_tool_step_succeeds() {
        let executor = StepExecutor::new();
        let step = Step::tool("add", "calculator", json!("2+2"));

        let result = executor.execute(&step, &registry()).await;

        assert!(result.success);
        assert_eq!(result.output, json!("4"));
        assert!(result.error.is_none());
        assert_eq!(result.step, step);
    }

    #[tokio::test]
    async fn test_unknown_tool_is_captured() {
        let executor = StepExecutor::new();
        let step = Step::tool("search", "web_search", json!({"q": "rust"}));

        let result = executor.execute(&step, &registry()).await;

        assert!(!result.success);
        assert_eq!(
            result.error.as_ref().map(|e| e.kind),
            Some(ErrorKind::UnknownTool)
        );
    }

    #[tokio::test]
    async fn test_invalid_input_is_captured() {
        let executor = StepExecutor::new();
        let step = Step::tool("add", "calculator", json!(42));

        let result = executor.execute(&step, &registry()).await;

        assert!(!result.success);
        assert_eq!(
            result.error.as_ref().map(|e| e.kind),
            Some(ErrorKind::InvalidToolInput)
        );
    }

    #[tokio::test]
    async fn test_respond_uses_input_without_registry() {
        let executor = StepExecutor::new();
        let step = Step::respond("answer", "forty-two");

        let result = executor.execute(&step, &ToolRegistry::new()).await;

        assert!(result.success);
        assert_eq!(result.output_text(), "forty-two");
    }

    #[tokio::test]
    async fn test_respond_without_input_asks_backend() {
        let mock = MockLLM::new().with_response(MockResponse::text("  Paris \n"));
        let executor = StepExecutor::new().with_backend(Arc::new(mock.clone()));

        let result = executor
            .execute(&Step::new("Name the capital of France"), &ToolRegistry::new())
            .await;

        assert!(result.success);
        assert_eq!(result.output, json!("Paris"));
        assert_eq!(mock.request_count(), 1);
    }

    #[tokio::test]
    async fn test_respond_backend_failure_is_captured() {
        let executor = StepExecutor::new().with_backend(Arc::new(MockLLM::new()));

        let result = executor
            .execute(&Step::new("Say hi"), &ToolRegistry::new())
            .await;

        assert!(!result.success);
        assert_eq!(result.error.map(|e| e.kind), Some(ErrorKind::Provider));
    }

    #[tokio::test]
    async fn test_output_truncation() {
        #[derive(Debug, Deserialize, JsonSchema)]
        struct NoInput {}

        struct LargeOutputTool;

        #[async_trait]
        impl TypedTool for LargeOutputTool {
            type Input = NoInput;

            fn name(&self) -> &'static str {
                "large_output"
            }

            fn description(&self) -> &'static str {
                "A tool with large output"
            }

            async fn execute_typed(&self, _input: Self::Input) -> Result<String> {
                Ok("x".repeat(1000))
            }
        }

        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(LargeOutputTool)).unwrap();
        let executor = StepExecutor::new().with_config(ExecutorConfig {
            max_output_size: 100,
        });

        let result = executor
            .execute(&Step::tool("big", "large_output", json!({})), &registry)
            .await;

        assert!(result.success);
        assert!(result.output_text().contains("truncated"));
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        let config = ExecutorConfig { max_output_size: 2 };
        let (text, truncated) = config.truncate_output("héllo".to_string());
        assert!(truncated);
        assert!(text.starts_with('h'));
    }
}
