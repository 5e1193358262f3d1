use async_trait::async_trait;
use schemars::JsonSchema;

use crate::core::error::{AgentError, Result};

pub mod builtin;
pub mod executor;
pub mod registry;
mod schema;

pub use builtin::{CalculatorTool, CurrentTimeTool};
pub use executor::{ExecutorConfig, StepExecutor};
pub use registry::{ToolRegistry, ToolSpec};

#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn input_schema(&self) -> serde_json::Value;
    async fn execute(&self, input: serde_json::Value) -> Result<serde_json::Value>;
}

#[async_trait]
pub trait TypedTool: Send + Sync {
    type Input: JsonSchema + for<'de> serde::Deserialize<'de>;

    fn name(&self) -> &str;

    fn description(&self) -> &str;

    async fn execute_typed(&self, input: Self::Input) -> Result<String>;
}

#[async_trait]
impl<T: TypedTool> Tool for T {
    fn name(&self) -> &str {
        TypedTool::name(self)
    }

    fn description(&self) -> &str {
        TypedTool::description(self)
    }

    fn input_schema(&self) -> serde_json::Value {
        let mut schema = serde_json::to_value(schemars::schema_for!(T::Input))
            .unwrap_or_else(|_| serde_json::json!({}));

        if let Some(obj) = schema.as_object_mut()
            && obj.get("type").and_then(|t| t.as_str()) == Some("object")
            && !obj.contains_key("properties")
        {
            obj.insert("properties".to_string(), serde_json::json!({}));
        }
        schema
    }

    async fn execute(&self, input: serde_json::Value) -> Result<serde_json::Value> {
        let typed_input: T::Input =
            serde_json::from_value(input).map_err(|e| AgentError::InvalidToolInput {
                tool: TypedTool::name(self).to_string(),
                reason: e.to_string(),
            })?;
        self.execute_typed(typed_input)
            .await
            .map(serde_json::Value::String)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use schemars::JsonSchema;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, JsonSchema)]
    struct TestInput {
        message: String,
        count: u32,
    }

    struct EchoTool;

    #[async_trait]
    impl TypedTool for EchoTool {
        type Input = TestInput;

        fn name(&self) -> &'static str {
            "echo"
        }

        fn description(&self) -> &'static str {
            "Echoes the input message multiple times"
        }

        async fn execute_typed(&self, input: Self::Input) -> Result<String> {
            Ok(input.message.repeat(input.count as usize))
        }
    }

    #[tokio::test]
    async fn test_typed_tool_schema_generation() {
        let tool = EchoTool;
        let schema = tool.input_schema();

        assert!(schema.is_object());
        assert!(schema.get("properties").is_some());
        assert_eq!(Tool::name(&tool), "echo");
    }

    #[tokio::test]
    async fn test_typed_tool_execution() {
        let tool = EchoTool;
        let input = serde_json::json!({
            "message": "Hi",
            "count": 3
        });

        let result = tool.execute(input).await.unwrap();
        assert_eq!(result, serde_json::json!("HiHiHi"));
    }

    #[tokio::test]
    async fn test_typed_tool_invalid_input() {
        let tool: Box<dyn Tool> = Box::new(EchoTool);
        let input = serde_json::json!({
            "invalid_field": "value"
        });

        let result = tool.execute(input).await;
        assert!(matches!(
            result,
            Err(AgentError::InvalidToolInput { ref tool, .. }) if tool == "echo"
        ));
    }
}
