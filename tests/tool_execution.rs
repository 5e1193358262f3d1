use std::sync::Arc;

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::json;

use planwright::core::{AgentError, ErrorKind, Result, Step};
use planwright::tools::builtin::register_builtins;
use planwright::tools::{CalculatorTool, StepExecutor, ToolRegistry, TypedTool};

#[derive(Debug, Deserialize, JsonSchema)]
struct GreetInput {
    name: String,
    #[serde(default)]
    shout: bool,
}

struct GreetTool;

#[async_trait]
impl TypedTool for GreetTool {
    type Input = GreetInput;

    fn name(&self) -> &str {
        "greet"
    }

    fn description(&self) -> &str {
        "Greets someone by name"
    }

    async fn execute_typed(&self, input: GreetInput) -> Result<String> {
        if input.name.trim().is_empty() {
            return Err(AgentError::ToolFailure("nobody to greet".to_string()));
        }
        let greeting = format!("Hello, {}!", input.name);
        Ok(if input.shout {
            greeting.to_uppercase()
        } else {
            greeting
        })
    }
}

fn registry() -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    register_builtins(&mut registry).unwrap();
    registry.register(Arc::new(GreetTool)).unwrap();
    registry
}

#[tokio::test]
async fn test_calculator_through_registry() {
    let registry = registry();

    let bare = registry.invoke("calculator", json!("(2 + 3) * 4")).await.unwrap();
    assert_eq!(bare, json!("20"));

    let object = registry
        .invoke("calculator", json!({"expression": "7 / 2"}))
        .await
        .unwrap();
    assert_eq!(object, json!("3.5"));
}

#[tokio::test]
async fn test_calculator_rejects_non_expression_input() {
    let err = registry().invoke("calculator", json!(42)).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidToolInput);
}

#[tokio::test]
async fn test_current_time_with_format() {
    let year = registry()
        .invoke("current_time", json!({"format": "%Y"}))
        .await
        .unwrap();

    let year: i32 = year.as_str().unwrap().parse().unwrap();
    assert!(year >= 2024);
}

#[tokio::test]
async fn test_typed_tool_schema_is_enforced() {
    let registry = registry();

    let spec = registry.resolve("greet").unwrap();
    assert_eq!(spec.input_schema["type"], "object");
    assert!(spec.input_schema["properties"]["name"].is_object());

    let err = registry.invoke("greet", json!({"shout": true})).await.unwrap_err();
    assert!(matches!(err, AgentError::InvalidToolInput { ref tool, .. } if tool == "greet"));

    let output = registry
        .invoke("greet", json!({"name": "Ada", "shout": true}))
        .await
        .unwrap();
    assert_eq!(output, json!("HELLO, ADA!"));
}

#[tokio::test]
async fn test_tool_failure_is_wrapped_with_tool_name() {
    let err = registry().invoke("greet", json!({"name": " "})).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ToolExecution);
    assert!(err.to_string().contains("greet"));
    assert!(err.to_string().contains("nobody to greet"));
}

#[tokio::test]
async fn test_executor_folds_failures_into_results() {
    let registry = registry();
    let executor = StepExecutor::new();

    let ok = executor
        .execute(&Step::tool("greet", "greet", json!({"name": "Bob"})), &registry)
        .await;
    assert!(ok.success);
    assert_eq!(ok.output_text(), "Hello, Bob!");
    assert!(ok.finished_at >= ok.started_at);

    let unknown = executor
        .execute(&Step::tool("fly", "teleport", json!({})), &registry)
        .await;
    assert!(!unknown.success);
    assert_eq!(unknown.error.map(|e| e.kind), Some(ErrorKind::UnknownTool));
}

#[test]
fn test_duplicate_registration_is_rejected() {
    let mut registry = registry();
    let err = registry.register(Arc::new(CalculatorTool::new())).unwrap_err();
    assert!(matches!(err, AgentError::DuplicateTool(ref name) if name == "calculator"));

    let respond = tokio_test::block_on(
        StepExecutor::new().execute(&Step::respond("answer", "42"), &registry),
    );
    assert_eq!(respond.output, json!("42"));
}
