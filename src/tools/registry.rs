use std::collections::HashMap;
use std::sync::Arc;

use crate::core::error::{AgentError, Result};
use crate::core::step::RESPOND_TOOL;

use super::Tool;
use super::schema::InputContract;

/// A registered tool together with the contract its input is checked against.
#[derive(Clone)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub input_schema: serde_json::Value,
    pub tool: Arc<dyn Tool>,
    contract: InputContract,
}

impl ToolSpec {
    fn from_tool(tool: Arc<dyn Tool>) -> Result<Self> {
        let name = tool.name().to_string();
        let input_schema = tool.input_schema();
        let contract = InputContract::compile(&name, &input_schema)?;
        Ok(Self {
            description: tool.description().to_string(),
            name,
            input_schema,
            tool,
            contract,
        })
    }
}

impl PartialEq for ToolSpec {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.description == other.description
            && self.input_schema == other.input_schema
            && Arc::ptr_eq(&self.tool, &other.tool)
    }
}

impl std::fmt::Debug for ToolSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolSpec")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("input_schema", &self.input_schema)
            .finish_non_exhaustive()
    }
}

/// Name-keyed tool table. Built mutably, then shared read-only across runs.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: HashMap<String, ToolSpec>,
}

impl ToolRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    pub fn register(&mut self, tool: Arc<dyn Tool>) -> Result<()> {
        let name = tool.name();
        if name == RESPOND_TOOL {
            return Err(AgentError::Config(format!(
                "'{RESPOND_TOOL}' is reserved for direct answers"
            )));
        }
        if self.tools.contains_key(name) {
            return Err(AgentError::DuplicateTool(name.to_string()));
        }
        let spec = ToolSpec::from_tool(tool)?;
        tracing::debug!(tool = %spec.name, "Registered tool");
        self.tools.insert(spec.name.clone(), spec);
        Ok(())
    }

    pub fn resolve(&self, name: &str) -> Result<ToolSpec> {
        self.tools
            .get(name)
            .cloned()
            .ok_or_else(|| AgentError::UnknownTool(name.to_string()))
    }

    pub async fn invoke(&self, name: &str, input: serde_json::Value) -> Result<serde_json::Value> {
        let spec = self
            .tools
            .get(name)
            .ok_or_else(|| AgentError::UnknownTool(name.to_string()))?;

        spec.contract.check(name, &input)?;

        spec.tool.execute(input).await.map_err(|e| match e {
            e @ AgentError::InvalidToolInput { .. } => e,
            other => AgentError::tool_execution(name, other),
        })
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Registered specs ordered by name.
    #[must_use]
    pub fn specs(&self) -> Vec<&ToolSpec> {
        let mut specs: Vec<&ToolSpec> = self.tools.values().collect();
        specs.sort_by(|a, b| a.name.cmp(&b.name));
        specs
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.specs().into_iter().map(|s| s.name.clone()).collect()
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tool_count", &self.len())
            .field("tools", &self.names())
            .finish()
    }
}
