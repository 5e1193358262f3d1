use std::sync::Arc;

use jsonschema::Validator;
use serde_json::Value;

use crate::core::error::{AgentError, Result};

/// Compiled input contract for one tool.
#[derive(Clone)]
pub(crate) struct InputContract {
    validator: Arc<Validator>,
}

impl InputContract {
    pub(crate) fn compile(tool: &str, schema: &Value) -> Result<Self> {
        let validator = jsonschema::validator_for(schema).map_err(|e| {
            AgentError::Config(format!("Invalid input schema for tool '{tool}': {e}"))
        })?;
        Ok(Self {
            validator: Arc::new(validator),
        })
    }

    pub(crate) fn check(&self, tool: &str, input: &Value) -> Result<()> {
        if self.validator.is_valid(input) {
            return Ok(());
        }
        let reasons: Vec<String> = self
            .validator
            .iter_errors(input)
            .map(|e| e.to_string())
            .collect();
        Err(AgentError::InvalidToolInput {
            tool: tool.to_string(),
            reason: reasons.join("; "),
        })
    }
}

impl std::fmt::Debug for InputContract {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InputContract").finish_non_exhaustive()
    }
}
