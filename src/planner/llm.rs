use std::sync::Arc;

use async_trait::async_trait;

use crate::core::error::{AgentError, Result};
use crate::core::llm::LLM;
use crate::core::step::{Objective, Plan, Step, StepResult};
use crate::core::types::{CompletionRequest, Message};
use crate::tools::ToolRegistry;

use super::Planner;
use super::parse::parse_plan;
use super::prompt::PlanPrompt;

#[derive(Debug, Clone)]
pub struct PlannerConfig {
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            max_tokens: 2048,
            temperature: 0.0,
        }
    }
}

/// Planner backed by a generative model that answers in the JSON plan format.
pub struct LlmPlanner {
    llm: Arc<dyn LLM>,
    config: PlannerConfig,
}

impl LlmPlanner {
    #[must_use]
    pub fn new(llm: Arc<dyn LLM>) -> Self {
        Self {
            llm,
            config: PlannerConfig::default(),
        }
    }

    #[must_use]
    pub const fn with_config(mut self, config: PlannerConfig) -> Self {
        self.config = config;
        self
    }

    fn build_request(&self, prompt: &PlanPrompt<'_>) -> CompletionRequest {
        CompletionRequest::new(vec![Message::user(prompt.build())])
            .with_system_prompt(prompt.system())
            .with_max_tokens(self.config.max_tokens)
            .with_temperature(self.config.temperature)
    }
}

#[async_trait]
impl Planner for LlmPlanner {
    async fn plan(
        &self,
        objective: &Objective,
        history: &[StepResult],
        tools: &ToolRegistry,
    ) -> Result<Plan> {
        if objective.is_empty() {
            return Ok(Plan::terminal(""));
        }

        let prompt = PlanPrompt::new(objective, history, tools);
        let response = self
            .llm
            .complete(self.build_request(&prompt))
            .await
            .map_err(|e| AgentError::Planning(format!("Backend unavailable: {e}")))?;

        let plan = parse_plan(&response.text, tools)?;
        tracing::debug!(
            model = self.llm.model(),
            steps = plan.len(),
            terminal = plan.is_terminal(),
            "Parsed plan"
        );

        // A first plan is never terminal: an immediate answer becomes a respond step.
        match plan {
            Plan::Terminal { final_answer } if history.is_empty() => Ok(Plan::steps(vec![
                Step::respond("Answer the objective directly", final_answer),
            ])),
            other => Ok(other),
        }
    }
}

impl std::fmt::Debug for LlmPlanner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmPlanner")
            .field("llm", &self.llm.name())
            .field("config", &self.config)
            .finish()
    }
}
