//! Turning an objective and its execution history into a [`Plan`].

use async_trait::async_trait;

use crate::core::error::Result;
use crate::core::step::{Objective, Plan, StepResult};
use crate::tools::ToolRegistry;

mod llm;
pub mod parse;
pub mod prompt;

pub use llm::{LlmPlanner, PlannerConfig};
pub use parse::parse_plan;
pub use prompt::PlanPrompt;

/// Produces plans. Failures must surface as `AgentError::Planning`.
#[async_trait]
pub trait Planner: Send + Sync {
    async fn plan(
        &self,
        objective: &Objective,
        history: &[StepResult],
        tools: &ToolRegistry,
    ) -> Result<Plan>;
}
