use std::sync::Arc;

use crate::planner::Planner;
use crate::tools::{StepExecutor, ToolRegistry};

mod config;
mod events;
mod outcome;
mod runner;

pub use config::{FailurePolicy, RunConfig};
pub use events::{AgentEvent, AgentEventEmitter, AgentEventHandler};
pub use outcome::{RunOutcome, RunReport};

/// Alternates planning and step execution until the objective is answered.
///
/// The agent holds no per-run state; one instance can drive many concurrent
/// runs, all sharing the same read-only [`ToolRegistry`].
pub struct PlanExecuteAgent {
    planner: Arc<dyn Planner>,
    tools: Arc<ToolRegistry>,
    executor: StepExecutor,
    events: AgentEventEmitter,
}

impl PlanExecuteAgent {
    #[must_use]
    pub fn new(
        planner: Arc<dyn Planner>,
        tools: Arc<ToolRegistry>,
        executor: StepExecutor,
    ) -> Self {
        Self {
            planner,
            tools,
            executor,
            events: AgentEventEmitter::new(),
        }
    }

    /// Routes plan, step and run events to `events`.
    #[must_use]
    pub fn with_events(mut self, events: AgentEventEmitter) -> Self {
        self.events = events;
        self
    }

    #[must_use]
    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }
}

impl std::fmt::Debug for PlanExecuteAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlanExecuteAgent")
            .field("tools", &self.tools)
            .field("executor", &self.executor)
            .field("events", &self.events)
            .finish_non_exhaustive()
    }
}
