//! Plan-and-execute agent loop: a planner breaks an objective into steps,
//! an executor runs each step against registered tools, and the loop
//! replans from the accumulated history until it has an answer or a limit trips.

pub mod config;
pub mod core;
pub mod logging;
pub mod planner;
pub mod providers;
pub mod tools;

pub use crate::core::{
    AgentError, FailurePolicy, Objective, Plan, PlanExecuteAgent, Result, RunConfig, RunOutcome,
    RunReport, Step, StepResult,
};
pub use crate::planner::{LlmPlanner, Planner};
pub use crate::tools::{StepExecutor, Tool, ToolRegistry, TypedTool};
