pub mod agent;
pub mod error;
pub mod llm;
pub mod step;
pub mod types;

pub use agent::{
    AgentEvent, AgentEventEmitter, AgentEventHandler, FailurePolicy, PlanExecuteAgent, RunConfig,
    RunOutcome, RunReport,
};
pub use error::{AgentError, ErrorInfo, ErrorKind, Result};
pub use llm::LLM;
pub use step::{AgentState, Objective, Plan, RESPOND_TOOL, Step, StepError, StepResult};
