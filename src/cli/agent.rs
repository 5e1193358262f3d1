use std::sync::Arc;

use planwright::config::AppConfig;
use planwright::core::{
    AgentEvent, AgentEventEmitter, AgentEventHandler, LLM, PlanExecuteAgent, Result,
};
use planwright::planner::LlmPlanner;
use planwright::tools::builtin::register_builtins;
use planwright::tools::{StepExecutor, ToolRegistry};

pub fn build_registry() -> Result<ToolRegistry> {
    let mut registry = ToolRegistry::new();
    register_builtins(&mut registry)?;
    Ok(registry)
}

pub fn create_agent(
    llm: &Arc<dyn LLM>,
    config: &AppConfig,
    show_progress: bool,
) -> Result<PlanExecuteAgent> {
    let planner = LlmPlanner::new(llm.clone()).with_config(config.planner_config());
    let executor = StepExecutor::new().with_backend(llm.clone());

    let mut agent =
        PlanExecuteAgent::new(Arc::new(planner), Arc::new(build_registry()?), executor);

    if show_progress {
        let mut events = AgentEventEmitter::new();
        events.add_handler(Arc::new(ProgressPrinter));
        agent = agent.with_events(events);
    }

    Ok(agent)
}

/// Prints one line per plan and step to stderr.
struct ProgressPrinter;

impl AgentEventHandler for ProgressPrinter {
    fn handle(&self, event: AgentEvent) {
        match event {
            AgentEvent::PlanCreated { plan, .. } if plan.is_terminal() => {
                eprintln!("• plan: final answer ready");
            }
            AgentEvent::PlanCreated { plan, .. } => {
                eprintln!("• plan: {} step(s)", plan.len());
            }
            AgentEvent::StepStarted { step, .. } => match step.tool_name.as_deref() {
                Some(tool) => eprintln!("  → {} [{tool}]", step.description),
                None => eprintln!("  → {}", step.description),
            },
            AgentEvent::StepCompleted { .. } => {}
            AgentEvent::StepFailed { error, .. } => eprintln!("  ✗ {error}"),
            AgentEvent::RunFinished { .. } => {}
        }
    }
}
