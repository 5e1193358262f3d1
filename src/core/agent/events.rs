use std::sync::Arc;

use uuid::Uuid;

use crate::core::error::ErrorInfo;
use crate::core::step::{Plan, Step, StepResult};

use super::outcome::RunOutcome;

#[derive(Debug, Clone)]
pub enum AgentEvent {
    PlanCreated {
        run_id: Uuid,
        plan: Plan,
    },
    StepStarted {
        run_id: Uuid,
        step: Step,
    },
    StepCompleted {
        run_id: Uuid,
        result: StepResult,
    },
    StepFailed {
        run_id: Uuid,
        step: Step,
        error: ErrorInfo,
    },
    RunFinished {
        run_id: Uuid,
        outcome: RunOutcome,
    },
}

pub trait AgentEventHandler: Send + Sync {
    fn handle(&self, event: AgentEvent);
}

#[derive(Clone, Default)]
pub struct AgentEventEmitter {
    handlers: Vec<Arc<dyn AgentEventHandler>>,
}

impl AgentEventEmitter {
    #[must_use]
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    pub fn add_handler(&mut self, handler: Arc<dyn AgentEventHandler>) {
        self.handlers.push(handler);
    }

    pub fn emit(&self, event: AgentEvent) {
        for handler in &self.handlers {
            handler.handle(event.clone());
        }
    }

    pub fn emit_plan_created(&self, run_id: Uuid, plan: &Plan) {
        if self.handlers.is_empty() {
            return;
        }
        self.emit(AgentEvent::PlanCreated {
            run_id,
            plan: plan.clone(),
        });
    }

    pub fn emit_step_started(&self, run_id: Uuid, step: &Step) {
        if self.handlers.is_empty() {
            return;
        }
        self.emit(AgentEvent::StepStarted {
            run_id,
            step: step.clone(),
        });
    }

    pub fn emit_step_finished(&self, run_id: Uuid, result: &StepResult) {
        if self.handlers.is_empty() {
            return;
        }
        match &result.error {
            Some(error) => self.emit(AgentEvent::StepFailed {
                run_id,
                step: result.step.clone(),
                error: error.clone(),
            }),
            None => self.emit(AgentEvent::StepCompleted {
                run_id,
                result: result.clone(),
            }),
        }
    }

    pub fn emit_run_finished(&self, run_id: Uuid, outcome: &RunOutcome) {
        self.emit(AgentEvent::RunFinished {
            run_id,
            outcome: outcome.clone(),
        });
    }
}

impl std::fmt::Debug for AgentEventEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentEventEmitter")
            .field("handler_count", &self.handlers.len())
            .finish()
    }
}
