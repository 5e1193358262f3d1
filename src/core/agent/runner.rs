use std::future::Future;
use std::time::Duration;

use chrono::Utc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use super::{FailurePolicy, PlanExecuteAgent, RunConfig, RunOutcome, RunReport};
use crate::core::error::{AgentError, ErrorInfo, Result};
use crate::core::step::{AgentState, Objective, Plan, Step, StepResult};

enum Phase {
    Planning,
    Executing { steps: Vec<Step>, cursor: usize },
}

/// Cancellation token plus optional deadline, checked at every transition.
struct Guard<'a> {
    cancel: &'a CancellationToken,
    deadline: Option<Instant>,
    timeout: Option<Duration>,
}

impl Guard<'_> {
    fn check(&self) -> Result<()> {
        if self.cancel.is_cancelled() {
            return Err(Self::cancelled());
        }
        if self.deadline.is_some_and(|d| Instant::now() >= d) {
            return Err(self.timed_out());
        }
        Ok(())
    }

    async fn race<F: Future>(&self, fut: F) -> Result<F::Output> {
        tokio::select! {
            biased;
            () = self.cancel.cancelled() => Err(Self::cancelled()),
            () = wait_until(self.deadline) => Err(self.timed_out()),
            output = fut => Ok(output),
        }
    }

    fn cancelled() -> AgentError {
        AgentError::Cancelled("cancelled by caller".to_string())
    }

    fn timed_out(&self) -> AgentError {
        AgentError::Cancelled(format!(
            "timed out after {:?}",
            self.timeout.unwrap_or_default()
        ))
    }
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

impl PlanExecuteAgent {
    pub async fn run(&self, objective: impl Into<Objective>, config: &RunConfig) -> RunOutcome {
        self.run_with_cancel(objective, config, CancellationToken::new())
            .await
            .outcome
    }

    pub async fn run_with_cancel(
        &self,
        objective: impl Into<Objective>,
        config: &RunConfig,
        cancel: CancellationToken,
    ) -> RunReport {
        let started = Instant::now();
        let mut state = AgentState::new(objective.into());
        let mut planning_calls = 0;

        tracing::info!(
            run_id = %state.run_id,
            max_iterations = config.max_iterations,
            replan_every_step = config.replan_every_step,
            failure_policy = %config.failure_policy,
            "Run started"
        );

        let result = match config.validate() {
            Ok(()) => {
                self.drive(&mut state, config, &cancel, &mut planning_calls)
                    .await
            }
            Err(e) => Err(ErrorInfo::from(e)),
        };

        let outcome = match result {
            Ok(final_answer) => RunOutcome::done(final_answer),
            Err(error) => RunOutcome::failed(error),
        };

        match &outcome {
            RunOutcome::Done { .. } => tracing::info!(
                run_id = %state.run_id,
                iterations = state.iteration_count(),
                planning_calls,
                "Run finished"
            ),
            RunOutcome::Failed { error } => tracing::warn!(
                run_id = %state.run_id,
                iterations = state.iteration_count(),
                kind = %error.kind,
                error = %error.message,
                "Run failed"
            ),
        }
        self.events.emit_run_finished(state.run_id, &outcome);

        RunReport {
            outcome,
            state,
            planning_calls,
            elapsed: started.elapsed(),
        }
    }

    async fn drive(
        &self,
        state: &mut AgentState,
        config: &RunConfig,
        cancel: &CancellationToken,
        planning_calls: &mut usize,
    ) -> std::result::Result<String, ErrorInfo> {
        let guard = Guard {
            cancel,
            deadline: config.timeout.map(|t| Instant::now() + t),
            timeout: config.timeout,
        };
        let mut phase = Phase::Planning;

        loop {
            guard.check()?;

            phase = match phase {
                Phase::Planning => {
                    let plan = self
                        .plan_with_retry(state, config, &guard, planning_calls)
                        .await?;
                    self.events.emit_plan_created(state.run_id, &plan);
                    state.plan = Some(plan.clone());

                    match plan {
                        Plan::Terminal { final_answer } => return Ok(final_answer),
                        Plan::Steps { .. } if state.iteration_count() >= config.max_iterations => {
                            return Err(
                                AgentError::IterationLimitExceeded(config.max_iterations).into()
                            );
                        }
                        Plan::Steps { steps } => Phase::Executing { steps, cursor: 0 },
                    }
                }
                // Out of budget mid-plan: the planner gets one last chance to finish.
                Phase::Executing { .. } if state.iteration_count() >= config.max_iterations => {
                    Phase::Planning
                }
                Phase::Executing { steps, cursor } if cursor >= steps.len() => Phase::Planning,
                Phase::Executing { steps, cursor } => {
                    let step = &steps[cursor];

                    tracing::debug!(
                        run_id = %state.run_id,
                        iteration = state.iteration_count() + 1,
                        tool = step.tool_name.as_deref().unwrap_or("respond"),
                        "Executing step"
                    );
                    let started_at = Utc::now();
                    self.events.emit_step_started(state.run_id, step);
                    let result = match guard.race(self.executor.execute(step, &self.tools)).await {
                        Ok(result) => result,
                        Err(e) => {
                            // An interrupted step still counts as an executor call.
                            let result = StepResult::failure(step.clone(), &e, started_at);
                            self.events.emit_step_finished(state.run_id, &result);
                            state.record(result);
                            return Err(e.into());
                        }
                    };
                    self.events.emit_step_finished(state.run_id, &result);
                    let failure = result.error.clone();
                    state.record(result);

                    match failure {
                        Some(error) if config.failure_policy == FailurePolicy::Abort => {
                            return Err(error);
                        }
                        Some(_) => Phase::Planning,
                        None if config.replan_every_step => Phase::Planning,
                        None if cursor + 1 < steps.len() => Phase::Executing {
                            steps,
                            cursor: cursor + 1,
                        },
                        None => Phase::Planning,
                    }
                }
            };
        }
    }

    async fn plan_with_retry(
        &self,
        state: &AgentState,
        config: &RunConfig,
        guard: &Guard<'_>,
        planning_calls: &mut usize,
    ) -> Result<Plan> {
        let mut last_error = AgentError::Planning("planner was not called".to_string());

        for attempt in 1..=config.max_planning_attempts {
            guard.check()?;
            *planning_calls += 1;

            let result = guard
                .race(
                    self.planner
                        .plan(&state.objective, state.history(), &self.tools),
                )
                .await?;

            let error = match result {
                Ok(plan) if plan.is_terminal() || !plan.is_empty() => {
                    tracing::debug!(
                        run_id = %state.run_id,
                        attempt,
                        steps = plan.len(),
                        terminal = plan.is_terminal(),
                        "Plan ready"
                    );
                    return Ok(plan);
                }
                Ok(_) => AgentError::Planning("planner returned an empty plan".to_string()),
                Err(e @ (AgentError::Planning(_) | AgentError::Cancelled(_))) => e,
                Err(other) => AgentError::Planning(other.to_string()),
            };

            if matches!(error, AgentError::Cancelled(_)) {
                return Err(error);
            }
            tracing::warn!(
                run_id = %state.run_id,
                attempt,
                max_attempts = config.max_planning_attempts,
                error = %error,
                "Planning attempt failed"
            );
            last_error = error;
        }

        Err(last_error)
    }
}
