use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::error::{AgentError, Result};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// A failed step ends the run.
    #[default]
    Abort,
    /// A failed step is recorded and the planner reacts to it.
    Continue,
}

impl FromStr for FailurePolicy {
    type Err = AgentError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "abort" => Ok(Self::Abort),
            "continue" => Ok(Self::Continue),
            other => Err(AgentError::Config(format!(
                "Unknown failure policy '{other}', expected 'abort' or 'continue'"
            ))),
        }
    }
}

impl std::fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Abort => "abort",
            Self::Continue => "continue",
        })
    }
}

/// Per-run limits and policies. There is no unbounded configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub max_iterations: usize,
    pub replan_every_step: bool,
    pub failure_policy: FailurePolicy,
    pub timeout: Option<Duration>,
    pub max_planning_attempts: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_ITERATIONS)
    }
}

impl RunConfig {
    pub const DEFAULT_MAX_ITERATIONS: usize = 10;
    pub const DEFAULT_PLANNING_ATTEMPTS: usize = 3;

    #[must_use]
    pub const fn new(max_iterations: usize) -> Self {
        Self {
            max_iterations,
            replan_every_step: false,
            failure_policy: FailurePolicy::Abort,
            timeout: None,
            max_planning_attempts: Self::DEFAULT_PLANNING_ATTEMPTS,
        }
    }

    #[must_use]
    pub const fn with_replan_every_step(mut self, enabled: bool) -> Self {
        self.replan_every_step = enabled;
        self
    }

    #[must_use]
    pub const fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    #[must_use]
    pub const fn with_max_planning_attempts(mut self, attempts: usize) -> Self {
        self.max_planning_attempts = attempts;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_iterations == 0 {
            return Err(AgentError::Config(
                "max_iterations must be at least 1".to_string(),
            ));
        }
        if self.max_planning_attempts == 0 {
            return Err(AgentError::Config(
                "max_planning_attempts must be at least 1".to_string(),
            ));
        }
        if self.timeout.is_some_and(|t| t.is_zero()) {
            return Err(AgentError::Config("timeout must be non-zero".to_string()));
        }
        Ok(())
    }
}
