use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::error::{AgentError, ErrorInfo};
use crate::core::step::AgentState;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum RunOutcome {
    Done { final_answer: String },
    Failed { error: ErrorInfo },
}

impl RunOutcome {
    #[must_use]
    pub fn done(final_answer: impl Into<String>) -> Self {
        Self::Done {
            final_answer: final_answer.into(),
        }
    }

    #[must_use]
    pub fn failed(error: impl Into<ErrorInfo>) -> Self {
        Self::Failed {
            error: error.into(),
        }
    }

    #[must_use]
    pub const fn is_done(&self) -> bool {
        matches!(self, Self::Done { .. })
    }

    #[must_use]
    pub fn final_answer(&self) -> Option<&str> {
        match self {
            Self::Done { final_answer } => Some(final_answer),
            Self::Failed { .. } => None,
        }
    }

    #[must_use]
    pub const fn error(&self) -> Option<&ErrorInfo> {
        match self {
            Self::Done { .. } => None,
            Self::Failed { error } => Some(error),
        }
    }
}

impl From<AgentError> for RunOutcome {
    fn from(err: AgentError) -> Self {
        Self::failed(err)
    }
}

/// Outcome plus everything the run accumulated, suitable for saving.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub outcome: RunOutcome,
    pub state: AgentState,
    pub planning_calls: usize,
    #[serde(with = "duration_millis")]
    pub elapsed: Duration,
}

mod duration_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
