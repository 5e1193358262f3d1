use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Planning failed: {0}")]
    Planning(String),

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Tool already registered: {0}")]
    DuplicateTool(String),

    #[error("Invalid tool input for {tool}: {reason}")]
    InvalidToolInput { tool: String, reason: String },

    #[error("Tool '{tool}' failed: {source}")]
    ToolExecution {
        tool: String,
        #[source]
        source: Box<AgentError>,
    },

    /// Failure reported by a tool's own logic, before the registry wraps it.
    #[error("{0}")]
    ToolFailure(String),

    #[error("Run cancelled: {0}")]
    Cancelled(String),

    #[error("Iteration limit exceeded: {0}")]
    IterationLimitExceeded(usize),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AgentError>;

impl AgentError {
    #[must_use]
    pub fn tool_execution(tool: impl Into<String>, source: Self) -> Self {
        Self::ToolExecution {
            tool: tool.into(),
            source: Box::new(source),
        }
    }

    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Planning(_) => ErrorKind::Planning,
            Self::UnknownTool(_) => ErrorKind::UnknownTool,
            Self::DuplicateTool(_) => ErrorKind::DuplicateTool,
            Self::InvalidToolInput { .. } => ErrorKind::InvalidToolInput,
            Self::ToolExecution { .. } | Self::ToolFailure(_) => ErrorKind::ToolExecution,
            Self::Cancelled(_) => ErrorKind::Cancelled,
            Self::IterationLimitExceeded(_) => ErrorKind::IterationLimitExceeded,
            Self::Provider(_) => ErrorKind::Provider,
            Self::Config(_) => ErrorKind::Config,
            Self::Io(_) => ErrorKind::Io,
            Self::Json(_) => ErrorKind::Json,
        }
    }
}

impl From<crate::providers::error::ProviderError> for AgentError {
    fn from(err: crate::providers::error::ProviderError) -> Self {
        Self::Provider(err.to_string())
    }
}

/// Serializable classification of an [`AgentError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Planning,
    UnknownTool,
    DuplicateTool,
    InvalidToolInput,
    ToolExecution,
    Cancelled,
    IterationLimitExceeded,
    Provider,
    Config,
    Io,
    Json,
}

impl ErrorKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Planning => "planning",
            Self::UnknownTool => "unknown_tool",
            Self::DuplicateTool => "duplicate_tool",
            Self::InvalidToolInput => "invalid_tool_input",
            Self::ToolExecution => "tool_execution",
            Self::Cancelled => "cancelled",
            Self::IterationLimitExceeded => "iteration_limit_exceeded",
            Self::Provider => "provider",
            Self::Config => "config",
            Self::Io => "io",
            Self::Json => "json",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error descriptor that survives serialization: the kind plus the rendered message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    pub kind: ErrorKind,
    pub message: String,
}

impl ErrorInfo {
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl From<&AgentError> for ErrorInfo {
    fn from(err: &AgentError) -> Self {
        Self::new(err.kind(), err.to_string())
    }
}

impl From<AgentError> for ErrorInfo {
    fn from(err: AgentError) -> Self {
        Self::from(&err)
    }
}

impl std::fmt::Display for ErrorInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)
    }
}
