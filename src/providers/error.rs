use thiserror::Error;

/// Failures talking to a model backend over HTTP.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Authentication failed: {message} (check the {api_key_env} environment variable)")]
    Authentication { message: String, api_key_env: String },

    #[error("Rate limit exceeded: {0}")]
    RateLimit(String),

    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Failed to parse response: {0}")]
    ParseError(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl ProviderError {
    /// Classifies a non-success response. `api_key_env_var` is named in auth failures.
    #[must_use]
    pub fn from_status(status: u16, body: &str, api_key_env_var: &str) -> Self {
        let message = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|v| v.get("error")?.get("message")?.as_str().map(String::from))
            .unwrap_or_else(|| format!("HTTP {status}"));

        match status {
            401 | 403 => Self::Authentication {
                message,
                api_key_env: api_key_env_var.to_string(),
            },
            429 => Self::RateLimit(message),
            500..=599 => Self::Server { status, message },
            _ => Self::InvalidRequest(message),
        }
    }
}
