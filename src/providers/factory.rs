use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::core::error::{AgentError, Result};
use crate::core::llm::LLM;

use super::anthropic::{self, AnthropicProvider};
use super::http::HttpConfig;
use super::openai::{self, OpenAIProvider};
use super::types::ApiKey;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    Anthropic,
    OpenAI,
}

impl ProviderKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Anthropic => "anthropic",
            Self::OpenAI => "openai",
        }
    }

    /// Guesses the provider from a well-known model name prefix.
    #[must_use]
    pub fn infer(model: &str) -> Option<Self> {
        let model = model.trim().to_ascii_lowercase();
        if model.starts_with("claude") {
            Some(Self::Anthropic)
        } else if ["gpt", "chatgpt", "o1", "o3", "o4"]
            .iter()
            .any(|prefix| model.starts_with(prefix))
        {
            Some(Self::OpenAI)
        } else {
            None
        }
    }

    #[must_use]
    pub const fn default_model(self) -> &'static str {
        match self {
            Self::Anthropic => anthropic::DEFAULT_MODEL,
            Self::OpenAI => openai::DEFAULT_MODEL,
        }
    }

    #[must_use]
    pub const fn api_key_env(self) -> &'static str {
        match self {
            Self::Anthropic => anthropic::API_KEY_ENV,
            Self::OpenAI => openai::API_KEY_ENV,
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = AgentError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "anthropic" | "claude" => Ok(Self::Anthropic),
            "openai" => Ok(Self::OpenAI),
            other => Err(AgentError::Config(format!(
                "Unknown provider '{other}' (expected 'anthropic' or 'openai')"
            ))),
        }
    }
}

/// What is needed to build a backend; `None` fields fall back to the provider defaults.
#[derive(Debug, Clone, Default)]
pub struct ProviderSettings {
    pub kind: ProviderKind,
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub http: HttpConfig,
}

pub fn create_provider(settings: &ProviderSettings) -> Result<Arc<dyn LLM>> {
    let model = settings
        .model
        .as_deref()
        .unwrap_or_else(|| settings.kind.default_model())
        .to_string();

    tracing::debug!(
        provider = %settings.kind,
        model = %model,
        base_url = settings.base_url.as_deref().unwrap_or("default"),
        "Creating provider"
    );

    match settings.kind {
        ProviderKind::Anthropic => {
            let mut provider = AnthropicProvider::with_http_config(
                api_key(settings.kind)?,
                settings.http.clone(),
            )
            .map_err(|e| AgentError::Config(e.to_string()))?
            .with_model(model);
            if let Some(base_url) = &settings.base_url {
                provider = provider.with_base_url(base_url.clone());
            }
            Ok(Arc::new(provider))
        }
        ProviderKind::OpenAI => {
            // Self-hosted compatible servers usually run without a key.
            let key = match (&settings.base_url, api_key(settings.kind)) {
                (_, Ok(key)) => key,
                (Some(_), Err(_)) => ApiKey::default(),
                (None, Err(e)) => return Err(e),
            };
            let mut provider = OpenAIProvider::with_http_config(key, settings.http.clone())
                .map_err(|e| AgentError::Config(e.to_string()))?
                .with_model(model);
            if let Some(base_url) = &settings.base_url {
                provider = provider.with_base_url(base_url.clone());
            }
            Ok(Arc::new(provider))
        }
    }
}

fn api_key(kind: ProviderKind) -> Result<ApiKey> {
    let env_var = kind.api_key_env();
    ApiKey::from_env(env_var).map_err(|_| {
        AgentError::Config(format!(
            "API key not found. Set {env_var} environment variable for the {kind} provider."
        ))
    })
}
