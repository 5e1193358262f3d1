mod types;

use async_trait::async_trait;

use crate::core::error::Result;
use crate::core::llm::LLM;
use crate::core::types::{CompletionRequest, CompletionResponse};
use crate::providers::error::ProviderError;
use crate::providers::http::{AuthStrategy, HttpClient, HttpConfig};
use crate::providers::types::{ApiKey, BaseUrl, ModelId};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o";
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Chat Completions backend. Point `base_url` at any compatible server
/// (Ollama, vLLM, OpenRouter) to use it instead.
#[derive(Clone)]
pub struct OpenAIProvider {
    http: HttpClient,
    auth: AuthStrategy,
    model: ModelId,
    base_url: BaseUrl,
}

impl std::fmt::Debug for OpenAIProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAIProvider")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl OpenAIProvider {
    pub fn new(api_key: ApiKey) -> std::result::Result<Self, ProviderError> {
        Self::with_http_config(api_key, HttpConfig::default())
    }

    pub fn from_env() -> std::result::Result<Self, ProviderError> {
        Self::new(ApiKey::from_env(API_KEY_ENV)?)
    }

    pub fn with_http_config(
        api_key: ApiKey,
        http_config: HttpConfig,
    ) -> std::result::Result<Self, ProviderError> {
        let auth = if api_key.is_empty() {
            AuthStrategy::None
        } else {
            AuthStrategy::bearer(api_key)
        };

        Ok(Self {
            http: HttpClient::with_config(http_config)?,
            auth,
            model: ModelId::new(DEFAULT_MODEL),
            base_url: BaseUrl::new(DEFAULT_BASE_URL),
        })
    }

    #[must_use]
    pub fn with_model(mut self, model: impl Into<ModelId>) -> Self {
        self.model = model.into();
        self
    }

    /// Root that `/chat/completions` is appended to, e.g. `http://localhost:11434/v1`.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<BaseUrl>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl LLM for OpenAIProvider {
    fn name(&self) -> &'static str {
        "openai"
    }

    fn model(&self) -> &str {
        self.model.as_str()
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        let body = types::ApiRequest::from_request(self.model.as_str(), &request);
        let url = self.base_url.join("/chat/completions");

        let response: types::ApiResponse = self
            .http
            .post_json(&url, &self.auth, &[], &body, API_KEY_ENV)
            .await?;

        Ok(response.into())
    }
}
