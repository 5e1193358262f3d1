mod types;

use async_trait::async_trait;

use crate::core::error::Result;
use crate::core::llm::LLM;
use crate::core::types::{CompletionRequest, CompletionResponse};
use crate::providers::error::ProviderError;
use crate::providers::http::{AuthStrategy, HttpClient, HttpConfig};
use crate::providers::types::{ApiKey, BaseUrl, ModelId};

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";
const API_VERSION: &str = "2023-06-01";
pub const API_KEY_ENV: &str = "ANTHROPIC_API_KEY";

/// Messages API backend.
#[derive(Clone)]
pub struct AnthropicProvider {
    http: HttpClient,
    auth: AuthStrategy,
    model: ModelId,
    base_url: BaseUrl,
}

impl std::fmt::Debug for AnthropicProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnthropicProvider")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl AnthropicProvider {
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
        Ok(Self {
            http: HttpClient::with_config(http_config)?,
            auth: AuthStrategy::anthropic(api_key),
            model: ModelId::new(DEFAULT_MODEL),
            base_url: BaseUrl::new(DEFAULT_BASE_URL),
        })
    }

    #[must_use]
    pub fn with_model(mut self, model: impl Into<ModelId>) -> Self {
        self.model = model.into();
        self
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<BaseUrl>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl LLM for AnthropicProvider {
    fn name(&self) -> &'static str {
        "anthropic"
    }

    fn model(&self) -> &str {
        self.model.as_str()
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        let body = types::ApiRequest::from_request(self.model.as_str(), &request);
        let url = self.base_url.join("/v1/messages");

        let response: types::ApiResponse = self
            .http
            .post_json(
                &url,
                &self.auth,
                &[("anthropic-version", API_VERSION)],
                &body,
                API_KEY_ENV,
            )
            .await?;

        Ok(response.into())
    }
}
