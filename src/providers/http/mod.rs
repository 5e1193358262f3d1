pub mod auth;

pub use auth::AuthStrategy;

use reqwest::Client;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::RetryTransientMiddleware;
use reqwest_retry::policies::ExponentialBackoff;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::providers::error::ProviderError;

#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub timeout: Duration,
    pub max_retries: u32,
    pub retry_min_delay: Duration,
    pub retry_max_delay: Duration,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(120),
            max_retries: 3,
            retry_min_delay: Duration::from_millis(500),
            retry_max_delay: Duration::from_secs(30),
        }
    }
}

impl HttpConfig {
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub const fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }
}

/// JSON-over-HTTP client with transient-failure retries.
#[derive(Clone)]
pub struct HttpClient {
    inner: ClientWithMiddleware,
    config: HttpConfig,
}

impl HttpClient {
    pub fn new() -> Result<Self, ProviderError> {
        Self::with_config(HttpConfig::default())
    }

    pub fn with_config(config: HttpConfig) -> Result<Self, ProviderError> {
        let retry_policy = ExponentialBackoff::builder()
            .retry_bounds(config.retry_min_delay, config.retry_max_delay)
            .build_with_max_retries(config.max_retries);

        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("planwright/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                ProviderError::Configuration(format!("Failed to build HTTP client: {e}"))
            })?;

        let inner = ClientBuilder::new(client)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        Ok(Self { inner, config })
    }

    /// POSTs `body` as JSON and decodes a JSON reply, classifying error statuses.
    pub async fn post_json<B, R>(
        &self,
        url: &str,
        auth: &AuthStrategy,
        headers: &[(&'static str, &str)],
        body: &B,
        api_key_env_var: &str,
    ) -> Result<R, ProviderError>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        let mut request = auth.apply(self.inner.post(url)).json(body);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ProviderError::Connection(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            tracing::debug!(url, status = status.as_u16(), "Backend returned an error");
            return Err(ProviderError::from_status(
                status.as_u16(),
                &error_body,
                api_key_env_var,
            ));
        }

        response
            .json()
            .await
            .map_err(|e| ProviderError::ParseError(e.to_string()))
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_config_builder() {
        let config = HttpConfig::default()
            .with_timeout(Duration::from_secs(30))
            .with_max_retries(0);

        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.max_retries, 0);
    }

    #[test]
    fn test_http_client_debug() {
        let client = HttpClient::new().unwrap();
        assert!(format!("{client:?}").contains("HttpClient"));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_connection_error() {
        let client = HttpClient::with_config(
            HttpConfig::default()
                .with_timeout(Duration::from_secs(2))
                .with_max_retries(0),
        )
        .unwrap();

        let result: Result<serde_json::Value, _> = client
            .post_json(
                "http://127.0.0.1:9/v1/messages",
                &AuthStrategy::None,
                &[],
                &serde_json::json!({}),
                "KEY",
            )
            .await;

        assert!(matches!(result, Err(ProviderError::Connection(_))));
    }
}
