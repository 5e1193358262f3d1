use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

use crate::core::error::{AgentError, Result};
use crate::core::llm::LLM;
use crate::core::types::{CompletionRequest, CompletionResponse, StopReason, Usage};

#[derive(Debug, Clone)]
pub enum MockResponse {
    Text {
        text: String,
        delay: Option<Duration>,
    },
    Error(String),
}

impl MockResponse {
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text {
            text: text.into(),
            delay: None,
        }
    }

    /// JSON body, serialized as the model would emit it.
    #[must_use]
    pub fn json(value: &serde_json::Value) -> Self {
        Self::text(value.to_string())
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error(message.into())
    }

    #[must_use]
    pub fn with_delay(self, delay: Duration) -> Self {
        match self {
            Self::Text { text, .. } => Self::Text {
                text,
                delay: Some(delay),
            },
            other => other,
        }
    }
}

/// Scripted backend: replays queued responses in order and records every request.
#[derive(Clone)]
pub struct MockLLM {
    name: String,
    model: String,
    responses: Arc<Mutex<Vec<MockResponse>>>,
    request_history: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl MockLLM {
    #[must_use]
    pub fn new() -> Self {
        Self {
            name: "mock".to_string(),
            model: "mock-model".to_string(),
            responses: Arc::new(Mutex::new(Vec::new())),
            request_history: Arc::new(Mutex::new(Vec::new())),
        }
    }

    #[must_use]
    pub fn with_response(self, response: MockResponse) -> Self {
        self.responses.lock().push(response);
        self
    }

    #[must_use]
    pub fn request_history(&self) -> Vec<CompletionRequest> {
        self.request_history.lock().clone()
    }

    #[must_use]
    pub fn request_count(&self) -> usize {
        self.request_history.lock().len()
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.responses.lock().len()
    }

    fn next_response(&self) -> Result<MockResponse> {
        let mut responses = self.responses.lock();
        if responses.is_empty() {
            Err(AgentError::Provider(
                "MockLLM: No responses queued".to_string(),
            ))
        } else {
            Ok(responses.remove(0))
        }
    }
}

impl Default for MockLLM {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MockLLM {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockLLM")
            .field("model", &self.model)
            .field("remaining", &self.remaining())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl LLM for MockLLM {
    fn name(&self) -> &str {
        &self.name
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        self.request_history.lock().push(request);

        match self.next_response()? {
            MockResponse::Text { text, delay } => {
                if let Some(delay) = delay {
                    tokio::time::sleep(delay).await;
                }
                Ok(CompletionResponse::new(
                    text,
                    StopReason::EndTurn,
                    Usage::new(10, 5),
                ))
            }
            MockResponse::Error(message) => Err(AgentError::Provider(message)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Message;

    #[tokio::test]
    async fn test_mock_llm_returns_queued_response() {
        let mock = MockLLM::new()
            .with_response(MockResponse::text("First response"))
            .with_response(MockResponse::text("Second response"));

        let request = CompletionRequest::new(vec![Message::user("test")]);

        let response1 = mock.complete(request.clone()).await.unwrap();
        assert_eq!(response1.text, "First response");

        let response2 = mock.complete(request).await.unwrap();
        assert_eq!(response2.text, "Second response");
    }

    #[tokio::test]
    async fn test_mock_llm_error_when_empty() {
        let mock = MockLLM::new();
        let result = mock.generate("test").await;
        assert!(matches!(result, Err(AgentError::Provider(_))));
    }

    #[tokio::test]
    async fn test_mock_llm_scripted_error() {
        let mock = MockLLM::new().with_response(MockResponse::error("overloaded"));
        let err = mock.generate("test").await.unwrap_err();
        assert!(err.to_string().contains("overloaded"));
    }

    #[tokio::test]
    async fn test_mock_llm_records_requests() {
        let mock = MockLLM::new().with_response(MockResponse::text("ok"));

        assert_eq!(mock.request_count(), 0);
        mock.generate("hello").await.unwrap();

        assert_eq!(mock.request_count(), 1);
        assert_eq!(mock.request_history()[0].messages[0].content, "hello");
        assert_eq!(mock.remaining(), 0);
    }
}
