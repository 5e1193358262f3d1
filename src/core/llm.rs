use async_trait::async_trait;

use super::error::Result;
use super::types::{CompletionRequest, CompletionResponse, Message};

/// Generative backend consumed by the planner and the `respond` step path.
#[async_trait]
pub trait LLM: Send + Sync {
    fn name(&self) -> &str;
    fn model(&self) -> &str;
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse>;

    async fn generate(&self, prompt: &str) -> Result<String> {
        let request = CompletionRequest::new(vec![Message::user(prompt)]);
        Ok(self.complete(request).await?.text)
    }
}
