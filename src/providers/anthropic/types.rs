use serde::{Deserialize, Serialize};

use crate::core::types::{CompletionRequest, CompletionResponse, Role, StopReason, Usage};

#[derive(Debug, Serialize)]
pub struct ApiRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<ApiMessage<'a>>,
    pub max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<&'a str>,
    pub temperature: f32,
}

#[derive(Debug, Serialize)]
pub struct ApiMessage<'a> {
    pub role: &'static str,
    pub content: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ApiContentBlock {
    Text {
        text: String,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
pub struct ApiResponse {
    pub content: Vec<ApiContentBlock>,
    pub stop_reason: Option<String>,
    pub usage: ApiUsage,
}

#[derive(Debug, Deserialize)]
pub struct ApiUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl<'a> ApiRequest<'a> {
    pub fn from_request(model: &'a str, request: &'a CompletionRequest) -> Self {
        Self {
            model,
            messages: request
                .messages
                .iter()
                .map(|m| ApiMessage {
                    role: match m.role {
                        Role::User => "user",
                        Role::Assistant => "assistant",
                    },
                    content: &m.content,
                })
                .collect(),
            max_tokens: request.max_tokens,
            system: request.system_prompt.as_deref(),
            temperature: request.temperature,
        }
    }
}

impl From<ApiResponse> for CompletionResponse {
    fn from(response: ApiResponse) -> Self {
        let text = response
            .content
            .into_iter()
            .filter_map(|block| match block {
                ApiContentBlock::Text { text } => Some(text),
                ApiContentBlock::Other => None,
            })
            .collect::<String>();

        let stop_reason = match response.stop_reason.as_deref() {
            Some("max_tokens") => StopReason::MaxTokens,
            Some("stop_sequence") => StopReason::StopSequence,
            _ => StopReason::EndTurn,
        };

        Self::new(
            text,
            stop_reason,
            Usage::new(response.usage.input_tokens, response.usage.output_tokens),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Message;

    #[test]
    fn test_request_shape() {
        let request = CompletionRequest::new(vec![Message::user("Plan this")])
            .with_system_prompt("You are a planner")
            .with_max_tokens(512)
            .with_temperature(0.0);

        let json = serde_json::to_value(ApiRequest::from_request("claude-x", &request)).unwrap();

        assert_eq!(json["model"], "claude-x");
        assert_eq!(json["system"], "You are a planner");
        assert_eq!(json["max_tokens"], 512);
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"], "Plan this");
    }

    #[test]
    fn test_response_joins_text_blocks() {
        let json = r#"{
            "content": [
                {"type": "thinking", "thinking": "hmm"},
                {"type": "text", "text": "{\"final_answer\":"},
                {"type": "text", "text": " \"4\"}"}
            ],
            "stop_reason": "max_tokens",
            "usage": {"input_tokens": 10, "output_tokens": 5}
        }"#;

        let response: CompletionResponse =
            serde_json::from_str::<ApiResponse>(json).unwrap().into();

        assert_eq!(response.text, "{\"final_answer\": \"4\"}");
        assert_eq!(response.stop_reason, StopReason::MaxTokens);
        assert_eq!(response.usage.total(), 15);
    }
}
