use serde::{Deserialize, Serialize};

use crate::core::types::{CompletionRequest, CompletionResponse, Role, StopReason, Usage};

/// Chat Completions request; also spoken by most self-hosted servers.
#[derive(Debug, Serialize)]
pub struct ApiRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<ApiMessage<'a>>,
    pub max_tokens: u32,
    pub temperature: f32,
}

#[derive(Debug, Serialize)]
pub struct ApiMessage<'a> {
    pub role: &'static str,
    pub content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct ApiResponse {
    pub choices: Vec<ApiChoice>,
    #[serde(default)]
    pub usage: Option<ApiUsage>,
}

#[derive(Debug, Deserialize)]
pub struct ApiChoice {
    pub message: ApiResponseMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ApiResponseMessage {
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ApiUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

impl<'a> ApiRequest<'a> {
    pub fn from_request(model: &'a str, request: &'a CompletionRequest) -> Self {
        let system = request.system_prompt.as_deref().map(|content| ApiMessage {
            role: "system",
            content,
        });
        let turns = request.messages.iter().map(|m| ApiMessage {
            role: match m.role {
                Role::User => "user",
                Role::Assistant => "assistant",
            },
            content: &m.content,
        });

        Self {
            model,
            messages: system.into_iter().chain(turns).collect(),
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        }
    }
}

impl From<ApiResponse> for CompletionResponse {
    fn from(response: ApiResponse) -> Self {
        let usage = response
            .usage
            .map(|u| Usage::new(u.prompt_tokens, u.completion_tokens))
            .unwrap_or_default();

        let Some(choice) = response.choices.into_iter().next() else {
            return Self::new("", StopReason::EndTurn, usage);
        };

        let stop_reason = match choice.finish_reason.as_deref() {
            Some("length") => StopReason::MaxTokens,
            _ => StopReason::EndTurn,
        };

        Self::new(
            choice.message.content.unwrap_or_default(),
            stop_reason,
            usage,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Message;

    #[test]
    fn test_system_prompt_leads_messages() {
        let request = CompletionRequest::new(vec![Message::user("hi")])
            .with_system_prompt("plan")
            .with_temperature(0.0);

        let json = serde_json::to_value(ApiRequest::from_request("gpt-4o", &request)).unwrap();

        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][0]["content"], "plan");
        assert_eq!(json["messages"][1]["role"], "user");
        assert_eq!(json["temperature"], 0.0);
    }

    #[test]
    fn test_response_conversion() {
        let json = r#"{
            "id": "chatcmpl-1",
            "choices": [{"index": 0, "message": {"role": "assistant", "content": "{\"final_answer\": \"4\"}"}, "finish_reason": "length"}],
            "usage": {"prompt_tokens": 7, "completion_tokens": 3, "total_tokens": 10}
        }"#;

        let response: CompletionResponse =
            serde_json::from_str::<ApiResponse>(json).unwrap().into();

        assert_eq!(response.text, "{\"final_answer\": \"4\"}");
        assert_eq!(response.stop_reason, StopReason::MaxTokens);
        assert_eq!(response.usage, Usage::new(7, 3));
    }

    #[test]
    fn test_empty_choices() {
        let response: CompletionResponse =
            serde_json::from_str::<ApiResponse>(r#"{"choices": []}"#)
                .unwrap()
                .into();
        assert!(response.text.is_empty());
    }
}
