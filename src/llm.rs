//! OpenAI-compatible chat-completion client
//!
//! Sends the running transcript plus the declared tool set and returns
//! the assistant message, which carries either plain content or a set of
//! requested tool calls. Uses a long-lived reqwest::Client for
//! connection pooling.

use crate::error::AssistantError;
use crate::models::{ChatMessage, TokenUsage, ToolSpec};
use crate::Result;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, info};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const TEMPERATURE: f32 = 0.1;

/// Reusable chat-completion client.
pub struct OpenAiClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

/// The assistant message plus token accounting for one completed call.
#[derive(Debug, Clone)]
pub struct ChatOutcome {
    pub message: ChatMessage,
    pub usage: Option<TokenUsage>,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<&'a [ToolSpec]>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
    usage: Option<TokenUsage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChatMessage,
    finish_reason: Option<String>,
}

impl OpenAiClient {
    pub fn new(api_key: String, model: String) -> Self {
        let client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(8)
            .timeout(Duration::from_secs(60))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            model,
        }
    }

    /// Point the client at a non-default endpoint (proxies, testing).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Request one completion for the transcript. When `tools` is
    /// non-empty the declarations are sent along and the model may
    /// answer with tool calls instead of content.
    pub async fn complete(
        &self,
        messages: &[ChatMessage],
        tools: &[ToolSpec],
    ) -> Result<ChatOutcome> {
        if self.api_key.is_empty() {
            return Err(AssistantError::ConfigError(
                "OPENAI_API_KEY not configured".to_string(),
            ));
        }

        let request = ChatRequest {
            model: &self.model,
            messages,
            temperature: TEMPERATURE,
            tools: if tools.is_empty() { None } else { Some(tools) },
        };

        let url = format!("{}/chat/completions", self.base_url);

        info!(model = %self.model, message_count = messages.len(), "Calling chat completion");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                error!("Chat completion request failed: {}", e);
                AssistantError::LlmError(format!("Chat completion request failed: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            error!(%status, "Chat completion error response: {}", error_text);
            return Err(AssistantError::LlmError(format!(
                "Chat completion returned {}: {}",
                status, error_text
            )));
        }

        let parsed: ChatResponse = response.json().await.map_err(|e| {
            error!("Failed to parse chat completion response: {}", e);
            AssistantError::LlmError(format!("Chat completion parse error: {}", e))
        })?;

        let choice = parsed.choices.into_iter().next().ok_or_else(|| {
            AssistantError::LlmError("No choices in chat completion response".to_string())
        })?;

        debug!(
            finish_reason = choice.finish_reason.as_deref().unwrap_or("unknown"),
            tool_calls = choice
                .message
                .tool_calls
                .as_ref()
                .map(|c| c.len())
                .unwrap_or(0),
            "Chat completion received"
        );

        Ok(ChatOutcome {
            message: choice.message,
            usage: parsed.usage,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MessageRole;
    use crate::tools::ToolRequest;

    #[test]
    fn test_request_serialization() {
        let messages = vec![
            ChatMessage::system("You are a banking assistant"),
            ChatMessage::user("what are the card fees?"),
        ];
        let specs = ToolRequest::specs();

        let request = ChatRequest {
            model: "gpt-4o-mini",
            messages: &messages,
            temperature: TEMPERATURE,
            tools: Some(&specs),
        };

        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("card fees"));
        assert!(json.contains("search_banking_faq"));
        assert!(json.contains("\"temperature\":0.1"));
    }

    #[test]
    fn test_request_omits_empty_tool_list() {
        let messages = vec![ChatMessage::user("hi")];
        let request = ChatRequest {
            model: "gpt-4o-mini",
            messages: &messages,
            temperature: TEMPERATURE,
            tools: None,
        };

        let json = serde_json::to_string(&request).unwrap();
        assert!(!json.contains("\"tools\""));
    }

    #[test]
    fn test_response_parsing_with_tool_calls() {
        let json = r#"{
            "choices": [{
                "message": {
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [{
                        "id": "call_1",
                        "type": "function",
                        "function": {
                            "name": "get_weather",
                            "arguments": "{\"city\":\"Tbilisi\"}"
                        }
                    }]
                },
                "finish_reason": "tool_calls"
            }],
            "usage": {"prompt_tokens": 42, "completion_tokens": 7, "total_tokens": 49}
        }"#;

        let parsed: ChatResponse = serde_json::from_str(json).unwrap();
        let choice = &parsed.choices[0];

        assert_eq!(choice.message.role, MessageRole::Assistant);
        let calls = choice.message.tool_calls.as_ref().unwrap();
        assert_eq!(calls[0].function.name, "get_weather");
        assert_eq!(parsed.usage.unwrap().total_tokens, 49);
    }

    #[test]
    fn test_response_parsing_with_plain_content() {
        let json = r#"{
            "choices": [{
                "message": {"role": "assistant", "content": "Hello!"},
                "finish_reason": "stop"
            }]
        }"#;

        let parsed: ChatResponse = serde_json::from_str(json).unwrap();
        assert_eq!(
            parsed.choices[0].message.content.as_deref(),
            Some("Hello!")
        );
        assert!(parsed.usage.is_none());
    }

    #[test]
    fn test_base_url_override_strips_trailing_slash() {
        let client =
            OpenAiClient::new("key".to_string(), "gpt-4o-mini".to_string())
                .with_base_url("http://localhost:8080/v1/");
        assert_eq!(client.base_url, "http://localhost:8080/v1");
    }
}
