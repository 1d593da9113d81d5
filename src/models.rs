//! Chat transcript and tool-call wire types
//!
//! These structs follow the OpenAI chat-completion wire shape so the
//! same types serve both the request transcript and the response side.

use serde::{Deserialize, Serialize};

//
// ================= Messages =================
//

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
    Tool,
}

/// One entry in the running conversation transcript.
///
/// `content` is absent on assistant turns that only request tool calls;
/// `tool_call_id` is set only on tool-role messages answering a call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCallRequest>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: Some(content.into()),
            tool_calls: None,
            tool_call_id: None,
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: Some(content.into()),
            tool_calls: None,
            tool_call_id: None,
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: Some(content.into()),
            tool_calls: None,
            tool_call_id: None,
        }
    }

    /// Tool-role message carrying the result of one executed tool call.
    pub fn tool(call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Tool,
            content: Some(content.into()),
            tool_calls: None,
            tool_call_id: Some(call_id.into()),
        }
    }

    /// Approximate token count of the textual content (4 chars per token).
    pub fn estimated_tokens(&self) -> u64 {
        self.content.as_deref().map(|c| c.len() as u64 / 4).unwrap_or(0)
    }
}

//
// ================= Tool Calls =================
//

/// A tool invocation requested by the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallRequest {
    pub id: String,
    #[serde(rename = "type")]
    pub call_type: String,
    pub function: FunctionCall,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    /// JSON-encoded argument object, exactly as the model produced it.
    pub arguments: String,
}

//
// ================= Tool Declarations =================
//

/// Declaration of one callable tool, sent with every completion request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSpec {
    #[serde(rename = "type")]
    pub spec_type: String,
    pub function: FunctionSpec,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionSpec {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

impl ToolSpec {
    pub fn function(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: serde_json::Value,
    ) -> Self {
        Self {
            spec_type: "function".to_string(),
            function: FunctionSpec {
                name: name.into(),
                description: description.into(),
                parameters,
            },
        }
    }
}

//
// ================= Usage =================
//

/// Token accounting reported by the completion endpoint.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    #[serde(default)]
    pub total_tokens: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_serialization_skips_empty_fields() {
        let message = ChatMessage::user("hello");
        let json = serde_json::to_string(&message).unwrap();

        assert!(json.contains("\"role\":\"user\""));
        assert!(!json.contains("tool_calls"));
        assert!(!json.contains("tool_call_id"));
    }

    #[test]
    fn test_tool_message_carries_call_id() {
        let message = ChatMessage::tool("call_42", "12.5°C");
        let json = serde_json::to_string(&message).unwrap();

        assert!(json.contains("\"tool_call_id\":\"call_42\""));
    }

    #[test]
    fn test_estimated_tokens() {
        let message = ChatMessage::user("abcdefgh");
        assert_eq!(message.estimated_tokens(), 2);

        let empty = ChatMessage {
            role: MessageRole::Assistant,
            content: None,
            tool_calls: None,
            tool_call_id: None,
        };
        assert_eq!(empty.estimated_tokens(), 0);
    }
}
