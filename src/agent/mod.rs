//! Conversation handler
//!
//! Owns the transcript, the chat-completion client, the toolbox and the
//! usage tracker. One respond() call runs the full
//! ask → tool calls → feed results back → final answer cycle.

use crate::config::Settings;
use crate::error::AssistantError;
use crate::llm::OpenAiClient;
use crate::models::{ChatMessage, ToolSpec};
use crate::tools::{ToolRequest, Toolbox};
use crate::usage::UsageTracker;
use crate::Result;
use tracing::{debug, info, warn};

/// Upper bound on tool-call rounds within one respond() cycle.
const MAX_TOOL_ROUNDS: usize = 4;

/// The conversational banking assistant.
pub struct Assistant {
    client: OpenAiClient,
    toolbox: Toolbox,
    usage: UsageTracker,
    tool_specs: Vec<ToolSpec>,
    transcript: Vec<ChatMessage>,
    system_prompt: String,
}

impl Assistant {
    pub fn new(settings: &Settings) -> Self {
        let mut client =
            OpenAiClient::new(settings.api_key.clone(), settings.model.clone());
        if let Some(base_url) = &settings.base_url {
            client = client.with_base_url(base_url.clone());
        }

        let system_prompt = settings.system_prompt();

        Self {
            client,
            toolbox: Toolbox::new(),
            usage: UsageTracker::load(&settings.usage_log_path),
            tool_specs: ToolRequest::specs(),
            transcript: vec![ChatMessage::system(system_prompt.clone())],
            system_prompt,
        }
    }

    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    pub fn usage_summary(&self) -> String {
        self.usage.summary()
    }

    /// Drop the conversation history, keeping only the system prompt.
    pub fn reset(&mut self) {
        self.transcript = vec![ChatMessage::system(self.system_prompt.clone())];
    }

    /// Process one user message and return the assistant's answer.
    ///
    /// While the model requests tool calls, each is executed against the
    /// toolbox and the results are fed back as tool-role messages before
    /// requesting the next completion.
    pub async fn respond(&mut self, input: &str) -> Result<String> {
        self.transcript.push(ChatMessage::user(input));

        for round in 0..=MAX_TOOL_ROUNDS {
            let outcome = self
                .client
                .complete(&self.transcript, &self.tool_specs)
                .await?;

            self.track_usage(&outcome);

            let message = outcome.message;
            let tool_calls = message.tool_calls.clone().unwrap_or_default();

            if tool_calls.is_empty() {
                let answer = message
                    .content
                    .clone()
                    .unwrap_or_else(|| "I'm not sure how to answer that.".to_string());
                self.transcript.push(message);

                info!(round, "Assistant answered");
                return Ok(answer);
            }

            debug!(round, call_count = tool_calls.len(), "Model requested tool calls");
            self.transcript.push(message);

            for call in &tool_calls {
                let result = self
                    .toolbox
                    .dispatch(&call.function.name, &call.function.arguments)
                    .await;

                debug!(tool = %call.function.name, "Tool result appended");
                self.transcript.push(ChatMessage::tool(call.id.as_str(), result));
            }
        }

        Err(AssistantError::LlmError(format!(
            "Exceeded {} tool-call rounds without a final answer",
            MAX_TOOL_ROUNDS
        )))
    }

    /// Log token usage for one completed call. Falls back to a character
    /// estimate when the endpoint reported no usage block; failures to
    /// write the log never fail the response.
    fn track_usage(&mut self, outcome: &crate::llm::ChatOutcome) {
        let (input_tokens, output_tokens) = match outcome.usage {
            Some(usage) => (usage.prompt_tokens, usage.completion_tokens),
            None => {
                let input: u64 = self
                    .transcript
                    .iter()
                    .map(ChatMessage::estimated_tokens)
                    .sum();
                (input, outcome.message.estimated_tokens())
            }
        };

        if let Err(e) = self
            .usage
            .log_call(self.client.model(), input_tokens, output_tokens, None)
        {
            warn!("Usage logging failed, response will still be returned: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Settings, DEFAULT_MODEL};
    use crate::models::MessageRole;
    use tempfile::tempdir;

    fn test_settings(usage_path: &str) -> Settings {
        Settings {
            api_key: "test-key".to_string(),
            model: DEFAULT_MODEL.to_string(),
            bank_name: "Demo Bank".to_string(),
            base_url: None,
            usage_log_path: usage_path.to_string(),
        }
    }

    #[test]
    fn test_new_assistant_starts_with_system_prompt() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("usage_log.json");
        let assistant = Assistant::new(&test_settings(path.to_str().unwrap()));

        assert_eq!(assistant.transcript().len(), 1);
        assert_eq!(assistant.transcript()[0].role, MessageRole::System);
        assert!(assistant.transcript()[0]
            .content
            .as_deref()
            .unwrap()
            .contains("Demo Bank"));
    }

    #[test]
    fn test_reset_keeps_only_system_prompt() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("usage_log.json");
        let mut assistant = Assistant::new(&test_settings(path.to_str().unwrap()));

        assistant.transcript.push(ChatMessage::user("hello"));
        assistant.transcript.push(ChatMessage::assistant("hi"));
        assert_eq!(assistant.transcript().len(), 3);

        assistant.reset();
        assert_eq!(assistant.transcript().len(), 1);
        assert_eq!(assistant.transcript()[0].role, MessageRole::System);
    }

    #[tokio::test]
    async fn test_missing_api_key_is_a_config_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("usage_log.json");
        let mut settings = test_settings(path.to_str().unwrap());
        settings.api_key = String::new();

        let mut assistant = Assistant::new(&settings);
        let result = assistant.respond("what is a savings account?").await;

        assert!(result.is_err());
        let message = result.unwrap_err().to_string();
        assert!(message.to_lowercase().contains("api_key"));
    }
}
