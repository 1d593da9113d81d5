//! Environment configuration
//!
//! Settings are read once at startup from the environment (a `.env`
//! file is honoured via `dotenv`).

use crate::error::AssistantError;
use crate::Result;
use std::env;

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_BANK_NAME: &str = "TBC Bank";
pub const DEFAULT_USAGE_LOG_PATH: &str = "usage_log.json";

/// Runtime settings for the assistant.
#[derive(Debug, Clone)]
pub struct Settings {
    pub api_key: String,
    pub model: String,
    pub bank_name: String,
    /// Override for the chat-completion endpoint base (testing / proxies).
    pub base_url: Option<String>,
    pub usage_log_path: String,
}

impl Settings {
    /// Load settings from the environment. `OPENAI_API_KEY` is required.
    pub fn from_env() -> Result<Self> {
        let api_key = env::var("OPENAI_API_KEY").map_err(|_| {
            AssistantError::ConfigError(
                "OPENAI_API_KEY not found! Please add it to your .env file".to_string(),
            )
        })?;

        Ok(Self {
            api_key,
            model: env::var("OPENAI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            bank_name: env::var("BANK_NAME").unwrap_or_else(|_| DEFAULT_BANK_NAME.to_string()),
            base_url: env::var("OPENAI_BASE_URL").ok(),
            usage_log_path: env::var("USAGE_LOG_PATH")
                .unwrap_or_else(|_| DEFAULT_USAGE_LOG_PATH.to_string()),
        })
    }

    /// System prompt sent as the first transcript message.
    pub fn system_prompt(&self) -> String {
        format!(
            r#"You are a helpful banking assistant for {bank}.

Your job is to:
1. Answer banking questions in Georgian (ქართული) or English
2. Be friendly, helpful and professional
3. Use tools when needed (time, weather, currency, banking info)
4. If you don't know something, say so and suggest contacting the bank support

You can help with:
- Banking accounts, cards, loans
- Exchange rates and currency conversion
- Current time and weather
- General banking information

Always be polite and professional!"#,
            bank = self.bank_name
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_settings() -> Settings {
        Settings {
            api_key: "test-key".to_string(),
            model: DEFAULT_MODEL.to_string(),
            bank_name: "Demo Bank".to_string(),
            base_url: None,
            usage_log_path: DEFAULT_USAGE_LOG_PATH.to_string(),
        }
    }

    #[test]
    fn test_system_prompt_mentions_bank() {
        let settings = test_settings();
        let prompt = settings.system_prompt();

        assert!(prompt.contains("Demo Bank"));
        assert!(prompt.contains("banking assistant"));
    }
}
