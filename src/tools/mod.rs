//! Closed tool set exposed to the model
//!
//! Tool invocations are a tagged union with typed argument records,
//! parsed from the model's (name, JSON arguments) pairs and executed by
//! matching on the union. The declarations passed to the model come from
//! the same closed set, so the model can never name an operation the
//! executor does not match on.

use crate::error::AssistantError;
use crate::faq::FaqIndex;
use crate::models::ToolSpec;
use crate::services::{time, ExchangeClient, WeatherClient};
use crate::Result;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

/// Reply for FAQ queries nothing in the table answers.
const FAQ_FALLBACK: &str = "I couldn't find specific information for that question. \
     Please contact the bank's support team for detailed assistance.";

/// One tool invocation with its typed arguments.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolRequest {
    GetTime { timezone: Option<String> },
    GetDate,
    GetWeather { city: String },
    GetExchangeRates,
    ConvertCurrency { amount: f64, from: String, to: String },
    SearchBankingFaq { query: String },
}

#[derive(Deserialize)]
struct TimeArgs {
    timezone: Option<String>,
}

#[derive(Deserialize)]
struct WeatherArgs {
    city: String,
}

#[derive(Deserialize)]
struct ConvertArgs {
    amount: f64,
    from_currency: String,
    to_currency: String,
}

#[derive(Deserialize)]
struct FaqArgs {
    query: String,
}

impl ToolRequest {
    /// Parse a model-requested call. `arguments` is the JSON-encoded
    /// argument object from the wire; an empty string means no arguments.
    pub fn parse(name: &str, arguments: &str) -> Result<Self> {
        let raw = if arguments.trim().is_empty() {
            "{}"
        } else {
            arguments
        };

        let invalid = |e: serde_json::Error| {
            AssistantError::InvalidToolInput(format!("{}: {}", name, e))
        };

        match name {
            "get_time" => {
                let args: TimeArgs = serde_json::from_str(raw).map_err(invalid)?;
                Ok(ToolRequest::GetTime {
                    timezone: args.timezone,
                })
            }
            "get_date" => Ok(ToolRequest::GetDate),
            "get_weather" => {
                let args: WeatherArgs = serde_json::from_str(raw).map_err(invalid)?;
                Ok(ToolRequest::GetWeather { city: args.city })
            }
            "get_exchange_rates" => Ok(ToolRequest::GetExchangeRates),
            "convert_currency" => {
                let args: ConvertArgs = serde_json::from_str(raw).map_err(invalid)?;
                Ok(ToolRequest::ConvertCurrency {
                    amount: args.amount,
                    from: args.from_currency,
                    to: args.to_currency,
                })
            }
            "search_banking_faq" => {
                let args: FaqArgs = serde_json::from_str(raw).map_err(invalid)?;
                Ok(ToolRequest::SearchBankingFaq { query: args.query })
            }
            other => Err(AssistantError::UnknownTool(other.to_string())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ToolRequest::GetTime { .. } => "get_time",
            ToolRequest::GetDate => "get_date",
            ToolRequest::GetWeather { .. } => "get_weather",
            ToolRequest::GetExchangeRates => "get_exchange_rates",
            ToolRequest::ConvertCurrency { .. } => "convert_currency",
            ToolRequest::SearchBankingFaq { .. } => "search_banking_faq",
        }
    }

    /// Declarations for the whole tool set, sent with every completion
    /// request.
    pub fn specs() -> Vec<ToolSpec> {
        vec![
            ToolSpec::function(
                "get_time",
                "Get the current time and date, optionally for a timezone",
                json!({
                    "type": "object",
                    "properties": {
                        "timezone": {
                            "type": "string",
                            "description": "Timezone label, e.g. 'UTC' or 'Europe/Tbilisi'"
                        }
                    }
                }),
            ),
            ToolSpec::function(
                "get_date",
                "Get the current date",
                json!({ "type": "object", "properties": {} }),
            ),
            ToolSpec::function(
                "get_weather",
                "Get a short weather summary for a city",
                json!({
                    "type": "object",
                    "properties": {
                        "city": {
                            "type": "string",
                            "description": "City name, e.g. 'Tbilisi'"
                        }
                    },
                    "required": ["city"]
                }),
            ),
            ToolSpec::function(
                "get_exchange_rates",
                "Get current GEL exchange rates for common currencies",
                json!({ "type": "object", "properties": {} }),
            ),
            ToolSpec::function(
                "convert_currency",
                "Convert an amount between two currencies at the official rate",
                json!({
                    "type": "object",
                    "properties": {
                        "amount": {
                            "type": "number",
                            "description": "Amount to convert"
                        },
                        "from_currency": {
                            "type": "string",
                            "description": "Source currency code, e.g. GEL, USD, EUR"
                        },
                        "to_currency": {
                            "type": "string",
                            "description": "Target currency code, e.g. GEL, USD, EUR"
                        }
                    },
                    "required": ["amount", "from_currency", "to_currency"]
                }),
            ),
            ToolSpec::function(
                "search_banking_faq",
                "Search the banking FAQ for accounts, cards, loans and security questions",
                json!({
                    "type": "object",
                    "properties": {
                        "query": {
                            "type": "string",
                            "description": "A banking-related question"
                        }
                    },
                    "required": ["query"]
                }),
            ),
        ]
    }
}

/// Executes tool requests against the deterministic services.
///
/// Every execution yields a string for the model: service failures are
/// rendered as human-readable messages, never propagated.
pub struct Toolbox {
    weather: WeatherClient,
    exchange: ExchangeClient,
    faq: FaqIndex,
}

impl Toolbox {
    pub fn new() -> Self {
        Self {
            weather: WeatherClient::new(),
            exchange: ExchangeClient::new(),
            faq: FaqIndex::with_default_entries(),
        }
    }

    /// Parse and execute one model-requested call.
    pub async fn dispatch(&self, name: &str, arguments: &str) -> String {
        match ToolRequest::parse(name, arguments) {
            Ok(request) => self.execute(request).await,
            Err(e) => {
                warn!(tool = name, error = %e, "Tool call rejected");
                format!("Error running tool {}: {}", name, e)
            }
        }
    }

    /// Execute one tool request, always producing a reply string.
    pub async fn execute(&self, request: ToolRequest) -> String {
        let name = request.name();
        debug!(tool = name, "Executing tool");

        let result = match request {
            ToolRequest::GetTime { timezone } => Ok(time::current_time(timezone.as_deref())),
            ToolRequest::GetDate => Ok(time::current_date()),
            ToolRequest::GetWeather { city } => self.weather.current(&city).await,
            ToolRequest::GetExchangeRates => self.exchange.list_rates().await,
            ToolRequest::ConvertCurrency { amount, from, to } => {
                self.exchange.convert(amount, &from, &to).await
            }
            ToolRequest::SearchBankingFaq { query } => Ok(self.search_faq(&query)),
        };

        match result {
            Ok(reply) => reply,
            Err(e) => {
                warn!(tool = name, error = %e, "Tool execution failed");
                format!("Error running tool {}: {}", name, e)
            }
        }
    }

    fn search_faq(&self, query: &str) -> String {
        match self.faq.search(query) {
            Some(hit) => format!("Question: {}\nAnswer: {}", hit.question, hit.answer),
            None => FAQ_FALLBACK.to_string(),
        }
    }
}

impl Default for Toolbox {
    fn default() -> Self {
        Self::new()
    }
}
