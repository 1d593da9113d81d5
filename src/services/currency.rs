//! Exchange rates and currency conversion
//!
//! Rates come from the free exchangerate-api endpoint, keyed by base
//! currency. Conversion between two non-GEL currencies chains two
//! lookups through a GEL intermediate amount.

use crate::error::AssistantError;
use crate::Result;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

const EXCHANGE_URL: &str = "https://api.exchangerate-api.com/v4/latest";

/// The lari is the pivot for every conversion.
pub const BASE_CURRENCY: &str = "GEL";

/// Currencies shown in the rate listing.
const COMMON_CURRENCIES: &[&str] = &["USD", "EUR", "GBP", "TRY", "RUB"];

/// Exchange-rate lookup client (connection-pooled).
pub struct ExchangeClient {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct RatesResponse {
    rates: HashMap<String, f64>,
}

impl ExchangeClient {
    pub fn new() -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: EXCHANGE_URL.to_string(),
        }
    }

    /// Point the client at a non-default endpoint (proxies, testing).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Rate table for one base currency.
    async fn rates_for(&self, base: &str) -> Result<HashMap<String, f64>> {
        let url = format!("{}/{}", self.base_url, base);
        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(AssistantError::ToolError(format!(
                "Could not fetch exchange rates for {}",
                base
            )));
        }

        let parsed: RatesResponse = response.json().await?;
        if parsed.rates.is_empty() {
            return Err(AssistantError::ToolError(format!(
                "No exchange rates found for {}",
                base
            )));
        }

        debug!(base, rate_count = parsed.rates.len(), "Exchange rates fetched");

        Ok(parsed.rates)
    }

    /// Formatted listing of GEL rates for the common currencies.
    pub async fn list_rates(&self) -> Result<String> {
        let rates = self.rates_for(BASE_CURRENCY).await?;

        let lines: Vec<String> = COMMON_CURRENCIES
            .iter()
            .filter_map(|currency| {
                rates
                    .get(*currency)
                    .map(|rate| format!("1 {} = {:.4} {}", BASE_CURRENCY, rate, currency))
            })
            .collect();

        if lines.is_empty() {
            return Err(AssistantError::ToolError(
                "Exchange rates not available".to_string(),
            ));
        }

        Ok(format!("Current exchange rates:\n{}", lines.join("\n")))
    }

    /// Convert between two currencies. Conversions touching GEL need a
    /// single lookup; cross conversions go source→GEL→target.
    pub async fn convert(&self, amount: f64, from: &str, to: &str) -> Result<String> {
        let from = from.trim().to_uppercase();
        let to = to.trim().to_uppercase();

        if from.is_empty() || to.is_empty() {
            return Err(AssistantError::InvalidToolInput(
                "Both source and target currencies are required".to_string(),
            ));
        }

        let converted = if from == BASE_CURRENCY {
            let rates = self.rates_for(BASE_CURRENCY).await?;
            amount * rate_from(&rates, BASE_CURRENCY, &to)?
        } else if to == BASE_CURRENCY {
            let rates = self.rates_for(&from).await?;
            amount * rate_from(&rates, &from, BASE_CURRENCY)?
        } else {
            // Two chained lookups through the GEL intermediate amount.
            let source_rates = self.rates_for(&from).await?;
            let intermediate = amount * rate_from(&source_rates, &from, BASE_CURRENCY)?;

            let base_rates = self.rates_for(BASE_CURRENCY).await?;
            intermediate * rate_from(&base_rates, BASE_CURRENCY, &to)?
        };

        Ok(format_conversion(amount, &from, converted, &to))
    }
}

impl Default for ExchangeClient {
    fn default() -> Self {
        Self::new()
    }
}

fn rate_from(rates: &HashMap<String, f64>, from: &str, to: &str) -> Result<f64> {
    rates.get(to).copied().ok_or_else(|| {
        AssistantError::ToolError(format!("Rate not found for {} to {}", from, to))
    })
}

fn format_conversion(amount: f64, from: &str, converted: f64, to: &str) -> String {
    format!("{} {} = {:.2} {}", amount, from, converted, to)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn rates(pairs: &[(&str, f64)]) -> HashMap<String, f64> {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    /// Local endpoint serving a canned rate table per base-currency path,
    /// one request per connection.
    async fn spawn_rates_stub() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            loop {
                let Ok((mut socket, _)) = listener.accept().await else {
                    return;
                };
                tokio::spawn(async move {
                    let mut buf = [0u8; 512];
                    let n = socket.read(&mut buf).await.unwrap_or(0);
                    let request = String::from_utf8_lossy(&buf[..n]).into_owned();

                    let body = if request.starts_with("GET /GEL") {
                        r#"{"base":"GEL","rates":{"USD":0.37,"EUR":0.34}}"#
                    } else if request.starts_with("GET /USD") {
                        r#"{"base":"USD","rates":{"GEL":2.70}}"#
                    } else {
                        r#"{"base":"???","rates":{}}"#
                    };

                    let response = format!(
                        "HTTP/1.1 200 OK\r\n\
                         content-type: application/json\r\n\
                         content-length: {}\r\n\
                         connection: close\r\n\r\n{}",
                        body.len(),
                        body
                    );
                    let _ = socket.write_all(response.as_bytes()).await;
                });
            }
        });

        format!("http://{}", addr)
    }

    #[test]
    fn test_rate_lookup() {
        let table = rates(&[("USD", 0.37), ("EUR", 0.34)]);

        assert_eq!(rate_from(&table, "GEL", "USD").unwrap(), 0.37);
        assert!(rate_from(&table, "GEL", "JPY").is_err());
    }

    #[tokio::test]
    async fn test_convert_from_base_uses_single_lookup() {
        let client = ExchangeClient::new().with_base_url(spawn_rates_stub().await);

        let reply = client.convert(100.0, "gel", "usd").await.unwrap();
        assert_eq!(reply, "100 GEL = 37.00 USD");
    }

    #[tokio::test]
    async fn test_convert_to_base_uses_source_table() {
        let client = ExchangeClient::new().with_base_url(spawn_rates_stub().await);

        let reply = client.convert(100.0, "USD", "GEL").await.unwrap();
        assert_eq!(reply, "100 USD = 270.00 GEL");
    }

    #[tokio::test]
    async fn test_cross_conversion_chains_two_lookups() {
        let client = ExchangeClient::new().with_base_url(spawn_rates_stub().await);

        // USD → GEL → EUR: 100 × 2.70 × 0.34.
        let reply = client.convert(100.0, "USD", "EUR").await.unwrap();
        assert_eq!(reply, "100 USD = 91.80 EUR");
    }

    #[tokio::test]
    async fn test_convert_missing_target_rate_is_an_error() {
        let client = ExchangeClient::new().with_base_url(spawn_rates_stub().await);

        let err = client.convert(100.0, "GEL", "JPY").await.unwrap_err();
        assert!(err.to_string().contains("JPY"));
    }

    #[test]
    fn test_conversion_formatting() {
        let formatted = format_conversion(100.0, "USD", 91.8, "EUR");
        assert_eq!(formatted, "100 USD = 91.80 EUR");
    }

    #[test]
    fn test_rates_response_parsing() {
        let json = r#"{"base":"GEL","rates":{"USD":0.37,"EUR":0.34}}"#;
        let parsed: RatesResponse = serde_json::from_str(json).unwrap();

        assert_eq!(parsed.rates.len(), 2);
        assert_eq!(parsed.rates["USD"], 0.37);
    }
}
