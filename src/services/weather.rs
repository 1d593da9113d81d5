//! Weather lookup via the free Open-Meteo endpoints
//!
//! Two chained calls: geocode the city name to coordinates, then fetch
//! current conditions. No API key required.

use crate::error::AssistantError;
use crate::Result;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

const GEOCODE_URL: &str = "https://geocoding-api.open-meteo.com/v1/search";
const FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";

/// Weather lookup client (connection-pooled).
pub struct WeatherClient {
    client: Client,
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    results: Option<Vec<GeocodeResult>>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    latitude: f64,
    longitude: f64,
    name: Option<String>,
    country: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    current_weather: Option<CurrentWeather>,
}

#[derive(Debug, Deserialize)]
struct CurrentWeather {
    temperature: Option<f64>,
    windspeed: Option<f64>,
    weathercode: Option<i64>,
}

impl WeatherClient {
    pub fn new() -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to build HTTP client");

        Self { client }
    }

    /// Short textual summary of current conditions for a city.
    pub async fn current(&self, city: &str) -> Result<String> {
        let city = city.trim();
        if city.is_empty() {
            return Err(AssistantError::InvalidToolInput(
                "Please provide a city name".to_string(),
            ));
        }

        let location = self.geocode(city).await?;
        let resolved_name = location.name.clone().unwrap_or_else(|| city.to_string());

        debug!(
            city = %resolved_name,
            latitude = location.latitude,
            longitude = location.longitude,
            "City geocoded"
        );

        let response = self
            .client
            .get(FORECAST_URL)
            .query(&[
                ("latitude", location.latitude.to_string()),
                ("longitude", location.longitude.to_string()),
                ("current_weather", "true".to_string()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AssistantError::ToolError(format!(
                "Could not get weather for {}",
                resolved_name
            )));
        }

        let forecast: ForecastResponse = response.json().await?;
        let current = forecast.current_weather.ok_or_else(|| {
            AssistantError::ToolError(format!("No weather data for {}", resolved_name))
        })?;

        let location_label = match location.country.as_deref() {
            Some(country) if !country.is_empty() => {
                format!("{}, {}", resolved_name, country)
            }
            _ => resolved_name,
        };

        let mut parts = Vec::new();
        if let Some(temperature) = current.temperature {
            parts.push(format!("{:.1}°C", temperature));
        }
        if let Some(windspeed) = current.windspeed {
            parts.push(format!("wind {:.0} km/h", windspeed));
        }
        if let Some(code) = current.weathercode {
            parts.push(format!("code {}", code));
        }

        let details = if parts.is_empty() {
            "unavailable".to_string()
        } else {
            parts.join(", ")
        };

        Ok(format!("Weather in {}: {}", location_label, details))
    }

    async fn geocode(&self, city: &str) -> Result<GeocodeResult> {
        let response = self
            .client
            .get(GEOCODE_URL)
            .query(&[
                ("name", city),
                ("count", "1"),
                ("language", "en"),
                ("format", "json"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AssistantError::ToolError(format!(
                "Could not fetch geocoding for {}",
                city
            )));
        }

        let geocode: GeocodeResponse = response.json().await?;

        geocode
            .results
            .and_then(|mut results| {
                if results.is_empty() {
                    None
                } else {
                    Some(results.remove(0))
                }
            })
            .ok_or_else(|| {
                AssistantError::ToolError(format!("Location not found: {}", city))
            })
    }
}

impl Default for WeatherClient {
    fn default() -> Self {
        Self::new()
    }
}
