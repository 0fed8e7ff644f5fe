//! One-line weather summaries from a wttr.in-style service

use super::{check_status, http_client, ExternalServiceError};
use async_trait::async_trait;

/// Default weather service
pub const DEFAULT_BASE_URL: &str = "https://wttr.in";

const SERVICE: &str = "Weather";

/// Produces a short human-readable forecast for a location
#[async_trait]
pub trait WeatherSource: Send + Sync {
    async fn summary(&self, location: &str) -> Result<String, ExternalServiceError>;
}

/// `GET {base}/{location}?format=3`
#[derive(Debug)]
pub struct WttrWeather {
    client: reqwest::Client,
    base_url: String,
}

impl WttrWeather {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ExternalServiceError> {
        Ok(Self {
            client: http_client()?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl WeatherSource for WttrWeather {
    async fn summary(&self, location: &str) -> Result<String, ExternalServiceError> {
        let url = format!("{}/{}", self.base_url, location.trim().replace(' ', "+"));

        let response = self
            .client
            .get(url)
            .query(&[("format", "3")])
            .send()
            .await?;

        let text = check_status(SERVICE, response).await?.text().await?;
        let text = text.trim();

        if text.is_empty() {
            return Err(ExternalServiceError::InvalidResponse {
                service: SERVICE,
                reason: "empty forecast".to_string(),
            });
        }

        Ok(text.to_string())
    }
}
