//! Nominatim reverse-geocoding client.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use itinerary_core::GeoPoint;

use crate::{Geocoder, ProviderError};

pub struct NominatimClient {
    client: Client,
    base_url: String,
    language: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ReverseResponse {
    display_name: Option<String>,
    /// Set instead of `display_name` when nothing is found ("Unable to geocode").
    error: Option<String>,
}

impl NominatimClient {
    /// Nominatim's usage policy requires an identifying user agent.
    pub fn new(
        base_url: impl Into<String>,
        user_agent: &str,
        language: Option<String>,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            language: language.filter(|value| !value.trim().is_empty()),
        })
    }
}

#[async_trait]
impl Geocoder for NominatimClient {
    async fn reverse_geocode(&self, position: GeoPoint) -> Result<String, ProviderError> {
        let url = format!("{}/reverse", self.base_url);
        let mut query = vec![
            ("format", "jsonv2".to_string()),
            ("lat", position.lat.to_string()),
            ("lon", position.lon.to_string()),
            ("zoom", "18".to_string()),
        ];
        if let Some(language) = self.language.as_deref() {
            query.push(("accept-language", language.to_string()));
        }

        let response = self.client.get(&url).query(&query).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        let body: ReverseResponse = response.json().await?;
        if let Some(error) = body.error {
            tracing::debug!("No address for {}: {}", position, error);
        }
        Ok(body.display_name.unwrap_or_default())
    }
}
