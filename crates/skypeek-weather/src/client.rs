use reqwest::Client;
use serde::de::DeserializeOwned;
use skypeek_core::ReqwestErrorExt;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

use crate::types::{
    CitiesResponse, ErrorBody, HealthStatus, HistoryEntry, LastCity, Suggestion, WeatherError,
    WeatherReport,
};

/// HTTP client for the SkyPeek backend
#[derive(Debug, Clone)]
pub struct WeatherClient {
    base_url: Url,
    client: Arc<Client>,
}

impl WeatherClient {
    /// Create a client for `base_url`.
    ///
    /// `timeout` of `None` keeps reqwest's defaults (no overall request timeout).
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, WeatherError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| e.into_network_error())?;

        // Endpoints are joined relative to the base, which needs a trailing slash.
        let mut base_url = Url::parse(base_url)?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            base_url,
            client: Arc::new(client),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Current weather for a city.
    ///
    /// # Errors
    /// `WeatherError::Api` carries the server's `detail` message for non-2xx responses.
    pub async fn weather(&self, city: &str) -> Result<WeatherReport, WeatherError> {
        tracing::debug!("Fetching weather for {}", city);
        self.get_json("api/weather", &[("city", city)]).await
    }

    /// City name candidates for a partial query
    pub async fn suggest_cities(&self, query: &str) -> Result<Vec<Suggestion>, WeatherError> {
        tracing::debug!("Fetching city suggestions for {:?}", query);
        let response: CitiesResponse = self.get_json("api/cities", &[("q", query)]).await?;
        Ok(response.cities)
    }

    pub async fn last_city(&self) -> Result<LastCity, WeatherError> {
        self.get_json("api/last-city", &[]).await
    }

    /// Recent searches, in the order the server returns them
    pub async fn history(&self) -> Result<Vec<HistoryEntry>, WeatherError> {
        self.get_json("api/history", &[]).await
    }

    /// Liveness check; served at the backend root rather than under `api/`
    pub async fn health(&self) -> Result<HealthStatus, WeatherError> {
        self.get_json("health", &[]).await
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, &str)],
    ) -> Result<T, WeatherError> {
        let url = self.base_url.join(endpoint)?;
        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| e.into_network_error())?;

        let response = Self::check_response(response).await?;
        let body = response.text().await.map_err(|e| e.into_network_error())?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::warn!("Unexpected body from {}: {}", endpoint, e);
            WeatherError::Parse(e.to_string())
        })
    }

    /// Check response status and extract the server's `detail` message
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, WeatherError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let detail = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .map(|b| b.detail)
            .filter(|d| !d.trim().is_empty());
        tracing::debug!("Backend returned {}: {}", status, body);

        Err(WeatherError::Api {
            status: status.as_u16(),
            detail,
        })
    }
}
