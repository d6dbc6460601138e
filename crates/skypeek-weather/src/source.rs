//! Collaborator traits consumed by the widget.
//!
//! The widget only sees these seams, so it can be driven in tests by
//! in-memory fakes instead of a live backend.

use async_trait::async_trait;

use crate::client::WeatherClient;
use crate::types::{HistoryEntry, LastCity, Suggestion, WeatherError, WeatherReport};

/// Ranked city-name candidates for a partial query.
#[async_trait]
pub trait SuggestionSource: Send + Sync {
    async fn suggest(&self, query: &str) -> Result<Vec<Suggestion>, WeatherError>;
}

/// Weather lookups plus the read-only history the backend keeps for us.
#[async_trait]
pub trait WeatherBackend: Send + Sync {
    async fn weather(&self, city: &str) -> Result<WeatherReport, WeatherError>;

    async fn history(&self) -> Result<Vec<HistoryEntry>, WeatherError>;

    async fn last_city(&self) -> Result<LastCity, WeatherError>;
}

#[async_trait]
impl SuggestionSource for WeatherClient {
    async fn suggest(&self, query: &str) -> Result<Vec<Suggestion>, WeatherError> {
        self.suggest_cities(query).await
    }
}

#[async_trait]
impl WeatherBackend for WeatherClient {
    async fn weather(&self, city: &str) -> Result<WeatherReport, WeatherError> {
        WeatherClient::weather(self, city).await
    }

    async fn history(&self) -> Result<Vec<HistoryEntry>, WeatherError> {
        WeatherClient::history(self).await
    }

    async fn last_city(&self) -> Result<LastCity, WeatherError> {
        WeatherClient::last_city(self).await
    }
}
