use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use skypeek_core::NetworkError;

/// Where a city suggestion came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum SuggestionOrigin {
    /// The user searched this city before
    History,
    /// Found by the external geocoding lookup
    External,
}

impl From<String> for SuggestionOrigin {
    /// Only `"history"` is special; the backend reports any other provenance as-is.
    fn from(value: String) -> Self {
        if value.eq_ignore_ascii_case("history") {
            Self::History
        } else {
            Self::External
        }
    }
}

/// A candidate city name for a partial query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub name: String,
    pub source: SuggestionOrigin,
}

impl Suggestion {
    pub fn new(name: impl Into<String>, source: SuggestionOrigin) -> Self {
        Self {
            name: name.into(),
            source,
        }
    }
}

/// Body of `GET /api/cities`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CitiesResponse {
    #[serde(default)]
    pub cities: Vec<Suggestion>,
}

/// Current conditions for one city, as returned by `GET /api/weather`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    pub city: String,
    pub temperature: f64,
    pub feels_like: f64,
    pub description: String,
    pub humidity: u8,
    pub wind_speed: f64,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub timestamp: DateTime<Utc>,
}

/// Body of `GET /api/last-city`; both fields are absent for a fresh session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LastCity {
    #[serde(default)]
    pub last_city: Option<String>,
    #[serde(default, deserialize_with = "timestamp::deserialize_opt")]
    pub searched_at: Option<DateTime<Utc>>,
}

/// One row of `GET /api/history`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub city: String,
    pub temperature: f64,
    pub description: String,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub searched_at: DateTime<Utc>,
}

/// Body of `GET /health`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub service: String,
}

/// Error body the backend sends with non-2xx responses
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ErrorBody {
    pub detail: String,
}

/// Weather API errors
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),
    #[error("API error ({status}): {}", .detail.as_deref().unwrap_or("no detail"))]
    Api { status: u16, detail: Option<String> },
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl WeatherError {
    /// The message the server supplied with a failed response, if any
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Api { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }

    /// Fallback text for the error panel when the server gave no detail
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Network(e) => e.user_message(),
            Self::Api { status: 404, .. } => "Город не найден.",
            Self::Api { status, .. } if *status >= 500 => {
                "Сервис погоды временно недоступен. Попробуйте позже."
            }
            Self::Api { .. } => "Не удалось получить прогноз погоды.",
            Self::Parse(_) => "Получен некорректный ответ сервера.",
            Self::InvalidUrl(_) => "Некорректный адрес сервера.",
        }
    }
}

/// The backend writes naive ISO 8601 datetimes; those are taken as UTC.
pub(crate) mod timestamp {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer};

    pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
            .ok()
            .map(|naive| naive.and_utc())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {raw}")))
    }

    pub fn deserialize_opt<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            Some(raw) => parse(&raw)
                .map(Some)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {raw}"))),
            None => Ok(None),
        }
    }
}
