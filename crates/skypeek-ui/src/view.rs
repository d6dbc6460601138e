//! Plain-data snapshot of everything the widget shows.

use chrono::{DateTime, Utc};
use skypeek_weather::{HistoryEntry, SuggestionOrigin, WeatherReport};

use crate::locale;

/// One row of the suggestion dropdown
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropdownItem {
    pub name: String,
    pub origin: SuggestionOrigin,
    pub highlighted: bool,
}

impl DropdownItem {
    pub fn label(&self) -> &'static str {
        locale::origin_label(self.origin)
    }
}

/// What the result area below the search form currently shows
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ResultPanel {
    #[default]
    Empty,
    /// Inline validation message; no request was made
    Validation(String),
    /// A lookup for this city is in flight
    Loading(String),
    Weather(WeatherReport),
    Error {
        message: String,
        hint: &'static str,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LastCityBanner {
    pub city: String,
    pub searched_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WidgetView {
    pub query: String,
    pub dropdown: Vec<DropdownItem>,
    pub result: ResultPanel,
    /// Recent searches in server order
    pub history: Vec<HistoryEntry>,
    pub last_city: Option<LastCityBanner>,
}

impl WidgetView {
    pub fn dropdown_open(&self) -> bool {
        !self.dropdown.is_empty()
    }

    pub fn highlighted(&self) -> Option<&DropdownItem> {
        self.dropdown.iter().find(|item| item.highlighted)
    }
}
