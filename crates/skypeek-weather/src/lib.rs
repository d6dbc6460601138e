//! Weather backend access for SkyPeek
//!
//! Typed client for the SkyPeek HTTP API (weather lookup, city suggestions,
//! last searched city, search history) and the traits the widget consumes.

pub mod client;
pub mod source;
pub mod types;

pub use client::WeatherClient;
pub use source::{SuggestionSource, WeatherBackend};
pub use types::*;
