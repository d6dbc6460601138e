//! Text rendering of a [`WidgetView`].
//!
//! Everything here is a pure function of its inputs; the current time is
//! passed in so relative timestamps are reproducible.

use std::fmt::Display;

use chrono::{DateTime, Local, TimeZone, Utc};
use skypeek_weather::{HistoryEntry, WeatherReport};

use crate::locale;
use crate::view::{DropdownItem, LastCityBanner, ResultPanel, WidgetView};

/// Keyword → emoji, checked in order against the lowercased description.
/// More specific phrases come before the generic ones they contain.
const CONDITION_EMOJI: &[(&str, &str)] = &[
    ("гроз", "⛈️"),
    ("thunder", "⛈️"),
    ("снег", "❄️"),
    ("snow", "❄️"),
    ("морос", "🌦️"),
    ("drizzle", "🌦️"),
    ("ливень", "🌧️"),
    ("дожд", "🌧️"),
    ("rain", "🌧️"),
    ("туман", "🌫️"),
    ("изморозь", "🌫️"),
    ("fog", "🌫️"),
    ("mist", "🌫️"),
    ("пасмурно", "☁️"),
    ("overcast", "☁️"),
    ("переменная", "⛅"),
    ("небольшая облачность", "🌤️"),
    ("облач", "☁️"),
    ("cloud", "☁️"),
    ("ясно", "☀️"),
    ("clear", "☀️"),
    ("солн", "☀️"),
    ("sun", "☀️"),
];

const DEFAULT_EMOJI: &str = "🌡️";

pub fn condition_emoji(description: &str) -> &'static str {
    let lowered = description.to_lowercase();
    CONDITION_EMOJI
        .iter()
        .find(|&&(keyword, _)| lowered.contains(keyword))
        .map_or(DEFAULT_EMOJI, |&(_, emoji)| emoji)
}

/// Coarse relative time; timestamps in the future count as "just now"
pub fn time_ago(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(then);
    let minutes = elapsed.num_minutes();
    if minutes < 1 {
        locale::JUST_NOW.to_string()
    } else if minutes < 60 {
        locale::minutes_ago(minutes)
    } else if elapsed.num_hours() < 24 {
        locale::hours_ago(elapsed.num_hours())
    } else {
        locale::days_ago(elapsed.num_days())
    }
}

/// Wall-clock `HH:MM` of `at` in `tz`
pub fn clock_time<Tz: TimeZone>(at: DateTime<Utc>, tz: &Tz) -> String
where
    Tz::Offset: Display,
{
    at.with_timezone(tz).format("%H:%M").to_string()
}

/// The update time is shown in the machine's local zone
pub fn weather_card(report: &WeatherReport) -> String {
    format!(
        "{emoji} {city}\n{temp:.1}°C ({feels} {feels_like:.1}°C)\n{description}\n\
         {humidity_label}: {humidity}%\n{wind_label}: {wind:.1} {wind_unit}\n{updated}: {time}",
        emoji = condition_emoji(&report.description),
        city = report.city,
        temp = report.temperature,
        feels = locale::FEELS_LIKE,
        feels_like = report.feels_like,
        description = report.description,
        humidity_label = locale::HUMIDITY,
        humidity = report.humidity,
        wind_label = locale::WIND,
        wind = report.wind_speed,
        wind_unit = locale::WIND_UNIT,
        updated = locale::UPDATED,
        time = clock_time(report.timestamp, &Local),
    )
}

pub fn error_panel(message: &str, hint: &str) -> String {
    format!("❌ {message}\n{hint}")
}

pub fn dropdown(items: &[DropdownItem]) -> String {
    items
        .iter()
        .map(|item| {
            let marker = if item.highlighted { ">" } else { " " };
            format!("{marker} {} · {}", item.name, item.label())
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn history_list(entries: &[HistoryEntry], now: DateTime<Utc>) -> String {
    let mut out = format!("{}:", locale::RECENT_SEARCHES);
    for entry in entries {
        out.push_str(&format!(
            "\n{} {} {:.1}°C, {} ({})",
            condition_emoji(&entry.description),
            entry.city,
            entry.temperature,
            entry.description,
            time_ago(entry.searched_at, now),
        ));
    }
    out
}

pub fn last_city_banner(banner: &LastCityBanner, now: DateTime<Utc>) -> String {
    match banner.searched_at {
        Some(at) => format!("{}: {} ({})", locale::LAST_CITY, banner.city, time_ago(at, now)),
        None => format!("{}: {}", locale::LAST_CITY, banner.city),
    }
}

/// Render the whole widget; sections with nothing to show are omitted
pub fn render(view: &WidgetView, now: DateTime<Utc>) -> String {
    let mut sections = Vec::new();

    if let Some(banner) = &view.last_city {
        sections.push(last_city_banner(banner, now));
    }

    sections.push(format!("🔍 {}", view.query));
    if view.dropdown_open() {
        sections.push(dropdown(&view.dropdown));
    }

    match &view.result {
        ResultPanel::Empty => {}
        ResultPanel::Validation(message) => sections.push(format!("⚠️ {message}")),
        ResultPanel::Loading(_) => sections.push(locale::LOADING.to_string()),
        ResultPanel::Weather(report) => sections.push(weather_card(report)),
        ResultPanel::Error { message, hint } => sections.push(error_panel(message, hint)),
    }

    if !view.history.is_empty() {
        sections.push(history_list(&view.history, now));
    }

    sections.join("\n\n")
}
