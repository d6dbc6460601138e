//! User-facing strings. The widget ships a single hardcoded locale.

use skypeek_weather::SuggestionOrigin;

pub const EMPTY_CITY: &str = "Пожалуйста, введите название города";
pub const LOADING: &str = "Загрузка прогноза погоды...";
pub const ERROR_HINT: &str = "Проверьте название города и попробуйте снова";

pub const FROM_HISTORY: &str = "Из истории";
pub const FOUND: &str = "Найден";

pub const FEELS_LIKE: &str = "ощущается как";
pub const HUMIDITY: &str = "Влажность";
pub const WIND: &str = "Ветер";
pub const WIND_UNIT: &str = "м/с";
pub const UPDATED: &str = "Обновлено";

pub const RECENT_SEARCHES: &str = "Недавние поиски";
pub const LAST_CITY: &str = "Последний город";

pub const JUST_NOW: &str = "только что";

pub fn minutes_ago(n: i64) -> String {
    format!("{n} мин. назад")
}

pub fn hours_ago(n: i64) -> String {
    format!("{n} ч. назад")
}

pub fn days_ago(n: i64) -> String {
    format!("{n} дн. назад")
}

/// Dropdown label for a suggestion's provenance
pub fn origin_label(origin: SuggestionOrigin) -> &'static str {
    match origin {
        SuggestionOrigin::History => FROM_HISTORY,
        SuggestionOrigin::External => FOUND,
    }
}
