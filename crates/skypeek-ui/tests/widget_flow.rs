//! End-to-end widget behaviour against an in-memory backend.
//!
//! All tests run on tokio's paused clock, so debounce periods and simulated
//! network latency elapse instantly and deterministically.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use parking_lot::Mutex;
use skypeek_ui::locale;
use skypeek_ui::{
    AutocompleteSettings, ClickTarget, Key, ResultPanel, WeatherWidget, WidgetEvent, WidgetHandle,
    WidgetView,
};
use skypeek_weather::{
    HistoryEntry, LastCity, Suggestion, SuggestionOrigin, SuggestionSource, WeatherBackend,
    WeatherError, WeatherReport,
};

#[derive(Default)]
struct FakeBackend {
    /// Per-query response delay and candidates
    cities: HashMap<String, (Duration, Vec<Suggestion>)>,
    suggest_fails: bool,
    /// When set, every weather lookup fails with 404 and this detail
    not_found: Option<String>,
    /// Delay in ms and city for each successive history call; later calls get an instant default
    history_script: Vec<(u64, &'static str)>,
    suggest_calls: Mutex<Vec<String>>,
    weather_calls: Mutex<Vec<String>>,
    history_calls: Mutex<usize>,
}

impl FakeBackend {
    fn with_city(mut self, query: &str, delay_ms: u64, names: &[(&str, SuggestionOrigin)]) -> Self {
        let list = names
            .iter()
            .map(|(name, origin)| Suggestion::new(*name, *origin))
            .collect();
        self.cities
            .insert(query.to_string(), (Duration::from_millis(delay_ms), list));
        self
    }

    fn suggest_calls(&self) -> Vec<String> {
        self.suggest_calls.lock().clone()
    }

    fn weather_calls(&self) -> Vec<String> {
        self.weather_calls.lock().clone()
    }

    fn history_calls(&self) -> usize {
        *self.history_calls.lock()
    }
}

#[async_trait]
impl SuggestionSource for FakeBackend {
    async fn suggest(&self, query: &str) -> Result<Vec<Suggestion>, WeatherError> {
        self.suggest_calls.lock().push(query.to_string());
        if self.suggest_fails {
            return Err(WeatherError::Api {
                status: 503,
                detail: None,
            });
        }
        let (delay, list) = self.cities.get(query).cloned().unwrap_or_default();
        tokio::time::sleep(delay).await;
        Ok(list)
    }
}

#[async_trait]
impl WeatherBackend for FakeBackend {
    async fn weather(&self, city: &str) -> Result<WeatherReport, WeatherError> {
        self.weather_calls.lock().push(city.to_string());
        if let Some(detail) = &self.not_found {
            return Err(WeatherError::Api {
                status: 404,
                detail: Some(detail.clone()),
            });
        }
        Ok(WeatherReport {
            city: city.to_string(),
            temperature: -3.0,
            feels_like: -8.5,
            description: "Небольшой снег".into(),
            humidity: 80,
            wind_speed: 4.0,
            timestamp: Utc.with_ymd_and_hms(2026, 1, 30, 12, 0, 0).unwrap(),
        })
    }

    async fn history(&self) -> Result<Vec<HistoryEntry>, WeatherError> {
        let call = {
            let mut calls = self.history_calls.lock();
            *calls += 1;
            *calls - 1
        };
        let (delay_ms, city) = self
            .history_script
            .get(call)
            .copied()
            .unwrap_or((0, "Казань"));
        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
        Ok(vec![HistoryEntry {
            city: city.into(),
            temperature: -10.0,
            description: "Ясно".into(),
            searched_at: Utc.with_ymd_and_hms(2026, 1, 30, 9, 0, 0).unwrap(),
        }])
    }

    async fn last_city(&self) -> Result<LastCity, WeatherError> {
        Ok(LastCity {
            last_city: Some("Казань".into()),
            searched_at: None,
        })
    }
}

fn start(backend: &Arc<FakeBackend>) -> WidgetHandle {
    let (widget, handle) = WeatherWidget::new(
        AutocompleteSettings::default(),
        backend.clone(),
        backend.clone(),
    );
    tokio::spawn(widget.run());
    handle
}

async fn wait_for(handle: &WidgetHandle, pred: impl FnMut(&WidgetView) -> bool) -> WidgetView {
    let mut rx = handle.subscribe();
    let view = tokio::time::timeout(Duration::from_secs(30), rx.wait_for(pred))
        .await
        .expect("timed out waiting for view")
        .expect("widget stopped")
        .clone();
    view
}

async fn send(handle: &WidgetHandle, event: WidgetEvent) {
    handle.send(event).await.unwrap();
}

fn moscow_backend() -> FakeBackend {
    FakeBackend::default().with_city("mo", 0, &[("Moscow", SuggestionOrigin::External)])
}

#[tokio::test(start_paused = true)]
async fn test_keyboard_pick_triggers_search() {
    let backend = Arc::new(moscow_backend());
    let handle = start(&backend);
    let started = tokio::time::Instant::now();

    send(&handle, WidgetEvent::InputChanged("mo".into())).await;
    let view = wait_for(&handle, WidgetView::dropdown_open).await;

    assert!(started.elapsed() >= Duration::from_millis(300));
    assert_eq!(view.dropdown.len(), 1);
    assert_eq!(view.dropdown[0].name, "Moscow");
    assert_eq!(view.dropdown[0].label(), locale::FOUND);

    send(&handle, WidgetEvent::KeyDown(Key::ArrowDown)).await;
    send(&handle, WidgetEvent::KeyDown(Key::Enter)).await;
    let view = wait_for(&handle, |v| matches!(v.result, ResultPanel::Weather(_))).await;

    assert_eq!(view.query, "Moscow");
    assert!(!view.dropdown_open());
    assert_eq!(backend.weather_calls(), ["Moscow"]);
    assert_eq!(backend.suggest_calls(), ["mo"]);
}

#[tokio::test(start_paused = true)]
async fn test_keystroke_burst_issues_single_request() {
    let backend = Arc::new(
        FakeBackend::default().with_city("mosc", 0, &[("Moscow", SuggestionOrigin::History)]),
    );
    let handle = start(&backend);

    for text in ["m", "mo", "mos", "mosc"] {
        send(&handle, WidgetEvent::InputChanged(text.into())).await;
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    let view = wait_for(&handle, WidgetView::dropdown_open).await;

    assert_eq!(backend.suggest_calls(), ["mosc"]);
    assert_eq!(view.dropdown[0].label(), locale::FROM_HISTORY);
}

#[tokio::test(start_paused = true)]
async fn test_short_query_never_fetches() {
    let backend = Arc::new(moscow_backend());
    let handle = start(&backend);

    send(&handle, WidgetEvent::InputChanged(" m ".into())).await;
    tokio::time::sleep(Duration::from_secs(2)).await;

    assert!(backend.suggest_calls().is_empty());
    assert!(!handle.snapshot().dropdown_open());
    assert_eq!(handle.snapshot().query, " m ");
}

#[tokio::test(start_paused = true)]
async fn test_slow_stale_response_is_discarded() {
    let backend = Arc::new(
        FakeBackend::default()
            .with_city("mo", 500, &[("Montreal", SuggestionOrigin::External)])
            .with_city("mos", 10, &[("Moscow", SuggestionOrigin::External)]),
    );
    let handle = start(&backend);

    send(&handle, WidgetEvent::InputChanged("mo".into())).await;
    // Past the quiet period, so the "mo" request is already in flight.
    tokio::time::sleep(Duration::from_millis(350)).await;
    send(&handle, WidgetEvent::InputChanged("mos".into())).await;

    let view = wait_for(&handle, WidgetView::dropdown_open).await;
    assert_eq!(view.dropdown[0].name, "Moscow");

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(backend.suggest_calls(), ["mo", "mos"]);
    let view = handle.snapshot();
    assert_eq!(view.dropdown.len(), 1);
    assert_eq!(view.dropdown[0].name, "Moscow");
}

#[tokio::test(start_paused = true)]
async fn test_suggestion_failure_degrades_silently() {
    let backend = Arc::new(FakeBackend {
        suggest_fails: true,
        ..moscow_backend()
    });
    let handle = start(&backend);

    send(&handle, WidgetEvent::InputChanged("mo".into())).await;
    tokio::time::sleep(Duration::from_secs(2)).await;

    let view = handle.snapshot();
    assert_eq!(backend.suggest_calls(), ["mo"]);
    assert!(!view.dropdown_open());
    assert_eq!(view.result, ResultPanel::Empty);

    // Manual search still works.
    send(&handle, WidgetEvent::Submit).await;
    wait_for(&handle, |v| matches!(v.result, ResultPanel::Weather(_))).await;
    assert_eq!(backend.weather_calls(), ["mo"]);
}

#[tokio::test(start_paused = true)]
async fn test_empty_submit_shows_validation_without_request() {
    let backend = Arc::new(moscow_backend());
    let handle = start(&backend);

    send(&handle, WidgetEvent::InputChanged("   ".into())).await;
    send(&handle, WidgetEvent::Submit).await;
    let view = wait_for(&handle, |v| matches!(v.result, ResultPanel::Validation(_))).await;

    assert_eq!(view.result, ResultPanel::Validation(locale::EMPTY_CITY.into()));
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert!(backend.weather_calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_not_found_shows_detail_and_skips_history_refresh() {
    let backend = Arc::new(FakeBackend {
        not_found: Some("City not found".into()),
        ..FakeBackend::default()
    });
    let handle = start(&backend);
    wait_for(&handle, |v| !v.history.is_empty()).await;
    assert_eq!(backend.history_calls(), 1);

    send(&handle, WidgetEvent::InputChanged("Atlantis".into())).await;
    send(&handle, WidgetEvent::KeyDown(Key::Enter)).await;
    let view = wait_for(&handle, |v| matches!(v.result, ResultPanel::Error { .. })).await;

    assert_eq!(
        view.result,
        ResultPanel::Error {
            message: "City not found".into(),
            hint: locale::ERROR_HINT,
        }
    );
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(backend.history_calls(), 1);
    assert!(backend.suggest_calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_successful_search_refreshes_history() {
    let backend = Arc::new(moscow_backend());
    let handle = start(&backend);
    wait_for(&handle, |v| !v.history.is_empty()).await;

    send(&handle, WidgetEvent::InputChanged("Paris".into())).await;
    send(&handle, WidgetEvent::Submit).await;
    wait_for(&handle, |v| matches!(v.result, ResultPanel::Weather(_))).await;
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert_eq!(backend.weather_calls(), ["Paris"]);
    assert_eq!(backend.history_calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_slow_startup_history_cannot_replace_newer_list() {
    let backend = Arc::new(FakeBackend {
        history_script: vec![(1000, "Омск"), (10, "Paris")],
        ..moscow_backend()
    });
    let handle = start(&backend);

    send(&handle, WidgetEvent::InputChanged("Paris".into())).await;
    send(&handle, WidgetEvent::Submit).await;
    wait_for(&handle, |v| v.history.first().is_some_and(|e| e.city == "Paris")).await;

    // The startup refresh finishes last and must be ignored.
    tokio::time::sleep(Duration::from_secs(2)).await;

    assert_eq!(backend.history_calls(), 2);
    let view = handle.snapshot();
    assert_eq!(view.history.len(), 1);
    assert_eq!(view.history[0].city, "Paris");
}

#[tokio::test(start_paused = true)]
async fn test_startup_loads_last_city_and_history() {
    let backend = Arc::new(FakeBackend::default());
    let handle = start(&backend);

    let view = wait_for(&handle, |v| v.last_city.is_some() && !v.history.is_empty()).await;

    assert_eq!(view.last_city.unwrap().city, "Казань");
    assert_eq!(view.history[0].city, "Казань");
    assert_eq!(view.result, ResultPanel::Empty);
}

#[tokio::test(start_paused = true)]
async fn test_mouse_hover_and_click() {
    let backend = Arc::new(FakeBackend::default().with_city(
        "mo",
        0,
        &[
            ("Moscow", SuggestionOrigin::History),
            ("Montreal", SuggestionOrigin::External),
        ],
    ));
    let handle = start(&backend);

    send(&handle, WidgetEvent::InputChanged("mo".into())).await;
    wait_for(&handle, WidgetView::dropdown_open).await;

    send(&handle, WidgetEvent::SuggestionHover(1)).await;
    let view = wait_for(&handle, |v| v.highlighted().is_some()).await;
    assert_eq!(view.highlighted().unwrap().name, "Montreal");

    send(&handle, WidgetEvent::Click(ClickTarget::Dropdown)).await;
    send(&handle, WidgetEvent::SuggestionClick(1)).await;
    let view = wait_for(&handle, |v| matches!(v.result, ResultPanel::Weather(_))).await;

    assert_eq!(view.query, "Montreal");
    assert!(!view.dropdown_open());
    assert_eq!(backend.weather_calls(), ["Montreal"]);
}

#[tokio::test(start_paused = true)]
async fn test_outside_click_and_escape_close() {
    let backend = Arc::new(moscow_backend());
    let handle = start(&backend);

    send(&handle, WidgetEvent::InputChanged("mo".into())).await;
    wait_for(&handle, WidgetView::dropdown_open).await;
    send(&handle, WidgetEvent::Click(ClickTarget::Outside)).await;
    let view = wait_for(&handle, |v| !v.dropdown_open()).await;
    assert_eq!(view.query, "mo");

    send(&handle, WidgetEvent::InputChanged("mo ".into())).await;
    wait_for(&handle, WidgetView::dropdown_open).await;
    send(&handle, WidgetEvent::KeyDown(Key::Escape)).await;
    wait_for(&handle, |v| !v.dropdown_open()).await;

    assert!(backend.weather_calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_loop_stops_when_handle_dropped() {
    let backend = Arc::new(FakeBackend::default());
    let (widget, handle) = WeatherWidget::new(
        AutocompleteSettings::default(),
        backend.clone(),
        backend.clone(),
    );
    let task = tokio::spawn(widget.run());

    drop(handle);

    tokio::time::timeout(Duration::from_secs(5), task)
        .await
        .expect("widget did not stop")
        .unwrap();
}
