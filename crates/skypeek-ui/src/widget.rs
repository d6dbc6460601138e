//! Widget event loop.
//!
//! A single task owns the autocomplete controller and all view state. User
//! events arrive on a channel, network calls run in spawned tasks that post
//! their results back, and a fresh [`WidgetView`] is published on a watch
//! channel whenever something visible changed.

use std::sync::Arc;

use skypeek_weather::{
    HistoryEntry, LastCity, SuggestionSource, WeatherBackend, WeatherError, WeatherReport,
};
use tokio::sync::{mpsc, watch};

use crate::autocomplete::{
    AutocompleteController, AutocompleteEvent, AutocompleteSettings, ClickTarget, Command, Key,
};
use crate::locale;
use crate::view::{LastCityBanner, ResultPanel, WidgetView};

const EVENT_BUFFER: usize = 64;

/// User interaction delivered to the widget
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WidgetEvent {
    InputChanged(String),
    KeyDown(Key),
    SuggestionHover(usize),
    SuggestionClick(usize),
    Click(ClickTarget),
    /// The search button
    Submit,
}

/// The widget's event loop has stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("weather widget has stopped")]
pub struct WidgetClosed;

/// Results of spawned network calls
#[derive(Debug)]
enum Completion {
    Weather {
        seq: u64,
        city: String,
        result: Result<WeatherReport, WeatherError>,
    },
    History {
        seq: u64,
        result: Result<Vec<HistoryEntry>, WeatherError>,
    },
    LastCity(Result<LastCity, WeatherError>),
}

/// Sending side of a running widget
#[derive(Debug, Clone)]
pub struct WidgetHandle {
    events: mpsc::Sender<WidgetEvent>,
    view: watch::Receiver<WidgetView>,
}

impl WidgetHandle {
    /// # Errors
    /// Returns `WidgetClosed` once the event loop has exited.
    pub async fn send(&self, event: WidgetEvent) -> Result<(), WidgetClosed> {
        self.events.send(event).await.map_err(|_| WidgetClosed)
    }

    /// A receiver that is notified on every view change
    pub fn subscribe(&self) -> watch::Receiver<WidgetView> {
        self.view.clone()
    }

    pub fn snapshot(&self) -> WidgetView {
        self.view.borrow().clone()
    }
}

pub struct WeatherWidget {
    controller: AutocompleteController,
    suggestions: Arc<dyn SuggestionSource>,
    backend: Arc<dyn WeatherBackend>,

    events_rx: mpsc::Receiver<WidgetEvent>,
    autocomplete_tx: mpsc::UnboundedSender<AutocompleteEvent>,
    autocomplete_rx: mpsc::UnboundedReceiver<AutocompleteEvent>,
    completion_tx: mpsc::UnboundedSender<Completion>,
    completion_rx: mpsc::UnboundedReceiver<Completion>,
    view_tx: watch::Sender<WidgetView>,

    result: ResultPanel,
    history: Vec<HistoryEntry>,
    last_city: Option<LastCityBanner>,
    search_seq: u64,
    history_seq: u64,
}

impl WeatherWidget {
    pub fn new(
        settings: AutocompleteSettings,
        suggestions: Arc<dyn SuggestionSource>,
        backend: Arc<dyn WeatherBackend>,
    ) -> (Self, WidgetHandle) {
        let (events_tx, events_rx) = mpsc::channel(EVENT_BUFFER);
        let (autocomplete_tx, autocomplete_rx) = mpsc::unbounded_channel();
        let (completion_tx, completion_rx) = mpsc::unbounded_channel();
        let (view_tx, view_rx) = watch::channel(WidgetView::default());

        let widget = Self {
            controller: AutocompleteController::new(settings, autocomplete_tx.clone()),
            suggestions,
            backend,
            events_rx,
            autocomplete_tx,
            autocomplete_rx,
            completion_tx,
            completion_rx,
            view_tx,
            result: ResultPanel::Empty,
            history: Vec::new(),
            last_city: None,
            search_seq: 0,
            history_seq: 0,
        };
        let handle = WidgetHandle {
            events: events_tx,
            view: view_rx,
        };
        (widget, handle)
    }

    /// Run until every [`WidgetHandle`] has been dropped.
    pub async fn run(mut self) {
        tracing::info!("Weather widget started");
        self.load_last_city();
        self.refresh_history();

        loop {
            tokio::select! {
                event = self.events_rx.recv() => match event {
                    Some(event) => self.handle_event(event),
                    None => break,
                },
                Some(event) = self.autocomplete_rx.recv() => {
                    if let Some(command) = self.controller.handle_event(event) {
                        self.execute(command);
                    }
                }
                Some(completion) = self.completion_rx.recv() => self.handle_completion(completion),
            }
            self.publish();
        }

        tracing::info!("Weather widget stopped");
    }

    fn handle_event(&mut self, event: WidgetEvent) {
        tracing::trace!(?event, "Widget event");
        let command = match event {
            WidgetEvent::InputChanged(text) => {
                self.controller.on_input_changed(&text);
                None
            }
            WidgetEvent::KeyDown(key) => self.controller.on_key_down(key),
            WidgetEvent::SuggestionHover(index) => {
                self.controller.on_suggestion_hover(index);
                None
            }
            WidgetEvent::SuggestionClick(index) => self.controller.on_suggestion_click(index),
            WidgetEvent::Click(target) => {
                self.controller.on_click(target);
                None
            }
            WidgetEvent::Submit => Some(self.controller.submit()),
        };

        if let Some(command) = command {
            self.execute(command);
        }
    }

    fn execute(&mut self, command: Command) {
        match command {
            Command::FetchSuggestions { seq, query } => self.fetch_suggestions(seq, query),
            Command::Search(city) => self.search(city),
        }
    }

    fn fetch_suggestions(&self, seq: u64, query: String) {
        let source = Arc::clone(&self.suggestions);
        let tx = self.autocomplete_tx.clone();
        tokio::spawn(async move {
            let result = source.suggest(&query).await;
            let _ = tx.send(AutocompleteEvent::SuggestionsReceived { seq, result });
        });
    }

    /// Start a weather lookup; an empty name is rejected without a request
    fn search(&mut self, city: String) {
        // Any earlier lookup still in flight is superseded either way.
        self.search_seq += 1;

        let city = city.trim().to_string();
        if city.is_empty() {
            self.result = ResultPanel::Validation(locale::EMPTY_CITY.to_string());
            return;
        }

        tracing::info!("Searching weather for {}", city);
        self.result = ResultPanel::Loading(city.clone());

        let seq = self.search_seq;
        let backend = Arc::clone(&self.backend);
        let tx = self.completion_tx.clone();
        tokio::spawn(async move {
            let result = backend.weather(&city).await;
            let _ = tx.send(Completion::Weather { seq, city, result });
        });
    }

    /// Only the newest refresh may replace the list, whatever order they finish in
    fn refresh_history(&mut self) {
        self.history_seq += 1;
        let seq = self.history_seq;
        let backend = Arc::clone(&self.backend);
        let tx = self.completion_tx.clone();
        tokio::spawn(async move {
            let result = backend.history().await;
            let _ = tx.send(Completion::History { seq, result });
        });
    }

    fn load_last_city(&self) {
        let backend = Arc::clone(&self.backend);
        let tx = self.completion_tx.clone();
        tokio::spawn(async move {
            let _ = tx.send(Completion::LastCity(backend.last_city().await));
        });
    }

    fn handle_completion(&mut self, completion: Completion) {
        match completion {
            Completion::Weather { seq, city, .. } if seq != self.search_seq => {
                tracing::debug!("Ignoring superseded weather result for {}", city);
            }
            Completion::Weather {
                result: Ok(report), ..
            } => {
                self.result = ResultPanel::Weather(report);
                self.refresh_history();
            }
            Completion::Weather {
                city,
                result: Err(e),
                ..
            } => {
                tracing::warn!("Weather lookup for {} failed: {}", city, e);
                let message = e
                    .detail()
                    .map_or_else(|| e.user_message().to_string(), str::to_string);
                self.result = ResultPanel::Error {
                    message,
                    hint: locale::ERROR_HINT,
                };
            }
            Completion::History { seq, .. } if seq != self.history_seq => {
                tracing::debug!(seq, latest = self.history_seq, "Ignoring superseded history");
            }
            Completion::History {
                result: Ok(entries), ..
            } => self.history = entries,
            Completion::History { result: Err(e), .. } => {
                tracing::warn!("Search history unavailable: {}", e);
            }
            Completion::LastCity(Ok(last)) => {
                self.last_city = last.last_city.map(|city| LastCityBanner {
                    city,
                    searched_at: last.searched_at,
                });
            }
            Completion::LastCity(Err(e)) => {
                tracing::warn!("Last city unavailable: {}", e);
                self.last_city = None;
            }
        }
    }

    fn view(&self) -> WidgetView {
        WidgetView {
            query: self.controller.query().to_string(),
            dropdown: self.controller.dropdown_items(),
            result: self.result.clone(),
            history: self.history.clone(),
            last_city: self.last_city.clone(),
        }
    }

    fn publish(&self) {
        let next = self.view();
        self.view_tx.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                *current = next;
                true
            }
        });
    }
}
