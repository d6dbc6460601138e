//! City-name autocomplete state machine.
//!
//! The controller turns raw keystrokes into a navigable suggestion dropdown
//! and resolves a final choice into a weather search. It performs no I/O
//! itself: network work is requested through [`Command`]s and results come
//! back through [`AutocompleteController::handle_event`].
//!
//! Every input change issues a new sequence number. Debounce deliveries and
//! suggestion responses carry the number they were issued under, and anything
//! older than the latest is dropped, so out-of-order responses cannot replace
//! the list that belongs to a newer query.

use std::time::Duration;

use skypeek_weather::{Suggestion, WeatherError};
use tokio::sync::mpsc;

use crate::debounce::Debouncer;
use crate::view::DropdownItem;

/// Keys the dropdown reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    ArrowDown,
    ArrowUp,
    Enter,
    Escape,
    Other,
}

/// Where a pointer click landed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickTarget {
    /// The query field
    Input,
    /// Inside the dropdown; never reaches the outside-click handler
    Dropdown,
    /// Anywhere else on the page
    Outside,
}

/// Work the controller asks its owner to perform
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    FetchSuggestions { seq: u64, query: String },
    Search(String),
}

/// Asynchronous inputs delivered back to the controller
#[derive(Debug)]
pub enum AutocompleteEvent {
    DebounceElapsed {
        seq: u64,
        query: String,
    },
    SuggestionsReceived {
        seq: u64,
        result: Result<Vec<Suggestion>, WeatherError>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutocompleteSettings {
    /// Quiet period measured from the latest keystroke
    pub debounce: Duration,
    /// Minimum trimmed query length, in characters
    pub min_query_chars: usize,
}

impl Default for AutocompleteSettings {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(300),
            min_query_chars: 2,
        }
    }
}

impl From<&skypeek_core::AutocompleteConfig> for AutocompleteSettings {
    fn from(config: &skypeek_core::AutocompleteConfig) -> Self {
        Self {
            debounce: Duration::from_millis(config.debounce_ms),
            min_query_chars: config.min_query_chars,
        }
    }
}

#[derive(Debug)]
pub struct AutocompleteController {
    settings: AutocompleteSettings,
    query: String,
    suggestions: Vec<Suggestion>,
    /// `None` means nothing is highlighted; otherwise always `< suggestions.len()`
    selected: Option<usize>,
    latest_seq: u64,
    debouncer: Debouncer<AutocompleteEvent>,
}

impl AutocompleteController {
    /// `events` receives debounce deliveries; the owner feeds them back
    /// through [`handle_event`](Self::handle_event).
    pub fn new(settings: AutocompleteSettings, events: mpsc::UnboundedSender<AutocompleteEvent>) -> Self {
        Self {
            settings,
            query: String::new(),
            suggestions: Vec::new(),
            selected: None,
            latest_seq: 0,
            debouncer: Debouncer::new(settings.debounce, events),
        }
    }

    /// Current contents of the query field
    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn suggestions(&self) -> &[Suggestion] {
        &self.suggestions
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected
    }

    /// The dropdown is visible exactly when there is something to show
    pub fn is_open(&self) -> bool {
        !self.suggestions.is_empty()
    }

    /// Sequence number of the most recently issued query
    pub fn latest_seq(&self) -> u64 {
        self.latest_seq
    }

    pub fn has_pending_fetch(&self) -> bool {
        self.debouncer.is_pending()
    }

    pub fn dropdown_items(&self) -> Vec<DropdownItem> {
        self.suggestions
            .iter()
            .enumerate()
            .map(|(i, s)| DropdownItem {
                name: s.name.clone(),
                origin: s.source,
                highlighted: self.selected == Some(i),
            })
            .collect()
    }

    pub fn handle_event(&mut self, event: AutocompleteEvent) -> Option<Command> {
        match event {
            AutocompleteEvent::DebounceElapsed { seq, query } => self.on_debounce_elapsed(seq, query),
            AutocompleteEvent::SuggestionsReceived { seq, result } => {
                self.on_suggestions_received(seq, result);
                None
            }
        }
    }

    /// The query field changed.
    ///
    /// Short queries close the dropdown; anything else restarts the quiet
    /// period. The visible list stays up until its replacement arrives, but
    /// the highlight is dropped because it no longer matches what was typed.
    pub fn on_input_changed(&mut self, raw: &str) {
        self.query = raw.to_string();
        self.latest_seq += 1;
        self.selected = None;

        let trimmed = raw.trim();
        if trimmed.chars().count() < self.settings.min_query_chars {
            self.debouncer.cancel();
            self.close();
            return;
        }

        self.debouncer.schedule(AutocompleteEvent::DebounceElapsed {
            seq: self.latest_seq,
            query: trimmed.to_string(),
        });
    }

    pub fn on_debounce_elapsed(&mut self, seq: u64, query: String) -> Option<Command> {
        if seq != self.latest_seq {
            tracing::debug!(seq, latest = self.latest_seq, "Dropping superseded debounce");
            return None;
        }
        Some(Command::FetchSuggestions { seq, query })
    }

    pub fn on_suggestions_received(&mut self, seq: u64, result: Result<Vec<Suggestion>, WeatherError>) {
        if seq != self.latest_seq {
            tracing::debug!(seq, latest = self.latest_seq, "Discarding stale suggestions");
            return;
        }

        match result {
            Ok(list) if list.is_empty() => self.close(),
            Ok(list) => {
                self.suggestions = list;
                self.selected = None;
            }
            Err(e) => {
                tracing::warn!("City suggestions unavailable: {}", e);
                self.close();
            }
        }
    }

    pub fn on_key_down(&mut self, key: Key) -> Option<Command> {
        match key {
            Key::ArrowDown if self.is_open() => {
                let last = self.suggestions.len() - 1;
                self.selected = Some(self.selected.map_or(0, |i| (i + 1).min(last)));
                None
            }
            Key::ArrowUp if self.is_open() => {
                self.selected = self.selected.and_then(|i| i.checked_sub(1));
                None
            }
            Key::Enter => match self.selected {
                Some(index) if self.is_open() => self.commit(index),
                _ => Some(self.submit()),
            },
            Key::Escape => {
                self.dismiss();
                None
            }
            _ => None,
        }
    }

    pub fn on_suggestion_hover(&mut self, index: usize) {
        if index < self.suggestions.len() {
            self.selected = Some(index);
        }
    }

    pub fn on_suggestion_click(&mut self, index: usize) -> Option<Command> {
        self.commit(index)
    }

    pub fn on_click(&mut self, target: ClickTarget) {
        if target == ClickTarget::Outside {
            self.dismiss();
        }
    }

    /// Submit the raw query field value, bypassing suggestions
    pub fn submit(&mut self) -> Command {
        self.dismiss();
        Command::Search(self.query.trim().to_string())
    }

    fn commit(&mut self, index: usize) -> Option<Command> {
        let name = self.suggestions.get(index)?.name.clone();
        self.query.clone_from(&name);
        self.dismiss();
        Some(Command::Search(name))
    }

    fn close(&mut self) {
        self.suggestions.clear();
        self.selected = None;
    }

    /// Close and make sure nothing already in flight can reopen the dropdown
    fn dismiss(&mut self) {
        self.close();
        self.debouncer.cancel();
        self.latest_seq += 1;
    }
}
