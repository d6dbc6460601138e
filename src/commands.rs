//! Line commands for driving the widget from a terminal.
//!
//! Lines starting with `/` are interaction commands; anything else replaces the
//! contents of the search field.

use skypeek_ui::{ClickTarget, Key, WidgetEvent};

pub const HELP: &str = "\
Type to edit the search field. Commands:
  /down /up       move the highlight
  /enter          pick the highlight, or search when nothing is highlighted
  /esc            close suggestions
  /hover N        highlight suggestion N (1-based)
  /pick N         click suggestion N (1-based)
  /outside        click outside the widget
  /search         press the search button
  /help           show this text
  /quit           exit";

#[derive(Debug, PartialEq, Eq)]
pub enum Input {
    Event(WidgetEvent),
    Help,
    Quit,
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("unknown command: {0}")]
    Unknown(String),
    #[error("{0} expects a suggestion number starting at 1")]
    BadIndex(&'static str),
}

pub fn parse(line: &str) -> Result<Input, CommandError> {
    let Some(command) = line.strip_prefix('/') else {
        return Ok(Input::Event(WidgetEvent::InputChanged(line.to_string())));
    };

    let mut parts = command.split_whitespace();
    let name = parts.next().unwrap_or_default();
    let event = match name {
        "down" => WidgetEvent::KeyDown(Key::ArrowDown),
        "up" => WidgetEvent::KeyDown(Key::ArrowUp),
        "enter" => WidgetEvent::KeyDown(Key::Enter),
        "esc" => WidgetEvent::KeyDown(Key::Escape),
        "outside" => WidgetEvent::Click(ClickTarget::Outside),
        "search" => WidgetEvent::Submit,
        "hover" => WidgetEvent::SuggestionHover(index(parts.next(), "/hover")?),
        "pick" => WidgetEvent::SuggestionClick(index(parts.next(), "/pick")?),
        "help" => return Ok(Input::Help),
        "quit" | "exit" => return Ok(Input::Quit),
        other => return Err(CommandError::Unknown(other.to_string())),
    };
    Ok(Input::Event(event))
}

/// Convert a 1-based position to a 0-based index
fn index(arg: Option<&str>, command: &'static str) -> Result<usize, CommandError> {
    arg.and_then(|s| s.parse::<usize>().ok())
        .and_then(|n| n.checked_sub(1))
        .ok_or(CommandError::BadIndex(command))
}
