//! Headless weather lookup widget.
//!
//! The widget is driven by [`WidgetEvent`]s and publishes a plain-data
//! [`WidgetView`] after every change; [`render`] turns a view into text.

pub mod autocomplete;
pub mod debounce;
pub mod locale;
pub mod render;
pub mod view;
pub mod widget;

pub use autocomplete::{AutocompleteController, AutocompleteSettings, ClickTarget, Command, Key};
pub use debounce::Debouncer;
pub use view::{DropdownItem, LastCityBanner, ResultPanel, WidgetView};
pub use widget::{WeatherWidget, WidgetClosed, WidgetEvent, WidgetHandle};
