//! Inbound ports - what the application exposes to its drivers

mod ui_events;

pub use ui_events::{Indicator, StatusKind, StatusLine, UiEvent, UiSender};
