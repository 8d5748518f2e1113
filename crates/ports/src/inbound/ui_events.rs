//! Render-facing event stream
//!
//! The renderer is an external collaborator: it owns the widgets, we own
//! the state. Everything it needs beyond the Session snapshot arrives as
//! `UiEvent`s over an unbounded channel.

use std::time::Duration;

use futures_channel::mpsc;

use storyweave_domain::CharacterId;

/// State of the "thinking" indicator
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Indicator {
    #[default]
    Off,
    /// "AI is thinking"
    Generic,
    /// "{name} is thinking"
    Named(String),
}

/// Severity of a transient status line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Success,
    Error,
}

impl StatusKind {
    /// How long the renderer should keep the line before reverting to
    /// "Ready". Info lines stay until superseded.
    pub fn auto_clear(&self) -> Option<Duration> {
        match self {
            Self::Info => None,
            Self::Success => Some(Duration::from_secs(2)),
            Self::Error => Some(Duration::from_secs(3)),
        }
    }
}

/// A transient status line. Each new line supersedes the previous one
/// immediately, regardless of pending auto-clear timers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    pub kind: StatusKind,
    pub text: String,
}

impl StatusLine {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Info,
            text: text.into(),
        }
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Success,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Error,
            text: format!("Error: {}", text.into()),
        }
    }
}

/// Events delivered to the render collaborator
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    /// Thinking indicator changed
    Thinking(Indicator),
    /// Transient status/error/success text
    Status(StatusLine),
    /// Which character card is visually "active"
    ActiveCharacter(Option<CharacterId>),
    /// The compose input should be cleared (manual send succeeded)
    InputCleared,
    /// The session snapshot was replaced; re-read it from the store
    StateReplaced,
}

/// Sending half handed to the application services.
///
/// Wraps the channel so a disconnected renderer (e.g. in tests that do not
/// drain events) never turns into an error path in orchestration code.
#[derive(Clone)]
pub struct UiSender {
    tx: mpsc::UnboundedSender<UiEvent>,
}

impl UiSender {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<UiEvent>) {
        let (tx, rx) = mpsc::unbounded();
        (Self { tx }, rx)
    }

    pub fn send(&self, event: UiEvent) {
        let _ = self.tx.unbounded_send(event);
    }

    pub fn thinking(&self, indicator: Indicator) {
        self.send(UiEvent::Thinking(indicator));
    }

    pub fn status(&self, line: StatusLine) {
        self.send(UiEvent::Status(line));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_lines_carry_the_error_marker() {
        let line = StatusLine::error("No active conversation");
        assert_eq!(line.text, "Error: No active conversation");
        assert_eq!(line.kind, StatusKind::Error);
    }

    #[test]
    fn auto_clear_delays_match_severity() {
        assert_eq!(
            StatusKind::Error.auto_clear(),
            Some(Duration::from_secs(3))
        );
        assert_eq!(
            StatusKind::Success.auto_clear(),
            Some(Duration::from_secs(2))
        );
        assert_eq!(StatusKind::Info.auto_clear(), None);
    }

    #[test]
    fn sender_is_infallible_after_receiver_drop() {
        let (tx, rx) = UiSender::channel();
        drop(rx);
        tx.thinking(Indicator::Generic);
        tx.status(StatusLine::info("still fine"));
    }
}
