use serde::{Deserialize, Serialize};

/// The framing of a conversation: what the story is about and the standing
/// directives that steer generation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    pub description: String,
    /// Backend-maintained rolling summary of where the story currently is.
    #[serde(default)]
    pub current_state: String,
    /// Author hint: the direction the story should take next.
    #[serde(default)]
    pub what_happens_next: String,
    /// Standing facts the story must never contradict.
    #[serde(default)]
    pub never_forget: String,
}

impl Scenario {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            ..Self::default()
        }
    }
}
