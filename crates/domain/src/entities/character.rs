//! Character entity - the speakers in a conversation
//!
//! One narrator plus any number of named characters. The narrator is seeded
//! by the backend at conversation creation and is never user-created.

use serde::{Deserialize, Serialize};

use crate::CharacterId;

/// A character participating in the conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    pub id: CharacterId,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub personality: String,
    #[serde(default)]
    pub speech_patterns: String,
    #[serde(default)]
    pub motivations: String,
    /// Path to an uploaded portrait image, when one exists
    #[serde(default)]
    pub image_path: Option<String>,
    #[serde(default)]
    pub is_narrator: bool,
}

impl Character {
    pub fn new(id: CharacterId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            description: String::new(),
            personality: String::new(),
            speech_patterns: String::new(),
            motivations: String::new(),
            image_path: None,
            is_narrator: false,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn as_narrator(mut self) -> Self {
        self.is_narrator = true;
        self
    }

    pub fn with_image_path(mut self, path: impl Into<String>) -> Self {
        self.image_path = Some(path.into());
        self
    }
}
