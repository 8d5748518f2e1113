//! Message entity - one turn of the conversation
//!
//! Messages are append-only; edits mutate content/reaction in place and no
//! operation anywhere removes one.

use serde::{Deserialize, Serialize};

use crate::{CharacterId, MessageId};

/// A single message in the conversation history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub character_id: CharacterId,
    /// Snapshot of the character's name at creation time; later renames do
    /// not rewrite history.
    pub character_name: String,
    pub content: String,
    /// Physical/emotional beat rendered alongside the dialogue, when present
    #[serde(default)]
    pub reaction: Option<String>,
    /// ISO-8601 timestamp as emitted by the backend
    #[serde(default)]
    pub timestamp: String,
}

impl Message {
    pub fn new(
        id: MessageId,
        character_id: CharacterId,
        character_name: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id,
            character_id,
            character_name: character_name.into(),
            content: content.into(),
            reaction: None,
            timestamp: String::new(),
        }
    }

    pub fn with_reaction(mut self, reaction: impl Into<String>) -> Self {
        self.reaction = Some(reaction.into());
        self
    }

    pub fn with_timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = timestamp.into();
        self
    }

    /// In-place edit. A `None` reaction leaves the existing reaction alone;
    /// editing never clears one.
    pub fn edit(&mut self, content: impl Into<String>, reaction: Option<String>) {
        self.content = content.into();
        if let Some(reaction) = reaction {
            self.reaction = Some(reaction);
        }
    }
}
