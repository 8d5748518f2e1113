//! Conversation aggregate - scenario, characters, and message history

use serde::{Deserialize, Serialize};

use crate::{Character, CharacterId, ConversationId, Message};

use super::Scenario;

/// How many non-narrator characters may carry an uploaded portrait.
/// Only the two seed characters get one; later additions do not.
pub const PORTRAIT_SLOTS: usize = 2;

/// A conversation: a scenario plus its characters, messages, and summaries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: ConversationId,
    pub name: String,
    pub scenario: Scenario,
    /// Display and turn-selection order
    pub characters: Vec<Character>,
    /// Append-only; edits happen in place
    pub messages: Vec<Message>,
    /// Opaque rolling summaries produced by the backend
    #[serde(default)]
    pub summaries: Vec<String>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

impl Conversation {
    pub fn character(&self, id: &CharacterId) -> Option<&Character> {
        self.characters.iter().find(|c| &c.id == id)
    }

    pub fn character_by_name(&self, name: &str) -> Option<&Character> {
        self.characters.iter().find(|c| c.name == name)
    }

    pub fn has_character(&self, id: &CharacterId) -> bool {
        self.character(id).is_some()
    }

    /// Whether this character may receive an uploaded portrait image.
    /// Only the first `PORTRAIT_SLOTS` non-narrator characters qualify.
    pub fn accepts_image(&self, id: &CharacterId) -> bool {
        self.characters
            .iter()
            .filter(|c| !c.is_narrator)
            .take(PORTRAIT_SLOTS)
            .any(|c| &c.id == id)
    }

    pub fn non_narrator_count(&self) -> usize {
        self.characters.iter().filter(|c| !c.is_narrator).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conversation_with(characters: Vec<Character>) -> Conversation {
        Conversation {
            id: ConversationId::new("conv_1"),
            name: "Test".to_string(),
            scenario: Scenario::new("a test"),
            characters,
            messages: Vec::new(),
            summaries: Vec::new(),
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    #[test]
    fn only_first_two_non_narrators_accept_images() {
        let conv = conversation_with(vec![
            Character::new(CharacterId::new("narrator"), "Narrator").as_narrator(),
            Character::new(CharacterId::new("char1"), "Alice"),
            Character::new(CharacterId::new("char2"), "Bob"),
            Character::new(CharacterId::new("char3"), "Carol"),
        ]);

        assert!(!conv.accepts_image(&CharacterId::new("narrator")));
        assert!(conv.accepts_image(&CharacterId::new("char1")));
        assert!(conv.accepts_image(&CharacterId::new("char2")));
        assert!(!conv.accepts_image(&CharacterId::new("char3")));
    }

    #[test]
    fn character_lookup_by_id_and_name() {
        let conv = conversation_with(vec![
            Character::new(CharacterId::new("char1"), "Alice"),
            Character::new(CharacterId::new("char2"), "Bob"),
        ]);

        assert_eq!(
            conv.character(&CharacterId::new("char2")).map(|c| c.name.as_str()),
            Some("Bob")
        );
        assert_eq!(
            conv.character_by_name("Alice").map(|c| c.id.as_str()),
            Some("char1")
        );
        assert!(conv.character(&CharacterId::new("missing")).is_none());
    }
}
