//! Session - the complete client-visible state
//!
//! Mirrors the server-authoritative snapshot (conversation, settings,
//! cursor) plus the one client-local field: the selected character hint.
//! The snapshot is only ever replaced whole; nothing mutates it partially.

use serde::{Deserialize, Serialize};

use crate::{CharacterId, Conversation, DomainError, Message};

fn default_true() -> bool {
    true
}

fn default_index() -> i64 {
    -1
}

/// The complete client-visible session state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    #[serde(default)]
    pub conversation: Option<Conversation>,
    #[serde(default = "default_true")]
    pub auto_response_enabled: bool,
    #[serde(default = "default_true")]
    pub show_reactions: bool,
    /// Cursor into message history; -1 means "show nothing yet"
    #[serde(default = "default_index")]
    pub current_message_index: i64,
    /// Client-local hint, never sent by the backend
    #[serde(skip)]
    pub selected_character_id: Option<CharacterId>,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            conversation: None,
            auto_response_enabled: true,
            show_reactions: true,
            current_message_index: -1,
            selected_character_id: None,
        }
    }
}

impl Session {
    pub fn message_count(&self) -> usize {
        self.conversation
            .as_ref()
            .map(|c| c.messages.len())
            .unwrap_or(0)
    }

    /// Cursor clamped into `[-1, len - 1]`. A snapshot from a well-behaved
    /// backend is already in range; this keeps render code total anyway.
    pub fn clamped_index(&self) -> i64 {
        let ceiling = self.message_count() as i64 - 1;
        self.current_message_index.clamp(-1, ceiling.max(-1))
    }

    /// The rendered window: the contiguous prefix `messages[0..=index]`.
    /// Empty when the cursor is -1 or there is no conversation.
    pub fn visible_messages(&self) -> &[Message] {
        let Some(conversation) = &self.conversation else {
            return &[];
        };
        let index = self.clamped_index();
        if index < 0 {
            return &[];
        }
        &conversation.messages[..=index as usize]
    }

    /// Record the user's character pick. The id must reference a character
    /// of the current conversation.
    pub fn select_character(&mut self, id: CharacterId) -> Result<(), DomainError> {
        let conversation = self
            .conversation
            .as_ref()
            .ok_or_else(|| DomainError::validation("No active conversation"))?;
        if !conversation.has_character(&id) {
            return Err(DomainError::not_found("Character", id.into_inner()));
        }
        self.selected_character_id = Some(id);
        Ok(())
    }

    pub fn selected_character_name(&self) -> Option<&str> {
        let id = self.selected_character_id.as_ref()?;
        self.conversation
            .as_ref()?
            .character(id)
            .map(|c| c.name.as_str())
    }

    /// Whether the selection hint is still valid for the current
    /// conversation. A replaced conversation invalidates it.
    pub fn selection_is_valid(&self) -> bool {
        match (&self.selected_character_id, &self.conversation) {
            (None, _) => true,
            (Some(id), Some(conversation)) => conversation.has_character(id),
            (Some(_), None) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Character, ConversationId, MessageId, Scenario};

    fn session_with_messages(count: usize, index: i64) -> Session {
        let messages = (0..count)
            .map(|i| {
                Message::new(
                    MessageId::new(format!("msg_{i}")),
                    CharacterId::new("char1"),
                    "Alice",
                    format!("line {i}"),
                )
            })
            .collect();
        Session {
            conversation: Some(Conversation {
                id: ConversationId::new("conv_1"),
                name: "Test".to_string(),
                scenario: Scenario::new("a test"),
                characters: vec![
                    Character::new(CharacterId::new("narrator"), "Narrator").as_narrator(),
                    Character::new(CharacterId::new("char1"), "Alice"),
                    Character::new(CharacterId::new("char2"), "Bob"),
                ],
                messages,
                summaries: Vec::new(),
                created_at: String::new(),
                updated_at: String::new(),
            }),
            current_message_index: index,
            ..Session::default()
        }
    }

    #[test]
    fn visible_window_is_prefix_up_to_cursor() {
        for index in -1..5i64 {
            let session = session_with_messages(5, index);
            let visible = session.visible_messages();
            assert_eq!(visible.len() as i64, index + 1);
            for (i, msg) in visible.iter().enumerate() {
                assert_eq!(msg.content, format!("line {i}"));
            }
        }
    }

    #[test]
    fn empty_session_shows_nothing() {
        let session = Session::default();
        assert!(session.visible_messages().is_empty());
        assert_eq!(session.clamped_index(), -1);
    }

    #[test]
    fn out_of_range_cursor_is_clamped() {
        let session = session_with_messages(3, 99);
        assert_eq!(session.clamped_index(), 2);
        assert_eq!(session.visible_messages().len(), 3);

        let session = session_with_messages(3, -7);
        assert_eq!(session.clamped_index(), -1);
        assert!(session.visible_messages().is_empty());
    }

    #[test]
    fn select_character_requires_existing_id() {
        let mut session = session_with_messages(0, -1);
        assert!(session.select_character(CharacterId::new("char2")).is_ok());
        assert_eq!(session.selected_character_name(), Some("Bob"));

        let err = session
            .select_character(CharacterId::new("ghost"))
            .expect_err("unknown id must fail");
        assert!(matches!(err, DomainError::NotFound { .. }));
    }

    #[test]
    fn select_character_requires_conversation() {
        let mut session = Session::default();
        let err = session
            .select_character(CharacterId::new("char1"))
            .expect_err("no conversation");
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn snapshot_deserializes_from_backend_shape() {
        let json = serde_json::json!({
            "conversation": null,
            "auto_response_enabled": false,
            "show_reactions": true,
            "current_message_index": -1
        });
        let session: Session = serde_json::from_value(json).expect("deserialize");
        assert!(!session.auto_response_enabled);
        assert!(session.conversation.is_none());
        assert!(session.selected_character_id.is_none());
    }
}
