//! Scriptable in-memory gateway for tests
//!
//! Implements `GatewayPort` against a mutable in-memory session that
//! follows the backend's actual semantics: appends advance the cursor to
//! the newest message, navigation clamps at the boundaries, regeneration
//! replaces the last message, and messages created while reactions are
//! hidden are stored without one. Tests drive failures with `fail_next`
//! and assert outbound traffic through the recorded call log.

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;

use storyweave_domain::{
    Character, CharacterId, Conversation, ConversationId, Message, MessageId, Scenario, Session,
};
use storyweave_ports::outbound::{
    GatewayError, GatewayPort, ImageUpload, NavDirection, NavPosition, NewConversation, SavedAs,
    SavedConversation, SettingKey,
};

/// One recorded gateway call
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCall {
    FetchState,
    CreateConversation,
    AddCharacter { name: String },
    Generate { character_id: Option<String> },
    SendManual { character_id: String, content: String },
    EditMessage { index: usize },
    Regenerate,
    Navigate { direction: NavDirection },
    ToggleSetting { setting: &'static str, value: bool },
    UpdateScenario,
    Save,
    List,
    Load { filename: String },
    UploadImage { character_id: String },
}

/// Operation selector for failure priming
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FakeOp {
    FetchState,
    CreateConversation,
    AddCharacter,
    Generate,
    SendManual,
    EditMessage,
    Regenerate,
    Navigate,
    ToggleSetting,
    UpdateScenario,
    Save,
    List,
    Load,
    UploadImage,
}

struct FakeState {
    session: Session,
    saved: Vec<(String, Conversation)>,
    calls: Vec<RecordedCall>,
    fail_next: Vec<(FakeOp, GatewayError)>,
    generation_counter: usize,
}

impl Default for FakeState {
    fn default() -> Self {
        Self {
            session: Session::default(),
            saved: Vec::new(),
            calls: Vec::new(),
            fail_next: Vec::new(),
            generation_counter: 0,
        }
    }
}

#[derive(Clone, Default)]
pub struct FakeGateway {
    state: Arc<Mutex<FakeState>>,
}

fn lock(state: &Mutex<FakeState>) -> MutexGuard<'_, FakeState> {
    match state.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

fn seed_conversation(scenario: &str, name1: &str, name2: &str) -> Conversation {
    let now = Utc::now().to_rfc3339();
    Conversation {
        id: ConversationId::new("conv_test"),
        name: format!("Story: {}", scenario.chars().take(50).collect::<String>()),
        scenario: Scenario::new(scenario),
        characters: vec![
            Character::new(CharacterId::new("narrator"), "Narrator")
                .with_description("The omniscient narrator")
                .as_narrator(),
            Character::new(CharacterId::new("char1"), name1),
            Character::new(CharacterId::new("char2"), name2),
        ],
        messages: Vec::new(),
        summaries: Vec::new(),
        created_at: now.clone(),
        updated_at: now,
    }
}

impl FakeGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// A gateway whose session already holds a conversation with the two
    /// given characters (plus the narrator) and no messages.
    pub fn with_characters(name1: &str, name2: &str) -> Self {
        let gateway = Self::default();
        {
            let mut state = lock(&gateway.state);
            state.session.conversation = Some(seed_conversation("a story", name1, name2));
            state.session.current_message_index = -1;
        }
        gateway
    }

    /// Replace the fake's backing session wholesale
    pub fn seed_session(&self, session: Session) {
        lock(&self.state).session = session;
    }

    /// Peek at the backing session without recording a call
    pub fn session(&self) -> Session {
        lock(&self.state).session.clone()
    }

    /// Prime the next call of `op` to fail with `err`
    pub fn fail_next(&self, op: FakeOp, err: GatewayError) {
        lock(&self.state).fail_next.push((op, err));
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        lock(&self.state).calls.clone()
    }

    /// Number of generate-message calls seen so far
    pub fn generate_calls(&self) -> usize {
        lock(&self.state)
            .calls
            .iter()
            .filter(|c| matches!(c, RecordedCall::Generate { .. }))
            .count()
    }

    /// Number of manual-send calls seen so far
    pub fn manual_calls(&self) -> usize {
        lock(&self.state)
            .calls
            .iter()
            .filter(|c| matches!(c, RecordedCall::SendManual { .. }))
            .count()
    }

    /// Total calls of any kind
    pub fn total_calls(&self) -> usize {
        lock(&self.state).calls.len()
    }

    fn check_fail(state: &mut FakeState, op: FakeOp) -> Result<(), GatewayError> {
        if let Some(pos) = state.fail_next.iter().position(|(o, _)| *o == op) {
            let (_, err) = state.fail_next.remove(pos);
            return Err(err);
        }
        Ok(())
    }

    fn conversation_mut(state: &mut FakeState) -> Result<&mut Conversation, GatewayError> {
        state
            .session
            .conversation
            .as_mut()
            .ok_or_else(|| GatewayError::server(400, "No active conversation"))
    }

    /// Backend message construction: appends advance the cursor to the
    /// newest entry, and a hidden-reactions session stores no reaction.
    fn append_message(
        state: &mut FakeState,
        character_id: CharacterId,
        character_name: String,
        content: String,
        reaction: Option<String>,
    ) {
        let show_reactions = state.session.show_reactions;
        let conversation = state
            .session
            .conversation
            .as_mut()
            .expect("caller checked conversation");
        let id = MessageId::new(format!("msg_{}", conversation.messages.len()));
        let mut message = Message::new(id, character_id, character_name, content)
            .with_timestamp(Utc::now().to_rfc3339());
        message.reaction = if show_reactions { reaction } else { None };
        conversation.messages.push(message);
        state.session.current_message_index = state
            .session
            .conversation
            .as_ref()
            .map(|c| c.messages.len() as i64 - 1)
            .unwrap_or(-1);
    }

    fn generate_internal(
        state: &mut FakeState,
        character_id: Option<&CharacterId>,
    ) -> Result<(), GatewayError> {
        let conversation = Self::conversation_mut(state)?;

        let speaker = match character_id {
            Some(id) => conversation
                .character(id)
                .cloned()
                .ok_or_else(|| GatewayError::server(404, "Character not found"))?,
            None => {
                // the backend's speaker choice: someone other than whoever
                // spoke last, narrator excluded
                let last_speaker = conversation.messages.last().map(|m| m.character_id.clone());
                conversation
                    .characters
                    .iter()
                    .filter(|c| !c.is_narrator)
                    .find(|c| Some(&c.id) != last_speaker.as_ref())
                    .or_else(|| conversation.characters.iter().find(|c| !c.is_narrator))
                    .cloned()
                    .ok_or_else(|| GatewayError::server(400, "No characters available"))?
            }
        };

        state.generation_counter += 1;
        let content = format!("{} continues the story ({})", speaker.name, state.generation_counter);
        Self::append_message(
            state,
            speaker.id.clone(),
            speaker.name.clone(),
            content,
            Some("smiles softly".to_string()),
        );
        Ok(())
    }
}

#[async_trait]
impl GatewayPort for FakeGateway {
    async fn fetch_state(&self) -> Result<Session, GatewayError> {
        let mut state = lock(&self.state);
        state.calls.push(RecordedCall::FetchState);
        Self::check_fail(&mut state, FakeOp::FetchState)?;
        // the wire snapshot never carries the client-local selection hint
        let mut session = state.session.clone();
        session.selected_character_id = None;
        Ok(session)
    }

    async fn create_conversation(
        &self,
        request: NewConversation,
    ) -> Result<ConversationId, GatewayError> {
        let mut state = lock(&self.state);
        state.calls.push(RecordedCall::CreateConversation);
        Self::check_fail(&mut state, FakeOp::CreateConversation)?;

        let conversation = seed_conversation(
            &request.scenario_description,
            &request.character1_name,
            &request.character2_name,
        );
        let id = conversation.id.clone();
        state.session.conversation = Some(conversation);
        state.session.current_message_index = -1;
        Ok(id)
    }

    async fn add_character(
        &self,
        name: &str,
        description: &str,
    ) -> Result<Character, GatewayError> {
        let mut state = lock(&self.state);
        state.calls.push(RecordedCall::AddCharacter {
            name: name.to_string(),
        });
        Self::check_fail(&mut state, FakeOp::AddCharacter)?;

        let conversation = Self::conversation_mut(&mut state)?;
        let id = CharacterId::new(format!("char{}", conversation.characters.len()));
        let character = Character::new(id, name).with_description(description);
        conversation.characters.push(character.clone());
        Ok(character)
    }

    async fn generate_message(
        &self,
        character_id: Option<&CharacterId>,
    ) -> Result<(), GatewayError> {
        let mut state = lock(&self.state);
        state.calls.push(RecordedCall::Generate {
            character_id: character_id.map(|id| id.as_str().to_string()),
        });
        Self::check_fail(&mut state, FakeOp::Generate)?;
        Self::generate_internal(&mut state, character_id)
    }

    async fn send_manual_message(
        &self,
        character_id: &CharacterId,
        content: &str,
    ) -> Result<(), GatewayError> {
        let mut state = lock(&self.state);
        state.calls.push(RecordedCall::SendManual {
            character_id: character_id.as_str().to_string(),
            content: content.to_string(),
        });
        Self::check_fail(&mut state, FakeOp::SendManual)?;

        let conversation = Self::conversation_mut(&mut state)?;
        let character = conversation
            .character(character_id)
            .cloned()
            .ok_or_else(|| GatewayError::server(404, "Character not found"))?;
        Self::append_message(
            &mut state,
            character.id,
            character.name,
            content.to_string(),
            None,
        );
        Ok(())
    }

    async fn edit_message(
        &self,
        index: usize,
        content: &str,
        reaction: Option<&str>,
    ) -> Result<(), GatewayError> {
        let mut state = lock(&self.state);
        state.calls.push(RecordedCall::EditMessage { index });
        Self::check_fail(&mut state, FakeOp::EditMessage)?;

        let conversation = Self::conversation_mut(&mut state)?;
        let message = conversation
            .messages
            .get_mut(index)
            .ok_or_else(|| GatewayError::server(404, "Message not found"))?;
        message.edit(content, reaction.map(|r| r.to_string()));
        Ok(())
    }

    async fn regenerate_last(&self) -> Result<(), GatewayError> {
        let mut state = lock(&self.state);
        state.calls.push(RecordedCall::Regenerate);
        Self::check_fail(&mut state, FakeOp::Regenerate)?;

        let conversation = Self::conversation_mut(&mut state)?;
        let last = conversation
            .messages
            .pop()
            .ok_or_else(|| GatewayError::server(400, "No messages to regenerate"))?;
        state.session.current_message_index = state
            .session
            .conversation
            .as_ref()
            .map(|c| c.messages.len() as i64 - 1)
            .unwrap_or(-1);
        Self::generate_internal(&mut state, Some(&last.character_id))
    }

    async fn navigate(&self, direction: NavDirection) -> Result<NavPosition, GatewayError> {
        let mut state = lock(&self.state);
        state.calls.push(RecordedCall::Navigate { direction });
        Self::check_fail(&mut state, FakeOp::Navigate)?;

        let total = state
            .session
            .conversation
            .as_ref()
            .map(|c| c.messages.len() as i64)
            .ok_or_else(|| GatewayError::server(400, "No active conversation"))?;

        // boundary clamping lives here, not in the client
        match direction {
            NavDirection::Back => {
                if state.session.current_message_index > 0 {
                    state.session.current_message_index -= 1;
                }
            }
            NavDirection::Forward => {
                if state.session.current_message_index < total - 1 {
                    state.session.current_message_index += 1;
                }
            }
        }

        Ok(NavPosition {
            current_index: state.session.current_message_index,
            total_messages: total,
        })
    }

    async fn toggle_setting(&self, setting: SettingKey, value: bool) -> Result<(), GatewayError> {
        let mut state = lock(&self.state);
        state.calls.push(RecordedCall::ToggleSetting {
            setting: setting.as_wire(),
            value,
        });
        Self::check_fail(&mut state, FakeOp::ToggleSetting)?;

        match setting {
            SettingKey::AutoResponse => state.session.auto_response_enabled = value,
            SettingKey::ShowReactions => state.session.show_reactions = value,
        }
        Ok(())
    }

    async fn update_scenario(
        &self,
        what_happens_next: Option<&str>,
        never_forget: Option<&str>,
    ) -> Result<(), GatewayError> {
        let mut state = lock(&self.state);
        state.calls.push(RecordedCall::UpdateScenario);
        Self::check_fail(&mut state, FakeOp::UpdateScenario)?;

        let conversation = Self::conversation_mut(&mut state)?;
        if let Some(next) = what_happens_next {
            conversation.scenario.what_happens_next = next.to_string();
        }
        if let Some(never) = never_forget {
            conversation.scenario.never_forget = never.to_string();
        }
        Ok(())
    }

    async fn save_conversation(&self) -> Result<SavedAs, GatewayError> {
        let mut state = lock(&self.state);
        state.calls.push(RecordedCall::Save);
        Self::check_fail(&mut state, FakeOp::Save)?;

        let conversation = state
            .session
            .conversation
            .clone()
            .ok_or_else(|| GatewayError::server(400, "No active conversation"))?;
        let filename = format!("{}.json", conversation.id);
        state.saved.push((filename.clone(), conversation));
        Ok(SavedAs { filename })
    }

    async fn list_conversations(&self) -> Result<Vec<SavedConversation>, GatewayError> {
        let mut state = lock(&self.state);
        state.calls.push(RecordedCall::List);
        Self::check_fail(&mut state, FakeOp::List)?;

        Ok(state
            .saved
            .iter()
            .map(|(filename, conversation)| SavedConversation {
                filename: filename.clone(),
                name: conversation.name.clone(),
                created_at: conversation.created_at.clone(),
                message_count: conversation.messages.len(),
            })
            .collect())
    }

    async fn load_conversation(&self, filename: &str) -> Result<(), GatewayError> {
        let mut state = lock(&self.state);
        state.calls.push(RecordedCall::Load {
            filename: filename.to_string(),
        });
        Self::check_fail(&mut state, FakeOp::Load)?;

        let conversation = state
            .saved
            .iter()
            .find(|(f, _)| f == filename)
            .map(|(_, c)| c.clone())
            .ok_or_else(|| GatewayError::server(404, "Conversation file not found"))?;
        state.session.current_message_index = conversation.messages.len() as i64 - 1;
        state.session.conversation = Some(conversation);
        Ok(())
    }

    async fn upload_character_image(
        &self,
        character_id: &CharacterId,
        upload: ImageUpload,
    ) -> Result<String, GatewayError> {
        let mut state = lock(&self.state);
        state.calls.push(RecordedCall::UploadImage {
            character_id: character_id.as_str().to_string(),
        });
        Self::check_fail(&mut state, FakeOp::UploadImage)?;

        let conversation = Self::conversation_mut(&mut state)?;
        let image_path = format!("images/{}_{}", character_id, upload.file_name);
        let character = conversation
            .characters
            .iter_mut()
            .find(|c| &c.id == character_id)
            .ok_or_else(|| GatewayError::server(404, "Character not found"))?;
        character.image_path = Some(image_path.clone());
        Ok(image_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn appends_advance_the_cursor() {
        let gateway = FakeGateway::with_characters("Alice", "Bob");
        gateway
            .send_manual_message(&CharacterId::new("char1"), "Hello")
            .await
            .expect("send");

        let session = gateway.session();
        assert_eq!(session.current_message_index, 0);
        assert_eq!(session.message_count(), 1);
    }

    #[tokio::test]
    async fn auto_generation_picks_a_different_speaker() {
        let gateway = FakeGateway::with_characters("Alice", "Bob");
        gateway
            .send_manual_message(&CharacterId::new("char1"), "Hello")
            .await
            .expect("send");
        gateway.generate_message(None).await.expect("generate");

        let session = gateway.session();
        let conversation = session.conversation.expect("conversation");
        assert_eq!(conversation.messages.len(), 2);
        assert_ne!(
            conversation.messages[1].character_id,
            conversation.messages[0].character_id
        );
    }

    #[tokio::test]
    async fn navigate_back_clamps_at_zero() {
        let gateway = FakeGateway::with_characters("Alice", "Bob");
        gateway
            .send_manual_message(&CharacterId::new("char1"), "Hello")
            .await
            .expect("send");

        let position = gateway.navigate(NavDirection::Back).await.expect("navigate");
        assert_eq!(position.current_index, 0);
        assert_eq!(position.total_messages, 1);

        // already at the floor; a second back is a no-op
        let position = gateway.navigate(NavDirection::Back).await.expect("navigate");
        assert_eq!(position.current_index, 0);
    }

    #[tokio::test]
    async fn fail_next_is_consumed_once() {
        let gateway = FakeGateway::with_characters("Alice", "Bob");
        gateway.fail_next(FakeOp::Generate, GatewayError::server(500, "model offline"));

        let err = gateway
            .generate_message(None)
            .await
            .expect_err("primed failure");
        assert_eq!(err, GatewayError::server(500, "model offline"));

        gateway.generate_message(None).await.expect("second attempt succeeds");
    }

    #[tokio::test]
    async fn hidden_reactions_are_not_stored() {
        let gateway = FakeGateway::with_characters("Alice", "Bob");
        gateway
            .toggle_setting(SettingKey::ShowReactions, false)
            .await
            .expect("toggle");
        gateway.generate_message(None).await.expect("generate");

        let session = gateway.session();
        let conversation = session.conversation.expect("conversation");
        assert_eq!(conversation.messages[0].reaction, None);
    }

    #[tokio::test]
    async fn save_then_load_round_trips() {
        let gateway = FakeGateway::with_characters("Alice", "Bob");
        gateway
            .send_manual_message(&CharacterId::new("char1"), "Hello")
            .await
            .expect("send");
        let saved = gateway.save_conversation().await.expect("save");

        let listing = gateway.list_conversations().await.expect("list");
        assert_eq!(listing.len(), 1);
        assert_eq!(listing[0].message_count, 1);

        gateway
            .load_conversation(&saved.filename)
            .await
            .expect("load");
        let session = gateway.session();
        assert_eq!(session.current_message_index, 0);
    }
}
