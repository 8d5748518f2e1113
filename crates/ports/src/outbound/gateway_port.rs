//! Gateway Port - outbound port for story backend operations
//!
//! Abstracts the request/response surface of the backend so application
//! services never depend on a concrete HTTP client. The trait is
//! intentionally object-safe: services hold an `Arc<dyn GatewayPort>`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use storyweave_domain::{Character, CharacterId, ConversationId, Session};

use super::GatewayError;

/// Direction for history navigation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NavDirection {
    Back,
    Forward,
}

impl NavDirection {
    /// Wire name used by the backend (`back` / `forward`)
    pub fn as_wire(&self) -> &'static str {
        match self {
            Self::Back => "back",
            Self::Forward => "forward",
        }
    }
}

/// Authoritative cursor position returned by a navigation request.
/// The backend owns all index arithmetic and boundary clamping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavPosition {
    pub current_index: i64,
    pub total_messages: i64,
}

/// Persisted boolean settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingKey {
    AutoResponse,
    ShowReactions,
}

impl SettingKey {
    /// Wire name used by the backend
    pub fn as_wire(&self) -> &'static str {
        match self {
            Self::AutoResponse => "auto_response",
            Self::ShowReactions => "show_reactions",
        }
    }
}

/// Payload for creating a conversation: a scenario and its two seed
/// characters. The backend adds the narrator itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewConversation {
    pub scenario_description: String,
    pub character1_name: String,
    pub character1_description: String,
    pub character2_name: String,
    pub character2_description: String,
}

/// Identifier returned by a save request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedAs {
    pub filename: String,
}

/// Summary entry in the saved-conversations listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedConversation {
    pub filename: String,
    pub name: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub message_count: usize,
}

/// An image file selected for upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Outbound port for all backend operations.
///
/// Mutating operations return no data on success: callers converge on the
/// authoritative state through a full `fetch_state` afterwards, never by
/// patching local fields from a response body.
#[async_trait]
pub trait GatewayPort: Send + Sync {
    /// Fetch the complete session snapshot
    async fn fetch_state(&self) -> Result<Session, GatewayError>;

    /// Create a conversation from a scenario and two seed characters
    async fn create_conversation(
        &self,
        request: NewConversation,
    ) -> Result<ConversationId, GatewayError>;

    /// Add a character to the active conversation
    async fn add_character(
        &self,
        name: &str,
        description: &str,
    ) -> Result<Character, GatewayError>;

    /// Ask the backend to produce the next turn. With `None` the backend
    /// selects the responding character itself.
    async fn generate_message(
        &self,
        character_id: Option<&CharacterId>,
    ) -> Result<(), GatewayError>;

    /// Append a user-authored message for the given character
    async fn send_manual_message(
        &self,
        character_id: &CharacterId,
        content: &str,
    ) -> Result<(), GatewayError>;

    /// Edit a message in place. `reaction` of `None` leaves the stored
    /// reaction untouched.
    async fn edit_message(
        &self,
        index: usize,
        content: &str,
        reaction: Option<&str>,
    ) -> Result<(), GatewayError>;

    /// Discard and regenerate the most recent message
    async fn regenerate_last(&self) -> Result<(), GatewayError>;

    /// Move the history cursor; returns the authoritative position
    async fn navigate(&self, direction: NavDirection) -> Result<NavPosition, GatewayError>;

    /// Persist a boolean setting
    async fn toggle_setting(&self, setting: SettingKey, value: bool) -> Result<(), GatewayError>;

    /// Update the steering fields of the scenario
    async fn update_scenario(
        &self,
        what_happens_next: Option<&str>,
        never_forget: Option<&str>,
    ) -> Result<(), GatewayError>;

    /// Save the active conversation; returns its filename
    async fn save_conversation(&self) -> Result<SavedAs, GatewayError>;

    /// List saved conversations
    async fn list_conversations(&self) -> Result<Vec<SavedConversation>, GatewayError>;

    /// Replace the session with a saved conversation
    async fn load_conversation(&self, filename: &str) -> Result<(), GatewayError>;

    /// Upload a portrait image for a character; returns the stored path
    async fn upload_character_image(
        &self,
        character_id: &CharacterId,
        upload: ImageUpload,
    ) -> Result<String, GatewayError>;
}
