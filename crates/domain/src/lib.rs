//! Storyweave Domain - core types for the narrative session client
//!
//! Pure data and invariants: no async, no transport, no rendering. The
//! Session snapshot defined here is the single shared resource of the whole
//! client; everything above this crate agrees to replace it wholesale and
//! never patch it field by field.

pub mod entities;
mod error;
mod ids;

pub use entities::{Character, Conversation, Message, Scenario, Session, PORTRAIT_SLOTS};
pub use error::DomainError;
pub use ids::{CharacterId, ConversationId, MessageId};
