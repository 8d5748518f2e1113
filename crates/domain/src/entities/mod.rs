//! Domain entities

mod character;
mod conversation;
mod message;
mod scenario;
mod session;

pub use character::Character;
pub use conversation::{Conversation, PORTRAIT_SLOTS};
pub use message::Message;
pub use scenario::Scenario;
pub use session::Session;
