//! Storyweave App - application services for the narrative session client
//!
//! The core of the client: a locally cached mirror of server-held
//! conversation state (`StateStore`), full-snapshot reconciliation after
//! every mutation (`Reconciler`), and the turn state machine that decides
//! who speaks next (`TurnOrchestrator`). Settings, navigation, and
//! conversation lifecycle are thin request/response plumbing around the
//! same gateway port.

mod conversation;
mod error;
mod navigation;
mod orchestrator;
mod reconciler;
mod settings;
mod state;

pub use conversation::ConversationService;
pub use error::ServiceError;
pub use navigation::NavigationService;
pub use orchestrator::{TurnOrchestrator, TurnState, CHAIN_DELAY};
pub use reconciler::Reconciler;
pub use settings::{reaction_to_render, SettingsService};
pub use state::StateStore;
