//! Service layer error types
//!
//! Three failure families: local validation (never reaches the gateway),
//! overlap rejection, and gateway failures carrying the server's detail
//! message when one exists. No service retries and none propagates a
//! failure past its own boundary without first releasing the thinking
//! indicator and emitting a status line.

use thiserror::Error;

use storyweave_domain::DomainError;
use storyweave_ports::outbound::GatewayError;

/// Errors returned by application service operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// Missing or invalid local input; detected before any gateway contact
    #[error("{0}")]
    Validation(String),

    /// A mutating operation is already in flight
    #[error("Another operation is already in progress")]
    Busy,

    /// A gateway call failed
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

impl ServiceError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// The conversation-scoped-action-without-a-conversation state error
    pub fn no_conversation() -> Self {
        Self::Validation("No active conversation".to_string())
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Text for the status line
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(msg) => msg.clone(),
            Self::Busy => "Another operation is already in progress".to_string(),
            Self::Gateway(err) => err.detail(),
        }
    }
}

impl From<DomainError> for ServiceError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) => Self::Validation(msg),
            DomainError::NotFound { .. } => Self::Validation(err.to_string()),
        }
    }
}
