//! Gateway error type
//!
//! Abstracts over transport failures so application services can surface a
//! user-facing message without knowing about HTTP.

use thiserror::Error;

/// Errors returned by gateway operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// The backend answered with a non-success status
    #[error("Server error ({status}): {detail}")]
    Server { status: u16, detail: String },

    /// The request never completed (connection refused, dropped, ...)
    #[error("Request failed: {0}")]
    Transport(String),

    /// The request exceeded the configured timeout
    #[error("Request timed out")]
    Timeout,

    /// The response body could not be decoded
    #[error("Failed to decode response: {0}")]
    Decode(String),
}

impl GatewayError {
    pub fn server(status: u16, detail: impl Into<String>) -> Self {
        Self::Server {
            status,
            detail: detail.into(),
        }
    }

    /// The message to show the user: the server-provided detail when there
    /// is one, otherwise a generic per-variant fallback.
    pub fn detail(&self) -> String {
        match self {
            Self::Server { detail, .. } if !detail.is_empty() => detail.clone(),
            Self::Server { status, .. } => format!("Request failed with status {status}"),
            Self::Transport(_) => "Could not reach the story server".to_string(),
            Self::Timeout => "The story server took too long to respond".to_string(),
            Self::Decode(_) => "The story server sent an unreadable response".to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Server { status: 404, .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_detail_is_preferred() {
        let err = GatewayError::server(404, "Character not found");
        assert_eq!(err.detail(), "Character not found");
        assert!(err.is_not_found());
    }

    #[test]
    fn empty_detail_falls_back_to_status() {
        let err = GatewayError::server(500, "");
        assert_eq!(err.detail(), "Request failed with status 500");
    }

    #[test]
    fn transport_gets_generic_message() {
        let err = GatewayError::Transport("connection refused".to_string());
        assert_eq!(err.detail(), "Could not reach the story server");
    }
}
