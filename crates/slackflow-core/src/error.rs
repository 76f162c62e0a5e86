//! Error types for the trigger engine

use thiserror::Error;

/// Trigger engine error types
#[derive(Error, Debug)]
pub enum TriggerError {
    #[error("Invalid filter pattern '{pattern}': {reason}")]
    InvalidFilterPattern { pattern: String, reason: String },

    #[error("Missing required Slack credential: {0}")]
    MissingCredential(&'static str),

    #[error("Failed to subscribe category '{category}': {reason}")]
    Subscription { category: String, reason: String },

    #[error("Acknowledgment failed: {0}")]
    Acknowledgment(String),

    #[error("Failed to emit record: {0}")]
    Emission(String),

    #[error("Session error: {0}")]
    Session(String),

    #[error("Cannot {operation} a dispatcher that is {state}")]
    InvalidState {
        operation: &'static str,
        state: &'static str,
    },

    #[error("Slack API error: {0}")]
    SlackApi(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl TriggerError {
    /// Errors raised while validating an activation, before any session exists.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidFilterPattern { .. } | Self::MissingCredential(_)
        )
    }
}

/// Result type alias for trigger operations
pub type Result<T> = std::result::Result<T, TriggerError>;
