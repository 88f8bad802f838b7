//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Transcript is empty")]
    EmptyTranscript,

    #[error("Transcript must end with a user turn, found {0}")]
    NotUserTurn(String),

    #[error("Invalid username: {0}")]
    InvalidUsername(String),

    #[error("Operation cancelled")]
    Cancelled,
}

impl DomainError {
    /// Check if this error represents a cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, DomainError::Cancelled)
    }
}

/// Validate a username before it reaches a store.
///
/// Usernames are trimmed-non-empty and free of control characters.
pub fn validate_username(username: &str) -> Result<(), DomainError> {
    if username.trim().is_empty() {
        return Err(DomainError::InvalidUsername("must not be empty".to_string()));
    }
    if username.chars().any(char::is_control) {
        return Err(DomainError::InvalidUsername(
            "must not contain control characters".to_string(),
        ));
    }
    Ok(())
}
