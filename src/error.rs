// src/error.rs
// Standardized error types for the intake engine

use thiserror::Error;

/// Main error type for the intake library
#[derive(Error, Debug)]
pub enum IntakeError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("oracle error: {0}")]
    Oracle(String),

    #[error("malformed extraction payload: {0}")]
    MalformedExtraction(String),

    #[error("conversation not found: {0}")]
    ConversationNotFound(String),

    #[error("intake not complete for conversation {0}")]
    NotComplete(String),

    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

/// Convenience type alias for Result using IntakeError
pub type Result<T> = std::result::Result<T, IntakeError>;

impl IntakeError {
    /// Errors that come from the oracle round trip and are recovered per call
    /// rather than surfaced to the applicant.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            IntakeError::Oracle(_)
                | IntakeError::MalformedExtraction(_)
                | IntakeError::Anyhow(_)
        )
    }
}
