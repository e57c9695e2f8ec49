//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Invalid chunk, profile or model setup. Aborts a run before any remote call.
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid question id: {0}")]
    InvalidQuestion(String),

    #[error("Unknown profile: {0}")]
    UnknownProfile(String),

    #[error("Invalid pipeline transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Operation cancelled")]
    Cancelled,
}

impl DomainError {
    pub fn config(message: impl Into<String>) -> Self {
        DomainError::Config(message.into())
    }

    /// Check if this error represents a configuration problem
    pub fn is_config(&self) -> bool {
        matches!(self, DomainError::Config(_))
    }

    /// Check if this error represents a cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, DomainError::Cancelled)
    }
}
