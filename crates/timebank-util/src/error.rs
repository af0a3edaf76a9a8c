//! Error types for timebankd

use thiserror::Error;

/// Core error type for timebankd operations
#[derive(Debug, Error)]
pub enum TimebankError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("No budget available")]
    NoBudgetAvailable,

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Store error: {0}")]
    StoreError(String),
}

impl TimebankError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, TimebankError>;
