//! Screen lock trait

use async_trait::async_trait;
use thiserror::Error;

/// Errors from host operations
#[derive(Debug, Error)]
pub enum HostError {
    #[error("Lock command failed: {0}")]
    LockFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type HostResult<T> = Result<T, HostError>;

/// Screen lock collaborator - implemented by platform-specific adapters
#[async_trait]
pub trait ScreenLock: Send + Sync {
    /// Lock the screen. Best-effort; callers must not treat failure as
    /// a reason to roll back settlement.
    async fn lock(&self) -> HostResult<()>;
}
