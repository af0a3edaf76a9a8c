//! Persistence layer for timebankd
//!
//! Provides:
//! - Person records (the directly-stored time balance)
//! - Policy singleton (bonus toggle, caps)
//! - Append-mostly audit ledger (source of truth for the points score)

mod ledger;
mod person;
mod policy;
mod sqlite;
mod traits;

pub use ledger::*;
pub use person::*;
pub use policy::*;
pub use sqlite::*;
pub use traits::*;

use thiserror::Error;
use timebank_util::TimebankError;

/// Store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        StoreError::Database(e.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Serialization(e.to_string())
    }
}

impl From<StoreError> for TimebankError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(msg) => TimebankError::NotFound(msg),
            other => TimebankError::StoreError(other.to_string()),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
