//! Shared utilities for timebankd
//!
//! This crate provides:
//! - ID types (PersonId, SessionId, LedgerEntryId)
//! - Fixed-point minute arithmetic (`Minutes`)
//! - Time utilities (monotonic time, duration helpers)
//! - Caller roles for the admin gate
//! - Error types

mod error;
mod ids;
mod minutes;
mod roles;
mod time;

pub use error::*;
pub use ids::*;
pub use minutes::*;
pub use roles::*;
pub use time::*;
