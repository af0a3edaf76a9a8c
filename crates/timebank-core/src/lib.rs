//! Time-budget accounting and session engine for timebankd
//!
//! This crate is the heart of timebankd, containing:
//! - Budget calculation (main time + daily bonus pool, lazy daily reset)
//! - Session state machine (Idle -> Running -> Expiring -> settled)
//! - Settlement (elapsed time -> balance mutations + one ledger entry)
//! - Admin operations (adjustments, bonus toggle, ledger management)
//! - Time enforcement using monotonic time

mod budget;
mod engine;
mod events;
mod session;
mod settle;

pub use budget::*;
pub use engine::*;
pub use events::*;
pub use session::*;
pub use settle::*;
