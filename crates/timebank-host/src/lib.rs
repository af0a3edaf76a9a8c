//! Host collaborator interfaces for timebankd
//!
//! The engine never talks to the OS directly; it signals the screen
//! lock collaborator after settlement. Locking is best-effort and
//! fire-and-forget: failures are logged and swallowed, never surfaced
//! to the caller of Stop/Expire.

mod command;
mod mock;
mod traits;

pub use command::*;
pub use mock::*;
pub use traits::*;
