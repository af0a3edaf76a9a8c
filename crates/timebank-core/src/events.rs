//! Events emitted by the engine for the daemon to act on

use chrono::{DateTime, Local};
use timebank_util::{PersonId, SessionId};

/// Something the engine did or noticed that the daemon may react to.
#[derive(Debug, Clone, PartialEq)]
pub enum CoreEvent {
    /// A session began.
    SessionStarted {
        session_id: SessionId,
        person_id: PersonId,
        person_name: String,
        budget_seconds: i64,
        deadline: DateTime<Local>,
    },

    /// The countdown ran out. The daemon should call expire to settle
    /// and then signal the screen lock.
    ExpireDue {
        session_id: SessionId,
        person_id: PersonId,
    },
}
