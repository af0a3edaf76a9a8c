//! Session state
//!
//! At most one session is active at a time. The budget and the main
//! balance are frozen at start; the countdown runs on monotonic time
//! and polls never touch the store.

use chrono::{DateTime, Duration as ChronoDuration, Local};
use serde::Serialize;
use timebank_store::Person;
use timebank_util::{Minutes, MonotonicInstant, PersonId, SessionId};

/// Phase of the active session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Countdown running, budget not yet exhausted.
    Running,
    /// Deadline passed; expiry has been announced but not yet settled.
    Expiring,
}

/// The single in-memory active session.
#[derive(Debug, Clone)]
pub struct ActiveSession {
    pub session_id: SessionId,
    pub person_id: PersonId,
    pub person_name: String,
    pub phase: SessionPhase,

    pub started_at: DateTime<Local>,
    pub started_at_mono: MonotonicInstant,

    /// Seconds granted at start, fixed for the session's lifetime.
    pub budget_seconds: i64,

    /// Raw main balance at start (may be negative). Settlement debits
    /// against this frozen value, not the live row.
    pub main_snapshot: Minutes,
}

impl ActiveSession {
    pub fn start(
        person: &Person,
        budget_seconds: i64,
        now: DateTime<Local>,
        now_mono: MonotonicInstant,
    ) -> Self {
        Self {
            session_id: SessionId::new(),
            person_id: person.id,
            person_name: person.name.clone(),
            phase: SessionPhase::Running,
            started_at: now,
            started_at_mono: now_mono,
            budget_seconds,
            main_snapshot: person.main_minutes,
        }
    }

    /// Whole seconds elapsed since start, by monotonic time.
    pub fn elapsed_seconds(&self, now_mono: MonotonicInstant) -> i64 {
        now_mono.duration_since(self.started_at_mono).as_secs() as i64
    }

    /// Seconds left before expiry, floored at zero.
    pub fn remaining_seconds(&self, now_mono: MonotonicInstant) -> i64 {
        (self.budget_seconds - self.elapsed_seconds(now_mono)).max(0)
    }

    pub fn is_expired(&self, now_mono: MonotonicInstant) -> bool {
        self.remaining_seconds(now_mono) == 0
    }

    /// Wall-clock deadline, for display only; enforcement is monotonic.
    pub fn deadline(&self) -> DateTime<Local> {
        self.started_at + ChronoDuration::seconds(self.budget_seconds)
    }

    pub fn status(&self, now_mono: MonotonicInstant) -> SessionStatus {
        SessionStatus {
            active: true,
            session_id: Some(self.session_id),
            person_id: Some(self.person_id),
            person_name: Some(self.person_name.clone()),
            remaining_seconds: self.remaining_seconds(now_mono),
        }
    }
}

/// Snapshot answer to a poll. Computed without store access.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionStatus {
    pub active: bool,
    pub session_id: Option<SessionId>,
    pub person_id: Option<PersonId>,
    pub person_name: Option<String>,
    pub remaining_seconds: i64,
}

impl SessionStatus {
    pub fn idle() -> Self {
        Self {
            active: false,
            session_id: None,
            person_id: None,
            person_name: None,
            remaining_seconds: 0,
        }
    }
}
