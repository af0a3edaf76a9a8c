//! Ledger entry types
//!
//! Entries are immutable once written, except for admin edits of the
//! reason text and explicit admin deletion. The time axis and the
//! points axis are independent: settlements touch only time, point
//! grants touch only points, and time grants touch both.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use timebank_util::{LedgerEntryId, Minutes, PersonId};

/// Fixed reason tag for a manual stop settlement.
pub const REASON_SESSION_STOPPED: &str = "session stopped";

/// Fixed reason tag for an expiry settlement.
pub const REASON_SESSION_EXPIRED: &str = "time expired";

/// A balance-changing event in the audit ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: LedgerEntryId,
    pub person_id: PersonId,

    /// Signed change to the main time balance recorded by this event.
    pub time_change: Minutes,

    /// Signed change to the derived points score. Settlements always
    /// record zero here.
    pub points_change: Minutes,

    /// Free text, admin-editable post-hoc.
    pub reason: String,

    pub timestamp: DateTime<Local>,
}

/// Data for appending a ledger entry (the store assigns the id).
#[derive(Debug, Clone)]
pub struct NewLedgerEntry {
    pub person_id: PersonId,
    pub time_change: Minutes,
    pub points_change: Minutes,
    pub reason: String,
    pub timestamp: DateTime<Local>,
}

impl NewLedgerEntry {
    /// Entry for a session settlement: time goes down, points untouched.
    pub fn settlement(
        person_id: PersonId,
        elapsed: Minutes,
        reason: &str,
        at: DateTime<Local>,
    ) -> Self {
        Self {
            person_id,
            time_change: -elapsed,
            points_change: Minutes::ZERO,
            reason: reason.to_string(),
            timestamp: at,
        }
    }

    /// Entry for a manual time adjustment: time grants also count as points.
    pub fn time_adjustment(
        person_id: PersonId,
        delta: Minutes,
        reason: impl Into<String>,
        at: DateTime<Local>,
    ) -> Self {
        Self {
            person_id,
            time_change: delta,
            points_change: delta,
            reason: reason.into(),
            timestamp: at,
        }
    }

    /// Entry for a manual points adjustment: never touches time.
    pub fn points_adjustment(
        person_id: PersonId,
        delta: Minutes,
        reason: impl Into<String>,
        at: DateTime<Local>,
    ) -> Self {
        Self {
            person_id,
            time_change: Minutes::ZERO,
            points_change: delta,
            reason: reason.into(),
            timestamp: at,
        }
    }
}
