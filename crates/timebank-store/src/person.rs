//! Person records
//!
//! A person's main time balance is stored directly; the points score is
//! never stored and is always derived from the ledger.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use timebank_util::{Minutes, PersonId};

/// A person with a time allowance.
///
/// Invariants (maintained by the engine):
/// - `main_minutes >= -5`
/// - `0 <= daily_bonus_used <= policy.daily_bonus_cap`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    pub id: PersonId,
    pub name: String,

    /// Primary allowance balance, floored at -5 minutes, no ceiling.
    pub main_minutes: Minutes,

    /// Bonus pool consumed today, in [0, daily_bonus_cap].
    pub daily_bonus_used: Minutes,

    /// Day the bonus counter was last reset; reset happens lazily on
    /// the first touch of a stale record.
    pub last_reset_date: NaiveDate,
}

/// Data for creating a person (the store assigns the id).
#[derive(Debug, Clone)]
pub struct NewPerson {
    pub name: String,
    pub initial_minutes: Minutes,
    pub created_on: NaiveDate,
}
