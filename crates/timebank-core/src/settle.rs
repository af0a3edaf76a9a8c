//! Settlement arithmetic
//!
//! Pure functions that turn elapsed session time into new balances.
//! Debiting starts against the main balance frozen at session start;
//! overrun past zero is absorbed by the daily bonus pool (capped) and
//! the main balance lands on the floor. The bonus counter used here is
//! the live one, read after the daily reset.

use timebank_store::{PolicyConfig, REASON_SESSION_EXPIRED, REASON_SESSION_STOPPED};
use timebank_util::Minutes;

use crate::MAIN_FLOOR;

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEndReason {
    /// Admin stopped it before the deadline.
    Stopped,
    /// The countdown ran out.
    Expired,
}

impl SessionEndReason {
    /// Fixed reason text written to the ledger.
    pub fn ledger_reason(&self) -> &'static str {
        match self {
            SessionEndReason::Stopped => REASON_SESSION_STOPPED,
            SessionEndReason::Expired => REASON_SESSION_EXPIRED,
        }
    }
}

/// New (main, bonus_used) balances after charging `elapsed` against
/// a session started with `main_baseline` frozen.
///
/// - Positive baseline: debit main; if it would cross zero and the
///   bonus pool is enabled, the shortfall is charged to the bonus
///   counter (capped) and main lands on the floor.
/// - Non-positive baseline: the whole session ran on bonus, so only
///   the bonus counter moves, and only while the pool is enabled and
///   not already full.
pub fn settle_balances(
    main_baseline: Minutes,
    bonus_used: Minutes,
    elapsed: Minutes,
    policy: &PolicyConfig,
) -> (Minutes, Minutes) {
    if main_baseline.is_positive() {
        let raw = main_baseline - elapsed;
        if raw.is_negative() && policy.bonus_enabled {
            let bonus_after = (bonus_used + raw.abs()).clamp_cap(policy.daily_bonus_cap);
            (MAIN_FLOOR, bonus_after)
        } else {
            (raw.clamp_floor(MAIN_FLOOR), bonus_used)
        }
    } else if policy.bonus_enabled && bonus_used < policy.daily_bonus_cap {
        let bonus_after = (bonus_used + elapsed).clamp_cap(policy.daily_bonus_cap);
        (main_baseline, bonus_after)
    } else {
        (main_baseline, bonus_used)
    }
}
