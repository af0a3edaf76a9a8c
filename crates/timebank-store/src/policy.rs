//! Process-wide policy configuration
//!
//! Stored as a singleton row; mutated only through the bonus toggle.

use serde::{Deserialize, Serialize};
use timebank_util::Minutes;

/// Default daily bonus pool, in minutes.
pub const DEFAULT_DAILY_BONUS_CAP: Minutes = Minutes::from_minutes(15);

/// Default per-session cap, in seconds.
pub const DEFAULT_SESSION_CAP_SECONDS: i64 = 3600;

/// Policy knobs for budget computation and session caps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Whether the daily bonus pool is available at all.
    pub bonus_enabled: bool,

    /// Size of the daily bonus pool.
    pub daily_bonus_cap: Minutes,

    /// Upper bound on a single session, if any.
    pub session_cap_seconds: Option<i64>,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            bonus_enabled: true,
            daily_bonus_cap: DEFAULT_DAILY_BONUS_CAP,
            session_cap_seconds: Some(DEFAULT_SESSION_CAP_SECONDS),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy() {
        let policy = PolicyConfig::default();
        assert!(policy.bonus_enabled);
        assert_eq!(policy.daily_bonus_cap, Minutes::from_minutes(15));
        assert_eq!(policy.session_cap_seconds, Some(3600));
    }

    #[test]
    fn policy_serde_roundtrip() {
        let policy = PolicyConfig {
            bonus_enabled: false,
            daily_bonus_cap: Minutes::from_minutes(10),
            session_cap_seconds: None,
        };
        let json = serde_json::to_string(&policy).unwrap();
        let parsed: PolicyConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, policy);
    }
}
