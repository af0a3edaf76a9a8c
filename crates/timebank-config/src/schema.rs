//! Raw configuration schema (as parsed from TOML)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw configuration as parsed from TOML
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawConfig {
    /// Config schema version
    pub config_version: u32,

    /// Global service settings
    #[serde(default)]
    pub service: RawServiceConfig,

    /// Initial policy defaults (only applied when the store has no
    /// policy row yet; afterwards the store is authoritative)
    #[serde(default)]
    pub policy: RawPolicyDefaults,

    /// Persons to create on first run against an empty store
    #[serde(default)]
    pub seed_persons: Vec<RawSeedPerson>,
}

/// Service-level settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawServiceConfig {
    /// Data directory for the store (default: /var/lib/timebankd)
    pub data_dir: Option<PathBuf>,

    /// Screen lock command line, e.g. "loginctl lock-sessions".
    /// Unset disables locking.
    pub lock_command: Option<String>,

    /// Expiry watchdog tick interval in milliseconds (default: 1000)
    pub tick_interval_ms: Option<u64>,
}

/// Raw policy defaults
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawPolicyDefaults {
    /// Whether the daily bonus pool starts enabled (default: true)
    pub bonus_enabled: Option<bool>,

    /// Daily bonus pool size in minutes (default: 15)
    pub daily_bonus_cap_minutes: Option<f64>,

    /// Per-session cap in seconds (default: 3600); 0 disables the cap
    pub session_cap_seconds: Option<i64>,
}

/// Raw seed person definition
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawSeedPerson {
    /// Display name
    pub name: String,

    /// Starting main time balance in minutes (default: 30)
    pub initial_minutes: Option<f64>,
}
