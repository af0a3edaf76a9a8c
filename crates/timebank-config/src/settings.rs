//! Typed settings (converted from the raw schema)

use std::path::PathBuf;
use std::time::Duration;
use timebank_store::PolicyConfig;
use timebank_util::Minutes;

use crate::RawConfig;

/// Default data directory for the store
pub fn default_data_dir() -> PathBuf {
    PathBuf::from("/var/lib/timebankd")
}

const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(1000);
const DEFAULT_SEED_MINUTES: f64 = 30.0;

/// Fully-resolved service settings
#[derive(Debug, Clone)]
pub struct Settings {
    pub service: ServiceConfig,

    /// Policy seeded into the store on first run
    pub policy_defaults: PolicyConfig,

    /// Persons created on first run against an empty store
    pub seed_persons: Vec<SeedPerson>,
}

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub data_dir: PathBuf,
    pub lock_command: Option<String>,
    pub tick_interval: Duration,
}

#[derive(Debug, Clone)]
pub struct SeedPerson {
    pub name: String,
    pub initial_minutes: Minutes,
}

impl Settings {
    /// Convert a validated raw config into settings
    pub fn from_raw(raw: RawConfig) -> Self {
        let defaults = PolicyConfig::default();

        let policy_defaults = PolicyConfig {
            bonus_enabled: raw.policy.bonus_enabled.unwrap_or(defaults.bonus_enabled),
            daily_bonus_cap: raw
                .policy
                .daily_bonus_cap_minutes
                .map(Minutes::from_minutes_f64)
                .unwrap_or(defaults.daily_bonus_cap),
            // 0 disables the cap
            session_cap_seconds: match raw.policy.session_cap_seconds {
                Some(0) => None,
                Some(cap) => Some(cap),
                None => defaults.session_cap_seconds,
            },
        };

        let seed_persons = raw
            .seed_persons
            .into_iter()
            .map(|p| SeedPerson {
                name: p.name,
                initial_minutes: Minutes::from_minutes_f64(
                    p.initial_minutes.unwrap_or(DEFAULT_SEED_MINUTES),
                ),
            })
            .collect();

        Self {
            service: ServiceConfig {
                data_dir: raw.service.data_dir.unwrap_or_else(default_data_dir),
                lock_command: raw.service.lock_command,
                tick_interval: raw
                    .service
                    .tick_interval_ms
                    .map(Duration::from_millis)
                    .unwrap_or(DEFAULT_TICK_INTERVAL),
            },
            policy_defaults,
            seed_persons,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            service: ServiceConfig {
                data_dir: default_data_dir(),
                lock_command: None,
                tick_interval: DEFAULT_TICK_INTERVAL,
            },
            policy_defaults: PolicyConfig::default(),
            seed_persons: vec![],
        }
    }
}
