//! Configuration validation

use std::collections::HashSet;
use std::fmt;

use crate::RawConfig;

/// A single validation failure with the field that caused it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a raw config, collecting all failures
pub fn validate_config(raw: &RawConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if let Some(cap) = raw.policy.daily_bonus_cap_minutes {
        if !cap.is_finite() || cap < 0.0 {
            errors.push(ValidationError::new(
                "policy.daily_bonus_cap_minutes",
                "must be a non-negative number",
            ));
        }
    }

    if let Some(cap) = raw.policy.session_cap_seconds {
        if cap < 0 {
            errors.push(ValidationError::new(
                "policy.session_cap_seconds",
                "must be non-negative (0 disables the cap)",
            ));
        }
    }

    if let Some(ms) = raw.service.tick_interval_ms {
        if ms == 0 {
            errors.push(ValidationError::new(
                "service.tick_interval_ms",
                "must be greater than zero",
            ));
        }
    }

    if let Some(cmd) = &raw.service.lock_command {
        if cmd.split_whitespace().next().is_none() {
            errors.push(ValidationError::new(
                "service.lock_command",
                "must name a program (or be omitted)",
            ));
        }
    }

    let mut seen = HashSet::new();
    for (i, person) in raw.seed_persons.iter().enumerate() {
        let field = format!("seed_persons[{}]", i);

        if person.name.trim().is_empty() {
            errors.push(ValidationError::new(format!("{}.name", field), "must not be empty"));
        } else if !seen.insert(person.name.clone()) {
            errors.push(ValidationError::new(
                format!("{}.name", field),
                format!("duplicate name {:?}", person.name),
            ));
        }

        if let Some(minutes) = person.initial_minutes {
            if !minutes.is_finite() || minutes < -5.0 {
                errors.push(ValidationError::new(
                    format!("{}.initial_minutes", field),
                    "must be a number of at least -5",
                ));
            }
        }
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{RawPolicyDefaults, RawSeedPerson, RawServiceConfig};

    fn minimal_raw() -> RawConfig {
        RawConfig {
            config_version: 1,
            service: RawServiceConfig::default(),
            policy: RawPolicyDefaults::default(),
            seed_persons: vec![],
        }
    }

    #[test]
    fn empty_config_is_valid() {
        assert!(validate_config(&minimal_raw()).is_empty());
    }

    #[test]
    fn rejects_negative_caps() {
        let mut raw = minimal_raw();
        raw.policy.daily_bonus_cap_minutes = Some(-1.0);
        raw.policy.session_cap_seconds = Some(-10);

        let errors = validate_config(&raw);
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].field, "policy.daily_bonus_cap_minutes");
        assert_eq!(errors[1].field, "policy.session_cap_seconds");
    }

    #[test]
    fn rejects_duplicate_seed_names() {
        let mut raw = minimal_raw();
        raw.seed_persons = vec![
            RawSeedPerson {
                name: "Alex".into(),
                initial_minutes: None,
            },
            RawSeedPerson {
                name: "Alex".into(),
                initial_minutes: None,
            },
        ];

        let errors = validate_config(&raw);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "seed_persons[1].name");
    }

    #[test]
    fn rejects_blank_lock_command() {
        let mut raw = minimal_raw();
        raw.service.lock_command = Some("   ".into());

        let errors = validate_config(&raw);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "service.lock_command");
    }

    #[test]
    fn rejects_seed_balance_below_floor() {
        let mut raw = minimal_raw();
        raw.seed_persons = vec![RawSeedPerson {
            name: "Alex".into(),
            initial_minutes: Some(-6.0),
        }];

        let errors = validate_config(&raw);
        assert_eq!(errors.len(), 1);
    }
}
