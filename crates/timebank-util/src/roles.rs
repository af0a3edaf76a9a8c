//! Caller roles for the admin gate
//!
//! The engine performs no password handling; an external authenticator
//! decides the caller's role and the engine only checks capabilities.

use serde::{Deserialize, Serialize};

/// Role of the caller issuing an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallerRole {
    /// Kiosk/display surface - can read budgets and poll the session
    Viewer,
    /// Authenticated admin - can mutate balances, sessions, and the ledger
    Admin,
}

impl CallerRole {
    pub fn can_start_session(&self) -> bool {
        matches!(self, CallerRole::Admin)
    }

    pub fn can_stop_session(&self) -> bool {
        matches!(self, CallerRole::Admin)
    }

    pub fn can_adjust_balances(&self) -> bool {
        matches!(self, CallerRole::Admin)
    }

    pub fn can_manage_ledger(&self) -> bool {
        matches!(self, CallerRole::Admin)
    }

    pub fn can_manage_persons(&self) -> bool {
        matches!(self, CallerRole::Admin)
    }

    pub fn can_toggle_bonus(&self) -> bool {
        matches!(self, CallerRole::Admin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn viewer_cannot_mutate() {
        let role = CallerRole::Viewer;
        assert!(!role.can_start_session());
        assert!(!role.can_adjust_balances());
        assert!(!role.can_manage_ledger());
        assert!(!role.can_toggle_bonus());
    }

    #[test]
    fn admin_can_mutate() {
        let role = CallerRole::Admin;
        assert!(role.can_start_session());
        assert!(role.can_stop_session());
        assert!(role.can_adjust_balances());
        assert!(role.can_manage_persons());
    }
}
