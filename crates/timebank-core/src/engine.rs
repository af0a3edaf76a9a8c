//! The budget engine
//!
//! Owns the in-memory session slot and the cached policy, and brokers
//! every operation against the store. Callers supply the current wall
//! clock and monotonic instant, which keeps the engine deterministic
//! under test.

use std::sync::Arc;

use chrono::{DateTime, Local};
use tracing::{debug, info, warn};

use timebank_store::{LedgerEntry, NewLedgerEntry, NewPerson, Person, PolicyConfig, Store};
use timebank_util::{
    format_duration, CallerRole, LedgerEntryId, Minutes, MonotonicInstant, PersonId, Result,
    SessionId, TimebankError,
};

use crate::{
    apply_daily_reset_if_stale, available_seconds, settle_balances, ActiveSession, BudgetView,
    CoreEvent, SessionEndReason, SessionPhase, SessionStatus, MAIN_FLOOR,
};

/// Outcome of a stop or expire call.
#[derive(Debug, Clone, PartialEq)]
pub enum StopDecision {
    /// A session was settled; the ledger entry has been written.
    Settled(StopResult),
    /// No session was active. Safe to call repeatedly.
    Idle,
}

/// Details of a completed settlement.
#[derive(Debug, Clone, PartialEq)]
pub struct StopResult {
    pub session_id: SessionId,
    pub person_id: PersonId,
    pub reason: SessionEndReason,
    pub elapsed_minutes: Minutes,
    pub entry: LedgerEntry,
}

/// A ledger entry joined with the person's display name.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerView {
    pub entry: LedgerEntry,
    pub person_name: String,
}

/// Name shown for entries whose person has since been deleted.
const UNKNOWN_PERSON: &str = "Unknown";

pub struct BudgetEngine {
    store: Arc<dyn Store>,
    policy: PolicyConfig,
    current_session: Option<ActiveSession>,
}

impl BudgetEngine {
    pub fn new(store: Arc<dyn Store>, policy: PolicyConfig) -> Self {
        Self {
            store,
            policy,
            current_session: None,
        }
    }

    /// Build an engine from the policy saved in the store, falling back
    /// to defaults when no policy row exists yet.
    pub fn load(store: Arc<dyn Store>) -> Result<Self> {
        let policy = store.load_policy()?.unwrap_or_default();
        Ok(Self::new(store, policy))
    }

    pub fn policy(&self) -> &PolicyConfig {
        &self.policy
    }

    pub fn has_active_session(&self) -> bool {
        self.current_session.is_some()
    }

    // Person reads

    pub fn list_persons(&self) -> Result<Vec<Person>> {
        Ok(self.store.list_persons()?)
    }

    fn person_or_not_found(&self, id: PersonId) -> Result<Person> {
        self.store
            .get_person(id)?
            .ok_or_else(|| TimebankError::not_found(format!("person {}", id)))
    }

    /// Fetch a person, applying (and persisting) the daily bonus reset
    /// if the record is stale.
    fn refreshed_person(&self, id: PersonId, today: chrono::NaiveDate) -> Result<Person> {
        let person = self.person_or_not_found(id)?;
        match apply_daily_reset_if_stale(&person, today) {
            Some(updated) => {
                self.store.update_person(&updated)?;
                debug!(person_id = %id, %today, "daily bonus reset applied");
                Ok(updated)
            }
            None => Ok(person),
        }
    }

    /// Read-only budget summary for one person.
    pub fn available_budget(&self, person_id: PersonId, now: DateTime<Local>) -> Result<BudgetView> {
        let person = self.refreshed_person(person_id, now.date_naive())?;
        Ok(BudgetView::of(&person, &self.policy))
    }

    // Session lifecycle

    /// Start a session for a person. Grants the full available budget,
    /// optionally clipped by the policy session cap and the requested
    /// length. If a session is already running it is discarded without
    /// settlement; the new session wins.
    pub fn start_session(
        &mut self,
        role: CallerRole,
        person_id: PersonId,
        requested_minutes: Option<Minutes>,
        now: DateTime<Local>,
        now_mono: MonotonicInstant,
    ) -> Result<CoreEvent> {
        if !role.can_start_session() {
            return Err(TimebankError::Unauthorized);
        }

        if let Some(requested) = requested_minutes {
            if !requested.is_positive() {
                return Err(TimebankError::invalid("requested minutes must be positive"));
            }
        }

        let person = self.refreshed_person(person_id, now.date_naive())?;

        let mut budget_seconds = available_seconds(&person, &self.policy);
        if budget_seconds == 0 {
            return Err(TimebankError::NoBudgetAvailable);
        }
        if let Some(cap) = self.policy.session_cap_seconds {
            budget_seconds = budget_seconds.min(cap);
        }
        if let Some(requested) = requested_minutes {
            budget_seconds = budget_seconds.min(requested.as_seconds());
        }

        if let Some(previous) = self.current_session.take() {
            warn!(
                session_id = %previous.session_id,
                person = %previous.person_name,
                "replacing running session without settlement"
            );
        }

        let session = ActiveSession::start(&person, budget_seconds, now, now_mono);
        let event = CoreEvent::SessionStarted {
            session_id: session.session_id,
            person_id: session.person_id,
            person_name: session.person_name.clone(),
            budget_seconds,
            deadline: session.deadline(),
        };
        info!(
            session_id = %session.session_id,
            person = %session.person_name,
            budget = %format_duration(std::time::Duration::from_secs(budget_seconds as u64)),
            "session started"
        );
        self.current_session = Some(session);
        Ok(event)
    }

    /// Current session status. Pure read; never touches the store.
    pub fn poll(&self, now_mono: MonotonicInstant) -> SessionStatus {
        match &self.current_session {
            Some(session) => session.status(now_mono),
            None => SessionStatus::idle(),
        }
    }

    /// Watchdog step. Announces expiry once when the countdown runs
    /// out; the caller is expected to follow up with
    /// [`expire_session`](BudgetEngine::expire_session).
    pub fn tick(&mut self, now_mono: MonotonicInstant) -> Option<CoreEvent> {
        let session = self.current_session.as_mut()?;
        if session.phase == SessionPhase::Running && session.is_expired(now_mono) {
            session.phase = SessionPhase::Expiring;
            return Some(CoreEvent::ExpireDue {
                session_id: session.session_id,
                person_id: session.person_id,
            });
        }
        None
    }

    /// Stop the active session early and settle the elapsed time.
    /// Idempotent: returns `Idle` when nothing is running.
    pub fn stop_session(
        &mut self,
        role: CallerRole,
        now: DateTime<Local>,
        now_mono: MonotonicInstant,
    ) -> Result<StopDecision> {
        if !role.can_stop_session() {
            return Err(TimebankError::Unauthorized);
        }
        self.end_session(SessionEndReason::Stopped, now, now_mono)
    }

    /// Settle an expired session, charging the full granted budget.
    /// Called by the daemon watchdog, so no role gate.
    pub fn expire_session(
        &mut self,
        now: DateTime<Local>,
        now_mono: MonotonicInstant,
    ) -> Result<StopDecision> {
        self.end_session(SessionEndReason::Expired, now, now_mono)
    }

    fn end_session(
        &mut self,
        reason: SessionEndReason,
        now: DateTime<Local>,
        now_mono: MonotonicInstant,
    ) -> Result<StopDecision> {
        let Some(session) = self.current_session.take() else {
            return Ok(StopDecision::Idle);
        };

        // Expiry always charges the full grant; a manual stop charges
        // the measured elapsed time, never more than the grant.
        let elapsed_seconds = match reason {
            SessionEndReason::Expired => session.budget_seconds,
            SessionEndReason::Stopped => {
                session.elapsed_seconds(now_mono).min(session.budget_seconds)
            }
        };
        let elapsed_minutes = Minutes::from_secs_rounded(elapsed_seconds);

        let person = match self.store.get_person(session.person_id) {
            Ok(Some(person)) => person,
            Ok(None) => {
                warn!(
                    session_id = %session.session_id,
                    person_id = %session.person_id,
                    "person deleted while session was running; nothing to settle"
                );
                return Ok(StopDecision::Idle);
            }
            Err(err) => {
                self.current_session = Some(session);
                return Err(err.into());
            }
        };

        // Re-read the bonus counter through the daily reset; the main
        // balance is debited from the snapshot taken at start.
        let person = match apply_daily_reset_if_stale(&person, now.date_naive()) {
            Some(updated) => updated,
            None => person,
        };

        let (main_after, bonus_after) = settle_balances(
            session.main_snapshot,
            person.daily_bonus_used,
            elapsed_minutes,
            &self.policy,
        );

        let mut updated = person;
        updated.main_minutes = main_after;
        updated.daily_bonus_used = bonus_after;
        updated.last_reset_date = now.date_naive().max(updated.last_reset_date);

        let new_entry = NewLedgerEntry::settlement(
            session.person_id,
            elapsed_minutes,
            reason.ledger_reason(),
            now,
        );
        let entry = match self.store.commit_person_with_entry(&updated, new_entry) {
            Ok(entry) => entry,
            Err(err) => {
                // Leave the session in place so a retry can settle it.
                self.current_session = Some(session);
                return Err(err.into());
            }
        };

        info!(
            session_id = %session.session_id,
            person = %session.person_name,
            reason = reason.ledger_reason(),
            elapsed = %elapsed_minutes,
            main_after = %main_after,
            "session settled"
        );

        Ok(StopDecision::Settled(StopResult {
            session_id: session.session_id,
            person_id: session.person_id,
            reason,
            elapsed_minutes,
            entry,
        }))
    }

    // Admin adjustments

    /// Grant or revoke time. The same delta is mirrored onto the points
    /// axis of the ledger entry. The main balance never goes below the
    /// floor.
    pub fn adjust_time(
        &self,
        role: CallerRole,
        person_id: PersonId,
        delta: Minutes,
        reason: &str,
        now: DateTime<Local>,
    ) -> Result<LedgerEntry> {
        if !role.can_adjust_balances() {
            return Err(TimebankError::Unauthorized);
        }

        let mut person = self.person_or_not_found(person_id)?;
        person.main_minutes = (person.main_minutes + delta).clamp_floor(MAIN_FLOOR);

        let entry = self.store.commit_person_with_entry(
            &person,
            NewLedgerEntry::time_adjustment(person_id, delta, reason, now),
        )?;
        info!(%person_id, delta = %delta, reason, "time adjusted");
        Ok(entry)
    }

    /// Adjust the points score only. No balance is touched; the score
    /// changes because the next recompute sees the new entry.
    pub fn adjust_points(
        &self,
        role: CallerRole,
        person_id: PersonId,
        delta: Minutes,
        reason: &str,
        now: DateTime<Local>,
    ) -> Result<LedgerEntry> {
        if !role.can_adjust_balances() {
            return Err(TimebankError::Unauthorized);
        }

        self.person_or_not_found(person_id)?;
        let entry = self
            .store
            .append_ledger(NewLedgerEntry::points_adjustment(person_id, delta, reason, now))?;
        info!(%person_id, delta = %delta, reason, "points adjusted");
        Ok(entry)
    }

    /// Flip the bonus pool on or off for everyone. Returns the new
    /// state. Takes effect for sessions settled after the flip.
    pub fn toggle_bonus(&mut self, role: CallerRole) -> Result<bool> {
        if !role.can_toggle_bonus() {
            return Err(TimebankError::Unauthorized);
        }

        let mut updated = self.policy.clone();
        updated.bonus_enabled = !updated.bonus_enabled;
        self.store.save_policy(&updated)?;
        info!(enabled = updated.bonus_enabled, "bonus pool toggled");
        self.policy = updated;
        Ok(self.policy.bonus_enabled)
    }

    // Points (always derived, never stored)

    /// A person's points score, recomputed from the full ledger.
    pub fn points_for(&self, person_id: PersonId) -> Result<Minutes> {
        self.person_or_not_found(person_id)?;
        Ok(self.store.sum_points(person_id)?)
    }

    /// Recompute every person's points score from the full ledger.
    pub fn recompute_points(&self, role: CallerRole) -> Result<Vec<(PersonId, Minutes)>> {
        if !role.can_adjust_balances() {
            return Err(TimebankError::Unauthorized);
        }
        Ok(self.store.sum_points_by_person()?)
    }

    // Ledger management

    /// Recent ledger entries, newest first, joined with person names.
    /// Entries of deleted persons are kept and shown as "Unknown".
    pub fn list_ledger(&self, limit: usize) -> Result<Vec<LedgerView>> {
        let names: std::collections::HashMap<PersonId, String> = self
            .store
            .list_persons()?
            .into_iter()
            .map(|p| (p.id, p.name))
            .collect();

        let entries = self.store.list_ledger(limit)?;
        Ok(entries
            .into_iter()
            .map(|entry| {
                let person_name = names
                    .get(&entry.person_id)
                    .cloned()
                    .unwrap_or_else(|| UNKNOWN_PERSON.to_string());
                LedgerView { entry, person_name }
            })
            .collect())
    }

    /// Replace the reason text of an existing entry. The amounts are
    /// immutable.
    pub fn edit_ledger_reason(
        &self,
        role: CallerRole,
        id: LedgerEntryId,
        reason: &str,
    ) -> Result<()> {
        if !role.can_manage_ledger() {
            return Err(TimebankError::Unauthorized);
        }
        self.store.update_ledger_reason(id, reason)?;
        info!(entry_id = %id, "ledger reason edited");
        Ok(())
    }

    /// Remove an entry outright. Derived points shift accordingly on
    /// the next recompute; balances are not replayed.
    pub fn delete_ledger_entry(&self, role: CallerRole, id: LedgerEntryId) -> Result<()> {
        if !role.can_manage_ledger() {
            return Err(TimebankError::Unauthorized);
        }
        self.store.delete_ledger_entry(id)?;
        info!(entry_id = %id, "ledger entry deleted");
        Ok(())
    }

    // Person management

    pub fn add_person(
        &self,
        role: CallerRole,
        name: &str,
        initial_minutes: Minutes,
        now: DateTime<Local>,
    ) -> Result<Person> {
        if !role.can_manage_persons() {
            return Err(TimebankError::Unauthorized);
        }
        if name.trim().is_empty() {
            return Err(TimebankError::invalid("name must not be empty"));
        }
        if initial_minutes < MAIN_FLOOR {
            return Err(TimebankError::invalid("initial balance below the floor"));
        }

        let person = self.store.insert_person(NewPerson {
            name: name.trim().to_string(),
            initial_minutes,
            created_on: now.date_naive(),
        })?;
        info!(person_id = %person.id, name = %person.name, "person added");
        Ok(person)
    }

    pub fn rename_person(&self, role: CallerRole, id: PersonId, name: &str) -> Result<()> {
        if !role.can_manage_persons() {
            return Err(TimebankError::Unauthorized);
        }
        if name.trim().is_empty() {
            return Err(TimebankError::invalid("name must not be empty"));
        }

        let mut person = self.person_or_not_found(id)?;
        person.name = name.trim().to_string();
        self.store.update_person(&person)?;
        Ok(())
    }

    /// Delete a person. Their ledger entries are kept for the audit
    /// trail. A session they were running is discarded unsettled.
    pub fn delete_person(&mut self, role: CallerRole, id: PersonId) -> Result<()> {
        if !role.can_manage_persons() {
            return Err(TimebankError::Unauthorized);
        }

        self.person_or_not_found(id)?;
        if let Some(session) = &self.current_session {
            if session.person_id == id {
                warn!(session_id = %session.session_id, "discarding session of deleted person");
                self.current_session = None;
            }
        }
        self.store.delete_person(id)?;
        info!(person_id = %id, "person deleted");
        Ok(())
    }
}
