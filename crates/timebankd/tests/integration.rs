//! End-to-end tests exercising the engine against a real SQLite store,
//! driven with explicit clocks so nothing sleeps.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use timebank_core::{BudgetEngine, CoreEvent, StopDecision};
use timebank_host::{MockLock, ScreenLock};
use timebank_store::{PolicyConfig, SqliteStore, Store};
use timebank_util::{now, CallerRole, Minutes, MonotonicInstant, PersonId, TimebankError};

fn new_engine() -> BudgetEngine {
    let store = Arc::new(SqliteStore::in_memory().unwrap());
    BudgetEngine::new(store, PolicyConfig::default())
}

fn add_person(engine: &BudgetEngine, name: &str, minutes: i64) -> PersonId {
    engine
        .add_person(CallerRole::Admin, name, Minutes::from_minutes(minutes), now())
        .unwrap()
        .id
}

#[test]
fn full_lifecycle_with_exact_consumption() {
    let mut engine = new_engine();
    let id = add_person(&engine, "Alex", 30);

    // 30 main + 15 bonus
    let budget = engine.available_budget(id, now()).unwrap();
    assert_eq!(budget.available_seconds, 2700);

    let t0 = MonotonicInstant::now();
    let started = now();
    engine
        .start_session(CallerRole::Admin, id, None, started, t0)
        .unwrap();

    // Polls count down without touching balances
    assert_eq!(engine.poll(t0).remaining_seconds, 2700);
    assert_eq!(engine.poll(t0 + Duration::from_secs(1800)).remaining_seconds, 900);

    // Stop after exactly 30 minutes
    let decision = engine
        .stop_session(CallerRole::Admin, started, t0 + Duration::from_secs(1800))
        .unwrap();
    let result = match decision {
        StopDecision::Settled(r) => r,
        StopDecision::Idle => panic!("expected a settlement"),
    };
    assert_eq!(result.elapsed_minutes, Minutes::from_minutes(30));

    // Main lands on zero, bonus untouched, one settlement entry
    let budget = engine.available_budget(id, now()).unwrap();
    assert_eq!(budget.main_minutes, Minutes::ZERO);
    assert_eq!(budget.bonus_available, Minutes::from_minutes(15));

    let ledger = engine.list_ledger(10).unwrap();
    assert_eq!(ledger.len(), 1);
    assert_eq!(ledger[0].entry.time_change, Minutes::from_minutes(-30));
    assert_eq!(ledger[0].entry.points_change, Minutes::ZERO);
    assert_eq!(ledger[0].entry.reason, "session stopped");
}

#[test]
fn overrun_session_spills_into_bonus() {
    let mut engine = new_engine();
    let id = add_person(&engine, "Alex", 2);

    let t0 = MonotonicInstant::now();
    let started = now();
    engine
        .start_session(CallerRole::Admin, id, None, started, t0)
        .unwrap();

    // 2 main + 15 bonus = 17 minutes of budget; use all of it
    let decision = engine
        .stop_session(CallerRole::Admin, started, t0 + Duration::from_secs(1020))
        .unwrap();
    assert!(matches!(decision, StopDecision::Settled(_)));

    let budget = engine.available_budget(id, now()).unwrap();
    assert_eq!(budget.main_minutes, Minutes::from_minutes(-5));
    assert_eq!(budget.bonus_available, Minutes::ZERO);
    assert_eq!(budget.available_seconds, 0);

    // One entry for the full elapsed time
    let ledger = engine.list_ledger(10).unwrap();
    assert_eq!(ledger[0].entry.time_change, Minutes::from_minutes(-17));

    // No budget left for another session today
    let err = engine
        .start_session(CallerRole::Admin, id, None, now(), MonotonicInstant::now())
        .unwrap_err();
    assert!(matches!(err, TimebankError::NoBudgetAvailable));
}

#[tokio::test]
async fn expiry_settles_and_fires_the_lock() {
    let mut engine = new_engine();
    let id = add_person(&engine, "Alex", 1);
    let lock = Arc::new(MockLock::new());

    let t0 = MonotonicInstant::now();
    let started = now();
    engine
        .start_session(CallerRole::Admin, id, None, started, t0)
        .unwrap();

    // 16 minutes of budget; countdown runs out
    let late = t0 + Duration::from_secs(16 * 60);
    let event = engine.tick(late);
    assert!(matches!(event, Some(CoreEvent::ExpireDue { .. })));

    let decision = engine.expire_session(started, late).unwrap();
    let result = match decision {
        StopDecision::Settled(r) => r,
        StopDecision::Idle => panic!("expected a settlement"),
    };
    assert_eq!(result.entry.reason, "time expired");
    assert_eq!(result.elapsed_minutes, Minutes::from_minutes(16));

    // The daemon fires the lock after settlement; failure would not
    // undo the balances either way
    lock.lock().await.unwrap();
    assert_eq!(lock.lock_count(), 1);

    let budget = engine.available_budget(id, now()).unwrap();
    assert_eq!(budget.available_seconds, 0);
}

#[tokio::test]
async fn lock_failure_does_not_block() {
    let lock = Arc::new(MockLock::new());
    lock.set_fail(true);
    assert!(lock.lock().await.is_err());
    assert_eq!(lock.lock_count(), 1);
}

#[test]
fn admin_adjustments_and_derived_points() {
    let mut engine = new_engine();
    let id = add_person(&engine, "Alex", 10);

    engine
        .adjust_time(CallerRole::Admin, id, Minutes::from_minutes(20), "mowed the lawn", now())
        .unwrap();
    engine
        .adjust_points(CallerRole::Admin, id, Minutes::from_minutes(5), "read a book", now())
        .unwrap();

    // Time grants move both axes; point grants only the score
    let budget = engine.available_budget(id, now()).unwrap();
    assert_eq!(budget.main_minutes, Minutes::from_minutes(30));
    assert_eq!(engine.points_for(id).unwrap(), Minutes::from_minutes(25));

    // A settlement entry changes neither score nor the other's balance
    let t0 = MonotonicInstant::now();
    let started = now();
    engine
        .start_session(CallerRole::Admin, id, None, started, t0)
        .unwrap();
    engine
        .stop_session(CallerRole::Admin, started, t0 + Duration::from_secs(600))
        .unwrap();
    assert_eq!(engine.points_for(id).unwrap(), Minutes::from_minutes(25));

    // Deleting a ledger entry shifts the recomputed score
    let ledger = engine.list_ledger(10).unwrap();
    let points_entry = ledger
        .iter()
        .find(|v| v.entry.reason == "read a book")
        .unwrap();
    engine
        .delete_ledger_entry(CallerRole::Admin, points_entry.entry.id)
        .unwrap();
    assert_eq!(engine.points_for(id).unwrap(), Minutes::from_minutes(20));

    // Deleting the entry shifted only the derived score
    let budget = engine.available_budget(id, now()).unwrap();
    assert_eq!(budget.main_minutes, Minutes::from_minutes(20));

    let totals = engine.recompute_points(CallerRole::Admin).unwrap();
    assert_eq!(totals, vec![(id, Minutes::from_minutes(20))]);
}

#[test]
fn viewer_cannot_mutate_anything() {
    let mut engine = new_engine();
    let id = add_person(&engine, "Alex", 30);
    let viewer = CallerRole::Viewer;

    assert!(matches!(
        engine.start_session(viewer, id, None, now(), MonotonicInstant::now()),
        Err(TimebankError::Unauthorized)
    ));
    assert!(matches!(
        engine.adjust_time(viewer, id, Minutes::from_minutes(1), "x", now()),
        Err(TimebankError::Unauthorized)
    ));
    assert!(matches!(engine.toggle_bonus(viewer), Err(TimebankError::Unauthorized)));

    // Reads stay open
    assert!(engine.available_budget(id, now()).is_ok());
    assert!(!engine.poll(MonotonicInstant::now()).active);
    assert!(engine.list_ledger(10).unwrap().is_empty());
}

#[test]
fn bonus_toggle_changes_settlement() {
    let mut engine = new_engine();
    let id = add_person(&engine, "Alex", 2);
    engine.toggle_bonus(CallerRole::Admin).unwrap();

    // Bonus off: budget is the positive main balance only
    let budget = engine.available_budget(id, now()).unwrap();
    assert_eq!(budget.available_seconds, 120);

    let t0 = MonotonicInstant::now();
    let started = now();
    engine
        .start_session(CallerRole::Admin, id, None, started, t0)
        .unwrap();
    engine
        .stop_session(CallerRole::Admin, started, t0 + Duration::from_secs(120))
        .unwrap();

    // Nothing spilled into the bonus counter
    let budget = engine.available_budget(id, now()).unwrap();
    assert_eq!(budget.main_minutes, Minutes::ZERO);
    assert_eq!(budget.bonus_available, Minutes::ZERO);
}

#[test]
fn balances_survive_a_restart() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("timebankd.db");

    let id = {
        let store = Arc::new(SqliteStore::open(&db_path).unwrap());
        store.save_policy(&PolicyConfig::default()).unwrap();
        let mut engine = BudgetEngine::load(store).unwrap();
        let id = add_person(&engine, "Alex", 30);

        let t0 = MonotonicInstant::now();
        let started = now();
        engine
            .start_session(CallerRole::Admin, id, None, started, t0)
            .unwrap();
        engine
            .stop_session(CallerRole::Admin, started, t0 + Duration::from_secs(600))
            .unwrap();
        id
    };

    let store = Arc::new(SqliteStore::open(&db_path).unwrap());
    let engine = BudgetEngine::load(store).unwrap();

    let budget = engine.available_budget(id, now()).unwrap();
    assert_eq!(budget.main_minutes, Minutes::from_minutes(20));

    let ledger = engine.list_ledger(10).unwrap();
    assert_eq!(ledger.len(), 1);
    assert_eq!(ledger[0].entry.time_change, Minutes::from_minutes(-10));
    assert_eq!(ledger[0].person_name, "Alex");
}

#[test]
fn stale_bonus_counter_resets_on_first_touch() {
    let store = Arc::new(SqliteStore::in_memory().unwrap());
    store.save_policy(&PolicyConfig::default()).unwrap();

    // A person whose bonus pool was exhausted long ago
    let person = store
        .insert_person(timebank_store::NewPerson {
            name: "Alex".into(),
            initial_minutes: Minutes::ZERO,
            created_on: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
        })
        .unwrap();
    let mut stale = person.clone();
    stale.daily_bonus_used = Minutes::from_minutes(15);
    stale.last_reset_date = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
    store.update_person(&stale).unwrap();

    let engine = BudgetEngine::load(Arc::clone(&store) as Arc<dyn Store>).unwrap();
    let budget = engine.available_budget(person.id, now()).unwrap();
    assert_eq!(budget.bonus_available, Minutes::from_minutes(15));

    // The reset was persisted, not just computed
    let row = store.get_person(person.id).unwrap().unwrap();
    assert_eq!(row.daily_bonus_used, Minutes::ZERO);
    assert_eq!(row.last_reset_date, now().date_naive());
}
