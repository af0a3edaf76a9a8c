//! Budget calculation
//!
//! Available budget is the sum of two pools: the main balance (only its
//! positive part is spendable) and the remaining daily bonus. The bonus
//! counter resets lazily the first time a stale record is touched.

use chrono::NaiveDate;
use timebank_store::{Person, PolicyConfig};
use timebank_util::{Minutes, PersonId};

/// Lower bound of the main balance. Settlement and adjustments never
/// take a person below this.
pub const MAIN_FLOOR: Minutes = Minutes::from_minutes(-5);

/// If the person's bonus counter belongs to an earlier day, return a
/// copy with the counter zeroed and the reset date moved to `today`.
/// The caller is responsible for persisting the returned record.
pub fn apply_daily_reset_if_stale(person: &Person, today: NaiveDate) -> Option<Person> {
    if person.last_reset_date >= today {
        return None;
    }
    let mut updated = person.clone();
    updated.daily_bonus_used = Minutes::ZERO;
    updated.last_reset_date = today;
    Some(updated)
}

/// Bonus minutes still spendable today. Zero when the pool is disabled.
pub fn bonus_available(person: &Person, policy: &PolicyConfig) -> Minutes {
    if !policy.bonus_enabled {
        return Minutes::ZERO;
    }
    (policy.daily_bonus_cap - person.daily_bonus_used).clamp_floor(Minutes::ZERO)
}

/// Total spendable budget in whole seconds, never negative.
///
/// Expects the daily reset to have been applied already; a stale
/// record would understate the bonus pool.
pub fn available_seconds(person: &Person, policy: &PolicyConfig) -> i64 {
    let main_spendable = person.main_minutes.clamp_floor(Minutes::ZERO);
    (main_spendable + bonus_available(person, policy)).as_seconds()
}

/// Read-only budget summary for one person.
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetView {
    pub person_id: PersonId,
    pub person_name: String,
    pub main_minutes: Minutes,
    pub bonus_available: Minutes,
    pub available_seconds: i64,
}

impl BudgetView {
    pub fn of(person: &Person, policy: &PolicyConfig) -> Self {
        Self {
            person_id: person.id,
            person_name: person.name.clone(),
            main_minutes: person.main_minutes,
            bonus_available: bonus_available(person, policy),
            available_seconds: available_seconds(person, policy),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use timebank_util::PersonId;

    fn person(main: Minutes, bonus_used: Minutes) -> Person {
        Person {
            id: PersonId::new(1),
            name: "Alex".into(),
            main_minutes: main,
            daily_bonus_used: bonus_used,
            last_reset_date: NaiveDate::from_ymd_opt(2026, 8, 1).unwrap(),
        }
    }

    #[test]
    fn main_plus_untouched_bonus() {
        let p = person(Minutes::from_minutes(30), Minutes::ZERO);
        let policy = PolicyConfig::default();
        // 30 main + 15 bonus = 45 minutes
        assert_eq!(available_seconds(&p, &policy), 2700);
    }

    #[test]
    fn negative_main_contributes_nothing() {
        let p = person(Minutes::from_minutes(-5), Minutes::ZERO);
        let policy = PolicyConfig::default();
        assert_eq!(available_seconds(&p, &policy), 15 * 60);
    }

    #[test]
    fn disabled_bonus_excluded() {
        let p = person(Minutes::from_minutes(10), Minutes::ZERO);
        let policy = PolicyConfig {
            bonus_enabled: false,
            ..PolicyConfig::default()
        };
        assert_eq!(available_seconds(&p, &policy), 600);
    }

    #[test]
    fn partially_used_bonus() {
        let p = person(Minutes::ZERO, Minutes::from_minutes(12));
        let policy = PolicyConfig::default();
        assert_eq!(bonus_available(&p, &policy), Minutes::from_minutes(3));
        assert_eq!(available_seconds(&p, &policy), 180);
    }

    #[test]
    fn budget_never_negative() {
        let p = person(Minutes::from_minutes(-5), Minutes::from_minutes(15));
        let policy = PolicyConfig::default();
        assert_eq!(available_seconds(&p, &policy), 0);
    }

    #[test]
    fn stale_record_resets() {
        let p = person(Minutes::from_minutes(5), Minutes::from_minutes(9));
        let today = NaiveDate::from_ymd_opt(2026, 8, 2).unwrap();

        let updated = apply_daily_reset_if_stale(&p, today).unwrap();
        assert_eq!(updated.daily_bonus_used, Minutes::ZERO);
        assert_eq!(updated.last_reset_date, today);

        // Same day is a no-op
        assert!(apply_daily_reset_if_stale(&updated, today).is_none());
    }

    #[test]
    fn budget_view_summarizes() {
        let p = person(Minutes::from_minutes(2), Minutes::from_minutes(5));
        let policy = PolicyConfig::default();

        let view = BudgetView::of(&p, &policy);
        assert_eq!(view.main_minutes, Minutes::from_minutes(2));
        assert_eq!(view.bonus_available, Minutes::from_minutes(10));
        assert_eq!(view.available_seconds, 720);
    }
}
