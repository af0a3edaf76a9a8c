//! Store trait definitions

use timebank_util::{LedgerEntryId, Minutes, PersonId};

use crate::{LedgerEntry, NewLedgerEntry, NewPerson, Person, PolicyConfig, StoreResult};

/// Main store trait
pub trait Store: Send + Sync {
    // Persons

    /// Create a person, returning the record with its assigned id
    fn insert_person(&self, new: NewPerson) -> StoreResult<Person>;

    /// Get a person by id
    fn get_person(&self, id: PersonId) -> StoreResult<Option<Person>>;

    /// List all persons
    fn list_persons(&self) -> StoreResult<Vec<Person>>;

    /// Overwrite a person's mutable fields
    fn update_person(&self, person: &Person) -> StoreResult<()>;

    /// Delete a person. Ledger entries referencing it are kept.
    fn delete_person(&self, id: PersonId) -> StoreResult<()>;

    // Policy singleton

    /// Load the policy row, if one has been saved
    fn load_policy(&self) -> StoreResult<Option<PolicyConfig>>;

    /// Save the policy row
    fn save_policy(&self, policy: &PolicyConfig) -> StoreResult<()>;

    // Ledger

    /// Append a ledger entry
    fn append_ledger(&self, new: NewLedgerEntry) -> StoreResult<LedgerEntry>;

    /// Write a person update and a ledger entry in one transaction.
    /// Either both land or neither does.
    fn commit_person_with_entry(
        &self,
        person: &Person,
        entry: NewLedgerEntry,
    ) -> StoreResult<LedgerEntry>;

    /// Get a ledger entry by id
    fn get_ledger_entry(&self, id: LedgerEntryId) -> StoreResult<Option<LedgerEntry>>;

    /// Get recent ledger entries, newest first
    fn list_ledger(&self, limit: usize) -> StoreResult<Vec<LedgerEntry>>;

    /// Replace the reason text of an entry
    fn update_ledger_reason(&self, id: LedgerEntryId, reason: &str) -> StoreResult<()>;

    /// Remove an entry (irreversible admin action)
    fn delete_ledger_entry(&self, id: LedgerEntryId) -> StoreResult<()>;

    /// Sum of points changes over one person's entries (full scan)
    fn sum_points(&self, person_id: PersonId) -> StoreResult<Minutes>;

    /// Per-person points sums over the whole ledger (full scan)
    fn sum_points_by_person(&self) -> StoreResult<Vec<(PersonId, Minutes)>>;

    // Health

    /// Check if store is healthy
    fn is_healthy(&self) -> bool;
}
