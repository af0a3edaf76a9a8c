//! SQLite-based store implementation

use chrono::{DateTime, Local, NaiveDate};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::Mutex;
use timebank_util::{LedgerEntryId, Minutes, PersonId};
use tracing::{debug, warn};

use crate::{
    LedgerEntry, NewLedgerEntry, NewPerson, Person, PolicyConfig, Store, StoreError, StoreResult,
};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// SQLite-based store
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open or create a store at the given path
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Create an in-memory store (for testing)
    pub fn in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();

        conn.execute_batch(
            r#"
            -- Person records: directly-stored time balance
            CREATE TABLE IF NOT EXISTS persons (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                main_minutes_h INTEGER NOT NULL DEFAULT 0,
                daily_bonus_used_h INTEGER NOT NULL DEFAULT 0,
                last_reset_date TEXT NOT NULL
            );

            -- Audit ledger (append-mostly); points are derived from here
            CREATE TABLE IF NOT EXISTS ledger (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                person_id INTEGER NOT NULL,
                time_change_h INTEGER NOT NULL,
                points_change_h INTEGER NOT NULL,
                reason TEXT NOT NULL,
                timestamp TEXT NOT NULL
            );

            -- Policy singleton (single row)
            CREATE TABLE IF NOT EXISTS policy (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                policy_json TEXT NOT NULL
            );

            -- Indexes
            CREATE INDEX IF NOT EXISTS idx_ledger_person ON ledger(person_id);
            CREATE INDEX IF NOT EXISTS idx_ledger_timestamp ON ledger(timestamp);
            "#,
        )?;

        debug!("Store schema initialized");
        Ok(())
    }
}

fn person_from_row(row: &Row<'_>) -> rusqlite::Result<(i64, String, i64, i64, String)> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
    ))
}

fn build_person(raw: (i64, String, i64, i64, String)) -> StoreResult<Person> {
    let (id, name, main_h, bonus_h, reset) = raw;
    let last_reset_date = NaiveDate::parse_from_str(&reset, DATE_FORMAT)
        .map_err(|e| StoreError::Serialization(format!("bad date {:?}: {}", reset, e)))?;

    Ok(Person {
        id: PersonId::new(id),
        name,
        main_minutes: Minutes::from_hundredths(main_h),
        daily_bonus_used: Minutes::from_hundredths(bonus_h),
        last_reset_date,
    })
}

fn entry_from_row(row: &Row<'_>) -> rusqlite::Result<(i64, i64, i64, i64, String, String)> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
    ))
}

fn build_entry(raw: (i64, i64, i64, i64, String, String)) -> LedgerEntry {
    let (id, person_id, time_h, points_h, reason, timestamp_str) = raw;
    let timestamp = DateTime::parse_from_rfc3339(&timestamp_str)
        .map(|dt| dt.with_timezone(&Local))
        .unwrap_or_else(|_| timebank_util::now());

    LedgerEntry {
        id: LedgerEntryId::new(id),
        person_id: PersonId::new(person_id),
        time_change: Minutes::from_hundredths(time_h),
        points_change: Minutes::from_hundredths(points_h),
        reason,
        timestamp,
    }
}

fn insert_entry(conn: &Connection, new: &NewLedgerEntry) -> StoreResult<LedgerEntry> {
    conn.execute(
        r#"
        INSERT INTO ledger (person_id, time_change_h, points_change_h, reason, timestamp)
        VALUES (?, ?, ?, ?, ?)
        "#,
        params![
            new.person_id.as_i64(),
            new.time_change.hundredths(),
            new.points_change.hundredths(),
            new.reason,
            new.timestamp.to_rfc3339(),
        ],
    )?;

    let id = conn.last_insert_rowid();
    debug!(entry_id = id, person_id = %new.person_id, "Ledger entry appended");

    Ok(LedgerEntry {
        id: LedgerEntryId::new(id),
        person_id: new.person_id,
        time_change: new.time_change,
        points_change: new.points_change,
        reason: new.reason.clone(),
        timestamp: new.timestamp,
    })
}

fn write_person(conn: &Connection, person: &Person) -> StoreResult<()> {
    let changed = conn.execute(
        r#"
        UPDATE persons
        SET name = ?, main_minutes_h = ?, daily_bonus_used_h = ?, last_reset_date = ?
        WHERE id = ?
        "#,
        params![
            person.name,
            person.main_minutes.hundredths(),
            person.daily_bonus_used.hundredths(),
            person.last_reset_date.format(DATE_FORMAT).to_string(),
            person.id.as_i64(),
        ],
    )?;

    if changed == 0 {
        return Err(StoreError::NotFound(format!("person {}", person.id)));
    }
    Ok(())
}

impl Store for SqliteStore {
    fn insert_person(&self, new: NewPerson) -> StoreResult<Person> {
        let conn = self.conn.lock().unwrap();

        conn.execute(
            r#"
            INSERT INTO persons (name, main_minutes_h, daily_bonus_used_h, last_reset_date)
            VALUES (?, ?, 0, ?)
            "#,
            params![
                new.name,
                new.initial_minutes.hundredths(),
                new.created_on.format(DATE_FORMAT).to_string(),
            ],
        )?;

        let id = conn.last_insert_rowid();
        debug!(person_id = id, name = %new.name, "Person created");

        Ok(Person {
            id: PersonId::new(id),
            name: new.name,
            main_minutes: new.initial_minutes,
            daily_bonus_used: Minutes::ZERO,
            last_reset_date: new.created_on,
        })
    }

    fn get_person(&self, id: PersonId) -> StoreResult<Option<Person>> {
        let conn = self.conn.lock().unwrap();

        let raw = conn
            .query_row(
                "SELECT id, name, main_minutes_h, daily_bonus_used_h, last_reset_date
                 FROM persons WHERE id = ?",
                [id.as_i64()],
                person_from_row,
            )
            .optional()?;

        raw.map(build_person).transpose()
    }

    fn list_persons(&self) -> StoreResult<Vec<Person>> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn.prepare(
            "SELECT id, name, main_minutes_h, daily_bonus_used_h, last_reset_date
             FROM persons ORDER BY id",
        )?;

        let rows = stmt.query_map([], person_from_row)?;

        let mut persons = Vec::new();
        for row in rows {
            persons.push(build_person(row?)?);
        }
        Ok(persons)
    }

    fn update_person(&self, person: &Person) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();
        write_person(&conn, person)
    }

    fn delete_person(&self, id: PersonId) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();

        let changed = conn.execute("DELETE FROM persons WHERE id = ?", [id.as_i64()])?;
        if changed == 0 {
            return Err(StoreError::NotFound(format!("person {}", id)));
        }

        debug!(person_id = %id, "Person deleted (ledger entries kept)");
        Ok(())
    }

    fn load_policy(&self) -> StoreResult<Option<PolicyConfig>> {
        let conn = self.conn.lock().unwrap();

        let json: Option<String> = conn
            .query_row("SELECT policy_json FROM policy WHERE id = 1", [], |row| {
                row.get(0)
            })
            .optional()?;

        match json {
            Some(s) => {
                let policy: PolicyConfig = serde_json::from_str(&s)?;
                Ok(Some(policy))
            }
            None => Ok(None),
        }
    }

    fn save_policy(&self, policy: &PolicyConfig) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();
        let json = serde_json::to_string(policy)?;

        conn.execute(
            r#"
            INSERT INTO policy (id, policy_json)
            VALUES (1, ?)
            ON CONFLICT(id)
            DO UPDATE SET policy_json = excluded.policy_json
            "#,
            [json],
        )?;

        debug!("Policy saved");
        Ok(())
    }

    fn append_ledger(&self, new: NewLedgerEntry) -> StoreResult<LedgerEntry> {
        let conn = self.conn.lock().unwrap();
        insert_entry(&conn, &new)
    }

    fn commit_person_with_entry(
        &self,
        person: &Person,
        entry: NewLedgerEntry,
    ) -> StoreResult<LedgerEntry> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;

        write_person(&tx, person)?;
        let entry = insert_entry(&tx, &entry)?;

        tx.commit()?;
        Ok(entry)
    }

    fn get_ledger_entry(&self, id: LedgerEntryId) -> StoreResult<Option<LedgerEntry>> {
        let conn = self.conn.lock().unwrap();

        let raw = conn
            .query_row(
                "SELECT id, person_id, time_change_h, points_change_h, reason, timestamp
                 FROM ledger WHERE id = ?",
                [id.as_i64()],
                entry_from_row,
            )
            .optional()?;

        Ok(raw.map(build_entry))
    }

    fn list_ledger(&self, limit: usize) -> StoreResult<Vec<LedgerEntry>> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn.prepare(
            "SELECT id, person_id, time_change_h, points_change_h, reason, timestamp
             FROM ledger ORDER BY id DESC LIMIT ?",
        )?;

        let rows = stmt.query_map([limit], entry_from_row)?;

        let mut entries = Vec::new();
        for row in rows {
            entries.push(build_entry(row?));
        }
        Ok(entries)
    }

    fn update_ledger_reason(&self, id: LedgerEntryId, reason: &str) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();

        let changed = conn.execute(
            "UPDATE ledger SET reason = ? WHERE id = ?",
            params![reason, id.as_i64()],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound(format!("ledger entry {}", id)));
        }
        Ok(())
    }

    fn delete_ledger_entry(&self, id: LedgerEntryId) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();

        let changed = conn.execute("DELETE FROM ledger WHERE id = ?", [id.as_i64()])?;
        if changed == 0 {
            return Err(StoreError::NotFound(format!("ledger entry {}", id)));
        }

        debug!(entry_id = %id, "Ledger entry deleted");
        Ok(())
    }

    fn sum_points(&self, person_id: PersonId) -> StoreResult<Minutes> {
        let conn = self.conn.lock().unwrap();

        let h: i64 = conn.query_row(
            "SELECT COALESCE(SUM(points_change_h), 0) FROM ledger WHERE person_id = ?",
            [person_id.as_i64()],
            |row| row.get(0),
        )?;

        Ok(Minutes::from_hundredths(h))
    }

    fn sum_points_by_person(&self) -> StoreResult<Vec<(PersonId, Minutes)>> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn.prepare(
            "SELECT person_id, COALESCE(SUM(points_change_h), 0)
             FROM ledger GROUP BY person_id ORDER BY person_id",
        )?;

        let rows = stmt.query_map([], |row| {
            let person_id: i64 = row.get(0)?;
            let h: i64 = row.get(1)?;
            Ok((PersonId::new(person_id), Minutes::from_hundredths(h)))
        })?;

        let mut sums = Vec::new();
        for row in rows {
            sums.push(row?);
        }
        Ok(sums)
    }

    fn is_healthy(&self) -> bool {
        match self.conn.lock() {
            Ok(conn) => conn.query_row("SELECT 1", [], |_| Ok(())).is_ok(),
            Err(_) => {
                warn!("Store lock poisoned");
                false
            }
        }
    }
}
