//! `SQLite` storage for the employee timer.
//!
//! Implements [`timer_core::EntryStore`] on top of `rusqlite`.
//!
//! # Thread Safety
//!
//! A `rusqlite::Connection` is `Send` but not `Sync`. [`Database`] keeps its
//! connection behind a `Mutex`, so one instance can be shared across threads
//! (e.g. in an `Arc`) and every store operation runs alone on the connection.
//! Separate processes opening the same file are serialized by `SQLite`'s own
//! locking; writers wait up to [`BUSY_TIMEOUT`] for the lock.
//!
//! # Schema
//!
//! ## Timestamp Format
//!
//! Timestamps are stored as TEXT in fixed-width RFC 3339 UTC with microsecond
//! precision (e.g., `2024-01-15T10:30:00.000000Z`), so lexicographic ordering
//! matches chronological ordering. A running entry has a `NULL` `end_time`;
//! no date is ever used to stand in for "not ended".
//!
//! ## Single Running Entry
//!
//! A partial unique index on `timer_entries(employee_id) WHERE is_running = 1`
//! makes a second running entry for the same employee impossible, whatever
//! order concurrent writers arrive in.
//!
//! ## Duration
//!
//! Durations are not stored. They are derived from `end_time - start_time`
//! when entries are read, so they cannot drift from their inputs.

use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use thiserror::Error;

use timer_core::{EmployeeId, EntryId, EntryStore, TimerEntry};

/// How long a writer waits for another connection's lock before failing.
pub const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// An error from the underlying database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// Failed to parse a stored timestamp.
    #[error("invalid timestamp for entry {entry_id}: {timestamp}")]
    TimestampParse {
        entry_id: i64,
        timestamp: String,
        #[source]
        source: chrono::ParseError,
    },
    /// A stored row violates the entry invariants.
    #[error("inconsistent timer entry {entry_id}: {message}")]
    InconsistentEntry { entry_id: i64, message: String },
}

/// Database connection wrapper.
///
/// See the [module documentation](self) for thread safety considerations.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Opens a database at the given path, creating it if necessary.
    ///
    /// The database schema is automatically initialized on first open.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    /// Opens an in-memory database.
    ///
    /// Useful for testing. The database is destroyed when the connection closes.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self, DbError> {
        conn.busy_timeout(BUSY_TIMEOUT)?;
        init(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Closes the connection, reporting any error from `SQLite`.
    pub fn close(self) -> Result<(), DbError> {
        let conn = self
            .conn
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner);
        conn.close().map_err(|(_, err)| DbError::Sqlite(err))
    }

    /// Whether the employee has been registered.
    pub fn has_employee(&self, employee_id: &EmployeeId) -> Result<bool, DbError> {
        let found = self
            .conn()
            .query_row(
                "SELECT 1 FROM employees WHERE employee_id = ?",
                [employee_id.as_str()],
                |_| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        // A statement either completes or fails inside SQLite before the guard
        // drops, so the connection is usable after a panic elsewhere.
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Initializes the database schema.
///
/// This is idempotent - safe to call on an already-initialized database.
fn init(conn: &Connection) -> Result<(), DbError> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS employees (
            employee_id TEXT PRIMARY KEY,
            created_at TEXT NOT NULL
        );

        -- start_time/end_time: fixed-width RFC 3339 UTC (e.g. '2024-01-15T10:30:00.000000Z')
        -- end_time is NULL exactly while is_running = 1
        CREATE TABLE IF NOT EXISTS timer_entries (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            employee_id TEXT NOT NULL,
            start_time TEXT NOT NULL,
            end_time TEXT,
            is_running INTEGER NOT NULL DEFAULT 1,
            CHECK ((is_running = 1 AND end_time IS NULL) OR (is_running = 0 AND end_time IS NOT NULL)),
            FOREIGN KEY (employee_id) REFERENCES employees(employee_id)
        );

        CREATE INDEX IF NOT EXISTS idx_timer_entries_employee_start
            ON timer_entries(employee_id, start_time);
        CREATE UNIQUE INDEX IF NOT EXISTS idx_timer_entries_one_running
            ON timer_entries(employee_id) WHERE is_running = 1;
        ",
    )?;
    Ok(())
}

impl EntryStore for Database {
    type Error = DbError;

    fn ensure_employee(&self, employee_id: &EmployeeId) -> Result<(), DbError> {
        let inserted = self.conn().execute(
            "INSERT OR IGNORE INTO employees (employee_id, created_at) VALUES (?, ?)",
            params![employee_id.as_str(), format_timestamp(Utc::now())],
        )?;
        if inserted > 0 {
            tracing::debug!(%employee_id, "registered employee");
        }
        Ok(())
    }

    fn count_running(&self, employee_id: &EmployeeId) -> Result<usize, DbError> {
        let count: i64 = self.conn().query_row(
            "SELECT COUNT(*) FROM timer_entries WHERE employee_id = ? AND is_running = 1",
            [employee_id.as_str()],
            |row| row.get(0),
        )?;
        Ok(usize::try_from(count).unwrap_or_default())
    }

    fn insert_running_entry(
        &self,
        employee_id: &EmployeeId,
        start_time: DateTime<Utc>,
    ) -> Result<Option<EntryId>, DbError> {
        let conn = self.conn();
        // The only constraint OR IGNORE can trip here is the one-running index.
        let inserted = conn.execute(
            "
            INSERT OR IGNORE INTO timer_entries (employee_id, start_time, end_time, is_running)
            VALUES (?, ?, NULL, 1)
            ",
            params![employee_id.as_str(), format_timestamp(start_time)],
        )?;
        if inserted == 0 {
            return Ok(None);
        }
        Ok(Some(EntryId::new(conn.last_insert_rowid())))
    }

    fn close_running_entry(
        &self,
        employee_id: &EmployeeId,
        end_time: DateTime<Utc>,
    ) -> Result<usize, DbError> {
        let closed = self.conn().execute(
            "
            UPDATE timer_entries
            SET end_time = MAX(?1, start_time), is_running = 0
            WHERE employee_id = ?2 AND is_running = 1
            ",
            params![format_timestamp(end_time), employee_id.as_str()],
        )?;
        Ok(closed)
    }

    fn list_entries(&self, employee_id: &EmployeeId) -> Result<Vec<TimerEntry>, DbError> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "
            SELECT id, start_time, end_time, is_running
            FROM timer_entries
            WHERE employee_id = ?
            ORDER BY start_time DESC, id DESC
            ",
        )?;
        let rows = stmt.query_map([employee_id.as_str()], |row| {
            Ok(EntryRow {
                id: row.get(0)?,
                start_time: row.get(1)?,
                end_time: row.get(2)?,
                is_running: row.get(3)?,
            })
        })?;
        let mut entries = Vec::new();
        for row in rows {
            entries.push(row?.into_entry(employee_id)?);
        }
        Ok(entries)
    }
}

#[derive(Debug)]
struct EntryRow {
    id: i64,
    start_time: String,
    end_time: Option<String>,
    is_running: bool,
}

impl EntryRow {
    fn into_entry(self, employee_id: &EmployeeId) -> Result<TimerEntry, DbError> {
        if self.is_running != self.end_time.is_none() {
            return Err(DbError::InconsistentEntry {
                entry_id: self.id,
                message: format!(
                    "is_running = {} with end_time {:?}",
                    self.is_running, self.end_time
                ),
            });
        }
        let start_time = parse_timestamp(&self.start_time, self.id)?;
        let end_time = self
            .end_time
            .as_deref()
            .map(|end| parse_timestamp(end, self.id))
            .transpose()?;
        Ok(TimerEntry {
            id: EntryId::new(self.id),
            employee_id: employee_id.clone(),
            start_time,
            end_time,
        })
    }
}

fn parse_timestamp(timestamp: &str, entry_id: i64) -> Result<DateTime<Utc>, DbError> {
    DateTime::parse_from_rfc3339(timestamp)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|source| DbError::TimestampParse {
            entry_id,
            timestamp: timestamp.to_string(),
            source,
        })
}

fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Micros, true)
}
