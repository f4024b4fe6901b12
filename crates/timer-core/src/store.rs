//! The entry store contract.
//!
//! The timer service does no locking of its own. Every guarantee about
//! concurrent callers comes from the store:
//!
//! - [`EntryStore::insert_running_entry`] must refuse to create a second
//!   running entry for an employee, atomically with its own check.
//! - [`EntryStore::close_running_entry`] must only touch a row that is still
//!   running at the moment of the write, and report how many rows it changed.
//!
//! With those two primitives a racing `start` observes a conflict and a racing
//! `stop` observes zero rows, instead of corrupting an entry.

use chrono::{DateTime, Utc};

use crate::entry::TimerEntry;
use crate::types::{EmployeeId, EntryId};

/// Durable record of employees and their timer entries.
pub trait EntryStore: Send + Sync {
    /// Persistence failure, surfaced to callers unmodified.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Registers the employee. Registering a known employee is a no-op.
    fn ensure_employee(&self, employee_id: &EmployeeId) -> Result<(), Self::Error>;

    /// Number of running entries for the employee (0 or 1 under correct operation).
    fn count_running(&self, employee_id: &EmployeeId) -> Result<usize, Self::Error>;

    /// Creates a running entry starting at `start_time`.
    ///
    /// Returns `None` without writing anything when the employee already has a
    /// running entry at the moment of the insert.
    fn insert_running_entry(
        &self,
        employee_id: &EmployeeId,
        start_time: DateTime<Utc>,
    ) -> Result<Option<EntryId>, Self::Error>;

    /// Closes the employee's running entry at `end_time`.
    ///
    /// The write is conditioned on the entry still running; the return value
    /// is the number of rows changed. An `end_time` earlier than the entry's
    /// start is clamped to the start.
    fn close_running_entry(
        &self,
        employee_id: &EmployeeId,
        end_time: DateTime<Utc>,
    ) -> Result<usize, Self::Error>;

    /// All entries for the employee, most recent `start_time` first.
    fn list_entries(&self, employee_id: &EmployeeId) -> Result<Vec<TimerEntry>, Self::Error>;
}

impl<S: EntryStore + ?Sized> EntryStore for &S {
    type Error = S::Error;

    fn ensure_employee(&self, employee_id: &EmployeeId) -> Result<(), Self::Error> {
        (**self).ensure_employee(employee_id)
    }

    fn count_running(&self, employee_id: &EmployeeId) -> Result<usize, Self::Error> {
        (**self).count_running(employee_id)
    }

    fn insert_running_entry(
        &self,
        employee_id: &EmployeeId,
        start_time: DateTime<Utc>,
    ) -> Result<Option<EntryId>, Self::Error> {
        (**self).insert_running_entry(employee_id, start_time)
    }

    fn close_running_entry(
        &self,
        employee_id: &EmployeeId,
        end_time: DateTime<Utc>,
    ) -> Result<usize, Self::Error> {
        (**self).close_running_entry(employee_id, end_time)
    }

    fn list_entries(&self, employee_id: &EmployeeId) -> Result<Vec<TimerEntry>, Self::Error> {
        (**self).list_entries(employee_id)
    }
}
