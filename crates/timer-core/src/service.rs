//! The timer state machine.
//!
//! Per employee the timer is either idle or running:
//!
//! ```text
//! Idle    --start--> Running   (creates an entry; conflict if already running)
//! Running --stop-->  Idle      (closes the entry; not found if already idle)
//! ```
//!
//! The state is never held in memory. It is read back from the store on every
//! call, and the store's atomic primitives decide races between callers.

use thiserror::Error;

use crate::clock::{Clock, SystemClock};
use crate::entry::{TimerEntry, TimerState};
use crate::store::EntryStore;
use crate::types::{EmployeeId, ValidationError};

/// Errors returned by timer operations.
#[derive(Debug, Error)]
pub enum TimerError<E> {
    /// The employee identifier was rejected.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A start was requested while a timer is already running.
    #[error("timer already running for employee {employee_id}")]
    Conflict { employee_id: EmployeeId },

    /// A stop was requested while no timer is running.
    #[error("no active timer for employee {employee_id}")]
    NotFound { employee_id: EmployeeId },

    /// The store failed; no automatic retry is attempted.
    #[error("store error: {0}")]
    Store(#[source] E),
}

/// Enforces the single-running-timer rule on top of an [`EntryStore`].
#[derive(Debug)]
pub struct TimerService<S, C = SystemClock> {
    store: S,
    clock: C,
}

impl<S: EntryStore> TimerService<S> {
    /// Creates a service on the wall clock.
    pub const fn new(store: S) -> Self {
        Self {
            store,
            clock: SystemClock,
        }
    }
}

impl<S: EntryStore, C: Clock> TimerService<S, C> {
    pub const fn with_clock(store: S, clock: C) -> Self {
        Self { store, clock }
    }

    pub const fn store(&self) -> &S {
        &self.store
    }

    pub const fn clock(&self) -> &C {
        &self.clock
    }

    /// Releases the store so the caller can close it.
    pub fn into_store(self) -> S {
        self.store
    }

    /// Starts a timer for the employee, registering the employee on first use.
    pub fn start(&self, employee_id: &str) -> Result<(), TimerError<S::Error>> {
        let employee_id = EmployeeId::new(employee_id)?;

        self.store
            .ensure_employee(&employee_id)
            .map_err(TimerError::Store)?;

        let running = self
            .store
            .count_running(&employee_id)
            .map_err(TimerError::Store)?;
        if running > 0 {
            tracing::debug!(%employee_id, running, "start rejected, timer already running");
            return Err(TimerError::Conflict { employee_id });
        }

        let now = self.clock.now();
        match self
            .store
            .insert_running_entry(&employee_id, now)
            .map_err(TimerError::Store)?
        {
            Some(entry_id) => {
                tracing::info!(%employee_id, %entry_id, start_time = %now, "timer started");
                Ok(())
            }
            None => {
                // Another caller won between the count and the insert.
                tracing::debug!(%employee_id, "start lost race, timer already running");
                Err(TimerError::Conflict { employee_id })
            }
        }
    }

    /// Stops the employee's running timer.
    pub fn stop(&self, employee_id: &str) -> Result<(), TimerError<S::Error>> {
        let employee_id = EmployeeId::new(employee_id)?;

        let now = self.clock.now();
        let closed = self
            .store
            .close_running_entry(&employee_id, now)
            .map_err(TimerError::Store)?;
        match closed {
            0 => {
                tracing::debug!(%employee_id, "stop rejected, no running timer");
                Err(TimerError::NotFound { employee_id })
            }
            1 => {
                tracing::info!(%employee_id, end_time = %now, "timer stopped");
                Ok(())
            }
            closed => {
                tracing::warn!(%employee_id, closed, "stop closed more than one running entry");
                Ok(())
            }
        }
    }

    /// The employee's entries, most recent first. Unknown employees have none.
    pub fn history(&self, employee_id: &str) -> Result<Vec<TimerEntry>, TimerError<S::Error>> {
        let employee_id = EmployeeId::new(employee_id)?;
        let entries = self
            .store
            .list_entries(&employee_id)
            .map_err(TimerError::Store)?;
        tracing::debug!(%employee_id, entries = entries.len(), "loaded history");
        Ok(entries)
    }

    /// Whether the employee's timer is currently running.
    pub fn state(&self, employee_id: &str) -> Result<TimerState, TimerError<S::Error>> {
        let state = self
            .history(employee_id)?
            .into_iter()
            .find(TimerEntry::is_running)
            .map_or(TimerState::Idle, |entry| TimerState::Running {
                entry_id: entry.id,
                since: entry.start_time,
            });
        Ok(state)
    }
}
