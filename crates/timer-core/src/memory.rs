//! In-memory implementation of the entry store.
//!
//! Backs service tests and local runs without a database. All state sits
//! behind one mutex, so each operation is atomic with respect to the others.

use std::collections::HashSet;
use std::convert::Infallible;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};

use crate::entry::TimerEntry;
use crate::store::EntryStore;
use crate::types::{EmployeeId, EntryId};

#[derive(Debug, Default)]
struct State {
    employees: HashSet<EmployeeId>,
    entries: Vec<TimerEntry>,
    next_id: i64,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the employee has been registered.
    pub fn has_employee(&self, employee_id: &EmployeeId) -> bool {
        self.lock().employees.contains(employee_id)
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        // Every mutation completes before the guard drops, so a poisoned
        // state is still consistent.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl EntryStore for MemoryStore {
    type Error = Infallible;

    fn ensure_employee(&self, employee_id: &EmployeeId) -> Result<(), Self::Error> {
        self.lock().employees.insert(employee_id.clone());
        Ok(())
    }

    fn count_running(&self, employee_id: &EmployeeId) -> Result<usize, Self::Error> {
        Ok(self
            .lock()
            .entries
            .iter()
            .filter(|entry| &entry.employee_id == employee_id && entry.is_running())
            .count())
    }

    fn insert_running_entry(
        &self,
        employee_id: &EmployeeId,
        start_time: DateTime<Utc>,
    ) -> Result<Option<EntryId>, Self::Error> {
        let mut state = self.lock();
        let already_running = state
            .entries
            .iter()
            .any(|entry| &entry.employee_id == employee_id && entry.is_running());
        if already_running {
            return Ok(None);
        }
        state.next_id += 1;
        let id = EntryId::new(state.next_id);
        state.entries.push(TimerEntry {
            id,
            employee_id: employee_id.clone(),
            start_time,
            end_time: None,
        });
        Ok(Some(id))
    }

    fn close_running_entry(
        &self,
        employee_id: &EmployeeId,
        end_time: DateTime<Utc>,
    ) -> Result<usize, Self::Error> {
        let mut closed = 0;
        for entry in &mut self.lock().entries {
            if &entry.employee_id == employee_id && entry.is_running() {
                entry.end_time = Some(end_time.max(entry.start_time));
                closed += 1;
            }
        }
        Ok(closed)
    }

    fn list_entries(&self, employee_id: &EmployeeId) -> Result<Vec<TimerEntry>, Self::Error> {
        let mut entries: Vec<TimerEntry> = self
            .lock()
            .entries
            .iter()
            .filter(|entry| &entry.employee_id == employee_id)
            .cloned()
            .collect();
        entries.sort_by(|a, b| {
            b.start_time
                .cmp(&a.start_time)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::{Duration, TimeZone};

    fn employee(id: &str) -> EmployeeId {
        EmployeeId::new(id).unwrap()
    }

    fn t(minutes: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 8, 0, 0).unwrap() + Duration::minutes(minutes)
    }

    #[test]
    fn ensure_employee_is_idempotent() {
        let store = MemoryStore::new();
        let e1 = employee("E1");
        store.ensure_employee(&e1).unwrap();
        store.ensure_employee(&e1).unwrap();
        assert!(store.has_employee(&e1));
        assert_eq!(store.lock().employees.len(), 1);
    }

    #[test]
    fn insert_refuses_second_running_entry() {
        let store = MemoryStore::new();
        let e1 = employee("E1");
        assert_eq!(
            store.insert_running_entry(&e1, t(0)).unwrap(),
            Some(EntryId::new(1))
        );
        assert_eq!(store.insert_running_entry(&e1, t(1)).unwrap(), None);
        assert_eq!(store.count_running(&e1).unwrap(), 1);
    }

    #[test]
    fn running_entries_are_tracked_per_employee() {
        let store = MemoryStore::new();
        store.insert_running_entry(&employee("E1"), t(0)).unwrap();
        assert!(
            store
                .insert_running_entry(&employee("E2"), t(0))
                .unwrap()
                .is_some()
        );
        assert_eq!(store.count_running(&employee("E2")).unwrap(), 1);
    }

    #[test]
    fn close_only_affects_running_entry_once() {
        let store = MemoryStore::new();
        let e1 = employee("E1");
        store.insert_running_entry(&e1, t(0)).unwrap();

        assert_eq!(store.close_running_entry(&e1, t(30)).unwrap(), 1);
        assert_eq!(store.close_running_entry(&e1, t(45)).unwrap(), 0);

        let entries = store.list_entries(&e1).unwrap();
        assert_eq!(entries[0].end_time, Some(t(30)));
    }

    #[test]
    fn close_clamps_end_before_start() {
        let store = MemoryStore::new();
        let e1 = employee("E1");
        store.insert_running_entry(&e1, t(10)).unwrap();
        store.close_running_entry(&e1, t(5)).unwrap();

        let entries = store.list_entries(&e1).unwrap();
        assert_eq!(entries[0].end_time, Some(t(10)));
        assert_eq!(entries[0].duration(), Some(Duration::zero()));
    }

    #[test]
    fn list_entries_is_newest_first_regardless_of_insert_order() {
        let store = MemoryStore::new();
        let e1 = employee("E1");
        for start in [t(60), t(0), t(120)] {
            store.insert_running_entry(&e1, start).unwrap();
            store.close_running_entry(&e1, start + Duration::minutes(5)).unwrap();
        }

        let starts: Vec<_> = store
            .list_entries(&e1)
            .unwrap()
            .into_iter()
            .map(|entry| entry.start_time)
            .collect();
        assert_eq!(starts, vec![t(120), t(60), t(0)]);
    }
}
