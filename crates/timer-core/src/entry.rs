//! Timer entries - recorded work intervals.

use chrono::{DateTime, Duration, Utc};
use serde::{Serialize, Serializer};

use crate::types::{EmployeeId, EntryId};

/// One recorded work interval for an employee.
///
/// An entry is born running and is closed exactly once. Whether it is running
/// and how long it lasted are both derived from `end_time`, so the two can
/// never disagree with each other.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerEntry {
    /// Store-assigned identifier.
    pub id: EntryId,
    /// The employee owning this interval.
    pub employee_id: EmployeeId,
    /// When the timer was started.
    pub start_time: DateTime<Utc>,
    /// When the timer was stopped; `None` while running.
    pub end_time: Option<DateTime<Utc>>,
}

impl TimerEntry {
    pub const fn is_running(&self) -> bool {
        self.end_time.is_none()
    }

    /// Elapsed time of a stopped entry, `end_time - start_time`.
    pub fn duration(&self) -> Option<Duration> {
        self.end_time.map(|end| end - self.start_time)
    }
}

/// Wire shape of an entry: derived fields are materialized, absent values are omitted.
#[derive(Serialize)]
struct EntryView<'a> {
    id: EntryId,
    employee_id: &'a EmployeeId,
    start_time: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    end_time: Option<DateTime<Utc>>,
    is_running: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration_ms: Option<i64>,
}

impl Serialize for TimerEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        EntryView {
            id: self.id,
            employee_id: &self.employee_id,
            start_time: self.start_time,
            end_time: self.end_time,
            is_running: self.is_running(),
            duration_ms: self.duration().map(|d| d.num_milliseconds()),
        }
        .serialize(serializer)
    }
}

/// Per-employee timer state, derived from the entry history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum TimerState {
    Idle,
    Running {
        entry_id: EntryId,
        since: DateTime<Utc>,
    },
}

impl TimerState {
    pub const fn is_running(&self) -> bool {
        matches!(self, Self::Running { .. })
    }
}
