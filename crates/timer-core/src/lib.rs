//! Core domain logic for the employee timer.
//!
//! This crate contains:
//! - The timer state machine ([`TimerService`]): one running timer per employee
//! - The storage contract it depends on ([`EntryStore`])
//! - An in-memory store for tests and local runs ([`MemoryStore`])

mod clock;
mod entry;
pub mod memory;
mod service;
pub mod store;
mod types;

pub use clock::{Clock, ManualClock, SystemClock};
pub use entry::{TimerEntry, TimerState};
pub use memory::MemoryStore;
pub use service::{TimerError, TimerService};
pub use store::EntryStore;
pub use types::{EmployeeId, EntryId, ValidationError};
