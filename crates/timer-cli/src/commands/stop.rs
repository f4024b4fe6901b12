//! Stop command.

use std::io::Write;

use anyhow::Result;

use timer_core::{Clock, EntryStore, TimerService};

/// Runs the stop command.
pub fn run<W, S, C>(writer: &mut W, service: &TimerService<S, C>, employee_id: &str) -> Result<()>
where
    W: Write,
    S: EntryStore,
    C: Clock,
{
    service.stop(employee_id)?;
    writeln!(writer, "timer stopped")?;
    Ok(())
}
