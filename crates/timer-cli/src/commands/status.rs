//! Status command for showing whether an employee's timer is running.

use std::io::Write;

use anyhow::Result;

use timer_core::{Clock, EntryStore, TimerService, TimerState};

use super::util::{format_duration, format_timestamp};

pub fn run<W, S, C>(writer: &mut W, service: &TimerService<S, C>, employee_id: &str) -> Result<()>
where
    W: Write,
    S: EntryStore,
    C: Clock,
{
    match service.state(employee_id)? {
        TimerState::Idle => writeln!(writer, "{employee_id}: idle")?,
        TimerState::Running { since, .. } => {
            let elapsed = service.clock().now() - since;
            writeln!(
                writer,
                "{employee_id}: running since {} ({} elapsed)",
                format_timestamp(since),
                format_duration(elapsed)
            )?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::{Duration, TimeZone, Utc};
    use insta::assert_snapshot;
    use timer_core::{ManualClock, MemoryStore};

    fn service() -> TimerService<MemoryStore, ManualClock> {
        let t0 = Utc.with_ymd_and_hms(2025, 1, 1, 9, 0, 0).unwrap();
        TimerService::with_clock(MemoryStore::new(), ManualClock::new(t0))
    }

    fn status(service: &TimerService<MemoryStore, ManualClock>) -> String {
        let mut output = Vec::new();
        run(&mut output, service, "E1").unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn status_idle_before_first_start() {
        assert_snapshot!(status(&service()).trim_end(), @"E1: idle");
    }

    #[test]
    fn status_running_shows_elapsed() {
        let service = service();
        service.start("E1").unwrap();
        service.clock().advance(Duration::minutes(95));

        assert_snapshot!(
            status(&service).trim_end(),
            @"E1: running since 2025-01-01T09:00:00Z (01:35:00 elapsed)"
        );
    }

    #[test]
    fn status_idle_after_stop() {
        let service = service();
        service.start("E1").unwrap();
        service.stop("E1").unwrap();
        assert_eq!(status(&service), "E1: idle\n");
    }
}
