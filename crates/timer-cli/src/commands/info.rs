//! Info command for showing an employee's recorded intervals.

use std::io::Write;

use anyhow::Result;
use serde::Serialize;

use timer_core::{Clock, EntryStore, TimerEntry, TimerService};

use super::util::{format_duration, format_timestamp};

#[derive(Serialize)]
struct HistoryJson<'a> {
    entries: &'a [TimerEntry],
}

/// Runs the info command, most recent entry first.
pub fn run<W, S, C>(
    writer: &mut W,
    service: &TimerService<S, C>,
    employee_id: &str,
    json: bool,
) -> Result<()>
where
    W: Write,
    S: EntryStore,
    C: Clock,
{
    let entries = service.history(employee_id)?;
    if json {
        let output = serde_json::to_string_pretty(&HistoryJson { entries: &entries })?;
        writeln!(writer, "{output}")?;
    } else {
        write_text(writer, &entries)?;
    }
    Ok(())
}

fn write_text<W: Write>(writer: &mut W, entries: &[TimerEntry]) -> Result<()> {
    if entries.is_empty() {
        writeln!(writer, "No timer entries.")?;
        return Ok(());
    }

    for (index, entry) in entries.iter().enumerate() {
        if index > 0 {
            writeln!(writer)?;
        }
        writeln!(writer, "Entry {}:", index + 1)?;
        writeln!(writer, "  Start:    {}", format_timestamp(entry.start_time))?;
        match (entry.end_time, entry.duration()) {
            (Some(end_time), Some(duration)) => {
                writeln!(writer, "  End:      {}", format_timestamp(end_time))?;
                writeln!(writer, "  Duration: {}", format_duration(duration))?;
            }
            _ => writeln!(writer, "  Timer running")?,
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

    fn service_with_history() -> TimerService<MemoryStore, ManualClock> {
        let t0 = Utc.with_ymd_and_hms(2025, 1, 1, 9, 0, 0).unwrap();
        let service = TimerService::with_clock(MemoryStore::new(), ManualClock::new(t0));
        service.start("E1").unwrap();
        service.clock().advance(Duration::seconds(3600));
        service.stop("E1").unwrap();
        service.clock().advance(Duration::minutes(30));
        service.start("E1").unwrap();
        service
    }

    #[test]
    fn info_text_lists_entries_newest_first() {
        let service = service_with_history();
        let mut output = Vec::new();
        run(&mut output, &service, "E1", false).unwrap();

        let output = String::from_utf8(output).unwrap();
        assert_snapshot!(output.trim_end(), @r"
Entry 1:
  Start:    2025-01-01T10:30:00Z
  Timer running

Entry 2:
  Start:    2025-01-01T09:00:00Z
  End:      2025-01-01T10:00:00Z
  Duration: 01:00:00
");
    }

    #[test]
    fn info_text_for_unknown_employee() {
        let service = TimerService::new(MemoryStore::new());
        let mut output = Vec::new();
        run(&mut output, &service, "unknown", false).unwrap();
        assert_eq!(String::from_utf8(output).unwrap(), "No timer entries.\n");
    }

    #[test]
    fn info_json_uses_true_optionals() {
        let service = service_with_history();
        let mut output = Vec::new();
        run(&mut output, &service, "E1", true).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&output).unwrap();
        let entries = value["entries"].as_array().unwrap();
        assert_eq!(entries.len(), 2);

        assert_eq!(entries[0]["is_running"], true);
        assert!(entries[0].get("end_time").is_none());
        assert!(entries[0].get("duration_ms").is_none());

        assert_eq!(entries[1]["is_running"], false);
        assert_eq!(entries[1]["end_time"], "2025-01-01T10:00:00Z");
        assert_eq!(entries[1]["duration_ms"], 3_600_000);
    }

    #[test]
    fn info_json_for_unknown_employee_is_empty_list() {
        let service = TimerService::new(MemoryStore::new());
        let mut output = Vec::new();
        run(&mut output, &service, "unknown", true).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&output).unwrap();
        assert_eq!(value, serde_json::json!({ "entries": [] }));
    }

    #[test]
    fn info_rejects_empty_id() {
        let service = TimerService::new(MemoryStore::new());
        let err = run(&mut Vec::new(), &service, "", false).unwrap_err();
        assert_eq!(err.to_string(), "employee ID cannot be empty");
    }
}
