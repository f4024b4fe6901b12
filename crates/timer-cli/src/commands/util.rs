//! Shared formatting for CLI commands.

use chrono::{DateTime, Duration, SecondsFormat, Utc};

/// Formats a timestamp as RFC 3339 UTC with whole seconds.
pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Formats a duration as `HH:MM:SS`; hours are not wrapped at 24.
pub fn format_duration(duration: Duration) -> String {
    let total = duration.num_seconds().max(0);
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::TimeZone;

    #[test]
    fn format_duration_pads_components() {
        assert_eq!(format_duration(Duration::seconds(3661)), "01:01:01");
        assert_eq!(format_duration(Duration::zero()), "00:00:00");
    }

    #[test]
    fn format_duration_keeps_hours_past_a_day() {
        assert_eq!(format_duration(Duration::hours(26)), "26:00:00");
    }

    #[test]
    fn format_duration_truncates_sub_second() {
        assert_eq!(format_duration(Duration::milliseconds(59_999)), "00:00:59");
    }

    #[test]
    fn format_timestamp_drops_fraction() {
        let ts = Utc.with_ymd_and_hms(2025, 1, 1, 9, 0, 0).unwrap() + Duration::milliseconds(250);
        assert_eq!(format_timestamp(ts), "2025-01-01T09:00:00Z");
    }
}
