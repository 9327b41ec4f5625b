//! Time utilities for wird
//!
//! Plans are day-indexed, streaks are calendar-day based. Everything here
//! works on the local calendar date of the running process.
//!
//! # Mock Time for Development
//!
//! In debug builds, the `WIRD_MOCK_TIME` environment variable can be set
//! to override the system time for all time-sensitive operations. This is
//! useful for walking a streak across several days by hand.
//!
//! Format: `YYYY-MM-DD HH:MM:SS` (e.g., `2025-12-25 14:30:00`)
//!
//! Example:
//! ```bash
//! WIRD_MOCK_TIME="2025-12-25 14:30:00" wird goal progress <id>
//! ```

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone};
use std::sync::OnceLock;

/// Environment variable name for mock time (debug builds only)
pub const MOCK_TIME_ENV_VAR: &str = "WIRD_MOCK_TIME";

/// Calendar date format used for persisted dates
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Cached mock time offset from the real time when the process started.
/// This allows mock time to advance naturally.
static MOCK_TIME_OFFSET: OnceLock<Option<chrono::Duration>> = OnceLock::new();

#[allow(clippy::disallowed_methods)] // This is the internal implementation that wraps Local::now()
fn get_mock_time_offset() -> Option<chrono::Duration> {
    *MOCK_TIME_OFFSET.get_or_init(|| {
        #[cfg(debug_assertions)]
        {
            if let Ok(mock_time_str) = std::env::var(MOCK_TIME_ENV_VAR) {
                match NaiveDateTime::parse_from_str(&mock_time_str, "%Y-%m-%d %H:%M:%S") {
                    Ok(naive_dt) => {
                        if let Some(mock_dt) = Local.from_local_datetime(&naive_dt).single() {
                            let offset = mock_dt.signed_duration_since(chrono::Local::now());
                            tracing::info!(
                                mock_time = %mock_time_str,
                                offset_secs = offset.num_seconds(),
                                "Mock time enabled"
                            );
                            return Some(offset);
                        }
                        tracing::warn!(
                            mock_time = %mock_time_str,
                            "Failed to convert mock time to local timezone"
                        );
                    }
                    Err(_) => {
                        tracing::warn!(
                            mock_time = %mock_time_str,
                            expected_format = "%Y-%m-%d %H:%M:%S",
                            "Invalid mock time format"
                        );
                    }
                }
            }
            None
        }
        #[cfg(not(debug_assertions))]
        {
            None
        }
    })
}

/// Returns whether mock time is currently active.
pub fn is_mock_time_active() -> bool {
    get_mock_time_offset().is_some()
}

/// Get the current local time, respecting mock time settings in debug builds.
#[allow(clippy::disallowed_methods)] // This is the wrapper that provides mock time support
pub fn now() -> DateTime<Local> {
    let real_now = chrono::Local::now();

    match get_mock_time_offset() {
        Some(offset) => real_now + offset,
        None => real_now,
    }
}

/// Today's local calendar date
pub fn today() -> NaiveDate {
    now().date_naive()
}

/// The calendar day before `day`
pub fn previous_day(day: NaiveDate) -> Option<NaiveDate> {
    day.pred_opt()
}

/// Format a calendar date as `YYYY-MM-DD`
pub fn format_date(day: NaiveDate) -> String {
    day.format(DATE_FORMAT).to_string()
}

/// Parse a calendar date.
///
/// Accepts plain `YYYY-MM-DD` as well as a full RFC 3339 timestamp, whose
/// local calendar date is used.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if let Ok(day) = NaiveDate::parse_from_str(s, DATE_FORMAT) {
        return Some(day);
    }
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Local).date_naive())
}

/// Format a DateTime for display with full date and time.
pub fn format_datetime_full(dt: &DateTime<Local>) -> String {
    dt.format("%Y-%m-%d %H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn test_previous_day_crosses_month_and_year() {
        let day = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        assert_eq!(
            previous_day(day),
            NaiveDate::from_ymd_opt(2024, 12, 31)
        );

        let leap = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert_eq!(previous_day(leap), NaiveDate::from_ymd_opt(2024, 2, 29));
    }

    #[test]
    fn test_format_and_parse_date() {
        let day = NaiveDate::from_ymd_opt(2025, 12, 25).unwrap();
        assert_eq!(format_date(day), "2025-12-25");
        assert_eq!(parse_date("2025-12-25"), Some(day));
        assert_eq!(parse_date(" 2025-12-25 "), Some(day));
    }

    #[test]
    fn test_parse_date_rejects_garbage() {
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("not a date"), None);
        assert_eq!(parse_date("2025/12/25"), None);
    }

    #[test]
    fn test_parse_date_accepts_timestamp() {
        let parsed = parse_date("2025-06-15T12:00:00+00:00").unwrap();
        assert_eq!(parsed.year(), 2025);
        assert_eq!(parsed.month(), 6);
    }

    #[test]
    fn test_format_datetime_full() {
        let dt = Local.with_ymd_and_hms(2025, 12, 25, 14, 30, 45).unwrap();
        assert_eq!(format_datetime_full(&dt), "2025-12-25 14:30:45");
    }

    #[test]
    fn test_today_matches_now() {
        let t = now();
        assert!(t.year() >= 2020);
        assert!(today().year() >= 2020);
    }

    #[test]
    fn test_mock_time_env_var_name() {
        assert_eq!(MOCK_TIME_ENV_VAR, "WIRD_MOCK_TIME");
        let _ = is_mock_time_active();
    }
}
