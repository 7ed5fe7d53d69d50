//! Timestamp storage format and the fixed reminder offset.
//!
//! All timestamps are naive local times at whole-second precision. The
//! `"%Y-%m-%d %H:%M:%S"` text form sorts lexicographically in time order,
//! which the store relies on for SQL comparisons.

use chrono::{Datelike, NaiveDateTime, TimeDelta, Timelike};

use crate::errors::CoreError;

/// Text format of `deadline` and `nextTime` columns.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Text format of a calendar date, matching SQLite's `DATE()`.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Minutes between a task's reminder and its deadline.
pub const REMINDER_OFFSET_MINUTES: i64 = 5;

/// The reminder offset as a duration.
#[must_use]
pub const fn reminder_offset() -> TimeDelta {
    TimeDelta::minutes(REMINDER_OFFSET_MINUTES)
}

/// Years that format as four digits; anything outside breaks text ordering.
const STORABLE_YEARS: std::ops::RangeInclusive<i32> = 1..=9999;

/// Check that `ts` fits the fixed-width `TIMESTAMP_FORMAT`.
///
/// # Errors
///
/// Returns `CoreError::Validation` for years outside `0001..=9999`.
pub fn ensure_storable(ts: NaiveDateTime) -> Result<NaiveDateTime, CoreError> {
    if STORABLE_YEARS.contains(&ts.year()) {
        Ok(ts)
    } else {
        Err(CoreError::Validation(format!(
            "timestamp {ts} is outside years 0001-9999"
        )))
    }
}

/// Default reminder time for a deadline.
///
/// # Errors
///
/// Returns `CoreError::Validation` if the deadline or its reminder time falls
/// outside the storable range.
pub fn reminder_time_for(deadline: NaiveDateTime) -> Result<NaiveDateTime, CoreError> {
    ensure_storable(deadline)?;
    let reminder = deadline.checked_sub_signed(reminder_offset()).ok_or_else(|| {
        CoreError::Validation(format!("deadline {deadline} leaves no room for a reminder"))
    })?;
    ensure_storable(reminder)
}

/// Drop sub-second precision so the value survives a storage round trip.
#[must_use]
pub fn truncate_to_seconds(ts: NaiveDateTime) -> NaiveDateTime {
    ts.with_nanosecond(0).unwrap_or(ts)
}

#[must_use]
pub fn format_timestamp(ts: NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

/// Parse a stored timestamp.
///
/// # Errors
///
/// Returns `CoreError::Validation` if `s` is not in `TIMESTAMP_FORMAT`.
pub fn parse_timestamp(s: &str) -> Result<NaiveDateTime, CoreError> {
    NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT)
        .map_err(|e| CoreError::Validation(format!("invalid timestamp '{s}': {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 14)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn format_and_parse_agree() {
        let t = ts(9, 5, 7);
        assert_eq!(format_timestamp(t), "2026-03-14 09:05:07");
        assert_eq!(parse_timestamp("2026-03-14 09:05:07").unwrap(), t);
    }

    #[test]
    fn parse_rejects_other_formats() {
        assert!(matches!(
            parse_timestamp("2026-03-14T09:05:07Z"),
            Err(CoreError::Validation(_))
        ));
    }

    #[test]
    fn reminder_is_five_minutes_before_deadline() {
        assert_eq!(reminder_time_for(ts(10, 0, 0)).unwrap(), ts(9, 55, 0));
    }

    #[test]
    fn reminder_rejects_unstorable_deadlines() {
        for deadline in [
            NaiveDateTime::MIN,
            NaiveDateTime::MAX,
            NaiveDate::from_ymd_opt(10_000, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            NaiveDate::from_ymd_opt(1, 1, 1)
                .unwrap()
                .and_hms_opt(0, 4, 59)
                .unwrap(),
        ] {
            assert!(
                matches!(reminder_time_for(deadline), Err(CoreError::Validation(_))),
                "{deadline} should be rejected"
            );
        }
    }

    #[test]
    fn storable_range_edges() {
        let first = NaiveDate::from_ymd_opt(1, 1, 1)
            .unwrap()
            .and_hms_opt(0, 5, 0)
            .unwrap();
        assert_eq!(format_timestamp(reminder_time_for(first).unwrap()), "0001-01-01 00:00:00");

        let last = NaiveDate::from_ymd_opt(9999, 12, 31)
            .unwrap()
            .and_hms_opt(23, 59, 59)
            .unwrap();
        assert_eq!(format_timestamp(ensure_storable(last).unwrap()), "9999-12-31 23:59:59");
    }

    #[test]
    fn truncation_drops_nanos() {
        let precise = ts(10, 0, 1).with_nanosecond(123_456_789).unwrap();
        assert_eq!(truncate_to_seconds(precise), ts(10, 0, 1));
    }

    #[test]
    fn text_order_matches_time_order() {
        let a = format_timestamp(ts(9, 59, 59));
        let b = format_timestamp(ts(10, 0, 0));
        assert!(a < b);
    }
}
