//! Day keys
//!
//! Every record is bucketed by its civil calendar date in Europe/Oslo,
//! formatted `YYYY-MM-DD`. The zero-padded ISO form orders lexicographically,
//! so range filters compare key strings and never raw instants.

use chrono::{DateTime, Datelike, Days, NaiveDate, Timelike, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::models::{GlucoseReading, InsulinDose};

/// The single timezone all day keys are computed in
pub const LOCAL_TZ: Tz = chrono_tz::Europe::Oslo;

const DAY_KEY_FORMAT: &str = "%Y-%m-%d";

/// Civil date of an instant in the local timezone
pub fn local_date(instant: DateTime<Utc>) -> NaiveDate {
    instant.with_timezone(&LOCAL_TZ).date_naive()
}

/// Local wall-clock hour (0-23) of an instant
pub fn local_hour(instant: DateTime<Utc>) -> u32 {
    instant.with_timezone(&LOCAL_TZ).hour()
}

/// Day key for an instant. Total over all instants and DST-safe.
pub fn day_key(instant: DateTime<Utc>) -> String {
    format_day_key(local_date(instant))
}

pub fn format_day_key(date: NaiveDate) -> String {
    date.format(DAY_KEY_FORMAT).to_string()
}

/// Parse a strict `YYYY-MM-DD` day key.
///
/// Rejects unpadded or differently separated dates even where chrono's
/// parser would accept them, since those would break lexicographic order.
pub fn parse_day_key(key: &str) -> Option<NaiveDate> {
    let bytes = key.as_bytes();
    if bytes.len() != 10 || bytes[4] != b'-' || bytes[7] != b'-' {
        return None;
    }
    let digits_ok = bytes
        .iter()
        .enumerate()
        .all(|(i, b)| i == 4 || i == 7 || b.is_ascii_digit());
    if !digits_ok {
        return None;
    }
    NaiveDate::parse_from_str(key, DAY_KEY_FORMAT).ok()
}

pub fn is_valid_day_key(key: &str) -> bool {
    parse_day_key(key).is_some()
}

/// Shift a day key by whole civil days (negative moves backwards)
pub fn shift_day_key(key: &str, days: i64) -> Option<String> {
    let date = parse_day_key(key)?;
    let shifted = if days >= 0 {
        date.checked_add_days(Days::new(days as u64))?
    } else {
        date.checked_sub_days(Days::new(days.unsigned_abs()))?
    };
    Some(format_day_key(shifted))
}

/// The following civil day
pub fn next_day_key(key: &str) -> Option<String> {
    let date = parse_day_key(key)?;
    date.succ_opt().map(format_day_key)
}

/// Monday of the ISO week containing `key`
pub fn week_start_day_key(key: &str) -> Option<String> {
    let date = parse_day_key(key)?;
    let offset = date.weekday().num_days_from_monday() as u64;
    date.checked_sub_days(Days::new(offset)).map(format_day_key)
}

/// Records that carry a day key
pub trait DayKeyed {
    fn day_key(&self) -> &str;
}

impl DayKeyed for GlucoseReading {
    fn day_key(&self) -> &str {
        &self.day_key
    }
}

impl DayKeyed for InsulinDose {
    fn day_key(&self) -> &str {
        &self.day_key
    }
}

/// Inclusive range of day keys
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayKeyRange {
    pub start: String,
    pub end: String,
}

impl DayKeyRange {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }

    /// The `days`-long window ending on `end` (inclusive)
    pub fn ending_on(end: NaiveDate, days: u32) -> Self {
        let span = u64::from(days.max(1) - 1);
        let start = end.checked_sub_days(Days::new(span)).unwrap_or(NaiveDate::MIN);
        Self::new(format_day_key(start), format_day_key(end))
    }

    /// The `days`-long window ending on today's civil date
    pub fn ending_at(now: DateTime<Utc>, days: u32) -> Self {
        Self::ending_on(local_date(now), days)
    }

    /// Monday through Sunday of the ISO week containing `now`
    pub fn iso_week_of(now: DateTime<Utc>) -> Self {
        let today = local_date(now);
        let offset = u64::from(today.weekday().num_days_from_monday());
        let monday = today.checked_sub_days(Days::new(offset)).unwrap_or(today);
        let sunday = monday.checked_add_days(Days::new(6)).unwrap_or(monday);
        Self::new(format_day_key(monday), format_day_key(sunday))
    }

    /// First through last day of the calendar month containing `now`
    pub fn month_of(now: DateTime<Utc>) -> Self {
        let today = local_date(now);
        let first = today.with_day(1).unwrap_or(today);
        let next_month_first = if first.month() == 12 {
            NaiveDate::from_ymd_opt(first.year() + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(first.year(), first.month() + 1, 1)
        };
        let last = next_month_first.and_then(|d| d.pred_opt()).unwrap_or(today);
        Self::new(format_day_key(first), format_day_key(last))
    }

    pub fn contains(&self, key: &str) -> bool {
        key >= self.start.as_str() && key <= self.end.as_str()
    }

    /// Records whose day key falls inside the range, order preserved
    pub fn select<'a, T: DayKeyed>(&self, records: &'a [T]) -> Vec<&'a T> {
        records.iter().filter(|r| self.contains(r.day_key())).collect()
    }

    /// Owned copy of the records inside the range
    pub fn select_cloned<T: DayKeyed + Clone>(&self, records: &[T]) -> Vec<T> {
        records
            .iter()
            .filter(|r| self.contains(r.day_key()))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn test_spring_forward() {
        // Oslo switches to CEST on 2026-03-29 at 02:00 local
        assert_eq!(day_key(utc("2026-03-29T00:30:00Z")), "2026-03-29");
        assert_eq!(day_key(utc("2026-03-29T01:30:00Z")), "2026-03-29");
    }

    #[test]
    fn test_fall_back() {
        // Oslo switches back to CET on 2026-10-25 at 03:00 local
        assert_eq!(day_key(utc("2026-10-25T00:30:00Z")), "2026-10-25");
        assert_eq!(day_key(utc("2026-10-25T01:30:00Z")), "2026-10-25");
        assert_eq!(day_key(utc("2026-10-25T02:30:00Z")), "2026-10-25");
    }

    #[test]
    fn test_local_midnight() {
        assert_eq!(day_key(utc("2026-01-15T23:00:01Z")), "2026-01-16");
        assert_eq!(day_key(utc("2026-01-14T22:59:59Z")), "2026-01-14");
        assert_eq!(day_key(utc("2026-01-15T22:30:00Z")), "2026-01-15");
        assert_eq!(day_key(utc("2026-01-15T23:30:00Z")), "2026-01-16");
        // summer time: midnight is 22:00Z
        assert_eq!(day_key(utc("2026-07-01T21:59:59Z")), "2026-07-01");
        assert_eq!(day_key(utc("2026-07-01T22:00:00Z")), "2026-07-02");
    }

    #[test]
    fn test_local_hour() {
        assert_eq!(local_hour(Utc.with_ymd_and_hms(2026, 1, 10, 19, 0, 0).unwrap()), 20);
        assert_eq!(local_hour(Utc.with_ymd_and_hms(2026, 7, 10, 19, 0, 0).unwrap()), 21);
    }

    #[test]
    fn test_parse_day_key_strict() {
        assert!(parse_day_key("2026-01-05").is_some());
        for invalid in ["2026-1-05", "2026/01/05", "05-01-2026", "2026-01-05T00", "", "2026-02-30"] {
            assert!(parse_day_key(invalid).is_none(), "{} should be rejected", invalid);
        }
    }

    #[test]
    fn test_next_and_shift() {
        assert_eq!(next_day_key("2026-03-28").as_deref(), Some("2026-03-29"));
        assert_eq!(next_day_key("2026-12-31").as_deref(), Some("2027-01-01"));
        assert_eq!(next_day_key("2028-02-28").as_deref(), Some("2028-02-29"));
        assert_eq!(shift_day_key("2026-01-14", -13).as_deref(), Some("2026-01-01"));
        assert_eq!(shift_day_key("2026-01-01", 0).as_deref(), Some("2026-01-01"));
        assert_eq!(next_day_key("bogus"), None);
    }

    #[test]
    fn test_week_start() {
        // 2026-01-05 is a Monday
        assert_eq!(week_start_day_key("2026-01-05").as_deref(), Some("2026-01-05"));
        assert_eq!(week_start_day_key("2026-01-11").as_deref(), Some("2026-01-05"));
        assert_eq!(week_start_day_key("2026-01-04").as_deref(), Some("2025-12-29"));
    }

    #[test]
    fn test_range_ending_at() {
        // 23:00Z on Jan 4 is already Jan 5 in Oslo
        let range = DayKeyRange::ending_at(utc("2026-01-04T23:00:00Z"), 14);
        assert_eq!(range.end, "2026-01-05");
        assert_eq!(range.start, "2025-12-23");

        let week = DayKeyRange::ending_at(utc("2026-01-04T23:00:00Z"), 7);
        assert_eq!(week.start, "2025-12-30");
    }

    #[test]
    fn test_range_contains() {
        let range = DayKeyRange::new("2026-01-05", "2026-01-11");
        assert!(range.contains("2026-01-08"));
        assert!(range.contains("2026-01-05"));
        assert!(range.contains("2026-01-11"));
        assert!(!range.contains("2026-01-04"));
        assert!(!range.contains("2026-01-12"));
    }

    #[test]
    fn test_iso_week_and_month() {
        let now = utc("2026-01-08T12:00:00Z");
        assert_eq!(DayKeyRange::iso_week_of(now), DayKeyRange::new("2026-01-05", "2026-01-11"));
        assert_eq!(DayKeyRange::month_of(now), DayKeyRange::new("2026-01-01", "2026-01-31"));
        assert_eq!(
            DayKeyRange::month_of(utc("2026-12-15T12:00:00Z")),
            DayKeyRange::new("2026-12-01", "2026-12-31")
        );
        assert_eq!(
            DayKeyRange::month_of(utc("2028-02-10T12:00:00Z")),
            DayKeyRange::new("2028-02-01", "2028-02-29")
        );
    }

    #[test]
    fn test_select() {
        let readings = vec![
            GlucoseReading::new("a", utc("2026-01-04T12:00:00Z"), "5.0"),
            GlucoseReading::new("b", utc("2026-01-06T12:00:00Z"), "5.0"),
            GlucoseReading::new("c", utc("2026-01-12T12:00:00Z"), "5.0"),
        ];
        let range = DayKeyRange::new("2026-01-05", "2026-01-11");
        let selected = range.select(&readings);
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].id, "b");
    }
}
