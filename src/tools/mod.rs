//! GlyTrack Tools module
//!
//! MCP tool implementations. Each tool takes an already-loaded `RecordSet`
//! and an explicit "now", so the analytics stay pure and testable.

pub mod day_keys;
pub mod glucose;
pub mod insulin;
pub mod reports;
pub mod status;

use std::path::Path;

use chrono::{DateTime, Utc};

use crate::data::RecordSet;

/// Longest window a tool accepts, in days
pub const MAX_WINDOW_DAYS: u32 = 366;

/// Parse an optional RFC 3339 "now"; absent means the current instant
pub fn parse_now(now: Option<&str>) -> Result<DateTime<Utc>, String> {
    match now.map(str::trim).filter(|s| !s.is_empty()) {
        Some(s) => parse_instant(s),
        None => Ok(Utc::now()),
    }
}

/// Parse an RFC 3339 instant
pub fn parse_instant(s: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(s.trim())
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| format!("Invalid RFC 3339 timestamp '{}': {}", s, e))
}

/// Validate a window length, falling back to `default`
pub fn window_days(days: Option<u32>, default: u32) -> Result<u32, String> {
    match days {
        None => Ok(default),
        Some(d) if (1..=MAX_WINDOW_DAYS).contains(&d) => Ok(d),
        Some(d) => Err(format!("Invalid window of {} days: must be between 1 and {}", d, MAX_WINDOW_DAYS)),
    }
}

/// Load the export file for a tool call
pub fn load_records(path: &Path) -> Result<RecordSet, String> {
    RecordSet::load(path).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_now() {
        let t = parse_now(Some("2026-01-14T12:00:00+01:00")).unwrap();
        assert_eq!(t.to_rfc3339(), "2026-01-14T11:00:00+00:00");
        assert!(parse_now(Some("yesterday")).is_err());
        assert!(parse_now(Some("  ")).is_ok());
    }

    #[test]
    fn test_window_days() {
        assert_eq!(window_days(None, 14), Ok(14));
        assert_eq!(window_days(Some(30), 14), Ok(30));
        assert!(window_days(Some(0), 14).is_err());
        assert!(window_days(Some(400), 14).is_err());
    }

    #[test]
    fn test_load_records_reports_missing_file() {
        let err = load_records(Path::new("/nonexistent/glytrack.json")).unwrap_err();
        assert!(err.contains("not found"));
    }
}
