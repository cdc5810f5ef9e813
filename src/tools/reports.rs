//! Report statistics tool
//!
//! Produces the numbers the printable report is laid out from. Rendering
//! itself happens elsewhere.

use chrono::{DateTime, Utc};

use crate::analytics::{compute_report_stats, ReportRange, ReportStats, Thresholds};
use crate::data::RecordSet;

/// Parse a report range name, defaulting to the current week
pub fn parse_report_range(range: Option<&str>) -> Result<ReportRange, String> {
    match range {
        None => Ok(ReportRange::default()),
        Some(s) => ReportRange::from_str(s)
            .ok_or_else(|| format!("Invalid report range '{}': expected week, month or all", s)),
    }
}

/// Report statistics for the week, month or full history containing `now`
pub fn report_stats(
    records: &RecordSet,
    range: Option<&str>,
    now: DateTime<Utc>,
) -> Result<ReportStats, String> {
    let range = parse_report_range(range)?;
    Ok(compute_report_stats(&records.readings, range, now, &Thresholds::default()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use crate::analytics::DayKeyRange;
    use crate::models::GlucoseReading;

    #[test]
    fn test_parse_report_range() {
        assert_eq!(parse_report_range(None), Ok(ReportRange::Week));
        assert_eq!(parse_report_range(Some("all")), Ok(ReportRange::All));
        assert!(parse_report_range(Some("fortnight")).unwrap_err().contains("fortnight"));
    }

    #[test]
    fn test_all_range_spans_history() {
        let readings = vec![
            GlucoseReading::new("a", Utc.with_ymd_and_hms(2025, 11, 3, 7, 0, 0).unwrap(), "5.1").fasting(),
            GlucoseReading::new("b", Utc.with_ymd_and_hms(2026, 1, 5, 7, 0, 0).unwrap(), "5.5").fasting(),
        ];
        let records = RecordSet::new(readings, Vec::new());
        let now = Utc.with_ymd_and_hms(2026, 1, 14, 12, 0, 0).unwrap();

        let stats = report_stats(&records, Some("all"), now).unwrap();
        assert_eq!(stats.period, DayKeyRange::new("2025-11-03", "2026-01-05"));
        assert_eq!(stats.total_readings, 2);
        assert!((stats.compliance_percentage - 50.0).abs() < 1e-9);

        let week = report_stats(&records, None, now).unwrap();
        assert_eq!(week.total_readings, 0);
    }
}
