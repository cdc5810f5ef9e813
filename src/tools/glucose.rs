//! Glucose analytics tools
//!
//! Dashboard statistics, meal breakdown and daily trend over windows ending
//! on the civil date of "now".

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::analytics::window::DASHBOARD_DAYS;
use crate::analytics::{
    compute_daily_trends, compute_dashboard_stats, compute_meal_breakdown, DashboardStats,
    DayKeyRange, MealStat, Thresholds, TrendSeries,
};
use crate::data::RecordSet;
use super::window_days;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    pub range: DayKeyRange,
    pub reading_count: usize,
    #[serde(flatten)]
    pub stats: DashboardStats,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MealBreakdownResponse {
    pub range: DayKeyRange,
    pub post_meal_count: usize,
    pub meals: Vec<MealStat>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyTrendsResponse {
    pub range: DayKeyRange,
    #[serde(flatten)]
    pub trend: TrendSeries,
}

/// Headline statistics for the 14-day window ending today
pub fn dashboard_stats(records: &RecordSet, now: DateTime<Utc>) -> Result<DashboardResponse, String> {
    let range = DayKeyRange::ending_at(now, DASHBOARD_DAYS);
    let readings = records.readings_in(&range);
    let stats = compute_dashboard_stats(&readings, None, now, &Thresholds::default());

    Ok(DashboardResponse {
        range,
        reading_count: readings.len(),
        stats,
    })
}

/// Post-meal breakdown by meal type over the last `days` days (default 14)
pub fn meal_breakdown(
    records: &RecordSet,
    now: DateTime<Utc>,
    days: Option<u32>,
) -> Result<MealBreakdownResponse, String> {
    let range = DayKeyRange::ending_at(now, window_days(days, DASHBOARD_DAYS)?);
    let readings = records.readings_in(&range);

    Ok(MealBreakdownResponse {
        post_meal_count: readings.iter().filter(|r| r.is_post_meal).count(),
        meals: compute_meal_breakdown(&readings, &Thresholds::default()),
        range,
    })
}

/// Smoothed daily trend over the last `days` days of readings (default 14)
pub fn daily_trends(
    records: &RecordSet,
    now: DateTime<Utc>,
    days: Option<u32>,
) -> Result<DailyTrendsResponse, String> {
    let range = DayKeyRange::ending_at(now, window_days(days, DASHBOARD_DAYS)?);
    let readings = records.readings_in(&range);

    Ok(DailyTrendsResponse {
        trend: compute_daily_trends(&readings),
        range,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use crate::analytics::TrendLabel;
    use crate::models::GlucoseReading;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 20, 12, 0, 0).unwrap()
    }

    fn records() -> RecordSet {
        let mut readings = Vec::new();
        for day in 1..=20u32 {
            let morning = Utc.with_ymd_and_hms(2026, 1, day, 6, 0, 0).unwrap();
            let lunch = Utc.with_ymd_and_hms(2026, 1, day, 11, 0, 0).unwrap();
            readings.push(GlucoseReading::new(format!("f{}", day), morning, format!("{:.1}", 4.0 + day as f64 * 0.1)).fasting());
            readings.push(GlucoseReading::new(format!("p{}", day), lunch, "7.0").post_meal(Some("lunsj")));
        }
        RecordSet::new(readings, Vec::new())
    }

    #[test]
    fn test_dashboard_uses_fourteen_day_window() {
        let response = dashboard_stats(&records(), now()).unwrap();
        assert_eq!(response.range, DayKeyRange::new("2026-01-07", "2026-01-20"));
        assert_eq!(response.reading_count, 28);
        assert!(response.stats.has_logged_today);
        assert_eq!(response.stats.coverage_fasting, 7);
        // fasting 5.4..6.0 on the last seven days, every lunch at 7.0
        assert_eq!(response.stats.over_target_count_14d, 21);
    }

    #[test]
    fn test_meal_breakdown_window() {
        let response = meal_breakdown(&records(), now(), Some(3)).unwrap();
        assert_eq!(response.post_meal_count, 3);
        assert_eq!(response.meals.len(), 1);
        assert_eq!(response.meals[0].meal_type, "lunsj");
        assert_eq!(response.meals[0].over_target_count, 3);

        assert!(meal_breakdown(&records(), now(), Some(0)).is_err());
    }

    #[test]
    fn test_daily_trends_gentle_rise_is_stable() {
        let response = daily_trends(&records(), now(), None).unwrap();
        assert_eq!(response.trend.data.len(), 7);
        // fasting rises 0.1/day but lunch is flat, so daily means rise 0.05/day
        assert_eq!(response.trend.label, Some(TrendLabel::Stable));

        let json = serde_json::to_value(&response).unwrap();
        assert!(json.get("data").is_some());
        assert_eq!(json["range"]["end"], "2026-01-20");
    }

    #[test]
    fn test_empty_record_set() {
        let response = dashboard_stats(&RecordSet::default(), now()).unwrap();
        assert_eq!(response.reading_count, 0);
        assert_eq!(response.stats.average_fasting, None);
        assert_eq!(response.stats.compliance_percentage, 100.0);
    }
}
