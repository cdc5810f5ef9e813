//! Printable report statistics
//!
//! Everything the report renderer needs besides the raw readings: header
//! figures for the period, per-category stats for the 7- and 14-day windows
//! ending on the period's last elapsed day, and per-meal averages.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{GlucoseReading, MealSlot};
use super::day_key::{self, DayKeyRange};
use super::thresholds::Thresholds;
use super::window::{CategorySummary, WindowSummary, DASHBOARD_DAYS, WEEK_DAYS};

/// Period covered by a report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportRange {
    /// ISO week (Monday-Sunday) containing now
    #[default]
    Week,
    /// Calendar month containing now
    Month,
    /// First through last day with data
    All,
}

impl ReportRange {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "week" => Some(ReportRange::Week),
            "month" => Some(ReportRange::Month),
            "all" => Some(ReportRange::All),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReportRange::Week => "week",
            ReportRange::Month => "month",
            ReportRange::All => "all",
        }
    }

    /// Resolve to concrete day keys. `All` spans the supplied readings and
    /// falls back to today when there are none.
    pub fn resolve(&self, readings: &[GlucoseReading], now: DateTime<Utc>) -> DayKeyRange {
        match self {
            ReportRange::Week => DayKeyRange::iso_week_of(now),
            ReportRange::Month => DayKeyRange::month_of(now),
            ReportRange::All => {
                let first = readings.iter().map(|r| r.day_key.as_str()).min();
                let last = readings.iter().map(|r| r.day_key.as_str()).max();
                match (first, last) {
                    (Some(first), Some(last)) => DayKeyRange::new(first, last),
                    _ => {
                        let today = day_key::day_key(now);
                        DayKeyRange::new(today.clone(), today)
                    }
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportCategoryStats {
    pub total: usize,
    pub over_target: usize,
    pub within: usize,
    pub high: Option<f64>,
    pub low: Option<f64>,
}

impl From<&CategorySummary> for ReportCategoryStats {
    fn from(summary: &CategorySummary) -> Self {
        Self {
            total: summary.total,
            over_target: summary.over_target,
            within: summary.within,
            high: summary.high,
            low: summary.low,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportWindowStats {
    pub range: DayKeyRange,
    pub fasting: ReportCategoryStats,
    pub post_meal: ReportCategoryStats,
}

impl ReportWindowStats {
    fn build(range: DayKeyRange, readings: &[GlucoseReading], thresholds: &Thresholds) -> Self {
        let summary = WindowSummary::summarize(range.select(readings), thresholds);
        Self {
            range,
            fasting: (&summary.fasting).into(),
            post_meal: (&summary.post_meal).into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MealTypeStat {
    #[serde(rename = "type")]
    pub meal_type: MealSlot,
    pub average: Option<f64>,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportStats {
    pub range: ReportRange,
    pub period: DayKeyRange,
    pub total_readings: usize,
    pub average_fasting: Option<f64>,
    pub compliance_percentage: f64,
    pub window_7d: ReportWindowStats,
    pub window_14d: ReportWindowStats,
    pub meal_type_stats: Vec<MealTypeStat>,
}

/// Average post-meal value per canonical slot. Unrecognized labels count
/// as `Other`; every slot is listed even when empty.
pub fn meal_type_stats<'a, I>(readings: I) -> Vec<MealTypeStat>
where
    I: IntoIterator<Item = &'a GlucoseReading>,
{
    let mut by_slot: BTreeMap<MealSlot, (f64, usize)> =
        MealSlot::ALL.iter().map(|slot| (*slot, (0.0, 0))).collect();

    for reading in readings.into_iter().filter(|r| r.is_post_meal) {
        let Some(value) = reading.value() else {
            continue;
        };
        let slot = MealSlot::from_label(reading.meal_label()).unwrap_or(MealSlot::Other);
        let entry = by_slot.entry(slot).or_insert((0.0, 0));
        entry.0 += value;
        entry.1 += 1;
    }

    by_slot
        .into_iter()
        .map(|(slot, (sum, count))| MealTypeStat {
            meal_type: slot,
            average: (count > 0).then(|| sum / count as f64),
            count,
        })
        .collect()
}

/// Build report statistics for `range` relative to `now`.
///
/// `readings` may extend beyond the period; the 7/14-day windows draw from
/// the full set and end on the period's last day, or today if that is earlier.
pub fn compute_report_stats(
    readings: &[GlucoseReading],
    range: ReportRange,
    now: DateTime<Utc>,
    thresholds: &Thresholds,
) -> ReportStats {
    let period = range.resolve(readings, now);
    let in_period = period.select(readings);
    let summary = WindowSummary::summarize(in_period.iter().copied(), thresholds);

    let today = day_key::local_date(now);
    let end = day_key::parse_day_key(&period.end).map_or(today, |last| last.min(today));
    let window_7d = ReportWindowStats::build(DayKeyRange::ending_on(end, WEEK_DAYS), readings, thresholds);
    let window_14d = ReportWindowStats::build(DayKeyRange::ending_on(end, DASHBOARD_DAYS), readings, thresholds);

    tracing::debug!(
        range = range.as_str(),
        start = %period.start,
        end = %period.end,
        readings = summary.reading_count,
        "computed report stats"
    );

    ReportStats {
        range,
        total_readings: summary.reading_count,
        average_fasting: summary.fasting.average(),
        compliance_percentage: summary.compliance_percentage(),
        window_7d,
        window_14d,
        meal_type_stats: meal_type_stats(in_period.iter().copied()),
        period,
    }
}
