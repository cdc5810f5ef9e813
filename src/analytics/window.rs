//! Windowed aggregation
//!
//! `WindowSummary` is the single aggregation primitive over a window of
//! readings. The dashboard invokes it once for the 14-day set and once for
//! the 7-day subset; the printable report reuses it for its own windows.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::GlucoseReading;
use super::day_key::{self, DayKeyRange};
use super::thresholds::Thresholds;

/// Days in the completeness/coverage window
pub const WEEK_DAYS: u32 = 7;

/// Days in the full dashboard window
pub const DASHBOARD_DAYS: u32 = 14;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithinTarget {
    pub within: usize,
    pub total: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HighLow {
    pub high: f64,
    pub low: f64,
}

/// Per-category accumulator
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategorySummary {
    /// Readings with a parsable value
    pub total: usize,
    pub within: usize,
    pub over_target: usize,
    pub sum: f64,
    pub high: Option<f64>,
    pub low: Option<f64>,
    /// Day keys with at least one reading of this category, parsable or not
    pub days: BTreeSet<String>,
}

impl CategorySummary {
    fn record(&mut self, day_key: &str, value: Option<f64>, limit: f64) {
        self.days.insert(day_key.to_string());
        let Some(v) = value else {
            return;
        };
        self.total += 1;
        self.sum += v;
        if v > limit {
            self.over_target += 1;
        } else {
            self.within += 1;
        }
        self.high = Some(self.high.map_or(v, |h| h.max(v)));
        self.low = Some(self.low.map_or(v, |l| l.min(v)));
    }

    pub fn average(&self) -> Option<f64> {
        (self.total > 0).then(|| self.sum / self.total as f64)
    }

    pub fn within_target(&self) -> Option<WithinTarget> {
        (self.total > 0).then_some(WithinTarget {
            within: self.within,
            total: self.total,
        })
    }

    pub fn high_low(&self) -> Option<HighLow> {
        match (self.high, self.low) {
            (Some(high), Some(low)) => Some(HighLow { high, low }),
            _ => None,
        }
    }

    /// Distinct days with at least one reading of this category
    pub fn coverage(&self) -> usize {
        self.days.len()
    }
}

/// Aggregate over one window of readings
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WindowSummary {
    pub reading_count: usize,
    pub days: BTreeSet<String>,
    pub last_measured_at: Option<DateTime<Utc>>,
    pub fasting: CategorySummary,
    pub post_meal: CategorySummary,
    /// Readings with a parsable value (the compliance denominator)
    pub scored: usize,
    pub compliant: usize,
    pub over_target: usize,
    /// `over_target` split by the limit each reading was scored against
    pub over_target_by_limit: OverTargetBreakdown,
    pub missing_type: usize,
    pub conflicting_type: usize,
    pub unparsable: usize,
}

impl WindowSummary {
    pub fn summarize<'a, I>(readings: I, thresholds: &Thresholds) -> Self
    where
        I: IntoIterator<Item = &'a GlucoseReading>,
    {
        let mut summary = Self::default();

        for reading in readings {
            summary.reading_count += 1;
            summary.days.insert(reading.day_key.clone());
            summary.last_measured_at = Some(
                summary
                    .last_measured_at
                    .map_or(reading.measured_at, |t| t.max(reading.measured_at)),
            );

            if reading.is_untyped() {
                summary.missing_type += 1;
            }
            if reading.has_conflicting_type() {
                summary.conflicting_type += 1;
            }

            let value = reading.value();
            if value.is_none() {
                summary.unparsable += 1;
                tracing::debug!(id = %reading.id, raw = %reading.value_mmol_l, "unparsable glucose value excluded from aggregates");
            }

            if reading.is_fasting {
                summary.fasting.record(&reading.day_key, value, thresholds.fasting);
            }
            if reading.is_post_meal {
                summary.post_meal.record(&reading.day_key, value, thresholds.post_meal);
            }

            if let Some(v) = value {
                summary.scored += 1;
                if thresholds.is_compliant(reading, v) {
                    summary.compliant += 1;
                }
                if thresholds.is_over_target(reading, v) {
                    summary.over_target += 1;
                    if reading.is_fasting {
                        summary.over_target_by_limit.fasting += 1;
                    } else {
                        summary.over_target_by_limit.post_meal += 1;
                    }
                }
            }
        }

        summary
    }

    /// Percentage of scored readings within target; 100 for an empty window
    pub fn compliance_percentage(&self) -> f64 {
        if self.scored == 0 {
            100.0
        } else {
            self.compliant as f64 / self.scored as f64 * 100.0
        }
    }

    /// Fraction of `window_days` that have at least one reading
    pub fn completeness(&self, window_days: u32) -> f64 {
        if window_days == 0 {
            return 0.0;
        }
        self.days.len() as f64 / f64::from(window_days)
    }

    pub fn over_target_breakdown(&self) -> OverTargetBreakdown {
        self.over_target_by_limit
    }
}

/// Over-target readings by applicable limit. A reading flagged both ways is
/// scored as fasting, so the two fields always sum to the over-target count.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverTargetBreakdown {
    pub fasting: usize,
    pub post_meal: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WithinTargetStats {
    pub fasting_7d: Option<WithinTarget>,
    pub post_meal_7d: Option<WithinTarget>,
    pub fasting_14d: Option<WithinTarget>,
    pub post_meal_14d: Option<WithinTarget>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HighLowStats {
    pub fasting_7d: Option<HighLow>,
    pub post_meal_7d: Option<HighLow>,
}

/// Headline statistics for the dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub last_logged_at: Option<DateTime<Utc>>,
    pub has_logged_today: bool,
    /// 0.0-1.0
    pub week_completeness: f64,
    pub average_fasting: Option<f64>,
    pub average_post_meal: Option<f64>,
    pub compliance_percentage: f64,
    pub over_target_count_7d: usize,
    pub over_target_count_14d: usize,
    pub over_target_breakdown_7d: OverTargetBreakdown,
    pub over_target_breakdown_14d: OverTargetBreakdown,
    /// Days 0-7
    pub coverage_fasting: usize,
    pub coverage_post_meal: usize,
    pub quality_missing_type_count: usize,
    pub quality_both_types_count: usize,
    pub quality_unparsable_count: usize,
    pub within_target: WithinTargetStats,
    pub high_low: HighLowStats,
}

/// Compute dashboard statistics.
///
/// `readings` is the 14-day set. When `readings_7d` is `None` the 7-day
/// subset is taken from `readings` as the week ending on today's date.
pub fn compute_dashboard_stats(
    readings: &[GlucoseReading],
    readings_7d: Option<&[GlucoseReading]>,
    now: DateTime<Utc>,
    thresholds: &Thresholds,
) -> DashboardStats {
    let full = WindowSummary::summarize(readings, thresholds);
    let week = match readings_7d {
        Some(subset) => WindowSummary::summarize(subset, thresholds),
        None => {
            let range = DayKeyRange::ending_at(now, WEEK_DAYS);
            WindowSummary::summarize(range.select(readings), thresholds)
        }
    };

    tracing::debug!(
        readings_14d = full.reading_count,
        readings_7d = week.reading_count,
        "computed dashboard windows"
    );
    if full.unparsable > 0 {
        tracing::warn!(count = full.unparsable, "readings with unparsable values were skipped");
    }

    let today = day_key::day_key(now);
    let has_logged_today = readings
        .iter()
        .any(|r| day_key::day_key(r.measured_at) == today);

    DashboardStats {
        last_logged_at: full.last_measured_at,
        has_logged_today,
        week_completeness: week.completeness(WEEK_DAYS),
        average_fasting: full.fasting.average(),
        average_post_meal: full.post_meal.average(),
        compliance_percentage: full.compliance_percentage(),
        over_target_count_7d: week.over_target,
        over_target_count_14d: full.over_target,
        over_target_breakdown_7d: week.over_target_breakdown(),
        over_target_breakdown_14d: full.over_target_breakdown(),
        coverage_fasting: week.fasting.coverage(),
        coverage_post_meal: week.post_meal.coverage(),
        quality_missing_type_count: full.missing_type,
        quality_both_types_count: full.conflicting_type,
        quality_unparsable_count: full.unparsable,
        within_target: WithinTargetStats {
            fasting_7d: week.fasting.within_target(),
            post_meal_7d: week.post_meal.within_target(),
            fasting_14d: full.fasting.within_target(),
            post_meal_14d: full.post_meal.within_target(),
        },
        high_low: HighLowStats {
            fasting_7d: week.fasting.high_low(),
            post_meal_7d: week.post_meal.high_low(),
        },
    }
}
