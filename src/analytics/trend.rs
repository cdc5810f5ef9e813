//! Daily trend smoothing
//!
//! Daily means over the most recent days, smoothed with a trailing 3-day
//! rolling average and classified by the change from first to last point.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::GlucoseReading;

/// Most recent distinct days considered
pub const TREND_LOOKBACK_DAYS: usize = 7;

/// Fewer days than this yields no trend
pub const MIN_TREND_DAYS: usize = 3;

/// Rolling average width
pub const SMOOTHING_WINDOW: usize = 3;

/// Changes within +/- this band are "stable" (mmol/L)
pub const STABLE_BAND: f64 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendLabel {
    Increasing,
    Decreasing,
    Stable,
}

impl TrendLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrendLabel::Increasing => "increasing",
            TrendLabel::Decreasing => "decreasing",
            TrendLabel::Stable => "stable",
        }
    }

    pub fn classify(diff: f64) -> Self {
        if diff > STABLE_BAND {
            TrendLabel::Increasing
        } else if diff < -STABLE_BAND {
            TrendLabel::Decreasing
        } else {
            TrendLabel::Stable
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyTrend {
    pub date: String,
    pub avg: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendSeries {
    pub data: Vec<DailyTrend>,
    pub label: Option<TrendLabel>,
}

impl TrendSeries {
    pub fn empty() -> Self {
        Self {
            data: Vec::new(),
            label: None,
        }
    }
}

/// Raw daily means, ascending by day key. Days whose readings are all
/// unparsable are left out.
pub fn daily_means(readings: &[GlucoseReading]) -> Vec<DailyTrend> {
    let mut by_day: BTreeMap<&str, (f64, usize)> = BTreeMap::new();

    for reading in readings {
        let Some(value) = reading.value() else {
            continue;
        };
        let entry = by_day.entry(reading.day_key.as_str()).or_insert((0.0, 0));
        entry.0 += value;
        entry.1 += 1;
    }

    by_day
        .into_iter()
        .map(|(date, (sum, count))| DailyTrend {
            date: date.to_string(),
            avg: sum / count as f64,
        })
        .collect()
}

/// Trailing rolling average. The first `SMOOTHING_WINDOW - 1` points pass
/// through unsmoothed.
pub fn smooth(raw: &[DailyTrend]) -> Vec<DailyTrend> {
    raw.iter()
        .enumerate()
        .map(|(i, day)| {
            if i + 1 < SMOOTHING_WINDOW {
                return day.clone();
            }
            let slice = &raw[i + 1 - SMOOTHING_WINDOW..=i];
            let avg = slice.iter().map(|d| d.avg).sum::<f64>() / slice.len() as f64;
            DailyTrend {
                date: day.date.clone(),
                avg,
            }
        })
        .collect()
}

/// Compute the smoothed daily trend over the most recent days of data
pub fn compute_daily_trends(readings: &[GlucoseReading]) -> TrendSeries {
    let mut days = daily_means(readings);
    if days.len() > TREND_LOOKBACK_DAYS {
        days.drain(..days.len() - TREND_LOOKBACK_DAYS);
    }

    if days.len() < MIN_TREND_DAYS {
        tracing::debug!(days = days.len(), "not enough days for a trend");
        return TrendSeries::empty();
    }

    let data = smooth(&days);
    let label = match (data.first(), data.last()) {
        (Some(first), Some(last)) => Some(TrendLabel::classify(last.avg - first.avg)),
        _ => None,
    };

    TrendSeries { data, label }
}
