//! Evening basal insulin vs. next-morning fasting glucose
//!
//! Pairs each evening long-acting dose with the first fasting reading of the
//! following civil day, groups the pairs by dose size and derives a
//! qualitative direction. The output never contains a dose recommendation,
//! only a fixed sentence pointing the user to their clinician.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::models::{GlucoseReading, InsulinDose, InsulinType};
use super::day_key;
use super::thresholds::Thresholds;

/// Doses at or after this local hour count as the evening dose
pub const EVENING_START_HOUR: u32 = 20;

/// Fewer complete pairs than this yields `InsufficientData`
pub const MIN_COMPLETE_PAIRS: usize = 3;

/// Number of most recent complete pairs the trend looks at
pub const TREND_LOOKBACK_PAIRS: usize = 5;

/// Fasting values below this suggest the dose may be lowered (mmol/L)
pub const LOW_FASTING_BOUND: f64 = 4.5;

/// Width of a dose bucket (units)
pub const DOSE_BUCKET_WIDTH: f64 = 2.0;

pub const INCREASE_SUGGESTION: &str = "Your fasting glucose has been above target after each of the \
    most recent evening doses. Consider discussing a possible dose increase with your doctor or \
    diabetes nurse.";

pub const DECREASE_SUGGESTION: &str = "Your fasting glucose has been low after each of the most \
    recent evening doses. Consider discussing a possible dose reduction with your doctor or \
    diabetes nurse.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrelationTrend {
    InsufficientData,
    IncreasingDoseNeeded,
    DecreasingDosePossible,
    Stable,
}

impl CorrelationTrend {
    pub fn as_str(&self) -> &'static str {
        match self {
            CorrelationTrend::InsufficientData => "insufficient_data",
            CorrelationTrend::IncreasingDoseNeeded => "increasing_dose_needed",
            CorrelationTrend::DecreasingDosePossible => "decreasing_dose_possible",
            CorrelationTrend::Stable => "stable",
        }
    }

    /// Fixed advisory sentence, if any
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            CorrelationTrend::IncreasingDoseNeeded => Some(INCREASE_SUGGESTION),
            CorrelationTrend::DecreasingDosePossible => Some(DECREASE_SUGGESTION),
            CorrelationTrend::InsufficientData | CorrelationTrend::Stable => None,
        }
    }
}

/// An evening dose and the next civil day's first fasting value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorrelationPair {
    /// Day key of the dose
    pub date: String,
    pub evening_dose: f64,
    pub next_fasting: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoseRangeStat {
    /// e.g. "4-6"
    pub dose_range: String,
    pub range_start: f64,
    pub avg_fasting: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorrelationResult {
    pub pairs: Vec<CorrelationPair>,
    pub complete_pairs: Vec<CorrelationPair>,
    pub avg_fasting_by_dose_range: Vec<DoseRangeStat>,
    pub trend: CorrelationTrend,
    pub suggestion: Option<String>,
}

/// Long-acting dose given in the local evening
pub fn is_evening_basal(dose: &InsulinDose) -> bool {
    dose.insulin_type == InsulinType::LongActing
        && day_key::local_hour(dose.administered_at) >= EVENING_START_HOUR
}

/// Day key -> first parsable fasting value of that day, in input order
pub fn first_fasting_by_day(readings: &[GlucoseReading]) -> HashMap<&str, f64> {
    let mut lookup = HashMap::new();
    for reading in readings.iter().filter(|r| r.is_fasting) {
        if let Some(value) = reading.value() {
            lookup.entry(reading.day_key.as_str()).or_insert(value);
        }
    }
    lookup
}

/// Build dose -> next-day fasting pairs, sorted by dose date
pub fn build_pairs(doses: &[InsulinDose], readings: &[GlucoseReading]) -> Vec<CorrelationPair> {
    let fasting = first_fasting_by_day(readings);

    let mut pairs: Vec<CorrelationPair> = doses
        .iter()
        .filter(|d| is_evening_basal(d))
        .filter_map(|dose| {
            let Some(units) = dose.units() else {
                tracing::warn!(id = %dose.id, raw = %dose.dose_units, "skipping dose with unparsable units");
                return None;
            };
            let next_fasting = day_key::next_day_key(&dose.day_key)
                .and_then(|next| fasting.get(next.as_str()).copied());
            Some(CorrelationPair {
                date: dose.day_key.clone(),
                evening_dose: units,
                next_fasting,
            })
        })
        .collect();

    pairs.sort_by(|a, b| a.date.cmp(&b.date));
    pairs
}

fn bucket_start(dose: f64) -> f64 {
    (dose / DOSE_BUCKET_WIDTH).floor() * DOSE_BUCKET_WIDTH
}

/// Mean next-day fasting per 2-unit dose range, ascending by range
pub fn bucket_by_dose(complete_pairs: &[CorrelationPair]) -> Vec<DoseRangeStat> {
    // keyed by bucket index so f64 never needs to be a map key
    let mut buckets: BTreeMap<i64, (f64, usize)> = BTreeMap::new();
    for pair in complete_pairs {
        let Some(fasting) = pair.next_fasting else {
            continue;
        };
        let index = (bucket_start(pair.evening_dose) / DOSE_BUCKET_WIDTH) as i64;
        let entry = buckets.entry(index).or_insert((0.0, 0));
        entry.0 += fasting;
        entry.1 += 1;
    }

    buckets
        .into_iter()
        .map(|(index, (sum, count))| {
            let start = index as f64 * DOSE_BUCKET_WIDTH;
            DoseRangeStat {
                dose_range: format!("{}-{}", start, start + DOSE_BUCKET_WIDTH),
                range_start: start,
                avg_fasting: sum / count as f64,
                count,
            }
        })
        .collect()
}

/// Classify the direction from the most recent complete pairs
pub fn classify_trend(complete_pairs: &[CorrelationPair], thresholds: &Thresholds) -> CorrelationTrend {
    if complete_pairs.len() < MIN_COMPLETE_PAIRS {
        return CorrelationTrend::InsufficientData;
    }

    let recent: Vec<f64> = complete_pairs
        .iter()
        .rev()
        .take(TREND_LOOKBACK_PAIRS)
        .filter_map(|p| p.next_fasting)
        .collect();

    if recent.iter().all(|v| *v > thresholds.fasting) {
        CorrelationTrend::IncreasingDoseNeeded
    } else if recent.iter().all(|v| *v < LOW_FASTING_BOUND) {
        CorrelationTrend::DecreasingDosePossible
    } else {
        CorrelationTrend::Stable
    }
}

/// Correlate evening long-acting doses with the following morning's fasting glucose
pub fn compute_insulin_correlation(
    doses: &[InsulinDose],
    readings: &[GlucoseReading],
    thresholds: &Thresholds,
) -> CorrelationResult {
    let pairs = build_pairs(doses, readings);
    let complete_pairs: Vec<CorrelationPair> = pairs
        .iter()
        .filter(|p| p.next_fasting.is_some())
        .cloned()
        .collect();

    tracing::debug!(
        pairs = pairs.len(),
        complete = complete_pairs.len(),
        "built insulin correlation pairs"
    );

    let trend = classify_trend(&complete_pairs, thresholds);
    let avg_fasting_by_dose_range = if trend == CorrelationTrend::InsufficientData {
        Vec::new()
    } else {
        bucket_by_dose(&complete_pairs)
    };

    CorrelationResult {
        pairs,
        complete_pairs,
        avg_fasting_by_dose_range,
        trend,
        suggestion: trend.suggestion().map(String::from),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};

    // January: Oslo is UTC+1, so 20:00Z is 21:00 local
    fn evening(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, day, 20, 0, 0).unwrap()
    }

    fn morning(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, day, 6, 30, 0).unwrap()
    }

    fn basal(day: u32, units: &str) -> InsulinDose {
        InsulinDose::new(format!("d{}", day), evening(day), units, InsulinType::LongActing)
    }

    fn fasting(day: u32, value: &str) -> GlucoseReading {
        GlucoseReading::new(format!("r{}", day), morning(day), value).fasting()
    }

    fn series(fasting_values: &[&str]) -> (Vec<InsulinDose>, Vec<GlucoseReading>) {
        let mut doses = Vec::new();
        let mut readings = Vec::new();
        for (i, v) in fasting_values.iter().enumerate() {
            let day = 1 + i as u32;
            doses.push(basal(day, "6"));
            readings.push(fasting(day + 1, v));
        }
        (doses, readings)
    }

    #[test]
    fn test_insufficient_data() {
        let (doses, readings) = series(&["9.0", "9.5"]);
        let result = compute_insulin_correlation(&doses, &readings, &Thresholds::default());
        assert_eq!(result.trend, CorrelationTrend::InsufficientData);
        assert_eq!(result.suggestion, None);
        assert_eq!(result.complete_pairs.len(), 2);
        assert!(result.avg_fasting_by_dose_range.is_empty());
    }

    #[test]
    fn test_increasing_dose_needed() {
        let (doses, readings) = series(&["5.6", "6.0", "5.9", "6.4", "5.5"]);
        let result = compute_insulin_correlation(&doses, &readings, &Thresholds::default());
        assert_eq!(result.trend, CorrelationTrend::IncreasingDoseNeeded);
        assert!(!result.suggestion.unwrap().is_empty());
    }

    #[test]
    fn test_decreasing_dose_possible() {
        let (doses, readings) = series(&["4.2", "4.0", "4.4", "3.9", "4.1"]);
        let result = compute_insulin_correlation(&doses, &readings, &Thresholds::default());
        assert_eq!(result.trend, CorrelationTrend::DecreasingDosePossible);
        assert!(result.suggestion.is_some());
    }

    #[test]
    fn test_stable_when_mixed() {
        let (doses, readings) = series(&["5.0", "6.0", "4.8", "5.4", "5.1"]);
        let result = compute_insulin_correlation(&doses, &readings, &Thresholds::default());
        assert_eq!(result.trend, CorrelationTrend::Stable);
        assert_eq!(result.suggestion, None);
    }

    #[test]
    fn test_trend_only_uses_last_five_pairs() {
        // early low values fall outside the lookback
        let (doses, readings) = series(&["4.0", "4.0", "6.0", "6.1", "6.2", "6.3", "6.4"]);
        let result = compute_insulin_correlation(&doses, &readings, &Thresholds::default());
        assert_eq!(result.complete_pairs.len(), 7);
        assert_eq!(result.trend, CorrelationTrend::IncreasingDoseNeeded);
    }

    #[test]
    fn test_only_evening_long_acting_doses_pair() {
        let readings = vec![fasting(2, "6.0"), fasting(3, "6.0"), fasting(4, "6.0")];
        let doses = vec![
            basal(1, "6"),
            // 18:00Z is 19:00 local: too early
            InsulinDose::new("early", Utc.with_ymd_and_hms(2026, 1, 2, 18, 0, 0).unwrap(), "6", InsulinType::LongActing),
            InsulinDose::new("rapid", evening(3), "4", InsulinType::RapidActing),
        ];
        let pairs = build_pairs(&doses, &readings);
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].date, "2026-01-01");
        assert_eq!(pairs[0].next_fasting, Some(6.0));
    }

    #[test]
    fn test_first_fasting_reading_of_day_wins() {
        let readings = vec![
            GlucoseReading::new("a", morning(2), "5.8").fasting(),
            GlucoseReading::new("b", Utc.with_ymd_and_hms(2026, 1, 2, 9, 0, 0).unwrap(), "4.0").fasting(),
        ];
        let pairs = build_pairs(&[basal(1, "8")], &readings);
        assert_eq!(pairs[0].next_fasting, Some(5.8));
    }

    #[test]
    fn test_missing_next_day_leaves_incomplete_pair() {
        let pairs = build_pairs(&[basal(1, "8")], &[fasting(3, "5.0")]);
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].next_fasting, None);
    }

    #[test]
    fn test_next_day_crosses_dst_change() {
        // 2026-03-28 21:30 CET dose, 2026-03-29 07:00 CEST fasting (05:00Z)
        let dose = InsulinDose::new("d", Utc.with_ymd_and_hms(2026, 3, 28, 20, 30, 0).unwrap(), "10", InsulinType::LongActing);
        let reading = GlucoseReading::new("r", Utc.with_ymd_and_hms(2026, 3, 29, 5, 0, 0).unwrap(), "5.2").fasting();
        let pairs = build_pairs(&[dose], &[reading]);
        assert_eq!(pairs[0].date, "2026-03-28");
        assert_eq!(pairs[0].next_fasting, Some(5.2));
    }

    #[test]
    fn test_pairs_sorted_by_date() {
        let (mut doses, readings) = series(&["5.0", "5.1", "5.2"]);
        doses.reverse();
        let pairs = build_pairs(&doses, &readings);
        let dates: Vec<&str> = pairs.iter().map(|p| p.date.as_str()).collect();
        assert_eq!(dates, vec!["2026-01-01", "2026-01-02", "2026-01-03"]);
    }

    #[test]
    fn test_dose_buckets() {
        let doses = vec![basal(1, "4"), basal(2, "5.5"), basal(3, "6"), basal(4, "7")];
        let readings = vec![fasting(2, "5.0"), fasting(3, "6.0"), fasting(4, "5.5"), fasting(5, "4.5")];
        let result = compute_insulin_correlation(&doses, &readings, &Thresholds::default());

        assert_eq!(result.avg_fasting_by_dose_range.len(), 2);
        let low = &result.avg_fasting_by_dose_range[0];
        assert_eq!(low.dose_range, "4-6");
        assert_eq!(low.count, 2);
        assert!((low.avg_fasting - 5.5).abs() < 1e-9);
        let high = &result.avg_fasting_by_dose_range[1];
        assert_eq!(high.dose_range, "6-8");
        assert_eq!(high.count, 2);
        assert!((high.avg_fasting - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_unparsable_dose_is_skipped() {
        let pairs = build_pairs(&[basal(1, "lots")], &[fasting(2, "5.0")]);
        assert!(pairs.is_empty());
    }

    #[test]
    fn test_idempotent() {
        let (doses, readings) = series(&["5.6", "6.0", "5.9"]);
        let t = Thresholds::default();
        assert_eq!(
            compute_insulin_correlation(&doses, &readings, &t),
            compute_insulin_correlation(&doses, &readings, &t)
        );
    }

    #[test]
    fn test_trend_text_matches_serialized_name() {
        for trend in [
            CorrelationTrend::InsufficientData,
            CorrelationTrend::IncreasingDoseNeeded,
            CorrelationTrend::DecreasingDosePossible,
            CorrelationTrend::Stable,
        ] {
            let json = serde_json::to_value(trend).unwrap();
            assert_eq!(json.as_str(), Some(trend.as_str()));
        }
    }
}
