//! Insulin correlation tool

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::analytics::day_key::{self, DayKeyRange};
use crate::analytics::{compute_insulin_correlation, CorrelationResult, Thresholds};
use crate::data::RecordSet;
use super::window_days;

/// Default look-back for dose pairing, in days
pub const DEFAULT_CORRELATION_DAYS: u32 = 30;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsulinCorrelationResponse {
    /// Dose window; fasting readings are taken up to one day past its end
    pub range: DayKeyRange,
    pub evening_dose_count: usize,
    #[serde(flatten)]
    pub result: CorrelationResult,
}

/// Correlate evening long-acting doses from the last `days` days with the
/// next morning's fasting glucose
pub fn insulin_correlation(
    records: &RecordSet,
    now: DateTime<Utc>,
    days: Option<u32>,
) -> Result<InsulinCorrelationResponse, String> {
    let range = DayKeyRange::ending_at(now, window_days(days, DEFAULT_CORRELATION_DAYS)?);
    let doses = records.doses_in(&range);

    let reading_end = day_key::next_day_key(&range.end)
        .ok_or_else(|| format!("Day key {} out of range", range.end))?;
    let readings = records.readings_in(&DayKeyRange::new(range.start.clone(), reading_end));

    let result = compute_insulin_correlation(&doses, &readings, &Thresholds::default());

    Ok(InsulinCorrelationResponse {
        evening_dose_count: result.pairs.len(),
        range,
        result,
    })
}
