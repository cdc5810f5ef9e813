//! Export file loading
//!
//! Parses a backup export (`schema_version` 1 or 2), validates each record,
//! derives missing day keys and sorts records by instant.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::analytics::day_key::{self, DayKeyRange};
use crate::models::{GlucoseReading, InsulinDose};
use super::{DataError, DataResult};

pub const SUPPORTED_SCHEMA_VERSIONS: [u32; 2] = [1, 2];

#[derive(Debug, Deserialize)]
struct RawExport {
    #[serde(alias = "schemaVersion")]
    schema_version: u32,
    #[serde(default, alias = "exportedAt")]
    exported_at: Option<DateTime<Utc>>,
    readings: Vec<Value>,
    /// Absent in exports from before insulin logging
    #[serde(default, alias = "insulinDoses")]
    insulin_doses: Vec<Value>,
}

/// All records from one export, sorted ascending by instant
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordSet {
    pub schema_version: u32,
    pub exported_at: Option<DateTime<Utc>>,
    pub readings: Vec<GlucoseReading>,
    pub insulin_doses: Vec<InsulinDose>,
}

/// Label for a record in error messages: its id if present, else its position
fn record_label(index: usize, raw: &Value) -> String {
    match raw.get("id").and_then(Value::as_str) {
        Some(id) => format!("#{} (id {})", index, id),
        None => format!("#{}", index),
    }
}

fn parse_reading(index: usize, raw: Value) -> DataResult<GlucoseReading> {
    let label = record_label(index, &raw);
    let mut reading: GlucoseReading = serde_json::from_value(raw)
        .map_err(|e| DataError::InvalidReading(format!("{}: {}", label, e)))?;

    if reading.id.trim().is_empty() {
        return Err(DataError::InvalidReading(format!("{}: empty id", label)));
    }
    if !reading.day_key.is_empty() && !day_key::is_valid_day_key(&reading.day_key) {
        return Err(DataError::InvalidReading(format!(
            "{}: malformed dayKey '{}'",
            label, reading.day_key
        )));
    }
    if reading.value().is_none() {
        tracing::warn!(id = %reading.id, raw = %reading.value_mmol_l, "reading has an unparsable value");
    }

    reading.ensure_day_key();
    Ok(reading)
}

fn parse_dose(index: usize, raw: Value) -> DataResult<InsulinDose> {
    let label = record_label(index, &raw);
    let mut dose: InsulinDose = serde_json::from_value(raw)
        .map_err(|e| DataError::InvalidDose(format!("{}: {}", label, e)))?;

    if dose.id.trim().is_empty() {
        return Err(DataError::InvalidDose(format!("{}: empty id", label)));
    }
    if !dose.day_key.is_empty() && !day_key::is_valid_day_key(&dose.day_key) {
        return Err(DataError::InvalidDose(format!(
            "{}: malformed dayKey '{}'",
            label, dose.day_key
        )));
    }
    if dose.units().is_none() {
        tracing::warn!(id = %dose.id, raw = %dose.dose_units, "insulin dose has unparsable units");
    }

    dose.ensure_day_key();
    Ok(dose)
}

impl RecordSet {
    /// Build a record set from already-parsed records
    pub fn new(mut readings: Vec<GlucoseReading>, mut insulin_doses: Vec<InsulinDose>) -> Self {
        readings.iter_mut().for_each(GlucoseReading::ensure_day_key);
        insulin_doses.iter_mut().for_each(InsulinDose::ensure_day_key);
        readings.sort_by_key(|r| r.measured_at);
        insulin_doses.sort_by_key(|d| d.administered_at);
        Self {
            schema_version: SUPPORTED_SCHEMA_VERSIONS[SUPPORTED_SCHEMA_VERSIONS.len() - 1],
            exported_at: None,
            readings,
            insulin_doses,
        }
    }

    /// Parse an export document
    pub fn from_json_str(json: &str) -> DataResult<Self> {
        let raw: RawExport = serde_json::from_str(json)?;

        if !SUPPORTED_SCHEMA_VERSIONS.contains(&raw.schema_version) {
            return Err(DataError::UnsupportedSchemaVersion(raw.schema_version));
        }

        let readings = raw
            .readings
            .into_iter()
            .enumerate()
            .map(|(i, v)| parse_reading(i, v))
            .collect::<DataResult<Vec<_>>>()?;

        let insulin_doses = raw
            .insulin_doses
            .into_iter()
            .enumerate()
            .map(|(i, v)| parse_dose(i, v))
            .collect::<DataResult<Vec<_>>>()?;

        let mut set = Self::new(readings, insulin_doses);
        set.schema_version = raw.schema_version;
        set.exported_at = raw.exported_at;

        tracing::debug!(
            schema_version = set.schema_version,
            readings = set.readings.len(),
            insulin_doses = set.insulin_doses.len(),
            "parsed export"
        );
        Ok(set)
    }

    /// Load an export file from disk
    pub fn load<P: AsRef<Path>>(path: P) -> DataResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(DataError::MissingDataFile(path.to_path_buf()));
        }
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Readings whose day key falls inside `range`
    pub fn readings_in(&self, range: &DayKeyRange) -> Vec<GlucoseReading> {
        range.select_cloned(&self.readings)
    }

    /// Doses whose day key falls inside `range`
    pub fn doses_in(&self, range: &DayKeyRange) -> Vec<InsulinDose> {
        range.select_cloned(&self.insulin_doses)
    }

    /// First and last day key with any record, if there are records
    pub fn span(&self) -> Option<DayKeyRange> {
        let keys = self
            .readings
            .iter()
            .map(|r| r.day_key.as_str())
            .chain(self.insulin_doses.iter().map(|d| d.day_key.as_str()));
        let (first, last) = keys.fold((None::<&str>, None::<&str>), |(lo, hi), k| {
            (
                Some(lo.map_or(k, |l| l.min(k))),
                Some(hi.map_or(k, |h| h.max(k))),
            )
        });
        match (first, last) {
            (Some(first), Some(last)) => Some(DayKeyRange::new(first, last)),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty() && self.insulin_doses.is_empty()
    }
}
