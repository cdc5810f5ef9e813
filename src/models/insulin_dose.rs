//! Insulin dose model
//!
//! Represents an administered insulin dose (long- or rapid-acting).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::analytics::day_key;
use super::decimal::{deserialize_decimal, parse_decimal};

/// Insulin type enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsulinType {
    LongActing,
    RapidActing,
}

impl InsulinType {
    pub fn display_name(&self) -> &'static str {
        match self {
            InsulinType::LongActing => "Long-acting",
            InsulinType::RapidActing => "Rapid-acting",
        }
    }
}

/// An administered insulin dose
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsulinDose {
    pub id: String,
    #[serde(alias = "administered_at")]
    pub administered_at: DateTime<Utc>,
    #[serde(default, alias = "day_key")]
    pub day_key: String,
    #[serde(alias = "dose_units", deserialize_with = "deserialize_decimal")]
    pub dose_units: String,
    #[serde(alias = "insulin_type")]
    pub insulin_type: InsulinType,
    #[serde(default, alias = "insulin_name")]
    pub insulin_name: Option<String>,
    #[serde(default, alias = "meal_context")]
    pub meal_context: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl InsulinDose {
    pub fn new(
        id: impl Into<String>,
        administered_at: DateTime<Utc>,
        dose_units: impl Into<String>,
        insulin_type: InsulinType,
    ) -> Self {
        Self {
            id: id.into(),
            administered_at,
            day_key: day_key::day_key(administered_at),
            dose_units: dose_units.into(),
            insulin_type,
            insulin_name: None,
            meal_context: None,
            notes: None,
        }
    }

    /// Fill in the day key if the record arrived without one
    pub fn ensure_day_key(&mut self) {
        if self.day_key.is_empty() {
            self.day_key = day_key::day_key(self.administered_at);
        }
    }

    /// Parsed dose in units, or `None` if the stored string is not a number
    pub fn units(&self) -> Option<f64> {
        parse_decimal(&self.dose_units)
    }

    pub fn format_value(&self) -> String {
        match self.units() {
            Some(u) => format!("{} U {}", u, self.insulin_type.display_name()),
            None => format!("{} (unparsable)", self.dose_units),
        }
    }
}
