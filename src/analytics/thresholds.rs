//! Glucose target thresholds
//!
//! Fixed reference values (mmol/L). Aggregators take a `Thresholds` value
//! instead of reading the constants directly so that every component shares
//! one definition of "over target".

use serde::{Deserialize, Serialize};

use crate::models::GlucoseReading;

/// Fasting target upper bound (mmol/L)
pub const FASTING_LIMIT: f64 = 5.3;

/// Post-meal target upper bound (mmol/L)
pub const POST_MEAL_LIMIT: f64 = 6.7;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Thresholds {
    pub fasting: f64,
    pub post_meal: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            fasting: FASTING_LIMIT,
            post_meal: POST_MEAL_LIMIT,
        }
    }
}

impl Thresholds {
    /// The limit a reading is scored against. Fasting wins when both flags
    /// are set; untyped readings have no limit.
    pub fn applicable_limit(&self, reading: &GlucoseReading) -> Option<f64> {
        if reading.is_fasting {
            Some(self.fasting)
        } else if reading.is_post_meal {
            Some(self.post_meal)
        } else {
            None
        }
    }

    /// Within target for compliance purposes. Untyped readings count as compliant.
    pub fn is_compliant(&self, reading: &GlucoseReading, value: f64) -> bool {
        self.applicable_limit(reading).map_or(true, |limit| value <= limit)
    }

    pub fn is_over_target(&self, reading: &GlucoseReading, value: f64) -> bool {
        self.applicable_limit(reading).is_some_and(|limit| value > limit)
    }
}
