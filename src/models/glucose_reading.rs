//! Glucose reading model
//!
//! A single blood glucose measurement in mmol/L, flagged as fasting and/or
//! post-meal, optionally labelled with the meal it followed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::analytics::day_key;
use super::decimal::{deserialize_decimal, parse_decimal};

/// Label used for post-meal readings without a meal type
pub const OTHER_MEAL_LABEL: &str = "Other";

/// Canonical meal slots, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MealSlot {
    Breakfast,
    Lunch,
    Dinner,
    EveningSnack,
    Other,
}

impl MealSlot {
    pub const ALL: [MealSlot; 5] = [
        MealSlot::Breakfast,
        MealSlot::Lunch,
        MealSlot::Dinner,
        MealSlot::EveningSnack,
        MealSlot::Other,
    ];

    /// Match a free-text meal label against known synonyms (case-insensitive).
    /// Labels are entered in English or Norwegian.
    pub fn from_label(label: &str) -> Option<Self> {
        let normalized = label.trim().to_lowercase().replace([' ', '-'], "_");
        match normalized.as_str() {
            "breakfast" | "frokost" => Some(MealSlot::Breakfast),
            "lunch" | "lunsj" => Some(MealSlot::Lunch),
            "dinner" | "middag" => Some(MealSlot::Dinner),
            "evening_snack" | "evening_meal" | "kveldsmat" | "kvelds" | "snack"
            | "mellommåltid" => Some(MealSlot::EveningSnack),
            "other" | "annet" => Some(MealSlot::Other),
            _ => None,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            MealSlot::Breakfast => "Breakfast",
            MealSlot::Lunch => "Lunch",
            MealSlot::Dinner => "Dinner",
            MealSlot::EveningSnack => "Evening snack",
            MealSlot::Other => "Other",
        }
    }

    /// Sort order for display (breakfast first)
    pub fn sort_order(&self) -> i32 {
        match self {
            MealSlot::Breakfast => 0,
            MealSlot::Lunch => 1,
            MealSlot::Dinner => 2,
            MealSlot::EveningSnack => 3,
            MealSlot::Other => 4,
        }
    }
}

/// Sort rank for an arbitrary meal label; unrecognized labels sort last
pub fn meal_label_rank(label: &str) -> i32 {
    MealSlot::from_label(label)
        .map(|slot| slot.sort_order())
        .unwrap_or(99)
}

/// A glucose measurement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlucoseReading {
    pub id: String,
    #[serde(alias = "measured_at")]
    pub measured_at: DateTime<Utc>,
    /// Europe/Oslo civil date; derived from `measured_at` when absent
    #[serde(default, alias = "day_key")]
    pub day_key: String,
    #[serde(alias = "value_mmol_l", deserialize_with = "deserialize_decimal")]
    pub value_mmol_l: String,
    #[serde(default, alias = "is_fasting")]
    pub is_fasting: bool,
    #[serde(default, alias = "is_post_meal")]
    pub is_post_meal: bool,
    #[serde(default, alias = "meal_type")]
    pub meal_type: Option<String>,
    #[serde(default, alias = "part_of_day")]
    pub part_of_day: Option<String>,
    #[serde(default, alias = "food_text")]
    pub food_text: Option<String>,
    #[serde(default, alias = "feeling_notes")]
    pub feeling_notes: Option<String>,
}

impl GlucoseReading {
    /// Create an untyped reading; the day key is resolved from `measured_at`
    pub fn new(id: impl Into<String>, measured_at: DateTime<Utc>, value_mmol_l: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            measured_at,
            day_key: day_key::day_key(measured_at),
            value_mmol_l: value_mmol_l.into(),
            is_fasting: false,
            is_post_meal: false,
            meal_type: None,
            part_of_day: None,
            food_text: None,
            feeling_notes: None,
        }
    }

    pub fn fasting(mut self) -> Self {
        self.is_fasting = true;
        self
    }

    pub fn post_meal(mut self, meal_type: Option<&str>) -> Self {
        self.is_post_meal = true;
        self.meal_type = meal_type.map(String::from);
        self
    }

    /// Fill in the day key if the record arrived without one
    pub fn ensure_day_key(&mut self) {
        if self.day_key.is_empty() {
            self.day_key = day_key::day_key(self.measured_at);
        }
    }

    /// Parsed value in mmol/L, or `None` if the stored string is not a number
    pub fn value(&self) -> Option<f64> {
        parse_decimal(&self.value_mmol_l)
    }

    /// Neither fasting nor post-meal was flagged
    pub fn is_untyped(&self) -> bool {
        !self.is_fasting && !self.is_post_meal
    }

    /// Both flags set; tolerated but reported as a data-quality issue
    pub fn has_conflicting_type(&self) -> bool {
        self.is_fasting && self.is_post_meal
    }

    /// Meal label used for grouping, with blanks folded into "Other"
    pub fn meal_label(&self) -> &str {
        match self.meal_type.as_deref().map(str::trim) {
            Some(label) if !label.is_empty() => label,
            _ => OTHER_MEAL_LABEL,
        }
    }

    /// Format the reading for display
    pub fn format_value(&self) -> String {
        match self.value() {
            Some(v) => format!("{:.1} mmol/L", v),
            None => format!("{} (unparsable)", self.value_mmol_l),
        }
    }
}
