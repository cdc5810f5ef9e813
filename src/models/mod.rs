//! Data models
//!
//! Rust structs representing the records handed to the analytics core.

mod decimal;
mod glucose_reading;
mod insulin_dose;

pub use decimal::{deserialize_decimal, parse_decimal};
pub use glucose_reading::{meal_label_rank, GlucoseReading, MealSlot, OTHER_MEAL_LABEL};
pub use insulin_dose::{InsulinDose, InsulinType};
