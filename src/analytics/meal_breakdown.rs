//! Post-meal breakdown by meal type

use serde::{Deserialize, Serialize};

use crate::models::{meal_label_rank, GlucoseReading, MealSlot};
use super::thresholds::Thresholds;

/// Groups smaller than this are treated as noise and dropped
pub const MIN_MEAL_GROUP_SIZE: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MealStat {
    /// Label as entered (first spelling seen)
    pub meal_type: String,
    /// Canonical slot, if the label is a known synonym
    pub slot: Option<MealSlot>,
    pub count: usize,
    pub average: Option<f64>,
    pub over_target_count: usize,
}

struct MealGroup<'a> {
    label: &'a str,
    values: Vec<f64>,
}

/// Summarize post-meal readings per meal label.
///
/// Labels group by exact (trimmed) text; blank labels fold into "Other".
/// Only readings with a parsable value count towards a group, so the noise
/// gate applies to usable values.
pub fn compute_meal_breakdown(readings: &[GlucoseReading], thresholds: &Thresholds) -> Vec<MealStat> {
    let mut groups: Vec<MealGroup> = Vec::new();

    for reading in readings.iter().filter(|r| r.is_post_meal) {
        let Some(value) = reading.value() else {
            continue;
        };
        let label = reading.meal_label();
        match groups.iter_mut().find(|g| g.label == label) {
            Some(group) => group.values.push(value),
            None => groups.push(MealGroup {
                label,
                values: vec![value],
            }),
        }
    }

    let mut stats: Vec<MealStat> = groups
        .into_iter()
        .filter(|g| g.values.len() >= MIN_MEAL_GROUP_SIZE)
        .map(|g| {
            let count = g.values.len();
            let sum: f64 = g.values.iter().sum();
            MealStat {
                meal_type: g.label.to_string(),
                slot: MealSlot::from_label(g.label),
                count,
                average: Some(sum / count as f64),
                over_target_count: g.values.iter().filter(|v| **v > thresholds.post_meal).count(),
            }
        })
        .collect();

    // stable: equal ranks keep first-seen order
    stats.sort_by_key(|s| meal_label_rank(&s.meal_type));
    stats
}
