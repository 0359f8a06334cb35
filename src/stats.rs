//! Window aggregation over activity logs.
//!
//! Pure functions that compute summary statistics for a date range from the
//! raw strength and cardio logs. Nothing here mutates or persists anything;
//! the goal tracker and the dashboard both read through these.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::types::{convert_weight, CardioEntry, StrengthEntry, WeightUnit};

/// Per-exercise breakdown within a window
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExerciseBreakdown {
    pub total_sets: usize,
    pub planned_reps: u64,
    pub actual_reps: u64,
    pub total_weight: f64,
    /// Number of entries logged for this exercise in the window
    pub count: usize,
}

/// Aggregate strength statistics for a window
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WeightliftingStats {
    pub total_sets: usize,
    pub planned_reps: u64,
    pub actual_reps: u64,
    /// Σ weight × actual reps over every set, in the requested display unit
    pub total_weight: f64,
    /// Number of entries in the window (each logged entry is one exercise
    /// performed)
    pub exercise_count: usize,
    pub per_exercise: BTreeMap<String, ExerciseBreakdown>,
}

/// Per-activity breakdown within a window
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ActivityBreakdown {
    pub sessions: usize,
    pub minutes: f64,
}

/// Aggregate cardio statistics for a window
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CardioStats {
    /// Plain sum of session durations, in minutes
    pub total_duration: f64,
    pub total_sessions: usize,
    pub by_type: BTreeMap<String, ActivityBreakdown>,
    /// Mean heart rate over sessions that recorded one; 0 when none did
    pub avg_heart_rate: f64,
}

/// Total weight lifted by one entry, normalized to `unit`
fn entry_weight(entry: &StrengthEntry, unit: WeightUnit) -> f64 {
    entry
        .sets
        .iter()
        .map(|set| convert_weight(set.weight, set.unit, unit) * f64::from(set.actual_reps))
        .sum()
}

/// Compute strength statistics for entries dated within `[start, end]`.
///
/// Both window ends are inclusive. Weights recorded in the other unit are
/// converted to `unit` before summing. An empty window yields the zeroed
/// default, never an error.
pub fn weightlifting_stats(
    entries: &[StrengthEntry],
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    unit: WeightUnit,
) -> WeightliftingStats {
    let mut stats = WeightliftingStats::default();

    for entry in entries {
        if entry.date < start || entry.date > end {
            continue;
        }

        let sets = entry.sets.len();
        let planned: u64 = entry.sets.iter().map(|s| u64::from(s.planned_reps)).sum();
        let actual: u64 = entry.sets.iter().map(|s| u64::from(s.actual_reps)).sum();
        let weight = entry_weight(entry, unit);

        stats.total_sets += sets;
        stats.planned_reps += planned;
        stats.actual_reps += actual;
        stats.total_weight += weight;
        stats.exercise_count += 1;

        let group = stats.per_exercise.entry(entry.exercise.clone()).or_default();
        group.total_sets += sets;
        group.planned_reps += planned;
        group.actual_reps += actual;
        group.total_weight += weight;
        group.count += 1;
    }

    stats
}

/// Compute cardio statistics for entries dated within `[start, end]`.
///
/// Both window ends are inclusive. `avg_heart_rate` averages only sessions
/// carrying a heart rate and is 0 when none in the window do.
pub fn cardio_stats(entries: &[CardioEntry], start: DateTime<Utc>, end: DateTime<Utc>) -> CardioStats {
    let mut stats = CardioStats::default();
    let mut hr_sum = 0.0;
    let mut hr_count = 0usize;

    for entry in entries {
        if entry.date < start || entry.date > end {
            continue;
        }

        stats.total_duration += entry.duration_minutes;
        stats.total_sessions += 1;

        let group = stats.by_type.entry(entry.activity.clone()).or_default();
        group.sessions += 1;
        group.minutes += entry.duration_minutes;

        if let Some(hr) = entry.heart_rate {
            hr_sum += hr;
            hr_count += 1;
        }
    }

    if hr_count > 0 {
        stats.avg_heart_rate = hr_sum / hr_count as f64;
    }

    stats
}
