//! Core types for activity logs, goals, and settings.

use chrono::{DateTime, Duration, Months, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

// ============================================================================
// Identifiers
// ============================================================================

/// Identifier for a log entry (millisecond creation timestamp)
pub type EntryId = i64;

/// Identifier for a goal
pub type GoalId = i64;

/// Identifier for a trophy
pub type TrophyId = i64;

/// Derive an identifier from the creation instant, bumping past collisions.
///
/// Records created within the same millisecond receive consecutive ids, so
/// ids stay unique within one collection without any separate counter.
pub(crate) fn timestamp_id<F>(now: DateTime<Utc>, mut is_taken: F) -> i64
where
    F: FnMut(i64) -> bool,
{
    let mut id = now.timestamp_millis();
    while is_taken(id) {
        id += 1;
    }
    id
}

// ============================================================================
// Weight Units
// ============================================================================

/// Pounds per kilogram, the fixed factor used for every conversion
pub const LBS_PER_KG: f64 = 2.20462;

/// Unit a weight was recorded or displayed in
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum WeightUnit {
    Kg,
    Lbs,
}

impl WeightUnit {
    /// Short label as rendered next to weights ("kg" / "lbs")
    pub fn label(&self) -> &'static str {
        match self {
            WeightUnit::Kg => "kg",
            WeightUnit::Lbs => "lbs",
        }
    }
}

impl Default for WeightUnit {
    fn default() -> Self {
        WeightUnit::Lbs
    }
}

impl fmt::Display for WeightUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Convert a weight between units.
///
/// Same-unit conversion returns the value untouched, so converting back and
/// forth only loses ordinary floating-point precision.
pub fn convert_weight(value: f64, from: WeightUnit, to: WeightUnit) -> f64 {
    match (from, to) {
        (WeightUnit::Kg, WeightUnit::Lbs) => value * LBS_PER_KG,
        (WeightUnit::Lbs, WeightUnit::Kg) => value / LBS_PER_KG,
        _ => value,
    }
}

// ============================================================================
// Training Types
// ============================================================================

/// Training technique tag on a strength entry.
///
/// The named set mirrors the techniques the logging form offers. Anything
/// else round-trips through `Custom` so an unrecognized tag survives storage
/// instead of failing the whole log.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(from = "String", into = "String")]
pub enum TrainingType {
    Straight,
    Pyramid,
    ReversePyramid,
    DropSet,
    DoubleDrop,
    TripleDrop,
    Superset,
    Triset,
    GiantSet,
    Cluster,
    RestPause,
    MechanicalDrop,
    Tempo,
    Negative,
    PartialReps,
    Isometric,
    PreExhaust,
    PostExhaust,
    StripSet,
    WaveLoading,
    Density,
    Contrast,
    Accommodating,
    PauseReps,
    SpeedWork,
    /// Free-form tag carried through unchanged
    Custom(String),
}

impl TrainingType {
    /// Kebab-case tag as stored and displayed
    pub fn as_str(&self) -> &str {
        match self {
            TrainingType::Straight => "straight",
            TrainingType::Pyramid => "pyramid",
            TrainingType::ReversePyramid => "reverse-pyramid",
            TrainingType::DropSet => "drop-set",
            TrainingType::DoubleDrop => "double-drop",
            TrainingType::TripleDrop => "triple-drop",
            TrainingType::Superset => "superset",
            TrainingType::Triset => "triset",
            TrainingType::GiantSet => "giant-set",
            TrainingType::Cluster => "cluster",
            TrainingType::RestPause => "rest-pause",
            TrainingType::MechanicalDrop => "mechanical-drop",
            TrainingType::Tempo => "tempo",
            TrainingType::Negative => "negative",
            TrainingType::PartialReps => "partial-reps",
            TrainingType::Isometric => "isometric",
            TrainingType::PreExhaust => "pre-exhaust",
            TrainingType::PostExhaust => "post-exhaust",
            TrainingType::StripSet => "strip-set",
            TrainingType::WaveLoading => "wave-loading",
            TrainingType::Density => "density",
            TrainingType::Contrast => "contrast",
            TrainingType::Accommodating => "accommodating",
            TrainingType::PauseReps => "pause-reps",
            TrainingType::SpeedWork => "speed-work",
            TrainingType::Custom(tag) => tag,
        }
    }

    /// Whether this technique counts as advanced for progression and badges
    pub fn is_advanced(&self) -> bool {
        matches!(
            self,
            TrainingType::DropSet
                | TrainingType::DoubleDrop
                | TrainingType::TripleDrop
                | TrainingType::Superset
                | TrainingType::Triset
                | TrainingType::GiantSet
                | TrainingType::Cluster
                | TrainingType::RestPause
                | TrainingType::MechanicalDrop
                | TrainingType::Contrast
                | TrainingType::Accommodating
                | TrainingType::WaveLoading
        )
    }
}

impl Default for TrainingType {
    fn default() -> Self {
        TrainingType::Straight
    }
}

impl From<String> for TrainingType {
    fn from(s: String) -> Self {
        match s.as_str() {
            // Entries logged without a technique default to straight sets
            "" => TrainingType::Straight,
            "straight" => TrainingType::Straight,
            "pyramid" => TrainingType::Pyramid,
            "reverse-pyramid" => TrainingType::ReversePyramid,
            "drop-set" => TrainingType::DropSet,
            "double-drop" => TrainingType::DoubleDrop,
            "triple-drop" => TrainingType::TripleDrop,
            "superset" => TrainingType::Superset,
            "triset" => TrainingType::Triset,
            "giant-set" => TrainingType::GiantSet,
            "cluster" => TrainingType::Cluster,
            "rest-pause" => TrainingType::RestPause,
            "mechanical-drop" => TrainingType::MechanicalDrop,
            "tempo" => TrainingType::Tempo,
            "negative" => TrainingType::Negative,
            "partial-reps" => TrainingType::PartialReps,
            "isometric" => TrainingType::Isometric,
            "pre-exhaust" => TrainingType::PreExhaust,
            "post-exhaust" => TrainingType::PostExhaust,
            "strip-set" => TrainingType::StripSet,
            "wave-loading" => TrainingType::WaveLoading,
            "density" => TrainingType::Density,
            "contrast" => TrainingType::Contrast,
            "accommodating" => TrainingType::Accommodating,
            "pause-reps" => TrainingType::PauseReps,
            "speed-work" => TrainingType::SpeedWork,
            _ => TrainingType::Custom(s),
        }
    }
}

impl From<&str> for TrainingType {
    fn from(s: &str) -> Self {
        TrainingType::from(s.to_string())
    }
}

impl From<TrainingType> for String {
    fn from(t: TrainingType) -> Self {
        t.as_str().to_string()
    }
}

impl fmt::Display for TrainingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Recurrence Periods
// ============================================================================

/// Recurrence period of a goal, defining the rolling window its progress is
/// measured over
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum RecurrencePeriod {
    Weekly,
    Monthly,
    Yearly,
}

impl RecurrencePeriod {
    /// All periods, in bucket order
    pub const ALL: [RecurrencePeriod; 3] = [
        RecurrencePeriod::Weekly,
        RecurrencePeriod::Monthly,
        RecurrencePeriod::Yearly,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RecurrencePeriod::Weekly => "weekly",
            RecurrencePeriod::Monthly => "monthly",
            RecurrencePeriod::Yearly => "yearly",
        }
    }

    /// Start of the rolling window that ends at `now`.
    ///
    /// Weekly is a fixed seven days. Monthly and yearly are calendar-relative
    /// and clamp at the end of a shorter month, so the window from Mar 31
    /// reaches back to Feb 28 (or 29), not into March.
    pub fn window_start(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            RecurrencePeriod::Weekly => now - Duration::days(7),
            RecurrencePeriod::Monthly => now
                .checked_sub_months(Months::new(1))
                .unwrap_or_else(|| now - Duration::days(30)),
            RecurrencePeriod::Yearly => now
                .checked_sub_months(Months::new(12))
                .unwrap_or_else(|| now - Duration::days(365)),
        }
    }
}

impl FromStr for RecurrencePeriod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "weekly" => Ok(RecurrencePeriod::Weekly),
            "monthly" => Ok(RecurrencePeriod::Monthly),
            "yearly" => Ok(RecurrencePeriod::Yearly),
            _ => Err(Error::InvalidPeriod(s.to_string())),
        }
    }
}

impl fmt::Display for RecurrencePeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Log Entries
// ============================================================================

/// One set within a strength entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExerciseSet {
    #[serde(default)]
    pub weight: f64,
    /// Unit `weight` was recorded in; aggregation converts on read
    #[serde(default)]
    pub unit: WeightUnit,
    #[serde(default)]
    pub planned_reps: u32,
    #[serde(default)]
    pub actual_reps: u32,
}

/// A logged strength-training entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StrengthEntry {
    pub id: EntryId,
    pub exercise: String,
    #[serde(default)]
    pub training_type: TrainingType,
    #[serde(default)]
    pub sets: Vec<ExerciseSet>,
    #[serde(default)]
    pub notes: String,
    pub date: DateTime<Utc>,
}

impl StrengthEntry {
    /// Load of this entry: Σ weight × actual reps, in the units as stored
    pub fn load(&self) -> f64 {
        self.sets
            .iter()
            .map(|set| set.weight * f64::from(set.actual_reps))
            .sum()
    }
}

/// A logged cardio session
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CardioEntry {
    pub id: EntryId,
    pub activity: String,
    #[serde(default)]
    pub duration_minutes: f64,
    /// Average heart rate in bpm, when the user recorded one
    #[serde(default)]
    pub heart_rate: Option<f64>,
    #[serde(default)]
    pub notes: String,
    pub date: DateTime<Utc>,
}

// ============================================================================
// Settings
// ============================================================================

/// User settings read by the aggregation layer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    #[serde(default = "default_settings_version")]
    pub schema_version: u32,
    /// Display unit for dashboards and the unit new weightlifting goals
    /// are created in
    #[serde(default)]
    pub units: WeightUnit,
    #[serde(default)]
    pub dark_mode: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            schema_version: crate::store::SCHEMA_VERSION,
            units: WeightUnit::Lbs,
            dark_mode: false,
        }
    }
}

fn default_settings_version() -> u32 {
    crate::store::SCHEMA_VERSION
}
