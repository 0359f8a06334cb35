//! Activity logs for strength and cardio entries.
//!
//! Entries are validated on the way in (drafts) and decoded leniently on the
//! way out of storage: a mangled record is skipped with a warning so one bad
//! row never blocks the rest of the dashboard.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Error, Result};
use crate::types::{timestamp_id, CardioEntry, EntryId, ExerciseSet, StrengthEntry, TrainingType};

/// Longest cardio session accepted, in minutes (24 hours)
const DURATION_MAX_MINUTES: f64 = 1440.0;
const HEART_RATE_MIN: f64 = 20.0;
const HEART_RATE_MAX: f64 = 300.0;

/// Decode each entry individually, skipping records that fail to parse
fn lenient_entries<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let raw: Vec<serde_json::Value> = Vec::deserialize(deserializer)?;
    let mut entries = Vec::with_capacity(raw.len());
    for (index, value) in raw.into_iter().enumerate() {
        match serde_json::from_value::<T>(value) {
            Ok(entry) => entries.push(entry),
            Err(e) => {
                tracing::warn!("Skipping malformed entry at index {}: {}", index, e);
                // Continue decoding, don't fail the whole log
            }
        }
    }
    Ok(entries)
}

fn default_version() -> u32 {
    crate::store::SCHEMA_VERSION
}

// ============================================================================
// Strength Log
// ============================================================================

/// User input for a new strength entry, validated before insertion
#[derive(Debug, Clone)]
pub struct StrengthDraft {
    pub exercise: String,
    pub training_type: TrainingType,
    pub sets: Vec<ExerciseSet>,
    pub notes: String,
    /// Entry timestamp; defaults to the logging instant
    pub date: Option<DateTime<Utc>>,
}

/// Insertion-ordered log of strength entries
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StrengthLog {
    #[serde(default = "default_version")]
    pub schema_version: u32,
    #[serde(default, deserialize_with = "lenient_entries")]
    pub entries: Vec<StrengthEntry>,
}

impl Default for StrengthLog {
    fn default() -> Self {
        StrengthLog {
            schema_version: crate::store::SCHEMA_VERSION,
            entries: Vec::new(),
        }
    }
}

impl StrengthLog {
    /// Validate a draft and append it as a new entry
    pub fn add(&mut self, draft: StrengthDraft, now: DateTime<Utc>) -> Result<EntryId> {
        if draft.exercise.trim().is_empty() {
            return Err(Error::InvalidEntry("exercise name is empty".into()));
        }
        if draft.sets.is_empty() {
            return Err(Error::InvalidEntry("entry has no sets".into()));
        }
        for (index, set) in draft.sets.iter().enumerate() {
            if !set.weight.is_finite() || set.weight < 0.0 {
                return Err(Error::InvalidEntry(format!(
                    "set {} has invalid weight {}",
                    index + 1,
                    set.weight
                )));
            }
            if set.planned_reps == 0 {
                return Err(Error::InvalidEntry(format!(
                    "set {} has zero planned reps",
                    index + 1
                )));
            }
        }

        let id = timestamp_id(now, |candidate| {
            self.entries.iter().any(|e| e.id == candidate)
        });
        let entry = StrengthEntry {
            id,
            exercise: draft.exercise.trim().to_string(),
            training_type: draft.training_type,
            sets: draft.sets,
            notes: draft.notes,
            date: draft.date.unwrap_or(now),
        };

        tracing::debug!("Logged strength entry {} ({})", id, entry.exercise);
        self.entries.push(entry);
        Ok(id)
    }

    /// Remove an entry by id; false when absent
    pub fn delete(&mut self, id: EntryId) -> bool {
        match self.entries.iter().position(|e| e.id == id) {
            Some(index) => {
                self.entries.remove(index);
                tracing::debug!("Deleted strength entry {}", id);
                true
            }
            None => false,
        }
    }
}

// ============================================================================
// Cardio Log
// ============================================================================

/// Unit the duration of a cardio draft was entered in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationUnit {
    Minutes,
    Hours,
}

/// User input for a new cardio session
#[derive(Debug, Clone)]
pub struct CardioDraft {
    pub activity: String,
    pub duration: f64,
    pub duration_unit: DurationUnit,
    pub heart_rate: Option<f64>,
    pub notes: String,
    pub date: Option<DateTime<Utc>>,
}

/// Insertion-ordered log of cardio sessions
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CardioLog {
    #[serde(default = "default_version")]
    pub schema_version: u32,
    #[serde(default, deserialize_with = "lenient_entries")]
    pub entries: Vec<CardioEntry>,
}

impl Default for CardioLog {
    fn default() -> Self {
        CardioLog {
            schema_version: crate::store::SCHEMA_VERSION,
            entries: Vec::new(),
        }
    }
}

impl CardioLog {
    /// Validate a draft and append it as a new session.
    ///
    /// Durations entered in hours are converted to minutes; the stored
    /// value is always minutes.
    pub fn add(&mut self, draft: CardioDraft, now: DateTime<Utc>) -> Result<EntryId> {
        if draft.activity.trim().is_empty() {
            return Err(Error::InvalidEntry("activity name is empty".into()));
        }

        let minutes = match draft.duration_unit {
            DurationUnit::Minutes => draft.duration,
            DurationUnit::Hours => draft.duration * 60.0,
        };
        if !minutes.is_finite() || minutes < 1.0 || minutes > DURATION_MAX_MINUTES {
            return Err(Error::InvalidEntry(format!(
                "duration must be between 1 and {} minutes, got {}",
                DURATION_MAX_MINUTES, minutes
            )));
        }

        if let Some(hr) = draft.heart_rate {
            if !hr.is_finite() || !(HEART_RATE_MIN..=HEART_RATE_MAX).contains(&hr) {
                return Err(Error::InvalidEntry(format!(
                    "heart rate must be between {} and {} bpm, got {}",
                    HEART_RATE_MIN, HEART_RATE_MAX, hr
                )));
            }
        }

        let id = timestamp_id(now, |candidate| {
            self.entries.iter().any(|e| e.id == candidate)
        });
        let entry = CardioEntry {
            id,
            activity: draft.activity.trim().to_string(),
            duration_minutes: minutes,
            heart_rate: draft.heart_rate,
            notes: draft.notes,
            date: draft.date.unwrap_or(now),
        };

        tracing::debug!("Logged cardio entry {} ({})", id, entry.activity);
        self.entries.push(entry);
        Ok(id)
    }

    /// Remove a session by id; false when absent
    pub fn delete(&mut self, id: EntryId) -> bool {
        match self.entries.iter().position(|e| e.id == id) {
            Some(index) => {
                self.entries.remove(index);
                tracing::debug!("Deleted cardio entry {}", id);
                true
            }
            None => false,
        }
    }
}
