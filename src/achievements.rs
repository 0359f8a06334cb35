//! Achievement badges evaluated over the full activity history.
//!
//! Unlike goals, badges are not windowed and never reset: each key flips
//! from locked to unlocked at most once, permanently. The registry carries
//! every badge definition in evaluation order.

use chrono::{DateTime, Datelike, Utc};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;

use crate::types::{CardioEntry, StrengthEntry, TrainingType};

/// Closed set of badge keys
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum AchievementKey {
    FirstWorkout,
    WeekStreak,
    MonthStreak,
    #[serde(rename = "training-types-5")]
    TrainingTypes5,
    #[serde(rename = "training-types-10")]
    TrainingTypes10,
    HeavyLifter,
    EnduranceWarrior,
    TechniqueMaster,
    ConsistencyKing,
    ProgressTracker,
}

impl AchievementKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            AchievementKey::FirstWorkout => "first-workout",
            AchievementKey::WeekStreak => "week-streak",
            AchievementKey::MonthStreak => "month-streak",
            AchievementKey::TrainingTypes5 => "training-types-5",
            AchievementKey::TrainingTypes10 => "training-types-10",
            AchievementKey::HeavyLifter => "heavy-lifter",
            AchievementKey::EnduranceWarrior => "endurance-warrior",
            AchievementKey::TechniqueMaster => "technique-master",
            AchievementKey::ConsistencyKing => "consistency-king",
            AchievementKey::ProgressTracker => "progress-tracker",
        }
    }
}

impl fmt::Display for AchievementKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unlock state of one badge
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AchievementState {
    pub unlocked: bool,
    pub date: Option<DateTime<Utc>>,
}

/// Full activity history a badge predicate sees
pub struct HistoryView<'a> {
    pub strength: &'a [StrengthEntry],
    pub cardio: &'a [CardioEntry],
    pub now: DateTime<Utc>,
}

/// One badge definition: key, display copy, and unlock predicate
pub struct AchievementDef {
    pub key: AchievementKey,
    pub title: &'static str,
    pub blurb: &'static str,
    pub predicate: fn(&HistoryView<'_>) -> bool,
}

/// Distinct training types over the strength history, missing defaulting
/// to straight sets
fn distinct_training_types(strength: &[StrengthEntry]) -> usize {
    strength
        .iter()
        .map(|e| e.training_type.clone())
        .collect::<HashSet<TrainingType>>()
        .len()
}

fn entries_within_days(strength: &[StrengthEntry], now: DateTime<Utc>, days: i64) -> usize {
    let cutoff = now - chrono::Duration::days(days);
    strength.iter().filter(|e| e.date >= cutoff).count()
}

/// Longest run of consecutive calendar days each holding at least one
/// workout, strength or cardio
fn longest_daily_streak(view: &HistoryView<'_>) -> usize {
    let days: BTreeSet<i32> = view
        .strength
        .iter()
        .map(|e| e.date.date_naive())
        .chain(view.cardio.iter().map(|e| e.date.date_naive()))
        .map(|d| d.num_days_from_ce())
        .collect();

    let mut longest = 0usize;
    let mut run = 0usize;
    let mut prev: Option<i32> = None;

    for day in days {
        run = match prev {
            Some(p) if day == p + 1 => run + 1,
            _ => 1,
        };
        longest = longest.max(run);
        prev = Some(day);
    }

    longest
}

/// Days between the earliest and latest logged entry across both logs
fn history_span_days(view: &HistoryView<'_>) -> i64 {
    let dates = view
        .strength
        .iter()
        .map(|e| e.date)
        .chain(view.cardio.iter().map(|e| e.date));

    match (dates.clone().min(), dates.max()) {
        (Some(first), Some(last)) => (last - first).num_days(),
        _ => 0,
    }
}

/// All badge definitions, in evaluation order
pub static REGISTRY: Lazy<Vec<AchievementDef>> = Lazy::new(|| {
    vec![
        AchievementDef {
            key: AchievementKey::FirstWorkout,
            title: "First Workout Complete",
            blurb: "Logged your first exercise",
            predicate: |v| !v.strength.is_empty(),
        },
        AchievementDef {
            key: AchievementKey::WeekStreak,
            title: "Week Warrior",
            blurb: "Three workouts within seven days",
            predicate: |v| entries_within_days(v.strength, v.now, 7) >= 3,
        },
        AchievementDef {
            key: AchievementKey::MonthStreak,
            title: "Monthly Devotion",
            blurb: "Twelve workouts within thirty days",
            predicate: |v| entries_within_days(v.strength, v.now, 30) >= 12,
        },
        AchievementDef {
            key: AchievementKey::TrainingTypes5,
            title: "Technique Explorer",
            blurb: "Used five different training types",
            predicate: |v| distinct_training_types(v.strength) >= 5,
        },
        AchievementDef {
            key: AchievementKey::TrainingTypes10,
            title: "Training Master",
            blurb: "Used ten different training types",
            predicate: |v| distinct_training_types(v.strength) >= 10,
        },
        AchievementDef {
            key: AchievementKey::HeavyLifter,
            title: "Heavy Lifter",
            blurb: "Fifty strength workouts logged",
            predicate: |v| v.strength.len() >= 50,
        },
        AchievementDef {
            key: AchievementKey::EnduranceWarrior,
            title: "Endurance Warrior",
            blurb: "Twenty cardio sessions logged",
            predicate: |v| v.cardio.len() >= 20,
        },
        AchievementDef {
            key: AchievementKey::TechniqueMaster,
            title: "Technique Master",
            blurb: "Twenty-five advanced-technique workouts",
            predicate: |v| {
                v.strength
                    .iter()
                    .filter(|e| e.training_type.is_advanced())
                    .count()
                    >= 25
            },
        },
        AchievementDef {
            key: AchievementKey::ConsistencyKing,
            title: "Consistency King",
            blurb: "Thirty consecutive days with a workout",
            predicate: |v| longest_daily_streak(v) >= 30,
        },
        AchievementDef {
            key: AchievementKey::ProgressTracker,
            title: "Progress Tracker",
            blurb: "Ninety days of logged history",
            predicate: |v| history_span_days(v) >= 90,
        },
    ]
});

/// Unlock state of every badge
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AchievementSet {
    #[serde(default = "default_version")]
    pub schema_version: u32,
    #[serde(default)]
    pub achievements: BTreeMap<AchievementKey, AchievementState>,
}

impl Default for AchievementSet {
    fn default() -> Self {
        let achievements = REGISTRY
            .iter()
            .map(|def| (def.key, AchievementState::default()))
            .collect();
        AchievementSet {
            schema_version: crate::store::SCHEMA_VERSION,
            achievements,
        }
    }
}

fn default_version() -> u32 {
    crate::store::SCHEMA_VERSION
}

impl AchievementSet {
    /// Evaluate every badge predicate against the full history and unlock
    /// those that hold, returning the newly unlocked keys.
    ///
    /// Already-unlocked badges are skipped entirely, so unlocks are
    /// monotonic and repeated calls over the same history return an empty
    /// list after the first.
    pub fn check(
        &mut self,
        strength: &[StrengthEntry],
        cardio: &[CardioEntry],
        now: DateTime<Utc>,
    ) -> Vec<AchievementKey> {
        let view = HistoryView {
            strength,
            cardio,
            now,
        };
        let mut newly_unlocked = Vec::new();

        for def in REGISTRY.iter() {
            let state = self.achievements.entry(def.key).or_default();
            if state.unlocked {
                continue;
            }
            if (def.predicate)(&view) {
                state.unlocked = true;
                state.date = Some(now);
                tracing::info!("Achievement unlocked: {}", def.key);
                newly_unlocked.push(def.key);
            }
        }

        newly_unlocked
    }

    /// Whether a badge is unlocked
    pub fn is_unlocked(&self, key: AchievementKey) -> bool {
        self.achievements
            .get(&key)
            .map(|s| s.unlocked)
            .unwrap_or(false)
    }

    /// Count of unlocked badges
    pub fn unlocked_count(&self) -> usize {
        self.achievements.values().filter(|s| s.unlocked).count()
    }
}
