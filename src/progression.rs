//! Progression level estimation and training recommendations.
//!
//! Pure functions over the full strength history: a coarse skill-level label
//! from an ordered threshold table, a trailing-week training-load summary,
//! and a small fixed set of recommendation heuristics.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;

use crate::types::{StrengthEntry, TrainingType};

/// Coarse skill level derived from workout volume and variety
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Beginner,
    Novice,
    Intermediate,
    Advanced,
    Expert,
    Master,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Beginner => "Beginner",
            Level::Novice => "Novice",
            Level::Intermediate => "Intermediate",
            Level::Advanced => "Advanced",
            Level::Expert => "Expert",
            Level::Master => "Master",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Threshold row: level, min workouts, min distinct types, min
/// advanced-technique entries, progress percent when reached.
///
/// Rows are evaluated weakest to strongest, keeping the last one satisfied,
/// so a user can hold a level without meeting the next row's extra
/// requirements.
const LEVEL_TABLE: &[(Level, usize, usize, usize, u8)] = &[
    (Level::Novice, 5, 2, 0, 20),
    (Level::Intermediate, 15, 4, 0, 40),
    (Level::Advanced, 30, 7, 5, 60),
    (Level::Expert, 50, 12, 15, 80),
    (Level::Master, 100, 18, 35, 100),
];

/// Result of a progression estimate
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressionSummary {
    pub level: Level,
    pub progress_percent: u8,
    pub total_workouts: usize,
    pub types_used: usize,
    /// Σ weight × actual reps over every set of every entry, units as stored
    pub total_load: f64,
    pub advanced_entries: usize,
}

/// Trailing-week training load
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TrainingLoad {
    /// Total load over the trailing 7 days
    pub weekly: f64,
    /// Load per calendar day within the trailing week
    pub daily: BTreeMap<NaiveDate, f64>,
    /// Weekly load averaged over 7 days
    pub average: f64,
}

/// Estimate the user's progression level from the full strength history.
///
/// An empty history is a Beginner at 0 percent.
pub fn estimate(entries: &[StrengthEntry]) -> ProgressionSummary {
    let types_used = entries
        .iter()
        .map(|e| e.training_type.clone())
        .collect::<HashSet<TrainingType>>()
        .len();
    let total_load: f64 = entries.iter().map(StrengthEntry::load).sum();
    let advanced_entries = entries
        .iter()
        .filter(|e| e.training_type.is_advanced())
        .count();

    let mut level = Level::Beginner;
    let mut progress_percent = 0u8;
    for &(row_level, min_workouts, min_types, min_advanced, percent) in LEVEL_TABLE {
        if entries.len() >= min_workouts && types_used >= min_types && advanced_entries >= min_advanced
        {
            level = row_level;
            progress_percent = percent;
        }
    }

    ProgressionSummary {
        level,
        progress_percent,
        total_workouts: entries.len(),
        types_used,
        total_load,
        advanced_entries,
    }
}

/// Compute training load over the trailing 7 days
pub fn training_load(entries: &[StrengthEntry], now: DateTime<Utc>) -> TrainingLoad {
    let week_ago = now - Duration::days(7);
    let mut load = TrainingLoad::default();

    for entry in entries {
        if entry.date < week_ago {
            continue;
        }
        let entry_load = entry.load();
        load.weekly += entry_load;
        *load.daily.entry(entry.date.date_naive()).or_insert(0.0) += entry_load;
    }

    load.average = load.weekly / 7.0;
    load
}

/// How a recommendation was derived
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationKind {
    Progression,
    Variety,
    Intensity,
    Recovery,
    Technique,
    Motivation,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

/// A single training recommendation for the dashboard
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub kind: RecommendationKind,
    pub title: String,
    pub description: String,
    pub action: String,
    pub priority: Priority,
}

fn recommendation(
    kind: RecommendationKind,
    title: &str,
    description: &str,
    action: &str,
    priority: Priority,
) -> Recommendation {
    Recommendation {
        kind,
        title: title.to_string(),
        description: description.to_string(),
        action: action.to_string(),
        priority,
    }
}

/// Generate up to five recommendations from the strength history.
///
/// Heuristics run in a fixed order and each contributes at most one entry,
/// so the output is stable for a fixed history and `now`.
pub fn recommend(entries: &[StrengthEntry], now: DateTime<Utc>) -> Vec<Recommendation> {
    let progression = estimate(entries);
    let load = training_load(entries, now);
    let mut recommendations = Vec::new();

    // A beginner with real volume behind them is ready to move up
    if progression.level == Level::Beginner && progression.total_workouts >= 10 {
        recommendations.push(recommendation(
            RecommendationKind::Progression,
            "Ready for Intermediate Techniques",
            "Try incorporating supersets or drop sets to increase training intensity.",
            "Explore pyramid or superset training",
            Priority::High,
        ));
    }

    if progression.types_used < 5 {
        recommendations.push(recommendation(
            RecommendationKind::Variety,
            "Increase Training Variety",
            "Using different training methods can prevent plateaus and keep workouts interesting.",
            "Try tempo training or cluster sets",
            Priority::Medium,
        ));
    }

    if load.weekly < 5000.0 && entries.len() > 5 {
        recommendations.push(recommendation(
            RecommendationKind::Intensity,
            "Increase Training Intensity",
            "Your training load is relatively low. Consider increasing weight or volume.",
            "Add more sets or increase weight by 5-10%",
            Priority::Medium,
        ));
    }

    if load.daily.len() >= 6 {
        recommendations.push(recommendation(
            RecommendationKind::Recovery,
            "Consider Rest Days",
            "You've been training frequently. Rest days are crucial for muscle growth.",
            "Take 1-2 rest days this week",
            Priority::High,
        ));
    }

    // Over-reliance on straight sets across the last 10 workouts
    let recent = &entries[entries.len().saturating_sub(10)..];
    if !recent.is_empty() {
        let straight = recent
            .iter()
            .filter(|e| e.training_type == TrainingType::Straight)
            .count();
        let ratio = straight as f64 / recent.len() as f64;
        if ratio > 0.8 && progression.level != Level::Beginner {
            recommendations.push(recommendation(
                RecommendationKind::Technique,
                "Diversify Training Techniques",
                "You're mostly using straight sets. Try advanced techniques for better results.",
                "Incorporate drop sets, supersets, or tempo training",
                Priority::Medium,
            ));
        }
    }

    let week_ago = now - Duration::days(7);
    if !entries.iter().any(|e| e.date >= week_ago) {
        recommendations.push(recommendation(
            RecommendationKind::Motivation,
            "Time to Get Back On Track",
            "It's been a while since your last workout. Consistency is key to progress.",
            "Start with a light workout to rebuild momentum",
            Priority::High,
        ));
    }

    recommendations.truncate(5);
    recommendations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ExerciseSet, WeightUnit};
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
    }

    fn entry(id: i64, training_type: TrainingType, date: DateTime<Utc>, load: f64) -> StrengthEntry {
        StrengthEntry {
            id,
            exercise: "Squat".to_string(),
            training_type,
            sets: vec![ExerciseSet {
                weight: load,
                unit: WeightUnit::Lbs,
                planned_reps: 1,
                actual_reps: 1,
            }],
            notes: String::new(),
            date,
        }
    }

    /// Build a history with exact workout, type, and advanced-entry counts
    fn history(total: usize, types: usize, advanced: usize) -> Vec<StrengthEntry> {
        let advanced_pool = [
            TrainingType::DropSet,
            TrainingType::Superset,
            TrainingType::Triset,
            TrainingType::GiantSet,
            TrainingType::Cluster,
            TrainingType::RestPause,
            TrainingType::MechanicalDrop,
            TrainingType::DoubleDrop,
            TrainingType::TripleDrop,
            TrainingType::Contrast,
            TrainingType::Accommodating,
            TrainingType::WaveLoading,
        ];
        let plain_pool = [
            TrainingType::Straight,
            TrainingType::Pyramid,
            TrainingType::ReversePyramid,
            TrainingType::Tempo,
            TrainingType::Negative,
            TrainingType::PartialReps,
            TrainingType::Isometric,
            TrainingType::PreExhaust,
            TrainingType::PostExhaust,
            TrainingType::StripSet,
            TrainingType::Density,
            TrainingType::PauseReps,
            TrainingType::SpeedWork,
        ];

        // Advanced types count toward variety too
        let advanced_types = advanced.min(advanced_pool.len()).min(types);
        let plain_types = types - advanced_types;

        let mut entries = Vec::new();
        for i in 0..total {
            let t = if i < advanced {
                advanced_pool[i.min(advanced_types.saturating_sub(1))].clone()
            } else if i - advanced < plain_types {
                plain_pool[i - advanced].clone()
            } else {
                TrainingType::Straight
            };
            entries.push(entry(i as i64, t, now() - Duration::days(100), 100.0));
        }
        entries
    }

    #[test]
    fn test_empty_history_is_beginner() {
        let summary = estimate(&[]);
        assert_eq!(summary.level, Level::Beginner);
        assert_eq!(summary.progress_percent, 0);
        assert_eq!(summary.total_workouts, 0);
        assert_eq!(summary.types_used, 0);
        assert_eq!(summary.total_load, 0.0);
    }

    #[test]
    fn test_novice_threshold() {
        let summary = estimate(&history(5, 2, 0));
        assert_eq!(summary.level, Level::Novice);
        assert_eq!(summary.progress_percent, 20);
    }

    #[test]
    fn test_volume_without_variety_stays_beginner() {
        // 20 workouts but a single training type never leaves Beginner
        let summary = estimate(&history(20, 1, 0));
        assert_eq!(summary.level, Level::Beginner);
    }

    #[test]
    fn test_last_satisfied_row_wins() {
        // Expert thresholds (50/12/15) met, Master's (100/18/35) not
        let summary = estimate(&history(60, 13, 20));
        assert_eq!(summary.level, Level::Expert);
        assert_eq!(summary.progress_percent, 80);
    }

    #[test]
    fn test_advanced_requirement_caps_level() {
        // Enough workouts and variety for Advanced but too few advanced
        // techniques; stays Intermediate
        let summary = estimate(&history(40, 8, 2));
        assert_eq!(summary.level, Level::Intermediate);
        assert_eq!(summary.progress_percent, 40);
    }

    #[test]
    fn test_master_threshold() {
        let summary = estimate(&history(100, 18, 35));
        assert_eq!(summary.level, Level::Master);
        assert_eq!(summary.progress_percent, 100);
    }

    #[test]
    fn test_training_load_trailing_week() {
        let entries = vec![
            entry(1, TrainingType::Straight, now() - Duration::days(1), 1000.0),
            entry(2, TrainingType::Straight, now() - Duration::days(2), 2000.0),
            // Outside the trailing week
            entry(3, TrainingType::Straight, now() - Duration::days(8), 5000.0),
        ];

        let load = training_load(&entries, now());
        assert!((load.weekly - 3000.0).abs() < 1e-9);
        assert_eq!(load.daily.len(), 2);
        assert!((load.average - 3000.0 / 7.0).abs() < 1e-9);
    }

    #[test]
    fn test_recommend_motivation_when_idle() {
        let entries = vec![entry(1, TrainingType::Straight, now() - Duration::days(30), 100.0)];
        let recs = recommend(&entries, now());
        assert!(recs
            .iter()
            .any(|r| r.kind == RecommendationKind::Motivation && r.priority == Priority::High));
    }

    #[test]
    fn test_recommend_variety_for_low_type_count() {
        let entries = history(8, 2, 0);
        let recs = recommend(&entries, now());
        assert!(recs.iter().any(|r| r.kind == RecommendationKind::Variety));
    }

    #[test]
    fn test_recommend_recovery_for_six_training_days() {
        let entries: Vec<StrengthEntry> = (0..6)
            .map(|i| entry(i, TrainingType::Straight, now() - Duration::days(i), 1000.0))
            .collect();
        let recs = recommend(&entries, now());
        assert!(recs
            .iter()
            .any(|r| r.kind == RecommendationKind::Recovery && r.priority == Priority::High));
    }

    #[test]
    fn test_recommend_technique_for_straight_set_reliance() {
        // Novice-level user: two types overall, 9 of the last 10 workouts
        // straight sets
        let mut entries = history(5, 2, 0);
        for i in 0..5 {
            entries.push(entry(
                100 + i,
                TrainingType::Straight,
                now() - Duration::days(50),
                100.0,
            ));
        }

        let summary = estimate(&entries);
        assert_ne!(summary.level, Level::Beginner);

        let recs = recommend(&entries, now());
        assert!(recs.iter().any(|r| r.kind == RecommendationKind::Technique));
    }

    #[test]
    fn test_recommend_caps_at_five() {
        // Idle beginner with low load and little variety trips many
        // heuristics at once
        let entries: Vec<StrengthEntry> = (0..12)
            .map(|i| entry(i, TrainingType::Straight, now() - Duration::days(20 + i), 10.0))
            .collect();
        let recs = recommend(&entries, now());
        assert!(recs.len() <= 5);
        // Heuristic order is stable: progression fires first for this history
        assert_eq!(recs[0].kind, RecommendationKind::Progression);
    }

    #[test]
    fn test_empty_history_recommendations() {
        // No workouts at all: variety and motivation apply, intensity does
        // not (needs more than 5 entries)
        let recs = recommend(&[], now());
        let kinds: Vec<RecommendationKind> = recs.iter().map(|r| r.kind).collect();
        assert!(kinds.contains(&RecommendationKind::Variety));
        assert!(kinds.contains(&RecommendationKind::Motivation));
        assert!(!kinds.contains(&RecommendationKind::Intensity));
    }
}
