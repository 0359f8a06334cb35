#![forbid(unsafe_code)]

//! Goal-progress and achievement derivation engine for a local-first
//! fitness tracker.
//!
//! This crate provides:
//! - Domain types (entries, sets, goals, trophies, settings)
//! - Window aggregation over activity logs
//! - Goal tracking with one-way completion and trophy awards
//! - Achievement badges with monotonic unlocks
//! - Progression level estimation and recommendations
//! - Persistence (fixed-name JSON records, atomic writes)
//!
//! The UI, timers, and notification surfaces are external collaborators:
//! they log entries through [`FitnessEngine`], drive [`FitnessEngine::refresh`]
//! on user actions and a periodic tick, and consume the derived state and
//! events.

pub mod types;
pub mod error;
pub mod config;
pub mod logging;
pub mod stats;
pub mod history;
pub mod goals;
pub mod trophies;
pub mod achievements;
pub mod progression;
pub mod store;
pub mod engine;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use config::Config;
pub use stats::{cardio_stats, weightlifting_stats, CardioStats, WeightliftingStats};
pub use history::{CardioDraft, CardioLog, DurationUnit, StrengthDraft, StrengthLog};
pub use goals::{Goal, GoalCompletion, GoalKind, GoalSet};
pub use trophies::{Trophy, TrophyCase, TrophyTier};
pub use achievements::{AchievementKey, AchievementSet, AchievementState};
pub use progression::{
    estimate, recommend, training_load, Level, Priority, ProgressionSummary, Recommendation,
    RecommendationKind, TrainingLoad,
};
pub use store::{Record, Store, SCHEMA_VERSION};
pub use engine::{Event, EventSink, FitnessEngine, RefreshOutcome, TodaySummary};
