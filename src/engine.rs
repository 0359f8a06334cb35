//! Top-level engine wiring the logs, goal tracker, trophy ledger, and
//! achievement evaluator together.
//!
//! `FitnessEngine` is the application context the UI constructs once and
//! passes around instead of reaching for process-wide globals: it owns the
//! store handle and every in-memory collection, and exposes the mutation and
//! refresh operations the dashboard drives.

use chrono::{DateTime, NaiveTime, Utc};

use crate::achievements::{AchievementKey, AchievementSet};
use crate::config::Config;
use crate::error::Result;
use crate::goals::{Goal, GoalCompletion, GoalId, GoalKind, GoalSet};
use crate::history::{CardioDraft, CardioLog, StrengthDraft, StrengthLog};
use crate::progression::{self, ProgressionSummary, Recommendation};
use crate::stats::{self, CardioStats, WeightliftingStats};
use crate::store::Store;
use crate::trophies::TrophyCase;
use crate::types::{CardioEntry, EntryId, RecurrencePeriod, Settings, StrengthEntry, WeightUnit};

/// Fire-and-forget notification emitted by a refresh pass
#[derive(Debug, Clone)]
pub enum Event {
    GoalCompleted {
        period: RecurrencePeriod,
        goal: Goal,
    },
    AchievementUnlocked {
        key: AchievementKey,
    },
    RecommendationsChanged,
}

/// Consumer of engine events (notification UI, badge toasts).
///
/// Events are not awaited or acknowledged; a sink that fails must handle
/// that itself.
pub trait EventSink {
    fn on_event(&mut self, event: &Event);
}

/// What a refresh pass changed
#[derive(Debug, Clone, Default)]
pub struct RefreshOutcome {
    pub completed_goals: Vec<GoalCompletion>,
    pub unlocked_achievements: Vec<AchievementKey>,
    pub recommendations_changed: bool,
}

impl RefreshOutcome {
    pub fn is_quiet(&self) -> bool {
        self.completed_goals.is_empty()
            && self.unlocked_achievements.is_empty()
            && !self.recommendations_changed
    }
}

/// Today's dashboard aggregates
#[derive(Debug, Clone, PartialEq)]
pub struct TodaySummary {
    pub weightlifting: WeightliftingStats,
    pub cardio: CardioStats,
}

/// Application context owning the store and every derived collection
pub struct FitnessEngine {
    store: Store,
    settings: Settings,
    strength: StrengthLog,
    cardio: CardioLog,
    goals: GoalSet,
    trophies: TrophyCase,
    achievements: AchievementSet,
    sinks: Vec<Box<dyn EventSink>>,
    last_recommendations: Vec<Recommendation>,
}

impl FitnessEngine {
    /// Open the engine over the configured data directory, loading every
    /// record
    pub fn open(config: &Config) -> Result<Self> {
        let store = Store::new(config.data.data_dir.clone());
        let settings = store.load::<Settings>()?;
        let strength = store.load::<StrengthLog>()?;
        let cardio = store.load::<CardioLog>()?;
        let goals = store.load::<GoalSet>()?;
        let trophies = store.load::<TrophyCase>()?;
        let achievements = store.load::<AchievementSet>()?;

        tracing::info!(
            "Opened engine: {} strength entries, {} cardio entries, {} goals, {} trophies",
            strength.entries.len(),
            cardio.entries.len(),
            goals.len(),
            trophies.len()
        );

        Ok(FitnessEngine {
            store,
            settings,
            strength,
            cardio,
            goals,
            trophies,
            achievements,
            sinks: Vec::new(),
            last_recommendations: Vec::new(),
        })
    }

    /// Attach an event sink; every subsequent refresh notifies it
    pub fn attach_sink(&mut self, sink: Box<dyn EventSink>) {
        self.sinks.push(sink);
    }

    fn emit(&mut self, event: Event) {
        for sink in &mut self.sinks {
            sink.on_event(&event);
        }
    }

    // ========================================================================
    // Logging operations
    // ========================================================================

    pub fn log_strength(&mut self, draft: StrengthDraft, now: DateTime<Utc>) -> Result<EntryId> {
        let id = self.strength.add(draft, now)?;
        self.store.save(&self.strength)?;
        Ok(id)
    }

    pub fn log_cardio(&mut self, draft: CardioDraft, now: DateTime<Utc>) -> Result<EntryId> {
        let id = self.cardio.add(draft, now)?;
        self.store.save(&self.cardio)?;
        Ok(id)
    }

    pub fn delete_strength(&mut self, id: EntryId) -> Result<bool> {
        let removed = self.strength.delete(id);
        if removed {
            self.store.save(&self.strength)?;
        }
        Ok(removed)
    }

    pub fn delete_cardio(&mut self, id: EntryId) -> Result<bool> {
        let removed = self.cardio.delete(id);
        if removed {
            self.store.save(&self.cardio)?;
        }
        Ok(removed)
    }

    // ========================================================================
    // Goal operations
    // ========================================================================

    /// Add a weightlifting goal in the current display unit, as the goal
    /// form does
    pub fn add_weightlifting_goal(
        &mut self,
        period: RecurrencePeriod,
        target: f64,
        now: DateTime<Utc>,
    ) -> Result<GoalId> {
        let kind = GoalKind::Weightlifting {
            unit: self.settings.units,
        };
        let id = self.goals.add(period, kind, target, now)?;
        self.store.save(&self.goals)?;
        Ok(id)
    }

    /// Add a cardio goal measured in minutes
    pub fn add_cardio_goal(
        &mut self,
        period: RecurrencePeriod,
        target: f64,
        now: DateTime<Utc>,
    ) -> Result<GoalId> {
        let id = self.goals.add(period, GoalKind::Cardio, target, now)?;
        self.store.save(&self.goals)?;
        Ok(id)
    }

    /// Delete a goal. Trophies already awarded for it are untouched.
    pub fn delete_goal(&mut self, period: RecurrencePeriod, id: GoalId) -> Result<bool> {
        let removed = self.goals.delete(period, id);
        if removed {
            self.store.save(&self.goals)?;
        }
        Ok(removed)
    }

    // ========================================================================
    // Settings
    // ========================================================================

    pub fn set_units(&mut self, unit: WeightUnit) -> Result<()> {
        self.settings.units = unit;
        self.store.save(&self.settings)
    }

    // ========================================================================
    // Refresh
    // ========================================================================

    /// Recompute all derived state from the current logs.
    ///
    /// Runs goal progress (awarding trophies on completion), achievement
    /// checks, and the recommendation heuristics, persists what changed, and
    /// notifies attached sinks. Derived state is recomputed on working
    /// copies and persisted trophies-first, so an interrupted pass can be
    /// retried without double-awarding; a second call over unchanged logs
    /// changes and emits nothing.
    pub fn refresh(&mut self, now: DateTime<Utc>) -> Result<RefreshOutcome> {
        let mut new_goals = self.goals.clone();
        let mut new_trophies = self.trophies.clone();
        let completions = new_goals.recompute_progress(
            &self.strength.entries,
            &self.cardio.entries,
            &mut new_trophies,
            now,
        );

        let mut new_achievements = self.achievements.clone();
        let unlocked =
            new_achievements.check(&self.strength.entries, &self.cardio.entries, now);

        // Trophies before goals: if the second write never lands, replaying
        // the recompute finds the award by goal id and does not duplicate it
        if new_trophies != self.trophies {
            self.store.save(&new_trophies)?;
            self.trophies = new_trophies;
        }
        if new_goals != self.goals {
            self.store.save(&new_goals)?;
            self.goals = new_goals;
        }
        if new_achievements != self.achievements {
            self.store.save(&new_achievements)?;
            self.achievements = new_achievements;
        }

        let recommendations = progression::recommend(&self.strength.entries, now);
        let recommendations_changed = recommendations != self.last_recommendations;
        self.last_recommendations = recommendations;

        for completion in &completions {
            self.emit(Event::GoalCompleted {
                period: completion.period,
                goal: completion.goal.clone(),
            });
        }
        for key in &unlocked {
            self.emit(Event::AchievementUnlocked { key: *key });
        }
        if recommendations_changed {
            self.emit(Event::RecommendationsChanged);
        }

        Ok(RefreshOutcome {
            completed_goals: completions,
            unlocked_achievements: unlocked,
            recommendations_changed,
        })
    }

    // ========================================================================
    // Read accessors
    // ========================================================================

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn strength_entries(&self) -> &[StrengthEntry] {
        &self.strength.entries
    }

    pub fn cardio_entries(&self) -> &[CardioEntry] {
        &self.cardio.entries
    }

    pub fn goals(&self, period: RecurrencePeriod) -> &[Goal] {
        self.goals.bucket(period)
    }

    pub fn trophies(&self) -> &TrophyCase {
        &self.trophies
    }

    pub fn achievements(&self) -> &AchievementSet {
        &self.achievements
    }

    /// Progression level summary over the full strength history
    pub fn progression(&self) -> ProgressionSummary {
        progression::estimate(&self.strength.entries)
    }

    /// Current recommendation list
    pub fn recommendations(&self, now: DateTime<Utc>) -> Vec<Recommendation> {
        progression::recommend(&self.strength.entries, now)
    }

    /// Aggregates for the current calendar day, in the display unit
    pub fn today_summary(&self, now: DateTime<Utc>) -> TodaySummary {
        let start = now.date_naive().and_time(NaiveTime::MIN).and_utc();
        TodaySummary {
            weightlifting: stats::weightlifting_stats(
                &self.strength.entries,
                start,
                now,
                self.settings.units,
            ),
            cardio: stats::cardio_stats(&self.cardio.entries, start, now),
        }
    }
}
