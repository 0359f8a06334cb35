//! Goal tracking and progress recomputation.
//!
//! Goals live in one bucket per recurrence period and follow a one-way state
//! machine: Active (completed=false) → Completed (completed=true). Progress
//! is denormalized and fully recomputed from the logs on every pass, never
//! incrementally patched, so recomputation is idempotent by construction.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::stats;
use crate::trophies::TrophyCase;
use crate::types::{timestamp_id, CardioEntry, RecurrencePeriod, StrengthEntry, WeightUnit};

pub use crate::types::GoalId;

/// What a goal measures, tagged the way the stored blob is
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum GoalKind {
    /// Total weight lifted over the window, in the unit frozen at creation
    Weightlifting { unit: WeightUnit },
    /// Total cardio minutes over the window
    Cardio,
}

impl GoalKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            GoalKind::Weightlifting { .. } => "weightlifting",
            GoalKind::Cardio => "cardio",
        }
    }

    /// Unit label progress and target are expressed in
    pub fn unit_label(&self) -> &'static str {
        match self {
            GoalKind::Weightlifting { unit } => unit.label(),
            GoalKind::Cardio => "minutes",
        }
    }
}

/// A user-defined target for one recurrence period
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Goal {
    pub id: GoalId,
    #[serde(flatten)]
    pub kind: GoalKind,
    pub target: f64,
    /// Recomputed from the logs on every pass; never the source of truth
    #[serde(default)]
    pub progress: f64,
    #[serde(default)]
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

/// A goal that crossed its target during a recompute pass
#[derive(Debug, Clone, PartialEq)]
pub struct GoalCompletion {
    pub period: RecurrencePeriod,
    pub goal: Goal,
}

/// All goals, bucketed by recurrence period
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GoalSet {
    #[serde(default = "default_version")]
    pub schema_version: u32,
    #[serde(default)]
    pub weekly: Vec<Goal>,
    #[serde(default)]
    pub monthly: Vec<Goal>,
    #[serde(default)]
    pub yearly: Vec<Goal>,
}

impl Default for GoalSet {
    fn default() -> Self {
        GoalSet {
            schema_version: crate::store::SCHEMA_VERSION,
            weekly: Vec::new(),
            monthly: Vec::new(),
            yearly: Vec::new(),
        }
    }
}

fn default_version() -> u32 {
    crate::store::SCHEMA_VERSION
}

impl GoalSet {
    /// Goals in one period's bucket
    pub fn bucket(&self, period: RecurrencePeriod) -> &[Goal] {
        match period {
            RecurrencePeriod::Weekly => &self.weekly,
            RecurrencePeriod::Monthly => &self.monthly,
            RecurrencePeriod::Yearly => &self.yearly,
        }
    }

    fn bucket_mut(&mut self, period: RecurrencePeriod) -> &mut Vec<Goal> {
        match period {
            RecurrencePeriod::Weekly => &mut self.weekly,
            RecurrencePeriod::Monthly => &mut self.monthly,
            RecurrencePeriod::Yearly => &mut self.yearly,
        }
    }

    fn id_taken(&self, id: GoalId) -> bool {
        RecurrencePeriod::ALL
            .iter()
            .any(|p| self.bucket(*p).iter().any(|g| g.id == id))
    }

    /// Add a goal to a period's bucket.
    ///
    /// The goal starts with progress 0 and completed=false; its id is derived
    /// from the creation instant.
    pub fn add(
        &mut self,
        period: RecurrencePeriod,
        kind: GoalKind,
        target: f64,
        now: DateTime<Utc>,
    ) -> Result<GoalId> {
        if !target.is_finite() || target <= 0.0 {
            return Err(Error::InvalidGoal(format!(
                "target must be a positive number, got {}",
                target
            )));
        }

        let id = timestamp_id(now, |candidate| self.id_taken(candidate));
        let goal = Goal {
            id,
            kind,
            target,
            progress: 0.0,
            completed: false,
            created_at: now,
        };

        tracing::info!(
            "Added {} {} goal: {} {}",
            period,
            kind.as_str(),
            target,
            kind.unit_label()
        );
        self.bucket_mut(period).push(goal);
        Ok(id)
    }

    /// Remove a goal from a period's bucket.
    ///
    /// Returns false when the goal is not present; deleting an already
    /// deleted goal is an expected race in a single-user app, not an error.
    /// Trophies already awarded for the goal are untouched.
    pub fn delete(&mut self, period: RecurrencePeriod, id: GoalId) -> bool {
        let bucket = self.bucket_mut(period);
        match bucket.iter().position(|g| g.id == id) {
            Some(index) => {
                bucket.remove(index);
                tracing::info!("Deleted {} goal {}", period, id);
                true
            }
            None => false,
        }
    }

    /// Look up a goal by period and id
    pub fn get(&self, period: RecurrencePeriod, id: GoalId) -> Option<&Goal> {
        self.bucket(period).iter().find(|g| g.id == id)
    }

    /// Total number of goals across all periods
    pub fn len(&self) -> usize {
        RecurrencePeriod::ALL.iter().map(|p| self.bucket(*p).len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Recompute every goal's progress over its rolling window ending at
    /// `now` and award trophies for incomplete→complete transitions.
    ///
    /// Progress is set to the aggregator total in the goal's own recorded
    /// unit (weight lifted for weightlifting goals, minutes for cardio).
    /// Completion is one-way: a completed goal whose progress later falls
    /// below target stays completed and its trophy stays awarded.
    ///
    /// The award is keyed by goal id through `TrophyCase::has_award_for`, so
    /// replaying a recompute after a crash between persisting trophies and
    /// persisting goals cannot double-award.
    pub fn recompute_progress(
        &mut self,
        strength: &[StrengthEntry],
        cardio: &[CardioEntry],
        trophies: &mut TrophyCase,
        now: DateTime<Utc>,
    ) -> Vec<GoalCompletion> {
        let mut completions = Vec::new();

        for period in RecurrencePeriod::ALL {
            let start = period.window_start(now);

            for goal in self.bucket_mut(period) {
                goal.progress = match goal.kind {
                    GoalKind::Weightlifting { unit } => {
                        stats::weightlifting_stats(strength, start, now, unit).total_weight
                    }
                    GoalKind::Cardio => stats::cardio_stats(cardio, start, now).total_duration,
                };

                // Strict incomplete→complete transition check; re-running
                // with unchanged logs takes this branch at most once
                if goal.progress >= goal.target && !goal.completed {
                    goal.completed = true;
                    tracing::info!(
                        "Goal {} completed: {:.1}/{} {}",
                        goal.id,
                        goal.progress,
                        goal.target,
                        goal.kind.unit_label()
                    );

                    if !trophies.has_award_for(goal.id) {
                        trophies.award(goal, period, now);
                    }
                    completions.push(GoalCompletion {
                        period,
                        goal: goal.clone(),
                    });
                }
            }
        }

        completions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ExerciseSet, TrainingType};
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
    }

    fn lifting(unit: WeightUnit) -> GoalKind {
        GoalKind::Weightlifting { unit }
    }

    fn strength_entry(id: i64, date: DateTime<Utc>, weight: f64, reps: u32) -> StrengthEntry {
        StrengthEntry {
            id,
            exercise: "Squat".to_string(),
            training_type: TrainingType::Straight,
            sets: vec![ExerciseSet {
                weight,
                unit: WeightUnit::Lbs,
                planned_reps: reps,
                actual_reps: reps,
            }],
            notes: String::new(),
            date,
        }
    }

    fn cardio_entry(id: i64, date: DateTime<Utc>, minutes: f64) -> CardioEntry {
        CardioEntry {
            id,
            activity: "running".to_string(),
            duration_minutes: minutes,
            heart_rate: None,
            notes: String::new(),
            date,
        }
    }

    #[test]
    fn test_add_initializes_goal() {
        let mut goals = GoalSet::default();
        let id = goals
            .add(RecurrencePeriod::Weekly, lifting(WeightUnit::Lbs), 1000.0, now())
            .unwrap();

        let goal = goals.get(RecurrencePeriod::Weekly, id).unwrap();
        assert_eq!(goal.progress, 0.0);
        assert!(!goal.completed);
        assert_eq!(goal.target, 1000.0);
    }

    #[test]
    fn test_add_rejects_non_positive_target() {
        let mut goals = GoalSet::default();
        assert!(matches!(
            goals.add(RecurrencePeriod::Weekly, GoalKind::Cardio, 0.0, now()),
            Err(Error::InvalidGoal(_))
        ));
        assert!(matches!(
            goals.add(RecurrencePeriod::Weekly, GoalKind::Cardio, -5.0, now()),
            Err(Error::InvalidGoal(_))
        ));
        assert!(goals.is_empty());
    }

    #[test]
    fn test_delete_missing_goal_returns_false() {
        let mut goals = GoalSet::default();
        let id = goals
            .add(RecurrencePeriod::Monthly, GoalKind::Cardio, 120.0, now())
            .unwrap();

        assert!(goals.delete(RecurrencePeriod::Monthly, id));
        assert!(!goals.delete(RecurrencePeriod::Monthly, id));
        // Wrong bucket is also a miss, not an error
        assert!(!goals.delete(RecurrencePeriod::Weekly, id));
    }

    #[test]
    fn test_recompute_completes_goal_and_awards_once() {
        let mut goals = GoalSet::default();
        let mut trophies = TrophyCase::default();
        goals
            .add(RecurrencePeriod::Weekly, lifting(WeightUnit::Lbs), 1000.0, now() - Duration::days(3))
            .unwrap();

        // Three entries this week totaling 1200 lbs lifted
        let entries = vec![
            strength_entry(1, now() - Duration::days(1), 100.0, 4),
            strength_entry(2, now() - Duration::days(2), 100.0, 4),
            strength_entry(3, now() - Duration::days(3), 100.0, 4),
        ];

        let completions = goals.recompute_progress(&entries, &[], &mut trophies, now());
        assert_eq!(completions.len(), 1);
        assert_eq!(completions[0].period, RecurrencePeriod::Weekly);

        let goal = &goals.weekly[0];
        assert!(goal.completed);
        assert!((goal.progress - 1200.0).abs() < 1e-9);
        assert_eq!(trophies.len(), 1);
        assert_eq!(trophies.list()[0].period, RecurrencePeriod::Weekly);
    }

    #[test]
    fn test_recompute_is_idempotent() {
        let mut goals = GoalSet::default();
        let mut trophies = TrophyCase::default();
        goals
            .add(RecurrencePeriod::Weekly, lifting(WeightUnit::Lbs), 500.0, now() - Duration::days(1))
            .unwrap();

        let entries = vec![strength_entry(1, now() - Duration::days(1), 100.0, 6)];

        let first = goals.recompute_progress(&entries, &[], &mut trophies, now());
        let snapshot = goals.clone();
        let second = goals.recompute_progress(&entries, &[], &mut trophies, now());

        assert_eq!(first.len(), 1);
        assert!(second.is_empty());
        assert_eq!(goals, snapshot);
        assert_eq!(trophies.len(), 1);
    }

    #[test]
    fn test_completion_is_one_way() {
        let mut goals = GoalSet::default();
        let mut trophies = TrophyCase::default();
        goals
            .add(RecurrencePeriod::Weekly, lifting(WeightUnit::Lbs), 500.0, now() - Duration::days(1))
            .unwrap();

        let entries = vec![strength_entry(1, now() - Duration::days(1), 100.0, 6)];
        goals.recompute_progress(&entries, &[], &mut trophies, now());
        assert!(goals.weekly[0].completed);

        // A week later the window is empty; progress drops but completion
        // and the trophy stay
        let later = now() + Duration::days(10);
        let completions = goals.recompute_progress(&entries, &[], &mut trophies, later);
        assert!(completions.is_empty());
        assert!(goals.weekly[0].completed);
        assert_eq!(goals.weekly[0].progress, 0.0);
        assert_eq!(trophies.len(), 1);
    }

    #[test]
    fn test_recompute_skips_award_when_ledger_already_has_it() {
        // Simulates replay after a crash that persisted trophies but not
        // goals: the goal is still incomplete but its trophy exists.
        let mut goals = GoalSet::default();
        let mut trophies = TrophyCase::default();
        let id = goals
            .add(RecurrencePeriod::Weekly, lifting(WeightUnit::Lbs), 500.0, now() - Duration::days(1))
            .unwrap();

        let entries = vec![strength_entry(1, now() - Duration::days(1), 100.0, 6)];
        goals.recompute_progress(&entries, &[], &mut trophies, now());
        assert_eq!(trophies.len(), 1);

        goals.weekly[0].completed = false;
        let completions = goals.recompute_progress(&entries, &[], &mut trophies, now());

        // The transition re-fires but the ledger is not double-appended
        assert_eq!(completions.len(), 1);
        assert_eq!(completions[0].goal.id, id);
        assert_eq!(trophies.len(), 1);
    }

    #[test]
    fn test_weightlifting_progress_uses_goal_unit() {
        let mut goals = GoalSet::default();
        let mut trophies = TrophyCase::default();
        goals
            .add(RecurrencePeriod::Weekly, lifting(WeightUnit::Kg), 500.0, now() - Duration::days(1))
            .unwrap();

        // 100 lbs × 6 reps = 600 lbs ≈ 272 kg; not enough for a 500 kg goal
        let entries = vec![strength_entry(1, now() - Duration::days(1), 100.0, 6)];
        goals.recompute_progress(&entries, &[], &mut trophies, now());

        let goal = &goals.weekly[0];
        assert!((goal.progress - 600.0 / 2.20462).abs() < 1e-6);
        assert!(!goal.completed);
        assert!(trophies.is_empty());
    }

    #[test]
    fn test_cardio_goal_sums_minutes() {
        let mut goals = GoalSet::default();
        let mut trophies = TrophyCase::default();
        goals
            .add(RecurrencePeriod::Monthly, GoalKind::Cardio, 100.0, now() - Duration::days(10))
            .unwrap();

        let sessions = vec![
            cardio_entry(1, now() - Duration::days(5), 45.0),
            cardio_entry(2, now() - Duration::days(2), 60.0),
            // Outside the monthly window
            cardio_entry(3, now() - Duration::days(40), 30.0),
        ];

        let completions = goals.recompute_progress(&[], &sessions, &mut trophies, now());
        assert_eq!(completions.len(), 1);
        assert!((goals.monthly[0].progress - 105.0).abs() < 1e-9);
    }

    #[test]
    fn test_goal_kind_serde_shape() {
        let goal = Goal {
            id: 42,
            kind: GoalKind::Weightlifting {
                unit: WeightUnit::Lbs,
            },
            target: 1000.0,
            progress: 0.0,
            completed: false,
            created_at: now(),
        };

        let json = serde_json::to_value(&goal).unwrap();
        assert_eq!(json["type"], "weightlifting");
        assert_eq!(json["unit"], "lbs");

        let back: Goal = serde_json::from_value(json).unwrap();
        assert_eq!(back, goal);
    }
}
