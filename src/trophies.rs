//! Trophy ledger for completed goals.
//!
//! Trophies are write-once records appended when a goal crosses its target.
//! The ledger itself never deduplicates or deletes; the at-most-once
//! guarantee lives in the goal tracker, which checks `has_award_for` before
//! awarding.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::goals::{Goal, GoalId};
use crate::types::{timestamp_id, RecurrencePeriod, TrophyId};

/// Display tier of a trophy, derived from the goal's recurrence period
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TrophyTier {
    Bronze,
    Silver,
    Gold,
}

impl From<RecurrencePeriod> for TrophyTier {
    fn from(period: RecurrencePeriod) -> Self {
        match period {
            RecurrencePeriod::Weekly => TrophyTier::Bronze,
            RecurrencePeriod::Monthly => TrophyTier::Silver,
            RecurrencePeriod::Yearly => TrophyTier::Gold,
        }
    }
}

/// An awarded trophy. Never mutated after creation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Trophy {
    pub id: TrophyId,
    /// Goal this trophy was awarded for; the tracker's idempotence key
    pub goal_id: GoalId,
    pub period: RecurrencePeriod,
    pub description: String,
    pub awarded_at: DateTime<Utc>,
}

impl Trophy {
    pub fn tier(&self) -> TrophyTier {
        TrophyTier::from(self.period)
    }
}

/// Append-only collection of awarded trophies
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrophyCase {
    #[serde(default = "default_version")]
    pub schema_version: u32,
    #[serde(default)]
    pub trophies: Vec<Trophy>,
}

impl Default for TrophyCase {
    fn default() -> Self {
        TrophyCase {
            schema_version: crate::store::SCHEMA_VERSION,
            trophies: Vec::new(),
        }
    }
}

fn default_version() -> u32 {
    crate::store::SCHEMA_VERSION
}

impl TrophyCase {
    /// Append a trophy for a completed goal.
    ///
    /// Pure append: the caller is responsible for only awarding on a genuine
    /// incomplete→complete transition.
    pub fn award(&mut self, goal: &Goal, period: RecurrencePeriod, now: DateTime<Utc>) -> &Trophy {
        let id = timestamp_id(now, |candidate| {
            self.trophies.iter().any(|t| t.id == candidate)
        });
        let trophy = Trophy {
            id,
            goal_id: goal.id,
            period,
            description: format!(
                "Completed {} goal of {} {}",
                goal.kind.as_str(),
                goal.target,
                goal.kind.unit_label()
            ),
            awarded_at: now,
        };

        tracing::info!("Awarding {} trophy: {}", period, trophy.description);
        let index = self.trophies.len();
        self.trophies.push(trophy);
        &self.trophies[index]
    }

    /// Whether a trophy has already been awarded for this goal
    pub fn has_award_for(&self, goal_id: GoalId) -> bool {
        self.trophies.iter().any(|t| t.goal_id == goal_id)
    }

    /// All trophies in ledger (append) order
    pub fn list(&self) -> &[Trophy] {
        &self.trophies
    }

    /// Trophies ordered newest-first, as the trophy shelf displays them
    pub fn sorted_for_display(&self) -> Vec<&Trophy> {
        let mut trophies: Vec<&Trophy> = self.trophies.iter().collect();
        trophies.sort_by(|a, b| b.awarded_at.cmp(&a.awarded_at));
        trophies
    }

    pub fn len(&self) -> usize {
        self.trophies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trophies.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::goals::GoalKind;
    use crate::types::WeightUnit;
    use chrono::TimeZone;

    fn test_goal(id: GoalId, target: f64) -> Goal {
        Goal {
            id,
            kind: GoalKind::Weightlifting {
                unit: WeightUnit::Lbs,
            },
            target,
            progress: target,
            completed: true,
            created_at: Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_award_synthesizes_description() {
        let mut case = TrophyCase::default();
        let now = Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap();

        let trophy = case.award(&test_goal(7, 1000.0), RecurrencePeriod::Weekly, now);
        assert_eq!(trophy.description, "Completed weightlifting goal of 1000 lbs");
        assert_eq!(trophy.goal_id, 7);
        assert_eq!(trophy.awarded_at, now);
    }

    #[test]
    fn test_has_award_for() {
        let mut case = TrophyCase::default();
        let now = Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap();

        assert!(!case.has_award_for(7));
        case.award(&test_goal(7, 500.0), RecurrencePeriod::Monthly, now);
        assert!(case.has_award_for(7));
        assert!(!case.has_award_for(8));
    }

    #[test]
    fn test_award_is_pure_append() {
        let mut case = TrophyCase::default();
        let now = Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap();

        // The ledger does not deduplicate; that is the tracker's job
        case.award(&test_goal(7, 500.0), RecurrencePeriod::Weekly, now);
        case.award(&test_goal(7, 500.0), RecurrencePeriod::Weekly, now);
        assert_eq!(case.len(), 2);
        assert_ne!(case.list()[0].id, case.list()[1].id);
    }

    #[test]
    fn test_display_order_is_newest_first() {
        let mut case = TrophyCase::default();
        let early = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let late = Utc.with_ymd_and_hms(2024, 6, 20, 0, 0, 0).unwrap();

        case.award(&test_goal(1, 100.0), RecurrencePeriod::Weekly, early);
        case.award(&test_goal(2, 200.0), RecurrencePeriod::Weekly, late);

        let sorted = case.sorted_for_display();
        assert_eq!(sorted[0].goal_id, 2);
        assert_eq!(sorted[1].goal_id, 1);
    }

    #[test]
    fn test_tier_mapping() {
        assert_eq!(TrophyTier::from(RecurrencePeriod::Weekly), TrophyTier::Bronze);
        assert_eq!(TrophyTier::from(RecurrencePeriod::Monthly), TrophyTier::Silver);
        assert_eq!(TrophyTier::from(RecurrencePeriod::Yearly), TrophyTier::Gold);
    }
}
