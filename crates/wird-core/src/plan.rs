//! Common progress-plan abstraction
//!
//! Day-set plans (reading challenges, habit checklists) and the cumulative
//! goal ledger expose progress through the same interface; only the
//! day-set plans repeat in cycles.

use chrono::{DateTime, Local};
use wird_api::{ChallengePlan, Goal, HabitPlan, PlanRef};
use wird_util::PlanId;

/// Result of removing a record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    Removed,
    NotFound,
}

/// Result of acknowledging a completed plan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestartOutcome {
    /// Progress cleared, `cycles` is the new cycle count
    Restarted { cycles: u32 },
    /// The plan is not complete, nothing changed
    NotComplete,
    NotFound,
}

/// Anything with measurable progress towards a fixed total
pub trait ProgressPlan {
    fn plan_ref(&self) -> PlanRef;

    fn title(&self) -> &str;

    /// Units done and units required
    fn progress(&self) -> (u64, u64);

    fn is_complete(&self) -> bool {
        let (done, required) = self.progress();
        required > 0 && done >= required
    }

    fn percent(&self) -> u8 {
        let (done, required) = self.progress();
        wird_api::percent(done, required)
    }
}

/// A plan that starts over once completed
pub trait Cyclic: ProgressPlan {
    fn id(&self) -> &PlanId;

    fn cycles_completed(&self) -> u32;

    /// Whether completion of the current cycle was already reported
    fn completion_signaled(&self) -> bool;

    fn mark_completion_signaled(&mut self);

    /// Clear progress and count a finished cycle. Shape (duration, habits,
    /// material) is left untouched.
    fn restart(&mut self, now: DateTime<Local>, reset_start_date: bool);
}

impl ProgressPlan for ChallengePlan {
    fn plan_ref(&self) -> PlanRef {
        PlanRef::Challenge(self.id.clone())
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn progress(&self) -> (u64, u64) {
        (self.completed_days.len() as u64, u64::from(self.duration))
    }

    fn is_complete(&self) -> bool {
        self.duration > 0 && self.all_days_completed()
    }
}

impl Cyclic for ChallengePlan {
    fn id(&self) -> &PlanId {
        &self.id
    }

    fn cycles_completed(&self) -> u32 {
        self.cycles_completed
    }

    fn completion_signaled(&self) -> bool {
        self.completion_signaled
    }

    fn mark_completion_signaled(&mut self) {
        self.completion_signaled = true;
    }

    fn restart(&mut self, now: DateTime<Local>, reset_start_date: bool) {
        self.completed_days.clear();
        self.cycles_completed = self.cycles_completed.saturating_add(1);
        self.completion_signaled = false;
        if reset_start_date {
            self.start_date = now;
        }
    }
}

impl ProgressPlan for HabitPlan {
    fn plan_ref(&self) -> PlanRef {
        PlanRef::Habit(self.id.clone())
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn progress(&self) -> (u64, u64) {
        (self.checked_count(), self.required_count())
    }

    fn is_complete(&self) -> bool {
        let required = self.required_count();
        required > 0 && self.checked_count() == required
    }
}

impl Cyclic for HabitPlan {
    fn id(&self) -> &PlanId {
        &self.id
    }

    fn cycles_completed(&self) -> u32 {
        self.cycles_completed
    }

    fn completion_signaled(&self) -> bool {
        self.completion_signaled
    }

    fn mark_completion_signaled(&mut self) {
        self.completion_signaled = true;
    }

    fn restart(&mut self, now: DateTime<Local>, reset_start_date: bool) {
        self.day_progress.clear();
        self.cycles_completed = self.cycles_completed.saturating_add(1);
        self.completion_signaled = false;
        if reset_start_date {
            self.start_date = now;
        }
    }
}

impl ProgressPlan for Goal {
    fn plan_ref(&self) -> PlanRef {
        PlanRef::Goal(self.id.clone())
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn progress(&self) -> (u64, u64) {
        (u64::from(self.completed_units), u64::from(self.total_units))
    }

    fn is_complete(&self) -> bool {
        self.completed_units >= self.total_units
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::collections::{BTreeMap, BTreeSet};
    use wird_api::{PlanScope, UnitRange};

    fn created() -> DateTime<Local> {
        Local.with_ymd_and_hms(2025, 1, 1, 6, 0, 0).unwrap()
    }

    fn challenge(duration: u32, days: &[u32]) -> ChallengePlan {
        ChallengePlan {
            id: PlanId::new("c"),
            scope: PlanScope::WholeBook,
            title: "Khatmul Quran".into(),
            chapter: None,
            units: UnitRange::new(1, 604),
            duration,
            completed_days: days.iter().copied().collect(),
            start_date: created(),
            cycles_completed: 2,
            completion_signaled: false,
        }
    }

    #[test]
    fn test_challenge_progress() {
        let plan = challenge(4, &[0, 1]);
        assert_eq!(plan.progress(), (2, 4));
        assert_eq!(plan.percent(), 50);
        assert!(!plan.is_complete());
        assert!(challenge(4, &[0, 1, 2, 3]).is_complete());
    }

    #[test]
    fn test_challenge_restart_keeps_shape() {
        let mut plan = challenge(2, &[0, 1]);
        plan.mark_completion_signaled();
        let later = Local.with_ymd_and_hms(2025, 1, 3, 6, 0, 0).unwrap();

        plan.restart(later, false);
        assert!(plan.completed_days.is_empty());
        assert!(!plan.completion_signaled());
        assert_eq!(plan.cycles_completed, 3);
        assert_eq!(plan.duration, 2);
        assert_eq!(plan.start_date, created());

        plan.restart(later, true);
        assert_eq!(plan.start_date, later);
    }

    #[test]
    fn test_habit_completion_needs_every_check() {
        let mut plan = HabitPlan {
            id: PlanId::new("h"),
            title: "Daily".into(),
            habits: vec!["Pray".into(), "Read".into()],
            duration: 2,
            day_progress: BTreeMap::new(),
            start_date: created(),
            cycles_completed: 0,
            completion_signaled: false,
        };

        plan.day_progress.insert(0, BTreeSet::from([0, 1]));
        plan.day_progress.insert(1, BTreeSet::from([0]));
        assert!(!plan.is_complete());

        plan.day_progress.insert(1, BTreeSet::from([0, 1]));
        assert!(plan.is_complete());
        assert_eq!(plan.plan_ref(), PlanRef::Habit(PlanId::new("h")));

        plan.restart(created(), true);
        assert!(plan.day_progress.is_empty());
        assert_eq!(plan.cycles_completed(), 1);
    }
}
