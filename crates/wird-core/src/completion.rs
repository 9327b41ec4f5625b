//! Plan completion detection and restart cycles

use chrono::{DateTime, Local};
use tracing::info;
use wird_api::PlanRef;
use wird_util::{PlanId, Result};

use crate::{ChallengeBook, CoreEvent, HabitBook, RestartOutcome};

/// A book of plans that repeat once completed
pub trait CyclicBook {
    fn plan_ref(&self, id: &PlanId) -> PlanRef;

    /// Persist the reported mark on a complete, unreported plan
    fn signal_completion(&mut self, id: &PlanId) -> Result<Option<u32>>;

    fn restart(&mut self, id: &PlanId, now: DateTime<Local>) -> Result<RestartOutcome>;
}

impl CyclicBook for ChallengeBook {
    fn plan_ref(&self, id: &PlanId) -> PlanRef {
        PlanRef::Challenge(id.clone())
    }

    fn signal_completion(&mut self, id: &PlanId) -> Result<Option<u32>> {
        ChallengeBook::signal_completion(self, id)
    }

    fn restart(&mut self, id: &PlanId, now: DateTime<Local>) -> Result<RestartOutcome> {
        ChallengeBook::restart(self, id, now)
    }
}

impl CyclicBook for HabitBook {
    fn plan_ref(&self, id: &PlanId) -> PlanRef {
        PlanRef::Habit(id.clone())
    }

    fn signal_completion(&mut self, id: &PlanId) -> Result<Option<u32>> {
        HabitBook::signal_completion(self, id)
    }

    fn restart(&mut self, id: &PlanId, now: DateTime<Local>) -> Result<RestartOutcome> {
        HabitBook::restart(self, id, now)
    }
}

/// Edge-triggered completion detector.
///
/// Completion of a plan is reported once per cycle: the first time the
/// predicate holds after a toggle. The report is stored on the plan record,
/// so unchecking and re-checking within the same cycle stays silent across
/// process restarts until the plan itself is restarted.
#[derive(Debug, Default, Clone, Copy)]
pub struct CompletionController;

impl CompletionController {
    pub fn new() -> Self {
        Self
    }

    /// Evaluate plan `id` after a toggle
    pub fn evaluate<B: CyclicBook>(&self, book: &mut B, id: &PlanId) -> Result<Option<CoreEvent>> {
        let Some(cycle) = book.signal_completion(id)? else {
            return Ok(None);
        };

        let plan = book.plan_ref(id);
        info!(plan = %plan, cycle, "Plan completed");
        Ok(Some(CoreEvent::PlanCompleted { plan, cycle }))
    }

    /// Acknowledge a completed plan: clear its progress and count the cycle
    pub fn finish_and_restart<B: CyclicBook>(
        &self,
        book: &mut B,
        id: &PlanId,
        now: DateTime<Local>,
    ) -> Result<RestartOutcome> {
        let outcome = book.restart(id, now)?;

        if let RestartOutcome::Restarted { cycles } = outcome {
            info!(plan = %book.plan_ref(id), cycles, "Plan restarted");
        }

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DayToggle, NewChallenge, NewHabitPlan, StaticCatalog};
    use std::sync::Arc;
    use wird_config::{BookSettings, PlanPolicy};
    use wird_store::{SqliteStore, Store};

    fn load_challenges(store: &Arc<dyn Store>) -> ChallengeBook {
        ChallengeBook::load(store.clone(), BookSettings::default(), PlanPolicy::default()).unwrap()
    }

    #[test]
    fn test_fires_once_per_cycle() {
        let store: Arc<dyn Store> = Arc::new(SqliteStore::in_memory().unwrap());
        let mut book = load_challenges(&store);
        let controller = CompletionController::new();
        let now = wird_util::now();
        let id = book
            .create_plan(NewChallenge::whole_book(2), &StaticCatalog::default(), now)
            .unwrap();

        book.toggle_day(&id, 0).unwrap();
        assert!(controller.evaluate(&mut book, &id).unwrap().is_none());

        book.toggle_day(&id, 1).unwrap();
        let event = controller.evaluate(&mut book, &id).unwrap();
        assert!(matches!(event, Some(CoreEvent::PlanCompleted { cycle: 0, .. })));
        assert!(book.get(&id).unwrap().completion_signaled);

        // Untick and re-tick the final day
        assert_eq!(book.toggle_day(&id, 1).unwrap(), DayToggle::Unchecked);
        assert!(controller.evaluate(&mut book, &id).unwrap().is_none());
        assert_eq!(book.toggle_day(&id, 1).unwrap(), DayToggle::Checked);
        assert!(controller.evaluate(&mut book, &id).unwrap().is_none());

        // A new cycle can complete again
        let outcome = controller.finish_and_restart(&mut book, &id, now).unwrap();
        assert_eq!(outcome, RestartOutcome::Restarted { cycles: 1 });
        assert!(!book.get(&id).unwrap().completion_signaled);

        book.toggle_day(&id, 0).unwrap();
        book.toggle_day(&id, 1).unwrap();
        let event = controller.evaluate(&mut book, &id).unwrap();
        assert!(matches!(event, Some(CoreEvent::PlanCompleted { cycle: 1, .. })));
    }

    #[test]
    fn test_report_survives_reload() {
        let store: Arc<dyn Store> = Arc::new(SqliteStore::in_memory().unwrap());
        let controller = CompletionController::new();
        let id = {
            let mut book = load_challenges(&store);
            let id = book
                .create_plan(
                    NewChallenge::whole_book(2),
                    &StaticCatalog::default(),
                    wird_util::now(),
                )
                .unwrap();
            book.toggle_day(&id, 0).unwrap();
            book.toggle_day(&id, 1).unwrap();
            assert!(controller.evaluate(&mut book, &id).unwrap().is_some());
            id
        };

        let mut book = load_challenges(&store);
        assert_eq!(book.toggle_day(&id, 1).unwrap(), DayToggle::Unchecked);
        assert!(controller.evaluate(&mut book, &id).unwrap().is_none());

        let mut book = load_challenges(&store);
        assert_eq!(book.toggle_day(&id, 1).unwrap(), DayToggle::Checked);
        assert!(controller.evaluate(&mut book, &id).unwrap().is_none());
    }

    #[test]
    fn test_restart_refused_when_incomplete() {
        let store: Arc<dyn Store> = Arc::new(SqliteStore::in_memory().unwrap());
        let mut book = load_challenges(&store);
        let controller = CompletionController::new();
        let now = wird_util::now();
        let id = book
            .create_plan(NewChallenge::whole_book(2), &StaticCatalog::default(), now)
            .unwrap();

        assert_eq!(
            controller.finish_and_restart(&mut book, &id, now).unwrap(),
            RestartOutcome::NotComplete
        );
        assert_eq!(book.get(&id).unwrap().cycles_completed, 0);
    }

    #[test]
    fn test_habit_plan_completes_on_last_check() {
        let store: Arc<dyn Store> = Arc::new(SqliteStore::in_memory().unwrap());
        let mut book = HabitBook::load(store, PlanPolicy::default()).unwrap();
        let controller = CompletionController::new();
        let id = book
            .create_habit_plan(
                NewHabitPlan {
                    title: "Daily".into(),
                    habits: vec!["Pray".into(), "Read".into(), "Exercise".into()],
                    duration: 3,
                },
                wird_util::now(),
            )
            .unwrap();

        let mut fired_at = Vec::new();
        let mut toggles = 0;
        for day in 0..3 {
            for habit in 0..3 {
                book.toggle_habit(&id, day, habit).unwrap();
                toggles += 1;
                if controller.evaluate(&mut book, &id).unwrap().is_some() {
                    fired_at.push(toggles);
                }
            }
        }

        assert_eq!(fired_at, vec![9]);
    }

    #[test]
    fn test_missing_plan_never_fires() {
        let store: Arc<dyn Store> = Arc::new(SqliteStore::in_memory().unwrap());
        let mut book = load_challenges(&store);

        let event = CompletionController::new()
            .evaluate(&mut book, &PlanId::new("gone"))
            .unwrap();
        assert!(event.is_none());
    }
}
