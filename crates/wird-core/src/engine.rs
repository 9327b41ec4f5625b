//! Progress engine facade

use chrono::{DateTime, Local, NaiveDate};
use std::sync::Arc;
use tracing::info;
use wird_api::{ChallengeView, GoalView, HabitPlanView, PlanRef, StreakView};
use wird_config::Settings;
use wird_store::Store;
use wird_util::{GoalId, PlanId, Result};

use crate::{
    ChallengeBook, ChapterCatalog, CompletionController, CoreEvent, DailyProgress, DayToggle,
    GoalLedger, GoalProgress, HabitBook, HabitToggle, NewChallenge, NewGoal, NewHabitPlan,
    Removal, RestartOutcome, StreakChange, StreakTracker,
};

/// Wires the plan books, the goal ledger, the streak and completion
/// detection over one store. Front ends talk to this type only.
pub struct ProgressEngine {
    settings: Settings,
    catalog: Arc<dyn ChapterCatalog>,
    challenges: ChallengeBook,
    habits: HabitBook,
    goals: GoalLedger,
    streak: StreakTracker,
    completion: CompletionController,
}

impl ProgressEngine {
    /// Load all persisted state
    pub fn new(
        store: Arc<dyn Store>,
        settings: Settings,
        catalog: Arc<dyn ChapterCatalog>,
    ) -> Result<Self> {
        let challenges =
            ChallengeBook::load(store.clone(), settings.book.clone(), settings.plans)?;
        let habits = HabitBook::load(store.clone(), settings.plans)?;
        let goals = GoalLedger::load(store.clone(), settings.book.clone())?;
        let streak = StreakTracker::load(store)?;

        info!(
            challenges = challenges.plans().len(),
            habit_plans = habits.plans().len(),
            goals = goals.goals().len(),
            streak = streak.state().count,
            "Progress engine initialized"
        );

        Ok(Self {
            settings,
            catalog,
            challenges,
            habits,
            goals,
            streak,
            completion: CompletionController::new(),
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn catalog(&self) -> &dyn ChapterCatalog {
        self.catalog.as_ref()
    }

    pub fn challenges(&self) -> &ChallengeBook {
        &self.challenges
    }

    pub fn habits(&self) -> &HabitBook {
        &self.habits
    }

    pub fn goals(&self) -> &GoalLedger {
        &self.goals
    }

    pub fn streak(&self) -> &StreakTracker {
        &self.streak
    }

    // Reading challenges

    pub fn create_challenge(
        &mut self,
        request: NewChallenge,
        now: DateTime<Local>,
    ) -> Result<PlanId> {
        self.challenges
            .create_plan(request, self.catalog.as_ref(), now)
    }

    pub fn toggle_challenge_day(&mut self, id: &PlanId, day: u32) -> Result<Vec<CoreEvent>> {
        let plan = PlanRef::Challenge(id.clone());
        let mut events = Vec::new();

        match self.challenges.toggle_day(id, day)? {
            DayToggle::Checked => {
                events.push(CoreEvent::DayCompleted {
                    plan: plan.clone(),
                    day,
                });
                if let Some(event) = self.completion.evaluate(&mut self.challenges, id)? {
                    events.push(event);
                }
            }
            DayToggle::Unchecked => events.push(CoreEvent::DayReopened { plan, day }),
            DayToggle::Locked => events.push(CoreEvent::DayLocked { plan, day }),
            DayToggle::NotFound => events.push(CoreEvent::NotFound { plan }),
        }

        Ok(events)
    }

    /// Acknowledge a completed challenge and start its next cycle
    pub fn finish_challenge(&mut self, id: &PlanId, now: DateTime<Local>) -> Result<Vec<CoreEvent>> {
        let outcome = self
            .completion
            .finish_and_restart(&mut self.challenges, id, now)?;
        Ok(vec![restart_event(PlanRef::Challenge(id.clone()), outcome)])
    }

    pub fn delete_challenge(&mut self, id: &PlanId) -> Result<Vec<CoreEvent>> {
        let plan = PlanRef::Challenge(id.clone());
        let removal = self.challenges.delete_plan(id)?;
        Ok(vec![removal_event(plan, removal)])
    }

    pub fn challenge_view(&self, id: &PlanId) -> Option<ChallengeView> {
        self.challenges.view(id)
    }

    pub fn challenge_views(&self) -> Vec<ChallengeView> {
        self.challenges.views()
    }

    // Habit plans

    pub fn create_habit_plan(
        &mut self,
        request: NewHabitPlan,
        now: DateTime<Local>,
    ) -> Result<PlanId> {
        self.habits.create_habit_plan(request, now)
    }

    pub fn toggle_habit(&mut self, id: &PlanId, day: u32, habit: usize) -> Result<Vec<CoreEvent>> {
        let plan = PlanRef::Habit(id.clone());
        let mut events = Vec::new();

        match self.habits.toggle_habit(id, day, habit)? {
            HabitToggle::Checked => {
                events.push(CoreEvent::HabitChecked {
                    plan: plan.clone(),
                    day,
                    habit,
                });
                if self
                    .habits
                    .get(id)
                    .is_some_and(|habit_plan| habit_plan.is_day_fully_checked(day))
                {
                    events.push(CoreEvent::HabitDayCompleted { plan, day });
                }
                if let Some(event) = self.completion.evaluate(&mut self.habits, id)? {
                    events.push(event);
                }
            }
            HabitToggle::Unchecked => events.push(CoreEvent::HabitUnchecked { plan, day, habit }),
            HabitToggle::NotFound => events.push(CoreEvent::NotFound { plan }),
        }

        Ok(events)
    }

    /// Acknowledge a completed habit plan and start its next cycle
    pub fn finish_habit_plan(&mut self, id: &PlanId, now: DateTime<Local>) -> Result<Vec<CoreEvent>> {
        let outcome = self
            .completion
            .finish_and_restart(&mut self.habits, id, now)?;
        Ok(vec![restart_event(PlanRef::Habit(id.clone()), outcome)])
    }

    pub fn delete_habit_plan(&mut self, id: &PlanId) -> Result<Vec<CoreEvent>> {
        let plan = PlanRef::Habit(id.clone());
        let removal = self.habits.delete_habit_plan(id)?;
        Ok(vec![removal_event(plan, removal)])
    }

    pub fn habit_view(&self, id: &PlanId) -> Option<HabitPlanView> {
        self.habits.view(id)
    }

    pub fn habit_views(&self) -> Vec<HabitPlanView> {
        self.habits.views()
    }

    // Goals and streak

    pub fn add_goal(&mut self, request: NewGoal, now: DateTime<Local>) -> Result<GoalId> {
        self.goals.add_goal(request, self.catalog.as_ref(), now)
    }

    pub fn mark_daily_progress(&mut self, id: &GoalId, today: NaiveDate) -> Result<Vec<CoreEvent>> {
        let outcome = self
            .goals
            .mark_daily_progress(id, today, &mut self.streak)?;

        let (goal, streak) = match outcome {
            DailyProgress::Marked { goal, streak } => (goal, streak),
            DailyProgress::NotFound => {
                return Ok(vec![CoreEvent::NotFound {
                    plan: PlanRef::Goal(id.clone()),
                }]);
            }
        };

        let mut events = Vec::new();
        match goal {
            GoalProgress::Advanced {
                completed_units,
                total_units,
                completed_now,
            } => {
                events.push(CoreEvent::GoalProgressed {
                    goal: id.clone(),
                    completed_units,
                    total_units,
                });
                if completed_now {
                    events.push(CoreEvent::GoalCompleted { goal: id.clone() });
                }
            }
            GoalProgress::AlreadyMarkedToday => {
                events.push(CoreEvent::GoalUnchanged { goal: id.clone() });
            }
        }

        if streak != StreakChange::Unchanged {
            events.push(CoreEvent::StreakUpdated {
                count: self.streak.state().count,
                change: streak,
            });
        }

        Ok(events)
    }

    pub fn delete_goal(&mut self, id: &GoalId) -> Result<Vec<CoreEvent>> {
        let plan = PlanRef::Goal(id.clone());
        let removal = self.goals.delete_goal(id)?;
        Ok(vec![removal_event(plan, removal)])
    }

    pub fn goal_view(&self, id: &GoalId) -> Option<GoalView> {
        self.goals.view(id)
    }

    /// Views of goals still in progress
    pub fn active_goal_views(&self) -> Vec<GoalView> {
        self.goals
            .active_goals()
            .into_iter()
            .filter_map(|goal| self.goals.view(&goal.id))
            .collect()
    }

    pub fn streak_view(&self, today: NaiveDate) -> StreakView {
        self.streak.view(today)
    }
}

fn removal_event(plan: PlanRef, removal: Removal) -> CoreEvent {
    match removal {
        Removal::Removed => CoreEvent::PlanDeleted { plan },
        Removal::NotFound => CoreEvent::NotFound { plan },
    }
}

fn restart_event(plan: PlanRef, outcome: RestartOutcome) -> CoreEvent {
    match outcome {
        RestartOutcome::Restarted { cycles } => CoreEvent::PlanRestarted {
            plan,
            cycles_completed: cycles,
        },
        RestartOutcome::NotComplete => CoreEvent::PlanNotComplete { plan },
        RestartOutcome::NotFound => CoreEvent::NotFound { plan },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StaticCatalog;
    use wird_api::ChapterDescriptor;
    use wird_store::SqliteStore;

    fn make_engine() -> ProgressEngine {
        engine_over(Arc::new(SqliteStore::in_memory().unwrap()))
    }

    fn engine_over(store: Arc<dyn Store>) -> ProgressEngine {
        let catalog = Arc::new(StaticCatalog::new([ChapterDescriptor::new(
            18u32, "Al-Kahf", 293, 304,
        )]));
        ProgressEngine::new(store, Settings::default(), catalog).unwrap()
    }

    fn completed(events: &[CoreEvent]) -> bool {
        events
            .iter()
            .any(|e| matches!(e, CoreEvent::PlanCompleted { .. }))
    }

    #[test]
    fn test_toggle_emits_completion_once() {
        let mut engine = make_engine();
        let now = wird_util::now();
        let id = engine
            .create_challenge(NewChallenge::chapter(18u32, 2), now)
            .unwrap();

        let events = engine.toggle_challenge_day(&id, 1).unwrap();
        assert!(matches!(events[..], [CoreEvent::DayLocked { day: 1, .. }]));

        engine.toggle_challenge_day(&id, 0).unwrap();
        let events = engine.toggle_challenge_day(&id, 1).unwrap();
        assert_eq!(events.len(), 2);
        assert!(matches!(events[1], CoreEvent::PlanCompleted { cycle: 0, .. }));

        engine.toggle_challenge_day(&id, 1).unwrap();
        let events = engine.toggle_challenge_day(&id, 1).unwrap();
        assert_eq!(events.len(), 1);

        let events = engine.finish_challenge(&id, now).unwrap();
        assert!(matches!(
            events[..],
            [CoreEvent::PlanRestarted { cycles_completed: 1, .. }]
        ));
    }

    #[test]
    fn test_completion_not_repeated_after_reload() {
        let store: Arc<dyn Store> = Arc::new(SqliteStore::in_memory().unwrap());
        let id = {
            let mut engine = engine_over(store.clone());
            let id = engine
                .create_challenge(NewChallenge::whole_book(2), wird_util::now())
                .unwrap();
            engine.toggle_challenge_day(&id, 0).unwrap();
            assert!(completed(&engine.toggle_challenge_day(&id, 1).unwrap()));
            id
        };

        let mut engine = engine_over(store.clone());
        let events = engine.toggle_challenge_day(&id, 1).unwrap();
        assert!(matches!(events[..], [CoreEvent::DayReopened { day: 1, .. }]));

        let mut engine = engine_over(store.clone());
        let events = engine.toggle_challenge_day(&id, 1).unwrap();
        assert!(!completed(&events));

        // Restarting in another process arms the signal again
        let mut engine = engine_over(store.clone());
        engine.finish_challenge(&id, wird_util::now()).unwrap();
        let mut engine = engine_over(store);
        engine.toggle_challenge_day(&id, 0).unwrap();
        let events = engine.toggle_challenge_day(&id, 1).unwrap();
        assert!(events.contains(&CoreEvent::PlanCompleted {
            plan: PlanRef::Challenge(id.clone()),
            cycle: 1,
        }));
    }

    #[test]
    fn test_habit_completion_not_repeated_after_reload() {
        let store: Arc<dyn Store> = Arc::new(SqliteStore::in_memory().unwrap());
        let id = {
            let mut engine = engine_over(store.clone());
            let id = engine
                .create_habit_plan(
                    NewHabitPlan {
                        title: "Daily".into(),
                        habits: vec!["Pray".into()],
                        duration: 1,
                    },
                    wird_util::now(),
                )
                .unwrap();
            assert!(completed(&engine.toggle_habit(&id, 0, 0).unwrap()));
            id
        };

        engine_over(store.clone()).toggle_habit(&id, 0, 0).unwrap();
        let events = engine_over(store).toggle_habit(&id, 0, 0).unwrap();
        assert!(!completed(&events));
        assert!(events.contains(&CoreEvent::HabitDayCompleted {
            plan: PlanRef::Habit(id.clone()),
            day: 0,
        }));
    }

    #[test]
    fn test_habit_day_signal() {
        let mut engine = make_engine();
        let id = engine
            .create_habit_plan(
                NewHabitPlan {
                    title: "Daily".into(),
                    habits: vec!["Pray".into(), "Read".into()],
                    duration: 2,
                },
                wird_util::now(),
            )
            .unwrap();

        let events = engine.toggle_habit(&id, 0, 0).unwrap();
        assert_eq!(events.len(), 1);

        let events = engine.toggle_habit(&id, 0, 1).unwrap();
        assert!(matches!(events[1], CoreEvent::HabitDayCompleted { day: 0, .. }));
        assert_eq!(events.len(), 2);
    }

    #[test]
    fn test_missing_ids_report_not_found() {
        let mut engine = make_engine();
        let gone = PlanId::new("gone");

        for events in [
            engine.toggle_challenge_day(&gone, 0).unwrap(),
            engine.toggle_habit(&gone, 0, 0).unwrap(),
            engine.delete_challenge(&gone).unwrap(),
            engine.finish_habit_plan(&gone, wird_util::now()).unwrap(),
            engine
                .mark_daily_progress(&GoalId::new("gone"), wird_util::today())
                .unwrap(),
        ] {
            assert!(matches!(events[..], [CoreEvent::NotFound { .. }]));
        }
    }

    #[test]
    fn test_goal_events() {
        let mut engine = make_engine();
        let id = engine
            .add_goal(
                NewGoal {
                    scope: wird_api::PlanScope::SingleChapter,
                    chapter: Some(18u32.into()),
                    duration_days: 1,
                },
                wird_util::now(),
            )
            .unwrap();

        let today = NaiveDate::from_ymd_opt(2025, 5, 1).unwrap();
        let events = engine.mark_daily_progress(&id, today).unwrap();
        assert_eq!(
            events,
            vec![
                CoreEvent::GoalProgressed {
                    goal: id.clone(),
                    completed_units: 12,
                    total_units: 12,
                },
                CoreEvent::GoalCompleted { goal: id.clone() },
                CoreEvent::StreakUpdated {
                    count: 1,
                    change: StreakChange::Started,
                },
            ]
        );
        assert!(engine.active_goal_views().is_empty());
        assert!(engine.goal_view(&id).unwrap().is_completed);
    }
}
