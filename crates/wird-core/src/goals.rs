//! Cumulative reading goals
//!
//! Each goal advances by its daily target when the reader marks a day's
//! reading done, independently of the day-indexed challenges. Marking
//! progress also counts towards the global streak.

use chrono::{DateTime, Local, NaiveDate};
use std::sync::Arc;
use tracing::{debug, info};
use wird_api::{Goal, GoalView, PlanScope};
use wird_config::BookSettings;
use wird_store::{RecordStore, Store};
use wird_util::{ChapterId, GoalId, Result, WirdError};

use crate::{ChapterCatalog, ProgressPlan, Removal, StreakChange, StreakTracker};

/// Request to create a goal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewGoal {
    pub scope: PlanScope,
    /// Required iff scope is `SingleChapter`
    pub chapter: Option<ChapterId>,
    pub duration_days: u32,
}

/// Effect of marking a day's reading on one goal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GoalProgress {
    Advanced {
        completed_units: u32,
        total_units: u32,
        /// This call finished the goal
        completed_now: bool,
    },
    /// The goal was already marked today, ledger unchanged
    AlreadyMarkedToday,
}

/// Result of `mark_daily_progress`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DailyProgress {
    Marked {
        goal: GoalProgress,
        streak: StreakChange,
    },
    /// No such goal, neither the goal nor the streak changed
    NotFound,
}

/// The collection of cumulative goals
pub struct GoalLedger {
    store: Arc<dyn Store>,
    book: BookSettings,
    goals: Vec<Goal>,
}

impl GoalLedger {
    pub fn load(store: Arc<dyn Store>, book: BookSettings) -> Result<Self> {
        let goals = store.load_goals()?;
        info!(count = goals.len(), "Goals loaded");
        Ok(Self { store, book, goals })
    }

    pub fn goals(&self) -> &[Goal] {
        &self.goals
    }

    /// Goals not yet completed
    pub fn active_goals(&self) -> Vec<&Goal> {
        self.goals.iter().filter(|g| !g.is_completed).collect()
    }

    pub fn get(&self, id: &GoalId) -> Option<&Goal> {
        self.goals.iter().find(|g| &g.id == id)
    }

    pub fn add_goal(
        &mut self,
        request: NewGoal,
        catalog: &dyn ChapterCatalog,
        now: DateTime<Local>,
    ) -> Result<GoalId> {
        if request.duration_days == 0 {
            return Err(WirdError::validation("duration must be at least one day"));
        }

        let (title, chapter_id, units) = match (request.scope, request.chapter) {
            (PlanScope::WholeBook, None) => (self.book.title.clone(), None, self.book.units),
            (PlanScope::WholeBook, Some(_)) => {
                return Err(WirdError::validation(
                    "a whole-book goal cannot target a chapter",
                ));
            }
            (PlanScope::SingleChapter, None) => {
                return Err(WirdError::validation("a single-chapter goal needs a chapter"));
            }
            (PlanScope::SingleChapter, Some(id)) => {
                let chapter = catalog.chapter(id).ok_or(WirdError::ChapterNotFound(id))?;
                (
                    self.book.chapter_title(&chapter.name),
                    Some(chapter.id),
                    chapter.unit_range(),
                )
            }
        };

        let total_units = units.total();
        if total_units == 0 {
            return Err(WirdError::validation("goal covers no pages"));
        }

        let goal = Goal {
            id: GoalId::generate(),
            kind: request.scope,
            title,
            chapter_id,
            total_units,
            start_unit: units.start,
            duration_days: request.duration_days,
            daily_target_units: Goal::daily_target(total_units, request.duration_days),
            completed_units: 0,
            start_date: now,
            last_progress_date: None,
            is_completed: false,
        };
        let id = goal.id.clone();

        let mut goals = self.goals.clone();
        goals.push(goal);
        self.commit(goals)?;

        info!(goal_id = %id, total_units, "Goal added");
        Ok(id)
    }

    /// Remove a goal. The streak is not affected.
    pub fn delete_goal(&mut self, id: &GoalId) -> Result<Removal> {
        if self.get(id).is_none() {
            return Ok(Removal::NotFound);
        }

        let goals = self.goals.iter().filter(|g| &g.id != id).cloned().collect();
        self.commit(goals)?;

        info!(goal_id = %id, "Goal deleted");
        Ok(Removal::Removed)
    }

    /// Advance the goal by its daily target and record activity on the
    /// global streak. Both changes are saved in one batch; if the save
    /// fails neither the goal nor the streak moves.
    pub fn mark_daily_progress(
        &mut self,
        id: &GoalId,
        today: NaiveDate,
        streak: &mut StreakTracker,
    ) -> Result<DailyProgress> {
        let Some(index) = self.goals.iter().position(|g| &g.id == id) else {
            return Ok(DailyProgress::NotFound);
        };

        let (goals, goal_progress) = if self.goals[index].last_progress_date == Some(today) {
            debug!(goal_id = %id, "Goal already marked today");
            (None, GoalProgress::AlreadyMarkedToday)
        } else {
            let mut goals = self.goals.clone();
            let goal = &mut goals[index];
            let was_completed = goal.is_completed;

            goal.completed_units = goal
                .completed_units
                .saturating_add(goal.daily_target_units)
                .min(goal.total_units);
            goal.last_progress_date = Some(today);
            goal.is_completed = goal.is_complete();

            let progress = GoalProgress::Advanced {
                completed_units: goal.completed_units,
                total_units: goal.total_units,
                completed_now: goal.is_completed && !was_completed,
            };
            (Some(goals), progress)
        };

        let (next_streak, streak_change) = streak.preview(today);
        let streak_write = (streak_change != StreakChange::Unchanged).then_some(&next_streak);

        self.store
            .save_daily_progress(goals.as_deref(), streak_write)?;

        if let Some(goals) = goals {
            self.goals = goals;
            debug!(goal_id = %id, progress = ?goal_progress, "Goal advanced");
        }
        if streak_change != StreakChange::Unchanged {
            streak.accept(next_streak, streak_change);
        }

        Ok(DailyProgress::Marked {
            goal: goal_progress,
            streak: streak_change,
        })
    }

    pub fn view(&self, id: &GoalId) -> Option<GoalView> {
        self.get(id).map(build_view)
    }

    /// Views of all goals, completed ones included
    pub fn views(&self) -> Vec<GoalView> {
        self.goals.iter().map(build_view).collect()
    }

    fn commit(&mut self, goals: Vec<Goal>) -> Result<()> {
        self.store.save_goals(&goals)?;
        self.goals = goals;
        Ok(())
    }
}

fn build_view(goal: &Goal) -> GoalView {
    GoalView {
        id: goal.id.clone(),
        title: goal.title.clone(),
        kind: goal.kind,
        completed_units: goal.completed_units,
        total_units: goal.total_units,
        daily_target_units: goal.daily_target_units,
        next_unit: goal.next_unit(),
        percent: goal.percent(),
        is_completed: goal.is_completed,
        last_progress_date: goal.last_progress_date,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StaticCatalog;
    use std::sync::Mutex;
    use wird_api::{ChapterDescriptor, StreakState};
    use wird_store::{STREAK_DATE_KEY, SqliteStore, StoreError, StoreResult, StoreWrite};

    /// Store that refuses any write touching one chosen key
    struct RefusingStore {
        inner: SqliteStore,
        refused: Mutex<Option<&'static str>>,
    }

    impl RefusingStore {
        fn new() -> Self {
            Self {
                inner: SqliteStore::in_memory().unwrap(),
                refused: Mutex::new(None),
            }
        }

        fn refuse(&self, key: Option<&'static str>) {
            *self.refused.lock().unwrap() = key;
        }

        fn check(&self, key: &str) -> StoreResult<()> {
            match *self.refused.lock().unwrap() {
                Some(refused) if refused == key => {
                    Err(StoreError::Database(format!("write to {} refused", key)))
                }
                _ => Ok(()),
            }
        }
    }

    impl Store for RefusingStore {
        fn get(&self, key: &str) -> StoreResult<Option<String>> {
            self.inner.get(key)
        }

        fn put(&self, key: &str, value: &str) -> StoreResult<()> {
            self.check(key)?;
            self.inner.put(key, value)
        }

        fn remove(&self, key: &str) -> StoreResult<()> {
            self.check(key)?;
            self.inner.remove(key)
        }

        fn apply(&self, writes: &[StoreWrite]) -> StoreResult<()> {
            for write in writes {
                self.check(write.key())?;
            }
            self.inner.apply(writes)
        }

        fn is_healthy(&self) -> bool {
            self.inner.is_healthy()
        }
    }

    struct Fixture {
        store: Arc<dyn Store>,
        ledger: GoalLedger,
        streak: StreakTracker,
        catalog: StaticCatalog,
    }

    fn fixture() -> Fixture {
        let store: Arc<dyn Store> = Arc::new(SqliteStore::in_memory().unwrap());
        Fixture {
            ledger: GoalLedger::load(store.clone(), BookSettings::default()).unwrap(),
            streak: StreakTracker::load(store.clone()).unwrap(),
            catalog: StaticCatalog::new([ChapterDescriptor::new(18u32, "Al-Kahf", 293, 304)]),
            store,
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 4, d).unwrap()
    }

    fn whole_book(days: u32) -> NewGoal {
        NewGoal {
            scope: PlanScope::WholeBook,
            chapter: None,
            duration_days: days,
        }
    }

    #[test]
    fn test_add_goal_derives_target() {
        let mut f = fixture();
        let id = f
            .ledger
            .add_goal(whole_book(30), &f.catalog, wird_util::now())
            .unwrap();

        let goal = f.ledger.get(&id).unwrap();
        assert_eq!(goal.total_units, 604);
        assert_eq!(goal.daily_target_units, 21);
        assert_eq!(goal.start_unit, 1);

        let chapter = NewGoal {
            scope: PlanScope::SingleChapter,
            chapter: Some(ChapterId::new(18)),
            duration_days: 7,
        };
        let id = f.ledger.add_goal(chapter, &f.catalog, wird_util::now()).unwrap();
        let goal = f.ledger.get(&id).unwrap();
        assert_eq!(goal.title, "Surat Al-Kahf");
        assert_eq!(goal.daily_target_units, 2);
        assert_eq!(goal.next_unit(), 293);
    }

    #[test]
    fn test_add_goal_validation() {
        let mut f = fixture();
        assert!(
            f.ledger
                .add_goal(whole_book(0), &f.catalog, wird_util::now())
                .unwrap_err()
                .is_validation()
        );
        assert!(f.ledger.goals().is_empty());
    }

    #[test]
    fn test_mark_progress_is_idempotent_per_day() {
        let mut f = fixture();
        let id = f
            .ledger
            .add_goal(whole_book(30), &f.catalog, wird_util::now())
            .unwrap();

        let first = f.ledger.mark_daily_progress(&id, day(1), &mut f.streak).unwrap();
        assert_eq!(
            first,
            DailyProgress::Marked {
                goal: GoalProgress::Advanced {
                    completed_units: 21,
                    total_units: 604,
                    completed_now: false,
                },
                streak: StreakChange::Started,
            }
        );

        let second = f.ledger.mark_daily_progress(&id, day(1), &mut f.streak).unwrap();
        assert_eq!(
            second,
            DailyProgress::Marked {
                goal: GoalProgress::AlreadyMarkedToday,
                streak: StreakChange::Unchanged,
            }
        );
        assert_eq!(f.ledger.get(&id).unwrap().completed_units, 21);
        assert_eq!(f.streak.state().count, 1);
    }

    #[test]
    fn test_streak_is_shared_across_goals() {
        let mut f = fixture();
        let a = f
            .ledger
            .add_goal(whole_book(30), &f.catalog, wird_util::now())
            .unwrap();
        let b = f
            .ledger
            .add_goal(whole_book(10), &f.catalog, wird_util::now())
            .unwrap();

        f.ledger.mark_daily_progress(&a, day(1), &mut f.streak).unwrap();
        let other = f.ledger.mark_daily_progress(&b, day(1), &mut f.streak).unwrap();

        assert!(matches!(
            other,
            DailyProgress::Marked {
                goal: GoalProgress::Advanced { .. },
                streak: StreakChange::Unchanged,
            }
        ));
        assert_eq!(f.streak.state().count, 1);
    }

    #[test]
    fn test_progress_caps_at_total() {
        let mut f = fixture();
        let id = f
            .ledger
            .add_goal(whole_book(3), &f.catalog, wird_util::now())
            .unwrap();

        for d in 1..=3 {
            f.ledger.mark_daily_progress(&id, day(d), &mut f.streak).unwrap();
        }
        let goal = f.ledger.get(&id).unwrap();
        assert_eq!(goal.completed_units, 604);
        assert!(goal.is_completed);
        assert!(f.ledger.active_goals().is_empty());
        assert_eq!(f.streak.state().count, 3);

        let again = f.ledger.mark_daily_progress(&id, day(4), &mut f.streak).unwrap();
        assert!(matches!(
            again,
            DailyProgress::Marked {
                goal: GoalProgress::Advanced {
                    completed_units: 604,
                    completed_now: false,
                    ..
                },
                ..
            }
        ));
    }

    #[test]
    fn test_missing_goal_is_noop() {
        let mut f = fixture();
        let outcome = f
            .ledger
            .mark_daily_progress(&GoalId::new("gone"), day(1), &mut f.streak)
            .unwrap();

        assert_eq!(outcome, DailyProgress::NotFound);
        assert_eq!(f.streak.state().count, 0);
        assert_eq!(f.ledger.delete_goal(&GoalId::new("gone")).unwrap(), Removal::NotFound);
    }

    #[test]
    fn test_delete_keeps_streak_and_persists() {
        let mut f = fixture();
        let id = f
            .ledger
            .add_goal(whole_book(30), &f.catalog, wird_util::now())
            .unwrap();
        f.ledger.mark_daily_progress(&id, day(1), &mut f.streak).unwrap();

        assert_eq!(f.ledger.delete_goal(&id).unwrap(), Removal::Removed);
        assert_eq!(f.streak.state().count, 1);

        let reloaded = GoalLedger::load(f.store.clone(), BookSettings::default()).unwrap();
        assert!(reloaded.goals().is_empty());
    }

    #[test]
    fn test_failed_save_moves_neither_goal_nor_streak() {
        let refusing = Arc::new(RefusingStore::new());
        let store: Arc<dyn Store> = refusing.clone();
        let catalog = StaticCatalog::default();
        let mut ledger = GoalLedger::load(store.clone(), BookSettings::default()).unwrap();
        let mut streak = StreakTracker::load(store.clone()).unwrap();

        let id = ledger
            .add_goal(whole_book(30), &catalog, wird_util::now())
            .unwrap();
        ledger.mark_daily_progress(&id, day(1), &mut streak).unwrap();

        refusing.refuse(Some(STREAK_DATE_KEY));
        assert!(ledger.mark_daily_progress(&id, day(2), &mut streak).is_err());

        // Memory and storage both still describe day 1
        let day_one = StreakState {
            count: 1,
            last_streak_date: Some(day(1)),
        };
        assert_eq!(ledger.get(&id).unwrap().completed_units, 21);
        assert_eq!(streak.state(), day_one);
        assert_eq!(store.load_streak().unwrap(), day_one);
        assert_eq!(store.load_goals().unwrap()[0].completed_units, 21);

        // Retrying once the store recovers counts day 2 exactly once
        refusing.refuse(None);
        let mut ledger = GoalLedger::load(store.clone(), BookSettings::default()).unwrap();
        let mut streak = StreakTracker::load(store.clone()).unwrap();
        ledger.mark_daily_progress(&id, day(2), &mut streak).unwrap();
        ledger.mark_daily_progress(&id, day(2), &mut streak).unwrap();

        assert_eq!(streak.state().count, 2);
        assert_eq!(store.load_streak().unwrap().count, 2);
        assert_eq!(ledger.get(&id).unwrap().completed_units, 42);
    }
}
