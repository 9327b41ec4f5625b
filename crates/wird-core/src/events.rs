//! Core events emitted by the engine

use std::fmt;
use wird_api::PlanRef;
use wird_util::GoalId;

use crate::StreakChange;

/// Events emitted by the progress engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreEvent {
    /// A challenge day was marked done
    DayCompleted { plan: PlanRef, day: u32 },

    /// A challenge day was unmarked
    DayReopened { plan: PlanRef, day: u32 },

    /// Completing the day was refused because the previous day is open
    DayLocked { plan: PlanRef, day: u32 },

    HabitChecked { plan: PlanRef, day: u32, habit: usize },

    HabitUnchecked { plan: PlanRef, day: u32, habit: usize },

    /// Every habit of a habit-plan day is checked
    HabitDayCompleted { plan: PlanRef, day: u32 },

    /// Whole plan completed; reported once per cycle
    PlanCompleted { plan: PlanRef, cycle: u32 },

    /// A completed plan started its next cycle
    PlanRestarted { plan: PlanRef, cycles_completed: u32 },

    /// Restart refused because the plan is not complete
    PlanNotComplete { plan: PlanRef },

    PlanDeleted { plan: PlanRef },

    GoalProgressed {
        goal: GoalId,
        completed_units: u32,
        total_units: u32,
    },

    /// The goal was already marked today
    GoalUnchanged { goal: GoalId },

    GoalCompleted { goal: GoalId },

    StreakUpdated { count: u32, change: StreakChange },

    /// The referenced record does not exist
    NotFound { plan: PlanRef },
}

impl fmt::Display for CoreEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoreEvent::DayCompleted { plan, day } => write!(f, "{}: day {} done", plan, day + 1),
            CoreEvent::DayReopened { plan, day } => {
                write!(f, "{}: day {} reopened", plan, day + 1)
            }
            CoreEvent::DayLocked { plan, day } => write!(
                f,
                "{}: day {} is locked until day {} is done",
                plan,
                day + 1,
                day
            ),
            CoreEvent::HabitChecked { plan, day, habit } => {
                write!(f, "{}: habit {} checked on day {}", plan, habit + 1, day + 1)
            }
            CoreEvent::HabitUnchecked { plan, day, habit } => {
                write!(f, "{}: habit {} unchecked on day {}", plan, habit + 1, day + 1)
            }
            CoreEvent::HabitDayCompleted { plan, day } => {
                write!(f, "{}: every habit done on day {}", plan, day + 1)
            }
            CoreEvent::PlanCompleted { plan, cycle } => {
                write!(f, "{}: plan completed (cycle {})", plan, cycle + 1)
            }
            CoreEvent::PlanRestarted {
                plan,
                cycles_completed,
            } => write!(
                f,
                "{}: restarted, {} cycle(s) completed",
                plan, cycles_completed
            ),
            CoreEvent::PlanNotComplete { plan } => {
                write!(f, "{}: not complete yet, nothing to restart", plan)
            }
            CoreEvent::PlanDeleted { plan } => write!(f, "{}: deleted", plan),
            CoreEvent::GoalProgressed {
                goal,
                completed_units,
                total_units,
            } => write!(
                f,
                "goal:{}: {}/{} pages",
                goal, completed_units, total_units
            ),
            CoreEvent::GoalUnchanged { goal } => {
                write!(f, "goal:{}: already marked today", goal)
            }
            CoreEvent::GoalCompleted { goal } => write!(f, "goal:{}: completed", goal),
            CoreEvent::StreakUpdated { count, change } => {
                write!(f, "streak: {} day(s) ({:?})", count, change)
            }
            CoreEvent::NotFound { plan } => write!(f, "{}: not found", plan),
        }
    }
}
