//! Read-only views for front ends

use chrono::{DateTime, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use wird_util::{GoalId, PlanId};

use crate::{DayRange, DayState, PlanScope};

/// One day of a reading plan as shown to the reader
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayView {
    pub index: u32,
    pub state: DayState,
    /// None when the plan has fewer units than days and this day is empty
    pub units: Option<DayRange>,
    /// "Page 5" or "Page 5 - 7"
    pub label: String,
    /// Chapter or book name
    pub subtext: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChallengeView {
    pub id: PlanId,
    pub title: String,
    pub scope: PlanScope,
    pub duration: u32,
    pub completed_days: usize,
    pub percent: u8,
    pub cycles_completed: u32,
    pub start_date: DateTime<Local>,
    pub days: Vec<DayView>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HabitDayView {
    pub index: u32,
    /// One flag per habit, in plan order
    pub checked: Vec<bool>,
    pub fully_checked: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HabitPlanView {
    pub id: PlanId,
    pub title: String,
    pub habits: Vec<String>,
    pub duration: u32,
    pub percent: u8,
    pub cycles_completed: u32,
    pub start_date: DateTime<Local>,
    pub days: Vec<HabitDayView>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoalView {
    pub id: GoalId,
    pub title: String,
    pub kind: PlanScope,
    pub completed_units: u32,
    pub total_units: u32,
    pub daily_target_units: u32,
    /// Page to continue reading from
    pub next_unit: u32,
    pub percent: u8,
    pub is_completed: bool,
    pub last_progress_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StreakView {
    pub count: u32,
    pub last_streak_date: Option<NaiveDate>,
    /// False once a full calendar day has passed without activity
    pub alive: bool,
}
