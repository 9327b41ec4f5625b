//! Persisted record shapes
//!
//! Every record is stored as an element of a JSON array under its own
//! collection key. Field names stay compatible with records written by
//! earlier releases; older shapes are normalized by the store's migration
//! step before they reach these types.

use chrono::{DateTime, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use wird_util::{ChapterId, GoalId, PlanId};

use crate::{ChapterDescriptor, DayState, PlanScope, UnitRange};

/// Day-indexed reading plan over a range of pages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengePlan {
    pub id: PlanId,

    #[serde(rename = "type")]
    pub scope: PlanScope,

    /// Display title derived at creation time
    pub title: String,

    /// Present iff scope is `SingleChapter`
    #[serde(rename = "targetSurah", default, skip_serializing_if = "Option::is_none")]
    pub chapter: Option<ChapterDescriptor>,

    /// Total material covered by the plan
    #[serde(flatten)]
    pub units: UnitRange,

    /// Number of days, fixed at creation
    pub duration: u32,

    /// Completed day indices, all in `0..duration`
    pub completed_days: BTreeSet<u32>,

    /// Creation time or time of the last restart
    pub start_date: DateTime<Local>,

    pub cycles_completed: u32,

    /// Completion of the current cycle has been reported
    #[serde(default)]
    pub completion_signaled: bool,
}

impl ChallengePlan {
    pub fn total_units(&self) -> u32 {
        self.units.total()
    }

    pub fn is_day_completed(&self, day: u32) -> bool {
        self.completed_days.contains(&day)
    }

    /// Sequential unlock rule: day 0 is always open, day N opens once
    /// day N-1 is completed.
    pub fn day_state(&self, day: u32) -> DayState {
        if self.is_day_completed(day) {
            DayState::Completed
        } else if day == 0 || self.is_day_completed(day - 1) {
            DayState::Unlocked
        } else {
            DayState::Locked
        }
    }

    /// Whether every day has been completed
    pub fn all_days_completed(&self) -> bool {
        self.completed_days.len() as u64 == self.duration as u64
    }
}

/// Multi-habit checklist repeated for a number of days
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitPlan {
    pub id: PlanId,
    pub title: String,

    /// Ordered, distinct habit labels
    pub habits: Vec<String>,

    pub duration: u32,

    /// Day index -> indices of habits checked that day
    #[serde(default)]
    pub day_progress: BTreeMap<u32, BTreeSet<usize>>,

    pub start_date: DateTime<Local>,
    pub cycles_completed: u32,

    /// Completion of the current cycle has been reported
    #[serde(default)]
    pub completion_signaled: bool,
}

impl HabitPlan {
    pub fn is_habit_checked(&self, day: u32, habit: usize) -> bool {
        self.day_progress
            .get(&day)
            .is_some_and(|set| set.contains(&habit))
    }

    /// Total habit completions across all days
    pub fn checked_count(&self) -> u64 {
        self.day_progress.values().map(|set| set.len() as u64).sum()
    }

    /// Completions needed to finish the plan
    pub fn required_count(&self) -> u64 {
        self.duration as u64 * self.habits.len() as u64
    }

    pub fn is_day_fully_checked(&self, day: u32) -> bool {
        !self.habits.is_empty()
            && self
                .day_progress
                .get(&day)
                .is_some_and(|set| set.len() == self.habits.len())
    }
}

/// Cumulative reading goal (legacy model)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub id: GoalId,

    #[serde(rename = "type")]
    pub kind: PlanScope,

    pub title: String,

    #[serde(rename = "targetId", default, skip_serializing_if = "Option::is_none")]
    pub chapter_id: Option<ChapterId>,

    #[serde(rename = "totalPages")]
    pub total_units: u32,

    /// First page of the goal's material
    #[serde(rename = "startPageNumber")]
    pub start_unit: u32,

    pub duration_days: u32,

    #[serde(rename = "dailyTargetPages")]
    pub daily_target_units: u32,

    /// Never decreases, never exceeds `total_units`
    #[serde(rename = "completedPages")]
    pub completed_units: u32,

    pub start_date: DateTime<Local>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_progress_date: Option<NaiveDate>,

    /// Mirrors `completed_units >= total_units`
    pub is_completed: bool,
}

impl Goal {
    /// Pages per day needed to finish `total_units` in `days` days
    pub fn daily_target(total_units: u32, days: u32) -> u32 {
        if days == 0 {
            return total_units;
        }
        total_units.div_ceil(days)
    }

    /// Page to continue reading from
    pub fn next_unit(&self) -> u32 {
        let last = self
            .start_unit
            .saturating_add(self.total_units.saturating_sub(1));
        self.start_unit
            .saturating_add(self.completed_units)
            .min(last)
    }

    pub fn remaining_units(&self) -> u32 {
        self.total_units.saturating_sub(self.completed_units)
    }
}

/// Process-wide daily activity streak
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakState {
    pub count: u32,
    pub last_streak_date: Option<NaiveDate>,
}
