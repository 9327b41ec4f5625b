//! Habit checklists repeated over a number of days

use chrono::{DateTime, Local};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::Arc;
use tracing::{debug, info};
use wird_api::{HabitDayView, HabitPlan, HabitPlanView};
use wird_config::PlanPolicy;
use wird_store::{RecordStore, Store};
use wird_util::{PlanId, Result, WirdError};

use crate::collection::PlanCollection;
use crate::{ProgressPlan, Removal, RestartOutcome};

/// Request to create a habit plan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewHabitPlan {
    pub title: String,
    pub habits: Vec<String>,
    pub duration: u32,
}

/// Result of toggling one habit on one day
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HabitToggle {
    Checked,
    Unchecked,
    NotFound,
}

/// The collection of habit plans
pub struct HabitBook {
    plans: PlanCollection<HabitPlan>,
    policy: PlanPolicy,
}

impl HabitBook {
    pub fn load(store: Arc<dyn Store>, policy: PlanPolicy) -> Result<Self> {
        let plans = store.load_habit_plans()?;
        info!(count = plans.len(), "Habit plans loaded");

        Ok(Self {
            plans: PlanCollection::new(store, plans, |store, plans| {
                store.save_habit_plans(plans)
            }),
            policy,
        })
    }

    pub fn plans(&self) -> &[HabitPlan] {
        self.plans.plans()
    }

    pub fn get(&self, id: &PlanId) -> Option<&HabitPlan> {
        self.plans.get(id)
    }

    /// Create a plan and return its id. Title and habit labels are trimmed;
    /// an empty title, an empty or blank habit, or a repeated habit is
    /// rejected.
    pub fn create_habit_plan(
        &mut self,
        request: NewHabitPlan,
        now: DateTime<Local>,
    ) -> Result<PlanId> {
        let title = request.title.trim().to_string();
        if title.is_empty() {
            return Err(WirdError::validation("title cannot be empty"));
        }
        if request.habits.is_empty() {
            return Err(WirdError::validation("at least one habit is required"));
        }
        if request.duration == 0 {
            return Err(WirdError::validation("duration must be at least one day"));
        }

        let habits: Vec<String> = request
            .habits
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let mut seen = HashSet::new();
        for habit in &habits {
            if habit.is_empty() {
                return Err(WirdError::validation("habit names cannot be empty"));
            }
            if !seen.insert(habit.as_str()) {
                return Err(WirdError::validation(format!("duplicate habit: {}", habit)));
            }
        }

        let plan = HabitPlan {
            id: PlanId::generate(),
            title,
            habits,
            duration: request.duration,
            day_progress: BTreeMap::new(),
            start_date: now,
            cycles_completed: 0,
            completion_signaled: false,
        };
        let id = plan.id.clone();

        self.plans.insert(plan)?;
        info!(plan_id = %id, duration = request.duration, "Habit plan created");
        Ok(id)
    }

    /// Flip `habit` on `day`. Days are independent; there is no lock.
    pub fn toggle_habit(&mut self, id: &PlanId, day: u32, habit: usize) -> Result<HabitToggle> {
        let Some(plan) = self.plans.get(id) else {
            return Ok(HabitToggle::NotFound);
        };

        if day >= plan.duration {
            return Err(WirdError::DayOutOfRange {
                day,
                duration: plan.duration,
            });
        }
        if habit >= plan.habits.len() {
            return Err(WirdError::HabitOutOfRange {
                habit,
                count: plan.habits.len(),
            });
        }

        let outcome = self.plans.modify(id, |plan| {
            let checked = plan.day_progress.entry(day).or_insert_with(BTreeSet::new);
            let outcome = if checked.remove(&habit) {
                HabitToggle::Unchecked
            } else {
                checked.insert(habit);
                HabitToggle::Checked
            };
            if checked.is_empty() {
                plan.day_progress.remove(&day);
            }
            outcome
        })?;

        let outcome = outcome.unwrap_or(HabitToggle::NotFound);
        debug!(plan_id = %id, day, habit, outcome = ?outcome, "Habit toggled");
        Ok(outcome)
    }

    pub fn delete_habit_plan(&mut self, id: &PlanId) -> Result<Removal> {
        let removal = self.plans.remove(id)?;
        if removal == Removal::Removed {
            info!(plan_id = %id, "Habit plan deleted");
        }
        Ok(removal)
    }

    /// Record that the current cycle's completion was reported. `None`
    /// unless the plan is complete and not yet reported.
    pub fn signal_completion(&mut self, id: &PlanId) -> Result<Option<u32>> {
        self.plans.signal_completion(id)
    }

    /// Start a new cycle of a completed plan
    pub fn restart(&mut self, id: &PlanId, now: DateTime<Local>) -> Result<RestartOutcome> {
        self.plans
            .restart(id, now, self.policy.restart_resets_start_date)
    }

    pub fn view(&self, id: &PlanId) -> Option<HabitPlanView> {
        self.get(id).map(build_view)
    }

    pub fn views(&self) -> Vec<HabitPlanView> {
        self.plans().iter().map(build_view).collect()
    }
}

fn build_view(plan: &HabitPlan) -> HabitPlanView {
    let days = (0..plan.duration)
        .map(|day| HabitDayView {
            index: day,
            checked: (0..plan.habits.len())
                .map(|habit| plan.is_habit_checked(day, habit))
                .collect(),
            fully_checked: plan.is_day_fully_checked(day),
        })
        .collect();

    HabitPlanView {
        id: plan.id.clone(),
        title: plan.title.clone(),
        habits: plan.habits.clone(),
        duration: plan.duration,
        percent: plan.percent(),
        cycles_completed: plan.cycles_completed,
        start_date: plan.start_date,
        days,
    }
}
