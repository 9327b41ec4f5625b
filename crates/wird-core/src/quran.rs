//! Reading challenges over the book or a single chapter

use chrono::{DateTime, Local};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, info};
use wird_api::{ChallengePlan, ChallengeView, DayState, DayView, PlanScope};
use wird_config::{BookSettings, PlanPolicy};
use wird_store::{RecordStore, Store};
use wird_util::{ChapterId, PlanId, Result, WirdError};

use crate::collection::PlanCollection;
use crate::{ChapterCatalog, ProgressPlan, Removal, RestartOutcome, describe_day};

/// Request to create a reading challenge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewChallenge {
    pub scope: PlanScope,
    /// Required iff scope is `SingleChapter`
    pub chapter: Option<ChapterId>,
    pub duration: u32,
}

impl NewChallenge {
    pub fn whole_book(duration: u32) -> Self {
        Self {
            scope: PlanScope::WholeBook,
            chapter: None,
            duration,
        }
    }

    pub fn chapter(chapter: impl Into<ChapterId>, duration: u32) -> Self {
        Self {
            scope: PlanScope::SingleChapter,
            chapter: Some(chapter.into()),
            duration,
        }
    }
}

/// Result of toggling a challenge day
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayToggle {
    /// Day is now completed
    Checked,
    /// Day is no longer completed
    Unchecked,
    /// Previous day not completed, nothing changed
    Locked,
    NotFound,
}

/// The collection of reading challenges
pub struct ChallengeBook {
    plans: PlanCollection<ChallengePlan>,
    book: BookSettings,
    policy: PlanPolicy,
}

impl ChallengeBook {
    /// Load persisted challenges
    pub fn load(store: Arc<dyn Store>, book: BookSettings, policy: PlanPolicy) -> Result<Self> {
        let plans = store.load_challenges()?;
        info!(count = plans.len(), "Challenge plans loaded");

        Ok(Self {
            plans: PlanCollection::new(store, plans, |store, plans| {
                store.save_challenges(plans)
            }),
            book,
            policy,
        })
    }

    pub fn plans(&self) -> &[ChallengePlan] {
        self.plans.plans()
    }

    pub fn get(&self, id: &PlanId) -> Option<&ChallengePlan> {
        self.plans.get(id)
    }

    /// Create a plan and return its id
    pub fn create_plan(
        &mut self,
        request: NewChallenge,
        catalog: &dyn ChapterCatalog,
        now: DateTime<Local>,
    ) -> Result<PlanId> {
        if request.duration == 0 {
            return Err(WirdError::validation("duration must be at least one day"));
        }

        let (title, chapter, units) = match (request.scope, request.chapter) {
            (PlanScope::WholeBook, None) => (self.book.title.clone(), None, self.book.units),
            (PlanScope::WholeBook, Some(_)) => {
                return Err(WirdError::validation(
                    "a whole-book plan cannot target a chapter",
                ));
            }
            (PlanScope::SingleChapter, None) => {
                return Err(WirdError::validation(
                    "a single-chapter plan needs a chapter",
                ));
            }
            (PlanScope::SingleChapter, Some(id)) => {
                let chapter = catalog.chapter(id).ok_or(WirdError::ChapterNotFound(id))?;
                let units = chapter.unit_range();
                if units.total() == 0 {
                    return Err(WirdError::validation(format!(
                        "chapter {} has no pages",
                        chapter.id
                    )));
                }
                (self.book.chapter_title(&chapter.name), Some(chapter), units)
            }
        };

        let plan = ChallengePlan {
            id: PlanId::generate(),
            scope: request.scope,
            title,
            chapter,
            units,
            duration: request.duration,
            completed_days: BTreeSet::new(),
            start_date: now,
            cycles_completed: 0,
            completion_signaled: false,
        };
        let id = plan.id.clone();

        self.plans.insert(plan)?;
        info!(plan_id = %id, duration = request.duration, "Challenge created");
        Ok(id)
    }

    /// Flip completion of `day`. Completing a locked day is refused while
    /// the strict lock policy is on; unchecking is always allowed.
    pub fn toggle_day(&mut self, id: &PlanId, day: u32) -> Result<DayToggle> {
        let Some(plan) = self.plans.get(id) else {
            return Ok(DayToggle::NotFound);
        };

        if day >= plan.duration {
            return Err(WirdError::DayOutOfRange {
                day,
                duration: plan.duration,
            });
        }

        if self.policy.strict_day_lock && plan.day_state(day) == DayState::Locked {
            debug!(plan_id = %id, day, "Toggle refused, day locked");
            return Ok(DayToggle::Locked);
        }

        let outcome = self.plans.modify(id, |plan| {
            if plan.completed_days.remove(&day) {
                DayToggle::Unchecked
            } else {
                plan.completed_days.insert(day);
                DayToggle::Checked
            }
        })?;

        let outcome = outcome.unwrap_or(DayToggle::NotFound);
        debug!(plan_id = %id, day, outcome = ?outcome, "Challenge day toggled");
        Ok(outcome)
    }

    pub fn delete_plan(&mut self, id: &PlanId) -> Result<Removal> {
        let removal = self.plans.remove(id)?;
        if removal == Removal::Removed {
            info!(plan_id = %id, "Challenge deleted");
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

    pub fn view(&self, id: &PlanId) -> Option<ChallengeView> {
        self.get(id).map(|plan| self.build_view(plan))
    }

    pub fn views(&self) -> Vec<ChallengeView> {
        self.plans().iter().map(|plan| self.build_view(plan)).collect()
    }

    fn build_view(&self, plan: &ChallengePlan) -> ChallengeView {
        let subtext = match &plan.chapter {
            Some(chapter) => self.book.chapter_title(&chapter.name),
            None => self.book.title.clone(),
        };

        let days = (0..plan.duration)
            .map(|day| {
                let task = describe_day(&plan.units, plan.duration, day);
                DayView {
                    index: day,
                    state: plan.day_state(day),
                    units: task.units,
                    label: task.label,
                    subtext: subtext.clone(),
                }
            })
            .collect();

        ChallengeView {
            id: plan.id.clone(),
            title: plan.title.clone(),
            scope: plan.scope,
            duration: plan.duration,
            completed_days: plan.completed_days.len(),
            percent: plan.percent(),
            cycles_completed: plan.cycles_completed,
            start_date: plan.start_date,
            days,
        }
    }
}
