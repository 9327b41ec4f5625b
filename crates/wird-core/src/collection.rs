//! Persisted collection shared by the plan books
//!
//! Every mutation is applied to a copy of the collection, the copy is
//! saved, and only then does it replace the in-memory state. A failed save
//! leaves the book exactly as it was.

use chrono::{DateTime, Local};
use std::sync::Arc;
use tracing::debug;
use wird_store::{Store, StoreResult};
use wird_util::{PlanId, Result};

use crate::{Cyclic, Removal, RestartOutcome};

pub(crate) type SaveFn<P> = fn(&dyn Store, &[P]) -> StoreResult<()>;

pub(crate) struct PlanCollection<P> {
    store: Arc<dyn Store>,
    save: SaveFn<P>,
    plans: Vec<P>,
}

impl<P: Cyclic + Clone> PlanCollection<P> {
    pub(crate) fn new(store: Arc<dyn Store>, plans: Vec<P>, save: SaveFn<P>) -> Self {
        Self { store, save, plans }
    }

    pub(crate) fn plans(&self) -> &[P] {
        &self.plans
    }

    pub(crate) fn get(&self, id: &PlanId) -> Option<&P> {
        self.plans.iter().find(|p| p.id() == id)
    }

    pub(crate) fn insert(&mut self, plan: P) -> Result<()> {
        let mut plans = self.plans.clone();
        plans.push(plan);
        self.commit(plans)
    }

    pub(crate) fn remove(&mut self, id: &PlanId) -> Result<Removal> {
        if self.get(id).is_none() {
            return Ok(Removal::NotFound);
        }

        let plans = self.plans.iter().filter(|p| p.id() != id).cloned().collect();
        self.commit(plans)?;
        Ok(Removal::Removed)
    }

    /// Apply `f` to the plan with `id` and persist. `None` if there is no
    /// such plan.
    pub(crate) fn modify<R>(&mut self, id: &PlanId, f: impl FnOnce(&mut P) -> R) -> Result<Option<R>> {
        let Some(index) = self.plans.iter().position(|p| p.id() == id) else {
            return Ok(None);
        };

        let mut plans = self.plans.clone();
        let result = f(&mut plans[index]);
        self.commit(plans)?;
        Ok(Some(result))
    }

    /// Mark the current cycle of a completed plan as reported and persist
    /// the mark. Returns the cycle if this call is the first report.
    pub(crate) fn signal_completion(&mut self, id: &PlanId) -> Result<Option<u32>> {
        match self.get(id) {
            Some(plan) if plan.is_complete() && !plan.completion_signaled() => {}
            _ => return Ok(None),
        }

        self.modify(id, |plan| {
            plan.mark_completion_signaled();
            plan.cycles_completed()
        })
    }

    /// Start a new cycle of a completed plan
    pub(crate) fn restart(
        &mut self,
        id: &PlanId,
        now: DateTime<Local>,
        reset_start_date: bool,
    ) -> Result<RestartOutcome> {
        match self.get(id) {
            None => return Ok(RestartOutcome::NotFound),
            Some(plan) if !plan.is_complete() => return Ok(RestartOutcome::NotComplete),
            Some(_) => {}
        }

        let cycles = self.modify(id, |plan| {
            plan.restart(now, reset_start_date);
            plan.cycles_completed()
        })?;

        Ok(match cycles {
            Some(cycles) => RestartOutcome::Restarted { cycles },
            None => RestartOutcome::NotFound,
        })
    }

    fn commit(&mut self, plans: Vec<P>) -> Result<()> {
        (self.save)(self.store.as_ref(), &plans)?;
        debug!(count = plans.len(), "Plan collection saved");
        self.plans = plans;
        Ok(())
    }
}
