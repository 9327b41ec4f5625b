//! Global daily activity streak

use chrono::NaiveDate;
use std::sync::Arc;
use tracing::{debug, info};
use wird_api::{StreakState, StreakView};
use wird_store::{RecordStore, Store};
use wird_util::Result;

/// How a day's activity changed the streak
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreakChange {
    /// Activity already recorded today
    Unchanged,
    /// First activity ever
    Started,
    /// Activity yesterday, count went up by one
    Extended,
    /// At least one day was missed, count back to one
    Reset,
}

/// Apply the streak rule for activity on `today`
pub fn advance_streak(state: StreakState, today: NaiveDate) -> (StreakState, StreakChange) {
    let change = match state.last_streak_date {
        Some(last) if last == today => return (state, StreakChange::Unchanged),
        Some(last) if Some(last) == wird_util::previous_day(today) => StreakChange::Extended,
        Some(_) => StreakChange::Reset,
        None => StreakChange::Started,
    };

    let count = match change {
        StreakChange::Extended => state.count.saturating_add(1),
        _ => 1,
    };

    (
        StreakState {
            count,
            last_streak_date: Some(today),
        },
        change,
    )
}

/// Process-wide streak, initialised from the store. The count and the
/// date are always saved together.
pub struct StreakTracker {
    store: Arc<dyn Store>,
    state: StreakState,
}

impl StreakTracker {
    pub fn load(store: Arc<dyn Store>) -> Result<Self> {
        let state = store.load_streak()?;
        debug!(count = state.count, last = ?state.last_streak_date, "Streak loaded");
        Ok(Self { store, state })
    }

    pub fn state(&self) -> StreakState {
        self.state
    }

    /// Record qualifying activity on `today`. Same-day calls are no-ops.
    pub fn record_activity(&mut self, today: NaiveDate) -> Result<StreakChange> {
        let (next, change) = advance_streak(self.state, today);
        if change == StreakChange::Unchanged {
            return Ok(change);
        }

        self.store.save_streak(&next)?;
        self.accept(next, change);
        Ok(change)
    }

    /// The next state for activity on `today`, without saving it
    pub(crate) fn preview(&self, today: NaiveDate) -> (StreakState, StreakChange) {
        advance_streak(self.state, today)
    }

    /// Adopt a state that the caller has already persisted
    pub(crate) fn accept(&mut self, next: StreakState, change: StreakChange) {
        self.state = next;
        info!(count = next.count, change = ?change, "Streak updated");
    }

    /// The streak as it stands on `today`; a streak whose last activity is
    /// older than yesterday is no longer alive.
    pub fn view(&self, today: NaiveDate) -> StreakView {
        let alive = self.state.last_streak_date.is_some_and(|last| {
            last == today || Some(last) == wird_util::previous_day(today)
        });

        StreakView {
            count: self.state.count,
            last_streak_date: self.state.last_streak_date,
            alive,
        }
    }
}
