//! Typed access to the persisted collections

use chrono::{DateTime, Local, NaiveDate};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info, warn};
use wird_api::{ChallengePlan, Goal, HabitPlan, StreakState};

use crate::{
    CHALLENGES_KEY, GOALS_KEY, HABIT_PLANS_KEY, LEGACY_CHALLENGE_KEY, STREAK_COUNT_KEY,
    STREAK_DATE_KEY, Store, StoreResult, StoreWrite, normalize_challenge, normalize_goal,
    normalize_habit_plan, sanitize_challenge, sanitize_goal, sanitize_habit_plan,
};

type Normalizer = fn(&mut Value, DateTime<Local>) -> bool;

/// Collection-level operations over any [`Store`].
///
/// Loading never fails on malformed content: an unparsable collection is
/// treated as empty and an unparsable record is skipped, both with a
/// warning. Only substrate failures are returned as errors.
pub trait RecordStore {
    fn load_challenges(&self) -> StoreResult<Vec<ChallengePlan>>;
    fn save_challenges(&self, plans: &[ChallengePlan]) -> StoreResult<()>;

    fn load_habit_plans(&self) -> StoreResult<Vec<HabitPlan>>;
    fn save_habit_plans(&self, plans: &[HabitPlan]) -> StoreResult<()>;

    fn load_goals(&self) -> StoreResult<Vec<Goal>>;
    fn save_goals(&self, goals: &[Goal]) -> StoreResult<()>;

    fn load_streak(&self) -> StoreResult<StreakState>;
    fn save_streak(&self, streak: &StreakState) -> StoreResult<()>;

    /// Save the goal collection and the streak in one atomic batch. `None`
    /// leaves that part untouched.
    fn save_daily_progress(
        &self,
        goals: Option<&[Goal]>,
        streak: Option<&StreakState>,
    ) -> StoreResult<()>;
}

impl<S: Store + ?Sized> RecordStore for S {
    fn load_challenges(&self) -> StoreResult<Vec<ChallengePlan>> {
        let now = wird_util::now();

        let mut plans = match read_collection::<ChallengePlan, _>(
            self,
            CHALLENGES_KEY,
            normalize_challenge,
            now,
        )? {
            Some(plans) => plans,
            None => migrate_legacy_challenge(self, now)?,
        };

        for plan in &mut plans {
            let dropped = sanitize_challenge(plan);
            if dropped > 0 {
                warn!(plan_id = %plan.id, dropped, "Dropped out-of-range completed days");
            }
        }

        debug!(count = plans.len(), "Loaded challenge plans");
        Ok(plans)
    }

    fn save_challenges(&self, plans: &[ChallengePlan]) -> StoreResult<()> {
        write_collection(self, CHALLENGES_KEY, plans)
    }

    fn load_habit_plans(&self) -> StoreResult<Vec<HabitPlan>> {
        let now = wird_util::now();
        let mut plans =
            read_collection::<HabitPlan, _>(self, HABIT_PLANS_KEY, normalize_habit_plan, now)?
                .unwrap_or_default();

        for plan in &mut plans {
            let dropped = sanitize_habit_plan(plan);
            if dropped > 0 {
                warn!(plan_id = %plan.id, dropped, "Dropped invalid habit checks");
            }
        }

        debug!(count = plans.len(), "Loaded habit plans");
        Ok(plans)
    }

    fn save_habit_plans(&self, plans: &[HabitPlan]) -> StoreResult<()> {
        write_collection(self, HABIT_PLANS_KEY, plans)
    }

    fn load_goals(&self) -> StoreResult<Vec<Goal>> {
        let now = wird_util::now();
        let mut goals = read_collection::<Goal, _>(self, GOALS_KEY, normalize_goal, now)?
            .unwrap_or_default();

        for goal in &mut goals {
            if sanitize_goal(goal) {
                debug!(goal_id = %goal.id, "Goal normalized on load");
            }
        }

        debug!(count = goals.len(), "Loaded goals");
        Ok(goals)
    }

    fn save_goals(&self, goals: &[Goal]) -> StoreResult<()> {
        write_collection(self, GOALS_KEY, goals)
    }

    fn load_streak(&self) -> StoreResult<StreakState> {
        let count = match self.get(STREAK_COUNT_KEY)? {
            Some(raw) => parse_streak_count(&raw),
            None => 0,
        };
        let last_streak_date = match self.get(STREAK_DATE_KEY)? {
            Some(raw) => parse_streak_date(&raw),
            None => None,
        };

        Ok(StreakState {
            count,
            last_streak_date,
        })
    }

    fn save_streak(&self, streak: &StreakState) -> StoreResult<()> {
        self.apply(&streak_writes(streak)?)
    }

    fn save_daily_progress(
        &self,
        goals: Option<&[Goal]>,
        streak: Option<&StreakState>,
    ) -> StoreResult<()> {
        let mut writes = Vec::new();
        if let Some(goals) = goals {
            writes.push(StoreWrite::put(GOALS_KEY, serde_json::to_string(goals)?));
        }
        if let Some(streak) = streak {
            writes.extend(streak_writes(streak)?);
        }

        if writes.is_empty() {
            return Ok(());
        }
        self.apply(&writes)
    }
}

/// The count and the date of a streak are always written together
fn streak_writes(streak: &StreakState) -> StoreResult<Vec<StoreWrite>> {
    let date = match streak.last_streak_date {
        Some(day) => StoreWrite::put(
            STREAK_DATE_KEY,
            serde_json::to_string(&wird_util::format_date(day))?,
        ),
        None => StoreWrite::remove(STREAK_DATE_KEY),
    };
    Ok(vec![
        StoreWrite::put(STREAK_COUNT_KEY, streak.count.to_string()),
        date,
    ])
}

/// Read an array collection. `None` means the key was never written.
fn read_collection<T, S>(
    store: &S,
    key: &str,
    normalize: Normalizer,
    now: DateTime<Local>,
) -> StoreResult<Option<Vec<T>>>
where
    T: DeserializeOwned,
    S: Store + ?Sized,
{
    let Some(raw) = store.get(key)? else {
        return Ok(None);
    };

    let items = match serde_json::from_str::<Value>(&raw) {
        Ok(Value::Array(items)) => items,
        Ok(other) => {
            warn!(key, kind = json_kind(&other), "Collection is not an array, treating as empty");
            return Ok(Some(Vec::new()));
        }
        Err(e) => {
            warn!(key, error = %e, "Collection is not valid JSON, treating as empty");
            return Ok(Some(Vec::new()));
        }
    };

    let records = items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| decode_record(key, index, item, normalize, now))
        .collect();

    Ok(Some(records))
}

fn decode_record<T: DeserializeOwned>(
    key: &str,
    index: usize,
    mut item: Value,
    normalize: Normalizer,
    now: DateTime<Local>,
) -> Option<T> {
    if !normalize(&mut item, now) {
        warn!(key, index, "Skipping record that is not an object");
        return None;
    }

    match serde_json::from_value(item) {
        Ok(record) => Some(record),
        Err(e) => {
            warn!(key, index, error = %e, "Skipping unreadable record");
            None
        }
    }
}

fn write_collection<T, S>(store: &S, key: &str, records: &[T]) -> StoreResult<()>
where
    T: Serialize,
    S: Store + ?Sized,
{
    let value = serde_json::to_string(records)?;
    store.put(key, &value)
}

/// Move a single-challenge record from the pre-multi-plan key into the
/// array collection.
fn migrate_legacy_challenge<S: Store + ?Sized>(
    store: &S,
    now: DateTime<Local>,
) -> StoreResult<Vec<ChallengePlan>> {
    let Some(raw) = store.get(LEGACY_CHALLENGE_KEY)? else {
        return Ok(Vec::new());
    };

    let plan = match serde_json::from_str::<Value>(&raw) {
        Ok(value) => decode_record::<ChallengePlan>(
            LEGACY_CHALLENGE_KEY,
            0,
            value,
            normalize_challenge,
            now,
        ),
        Err(e) => {
            warn!(error = %e, "Legacy challenge is not valid JSON, ignoring");
            None
        }
    };

    let Some(mut plan) = plan else {
        return Ok(Vec::new());
    };

    sanitize_challenge(&mut plan);
    info!(plan_id = %plan.id, "Migrating legacy single challenge");

    let plans = vec![plan];
    write_collection(store, CHALLENGES_KEY, &plans)?;
    Ok(plans)
}

fn parse_streak_count(raw: &str) -> u32 {
    let parsed = match serde_json::from_str::<Value>(raw) {
        Ok(Value::Number(n)) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Ok(Value::String(s)) => s.trim().parse().ok(),
        _ => raw.trim().parse().ok(),
    };

    parsed.unwrap_or_else(|| {
        warn!(raw, "Malformed streak count, treating as 0");
        0
    })
}

fn parse_streak_date(raw: &str) -> Option<NaiveDate> {
    let text = match serde_json::from_str::<Value>(raw) {
        Ok(Value::String(s)) => s,
        _ => raw.trim().to_string(),
    };

    let day = wird_util::parse_date(&text);
    if day.is_none() {
        warn!(raw, "Malformed streak date, ignoring");
    }
    day
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
