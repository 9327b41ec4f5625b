//! Load-time normalization of persisted records
//!
//! Records written by older releases may miss fields added later, carry
//! numeric ids, or use previous field names. Every record passes through
//! the matching `normalize_*` function (raw JSON) and `sanitize_*` function
//! (typed) before the engine sees it, so use sites never deal with
//! optional legacy fields.

use chrono::{DateTime, Local};
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use wird_api::{ChallengePlan, Goal, HabitPlan};

/// Title given to legacy whole-book records without one
pub const LEGACY_BOOK_TITLE: &str = "Khatmul Quran";

/// Prefix of legacy single-chapter titles
pub const LEGACY_CHAPTER_PREFIX: &str = "Surat";

/// Duration substituted for a missing, zero or non-numeric duration
pub const LEGACY_DURATION_FALLBACK: u32 = 30;

const LEGACY_FIRST_PAGE: u32 = 1;
const LEGACY_LAST_PAGE: u32 = 604;

/// Normalize a raw challenge plan. Returns false if the value is not an object.
pub fn normalize_challenge(value: &mut Value, now: DateTime<Local>) -> bool {
    let Some(obj) = value.as_object_mut() else {
        return false;
    };

    coerce_id(obj);
    normalize_cycles(obj);
    let duration = normalize_duration(obj, "duration");
    normalize_start_date(obj, now);

    let chapter_pages = obj
        .get("targetSurah")
        .and_then(|c| c.get("pages"))
        .and_then(page_pair);
    let chapter_name = obj
        .get("targetSurah")
        .and_then(|c| c.get("name_simple"))
        .and_then(Value::as_str)
        .map(str::to_string);

    if !obj.contains_key("type") {
        let scope = if chapter_pages.is_some() {
            "SINGLE_CHAPTER"
        } else {
            "WHOLE_BOOK"
        };
        obj.insert("type".into(), scope.into());
    }

    let (first, last) = chapter_pages.unwrap_or((LEGACY_FIRST_PAGE, LEGACY_LAST_PAGE));
    normalize_u32(obj, "startPage", first);
    normalize_u32(obj, "endPage", last);
    obj.remove("totalPages");

    ensure_title(obj, chapter_name.as_deref());

    let days: Vec<Value> = obj
        .get("completedDays")
        .and_then(Value::as_array)
        .map(|days| days.iter().filter_map(coerce_u32).map(Value::from).collect())
        .unwrap_or_default();
    let done: BTreeSet<u32> = days
        .iter()
        .filter_map(coerce_u32)
        .filter(|day| *day < duration)
        .collect();
    obj.insert("completedDays".into(), Value::Array(days));

    normalize_completion_flag(obj, done.len() as u64 == u64::from(duration));

    true
}

/// Normalize a raw habit plan. Returns false if the value is not an object.
pub fn normalize_habit_plan(value: &mut Value, now: DateTime<Local>) -> bool {
    let Some(obj) = value.as_object_mut() else {
        return false;
    };

    coerce_id(obj);
    normalize_cycles(obj);
    let duration = normalize_duration(obj, "duration");
    normalize_start_date(obj, now);

    let progress: Map<String, Value> = match obj.remove("dayProgress") {
        Some(Value::Object(days)) => days
            .into_iter()
            .filter(|(day, _)| day.parse::<u32>().is_ok())
            .map(|(day, habits)| {
                let habits: Vec<Value> = habits
                    .as_array()
                    .map(|h| h.iter().filter_map(coerce_u32).map(Value::from).collect())
                    .unwrap_or_default();
                (day, Value::Array(habits))
            })
            .collect(),
        _ => Map::new(),
    };

    let habit_count = obj
        .get("habits")
        .and_then(Value::as_array)
        .map_or(0, Vec::len);
    let checked: u64 = progress
        .iter()
        .filter(|(day, _)| day.parse::<u32>().is_ok_and(|d| d < duration))
        .map(|(_, habits)| {
            let distinct: BTreeSet<u32> = habits
                .as_array()
                .map(|h| {
                    h.iter()
                        .filter_map(coerce_u32)
                        .filter(|i| (*i as usize) < habit_count)
                        .collect()
                })
                .unwrap_or_default();
            distinct.len() as u64
        })
        .sum();
    let required = u64::from(duration) * habit_count as u64;
    obj.insert("dayProgress".into(), Value::Object(progress));

    normalize_completion_flag(obj, required > 0 && checked == required);

    true
}

/// Normalize a raw cumulative goal. Returns false if the value is not an object.
pub fn normalize_goal(value: &mut Value, now: DateTime<Local>) -> bool {
    let Some(obj) = value.as_object_mut() else {
        return false;
    };

    coerce_id(obj);
    normalize_start_date(obj, now);
    let duration = normalize_duration(obj, "durationDays");

    if !obj.contains_key("type") {
        let kind = if obj.contains_key("targetId") {
            "SINGLE_CHAPTER"
        } else {
            "WHOLE_BOOK"
        };
        obj.insert("type".into(), kind.into());
    }

    // Goals created before page offsets were tracked start at page 1
    let start = obj
        .get("startPageNumber")
        .and_then(coerce_u32)
        .filter(|p| *p > 0)
        .unwrap_or(LEGACY_FIRST_PAGE);
    obj.insert("startPageNumber".into(), start.into());

    if let Some(total) = obj.get("totalPages").and_then(coerce_u32) {
        obj.insert("totalPages".into(), total.into());
        if obj.get("dailyTargetPages").and_then(coerce_u32).is_none() {
            obj.insert(
                "dailyTargetPages".into(),
                Goal::daily_target(total, duration).into(),
            );
        }
    }
    if let Some(target) = obj.get("dailyTargetPages").and_then(coerce_u32) {
        obj.insert("dailyTargetPages".into(), target.into());
    }

    normalize_u32(obj, "completedPages", 0);

    match obj
        .get("lastProgressDate")
        .and_then(Value::as_str)
        .and_then(wird_util::parse_date)
    {
        Some(day) => {
            obj.insert(
                "lastProgressDate".into(),
                wird_util::format_date(day).into(),
            );
        }
        None => {
            obj.remove("lastProgressDate");
        }
    }

    ensure_title(obj, None);

    // Recomputed by sanitize_goal
    obj.entry("isCompleted").or_insert(Value::Bool(false));

    true
}

/// Enforce challenge invariants: completed days inside `0..duration`.
/// Returns the number of entries dropped.
pub fn sanitize_challenge(plan: &mut ChallengePlan) -> usize {
    let before = plan.completed_days.len();
    let duration = plan.duration;
    plan.completed_days.retain(|day| *day < duration);
    before - plan.completed_days.len()
}

/// Enforce habit plan invariants: day keys inside `0..duration`, habit
/// indices inside `habits`, no empty day sets.
/// Returns the number of entries dropped.
pub fn sanitize_habit_plan(plan: &mut HabitPlan) -> usize {
    let duration = plan.duration;
    let habit_count = plan.habits.len();
    let mut dropped = 0;

    plan.day_progress.retain(|day, habits| {
        if *day >= duration {
            dropped += habits.len();
            return false;
        }
        let before = habits.len();
        habits.retain(|h| *h < habit_count);
        dropped += before - habits.len();
        !habits.is_empty()
    });

    dropped
}

/// Enforce goal invariants: progress capped at the total and the stored
/// completion flag in agreement. Returns true if anything changed.
pub fn sanitize_goal(goal: &mut Goal) -> bool {
    let mut changed = false;

    if goal.completed_units > goal.total_units {
        goal.completed_units = goal.total_units;
        changed = true;
    }
    if goal.daily_target_units == 0 {
        goal.daily_target_units = Goal::daily_target(goal.total_units, goal.duration_days);
        changed = true;
    }

    let completed = goal.completed_units >= goal.total_units;
    if goal.is_completed != completed {
        goal.is_completed = completed;
        changed = true;
    }

    changed
}

fn coerce_u32(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f.floor() as u64))
            .and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn page_pair(value: &Value) -> Option<(u32, u32)> {
    let pages = value.as_array()?;
    match pages.as_slice() {
        [first, last] => Some((coerce_u32(first)?, coerce_u32(last)?)),
        _ => None,
    }
}

fn coerce_id(obj: &mut Map<String, Value>) {
    if let Some(Value::Number(n)) = obj.get("id") {
        let id = n.to_string();
        obj.insert("id".into(), Value::String(id));
    }
}

fn normalize_cycles(obj: &mut Map<String, Value>) {
    let legacy = obj.remove("timesCompleted");
    let cycles = obj
        .get("cyclesCompleted")
        .and_then(coerce_u32)
        .or_else(|| legacy.as_ref().and_then(coerce_u32))
        .unwrap_or(0);
    obj.insert("cyclesCompleted".into(), cycles.into());
}

/// Records written before completion reports were stored count as
/// reported when their current cycle is already complete.
fn normalize_completion_flag(obj: &mut Map<String, Value>, complete: bool) {
    let signaled = match obj.get("completionSignaled") {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_u64().is_some_and(|n| n != 0),
        Some(Value::String(s)) => s.trim().eq_ignore_ascii_case("true"),
        _ => complete,
    };
    obj.insert("completionSignaled".into(), signaled.into());
}

fn normalize_duration(obj: &mut Map<String, Value>, field: &str) -> u32 {
    let duration = obj
        .get(field)
        .and_then(coerce_u32)
        .filter(|d| *d > 0)
        .unwrap_or(LEGACY_DURATION_FALLBACK);
    obj.insert(field.into(), duration.into());
    duration
}

fn normalize_u32(obj: &mut Map<String, Value>, field: &str, default: u32) {
    let value = obj.get(field).and_then(coerce_u32).unwrap_or(default);
    obj.insert(field.into(), value.into());
}

fn normalize_start_date(obj: &mut Map<String, Value>, now: DateTime<Local>) {
    let valid = obj
        .get("startDate")
        .and_then(Value::as_str)
        .is_some_and(|s| DateTime::parse_from_rfc3339(s).is_ok());
    if !valid {
        obj.insert("startDate".into(), now.to_rfc3339().into());
    }
}

fn ensure_title(obj: &mut Map<String, Value>, chapter_name: Option<&str>) {
    let has_title = obj
        .get("title")
        .and_then(Value::as_str)
        .is_some_and(|t| !t.trim().is_empty());
    if has_title {
        return;
    }

    let is_chapter = obj.get("type").and_then(Value::as_str).is_some_and(|t| {
        t == "SURAH" || t == "SINGLE_CHAPTER"
    });
    let title = match chapter_name {
        Some(name) if is_chapter => format!("{} {}", LEGACY_CHAPTER_PREFIX, name),
        _ => LEGACY_BOOK_TITLE.to_string(),
    };
    obj.insert("title".into(), title.into());
}
