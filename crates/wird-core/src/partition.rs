//! Day task partitioning
//!
//! Splits a unit range into `duration` contiguous daily portions. Day `i`
//! covers offsets `floor(i * total / duration)` through
//! `floor((i + 1) * total / duration) - 1`, computed in exact integers so
//! the union of all days is the whole range with no gaps or overlaps.

use wird_api::{DayRange, UnitRange};

/// Label used for days that receive no units
pub const REST_DAY_LABEL: &str = "Rest day";

/// A day's portion together with its display label
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayTask {
    /// None when the plan has fewer units than days and this day is empty
    pub units: Option<DayRange>,
    pub label: String,
}

/// Units assigned to `day` of a `duration`-day plan over `units`.
///
/// Returns `None` for an out-of-range day, a zero duration, an empty unit
/// range, or a day that the partition leaves empty.
pub fn compute_day_range(units: &UnitRange, duration: u32, day: u32) -> Option<DayRange> {
    let total = u64::from(units.total());
    if duration == 0 || day >= duration || total == 0 {
        return None;
    }

    let duration = u64::from(duration);
    let day = u64::from(day);
    let base = u64::from(units.start);
    let last = u64::from(units.end);

    let offset_start = day * total / duration;
    let offset_after = (day + 1) * total / duration;
    if offset_after <= offset_start {
        return None;
    }

    let start = base + offset_start;
    let end = (base + offset_after - 1).min(last);

    Some(DayRange {
        start: u32::try_from(start).ok()?,
        end: u32::try_from(end).ok()?,
    })
}

/// Describe `day` for display: "Page N", "Page A - B", or a rest day
pub fn describe_day(units: &UnitRange, duration: u32, day: u32) -> DayTask {
    let range = compute_day_range(units, duration, day);
    let label = match &range {
        Some(range) => range.to_string(),
        None => REST_DAY_LABEL.to_string(),
    };
    DayTask {
        units: range,
        label,
    }
}
