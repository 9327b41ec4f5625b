//! Shared value types for wird

use serde::{Deserialize, Serialize};
use std::fmt;
use wird_util::{ChapterId, GoalId, PlanId};

/// What material a reading plan or goal covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlanScope {
    /// The whole book
    #[serde(alias = "ALL", alias = "KHATMAH")]
    WholeBook,
    /// A single chapter, resolved through the catalog
    #[serde(alias = "SURAH")]
    SingleChapter,
}

/// Reference to any progress record, used in events
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum PlanRef {
    Challenge(PlanId),
    Habit(PlanId),
    Goal(GoalId),
}

impl fmt::Display for PlanRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanRef::Challenge(id) => write!(f, "challenge:{}", id),
            PlanRef::Habit(id) => write!(f, "habit:{}", id),
            PlanRef::Goal(id) => write!(f, "goal:{}", id),
        }
    }
}

/// Per-day state of a sequential reading plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayState {
    /// Previous day not completed yet
    Locked,
    /// Can be marked done
    Unlocked,
    Completed,
}

/// Inclusive range of units (page numbers) covered by a plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitRange {
    #[serde(rename = "startPage")]
    pub start: u32,
    #[serde(rename = "endPage")]
    pub end: u32,
}

impl UnitRange {
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// Number of units, `end - start + 1` (zero if inverted)
    pub fn total(&self) -> u32 {
        if self.end < self.start {
            0
        } else {
            self.end - self.start + 1
        }
    }

    pub fn contains(&self, unit: u32) -> bool {
        unit >= self.start && unit <= self.end
    }
}

/// Inclusive range of units assigned to one day of a plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayRange {
    pub start: u32,
    pub end: u32,
}

impl DayRange {
    /// Number of units in the range
    pub fn len(&self) -> u32 {
        self.end - self.start + 1
    }

    /// A day covering exactly one unit
    pub fn is_single(&self) -> bool {
        self.start == self.end
    }

    pub fn units(&self) -> std::ops::RangeInclusive<u32> {
        self.start..=self.end
    }
}

impl fmt::Display for DayRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_single() {
            write!(f, "Page {}", self.start)
        } else {
            write!(f, "Page {} - {}", self.start, self.end)
        }
    }
}

/// Chapter metadata supplied by the external content catalog.
///
/// Field names follow the catalog's JSON; unknown fields are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterDescriptor {
    pub id: ChapterId,
    #[serde(rename = "name_simple")]
    pub name: String,
    /// First and last page of the chapter
    pub pages: (u32, u32),
}

impl ChapterDescriptor {
    pub fn new(id: impl Into<ChapterId>, name: impl Into<String>, first: u32, last: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            pages: (first, last),
        }
    }

    pub fn unit_range(&self) -> UnitRange {
        UnitRange::new(self.pages.0, self.pages.1)
    }
}

/// Rounded completion percentage, 0..=100
pub fn percent(done: u64, total: u64) -> u8 {
    if total == 0 {
        return 0;
    }
    let done = done.min(total);
    ((done * 100 + total / 2) / total) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scope_accepts_legacy_names() {
        let all: PlanScope = serde_json::from_str("\"ALL\"").unwrap();
        let khatmah: PlanScope = serde_json::from_str("\"KHATMAH\"").unwrap();
        let surah: PlanScope = serde_json::from_str("\"SURAH\"").unwrap();

        assert_eq!(all, PlanScope::WholeBook);
        assert_eq!(khatmah, PlanScope::WholeBook);
        assert_eq!(surah, PlanScope::SingleChapter);
        assert_eq!(
            serde_json::to_string(&PlanScope::SingleChapter).unwrap(),
            "\"SINGLE_CHAPTER\""
        );
    }

    #[test]
    fn unit_range_total() {
        assert_eq!(UnitRange::new(1, 604).total(), 604);
        assert_eq!(UnitRange::new(293, 304).total(), 12);
        assert_eq!(UnitRange::new(5, 5).total(), 1);
        assert_eq!(UnitRange::new(6, 5).total(), 0);
    }

    #[test]
    fn day_range_display() {
        assert_eq!(DayRange { start: 7, end: 7 }.to_string(), "Page 7");
        assert_eq!(DayRange { start: 1, end: 20 }.to_string(), "Page 1 - 20");
    }

    #[test]
    fn chapter_descriptor_from_catalog_json() {
        let json = r#"{
            "id": 18,
            "revelation_place": "makkah",
            "name_simple": "Al-Kahf",
            "verses_count": 110,
            "pages": [293, 304]
        }"#;

        let chapter: ChapterDescriptor = serde_json::from_str(json).unwrap();
        assert_eq!(chapter.id, ChapterId::new(18));
        assert_eq!(chapter.name, "Al-Kahf");
        assert_eq!(chapter.unit_range().total(), 12);
    }

    #[test]
    fn percent_rounds_and_clamps() {
        assert_eq!(percent(0, 30), 0);
        assert_eq!(percent(1, 3), 33);
        assert_eq!(percent(2, 3), 67);
        assert_eq!(percent(30, 30), 100);
        assert_eq!(percent(40, 30), 100);
        assert_eq!(percent(1, 0), 0);
    }

    #[test]
    fn plan_ref_display() {
        let r = PlanRef::Habit(PlanId::new("abc"));
        assert_eq!(r.to_string(), "habit:abc");
    }
}
