//! Validated settings structures

use crate::schema::{RawBookConfig, RawChapter, RawConfig, RawPlansConfig, RawStorageConfig};
use std::path::{Path, PathBuf};
use wird_api::{ChapterDescriptor, UnitRange};

/// First page of the book when not configured
pub const DEFAULT_FIRST_UNIT: u32 = 1;

/// Last page of the book when not configured
pub const DEFAULT_LAST_UNIT: u32 = 604;

/// Plan length used when the caller supplies none
pub const DEFAULT_DURATION_DAYS: u32 = 30;

const DEFAULT_BOOK_TITLE: &str = "Khatmul Quran";
const DEFAULT_CHAPTER_PREFIX: &str = "Surat";

/// Validated settings ready for use by the progress engine
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub storage: StorageConfig,
    pub book: BookSettings,
    pub plans: PlanPolicy,
    /// Inline catalog entries
    pub chapters: Vec<ChapterDescriptor>,
}

impl Settings {
    /// Convert from raw config (after validation).
    ///
    /// `base_dir` is used to resolve a relative catalog path.
    pub fn from_raw(raw: RawConfig, base_dir: Option<&Path>) -> Self {
        Self {
            storage: StorageConfig::from_raw(raw.storage, base_dir),
            book: BookSettings::from_raw(raw.book),
            plans: PlanPolicy::from_raw(raw.plans),
            chapters: raw.chapters.into_iter().map(convert_chapter).collect(),
        }
    }
}

/// Storage configuration
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
    pub catalog_path: Option<PathBuf>,
}

impl StorageConfig {
    fn from_raw(raw: RawStorageConfig, base_dir: Option<&Path>) -> Self {
        let catalog_path = raw.catalog_path.map(|p| match base_dir {
            Some(base) if p.is_relative() => base.join(p),
            _ => p,
        });

        Self {
            data_dir: raw.data_dir.unwrap_or_else(wird_util::default_data_dir),
            catalog_path,
        }
    }

    /// Path of the database file inside the data directory
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(wird_util::DATABASE_FILENAME)
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: wird_util::default_data_dir(),
            catalog_path: None,
        }
    }
}

/// The book plans are made over
#[derive(Debug, Clone)]
pub struct BookSettings {
    pub title: String,
    pub chapter_title_prefix: String,
    pub units: UnitRange,
}

impl BookSettings {
    fn from_raw(raw: RawBookConfig) -> Self {
        Self {
            title: raw.title.unwrap_or_else(|| DEFAULT_BOOK_TITLE.into()),
            chapter_title_prefix: raw
                .chapter_title_prefix
                .unwrap_or_else(|| DEFAULT_CHAPTER_PREFIX.into()),
            units: UnitRange::new(
                raw.first_unit.unwrap_or(DEFAULT_FIRST_UNIT),
                raw.last_unit.unwrap_or(DEFAULT_LAST_UNIT),
            ),
        }
    }

    /// Title for a single-chapter plan
    pub fn chapter_title(&self, chapter_name: &str) -> String {
        if self.chapter_title_prefix.is_empty() {
            chapter_name.to_string()
        } else {
            format!("{} {}", self.chapter_title_prefix, chapter_name)
        }
    }
}

impl Default for BookSettings {
    fn default() -> Self {
        Self::from_raw(RawBookConfig::default())
    }
}

/// Plan behaviour switches
#[derive(Debug, Clone, Copy)]
pub struct PlanPolicy {
    pub default_duration_days: u32,
    /// Enforce the sequential unlock rule inside the store
    pub strict_day_lock: bool,
    /// Stamp a new start date on restart
    pub restart_resets_start_date: bool,
}

impl PlanPolicy {
    fn from_raw(raw: RawPlansConfig) -> Self {
        Self {
            default_duration_days: raw.default_duration_days.unwrap_or(DEFAULT_DURATION_DAYS),
            strict_day_lock: raw.strict_day_lock.unwrap_or(true),
            restart_resets_start_date: raw.restart_resets_start_date.unwrap_or(true),
        }
    }
}

impl Default for PlanPolicy {
    fn default() -> Self {
        Self::from_raw(RawPlansConfig::default())
    }
}

fn convert_chapter(raw: RawChapter) -> ChapterDescriptor {
    ChapterDescriptor::new(raw.id, raw.name, raw.pages.0, raw.pages.1)
}
