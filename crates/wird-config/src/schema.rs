//! Raw configuration schema (as parsed from TOML)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw configuration as parsed from TOML
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawConfig {
    /// Config schema version
    pub config_version: u32,

    /// Where data lives
    #[serde(default)]
    pub storage: RawStorageConfig,

    /// The book plans are made over
    #[serde(default)]
    pub book: RawBookConfig,

    /// Plan behaviour
    #[serde(default)]
    pub plans: RawPlansConfig,

    /// Inline chapter catalog entries
    #[serde(default)]
    pub chapters: Vec<RawChapter>,
}

/// Storage settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawStorageConfig {
    /// Data directory for the store
    pub data_dir: Option<PathBuf>,

    /// JSON chapter list (quran.com `chapters` response or a bare array).
    /// Relative paths are resolved against the config file's directory.
    pub catalog_path: Option<PathBuf>,
}

/// Book settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawBookConfig {
    /// Title given to whole-book plans
    pub title: Option<String>,

    /// Single-chapter plans are titled "<prefix> <chapter name>"
    pub chapter_title_prefix: Option<String>,

    /// First page number
    pub first_unit: Option<u32>,

    /// Last page number
    pub last_unit: Option<u32>,
}

/// Plan behaviour settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawPlansConfig {
    /// Duration used when the caller gives none
    pub default_duration_days: Option<u32>,

    /// Refuse to complete a day before its predecessor
    pub strict_day_lock: Option<bool>,

    /// Stamp a fresh start date when a plan restarts
    pub restart_resets_start_date: Option<bool>,
}

/// Inline chapter definition
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawChapter {
    pub id: u32,
    pub name: String,
    /// First and last page
    pub pages: (u32, u32),
}
