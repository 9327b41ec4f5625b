//! Chapter catalog seam
//!
//! Single-chapter plans resolve their page range through a read-only
//! catalog keyed by chapter id. The catalog content comes from
//! configuration and an optional JSON file in the content service's
//! `{"chapters": [...]}` shape (a bare array is accepted as well).

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;
use wird_api::ChapterDescriptor;
use wird_util::{ChapterId, Result, WirdError};

/// Read-only chapter lookup
pub trait ChapterCatalog: Send + Sync {
    fn chapter(&self, id: ChapterId) -> Option<ChapterDescriptor>;

    /// All chapters in id order
    fn chapters(&self) -> Vec<ChapterDescriptor>;

    /// Case-insensitive match on the name, or on the id digits
    fn search(&self, query: &str) -> Vec<ChapterDescriptor> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return self.chapters();
        }

        self.chapters()
            .into_iter()
            .filter(|c| {
                c.name.to_lowercase().contains(&query) || c.id.to_string().contains(&query)
            })
            .collect()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CatalogFile {
    Wrapped { chapters: Vec<ChapterDescriptor> },
    Bare(Vec<ChapterDescriptor>),
}

/// In-memory catalog
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    chapters: BTreeMap<ChapterId, ChapterDescriptor>,
}

impl StaticCatalog {
    pub fn new(chapters: impl IntoIterator<Item = ChapterDescriptor>) -> Self {
        Self {
            chapters: chapters.into_iter().map(|c| (c.id, c)).collect(),
        }
    }

    /// Parse a catalog document
    pub fn from_json(content: &str) -> Result<Self> {
        let file: CatalogFile = serde_json::from_str(content)
            .map_err(|e| WirdError::config(format!("invalid chapter catalog: {}", e)))?;

        let chapters = match file {
            CatalogFile::Wrapped { chapters } => chapters,
            CatalogFile::Bare(chapters) => chapters,
        };
        Ok(Self::new(chapters))
    }

    /// Load a catalog document from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            WirdError::config(format!("failed to read catalog {}: {}", path.display(), e))
        })?;

        let catalog = Self::from_json(&content)?;
        debug!(path = %path.display(), count = catalog.len(), "Chapter catalog loaded");
        Ok(catalog)
    }

    /// Add entries from `other`; existing ids are replaced
    pub fn merge(&mut self, other: StaticCatalog) {
        self.chapters.extend(other.chapters);
    }

    pub fn len(&self) -> usize {
        self.chapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chapters.is_empty()
    }
}

impl ChapterCatalog for StaticCatalog {
    fn chapter(&self, id: ChapterId) -> Option<ChapterDescriptor> {
        self.chapters.get(&id).cloned()
    }

    fn chapters(&self) -> Vec<ChapterDescriptor> {
        self.chapters.values().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONTENT_SERVICE_SHAPE: &str = r#"{
        "chapters": [
            { "id": 1, "revelation_place": "makkah", "name_simple": "Al-Fatihah", "pages": [1, 1] },
            { "id": 18, "revelation_place": "makkah", "name_simple": "Al-Kahf", "pages": [293, 304] },
            { "id": 36, "revelation_place": "makkah", "name_simple": "Ya-Sin", "pages": [440, 445] }
        ]
    }"#;

    #[test]
    fn test_parse_wrapped_catalog() {
        let catalog = StaticCatalog::from_json(CONTENT_SERVICE_SHAPE).unwrap();

        assert_eq!(catalog.len(), 3);
        let kahf = catalog.chapter(ChapterId::new(18)).unwrap();
        assert_eq!(kahf.name, "Al-Kahf");
        assert_eq!(kahf.unit_range().total(), 12);
        assert!(catalog.chapter(ChapterId::new(2)).is_none());
    }

    #[test]
    fn test_parse_bare_array() {
        let catalog =
            StaticCatalog::from_json(r#"[{ "id": 112, "name_simple": "Al-Ikhlas", "pages": [604, 604] }]"#)
                .unwrap();
        assert_eq!(catalog.chapters().len(), 1);
    }

    #[test]
    fn test_reject_garbage() {
        let err = StaticCatalog::from_json("{\"surahs\": 1}").unwrap_err();
        assert!(matches!(err, WirdError::ConfigError(_)));
    }

    #[test]
    fn test_search() {
        let catalog = StaticCatalog::from_json(CONTENT_SERVICE_SHAPE).unwrap();

        let names = |q: &str| -> Vec<String> {
            catalog.search(q).into_iter().map(|c| c.name).collect()
        };

        assert_eq!(names("kahf"), vec!["Al-Kahf"]);
        assert_eq!(names("36"), vec!["Ya-Sin"]);
        assert_eq!(names("  ").len(), 3);
        assert!(names("baqarah").is_empty());
    }

    #[test]
    fn test_merge_replaces_ids() {
        let mut catalog = StaticCatalog::new([ChapterDescriptor::new(1u32, "Fatiha", 1, 1)]);
        catalog.merge(StaticCatalog::from_json(CONTENT_SERVICE_SHAPE).unwrap());

        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.chapter(ChapterId::new(1)).unwrap().name, "Al-Fatihah");
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chapters.json");
        std::fs::write(&path, CONTENT_SERVICE_SHAPE).unwrap();

        assert_eq!(StaticCatalog::load(&path).unwrap().len(), 3);
        assert!(StaticCatalog::load(dir.path().join("missing.json")).is_err());
    }
}
