//! Configuration validation

use crate::schema::{RawBookConfig, RawChapter, RawConfig, RawPlansConfig};
use crate::settings::{DEFAULT_FIRST_UNIT, DEFAULT_LAST_UNIT};
use std::collections::HashSet;
use thiserror::Error;

/// Validation error
#[derive(Debug, Clone, Error)]
pub enum ValidationError {
    #[error("Book config error: {0}")]
    BookError(String),

    #[error("Plans config error: {0}")]
    PlansError(String),

    #[error("Chapter {chapter_id}: {message}")]
    ChapterError { chapter_id: u32, message: String },

    #[error("Duplicate chapter ID: {0}")]
    DuplicateChapterId(u32),
}

/// Validate a raw configuration
pub fn validate_config(config: &RawConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    errors.extend(validate_book(&config.book));
    errors.extend(validate_plans(&config.plans));

    // Check for duplicate chapter IDs
    let mut seen_ids = HashSet::new();
    for chapter in &config.chapters {
        if !seen_ids.insert(chapter.id) {
            errors.push(ValidationError::DuplicateChapterId(chapter.id));
        }
    }

    let first = config.book.first_unit.unwrap_or(DEFAULT_FIRST_UNIT);
    let last = config.book.last_unit.unwrap_or(DEFAULT_LAST_UNIT);
    for chapter in &config.chapters {
        errors.extend(validate_chapter(chapter, first, last));
    }

    errors
}

fn validate_book(book: &RawBookConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if let Some(title) = &book.title
        && title.trim().is_empty()
    {
        errors.push(ValidationError::BookError("title cannot be empty".into()));
    }

    let first = book.first_unit.unwrap_or(DEFAULT_FIRST_UNIT);
    let last = book.last_unit.unwrap_or(DEFAULT_LAST_UNIT);

    if first == 0 {
        errors.push(ValidationError::BookError(
            "first_unit must be at least 1".into(),
        ));
    }
    if last < first {
        errors.push(ValidationError::BookError(format!(
            "last_unit {} is before first_unit {}",
            last, first
        )));
    }

    errors
}

fn validate_plans(plans: &RawPlansConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if plans.default_duration_days == Some(0) {
        errors.push(ValidationError::PlansError(
            "default_duration_days must be positive".into(),
        ));
    }

    errors
}

fn validate_chapter(chapter: &RawChapter, first: u32, last: u32) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let (start, end) = chapter.pages;

    if chapter.name.trim().is_empty() {
        errors.push(ValidationError::ChapterError {
            chapter_id: chapter.id,
            message: "name cannot be empty".into(),
        });
    }

    if end < start {
        errors.push(ValidationError::ChapterError {
            chapter_id: chapter.id,
            message: format!("pages [{}, {}] are reversed", start, end),
        });
    }

    if start < first || end > last {
        errors.push(ValidationError::ChapterError {
            chapter_id: chapter.id,
            message: format!(
                "pages [{}, {}] fall outside the book [{}, {}]",
                start, end, first, last
            ),
        });
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(content: &str) -> RawConfig {
        toml::from_str(content).unwrap()
    }

    #[test]
    fn test_valid_config_has_no_errors() {
        let config = raw(r#"
            config_version = 1

            [[chapters]]
            id = 18
            name = "Al-Kahf"
            pages = [293, 304]
        "#);

        assert!(validate_config(&config).is_empty());
    }

    #[test]
    fn test_duplicate_chapter_detection() {
        let config = raw(r#"
            config_version = 1

            [[chapters]]
            id = 2
            name = "Al-Baqarah"
            pages = [2, 49]

            [[chapters]]
            id = 2
            name = "Al-Baqarah again"
            pages = [2, 49]
        "#);

        let errors = validate_config(&config);
        assert!(errors.iter().any(|e| matches!(e, ValidationError::DuplicateChapterId(2))));
    }

    #[test]
    fn test_reversed_and_out_of_book_pages() {
        let config = raw(r#"
            config_version = 1

            [book]
            last_unit = 100

            [[chapters]]
            id = 5
            name = "Reversed"
            pages = [50, 40]

            [[chapters]]
            id = 6
            name = "Too far"
            pages = [90, 120]
        "#);

        let errors = validate_config(&config);
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().all(|e| matches!(e, ValidationError::ChapterError { .. })));
    }

    #[test]
    fn test_book_and_plan_errors_are_collected() {
        let config = raw(r#"
            config_version = 1

            [book]
            title = "  "
            first_unit = 10
            last_unit = 5

            [plans]
            default_duration_days = 0
        "#);

        let errors = validate_config(&config);
        assert_eq!(
            errors
                .iter()
                .filter(|e| matches!(e, ValidationError::BookError(_)))
                .count(),
            2
        );
        assert!(errors.iter().any(|e| matches!(e, ValidationError::PlansError(_))));
    }
}
