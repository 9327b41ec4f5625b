//! Error types for wird

use thiserror::Error;

use crate::ChapterId;

/// Core error type for wird operations
#[derive(Debug, Error)]
pub enum WirdError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Day {day} is outside the plan (duration {duration} days)")]
    DayOutOfRange { day: u32, duration: u32 },

    #[error("Habit {habit} is outside the plan ({count} habits)")]
    HabitOutOfRange { habit: usize, count: usize },

    #[error("Chapter not found: {0}")]
    ChapterNotFound(ChapterId),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Store error: {0}")]
    StoreError(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl WirdError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationError(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    pub fn store(msg: impl Into<String>) -> Self {
        Self::StoreError(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// True for errors caused by caller input rather than the environment
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::ValidationError(_)
                | Self::DayOutOfRange { .. }
                | Self::HabitOutOfRange { .. }
                | Self::ChapterNotFound(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, WirdError>;
