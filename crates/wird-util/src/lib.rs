//! Shared utilities for wird
//!
//! This crate provides:
//! - ID types (PlanId, GoalId, ChapterId)
//! - Time utilities (local clock, calendar-day helpers, mock time)
//! - Error types
//! - Default paths for config and data directories

mod error;
mod ids;
mod paths;
mod time;

pub use error::*;
pub use ids::*;
pub use paths::*;
pub use time::*;
