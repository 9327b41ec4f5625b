//! Shared types for wird
//!
//! This crate defines the stable shapes exchanged between the store, the
//! progress engine and front ends:
//! - Persisted records (challenge plans, habit plans, goals, streak)
//! - Value types (unit ranges, day ranges, chapter descriptors)
//! - Read-only views for display

mod records;
mod types;
mod views;

pub use records::*;
pub use types::*;
pub use views::*;
