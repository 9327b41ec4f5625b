//! Progress engine for wird
//!
//! This crate is the heart of wird, containing:
//! - Day task partitioning (which pages belong to which day)
//! - Reading challenges and habit plans with persist-then-commit mutation
//! - Edge-triggered completion detection and restart cycles
//! - The cumulative goal ledger and the global daily streak
//! - The `ProgressEngine` facade emitting `CoreEvent`s

mod catalog;
mod collection;
mod completion;
mod engine;
mod events;
mod goals;
mod habit;
mod partition;
mod plan;
mod quran;
mod streak;

pub use catalog::*;
pub use completion::*;
pub use engine::*;
pub use events::*;
pub use goals::*;
pub use habit::*;
pub use partition::*;
pub use plan::*;
pub use quran::*;
pub use streak::*;
