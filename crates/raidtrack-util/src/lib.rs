//! Shared utilities for raidtrack
//!
//! This crate provides:
//! - ID types (CharacterId, DungeonId)
//! - Day-of-week names used by character schedules
//! - Time utilities (mockable wall clock, duration formatting)
//! - Default paths for config and data directories

mod day;
mod ids;
mod paths;
mod time;

pub use day::*;
pub use ids::*;
pub use paths::*;
pub use time::*;
