//! Wire types for raidtrack
//!
//! This crate defines the data exchanged with raidtrack's collaborators:
//! - Dungeon catalog and quota metadata (backend -> core)
//! - Progress aggregates and run records (backend -> core)
//! - Tracked-character roster with day schedules (config -> core)
//! - Live stream messages (detector -> core)
//! - Recommendation and ETC results (core -> UI)

mod events;
mod types;

pub use events::*;
pub use types::*;
