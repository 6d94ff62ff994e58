//! Dungeon progress and rotation recommendation engine for raidtrack
//!
//! This crate is the decision logic of raidtrack:
//! - Quota evaluation (is a dungeon done for this period, how many runs remain)
//! - Progress aggregation from backend records
//! - Schedule evaluation and estimated time to clear (ETC)
//! - Rotation recommendation (which character to play next)
//! - Roster-wide runs per dungeon
//! - Live state reduction over the detector's event stream
//!
//! Everything except the live reducer is a pure function of its inputs.

mod engine;
mod events;
mod live;
mod overview;
mod progress;
mod quota;
mod rotation;
mod schedule;

pub use engine::*;
pub use events::*;
pub use live::*;
pub use overview::*;
pub use progress::*;
pub use quota::*;
pub use rotation::*;
pub use schedule::*;
