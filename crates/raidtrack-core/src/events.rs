//! Core events emitted by the live state reducer

use raidtrack_util::{CharacterId, DungeonId};

/// Events emitted when the reducer accepts a stream message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreEvent {
    /// The active character changed (either side may be "no character")
    CharacterChanged {
        previous: Option<CharacterId>,
        current: Option<CharacterId>,
    },

    /// The active character entered a dungeon
    DungeonEntered {
        character_id: CharacterId,
        dungeon_id: DungeonId,
    },

    /// The active character left a dungeon
    DungeonLeft {
        character_id: CharacterId,
        dungeon_id: DungeonId,
        completed: bool,
    },

    /// Cached progress aggregates for this character are stale
    RefetchProgress { character_id: CharacterId },

    /// Day-level statistics are stale
    RefetchDayStatistics,
}

impl CoreEvent {
    /// Whether this event asks the data layer to fetch something again
    pub fn is_refetch(&self) -> bool {
        matches!(
            self,
            CoreEvent::RefetchProgress { .. } | CoreEvent::RefetchDayStatistics
        )
    }
}
