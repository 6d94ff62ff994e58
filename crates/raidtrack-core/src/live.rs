//! Live state reducer over the detector's event stream
//!
//! States: NoCharacter -> Lobby(character) <-> InDungeon(character, dungeon)
//!
//! The reducer is the only writer of [`LiveState`]. Malformed messages are
//! dropped without a transition.

use raidtrack_api::{DungeonActivity, DungeonUpdate, StreamEvent, StreamMessage, decode_line};
use raidtrack_util::{CharacterId, DungeonId};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::CoreEvent;

/// Current phase of the reducer
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LivePhase {
    #[default]
    NoCharacter,
    Lobby {
        character_id: CharacterId,
    },
    InDungeon {
        character_id: CharacterId,
        dungeon_id: DungeonId,
    },
}

impl LivePhase {
    pub fn character_id(&self) -> Option<&CharacterId> {
        match self {
            LivePhase::NoCharacter => None,
            LivePhase::Lobby { character_id } => Some(character_id),
            LivePhase::InDungeon { character_id, .. } => Some(character_id),
        }
    }

    pub fn dungeon_id(&self) -> Option<&DungeonId> {
        match self {
            LivePhase::InDungeon { dungeon_id, .. } => Some(dungeon_id),
            _ => None,
        }
    }
}

/// Read-only snapshot of what the player is doing right now
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveState {
    pub active_character_id: Option<CharacterId>,
    pub active_dungeon_id: Option<DungeonId>,
}

impl From<&LivePhase> for LiveState {
    fn from(phase: &LivePhase) -> Self {
        Self {
            active_character_id: phase.character_id().cloned(),
            active_dungeon_id: phase.dungeon_id().cloned(),
        }
    }
}

/// Single-writer state machine fed by stream messages
#[derive(Debug, Default)]
pub struct LiveStateReducer {
    phase: LivePhase,
}

impl LiveStateReducer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> &LivePhase {
        &self.phase
    }

    pub fn state(&self) -> LiveState {
        LiveState::from(&self.phase)
    }

    /// Decode and apply one NDJSON line. Undecodable lines are dropped.
    pub fn apply_line(&mut self, line: &str) -> Vec<CoreEvent> {
        match decode_line(line) {
            Ok(event) => self.apply(&event),
            Err(e) => {
                warn!(error = %e, "Dropping malformed stream line");
                Vec::new()
            }
        }
    }

    /// Decode and apply one message. Malformed payloads are dropped.
    pub fn apply_message(&mut self, message: &StreamMessage) -> Vec<CoreEvent> {
        match message.decode() {
            Ok(event) => self.apply(&event),
            Err(e) => {
                warn!(kind = %message.event, error = %e, "Dropping malformed stream message");
                Vec::new()
            }
        }
    }

    /// Apply a single decoded event
    pub fn apply(&mut self, event: &StreamEvent) -> Vec<CoreEvent> {
        self.apply_tick(std::slice::from_ref(event))
    }

    /// Apply the events delivered together in one tick.
    ///
    /// A character event normally lands in the lobby, but if a `started`
    /// event in the same tick names a dungeon the character goes straight
    /// into it. Character events are applied before dungeon events
    /// regardless of their order within the tick.
    pub fn apply_tick(&mut self, events: &[StreamEvent]) -> Vec<CoreEvent> {
        let tick_dungeon = events
            .iter()
            .filter_map(|event| match event {
                StreamEvent::Dungeon(DungeonUpdate {
                    activity: DungeonActivity::Started,
                    dungeon_id: Some(dungeon_id),
                }) => Some(dungeon_id),
                _ => None,
            })
            .last();

        let mut out = Vec::new();

        // Character events land first so dungeon events in the same tick are
        // attributed to the new character, not the previous one
        for event in events {
            if let StreamEvent::Character(character_id) = event {
                self.on_character(character_id.as_ref(), tick_dungeon, &mut out);
            }
        }
        for event in events {
            if let StreamEvent::Dungeon(update) = event {
                self.on_dungeon(update, &mut out);
            }
        }
        out
    }

    /// Decode and apply lines that arrived together as one tick.
    /// Undecodable lines are dropped; the rest still form the tick.
    pub fn apply_lines<S: AsRef<str>>(&mut self, lines: &[S]) -> Vec<CoreEvent> {
        let events: Vec<StreamEvent> = lines
            .iter()
            .filter_map(|line| match decode_line(line.as_ref()) {
                Ok(event) => Some(event),
                Err(e) => {
                    warn!(error = %e, "Dropping malformed stream line");
                    None
                }
            })
            .collect();
        self.apply_tick(&events)
    }

    fn on_character(
        &mut self,
        character_id: Option<&CharacterId>,
        tick_dungeon: Option<&DungeonId>,
        out: &mut Vec<CoreEvent>,
    ) {
        let next = match (character_id, tick_dungeon) {
            (None, _) => LivePhase::NoCharacter,
            (Some(c), Some(d)) => LivePhase::InDungeon {
                character_id: c.clone(),
                dungeon_id: d.clone(),
            },
            (Some(c), None) => LivePhase::Lobby {
                character_id: c.clone(),
            },
        };
        self.transition(next, false, out);
    }

    fn on_dungeon(&mut self, update: &DungeonUpdate, out: &mut Vec<CoreEvent>) {
        match update.activity {
            DungeonActivity::Started => {
                let (Some(character_id), Some(dungeon_id)) =
                    (self.phase.character_id(), update.dungeon_id.as_ref())
                else {
                    debug!(dungeon_id = ?update.dungeon_id, "Dungeon started with no active character");
                    return;
                };
                let next = LivePhase::InDungeon {
                    character_id: character_id.clone(),
                    dungeon_id: dungeon_id.clone(),
                };
                self.transition(next, false, out);
            }
            DungeonActivity::Completed | DungeonActivity::NotPlaying => {
                let completed = update.activity == DungeonActivity::Completed;
                let left_dungeon = self.phase.dungeon_id().is_some();

                if let Some(character_id) = self.phase.character_id().cloned() {
                    if left_dungeon {
                        self.transition(
                            LivePhase::Lobby {
                                character_id: character_id.clone(),
                            },
                            completed,
                            out,
                        );
                    }
                    if completed || left_dungeon {
                        out.push(CoreEvent::RefetchProgress { character_id });
                    }
                    if completed {
                        out.push(CoreEvent::RefetchDayStatistics);
                    }
                }
            }
        }
    }

    /// Move to `next`, emitting the events that describe the change.
    /// `completed` marks whether leaving a dungeon means it was cleared.
    fn transition(&mut self, next: LivePhase, completed: bool, out: &mut Vec<CoreEvent>) {
        if next == self.phase {
            return;
        }

        let previous = std::mem::replace(&mut self.phase, next);

        let prev_character = previous.character_id();
        let next_character = self.phase.character_id();
        if prev_character != next_character {
            info!(
                previous = ?prev_character.map(CharacterId::as_str),
                current = ?next_character.map(CharacterId::as_str),
                "Active character changed"
            );
            out.push(CoreEvent::CharacterChanged {
                previous: prev_character.cloned(),
                current: next_character.cloned(),
            });
        }

        if let LivePhase::InDungeon { character_id, dungeon_id } = &previous {
            info!(
                character_id = %character_id,
                dungeon_id = %dungeon_id,
                completed,
                "Dungeon left"
            );
            out.push(CoreEvent::DungeonLeft {
                character_id: character_id.clone(),
                dungeon_id: dungeon_id.clone(),
                completed,
            });
        }

        if let LivePhase::InDungeon { character_id, dungeon_id } = &self.phase {
            info!(character_id = %character_id, dungeon_id = %dungeon_id, "Dungeon started");
            out.push(CoreEvent::DungeonEntered {
                character_id: character_id.clone(),
                dungeon_id: dungeon_id.clone(),
            });
        }
    }
}
