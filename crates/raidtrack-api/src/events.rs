//! Live stream messages from the game-state detector
//!
//! The detector pushes discrete messages over a persistent connection. Each
//! message has a kind (`character` or `dungeons`) and a payload. On the line
//! feed consumed by raidtrackd, one message is one NDJSON envelope:
//!
//! ```json
//! {"event": "character", "data": "1024"}
//! {"event": "dungeons", "data": {"type": "started", "dungeonId": 12}}
//! ```

use raidtrack_util::{CharacterId, DungeonId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Message kind carrying the active character
pub const CHARACTER_EVENT: &str = "character";

/// Message kind carrying dungeon activity
pub const DUNGEONS_EVENT: &str = "dungeons";

/// Raw envelope of one stream message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamMessage {
    pub event: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

impl StreamMessage {
    pub fn new(event: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            event: event.into(),
            data,
        }
    }

    /// Decode the payload according to the message kind
    pub fn decode(&self) -> Result<StreamEvent, StreamError> {
        match self.event.as_str() {
            CHARACTER_EVENT => decode_character(&self.data).map(StreamEvent::Character),
            DUNGEONS_EVENT => decode_dungeon(&self.data).map(StreamEvent::Dungeon),
            other => Err(StreamError::UnknownKind(other.to_string())),
        }
    }
}

/// What the detector reports about dungeon activity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DungeonActivity {
    Started,
    NotPlaying,
    Completed,
}

/// Payload of a `dungeons` message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DungeonUpdate {
    #[serde(rename = "type")]
    pub activity: DungeonActivity,
    #[serde(default)]
    pub dungeon_id: Option<DungeonId>,
}

/// A decoded stream message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// Active character changed. `None` means the detector sees no character.
    Character(Option<CharacterId>),

    /// Dungeon activity changed
    Dungeon(DungeonUpdate),
}

/// Reasons a stream message could not be decoded
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StreamError {
    #[error("Invalid JSON framing: {0}")]
    InvalidJson(String),

    #[error("Unknown message kind: {0}")]
    UnknownKind(String),

    #[error("Malformed {kind} payload: {message}")]
    MalformedPayload { kind: &'static str, message: String },
}

pub type StreamResult<T> = Result<T, StreamError>;

/// Decode one NDJSON line of the feed
pub fn decode_line(line: &str) -> StreamResult<StreamEvent> {
    let message: StreamMessage =
        serde_json::from_str(line.trim()).map_err(|e| StreamError::InvalidJson(e.to_string()))?;
    message.decode()
}

/// Character payloads are an id, an id-like string (possibly still JSON
/// quoted), an object with an `id` field, or null. The detector writes a
/// missing character as the bare text `None`.
fn decode_character(data: &serde_json::Value) -> StreamResult<Option<CharacterId>> {
    use serde_json::Value;

    let malformed = |message: &str| StreamError::MalformedPayload {
        kind: CHARACTER_EVENT,
        message: message.to_string(),
    };

    match data {
        Value::Null => Ok(None),
        Value::Number(n) => n
            .as_i64()
            .map(|n| Some(CharacterId::from(n)))
            .ok_or_else(|| malformed("character id is not an integer")),
        Value::String(s) => {
            let id = s.trim().trim_matches('"').trim();
            let missing = id.is_empty()
                || id.eq_ignore_ascii_case("null")
                || id.eq_ignore_ascii_case("none");
            if missing {
                Ok(None)
            } else {
                Ok(Some(CharacterId::new(id)))
            }
        }
        Value::Object(map) => match map.get("id") {
            Some(inner @ (Value::Null | Value::Number(_) | Value::String(_))) => {
                decode_character(inner)
            }
            _ => Err(malformed("object payload has no usable id")),
        },
        _ => Err(malformed("unsupported payload shape")),
    }
}

/// Dungeon payloads are an object, or the same object encoded as a string.
fn decode_dungeon(data: &serde_json::Value) -> StreamResult<DungeonUpdate> {
    let malformed = |message: String| StreamError::MalformedPayload {
        kind: DUNGEONS_EVENT,
        message,
    };

    let update: DungeonUpdate = match data {
        serde_json::Value::String(s) => {
            serde_json::from_str(s).map_err(|e| malformed(e.to_string()))?
        }
        serde_json::Value::Object(_) => {
            serde_json::from_value(data.clone()).map_err(|e| malformed(e.to_string()))?
        }
        _ => return Err(malformed("unsupported payload shape".into())),
    };

    if update.activity == DungeonActivity::Started && update.dungeon_id.is_none() {
        return Err(malformed("started without a dungeonId".into()));
    }

    Ok(update)
}
