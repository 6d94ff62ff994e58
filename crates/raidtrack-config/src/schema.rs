//! Raw configuration schema (as parsed from TOML)

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Raw configuration as parsed from TOML
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawConfig {
    /// Config schema version
    pub config_version: u32,

    /// Where the service finds its inputs
    #[serde(default)]
    pub service: RawServiceConfig,

    /// Tracked characters, in rotation priority order
    #[serde(default)]
    pub characters: Vec<RawCharacter>,
}

/// Service-level settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawServiceConfig {
    /// Dungeon catalog snapshot (JSON array as served by the backend)
    pub catalog_path: Option<PathBuf>,

    /// Progress aggregate snapshot (JSON array as served by the backend)
    pub progress_path: Option<PathBuf>,
}

/// Raw tracked character
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawCharacter {
    /// Character id as known by the backend
    pub id: String,

    /// Display name
    pub name: Option<String>,

    /// Day name ("monday", "Mon", ...) -> dungeon ids
    #[serde(default)]
    pub schedule: BTreeMap<String, Vec<RawDungeonRef>>,
}

/// Dungeon ids may be written as numbers or strings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum RawDungeonRef {
    Number(i64),
    Name(String),
}

impl RawDungeonRef {
    pub fn as_id_string(&self) -> String {
        match self {
            RawDungeonRef::Number(n) => n.to_string(),
            RawDungeonRef::Name(s) => s.trim().to_string(),
        }
    }
}
