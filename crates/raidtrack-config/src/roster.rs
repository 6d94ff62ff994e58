//! Validated configuration structures

use crate::schema::{RawCharacter, RawConfig, RawServiceConfig};
use raidtrack_api::{CharacterSchedule, TrackedCharacter};
use raidtrack_util::{CharacterId, DayName, DungeonId};
use std::path::PathBuf;

/// Validated configuration ready for use by the service
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    /// Service configuration
    pub service: ServiceConfig,

    /// Tracked characters in rotation priority order
    pub roster: Vec<TrackedCharacter>,
}

impl TrackerConfig {
    /// Convert from raw config (after validation)
    pub fn from_raw(raw: RawConfig) -> Self {
        Self {
            service: ServiceConfig::from_raw(raw.service),
            roster: raw.characters.into_iter().map(convert_character).collect(),
        }
    }

    /// Get character by ID
    pub fn get_character(&self, id: &CharacterId) -> Option<&TrackedCharacter> {
        self.roster.iter().find(|c| &c.id == id)
    }
}

/// Catalog filename used when the config names none
pub const DEFAULT_CATALOG_FILE: &str = "catalog.json";

/// Progress filename used when the config names none
pub const DEFAULT_PROGRESS_FILE: &str = "progress.json";

/// Where the service reads its backend snapshots from.
///
/// Relative paths (including the defaults) are resolved by the service
/// against its data directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub catalog_path: PathBuf,
    pub progress_path: PathBuf,
}

impl ServiceConfig {
    fn from_raw(raw: RawServiceConfig) -> Self {
        let defaults = Self::default();
        Self {
            catalog_path: raw.catalog_path.unwrap_or(defaults.catalog_path),
            progress_path: raw.progress_path.unwrap_or(defaults.progress_path),
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            catalog_path: PathBuf::from(DEFAULT_CATALOG_FILE),
            progress_path: PathBuf::from(DEFAULT_PROGRESS_FILE),
        }
    }
}

fn convert_character(raw: RawCharacter) -> TrackedCharacter {
    let mut schedule = CharacterSchedule::new();
    for (day_key, dungeons) in raw.schedule {
        // Unknown day keys were rejected during validation
        let Ok(day) = day_key.parse::<DayName>() else {
            continue;
        };
        schedule.set_day(
            day,
            dungeons.iter().map(|d| DungeonId::new(d.as_id_string())),
        );
    }

    TrackedCharacter {
        id: CharacterId::new(raw.id.trim()),
        name: raw.name,
        schedule,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::RawDungeonRef;
    use std::collections::BTreeMap;

    #[test]
    fn converts_day_keys_and_ids() {
        let mut schedule = BTreeMap::new();
        schedule.insert(
            "Tue".to_string(),
            vec![RawDungeonRef::Number(3), RawDungeonRef::Name(" abyss ".into())],
        );

        let config = TrackerConfig::from_raw(RawConfig {
            config_version: 1,
            service: Default::default(),
            characters: vec![RawCharacter {
                id: " aria ".into(),
                name: Some("Aria".into()),
                schedule,
            }],
        });

        let aria = config.get_character(&CharacterId::new("aria")).unwrap();
        assert_eq!(
            aria.schedule.dungeons_for(DayName::Tuesday),
            &[DungeonId::new("3"), DungeonId::new("abyss")]
        );
        assert_eq!(aria.label(), "Aria");
    }

    #[test]
    fn configured_service_paths_are_kept() {
        let service = ServiceConfig::from_raw(RawServiceConfig {
            catalog_path: Some(PathBuf::from("/srv/catalog.json")),
            progress_path: None,
        });
        assert_eq!(service.catalog_path, PathBuf::from("/srv/catalog.json"));
        assert_eq!(service.progress_path, PathBuf::from(DEFAULT_PROGRESS_FILE));
    }

    #[test]
    fn unset_service_paths_stay_relative() {
        let config = crate::parse_config("config_version = 1").unwrap();
        assert!(config.service.catalog_path.is_relative());
        assert!(config.service.progress_path.is_relative());
        assert_eq!(config.service.catalog_path, PathBuf::from("catalog.json"));
    }
}
