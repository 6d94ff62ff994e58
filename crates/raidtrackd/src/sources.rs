//! Backend snapshot files: dungeon catalog and progress aggregates

use raidtrack_api::{CatalogDungeon, Dungeon, ProgressAggregate, normalize_catalog};
use raidtrack_util::CharacterId;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("Failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

pub type TrackerResult<T> = Result<T, TrackerError>;

/// Resolve a configured path against a base directory when it is relative
pub fn resolve_path(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> TrackerResult<T> {
    let content = std::fs::read_to_string(path).map_err(|source| TrackerError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| TrackerError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Load and normalize the dungeon catalog
pub fn load_catalog(path: &Path) -> TrackerResult<Vec<Dungeon>> {
    let raw: Vec<CatalogDungeon> = read_json(path)?;
    let catalog = normalize_catalog(raw);
    debug!(path = %path.display(), dungeons = catalog.len(), "Catalog loaded");
    Ok(catalog)
}

/// Load progress aggregates.
///
/// A missing file means no runs have been recorded yet and yields an empty
/// list. Any other failure is an error.
pub fn load_progress(path: &Path) -> TrackerResult<Vec<ProgressAggregate>> {
    if !path.exists() {
        warn!(path = %path.display(), "Progress file missing, assuming no runs");
        return Ok(Vec::new());
    }

    let aggregates: Vec<ProgressAggregate> = read_json(path)?;
    debug!(path = %path.display(), records = aggregates.len(), "Progress loaded");
    Ok(aggregates)
}

/// Aggregates belonging to one character
pub fn progress_for<'a>(
    aggregates: &'a [ProgressAggregate],
    character_id: &'a CharacterId,
) -> impl Iterator<Item = &'a ProgressAggregate> {
    aggregates
        .iter()
        .filter(move |a| &a.character_id == character_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use raidtrack_api::EntryPeriod;
    use std::io::Write;

    fn write_temp(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn catalog_is_normalized() {
        let file = write_temp(
            r#"[
                {"id": 1, "name": "gate", "displayName": "Gate", "type": "hero",
                 "entryLimit": 1, "entryPeriod": "daily"},
                {"id": "ev", "name": "festival", "type": "event"}
            ]"#,
        );

        let catalog = load_catalog(file.path()).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog[0].id.as_str(), "1");
        assert_eq!(catalog[0].quota.map(|q| q.period), Some(EntryPeriod::Daily));
        assert!(!catalog[1].is_tracked());
    }

    #[test]
    fn missing_progress_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let progress = load_progress(&dir.path().join("progress.json")).unwrap();
        assert!(progress.is_empty());
    }

    #[test]
    fn broken_progress_is_a_parse_error() {
        let file = write_temp("[{");
        assert!(matches!(
            load_progress(file.path()),
            Err(TrackerError::Parse { .. })
        ));
    }

    #[test]
    fn progress_filtered_by_character() {
        let file = write_temp(
            r#"[
                {"characterId": "aria", "dungeonId": 1, "entriesCount": 1, "avgClearSeconds": 60.0},
                {"characterId": "brom", "dungeonId": 1, "entriesCount": 0, "avgClearSeconds": null}
            ]"#,
        );
        let aggregates = load_progress(file.path()).unwrap();
        let aria = CharacterId::new("aria");
        assert_eq!(progress_for(&aggregates, &aria).count(), 1);
    }

    #[test]
    fn default_snapshot_paths_follow_data_dir() {
        let config = raidtrack_config::parse_config("config_version = 1").unwrap();
        let data_dir = Path::new("/custom/data");
        assert_eq!(
            resolve_path(data_dir, &config.service.catalog_path),
            PathBuf::from("/custom/data/catalog.json")
        );
        assert_eq!(
            resolve_path(data_dir, &config.service.progress_path),
            PathBuf::from("/custom/data/progress.json")
        );
    }

    #[test]
    fn relative_paths_resolve_against_base() {
        let base = Path::new("/data/raidtrack");
        assert_eq!(
            resolve_path(base, Path::new("catalog.json")),
            PathBuf::from("/data/raidtrack/catalog.json")
        );
        assert_eq!(
            resolve_path(base, Path::new("/srv/catalog.json")),
            PathBuf::from("/srv/catalog.json")
        );
    }
}
