//! Default paths for raidtrack components
//!
//! Paths are user-writable by default:
//! - Config: `$XDG_CONFIG_HOME/raidtrack/config.toml` or `~/.config/raidtrack/config.toml`
//! - Data: `$XDG_DATA_HOME/raidtrack` or `~/.local/share/raidtrack`

use std::path::PathBuf;

/// Environment variable for overriding the data directory
pub const RAIDTRACK_DATA_DIR_ENV: &str = "RAIDTRACK_DATA_DIR";

/// Application subdirectory name
const APP_DIR: &str = "raidtrack";

/// Config filename within the config directory
const CONFIG_FILENAME: &str = "config.toml";

/// Get the default config file path.
pub fn default_config_path() -> PathBuf {
    if let Ok(config_home) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(config_home).join(APP_DIR).join(CONFIG_FILENAME);
    }

    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home)
            .join(".config")
            .join(APP_DIR)
            .join(CONFIG_FILENAME);
    }

    PathBuf::from("/etc").join(APP_DIR).join(CONFIG_FILENAME)
}

/// Get the default data directory.
///
/// Order of precedence:
/// 1. `$RAIDTRACK_DATA_DIR` environment variable (if set)
/// 2. `$XDG_DATA_HOME/raidtrack` (if XDG_DATA_HOME is set)
/// 3. `~/.local/share/raidtrack` (fallback)
pub fn default_data_dir() -> PathBuf {
    if let Ok(path) = std::env::var(RAIDTRACK_DATA_DIR_ENV) {
        return PathBuf::from(path);
    }

    data_dir_without_env()
}

/// Get the data directory without checking RAIDTRACK_DATA_DIR.
/// Used where the env var is checked separately, e.g. by a CLI flag with an env fallback.
pub fn data_dir_without_env() -> PathBuf {
    if let Ok(data_home) = std::env::var("XDG_DATA_HOME") {
        return PathBuf::from(data_home).join(APP_DIR);
    }

    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home)
            .join(".local")
            .join("share")
            .join(APP_DIR);
    }

    PathBuf::from("/tmp").join(APP_DIR).join("data")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_path_is_toml_under_app_dir() {
        let path = default_config_path();
        assert!(path.to_string_lossy().contains("raidtrack"));
        assert!(path.to_string_lossy().ends_with("config.toml"));
    }

    #[test]
    fn data_dir_contains_raidtrack() {
        let path = data_dir_without_env();
        assert!(path.to_string_lossy().contains("raidtrack"));
    }
}
