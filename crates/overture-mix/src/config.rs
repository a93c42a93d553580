//! Global configuration
//!
//! Stored as YAML under the platform config directory
//! (`~/.config/overture/config.yaml` on Linux). A missing or invalid
//! file falls back to defaults with a warning; configuration selects the
//! shuffle randomness policy and the default bar counts, never the fixed
//! assembly constants.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::plan::DEFAULT_BARS_COUNT;
use crate::shuffle::ShuffleMode;

/// Root configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OvertureConfig {
    /// Shuffle randomness policy for this deployment
    pub shuffle_mode: ShuffleMode,
    /// Default number of intro bars when not given on the command line
    pub intro_bars: u32,
    /// Default number of outro bars when not given on the command line
    pub outro_bars: u32,
}

impl Default for OvertureConfig {
    fn default() -> Self {
        Self {
            shuffle_mode: ShuffleMode::DeterministicSeeded,
            intro_bars: DEFAULT_BARS_COUNT,
            outro_bars: DEFAULT_BARS_COUNT,
        }
    }
}

/// Default config file location
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("overture").join("config.yaml"))
}

/// Load configuration, falling back to defaults
///
/// A nonexistent file is normal (first run); an unreadable or
/// unparsable file logs a warning rather than failing the job.
pub fn load_config(path: &Path) -> OvertureConfig {
    if !path.exists() {
        log::info!("no config at {:?}, using defaults", path);
        return OvertureConfig::default();
    }

    match std::fs::read_to_string(path) {
        Ok(contents) => match serde_yaml::from_str(&contents) {
            Ok(config) => {
                log::info!("loaded config from {:?}", path);
                config
            }
            Err(e) => {
                log::warn!("failed to parse config {:?}: {}, using defaults", path, e);
                OvertureConfig::default()
            }
        },
        Err(e) => {
            log::warn!("failed to read config {:?}: {}, using defaults", path, e);
            OvertureConfig::default()
        }
    }
}

/// Save configuration, creating parent directories as needed
pub fn save_config(config: &OvertureConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create config directory: {parent:?}"))?;
    }
    let yaml = serde_yaml::to_string(config).context("failed to serialize config")?;
    std::fs::write(path, yaml).with_context(|| format!("failed to write config: {path:?}"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let config = load_config(Path::new("/nonexistent/overture/config.yaml"));
        assert_eq!(config, OvertureConfig::default());
        assert_eq!(config.shuffle_mode, ShuffleMode::DeterministicSeeded);
    }

    #[test]
    fn test_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        let config = OvertureConfig {
            shuffle_mode: ShuffleMode::CryptographicallyRandom,
            intro_bars: 8,
            outro_bars: 4,
        };
        save_config(&config, &path).unwrap();
        assert_eq!(load_config(&path), config);
    }

    #[test]
    fn test_invalid_yaml_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "shuffle_mode: [not, a, mode]").unwrap();
        assert_eq!(load_config(&path), OvertureConfig::default());
    }

    #[test]
    fn test_mode_tag_spelling() {
        let yaml = "shuffle_mode: cryptographically-random\n";
        let config: OvertureConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.shuffle_mode, ShuffleMode::CryptographicallyRandom);
    }
}
