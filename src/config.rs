// ============================================================================
// ENGINE CONFIG - JSON file with per-field defaults
// ============================================================================

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::components::history::DEFAULT_HISTORY_CAPACITY;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read config '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not write config '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

fn default_history_capacity() -> usize {
    DEFAULT_HISTORY_CAPACITY
}

fn default_jpeg_quality() -> u8 {
    90
}

/// Tunables shared by the document and the CLI. Missing fields fall back to
/// their defaults, so an empty object is a valid config.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Undo snapshots kept per document.
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,
    /// Report progress every N rows for every filter instead of each
    /// filter's own cadence.
    #[serde(default)]
    pub progress_interval: Option<u32>,
    /// Fixed noise seed for the TV/CRT filter. Unset means a fresh seed per run.
    #[serde(default)]
    pub tv_seed: Option<u64>,
    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u8,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            history_capacity: default_history_capacity(),
            progress_interval: None,
            tv_seed: None,
            jpeg_quality: default_jpeg_quality(),
        }
    }
}

impl EngineConfig {
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_gives_defaults() {
        let cfg = EngineConfig::from_json("  ").unwrap();
        assert_eq!(cfg, EngineConfig::default());
        assert_eq!(cfg.history_capacity, 20);
        assert_eq!(cfg.jpeg_quality, 90);
        assert_eq!(EngineConfig::from_json("{}").unwrap(), cfg);
    }

    #[test]
    fn partial_json_overrides_only_given_fields() {
        let cfg = EngineConfig::from_json(r#"{ "tv_seed": 42, "progress_interval": 1 }"#).unwrap();
        assert_eq!(cfg.tv_seed, Some(42));
        assert_eq!(cfg.progress_interval, Some(1));
        assert_eq!(cfg.history_capacity, 20);
    }

    #[test]
    fn malformed_json_is_parse_error() {
        assert!(matches!(
            EngineConfig::from_json("{ history_capacity: }"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.json");
        let cfg = EngineConfig {
            history_capacity: 5,
            progress_interval: Some(7),
            tv_seed: Some(1),
            jpeg_quality: 70,
        };
        cfg.save(&path).unwrap();
        assert_eq!(EngineConfig::load(&path).unwrap(), cfg);
    }

    #[test]
    fn missing_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            EngineConfig::load(&dir.path().join("absent.json")),
            Err(ConfigError::Read { .. })
        ));
    }
}
