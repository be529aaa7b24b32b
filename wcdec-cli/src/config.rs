use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;
use webcast_decoder::DecoderConfig;

use crate::error::{AppError, Result};

/// CLI configuration, stored as TOML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Colorize pretty output
    pub colored: bool,
    /// Capacity of the frame and event channels
    pub channel_capacity: usize,
    pub decoder: DecoderConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            colored: true,
            channel_capacity: 256,
            decoder: DecoderConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("wcdec").join("config.toml"))
    }

    /// Load from `path`, or from the default location. A missing file yields defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path.map(Path::to_path_buf).or_else(Self::default_path) else {
            return Ok(Self::default());
        };
        if !path.exists() {
            debug!(path = %path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)?;
        let config: Self = toml::from_str(&content)?;
        if config.channel_capacity == 0 {
            return Err(AppError::InvalidInput(
                "channel_capacity must be greater than zero".to_string(),
            ));
        }
        debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Write the defaults to `path`, or to the default location.
    pub fn reset(path: Option<&Path>) -> Result<PathBuf> {
        let path = path
            .map(Path::to_path_buf)
            .or_else(Self::default_path)
            .ok_or_else(|| AppError::InvalidInput("no config directory available".to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, Self::default().show()?)?;
        Ok(path)
    }

    pub fn show(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use webcast_decoder::EventKind;

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load(Some(&dir.path().join("absent.toml"))).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "colored = false\n\n[decoder]\nmax_inflate_depth = 2\nignored_kinds = [\"room_stats\"]\n",
        )
        .unwrap();

        let config = AppConfig::load(Some(&path)).unwrap();
        assert!(!config.colored);
        assert_eq!(config.channel_capacity, 256);
        assert_eq!(config.decoder.max_inflate_depth, 2);
        assert_eq!(config.decoder.dedup_ttl_secs, 300);
        assert!(config.decoder.is_ignored(EventKind::RoomStats));
    }

    #[test]
    fn test_reset_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let written = AppConfig::reset(Some(&path)).unwrap();
        assert_eq!(written, path);
        assert_eq!(AppConfig::load(Some(&path)).unwrap(), AppConfig::default());
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "channel_capacity = 0\n").unwrap();
        assert!(matches!(
            AppConfig::load(Some(&path)),
            Err(AppError::InvalidInput(_))
        ));
    }
}
