// Shell configuration loaded from TOML, with defaults for every field

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

use crate::layout::{Viewport, TASKBAR_RESERVE};
use crate::state::window::Point;
use crate::state::Cascade;

pub const API_KEY_ENV: &str = "ZENITH_API_KEY";
pub const CONFIG_FILE_NAME: &str = "zenith.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DesktopConfig {
    pub width: f64,
    pub height: f64,
    pub taskbar_reserve: f64,
    pub cascade_origin: (f64, f64),
    pub cascade_step: f64,
    /// Start on the desktop instead of the boot screen
    pub skip_boot: bool,
}

impl Default for DesktopConfig {
    fn default() -> Self {
        Self {
            width: 1920.0,
            height: 1080.0,
            taskbar_reserve: TASKBAR_RESERVE,
            cascade_origin: (100.0, 50.0),
            cascade_step: 30.0,
            skip_boot: false,
        }
    }
}

impl DesktopConfig {
    pub fn viewport(&self) -> Viewport {
        Viewport {
            width: self.width,
            height: self.height,
            taskbar_reserve: self.taskbar_reserve,
        }
    }

    pub fn cascade(&self) -> Cascade {
        Cascade {
            origin: Point::new(self.cascade_origin.0, self.cascade_origin.1),
            step: self.cascade_step,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub base_url: String,
    pub text_model: String,
    pub image_model: String,
    pub max_attempts: u32,
    pub initial_backoff_ms: u64,
    pub api_key: Option<String>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            text_model: "gemini-2.5-flash-preview-09-2025".to_string(),
            image_model: "imagen-4.0-generate-001".to_string(),
            max_attempts: 5,
            initial_backoff_ms: 1000,
            api_key: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    pub desktop: DesktopConfig,
    pub generation: GenerationConfig,
}

impl ShellConfig {
    pub fn parse(text: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Read `path` if it exists, otherwise use defaults. The API key
    /// environment variable wins over the file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = if path.exists() {
            let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;
            info!("Loaded config from {}", path.display());
            Self::parse(&text, path)?
        } else {
            debug!("No config at {}, using defaults", path.display());
            Self::default()
        };

        if let Ok(key) = std::env::var(API_KEY_ENV) {
            if !key.is_empty() {
                config.generation.api_key = Some(key);
            }
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = ShellConfig::parse(
            r#"
            [desktop]
            width = 1280.0
            height = 720.0
            skip_boot = true

            [generation]
            max_attempts = 3
            "#,
            Path::new("inline.toml"),
        )
        .unwrap();

        assert_eq!(config.desktop.width, 1280.0);
        assert!(config.desktop.skip_boot);
        assert_eq!(config.desktop.taskbar_reserve, 72.0);
        assert_eq!(config.generation.max_attempts, 3);
        assert_eq!(config.generation.initial_backoff_ms, 1000);
        assert_eq!(config.desktop.viewport().available_height(), 648.0);
    }

    #[test]
    fn test_bad_toml_reports_path() {
        let err = ShellConfig::parse("[desktop\nwidth = ", Path::new("broken.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("broken.toml"));
    }

    #[test]
    fn test_load_from_file_and_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = ShellConfig::load(&dir.path().join(CONFIG_FILE_NAME)).unwrap();
        assert_eq!(missing.desktop, DesktopConfig::default());

        let path = dir.path().join(CONFIG_FILE_NAME);
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "[desktop]\ncascade_step = 12.5").unwrap();
        let loaded = ShellConfig::load(&path).unwrap();
        assert_eq!(loaded.desktop.cascade().step, 12.5);
        assert_eq!(loaded.desktop.cascade().origin, Point::new(100.0, 50.0));
    }
}
