use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

use crate::export::ExportFormat;
use crate::state::EngineSettings;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not determine a config directory for this platform")]
    NoConfigDir,
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("failed to write config {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub editing: EditingConfig,
    #[serde(default)]
    pub labels: LabelsConfig,
    #[serde(default)]
    pub export: ExportConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default = "default_max_width")]
    pub max_width: u32,
    #[serde(default = "default_max_height")]
    pub max_height: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditingConfig {
    #[serde(default = "default_min_box_size")]
    pub min_box_size: f32,
    #[serde(default = "default_handle_size")]
    pub handle_size: f32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LabelsConfig {
    pub config_file: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportConfig {
    #[serde(default)]
    pub default_format: ExportFormat,
    #[serde(default = "default_json_file_name")]
    pub json_file_name: String,
}

// Default value functions
fn default_max_width() -> u32 {
    640
}

fn default_max_height() -> u32 {
    480
}

fn default_min_box_size() -> f32 {
    5.0
}

fn default_handle_size() -> f32 {
    6.0
}

fn default_json_file_name() -> String {
    "annotations.json".to_string()
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            max_width: default_max_width(),
            max_height: default_max_height(),
        }
    }
}

impl Default for EditingConfig {
    fn default() -> Self {
        Self {
            min_box_size: default_min_box_size(),
            handle_size: default_handle_size(),
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            default_format: ExportFormat::default(),
            json_file_name: default_json_file_name(),
        }
    }
}

impl AppConfig {
    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            max_display_width: self.display.max_width,
            max_display_height: self.display.max_height,
            min_box_size: self.editing.min_box_size,
            handle_size: self.editing.handle_size,
        }
    }
}

/// Get the path to the config file
pub fn config_path() -> Result<PathBuf, ConfigError> {
    let dirs = directories::ProjectDirs::from("", "", "box-annotator")
        .ok_or(ConfigError::NoConfigDir)?;
    Ok(dirs.config_dir().join("config.toml"))
}

/// Parse a config file; missing sections and keys take their defaults.
pub fn read_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(toml::from_str(&content)?)
}

/// Load configuration from `path` (or the platform config file), falling
/// back to defaults when it is missing or broken.
pub fn load_config(path: Option<&Path>) -> AppConfig {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => match config_path() {
            Ok(p) => p,
            Err(e) => {
                warn!("{e}. Using defaults.");
                return AppConfig::default();
            }
        },
    };

    if !path.exists() {
        return AppConfig::default();
    }

    match read_config(&path) {
        Ok(config) => config,
        Err(e) => {
            warn!("{e}. Using defaults.");
            AppConfig::default()
        }
    }
}

/// Save configuration to `path`, creating parent directories.
pub fn save_config(config: &AppConfig, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let toml = toml::to_string_pretty(config)?;
    std::fs::write(path, toml).map_err(|source| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.engine_settings(), EngineSettings::default());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config: AppConfig = toml::from_str(
            "[display]\nmax_width = 1024\n\n[editing]\nmin_box_size = 10.0\n\n[export]\ndefault_format = \"yolo\"\n",
        )
        .unwrap();
        assert_eq!(config.display.max_width, 1024);
        assert_eq!(config.display.max_height, 480);
        assert_eq!(config.editing.min_box_size, 10.0);
        assert_eq!(config.editing.handle_size, 6.0);
        assert_eq!(config.export.default_format, ExportFormat::Yolo);
        assert_eq!(config.export.json_file_name, "annotations.json");
    }

    #[test]
    fn save_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cfg").join("config.toml");

        let mut config = AppConfig::default();
        config.labels.config_file = Some("~/labels.yaml".into());
        config.editing.handle_size = 8.0;
        save_config(&config, &path).unwrap();

        assert_eq!(read_config(&path).unwrap(), config);
    }

    #[test]
    fn broken_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[display\nmax_width = ").unwrap();
        assert_eq!(load_config(Some(&path)), AppConfig::default());
    }
}
