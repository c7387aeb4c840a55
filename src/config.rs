//! Settings file handling (`config.toml` inside the app directory).
//!
//! Precedence applied by the binaries: CLI flag, then environment, then the
//! settings file, then the defaults below.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::app_dirs::AppDirs;
use crate::coloration::BackendPreference;

/// File name of the settings file inside the app directory.
pub const CONFIG_FILE_NAME: &str = "config.toml";
/// Environment variable naming the embedding model directory.
pub const MODEL_DIR_ENV: &str = "CLAP_ONNX_DIR";
/// Model directory used when nothing else is configured.
pub const DEFAULT_MODEL_DIR: &str = "models/clap-htsat-unfused/onnx";
/// Model file expected inside the model directory.
pub const DEFAULT_MODEL_FILE: &str = "model.onnx";

/// Errors that may occur while loading settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No usable config directory found.
    #[error("No suitable config directory found")]
    NoConfigDir,
    /// Failed to read the settings file.
    #[error("Failed to read {path}: {source}")]
    Read {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },
    /// Failed to parse TOML settings.
    #[error("Invalid config at {path}: {source}")]
    ParseToml {
        /// TOML file path.
        path: PathBuf,
        /// TOML parse error.
        source: toml::de::Error,
    },
    /// A value parsed but is out of range.
    #[error("Invalid setting `{key}`: {reason}")]
    Invalid {
        /// Dotted key of the offending setting.
        key: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
}

/// Top-level settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub embedding: EmbeddingSettings,
    pub coloration: ColorationSettings,
    pub logging: LoggingSettings,
}

/// Embedding model location and input framing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    pub model_dir: PathBuf,
    pub model_file: String,
    pub sample_rate: u32,
    pub clip_seconds: f32,
    pub mono: bool,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from(DEFAULT_MODEL_DIR),
            model_file: DEFAULT_MODEL_FILE.to_string(),
            sample_rate: 48_000,
            clip_seconds: 10.0,
            mono: true,
        }
    }
}

impl EmbeddingSettings {
    /// Full path of the model artifact.
    pub fn model_path(&self) -> PathBuf {
        self.model_dir.join(&self.model_file)
    }
}

/// Defaults for the coloration command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorationSettings {
    pub max_seconds: f32,
    pub ckpt_dir: Option<PathBuf>,
    pub backend: BackendPreference,
}

impl Default for ColorationSettings {
    fn default() -> Self {
        Self {
            max_seconds: 4.0,
            ckpt_dir: None,
            backend: BackendPreference::Auto,
        }
    }
}

/// Log verbosity and retention for the command-line tools.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default filter directive; `RUST_LOG` takes precedence.
    pub level: String,
    /// Log files kept per tool.
    pub max_files: usize,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            max_files: 10,
        }
    }
}

impl Settings {
    /// Reject values the pipeline cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.embedding.sample_rate == 0 {
            return Err(ConfigError::Invalid {
                key: "embedding.sample_rate",
                reason: "must be positive".into(),
            });
        }
        check_positive_seconds("embedding.clip_seconds", self.embedding.clip_seconds)?;
        check_positive_seconds("coloration.max_seconds", self.coloration.max_seconds)?;
        if self.logging.max_files == 0 {
            return Err(ConfigError::Invalid {
                key: "logging.max_files",
                reason: "must keep at least one file".into(),
            });
        }
        if self.embedding.model_file.trim().is_empty() {
            return Err(ConfigError::Invalid {
                key: "embedding.model_file",
                reason: "must not be empty".into(),
            });
        }
        Ok(())
    }

    /// Apply environment overrides on top of file values.
    pub fn apply_env(&mut self) {
        if let Ok(dir) = std::env::var(MODEL_DIR_ENV) {
            if !dir.trim().is_empty() {
                self.embedding.model_dir = PathBuf::from(dir);
            }
        }
    }
}

pub(crate) fn check_positive_seconds(key: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            key,
            reason: format!("expected a positive number of seconds, got {value}"),
        })
    }
}

/// Resolve the settings file path inside the app directory.
pub fn config_path() -> Result<PathBuf, ConfigError> {
    AppDirs::resolve()
        .map(|dirs| dirs.config_file())
        .map_err(|_| ConfigError::NoConfigDir)
}

/// Load settings from the app directory, falling back to defaults, then apply
/// environment overrides and validate.
pub fn load_or_default() -> Result<Settings, ConfigError> {
    let mut settings = match config_path() {
        Ok(path) => load_settings_from(&path)?,
        Err(_) => Settings::default(),
    };
    settings.apply_env();
    settings.validate()?;
    Ok(settings)
}

/// Load settings from an explicit file; a missing file yields defaults.
pub fn load_settings_from(path: &Path) -> Result<Settings, ConfigError> {
    if !path.exists() {
        return Ok(Settings::default());
    }
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&text).map_err(|source| ConfigError::ParseToml {
        path: path.to_path_buf(),
        source,
    })
}
