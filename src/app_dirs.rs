//! Where the tools keep their settings file and logs.
//!
//! Everything lives in one `.timbrekit` folder under the OS config root.
//! Setting `TIMBREKIT_CONFIG_HOME` replaces that root, which tests and
//! portable installs use.

use std::path::{Path, PathBuf};

use directories::BaseDirs;
use thiserror::Error;

use crate::config::CONFIG_FILE_NAME;

/// Folder created under the config root.
pub const APP_DIR_NAME: &str = ".timbrekit";
/// Environment variable that replaces the OS config root.
pub const CONFIG_HOME_ENV: &str = "TIMBREKIT_CONFIG_HOME";
const LOGS_DIR_NAME: &str = "logs";

#[derive(Debug, Error)]
pub enum AppDirError {
    /// Neither the override nor the OS provided a config root.
    #[error("No suitable base config directory available for application files")]
    NoBaseDir,
    #[error("Failed to create application directory at {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Resolved application folder. Paths are computed, not created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppDirs {
    root: PathBuf,
}

impl AppDirs {
    /// Use `TIMBREKIT_CONFIG_HOME` when set and non-empty, else the OS config dir.
    pub fn resolve() -> Result<Self, AppDirError> {
        let base = std::env::var_os(CONFIG_HOME_ENV)
            .map(PathBuf::from)
            .filter(|path| !path.as_os_str().is_empty())
            .or_else(|| BaseDirs::new().map(|dirs| dirs.config_dir().to_path_buf()))
            .ok_or(AppDirError::NoBaseDir)?;
        Ok(Self::under(base))
    }

    /// Application folder inside an explicit base directory.
    pub fn under(base: impl Into<PathBuf>) -> Self {
        Self {
            root: base.into().join(APP_DIR_NAME),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_file(&self) -> PathBuf {
        self.root.join(CONFIG_FILE_NAME)
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.root.join(LOGS_DIR_NAME)
    }

    /// Create the logs directory (and the root) when missing.
    pub fn ensure_logs_dir(&self) -> Result<PathBuf, AppDirError> {
        let path = self.logs_dir();
        std::fs::create_dir_all(&path).map_err(|source| AppDirError::CreateDir {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }
}
