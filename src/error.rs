use std::path::PathBuf;

use thiserror::Error;

/// Failure categories surfaced by analysis and coloration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Unreadable or missing audio/model file.
    Io,
    /// Invalid or missing configuration, including checkpoints.
    Configuration,
    /// Degenerate numeric input such as an empty buffer.
    Computation,
    /// Embedding or learned resynthesis backend failure.
    ModelInference,
}

/// Errors produced by the analysis and coloration core.
#[derive(Debug, Error)]
pub enum AnalyzerError {
    /// Filesystem access failed.
    #[error("Failed to access {path}: {source}")]
    File {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Audio could not be decoded or encoded.
    #[error("Audio I/O failed: {0}")]
    Audio(String),
    /// Embedding model artifact is absent.
    #[error(
        "ONNX model not found at {0}. Run the model download step or set {env}.",
        env = crate::config::MODEL_DIR_ENV
    )]
    MissingModel(PathBuf),
    /// Configuration or checkpoint is invalid.
    #[error("Configuration error: {0}")]
    Configuration(String),
    /// Numeric pipeline received degenerate input.
    #[error("Computation error: {0}")]
    Computation(String),
    /// Model backend failed to load or run.
    #[error("Model inference failed: {0}")]
    ModelInference(String),
}

impl AnalyzerError {
    pub fn file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::File {
            path: path.into(),
            source,
        }
    }

    pub fn audio(message: impl Into<String>) -> Self {
        Self::Audio(message.into())
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub fn computation(message: impl Into<String>) -> Self {
        Self::Computation(message.into())
    }

    pub fn inference(message: impl Into<String>) -> Self {
        Self::ModelInference(message.into())
    }

    /// Category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::File { .. } | Self::Audio(_) | Self::MissingModel(_) => ErrorKind::Io,
            Self::Configuration(_) => ErrorKind::Configuration,
            Self::Computation(_) => ErrorKind::Computation,
            Self::ModelInference(_) => ErrorKind::ModelInference,
        }
    }
}

impl From<crate::config::ConfigError> for AnalyzerError {
    fn from(err: crate::config::ConfigError) -> Self {
        Self::Configuration(err.to_string())
    }
}
