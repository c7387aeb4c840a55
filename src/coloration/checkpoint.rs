use std::path::{Path, PathBuf};

use tracing::debug;

use super::gin::GinConfig;
use crate::error::AnalyzerError;

const TIME_STEPS_KEY: &str = "F0LoudnessPreprocessor.time_steps";
const N_SAMPLES_KEY: &str = "Harmonic.n_samples";
const SAMPLE_RATE_KEY: &str = "Harmonic.sample_rate";
/// Working rate assumed when the config does not bind one.
pub const DEFAULT_MODEL_RATE: u32 = 16_000;

/// Training-time framing of a learned model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelFraming {
    pub sample_rate: u32,
    /// Samples per model time step.
    pub hop: usize,
}

impl ModelFraming {
    /// Derive the hop from training `n_samples / time_steps`.
    pub fn from_gin(config: &GinConfig) -> Result<Self, AnalyzerError> {
        let time_steps = required(config, TIME_STEPS_KEY)?;
        let n_samples = required(config, N_SAMPLES_KEY)?;
        let sample_rate = match config.number(SAMPLE_RATE_KEY)? {
            Some(rate) if rate >= 1.0 => rate as u32,
            Some(rate) => {
                return Err(AnalyzerError::configuration(format!(
                    "`{SAMPLE_RATE_KEY}` must be positive, got {rate}"
                )));
            }
            None => DEFAULT_MODEL_RATE,
        };
        let hop = (n_samples / time_steps).floor();
        if hop < 1.0 {
            return Err(AnalyzerError::configuration(format!(
                "`{N_SAMPLES_KEY}` ({n_samples}) is smaller than `{TIME_STEPS_KEY}` ({time_steps})"
            )));
        }
        Ok(Self {
            sample_rate,
            hop: hop as usize,
        })
    }

    /// Model time steps per second of audio.
    pub fn steps_per_second(&self) -> f64 {
        self.sample_rate as f64 / self.hop as f64
    }
}

fn required(config: &GinConfig, key: &str) -> Result<f64, AnalyzerError> {
    match config.number(key)? {
        Some(value) if value > 0.0 => Ok(value),
        Some(value) => Err(AnalyzerError::configuration(format!(
            "`{key}` must be positive, got {value}"
        ))),
        None => Err(AnalyzerError::configuration(format!(
            "operative config does not bind `{key}`"
        ))),
    }
}

/// Validated checkpoint directory: operative config plus model weights.
#[derive(Debug, Clone, PartialEq)]
pub struct Checkpoint {
    pub gin_path: PathBuf,
    pub model_path: PathBuf,
    pub framing: ModelFraming,
}

impl Checkpoint {
    /// Locate `*.gin` and `ckpt-*.onnx` inside `dir` and read the framing.
    pub fn discover(dir: &Path) -> Result<Self, AnalyzerError> {
        if !dir.is_dir() {
            return Err(AnalyzerError::configuration(format!(
                "checkpoint directory not found or invalid: {}",
                dir.display()
            )));
        }
        let mut names: Vec<(String, PathBuf)> = std::fs::read_dir(dir)
            .map_err(|source| AnalyzerError::file(dir, source))?
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().is_file())
            .filter_map(|entry| {
                let name = entry.file_name().to_str()?.to_string();
                Some((name, entry.path()))
            })
            .collect();
        names.sort();

        let gin_path = names
            .iter()
            .find(|(name, _)| name.ends_with(".gin") && !name.starts_with('.'))
            .map(|(_, path)| path.clone());
        let model_path = names
            .iter()
            .find(|(name, _)| name.starts_with("ckpt-") && name.ends_with(".onnx"))
            .map(|(_, path)| path.clone());
        let (Some(gin_path), Some(model_path)) = (gin_path, model_path) else {
            return Err(AnalyzerError::configuration(format!(
                "Could not find .gin or ckpt-* files in checkpoint dir: {}",
                dir.display()
            )));
        };

        let framing = ModelFraming::from_gin(&GinConfig::load(&gin_path)?)?;
        debug!(
            gin = %gin_path.display(),
            model = %model_path.display(),
            hop = framing.hop,
            sample_rate = framing.sample_rate,
            "Discovered checkpoint"
        );
        Ok(Self {
            gin_path,
            model_path,
            framing,
        })
    }
}
