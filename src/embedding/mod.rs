//! Fixed-length framing and model-backed audio embeddings.
//!
//! The adapter owns its backend for the life of the process: construct it once
//! (which fails fast when the model artifact is absent) and reuse it for every
//! call. Backends take `&mut self` because ONNX sessions need exclusive access
//! per run; callers sharing an adapter across threads serialize access
//! themselves.

mod normalize;
mod onnx;

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::analysis::audio::AudioBuffer;
use crate::config::EmbeddingSettings;
use crate::error::AnalyzerError;

pub use normalize::{fit_to_length, target_len};
pub use onnx::OnnxClapBackend;

/// Input framing expected by the embedding model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EmbeddingConfig {
    pub sample_rate: u32,
    pub clip_seconds: f32,
    pub mono: bool,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48_000,
            clip_seconds: 10.0,
            mono: true,
        }
    }
}

impl From<&EmbeddingSettings> for EmbeddingConfig {
    fn from(settings: &EmbeddingSettings) -> Self {
        Self {
            sample_rate: settings.sample_rate,
            clip_seconds: settings.clip_seconds,
            mono: settings.mono,
        }
    }
}

impl EmbeddingConfig {
    /// `round(sample_rate * clip_seconds)`.
    pub fn target_len(&self) -> usize {
        target_len(self.sample_rate, self.clip_seconds)
    }

    fn validate(&self) -> Result<(), AnalyzerError> {
        if self.sample_rate == 0 {
            return Err(AnalyzerError::configuration(
                "embedding sample rate must be positive",
            ));
        }
        if !(self.clip_seconds.is_finite() && self.clip_seconds > 0.0) {
            return Err(AnalyzerError::configuration(format!(
                "embedding clip length must be positive, got {}",
                self.clip_seconds
            )));
        }
        if !self.mono {
            return Err(AnalyzerError::configuration(
                "multi-channel embedding input is not supported",
            ));
        }
        Ok(())
    }
}

/// Model output for one clip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingVector {
    pub values: Vec<f32>,
    pub dim: usize,
}

impl EmbeddingVector {
    pub fn new(values: Vec<f32>) -> Self {
        let dim = values.len();
        Self { values, dim }
    }
}

/// Inference capability consumed by [`EmbeddingAdapter`].
pub trait EmbeddingBackend {
    /// Embed one fixed-length mono clip; returns the raw vector.
    fn embed(&mut self, input: &[f32]) -> Result<Vec<f32>, AnalyzerError>;
}

/// Resamples, frames and embeds buffers with an owned backend.
pub struct EmbeddingAdapter {
    config: EmbeddingConfig,
    backend: Box<dyn EmbeddingBackend>,
}

impl EmbeddingAdapter {
    pub fn new(
        config: EmbeddingConfig,
        backend: Box<dyn EmbeddingBackend>,
    ) -> Result<Self, AnalyzerError> {
        config.validate()?;
        Ok(Self { config, backend })
    }

    /// Build an adapter around the ONNX model at `model_path`.
    pub fn from_model_path(
        model_path: &Path,
        config: EmbeddingConfig,
    ) -> Result<Self, AnalyzerError> {
        config.validate()?;
        let backend = OnnxClapBackend::load(model_path)?;
        Self::new(config, Box::new(backend))
    }

    pub fn config(&self) -> &EmbeddingConfig {
        &self.config
    }

    /// Embed `buffer`, resampling to the model rate when needed.
    pub fn embed(&mut self, buffer: &AudioBuffer) -> Result<EmbeddingVector, AnalyzerError> {
        let resampled;
        let source = if buffer.sample_rate() == self.config.sample_rate {
            buffer
        } else {
            resampled = buffer.resampled(self.config.sample_rate)?;
            &resampled
        };
        self.embed_prepared(source.samples())
    }

    /// Embed samples already at the model rate.
    pub fn embed_prepared(&mut self, samples: &[f32]) -> Result<EmbeddingVector, AnalyzerError> {
        let input = fit_to_length(samples, self.config.target_len());
        let values = self.backend.embed(&input)?;
        if values.is_empty() {
            return Err(AnalyzerError::inference("model produced an empty embedding"));
        }
        debug!(dim = values.len(), "Computed embedding");
        Ok(EmbeddingVector::new(values))
    }
}
