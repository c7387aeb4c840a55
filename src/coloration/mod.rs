//! Timbre coloration: a learned resynthesis backend or a fixed spectral tilt.
//!
//! The backend is chosen once, before any processing, by
//! [`ColorationEngine::select`]. A learned-path failure is reported as-is and
//! never retried on the spectral path.

mod checkpoint;
mod gin;
mod learned;
mod onnx;
mod select;
mod spectral;
pub mod wav;

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::analysis::audio::AudioBuffer;

pub use checkpoint::{Checkpoint, DEFAULT_MODEL_RATE, ModelFraming};
pub use gin::GinConfig;
pub use learned::{FramePlan, ResynthesisBackend, ResynthesisEngine, frame_plan};
pub use onnx::OnnxResynthesisEngine;
pub use select::{BackendChoice, ColorationEngine};
pub use spectral::tilt_gain;

/// Which backend the caller asks for.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum BackendPreference {
    /// Learned when an engine and a valid checkpoint exist, else spectral.
    #[default]
    Auto,
    /// Learned only; a missing engine or checkpoint is a configuration error.
    Learned,
    /// Always the spectral tilt.
    Spectral,
}

/// Per-run coloration settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorationConfig {
    /// Seconds of source audio to process.
    pub max_seconds: f32,
    pub ckpt_dir: Option<PathBuf>,
    pub preference: BackendPreference,
}

impl Default for ColorationConfig {
    fn default() -> Self {
        Self {
            max_seconds: 4.0,
            ckpt_dir: None,
            preference: BackendPreference::Auto,
        }
    }
}

/// The path that actually ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorationMode {
    Learned,
    FallbackNoCheckpoint,
    FallbackNoEngine,
    FallbackRequested,
}

impl ColorationMode {
    pub fn is_learned(self) -> bool {
        matches!(self, Self::Learned)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Learned => "learned autoencoder",
            Self::FallbackNoCheckpoint => {
                "spectral fallback (learned engine available but no valid checkpoint)"
            }
            Self::FallbackNoEngine => "spectral fallback (no learned engine)",
            Self::FallbackRequested => "spectral fallback (requested)",
        }
    }
}

impl fmt::Display for ColorationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Colored audio, peak-normalized, with the mode that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorationOutcome {
    pub mode: ColorationMode,
    pub audio: AudioBuffer,
}

/// Divide by the absolute peak when it is positive.
pub fn normalize_peak(samples: &mut [f32]) {
    let peak = samples.iter().map(|s| s.abs()).fold(0.0_f32, f32::max);
    if peak > 0.0 && peak.is_finite() {
        for sample in samples.iter_mut() {
            *sample /= peak;
        }
    }
}
