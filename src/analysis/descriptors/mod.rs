//! Loudness, spectral-shape and transient descriptors of a mono buffer.

mod loudness;
mod spectral;
mod transients;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::analysis::audio::AudioBuffer;
use crate::analysis::stft::{self, WINDOW_SIZE};
use crate::error::AnalyzerError;

pub use loudness::{DB_FLOOR, LoudnessStats, db};
pub use spectral::{SpectralStats, magnitude_distribution};
pub use transients::{TRANSIENT_THRESHOLD, Transient};

/// Descriptor record for one buffer, serialized as the `features` object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioFeatures {
    pub sample_rate: u32,
    pub duration_sec: f64,
    pub loudness: LoudnessStats,
    pub spectral: SpectralStats,
    /// Time-ascending; one onset may span several adjacent frames.
    pub transients: Vec<Transient>,
}

/// Compute all descriptors. Fails on empty input or input shorter than one
/// analysis window, so no NaN descriptors are ever produced.
pub fn extract(buffer: &AudioBuffer) -> Result<AudioFeatures, AnalyzerError> {
    if buffer.is_empty() {
        return Err(AnalyzerError::computation(
            "cannot analyze an empty audio buffer",
        ));
    }
    let loudness = loudness::loudness_stats(buffer.samples());
    let spectrogram = stft::forward(buffer.samples(), buffer.sample_rate());
    let spectral = spectral::spectral_stats(&spectrogram).ok_or_else(|| {
        AnalyzerError::computation(format!(
            "audio has {} samples, fewer than one {WINDOW_SIZE}-sample analysis window",
            buffer.len()
        ))
    })?;
    let transients = transients::detect_transients(&spectrogram);
    debug!(
        frames = spectrogram.frame_count(),
        transients = transients.len(),
        centroid_hz = spectral.centroid_hz,
        "Extracted descriptors"
    );
    Ok(AudioFeatures {
        sample_rate: buffer.sample_rate(),
        duration_sec: buffer.duration_seconds(),
        loudness,
        spectral,
        transients,
    })
}
