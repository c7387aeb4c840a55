//! Audio loading: decode, collapse to mono, resample.

mod decode;
mod downmix;
mod resample;

use std::path::Path;

use tracing::debug;

use crate::error::AnalyzerError;

pub(crate) use downmix::downmix_to_mono;
pub use resample::resample;

/// Mono waveform with its sample rate. Immutable once loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl AudioBuffer {
    /// Wrap mono samples; the sample rate must be positive.
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Result<Self, AnalyzerError> {
        if sample_rate == 0 {
            return Err(AnalyzerError::computation("sample rate must be positive"));
        }
        Ok(Self {
            samples,
            sample_rate,
        })
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration in seconds (`len / rate`).
    pub fn duration_seconds(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// Copy of the first `max_samples` samples.
    pub fn truncated(&self, max_samples: usize) -> Self {
        let end = max_samples.min(self.samples.len());
        Self {
            samples: self.samples[..end].to_vec(),
            sample_rate: self.sample_rate,
        }
    }

    /// Resample to `target_rate`, returning a clone when rates already match.
    pub fn resampled(&self, target_rate: u32) -> Result<Self, AnalyzerError> {
        if target_rate == self.sample_rate {
            return Ok(self.clone());
        }
        let samples = resample(&self.samples, self.sample_rate, target_rate)?;
        Self::new(samples, target_rate)
    }

    pub fn into_samples(self) -> Vec<f32> {
        self.samples
    }
}

/// Load a file as mono, optionally resampled to `target_rate`.
pub fn load_path(path: &Path, target_rate: Option<u32>) -> Result<AudioBuffer, AnalyzerError> {
    let decoded = decode::decode_path(path)?;
    finish_load(decoded, target_rate)
}

/// Load an in-memory encoded stream as mono, optionally resampled.
///
/// `extension` is a container hint such as `"wav"` or `"flac"`.
pub fn load_bytes(
    bytes: Vec<u8>,
    extension: Option<&str>,
    target_rate: Option<u32>,
) -> Result<AudioBuffer, AnalyzerError> {
    let decoded = decode::decode_bytes(bytes, extension)?;
    finish_load(decoded, target_rate)
}

fn finish_load(
    decoded: decode::DecodedAudio,
    target_rate: Option<u32>,
) -> Result<AudioBuffer, AnalyzerError> {
    let mono = downmix_to_mono(&decoded.samples, decoded.channels);
    debug!(
        frames = mono.len(),
        channels = decoded.channels,
        sample_rate = decoded.sample_rate,
        "Decoded audio"
    );
    let buffer = AudioBuffer::new(mono, decoded.sample_rate)?;
    match target_rate {
        Some(rate) if rate != buffer.sample_rate() => buffer.resampled(rate),
        _ => Ok(buffer),
    }
}
