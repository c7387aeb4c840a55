use serde::{Deserialize, Serialize};

use crate::analysis::stft::Spectrogram;

/// Magnitude floor added to every bin before averaging.
pub(crate) const MAGNITUDE_FLOOR: f64 = 1e-12;

/// First and second moments of the time-averaged magnitude spectrum.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpectralStats {
    pub centroid_hz: f64,
    pub bandwidth_hz: f64,
}

/// Time-averaged floored magnitude per bin, normalized to sum to one.
///
/// Returns an empty vector when the spectrogram has no frames.
pub fn magnitude_distribution(spectrogram: &Spectrogram) -> Vec<f64> {
    let frames = spectrogram.frame_count();
    if frames == 0 {
        return Vec::new();
    }
    let mut mean = vec![0.0_f64; spectrogram.bin_count()];
    for frame in &spectrogram.frames {
        for (acc, bin) in mean.iter_mut().zip(frame) {
            *acc += bin.norm() as f64 + MAGNITUDE_FLOOR;
        }
    }
    let total: f64 = mean.iter().sum();
    // total > 0 because of the floor
    for value in &mut mean {
        *value /= total;
    }
    mean
}

pub(crate) fn spectral_stats(spectrogram: &Spectrogram) -> Option<SpectralStats> {
    let weights = magnitude_distribution(spectrogram);
    if weights.is_empty() {
        return None;
    }
    let freqs = &spectrogram.frequencies;
    let centroid: f64 = freqs
        .iter()
        .zip(&weights)
        .map(|(&f, &w)| f as f64 * w)
        .sum();
    let variance: f64 = freqs
        .iter()
        .zip(&weights)
        .map(|(&f, &w)| {
            let d = f as f64 - centroid;
            d * d * w
        })
        .sum();
    Some(SpectralStats {
        centroid_hz: centroid,
        bandwidth_hz: variance.max(0.0).sqrt(),
    })
}
