use serde::{Deserialize, Serialize};

use super::spectral::MAGNITUDE_FLOOR;
use crate::analysis::stft::Spectrogram;

/// Normalized energy rise between consecutive frames that counts as an onset.
pub const TRANSIENT_THRESHOLD: f64 = 0.15;

/// Frame whose normalized energy rose by more than the threshold.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transient {
    pub time_sec: f64,
    /// Raw normalized energy delta.
    pub strength: f64,
}

/// Per-frame energy scaled by its maximum over time.
pub(crate) fn normalized_frame_energy(spectrogram: &Spectrogram) -> Vec<f64> {
    let mut energy: Vec<f64> = spectrogram
        .frames
        .iter()
        .map(|frame| {
            frame
                .iter()
                .map(|bin| {
                    let mag = bin.norm() as f64 + MAGNITUDE_FLOOR;
                    mag * mag
                })
                .sum()
        })
        .collect();
    let max = energy.iter().copied().fold(0.0_f64, f64::max);
    for value in &mut energy {
        *value /= max + 1e-12;
    }
    energy
}

/// Flag every frame `i` where `e[i + 1] - e[i]` exceeds the threshold.
///
/// Adjacent frames of one onset are all reported; there is no debouncing.
pub(crate) fn detect_transients(spectrogram: &Spectrogram) -> Vec<Transient> {
    let energy = normalized_frame_energy(spectrogram);
    energy
        .windows(2)
        .enumerate()
        .filter_map(|(index, pair)| {
            let delta = pair[1] - pair[0];
            (delta > TRANSIENT_THRESHOLD).then(|| Transient {
                time_sec: spectrogram.times[index] as f64,
                strength: delta,
            })
        })
        .collect()
}
