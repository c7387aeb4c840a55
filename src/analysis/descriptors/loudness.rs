use serde::{Deserialize, Serialize};

/// Amplitude floor applied before converting to decibels.
pub const DB_FLOOR: f64 = 1e-12;

/// Whole-buffer loudness in dBFS.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoudnessStats {
    pub rms_db: f64,
    pub peak_db: f64,
}

/// `20·log10(max(value, 1e-12))`; silence maps to about -240 dB instead of -inf.
pub fn db(value: f64) -> f64 {
    20.0 * value.max(DB_FLOOR).log10()
}

pub(crate) fn loudness_stats(samples: &[f32]) -> LoudnessStats {
    let peak = samples
        .iter()
        .map(|s| s.abs() as f64)
        .fold(0.0_f64, f64::max);
    let rms = rms(samples).min(peak);
    LoudnessStats {
        rms_db: db(rms),
        peak_db: db(peak),
    }
}

fn rms(samples: &[f32]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum: f64 = samples.iter().map(|&s| (s as f64) * (s as f64)).sum();
    (sum / samples.len() as f64).sqrt()
}
