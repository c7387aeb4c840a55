//! Framed short-time Fourier transform shared by descriptors and coloration.
//!
//! Frames are produced only where the whole window fits inside the signal;
//! there is no edge padding, so inputs shorter than the window yield no frames.

use rustfft::num_complex::Complex32;

use super::fft::{RealFftPlan, hann_window};

/// Analysis window length in samples.
pub const WINDOW_SIZE: usize = 2048;
/// Hop between consecutive frames (75% overlap).
pub const HOP_SIZE: usize = 512;

const WINDOW_SUM_FLOOR: f32 = 1e-12;

/// Complex time-frequency matrix with its axes.
#[derive(Debug, Clone, PartialEq)]
pub struct Spectrogram {
    /// Bin centre frequencies in Hz, `0..=rate/2`.
    pub frequencies: Vec<f32>,
    /// Frame centre times in seconds.
    pub times: Vec<f32>,
    /// One spectrum per frame (`frames[t][f]`), scaled by `1 / Σ window`.
    pub frames: Vec<Vec<Complex32>>,
}

impl Spectrogram {
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn bin_count(&self) -> usize {
        self.frequencies.len()
    }
}

/// Number of full frames that fit in `len` samples.
pub fn frame_count(len: usize) -> usize {
    if len < WINDOW_SIZE {
        0
    } else {
        (len - WINDOW_SIZE) / HOP_SIZE + 1
    }
}

/// Forward transform of a mono signal.
pub fn forward(samples: &[f32], sample_rate: u32) -> Spectrogram {
    let plan = RealFftPlan::new(WINDOW_SIZE);
    let window = hann_window(WINDOW_SIZE);
    let scale = 1.0 / window.iter().sum::<f32>();
    let rate = sample_rate.max(1) as f32;
    let count = frame_count(samples.len());

    let mut scratch = vec![Complex32::default(); plan.len()];
    let mut windowed = vec![0.0_f32; WINDOW_SIZE];
    let mut frames = Vec::with_capacity(count);
    let mut times = Vec::with_capacity(count);
    for index in 0..count {
        let start = index * HOP_SIZE;
        for (i, cell) in windowed.iter_mut().enumerate() {
            *cell = samples[start + i] * window[i];
        }
        let mut spectrum = plan.forward(&windowed, &mut scratch);
        for bin in &mut spectrum {
            *bin *= scale;
        }
        frames.push(spectrum);
        times.push((start + WINDOW_SIZE / 2) as f32 / rate);
    }

    let frequencies = (0..plan.bins())
        .map(|bin| bin as f32 * rate / WINDOW_SIZE as f32)
        .collect();
    Spectrogram {
        frequencies,
        times,
        frames,
    }
}

/// Inverse transform by weighted overlap-add, producing exactly `length` samples.
///
/// Samples not covered by any frame are zero.
pub fn inverse(spectrogram: &Spectrogram, length: usize) -> Vec<f32> {
    let plan = RealFftPlan::new(WINDOW_SIZE);
    let window = hann_window(WINDOW_SIZE);
    let unscale: f32 = window.iter().sum();
    let mut scratch = vec![Complex32::default(); plan.len()];
    let mut output = vec![0.0_f32; length];
    let mut norm = vec![0.0_f32; length];

    for (index, spectrum) in spectrogram.frames.iter().enumerate() {
        let start = index * HOP_SIZE;
        if start >= length {
            break;
        }
        let frame = plan.inverse(spectrum, &mut scratch);
        for (i, (&sample, &w)) in frame.iter().zip(&window).enumerate() {
            let Some(slot) = output.get_mut(start + i) else {
                break;
            };
            *slot += sample * unscale * w;
            norm[start + i] += w * w;
        }
    }

    for (sample, &weight) in output.iter_mut().zip(&norm) {
        if weight > WINDOW_SUM_FLOOR {
            *sample /= weight;
        } else {
            *sample = 0.0;
        }
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noise(len: usize) -> Vec<f32> {
        let mut state = 0x1234_5678_u32;
        (0..len)
            .map(|_| {
                state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
                (state >> 8) as f32 / (1u32 << 24) as f32 * 2.0 - 1.0
            })
            .collect()
    }

    #[test]
    fn frames_only_where_window_fits() {
        assert_eq!(frame_count(0), 0);
        assert_eq!(frame_count(WINDOW_SIZE - 1), 0);
        assert_eq!(frame_count(WINDOW_SIZE), 1);
        assert_eq!(frame_count(WINDOW_SIZE + HOP_SIZE - 1), 1);
        assert_eq!(frame_count(WINDOW_SIZE + HOP_SIZE), 2);
        let spec = forward(&vec![0.1; WINDOW_SIZE - 1], 44_100);
        assert_eq!(spec.frame_count(), 0);
        assert_eq!(spec.bin_count(), WINDOW_SIZE / 2 + 1);
    }

    #[test]
    fn axes_follow_rate_and_hop() {
        let spec = forward(&vec![0.0; WINDOW_SIZE + 3 * HOP_SIZE], 8_192);
        assert_eq!(spec.frame_count(), 4);
        assert_eq!(spec.frequencies[0], 0.0);
        assert!((spec.frequencies[1] - 4.0).abs() < 1e-6);
        assert!((spec.frequencies.last().copied().unwrap() - 4_096.0).abs() < 1e-3);
        assert!((spec.times[0] - 0.125).abs() < 1e-6);
        assert!((spec.times[1] - spec.times[0] - HOP_SIZE as f32 / 8_192.0).abs() < 1e-6);
    }

    #[test]
    fn round_trip_reconstructs_interior() {
        let len = WINDOW_SIZE * 4;
        let signal = noise(len);
        let spec = forward(&signal, 22_050);
        let back = inverse(&spec, len);
        assert_eq!(back.len(), len);
        let last_covered = (spec.frame_count() - 1) * HOP_SIZE + WINDOW_SIZE;
        for i in HOP_SIZE..last_covered - HOP_SIZE {
            assert!((back[i] - signal[i]).abs() < 1e-3, "sample {i}");
        }
    }

    #[test]
    fn inverse_without_frames_is_silence() {
        let spec = forward(&[0.5; 100], 16_000);
        let back = inverse(&spec, 100);
        assert_eq!(back, vec![0.0; 100]);
    }
}
