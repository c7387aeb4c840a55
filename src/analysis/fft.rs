use std::f32::consts::PI;
use std::sync::Arc;

use rustfft::num_complex::Complex32;
use rustfft::{Fft, FftPlanner};

/// Periodic Hann window (DFT-even), matching the usual STFT convention.
pub(crate) fn hann_window(length: usize) -> Vec<f32> {
    if length <= 1 {
        return vec![1.0_f32; length.max(1)];
    }
    let denom = length as f32;
    (0..length)
        .map(|n| 0.5_f32 * (1.0 - (2.0 * PI * n as f32 / denom).cos()))
        .collect()
}

/// Forward/inverse FFT pair for real signals of a fixed length.
pub(crate) struct RealFftPlan {
    len: usize,
    forward: Arc<dyn Fft<f32>>,
    inverse: Arc<dyn Fft<f32>>,
}

impl RealFftPlan {
    pub(crate) fn new(len: usize) -> Self {
        let mut planner = FftPlanner::new();
        Self {
            len,
            forward: planner.plan_fft_forward(len),
            inverse: planner.plan_fft_inverse(len),
        }
    }

    /// Number of one-sided bins (`len / 2 + 1`).
    pub(crate) fn bins(&self) -> usize {
        self.len / 2 + 1
    }

    /// One-sided spectrum of a real frame. `scratch` must hold `len` values.
    pub(crate) fn forward(&self, frame: &[f32], scratch: &mut [Complex32]) -> Vec<Complex32> {
        for (cell, &sample) in scratch.iter_mut().zip(frame) {
            *cell = Complex32::new(sample, 0.0);
        }
        self.forward.process(scratch);
        scratch[..self.bins()].to_vec()
    }

    /// Real frame from a one-sided spectrum, normalized by `1 / len`.
    pub(crate) fn inverse(&self, bins: &[Complex32], scratch: &mut [Complex32]) -> Vec<f32> {
        let n = self.len;
        for (k, cell) in scratch.iter_mut().enumerate() {
            *cell = if k < bins.len() {
                bins[k]
            } else {
                bins.get(n - k).map(|c| c.conj()).unwrap_or_default()
            };
        }
        // Hermitian symmetry requires real DC and Nyquist bins.
        scratch[0].im = 0.0;
        if n % 2 == 0 {
            scratch[n / 2].im = 0.0;
        }
        self.inverse.process(scratch);
        let scale = 1.0 / n as f32;
        scratch.iter().map(|c| c.re * scale).collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hann_window_is_periodic() {
        let w = hann_window(8);
        assert!(w[0].abs() < 1e-6);
        assert!((w[4] - 1.0).abs() < 1e-6);
        assert!((w[1] - w[7]).abs() < 1e-6);
        assert!((w[3] - w[5]).abs() < 1e-6);
    }

    #[test]
    fn constant_signal_lands_in_dc_bin() {
        let plan = RealFftPlan::new(8);
        let mut scratch = vec![Complex32::default(); 8];
        let bins = plan.forward(&[1.0; 8], &mut scratch);
        assert_eq!(bins.len(), 5);
        assert!((bins[0].re - 8.0).abs() < 1e-4);
        for bin in &bins[1..] {
            assert!(bin.norm() < 1e-4);
        }
    }

    #[test]
    fn inverse_recovers_frame() {
        let plan = RealFftPlan::new(16);
        let frame: Vec<f32> = (0..16).map(|i| (i as f32 * 0.37).sin()).collect();
        let mut scratch = vec![Complex32::default(); 16];
        let bins = plan.forward(&frame, &mut scratch);
        let back = plan.inverse(&bins, &mut scratch);
        for (a, b) in frame.iter().zip(&back) {
            assert!((a - b).abs() < 1e-5);
        }
    }
}
