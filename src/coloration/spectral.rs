use crate::analysis::audio::AudioBuffer;
use crate::analysis::stft;
use crate::error::AnalyzerError;

/// Centre of the Gaussian body resonance.
pub const BODY_CENTER_HZ: f32 = 220.0;
/// Standard deviation of the body resonance.
pub const BODY_WIDTH_HZ: f32 = 180.0;
/// Decay constant of the high-frequency air shelf.
pub const AIR_DECAY_HZ: f32 = 6_000.0;

/// Gain of the fixed tilt at `freq_hz`: Gaussian body times a soft air shelf.
pub fn tilt_gain(freq_hz: f32) -> f32 {
    let z = (freq_hz - BODY_CENTER_HZ) / BODY_WIDTH_HZ;
    let body = (-0.5 * z * z).exp();
    let air = 0.4 + 0.6 * (-freq_hz / AIR_DECAY_HZ).exp();
    body * air
}

/// Multiply every frame's spectrum by the tilt and resynthesize.
///
/// Phases are untouched and the output has the input's length and rate. The
/// result is not peak-normalized.
pub(crate) fn apply_tilt(source: &AudioBuffer) -> Result<AudioBuffer, AnalyzerError> {
    let mut spectrogram = stft::forward(source.samples(), source.sample_rate());
    let gains: Vec<f32> = spectrogram.frequencies.iter().map(|&f| tilt_gain(f)).collect();
    for frame in &mut spectrogram.frames {
        for (bin, &gain) in frame.iter_mut().zip(&gains) {
            *bin *= gain;
        }
    }
    let samples = stft::inverse(&spectrogram, source.len());
    AudioBuffer::new(samples, source.sample_rate())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::descriptors;

    fn sine(freq: f32, rate: u32, len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| (2.0 * std::f32::consts::PI * freq * i as f32 / rate as f32).sin())
            .collect()
    }

    #[test]
    fn tilt_peaks_near_body_and_rolls_off() {
        let at_body = tilt_gain(BODY_CENTER_HZ);
        assert!((at_body - (0.4 + 0.6 * (-220.0_f32 / 6_000.0).exp())).abs() < 1e-6);
        assert!(tilt_gain(2_000.0) < 1e-4);
        assert!(tilt_gain(0.0) < at_body);
        assert!(tilt_gain(200.0) > tilt_gain(600.0));
    }

    #[test]
    fn output_keeps_length_and_rate() {
        let source = AudioBuffer::new(sine(220.0, 22_050, 10_000), 22_050).unwrap();
        let colored = apply_tilt(&source).unwrap();
        assert_eq!(colored.len(), source.len());
        assert_eq!(colored.sample_rate(), 22_050);
    }

    #[test]
    fn high_partial_is_attenuated() {
        let rate = 22_050;
        let len = rate as usize;
        let mixed: Vec<f32> = sine(220.0, rate, len)
            .iter()
            .zip(sine(3_000.0, rate, len))
            .map(|(a, b)| 0.5 * a + 0.5 * b)
            .collect();
        let source = AudioBuffer::new(mixed, rate).unwrap();
        let before = descriptors::extract(&source).unwrap();
        let after = descriptors::extract(&apply_tilt(&source).unwrap()).unwrap();
        assert!(after.spectral.centroid_hz < before.spectral.centroid_hz);
    }

    #[test]
    fn too_short_input_becomes_silence() {
        let source = AudioBuffer::new(vec![0.7; 100], 44_100).unwrap();
        let colored = apply_tilt(&source).unwrap();
        assert_eq!(colored.samples(), &[0.0; 100][..]);
    }
}
