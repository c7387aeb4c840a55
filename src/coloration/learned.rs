use tracing::debug;

use super::checkpoint::{Checkpoint, ModelFraming};
use crate::analysis::audio::AudioBuffer;
use crate::embedding::fit_to_length;
use crate::error::AnalyzerError;

/// Capability that turns a validated checkpoint into a runnable model.
pub trait ResynthesisEngine {
    fn load(&self, checkpoint: &Checkpoint) -> Result<Box<dyn ResynthesisBackend>, AnalyzerError>;
}

/// A loaded learned resynthesis model.
pub trait ResynthesisBackend {
    /// Resynthesize `audio` (exactly `time_steps * hop` samples at the model
    /// rate). Must return at least that many samples.
    fn synthesize(&mut self, audio: &[f32], time_steps: usize) -> Result<Vec<f32>, AnalyzerError>;
}

/// Model frame count and matching sample count for one clip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FramePlan {
    pub time_steps: usize,
    pub n_samples: usize,
}

/// `time_steps = max(1, min(len / hop, max_seconds * rate / hop))`.
pub fn frame_plan(len: usize, framing: &ModelFraming, max_seconds: f32) -> FramePlan {
    let hop = framing.hop.max(1);
    let total_steps = len / hop;
    let max_steps = (max_seconds as f64 * framing.sample_rate as f64 / hop as f64).floor();
    let max_steps = if max_steps.is_finite() && max_steps > 0.0 {
        max_steps as usize
    } else {
        0
    };
    let time_steps = total_steps.min(max_steps).max(1);
    FramePlan {
        time_steps,
        n_samples: time_steps * hop,
    }
}

/// Run the learned path: resample, crop to whole model frames, synthesize.
///
/// Output is exactly `time_steps * hop` samples at the model rate and is not
/// peak-normalized.
pub(crate) fn resynthesize(
    backend: &mut dyn ResynthesisBackend,
    framing: &ModelFraming,
    source: &AudioBuffer,
    max_seconds: f32,
) -> Result<AudioBuffer, AnalyzerError> {
    let working = source.resampled(framing.sample_rate)?;
    let plan = frame_plan(working.len(), framing, max_seconds);
    let input = fit_to_length(working.samples(), plan.n_samples);
    debug!(
        time_steps = plan.time_steps,
        n_samples = plan.n_samples,
        hop = framing.hop,
        "Running learned resynthesis"
    );
    let mut output = backend.synthesize(&input, plan.time_steps)?;
    if output.len() < plan.n_samples {
        return Err(AnalyzerError::inference(format!(
            "learned backend returned {} samples, expected {}",
            output.len(),
            plan.n_samples
        )));
    }
    output.truncate(plan.n_samples);
    AudioBuffer::new(output, framing.sample_rate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    const FRAMING: ModelFraming = ModelFraming {
        sample_rate: 16_000,
        hop: 64,
    };

    struct Echo {
        extra: usize,
        calls: Vec<(usize, usize)>,
    }

    impl ResynthesisBackend for Echo {
        fn synthesize(&mut self, audio: &[f32], time_steps: usize) -> Result<Vec<f32>, AnalyzerError> {
            self.calls.push((audio.len(), time_steps));
            let mut out = audio.to_vec();
            out.extend(std::iter::repeat_n(0.5, self.extra));
            Ok(out)
        }
    }

    struct Short;

    impl ResynthesisBackend for Short {
        fn synthesize(&mut self, audio: &[f32], _: usize) -> Result<Vec<f32>, AnalyzerError> {
            Ok(audio[..audio.len() / 2].to_vec())
        }
    }

    #[test]
    fn plan_is_capped_by_max_seconds() {
        let plan = frame_plan(16_000 * 10, &FRAMING, 4.0);
        assert_eq!(plan.time_steps, 1_000);
        assert_eq!(plan.n_samples, 64_000);
    }

    #[test]
    fn plan_uses_whole_frames_of_short_input() {
        let plan = frame_plan(1_000, &FRAMING, 4.0);
        assert_eq!(plan.time_steps, 15);
        assert_eq!(plan.n_samples, 960);
    }

    #[test]
    fn plan_never_drops_below_one_frame() {
        assert_eq!(frame_plan(10, &FRAMING, 4.0).time_steps, 1);
        assert_eq!(frame_plan(0, &FRAMING, 4.0).n_samples, 64);
    }

    #[test]
    fn output_is_exactly_plan_length_at_model_rate() {
        let source = AudioBuffer::new(vec![0.2; 16_000], 16_000).unwrap();
        let mut backend = Echo {
            extra: 300,
            calls: Vec::new(),
        };
        let out = resynthesize(&mut backend, &FRAMING, &source, 0.5).unwrap();
        assert_eq!(out.sample_rate(), 16_000);
        assert_eq!(out.len(), 125 * 64);
        assert_eq!(backend.calls, vec![(8_000, 125)]);
    }

    #[test]
    fn source_is_resampled_to_model_rate() {
        let source = AudioBuffer::new(vec![0.2; 44_100], 44_100).unwrap();
        let mut backend = Echo {
            extra: 0,
            calls: Vec::new(),
        };
        let out = resynthesize(&mut backend, &FRAMING, &source, 4.0).unwrap();
        assert_eq!(out.sample_rate(), 16_000);
        assert_eq!(out.len(), 250 * 64);
    }

    #[test]
    fn short_output_is_inference_error() {
        let source = AudioBuffer::new(vec![0.2; 4_000], 16_000).unwrap();
        let err = resynthesize(&mut Short, &FRAMING, &source, 4.0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ModelInference);
    }
}
