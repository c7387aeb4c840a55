use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};

use crate::error::AnalyzerError;

const CHUNK_FRAMES: usize = 1024;
const MAX_FLUSH_ROUNDS: usize = 64;

/// Band-limited resampling of a mono signal.
///
/// The output holds exactly `round(len * output_rate / input_rate)` samples.
/// `SincFixedIn` already emits time-aligned frames, so nothing is trimmed
/// from the front; the resampler is flushed until the tail is covered.
pub fn resample(
    samples: &[f32],
    input_rate: u32,
    output_rate: u32,
) -> Result<Vec<f32>, AnalyzerError> {
    if input_rate == 0 || output_rate == 0 {
        return Err(AnalyzerError::computation(
            "resampling requires positive sample rates",
        ));
    }
    if samples.is_empty() || input_rate == output_rate {
        return Ok(samples.to_vec());
    }
    let target_len = output_len(samples.len(), input_rate, output_rate);
    let ratio = output_rate as f64 / input_rate as f64;
    let mut resampler = SincFixedIn::<f32>::new(ratio, 1.0, sinc_parameters(), CHUNK_FRAMES, 1)
        .map_err(|err| AnalyzerError::computation(format!("resampler setup failed: {err}")))?;
    let mut out = Vec::with_capacity(target_len + CHUNK_FRAMES * 2);
    for chunk in samples.chunks(CHUNK_FRAMES) {
        let frames = if chunk.len() == CHUNK_FRAMES {
            resampler.process(&[chunk], None)
        } else {
            resampler.process_partial(Some(&[chunk]), None)
        }
        .map_err(resample_error)?;
        out.extend_from_slice(&frames[0]);
    }
    let mut rounds = 0;
    while out.len() < target_len && rounds < MAX_FLUSH_ROUNDS {
        let frames = resampler
            .process_partial(None::<&[&[f32]]>, None)
            .map_err(resample_error)?;
        if frames[0].is_empty() {
            break;
        }
        out.extend_from_slice(&frames[0]);
        rounds += 1;
    }

    out.resize(target_len, 0.0);
    Ok(out)
}

/// Output length preserving wall-clock duration.
pub(crate) fn output_len(input_len: usize, input_rate: u32, output_rate: u32) -> usize {
    (input_len as f64 * output_rate as f64 / input_rate.max(1) as f64).round() as usize
}

fn sinc_parameters() -> SincInterpolationParameters {
    SincInterpolationParameters {
        sinc_len: 256,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    }
}

fn resample_error(err: rubato::ResampleError) -> AnalyzerError {
    AnalyzerError::computation(format!("resampling failed: {err}"))
}
