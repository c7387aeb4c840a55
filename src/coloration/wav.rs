//! 16-bit PCM WAV output for colored audio.

use std::io::BufWriter;
use std::path::Path;

use hound::{SampleFormat, WavSpec, WavWriter};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::analysis::audio::AudioBuffer;
use crate::error::AnalyzerError;

/// Write `buffer` as mono 16-bit PCM at its own sample rate.
///
/// Samples are clamped to [-1, 1] and scaled by 32767. The data goes to a
/// temporary file beside `path` that is renamed into place only after the
/// header is finalized, so a failed write never leaves a partial file.
pub fn write_pcm16(path: &Path, buffer: &AudioBuffer) -> Result<(), AnalyzerError> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent).map_err(|source| AnalyzerError::file(parent, source))?;
    let mut temp =
        NamedTempFile::new_in(parent).map_err(|source| AnalyzerError::file(parent, source))?;

    let spec = WavSpec {
        channels: 1,
        sample_rate: buffer.sample_rate(),
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    {
        let sink = BufWriter::with_capacity(1024 * 1024, temp.as_file_mut());
        let mut writer = WavWriter::new(sink, spec).map_err(wav_error)?;
        for &sample in buffer.samples() {
            writer.write_sample(to_pcm16(sample)).map_err(wav_error)?;
        }
        writer.finalize().map_err(wav_error)?;
    }
    temp.persist(path)
        .map_err(|err| AnalyzerError::file(path, err.error))?;
    debug!(
        path = %path.display(),
        samples = buffer.len(),
        sample_rate = buffer.sample_rate(),
        "Wrote WAV"
    );
    Ok(())
}

/// Clamp to [-1, 1] and scale to 16-bit, truncating toward zero.
pub(crate) fn to_pcm16(sample: f32) -> i16 {
    let clamped = if sample.is_finite() {
        sample.clamp(-1.0, 1.0)
    } else {
        0.0
    };
    (clamped * i16::MAX as f32) as i16
}

fn wav_error(err: hound::Error) -> AnalyzerError {
    AnalyzerError::audio(format!("failed to write wav: {err}"))
}
