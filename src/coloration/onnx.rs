use ndarray::Array2;
use ort::session::Session;
use ort::value::Tensor;
use tracing::info;

use super::checkpoint::Checkpoint;
use super::learned::{ResynthesisBackend, ResynthesisEngine};
use crate::error::AnalyzerError;

/// Learned engine backed by ONNX autoencoder exports (`ckpt-*.onnx`).
///
/// The exported graph takes mono audio shaped `[1, n_samples]` and performs
/// its own feature extraction; its first output is the rendered audio.
#[derive(Debug, Clone, Copy, Default)]
pub struct OnnxResynthesisEngine;

impl ResynthesisEngine for OnnxResynthesisEngine {
    fn load(&self, checkpoint: &Checkpoint) -> Result<Box<dyn ResynthesisBackend>, AnalyzerError> {
        let path = &checkpoint.model_path;
        let session = Session::builder()
            .and_then(|builder| builder.commit_from_file(path))
            .map_err(|err| {
                AnalyzerError::inference(format!(
                    "failed to load checkpoint {}: {err}",
                    path.display()
                ))
            })?;
        info!(path = %path.display(), "Loaded resynthesis model");
        Ok(Box::new(OnnxResynthesisBackend { session }))
    }
}

struct OnnxResynthesisBackend {
    session: Session,
}

impl ResynthesisBackend for OnnxResynthesisBackend {
    fn synthesize(&mut self, audio: &[f32], _time_steps: usize) -> Result<Vec<f32>, AnalyzerError> {
        let array = Array2::from_shape_vec((1, audio.len()), audio.to_vec())
            .map_err(|err| AnalyzerError::inference(format!("failed to build model input: {err}")))?;
        let tensor = Tensor::from_array(array).map_err(|err| {
            AnalyzerError::inference(format!("failed to create input tensor: {err}"))
        })?;
        let outputs = self
            .session
            .run(ort::inputs![tensor])
            .map_err(|err| AnalyzerError::inference(format!("resynthesis failed: {err}")))?;
        let value = outputs
            .values()
            .next()
            .ok_or_else(|| AnalyzerError::inference("model produced no outputs"))?;
        let array = value.try_extract_array::<f32>().map_err(|err| {
            AnalyzerError::inference(format!("failed to read output tensor: {err}"))
        })?;
        Ok(array.iter().copied().collect())
    }
}
