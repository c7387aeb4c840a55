use std::path::Path;

use ndarray::{Array3, Axis};
use ort::session::Session;
use ort::session::output::SessionOutputs;
use ort::value::Tensor;
use tracing::info;

use super::EmbeddingBackend;
use crate::error::AnalyzerError;

/// CLAP audio encoder exported to ONNX.
///
/// Input is the first declared input, shaped `[1, 1, samples]`; the embedding
/// is the first row of the first output.
pub struct OnnxClapBackend {
    session: Session,
}

impl OnnxClapBackend {
    /// Open a session for `model_path`, failing when the file is absent.
    pub fn load(model_path: &Path) -> Result<Self, AnalyzerError> {
        if !model_path.is_file() {
            return Err(AnalyzerError::MissingModel(model_path.to_path_buf()));
        }
        let session = Session::builder()
            .and_then(|builder| builder.with_intra_threads(intra_threads()))
            .and_then(|builder| builder.commit_from_file(model_path))
            .map_err(|err| {
                AnalyzerError::inference(format!(
                    "failed to load ONNX model {}: {err}",
                    model_path.display()
                ))
            })?;
        info!(path = %model_path.display(), "Loaded embedding model");
        Ok(Self { session })
    }
}

impl EmbeddingBackend for OnnxClapBackend {
    fn embed(&mut self, input: &[f32]) -> Result<Vec<f32>, AnalyzerError> {
        let array = Array3::from_shape_vec((1, 1, input.len()), input.to_vec())
            .map_err(|err| AnalyzerError::inference(format!("failed to build model input: {err}")))?;
        let tensor = Tensor::from_array(array).map_err(|err| {
            AnalyzerError::inference(format!("failed to create input tensor: {err}"))
        })?;
        let outputs = self
            .session
            .run(ort::inputs![tensor])
            .map_err(|err| AnalyzerError::inference(format!("ONNX inference failed: {err}")))?;
        first_row(&outputs)
    }
}

fn first_row(outputs: &SessionOutputs) -> Result<Vec<f32>, AnalyzerError> {
    let value = outputs
        .values()
        .next()
        .ok_or_else(|| AnalyzerError::inference("model produced no outputs"))?;
    let array = value
        .try_extract_array::<f32>()
        .map_err(|err| AnalyzerError::inference(format!("failed to read output tensor: {err}")))?;
    let row: Vec<f32> = match array.ndim() {
        0 => return Err(AnalyzerError::inference("model output is a scalar")),
        1 => array.iter().copied().collect(),
        _ if array.shape()[0] == 0 => Vec::new(),
        _ => array.index_axis(Axis(0), 0).iter().copied().collect(),
    };
    if row.is_empty() {
        return Err(AnalyzerError::inference("model produced an empty embedding"));
    }
    Ok(row)
}

fn intra_threads() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get().saturating_sub(1).max(1))
        .unwrap_or(1)
}
