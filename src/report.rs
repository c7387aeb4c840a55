//! Serialized shape of one analysis call.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::analysis::descriptors::AudioFeatures;
use crate::embedding::EmbeddingVector;
use crate::error::AnalyzerError;

/// `{path, features, embedding_dim, embedding, model_error}`.
///
/// Either `embedding` and `embedding_dim` are set, or both are null and
/// `model_error` explains why.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub path: String,
    pub features: AudioFeatures,
    pub embedding_dim: Option<usize>,
    pub embedding: Option<Vec<f32>>,
    pub model_error: Option<String>,
}

impl AnalysisReport {
    pub fn assemble(
        path: &Path,
        features: AudioFeatures,
        embedding: Result<EmbeddingVector, String>,
    ) -> Self {
        let (embedding_dim, embedding, model_error) = match embedding {
            Ok(vector) => (Some(vector.dim), Some(vector.values), None),
            Err(message) => (None, None, Some(message)),
        };
        Self {
            path: path.display().to_string(),
            features,
            embedding_dim,
            embedding,
            model_error,
        }
    }

    /// Single-line JSON.
    pub fn to_json_line(&self) -> Result<String, AnalyzerError> {
        serde_json::to_string(self)
            .map_err(|err| AnalyzerError::computation(format!("failed to serialize report: {err}")))
    }
}
