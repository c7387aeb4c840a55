//! Analysis pipeline: descriptors plus an isolated embedding branch.

use std::path::Path;

use tracing::{info, warn};

use crate::analysis::audio::{self, AudioBuffer};
use crate::analysis::descriptors;
use crate::config::EmbeddingSettings;
use crate::embedding::{EmbeddingAdapter, EmbeddingConfig};
use crate::error::AnalyzerError;
use crate::report::AnalysisReport;

enum EmbeddingState {
    Ready(EmbeddingAdapter),
    Unavailable(String),
}

/// Owns the embedding adapter for the process lifetime.
///
/// Descriptor failures abort a call. Embedding failures, including an adapter
/// that could not be constructed, only null the embedding fields.
pub struct Analyzer {
    embedding: EmbeddingState,
}

impl Analyzer {
    /// Keep the adapter, or remember why it could not be built.
    pub fn new(adapter: Result<EmbeddingAdapter, AnalyzerError>) -> Self {
        let embedding = match adapter {
            Ok(adapter) => EmbeddingState::Ready(adapter),
            Err(err) => {
                warn!("Embedding model unavailable: {err}");
                EmbeddingState::Unavailable(err.to_string())
            }
        };
        Self { embedding }
    }

    /// Build the ONNX-backed adapter described by `settings`.
    pub fn from_settings(settings: &EmbeddingSettings) -> Self {
        Self::new(EmbeddingAdapter::from_model_path(
            &settings.model_path(),
            EmbeddingConfig::from(settings),
        ))
    }

    /// Why embeddings are unavailable, if they are.
    pub fn embedding_error(&self) -> Option<&str> {
        match &self.embedding {
            EmbeddingState::Ready(_) => None,
            EmbeddingState::Unavailable(reason) => Some(reason),
        }
    }

    /// Analyze a file at its native rate. `path` is reported canonicalized.
    pub fn analyze_file(&mut self, path: &Path) -> Result<AnalysisReport, AnalyzerError> {
        let path = path
            .canonicalize()
            .map_err(|source| AnalyzerError::file(path, source))?;
        info!(path = %path.display(), "Analyzing file");
        let buffer = audio::load_path(&path, None)?;
        self.analyze_buffer(&path, &buffer)
    }

    /// Analyze an already-loaded buffer, labelling the report with `path`.
    pub fn analyze_buffer(
        &mut self,
        path: &Path,
        buffer: &AudioBuffer,
    ) -> Result<AnalysisReport, AnalyzerError> {
        let features = descriptors::extract(buffer)?;
        let embedding = match &mut self.embedding {
            EmbeddingState::Ready(adapter) => adapter.embed(buffer).map_err(|err| {
                warn!("Embedding failed: {err}");
                err.to_string()
            }),
            EmbeddingState::Unavailable(reason) => Err(reason.clone()),
        };
        Ok(AnalysisReport::assemble(path, features, embedding))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::EmbeddingBackend;
    use crate::error::ErrorKind;

    struct Fixed(Vec<f32>);

    impl EmbeddingBackend for Fixed {
        fn embed(&mut self, _: &[f32]) -> Result<Vec<f32>, AnalyzerError> {
            Ok(self.0.clone())
        }
    }

    struct Broken;

    impl EmbeddingBackend for Broken {
        fn embed(&mut self, _: &[f32]) -> Result<Vec<f32>, AnalyzerError> {
            Err(AnalyzerError::inference("runtime exploded"))
        }
    }

    fn tone() -> AudioBuffer {
        let samples = (0..8_192)
            .map(|i| 0.5 * (2.0 * std::f32::consts::PI * 440.0 * i as f32 / 16_000.0).sin())
            .collect();
        AudioBuffer::new(samples, 16_000).unwrap()
    }

    fn small_config() -> EmbeddingConfig {
        EmbeddingConfig {
            sample_rate: 16_000,
            clip_seconds: 1.0,
            mono: true,
        }
    }

    #[test]
    fn ready_adapter_fills_embedding() {
        let adapter = EmbeddingAdapter::new(small_config(), Box::new(Fixed(vec![1.0, 2.0])));
        let mut analyzer = Analyzer::new(adapter);
        let report = analyzer.analyze_buffer(Path::new("t.wav"), &tone()).unwrap();
        assert_eq!(report.embedding_dim, Some(2));
        assert_eq!(report.embedding, Some(vec![1.0, 2.0]));
        assert!(report.model_error.is_none());
    }

    #[test]
    fn inference_failure_keeps_features() {
        let adapter = EmbeddingAdapter::new(small_config(), Box::new(Broken));
        let mut analyzer = Analyzer::new(adapter);
        let report = analyzer.analyze_buffer(Path::new("t.wav"), &tone()).unwrap();
        assert!(report.embedding.is_none());
        assert!(report.embedding_dim.is_none());
        assert!(report.model_error.unwrap().contains("runtime exploded"));
        assert_eq!(report.features.sample_rate, 16_000);
    }

    #[test]
    fn unavailable_model_reported_on_every_call() {
        let mut analyzer = Analyzer::new(Err(AnalyzerError::MissingModel("m.onnx".into())));
        assert!(analyzer.embedding_error().unwrap().contains("m.onnx"));
        for _ in 0..2 {
            let report = analyzer.analyze_buffer(Path::new("t.wav"), &tone()).unwrap();
            assert!(report.model_error.as_deref().unwrap().contains("ONNX model not found"));
        }
    }

    #[test]
    fn descriptor_failure_aborts() {
        let mut analyzer = Analyzer::new(Err(AnalyzerError::MissingModel("m.onnx".into())));
        let empty = AudioBuffer::new(Vec::new(), 16_000).unwrap();
        let err = analyzer.analyze_buffer(Path::new("e.wav"), &empty).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Computation);
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut analyzer = Analyzer::new(Err(AnalyzerError::MissingModel("m.onnx".into())));
        let err = analyzer
            .analyze_file(&dir.path().join("absent.wav"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
    }
}
