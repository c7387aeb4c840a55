//! Audio descriptor analysis, CLAP embedding preparation and spectral timbre
//! coloration, shared by the `timbrekit-analyze` and `timbrekit-color` tools.

/// Decoding, framed transforms and descriptors.
pub mod analysis;
/// Application directory helpers.
pub mod app_dirs;
/// Learned and spectral-tilt coloration.
pub mod coloration;
/// Settings file handling.
pub mod config;
/// Fixed-length framing and embedding inference.
pub mod embedding;
/// Error taxonomy.
pub mod error;
/// Logging setup.
pub mod logging;
/// Analysis pipeline with isolated embedding failures.
pub mod pipeline;
/// Serialized analysis record.
pub mod report;

pub use analysis::audio::AudioBuffer;
pub use error::{AnalyzerError, ErrorKind};
pub use pipeline::Analyzer;
pub use report::AnalysisReport;
