use std::path::Path;

use tracing::{info, warn};

use super::checkpoint::Checkpoint;
use super::learned::{self, ResynthesisEngine};
use super::onnx::OnnxResynthesisEngine;
use super::{
    BackendPreference, ColorationConfig, ColorationMode, ColorationOutcome, normalize_peak,
    spectral, wav,
};
use crate::analysis::audio::{self, AudioBuffer};
use crate::config::check_positive_seconds;
use crate::error::AnalyzerError;

/// Outcome of backend selection, decided before any audio is processed.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendChoice {
    Learned(Checkpoint),
    Spectral(ColorationMode),
}

impl BackendChoice {
    pub fn mode(&self) -> ColorationMode {
        match self {
            Self::Learned(_) => ColorationMode::Learned,
            Self::Spectral(mode) => *mode,
        }
    }
}

/// Runs coloration with an optional learned engine injected at construction.
pub struct ColorationEngine {
    learned: Option<Box<dyn ResynthesisEngine>>,
}

impl ColorationEngine {
    pub fn new(learned: Option<Box<dyn ResynthesisEngine>>) -> Self {
        Self { learned }
    }

    /// Engine with the ONNX learned backend available.
    pub fn with_onnx() -> Self {
        Self::new(Some(Box::new(OnnxResynthesisEngine)))
    }

    /// Engine that can only run the spectral tilt.
    pub fn spectral_only() -> Self {
        Self::new(None)
    }

    pub fn has_learned_engine(&self) -> bool {
        self.learned.is_some()
    }

    /// Decide which backend runs. Never revisited after processing starts.
    pub fn select(&self, config: &ColorationConfig) -> Result<BackendChoice, AnalyzerError> {
        let ckpt_dir = config.ckpt_dir.as_deref();
        match config.preference {
            BackendPreference::Spectral => {
                Ok(BackendChoice::Spectral(ColorationMode::FallbackRequested))
            }
            BackendPreference::Learned => {
                if self.learned.is_none() {
                    return Err(AnalyzerError::configuration(
                        "learned coloration requested but no learned engine is available",
                    ));
                }
                let dir = ckpt_dir.ok_or_else(|| {
                    AnalyzerError::configuration(
                        "learned coloration requested without a checkpoint directory",
                    )
                })?;
                Checkpoint::discover(dir).map(BackendChoice::Learned)
            }
            BackendPreference::Auto => Ok(self.select_auto(ckpt_dir)),
        }
    }

    fn select_auto(&self, ckpt_dir: Option<&Path>) -> BackendChoice {
        if self.learned.is_none() {
            if let Some(dir) = ckpt_dir.filter(|dir| !dir.is_dir()) {
                warn!(
                    "Checkpoint directory not found (ignored in fallback mode): {}",
                    dir.display()
                );
            }
            return BackendChoice::Spectral(ColorationMode::FallbackNoEngine);
        }
        let Some(dir) = ckpt_dir else {
            warn!(
                "Learned engine is available but no checkpoint directory was provided; \
                 using spectral fallback instead"
            );
            return BackendChoice::Spectral(ColorationMode::FallbackNoCheckpoint);
        };
        match Checkpoint::discover(dir) {
            Ok(checkpoint) => BackendChoice::Learned(checkpoint),
            Err(err) => {
                warn!("{err}; using spectral fallback instead");
                BackendChoice::Spectral(ColorationMode::FallbackNoCheckpoint)
            }
        }
    }

    /// Select a backend and color `source`. Output peak is at most 1.
    pub fn run(
        &self,
        source: &AudioBuffer,
        config: &ColorationConfig,
    ) -> Result<ColorationOutcome, AnalyzerError> {
        let choice = self.select(config)?;
        self.run_choice(choice, source, config.max_seconds)
    }

    /// Color an already-selected backend choice.
    pub fn run_choice(
        &self,
        choice: BackendChoice,
        source: &AudioBuffer,
        max_seconds: f32,
    ) -> Result<ColorationOutcome, AnalyzerError> {
        check_positive_seconds("max_seconds", max_seconds)?;
        let mode = choice.mode();
        info!(mode = %mode, "Coloring audio");
        let audio = match choice {
            BackendChoice::Spectral(_) => {
                let limit = (max_seconds as f64 * source.sample_rate() as f64).floor() as usize;
                spectral::apply_tilt(&source.truncated(limit))?
            }
            BackendChoice::Learned(checkpoint) => {
                let engine = self.learned.as_ref().ok_or_else(|| {
                    AnalyzerError::configuration("no learned engine is available")
                })?;
                let mut backend = engine.load(&checkpoint)?;
                learned::resynthesize(
                    backend.as_mut(),
                    &checkpoint.framing,
                    source,
                    max_seconds,
                )?
            }
        };
        let rate = audio.sample_rate();
        let mut samples = audio.into_samples();
        normalize_peak(&mut samples);
        Ok(ColorationOutcome {
            mode,
            audio: AudioBuffer::new(samples, rate)?,
        })
    }

    /// Load `input`, color it and write a 16-bit WAV to `output`.
    ///
    /// Selection happens before the input is decoded, so configuration
    /// errors surface first. Nothing is written unless every step succeeds.
    pub fn color_file(
        &self,
        input: &Path,
        output: &Path,
        config: &ColorationConfig,
    ) -> Result<ColorationMode, AnalyzerError> {
        if !input.exists() {
            return Err(AnalyzerError::file(
                input,
                std::io::Error::new(std::io::ErrorKind::NotFound, "input audio not found"),
            ));
        }
        let choice = self.select(config)?;
        let source = audio::load_path(input, None)?;
        let outcome = self.run_choice(choice, &source, config.max_seconds)?;
        wav::write_pcm16(output, &outcome.audio)?;
        Ok(outcome.mode)
    }
}
