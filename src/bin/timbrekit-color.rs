//! Recolor a recording's timbre and write a mono 16-bit WAV.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;
use timbrekit::coloration::{BackendPreference, ColorationConfig, ColorationEngine};
use timbrekit::config::{self, Settings};
use timbrekit::{AnalyzerError, logging};

/// Apply learned resynthesis or the spectral-tilt fallback to a WAV file.
#[derive(Parser, Debug)]
#[command(name = "timbrekit-color")]
#[command(about = "Apply timbre coloration to an audio file")]
struct Args {
    /// Input audio path
    #[arg(long)]
    input: PathBuf,

    /// Output WAV path
    #[arg(long)]
    output: PathBuf,

    /// Checkpoint directory (.gin + ckpt-*.onnx) for the learned backend
    #[arg(long = "ckpt_dir", alias = "ckpt-dir")]
    ckpt_dir: Option<PathBuf>,

    /// Maximum duration of input to process, in seconds [default: 4.0]
    #[arg(long = "max_seconds", alias = "max-seconds")]
    max_seconds: Option<f32>,

    /// Backend to use
    #[arg(long, value_enum)]
    backend: Option<BackendPreference>,
}

fn main() -> ExitCode {
    let args = Args::parse();
    let settings = match config::load_or_default() {
        Ok(settings) => settings,
        Err(err) => {
            logging::init_stderr_only("info");
            eprintln!("error: {}", AnalyzerError::from(err));
            return ExitCode::FAILURE;
        }
    };
    logging::init_for_tool("timbrekit-color", &settings.logging);
    match run(args, settings) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{err}");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args, settings: Settings) -> Result<(), AnalyzerError> {
    let input = absolute(args.input)?;
    let output = absolute(args.output)?;
    let ckpt_dir = match args.ckpt_dir.or(settings.coloration.ckpt_dir) {
        Some(dir) => Some(absolute(dir)?),
        None => None,
    };
    let coloration = ColorationConfig {
        max_seconds: args.max_seconds.unwrap_or(settings.coloration.max_seconds),
        ckpt_dir,
        preference: args.backend.unwrap_or(settings.coloration.backend),
    };

    let engine = ColorationEngine::with_onnx();
    let started = Instant::now();
    let mode = engine.color_file(&input, &output, &coloration)?;
    let elapsed = started.elapsed().as_secs_f64();

    println!("{mode} coloration done in {elapsed:.1} s");
    println!("DDSP_INPUT={}", input.display());
    println!("DDSP_OUTPUT={}", output.display());
    Ok(())
}

fn absolute(path: PathBuf) -> Result<PathBuf, AnalyzerError> {
    std::path::absolute(&path).map_err(|source| AnalyzerError::file(path, source))
}
