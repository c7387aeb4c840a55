//! Analyze one audio file and print a single JSON record on stdout.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use timbrekit::config::{self, Settings};
use timbrekit::{Analyzer, AnalyzerError, logging};

/// Compute loudness, spectral and transient descriptors plus a CLAP embedding.
#[derive(Parser, Debug)]
#[command(name = "timbrekit-analyze")]
#[command(about = "Analyze an audio file and print one JSON record")]
struct Args {
    /// Audio file to analyze
    path: PathBuf,

    /// Directory holding the embedding model (overrides CLAP_ONNX_DIR)
    #[arg(long)]
    model_dir: Option<PathBuf>,
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
    logging::init_for_tool("timbrekit-analyze", &settings.logging);
    match run(args, settings) {
        Ok(line) => {
            println!("{line}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::error!("{err}");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args, mut settings: Settings) -> Result<String, AnalyzerError> {
    if let Some(dir) = args.model_dir {
        settings.embedding.model_dir = dir;
    }
    let mut analyzer = Analyzer::from_settings(&settings.embedding);
    analyzer.analyze_file(&args.path)?.to_json_line()
}
