//! Tracing setup shared by the command-line tools.
//!
//! Events go to stderr so stdout stays machine-readable (the JSON record, the
//! `DDSP_*` lines). Each run also appends to a plain-text file named after
//! the tool in the app logs directory; only the newest files per tool are kept.

use std::{
    fs::{self, OpenOptions},
    path::{Path, PathBuf},
    sync::OnceLock,
};

use time::{OffsetDateTime, UtcOffset, format_description::FormatItem, macros::format_description};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Registry, fmt, prelude::*};

use crate::app_dirs::{AppDirError, AppDirs};
use crate::config::LoggingSettings;

const FALLBACK_LEVEL: &str = "info";

static ACTIVE: OnceLock<(WorkerGuard, PathBuf)> = OnceLock::new();

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error(transparent)]
    Dirs(#[from] AppDirError),
    #[error("Failed to read log directory {path}: {source}")]
    ReadDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to remove old log file {path}: {source}")]
    RemoveFile {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to format log filename time: {0}")]
    FormatTime(time::error::Format),
    #[error("Failed to open log file {path}: {source}")]
    OpenLogFile {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to install global tracing subscriber: {0}")]
    SetGlobal(tracing::subscriber::SetGlobalDefaultError),
}

/// What to log and where, for one tool.
#[derive(Debug, Clone, Copy)]
pub struct LogOptions<'a> {
    /// File name prefix, usually the binary name.
    pub tool: &'a str,
    /// Default filter directive when `RUST_LOG` is unset.
    pub level: &'a str,
    pub max_files: usize,
}

impl<'a> LogOptions<'a> {
    pub fn new(tool: &'a str, settings: &'a LoggingSettings) -> Self {
        Self {
            tool,
            level: &settings.level,
            max_files: settings.max_files.max(1),
        }
    }
}

/// Install stderr and file logging. Returns the log file path.
///
/// Later calls return the first call's path without reinstalling.
pub fn init(options: &LogOptions<'_>) -> Result<PathBuf, LoggingError> {
    if let Some((_, path)) = ACTIVE.get() {
        return Ok(path.clone());
    }
    let dir = AppDirs::resolve()?.ensure_logs_dir()?;
    let path = dir.join(log_file_name(options.tool, now_local_or_utc())?);
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(|source| LoggingError::OpenLogFile {
            path: path.clone(),
            source,
        })?;
    let (file_writer, guard) = tracing_appender::non_blocking(file);
    prune_old_logs(&dir, options.tool, options.max_files)?;

    let timer = build_timer();
    let subscriber = Registry::default()
        .with(env_filter(options.level))
        .with(
            fmt::layer()
                .with_target(false)
                .with_timer(timer.clone())
                .with_writer(std::io::stderr),
        )
        .with(
            fmt::layer()
                .with_ansi(false)
                .with_timer(timer)
                .with_writer(file_writer),
        );
    tracing::subscriber::set_global_default(subscriber).map_err(LoggingError::SetGlobal)?;
    let _ = ACTIVE.set((guard, path.clone()));
    tracing::debug!(path = %path.display(), "Logging initialized");
    Ok(path)
}

/// Stderr-only logging, for when the log directory is unusable.
pub fn init_stderr_only(level: &str) {
    let subscriber = Registry::default().with(env_filter(level)).with(
        fmt::layer()
            .with_target(false)
            .with_timer(build_timer())
            .with_writer(std::io::stderr),
    );
    let _ = tracing::subscriber::set_global_default(subscriber);
}

/// [`init`], degrading to stderr-only logging with a notice on failure.
pub fn init_for_tool(tool: &str, settings: &LoggingSettings) {
    let options = LogOptions::new(tool, settings);
    if let Err(err) = init(&options) {
        eprintln!("File logging disabled: {err}");
        init_stderr_only(options.level);
    }
}

/// Delete the oldest `<tool>_*.log` files beyond `max_files`.
///
/// Names embed a sortable timestamp, so name order is age order.
fn prune_old_logs(dir: &Path, tool: &str, max_files: usize) -> Result<(), LoggingError> {
    let prefix = format!("{tool}_");
    let mut logs: Vec<PathBuf> = fs::read_dir(dir)
        .map_err(|source| LoggingError::ReadDir {
            path: dir.to_path_buf(),
            source,
        })?
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_ok_and(|ft| ft.is_file()))
        .map(|entry| entry.path())
        .filter(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.starts_with(&prefix) && name.ends_with(".log"))
        })
        .collect();
    logs.sort();
    let excess = logs.len().saturating_sub(max_files);
    for path in logs.into_iter().take(excess) {
        fs::remove_file(&path).map_err(|source| LoggingError::RemoveFile { path, source })?;
    }
    Ok(())
}

fn log_file_name(tool: &str, now: OffsetDateTime) -> Result<String, LoggingError> {
    const NAME_FORMAT: &[FormatItem<'_>] =
        format_description!("[year]-[month]-[day]_[hour]-[minute]-[second]");
    let stamp = now.format(NAME_FORMAT).map_err(LoggingError::FormatTime)?;
    Ok(format!("{tool}_{stamp}.log"))
}

fn build_timer() -> fmt::time::OffsetTime<time::format_description::BorrowedFormatItem<'static>> {
    const DISPLAY_FORMAT: &[FormatItem<'static>] =
        format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    fmt::time::OffsetTime::new(offset, DISPLAY_FORMAT.into())
}

fn now_local_or_utc() -> OffsetDateTime {
    OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc())
}

fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new(FALLBACK_LEVEL))
}
