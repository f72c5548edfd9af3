//! # Logging Utilities
//!
//! Logging infrastructure for hwdebug using `tracing`.
//!
//! This module provides structured logging with support for:
//! - Pretty output for development and JSON for production
//! - Environment variable configuration
//! - Console output with an optional file sink, or file-only output for
//!   frontends that own the terminal
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use hwdebug_utils::init_logging;
//!
//! // Reads RUST_LOG, HWDEBUG_LOG_FORMAT and HWDEBUG_LOG_FILE.
//! let _guard = init_logging().expect("Failed to initialize logging");
//!
//! tracing::info!("Agent started");
//! ```
//!
//! Keep the returned [`LoggingGuard`] alive for the life of the program:
//! dropping it flushes and stops the background file writer.
//!
//! ## Environment Variables
//!
//! - `RUST_LOG`: Filter directives (e.g. `RUST_LOG=debug`,
//!   `RUST_LOG=hwdebug_core=trace`)
//! - `HWDEBUG_LOG_FORMAT`: `pretty` (default) or `json`
//! - `HWDEBUG_LOG_FILE`: Optional file that receives a copy of every event

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::{env, fs, io};

use chrono::Utc;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::fmt::{self, MakeWriter};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

/// Environment variable selecting the output format.
pub const LOG_FORMAT_ENV: &str = "HWDEBUG_LOG_FORMAT";

/// Environment variable naming an additional log file.
pub const LOG_FILE_ENV: &str = "HWDEBUG_LOG_FILE";

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat
{
    /// Pretty-printed, human-readable format
    #[default]
    Pretty,
    /// One JSON object per event
    Json,
}

impl FromStr for LogFormat
{
    type Err = LoggingError;

    fn from_str(s: &str) -> Result<Self, Self::Err>
    {
        match s.to_lowercase().as_str() {
            "pretty" | "dev" | "development" => Ok(LogFormat::Pretty),
            "json" | "prod" | "production" => Ok(LogFormat::Json),
            _ => Err(LoggingError::InvalidFormat(format!("{s} (use 'pretty' or 'json')"))),
        }
    }
}

/// Log level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel
{
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    /// Includes every hardware slot scan
    Trace,
}

impl From<LogLevel> for Level
{
    fn from(level: LogLevel) -> Self
    {
        match level {
            LogLevel::Error => Level::ERROR,
            LogLevel::Warn => Level::WARN,
            LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Trace => Level::TRACE,
        }
    }
}

impl FromStr for LogLevel
{
    type Err = LoggingError;

    fn from_str(s: &str) -> Result<Self, Self::Err>
    {
        match s.to_lowercase().as_str() {
            "error" | "err" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" | "dbg" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            _ => Err(LoggingError::InvalidLevel(format!(
                "{s} (use 'error', 'warn', 'info', 'debug' or 'trace')"
            ))),
        }
    }
}

/// Keeps the background file writer alive
///
/// Holds nothing when logging goes to the console only.
#[must_use = "dropping the guard stops file logging"]
#[derive(Debug, Default)]
pub struct LoggingGuard
{
    _file: Option<WorkerGuard>,
    path: Option<PathBuf>,
}

impl LoggingGuard
{
    /// Path of the log file, if file logging is active.
    #[must_use]
    pub fn path(&self) -> Option<&Path>
    {
        self.path.as_deref()
    }
}

/// Initialize logging from the environment
///
/// Reads `RUST_LOG` (default `info`), `HWDEBUG_LOG_FORMAT` (default
/// `pretty`) and `HWDEBUG_LOG_FILE`.
///
/// ## Errors
///
/// - `InvalidFormat` if `HWDEBUG_LOG_FORMAT` holds an unknown format
/// - `FileError` if the log file directory cannot be created
/// - `InitializationFailed` if a global subscriber is already installed
pub fn init_logging() -> Result<LoggingGuard, LoggingError>
{
    let format = match env::var(LOG_FORMAT_ENV) {
        Ok(value) => value.parse()?,
        Err(_) => LogFormat::Pretty,
    };
    let log_file = env::var_os(LOG_FILE_ENV).map(PathBuf::from);
    install(format, None, log_file)
}

/// Initialize console logging with an explicit level and format
///
/// `RUST_LOG` is ignored; `HWDEBUG_LOG_FILE` still adds a file sink.
///
/// ## Example
///
/// ```rust,no_run
/// use hwdebug_utils::{LogFormat, LogLevel, init_logging_with_level};
///
/// let _guard = init_logging_with_level(LogLevel::Debug, LogFormat::Json).expect("Failed to initialize logging");
/// ```
///
/// ## Errors
///
/// Same as [`init_logging`], minus the format parsing.
pub fn init_logging_with_level(level: LogLevel, format: LogFormat) -> Result<LoggingGuard, LoggingError>
{
    let log_file = env::var_os(LOG_FILE_ENV).map(PathBuf::from);
    install(format, Some(level.into()), log_file)
}

/// Initialize file-only logging
///
/// For console frontends that draw on the terminal: nothing is written to
/// stdout. `level` overrides `RUST_LOG` when given.
///
/// ## Example
///
/// ```rust,no_run
/// use hwdebug_utils::{dated_log_path, init_logging_to_file};
///
/// let path = dated_log_path(std::env::temp_dir(), "hwdebug-console");
/// let guard = init_logging_to_file(&path, None).expect("Failed to initialize logging");
/// assert_eq!(guard.path(), Some(path.as_path()));
/// ```
///
/// ## Errors
///
/// - `FileError` if the log file directory cannot be created
/// - `InitializationFailed` if a global subscriber is already installed
pub fn init_logging_to_file(path: impl AsRef<Path>, level: Option<LogLevel>) -> Result<LoggingGuard, LoggingError>
{
    let path = path.as_ref().to_path_buf();
    let (writer, guard) = file_writer(&path)?;
    let layers = vec![build_layer(LogFormat::Pretty, writer, false, build_filter(level.map(Into::into)))];
    Registry::default()
        .with(layers)
        .try_init()
        .map_err(|err| LoggingError::InitializationFailed(err.to_string()))?;
    Ok(LoggingGuard {
        _file: Some(guard),
        path: Some(path),
    })
}

/// `<dir>/<YYYY-MM-DD>-<name>.log` for today's UTC date.
#[must_use]
pub fn dated_log_path(dir: impl AsRef<Path>, name: &str) -> PathBuf
{
    let today = Utc::now().format("%Y-%m-%d");
    dir.as_ref().join(format!("{today}-{name}.log"))
}

fn install(format: LogFormat, level: Option<Level>, log_file: Option<PathBuf>) -> Result<LoggingGuard, LoggingError>
{
    let mut layers = vec![build_layer(format, io::stdout, true, build_filter(level))];
    let mut guard = LoggingGuard::default();

    if let Some(path) = log_file {
        let (writer, worker) = file_writer(&path)?;
        layers.push(build_layer(format, writer, false, build_filter(level)));
        guard = LoggingGuard {
            _file: Some(worker),
            path: Some(path),
        };
    }

    Registry::default()
        .with(layers)
        .try_init()
        .map_err(|err| LoggingError::InitializationFailed(err.to_string()))?;
    Ok(guard)
}

/// Explicit level first, then `RUST_LOG`, then `info`.
fn build_filter(level: Option<Level>) -> EnvFilter
{
    match level {
        Some(level) => EnvFilter::new(level.to_string()),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(Level::INFO.to_string())),
    }
}

fn build_layer<W>(format: LogFormat, writer: W, ansi: bool, filter: EnvFilter) -> BoxedLayer
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    match format {
        LogFormat::Pretty => fmt::layer()
            .with_target(true)
            .with_thread_ids(true)
            .with_thread_names(true)
            .with_file(true)
            .with_line_number(true)
            .with_timer(ChronoUtc::rfc_3339())
            .with_ansi(ansi)
            .with_writer(writer)
            .with_filter(filter)
            .boxed(),
        LogFormat::Json => fmt::layer()
            .json()
            .with_target(true)
            .with_thread_ids(true)
            .with_thread_names(true)
            .with_file(true)
            .with_line_number(true)
            .with_timer(ChronoUtc::rfc_3339())
            .with_current_span(true)
            .with_span_list(true)
            .with_writer(writer)
            .with_filter(filter)
            .boxed(),
    }
}

/// Non-blocking appender for `path`, creating its directory if needed.
fn file_writer(path: &Path) -> Result<(tracing_appender::non_blocking::NonBlocking, WorkerGuard), LoggingError>
{
    let dir = prepare_log_dir(path)?;
    let file_name = path
        .file_name()
        .ok_or_else(|| LoggingError::InvalidPath(path.to_path_buf()))?;
    // The file name already carries a date when one is wanted.
    let appender = tracing_appender::rolling::never(dir, file_name);
    Ok(tracing_appender::non_blocking(appender))
}

fn prepare_log_dir(path: &Path) -> Result<PathBuf, LoggingError>
{
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Logging initialization error
#[derive(Debug, thiserror::Error)]
pub enum LoggingError
{
    #[error("Invalid log format: {0}")]
    InvalidFormat(String),

    #[error("Invalid log level: {0}")]
    InvalidLevel(String),

    /// A global subscriber was already installed
    #[error("Failed to initialize logging: {0}")]
    InitializationFailed(String),

    #[error("Invalid log file path: {}", .0.display())]
    InvalidPath(PathBuf),

    #[error("File logging error: {0}")]
    FileError(#[from] io::Error),
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_log_format_from_str()
    {
        assert_eq!(LogFormat::from_str("pretty").unwrap(), LogFormat::Pretty);
        assert_eq!(LogFormat::from_str("JSON").unwrap(), LogFormat::Json);
        assert_eq!(LogFormat::from_str("dev").unwrap(), LogFormat::Pretty);
        assert_eq!(LogFormat::from_str("prod").unwrap(), LogFormat::Json);
        assert!(matches!(LogFormat::from_str("xml"), Err(LoggingError::InvalidFormat(_))));
    }

    #[test]
    fn test_log_level_from_str()
    {
        assert_eq!(LogLevel::from_str("error").unwrap(), LogLevel::Error);
        assert_eq!(LogLevel::from_str("warning").unwrap(), LogLevel::Warn);
        assert_eq!(LogLevel::from_str("info").unwrap(), LogLevel::Info);
        assert_eq!(LogLevel::from_str("dbg").unwrap(), LogLevel::Debug);
        assert_eq!(LogLevel::from_str("Trace").unwrap(), LogLevel::Trace);
        assert!(matches!(LogLevel::from_str("loud"), Err(LoggingError::InvalidLevel(_))));
    }

    #[test]
    fn test_log_level_to_tracing_level()
    {
        assert_eq!(Level::from(LogLevel::Error), Level::ERROR);
        assert_eq!(Level::from(LogLevel::Warn), Level::WARN);
        assert_eq!(Level::from(LogLevel::default()), Level::INFO);
        assert_eq!(Level::from(LogLevel::Debug), Level::DEBUG);
        assert_eq!(Level::from(LogLevel::Trace), Level::TRACE);
    }

    #[test]
    fn test_dated_log_path()
    {
        let path = dated_log_path("/var/log/hwdebug", "agent");
        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(name.ends_with("-agent.log"));
        // YYYY-MM-DD-agent.log
        assert_eq!(name.len(), "2025-01-01-agent.log".len());
        assert_eq!(path.parent().unwrap(), Path::new("/var/log/hwdebug"));
    }

    #[test]
    fn test_prepare_log_dir_creates_missing_directories()
    {
        let root = tempfile::tempdir().unwrap();
        let path = root.path().join("nested").join("logs").join("agent.log");
        let dir = prepare_log_dir(&path).unwrap();
        assert!(dir.is_dir());
        assert_eq!(dir, root.path().join("nested").join("logs"));
    }

    #[test]
    fn test_file_writer_rejects_directory_paths()
    {
        let root = tempfile::tempdir().unwrap();
        let err = file_writer(&root.path().join("..")).unwrap_err();
        assert!(matches!(err, LoggingError::InvalidPath(_)));
    }

    #[test]
    fn test_guard_without_file()
    {
        let guard = LoggingGuard::default();
        assert!(guard.path().is_none());
    }
}
