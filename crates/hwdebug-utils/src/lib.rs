//! # hwdebug Utilities
//!
//! Shared logging and configuration for the hwdebug debug agent and console
//! frontends.
//!
//! `hwdebug-core` only emits `tracing` events; the binaries that embed it call
//! one of the initializers here to decide where those events go.

pub mod logging;

pub use logging::{
    dated_log_path, init_logging, init_logging_to_file, init_logging_with_level, LogFormat, LogLevel, LoggingError,
    LoggingGuard,
};
pub use tracing::{debug, error, info, trace, warn};
