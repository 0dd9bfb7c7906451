//! Logging infrastructure for Vocal Split.
//!
//! Two layers:
//! - Application-wide diagnostics through `tracing`, installed once by
//!   [`init_tracing`]
//! - Optional per-job log files through [`JobLogger`], with a callback so a
//!   front-end can mirror the job log
//!
//! # Example
//!
//! ```no_run
//! use vsplit_core::logging::{init_tracing, JobLogger, LogConfig, LogLevel};
//!
//! init_tracing(LogLevel::Info);
//!
//! let logger = JobLogger::new("song", ".logs", LogConfig::default(), None).unwrap();
//! logger.phase("Instrumental");
//! logger.command("ffmpeg -i song.mp3 ...");
//! logger.success("Separation completed");
//! ```

mod job_logger;
mod types;

pub use job_logger::JobLogger;
pub use types::{LogCallback, LogConfig, LogLevel, MessagePrefix};

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize global tracing subscriber for application-wide logging.
///
/// This sets up a subscriber that:
/// - Respects RUST_LOG environment variable
/// - Falls back to the provided default level
/// - Outputs to stderr
///
/// Should be called once at application startup. Later calls are ignored.
pub fn init_tracing(default_level: LogLevel) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level_to_filter_str(default_level)));

    let _ = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .try_init();
}

/// Initialize tracing for tests (only logs warnings and above).
#[cfg(test)]
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("warn")
        .with_test_writer()
        .try_init();
}

/// Convert LogLevel to filter string.
fn level_to_filter_str(level: LogLevel) -> &'static str {
    match level {
        LogLevel::Trace => "trace",
        LogLevel::Debug => "debug",
        LogLevel::Info => "info",
        LogLevel::Warn => "warn",
        LogLevel::Error => "error",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_to_filter_works() {
        assert_eq!(level_to_filter_str(LogLevel::Debug), "debug");
        assert_eq!(level_to_filter_str(LogLevel::Warn), "warn");
    }

    #[test]
    fn init_tracing_is_idempotent() {
        init_test_tracing();
        init_tracing(LogLevel::Info);
        init_tracing(LogLevel::Debug);
    }
}
