//! Error types for separation jobs.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use super::job::Stem;
use crate::engine::fmt_exit_code;

/// Failure of a separation job.
///
/// An unsupported output format is deliberately not an error: it falls
/// back to `wav`.
#[derive(Error, Debug)]
pub enum SeparationError {
    /// The audio engine could not be started.
    #[error("Audio engine '{program}' is not available: {source}")]
    EngineNotFound {
        program: String,
        #[source]
        source: io::Error,
    },

    /// The input file does not exist.
    #[error("Input file not found: {}", .0.display())]
    InputNotFound(PathBuf),

    /// The engine ran for a stem and exited non-zero.
    #[error("Rendering {stem} stem failed with exit code {}", fmt_exit_code(.exit_code))]
    EngineExecutionFailed {
        stem: Stem,
        exit_code: Option<i32>,
    },

    /// File system error while preparing the job.
    #[error("I/O error in {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: io::Error,
    },
}

impl SeparationError {
    /// Create an I/O error with context.
    pub fn io_error(operation: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            operation: operation.into(),
            source,
        }
    }

    /// Exit code of a failed engine run, if this is one.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Self::EngineExecutionFailed { exit_code, .. } => *exit_code,
            _ => None,
        }
    }
}

/// Result type for separation operations.
pub type SeparationResult<T> = Result<T, SeparationError>;
