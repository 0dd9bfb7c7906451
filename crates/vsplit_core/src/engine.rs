//! Audio engine (ffmpeg) invocation.
//!
//! The engine is an external process that decodes the input, applies a
//! filter graph and encodes the result. [`AudioEngine`] is the seam the
//! separator talks to; [`FfmpegEngine`] is the real subprocess
//! implementation.

use std::ffi::OsString;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::mpsc;
use std::thread;

use thiserror::Error;

use crate::codec::CodecDescriptor;
use crate::filters::FilterGraph;

/// Default engine executable, looked up on `PATH`.
pub const DEFAULT_ENGINE: &str = "ffmpeg";

/// Errors from starting or running the engine.
#[derive(Error, Debug)]
pub enum EngineError {
    /// The executable could not be started at all.
    #[error("Audio engine '{program}' could not be started: {source}")]
    NotFound {
        program: String,
        #[source]
        source: io::Error,
    },

    /// The engine ran but did not exit cleanly.
    #[error("Audio engine failed with exit code {}", fmt_exit_code(.exit_code))]
    ExecutionFailed { exit_code: Option<i32> },
}

/// Render an exit code, which is missing when a signal ended the process.
pub(crate) fn fmt_exit_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => code.to_string(),
        None => "none (terminated by signal)".to_string(),
    }
}

impl EngineError {
    /// Create a not found error.
    pub fn not_found(program: impl Into<String>, source: io::Error) -> Self {
        Self::NotFound {
            program: program.into(),
            source,
        }
    }
}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// A single engine run: one input, one graph, one encoded output.
#[derive(Debug, Clone)]
pub struct EngineInvocation<'a> {
    pub input: &'a Path,
    pub graph: &'a FilterGraph,
    pub codec: &'static CodecDescriptor,
    pub output: &'a Path,
}

impl EngineInvocation<'_> {
    /// Build the engine arguments.
    ///
    /// Order is fixed: input, overwrite, stereo layout, graph, encoder,
    /// encoder extras, output.
    pub fn args(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "-i".into(),
            self.input.into(),
            "-y".into(),
            "-ac".into(),
            "2".into(),
            "-filter_complex".into(),
            self.graph.to_string().into(),
            "-c:a".into(),
            self.codec.encoder.into(),
        ];
        args.extend(self.codec.extra_args.iter().map(OsString::from));
        args.push(self.output.into());
        args
    }

    /// Printable command line for logs.
    pub fn command_line(&self, program: &str) -> String {
        let mut line = program.to_string();
        for arg in self.args() {
            line.push(' ');
            let arg = arg.to_string_lossy();
            if arg.contains(' ') || arg.contains('|') {
                line.push_str(&format!("\"{}\"", arg));
            } else {
                line.push_str(&arg);
            }
        }
        line
    }
}

/// Something that can render filter graphs to files.
pub trait AudioEngine: Send + Sync {
    /// Executable name, for logging and error context.
    fn program(&self) -> &str;

    /// Check that the engine can be started.
    ///
    /// Front-ends call this once at startup and give up if it fails.
    fn probe(&self) -> EngineResult<()>;

    /// Run one invocation to completion.
    fn run(&self, invocation: &EngineInvocation<'_>) -> EngineResult<()>;
}

/// ffmpeg driven as a subprocess.
#[derive(Debug, Clone)]
pub struct FfmpegEngine {
    /// Executable to spawn, looked up on `PATH` when bare.
    program: PathBuf,
    /// Printable form of `program` for logs and errors.
    name: String,
}

impl FfmpegEngine {
    pub fn new() -> Self {
        Self {
            program: PathBuf::from(DEFAULT_ENGINE),
            name: DEFAULT_ENGINE.to_string(),
        }
    }

    /// Set a custom path to the ffmpeg executable.
    pub fn with_program(mut self, path: impl Into<PathBuf>) -> Self {
        self.program = path.into();
        self.name = self.program.to_string_lossy().into_owned();
        self
    }
}

impl Default for FfmpegEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Read a single byte from a stream and report whether one arrived.
fn first_byte(mut stream: impl Read, tx: mpsc::Sender<bool>) {
    let mut buf = [0u8; 1];
    let got_output = matches!(stream.read(&mut buf), Ok(n) if n > 0);
    let _ = tx.send(got_output);
}

impl AudioEngine for FfmpegEngine {
    fn program(&self) -> &str {
        &self.name
    }

    fn probe(&self) -> EngineResult<()> {
        let program = self.program();
        tracing::debug!("Probing audio engine: {} -version", program);

        let mut child = Command::new(&self.program)
            .arg("-version")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| EngineError::not_found(program, e))?;

        // Whichever stream speaks first decides
        let (tx, rx) = mpsc::channel();
        let mut readers = Vec::new();
        if let Some(stdout) = child.stdout.take() {
            let tx = tx.clone();
            readers.push(thread::spawn(move || first_byte(stdout, tx)));
        }
        if let Some(stderr) = child.stderr.take() {
            let tx = tx.clone();
            readers.push(thread::spawn(move || first_byte(stderr, tx)));
        }
        drop(tx);

        let responded = rx.iter().any(|got_output| got_output);

        let _ = child.kill();
        let _ = child.wait();
        for reader in readers {
            let _ = reader.join();
        }

        if responded {
            tracing::debug!("Audio engine '{}' is available", program);
            Ok(())
        } else {
            Err(EngineError::not_found(
                program,
                io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "engine produced no output for -version",
                ),
            ))
        }
    }

    fn run(&self, invocation: &EngineInvocation<'_>) -> EngineResult<()> {
        let program = self.program();
        tracing::debug!("Running: {}", invocation.command_line(program));

        // Inherit stdio so ffmpeg's own progress stays visible
        let status = Command::new(&self.program)
            .args(invocation.args())
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .map_err(|e| EngineError::not_found(program, e))?;

        if status.success() {
            Ok(())
        } else {
            Err(EngineError::ExecutionFailed {
                exit_code: status.code(),
            })
        }
    }
}
