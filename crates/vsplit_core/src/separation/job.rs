//! Job types: what the caller asks for, what a job resolves to, and what
//! comes back.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::codec::{CodecDescriptor, FALLBACK_FORMAT};
use crate::config::{StemOverrides, StemSettings};

/// Name of the folder created next to the input when no output folder
/// is given.
pub const DEFAULT_OUTPUT_DIR_NAME: &str = "output";

/// One of the two derived tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stem {
    Instrumental,
    Vocals,
}

impl Stem {
    /// Render order of a job.
    pub const ORDER: [Stem; 2] = [Stem::Instrumental, Stem::Vocals];

    /// Suffix appended to the input base name.
    ///
    /// Front-ends locate outputs by this suffix, so it must not change.
    pub fn file_suffix(&self) -> &'static str {
        match self {
            Stem::Instrumental => "_instrumental",
            Stem::Vocals => "_vocals",
        }
    }
}

impl fmt::Display for Stem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stem::Instrumental => write!(f, "instrumental"),
            Stem::Vocals => write!(f, "vocals"),
        }
    }
}

/// Caller-facing description of a separation.
#[derive(Debug, Clone)]
pub struct SeparationRequest {
    /// Stereo input file.
    pub input: PathBuf,
    /// Output folder; `None` means `<input dir>/output`.
    pub output_dir: Option<PathBuf>,
    /// Requested output format. Unknown formats fall back to `wav`.
    pub format: String,
    /// Per-job stem parameter overrides.
    pub overrides: StemOverrides,
}

impl SeparationRequest {
    /// Request with default format and no overrides.
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output_dir: None,
            format: FALLBACK_FORMAT.to_string(),
            overrides: StemOverrides::default(),
        }
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = format.into();
        self
    }

    pub fn with_overrides(mut self, overrides: StemOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    /// Output folder the job will write to.
    pub fn resolved_output_dir(&self) -> PathBuf {
        match &self.output_dir {
            Some(dir) => dir.clone(),
            None => self
                .input
                .parent()
                .unwrap_or_else(|| Path::new(""))
                .join(DEFAULT_OUTPUT_DIR_NAME),
        }
    }
}

/// A request resolved against defaults. Lives only for one `separate` call.
#[derive(Debug, Clone)]
pub struct SeparationJob {
    pub input: PathBuf,
    pub output_dir: PathBuf,
    pub codec: &'static CodecDescriptor,
    /// Stem parameters after overrides were merged.
    pub stems: StemSettings,
}

impl SeparationJob {
    /// Input file name without its extension.
    pub fn base_name(&self) -> String {
        self.input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Job log name. Includes the output folder, so only jobs that also
    /// share output files share a log.
    pub fn log_name(&self) -> String {
        format!("{}_{}", self.base_name(), self.output_dir.display())
    }

    /// Output path for a stem: `<output_dir>/<base><suffix>.<format>`.
    pub fn output_path(&self, stem: Stem) -> PathBuf {
        self.output_dir.join(format!(
            "{}{}.{}",
            self.base_name(),
            stem.file_suffix(),
            self.codec.format
        ))
    }
}

/// Files produced by a successful job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeparationOutput {
    pub instrumental_path: PathBuf,
    pub vocal_path: PathBuf,
    pub output_dir: PathBuf,
    /// MIME type of both files.
    pub mime: String,
}

impl SeparationOutput {
    /// Output path of one stem.
    pub fn path(&self, stem: Stem) -> &Path {
        match stem {
            Stem::Instrumental => &self.instrumental_path,
            Stem::Vocals => &self.vocal_path,
        }
    }
}
