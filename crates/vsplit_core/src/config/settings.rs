//! Settings struct with TOML-based sections.
//!
//! Settings are organized into logical sections that map to TOML tables.
//! Each section can be updated independently for atomic section-level updates.

use serde::{Deserialize, Serialize};

use super::stems::StemSettings;
use crate::codec::FALLBACK_FORMAT;
use crate::filters::GraphMode;
use crate::logging::{LogConfig, LogLevel};

/// Root settings structure containing all configuration sections.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Path-related settings.
    #[serde(default)]
    pub paths: PathSettings,

    /// Audio engine settings.
    #[serde(default)]
    pub engine: EngineSettings,

    /// Output format settings.
    #[serde(default)]
    pub output: OutputSettings,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingSettings,

    /// Default stem chain parameters. Tables may be partial.
    #[serde(default, deserialize_with = "super::stems::deserialize_layered")]
    pub stems: StemSettings,
}

/// Path configuration for output and logs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathSettings {
    /// Output folder for separated stems.
    ///
    /// Empty means an `output` folder next to each input file.
    #[serde(default)]
    pub output_folder: String,

    /// Folder for per-job log files.
    #[serde(default = "default_logs_folder")]
    pub logs_folder: String,
}

fn default_logs_folder() -> String {
    ".logs".to_string()
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            output_folder: String::new(),
            logs_folder: default_logs_folder(),
        }
    }
}

impl PathSettings {
    /// Configured output folder, if one is set.
    pub fn output_folder(&self) -> Option<&str> {
        let folder = self.output_folder.trim();
        (!folder.is_empty()).then_some(folder)
    }
}

/// Audio engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineSettings {
    /// Engine executable name or path.
    #[serde(default = "default_program")]
    pub program: String,

    /// Render both stems at the same time.
    #[serde(default)]
    pub parallel_stems: bool,

    /// Which filter graph flavour to build.
    #[serde(default)]
    pub graph_mode: GraphMode,
}

fn default_program() -> String {
    "ffmpeg".to_string()
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            program: default_program(),
            parallel_stems: false,
            graph_mode: GraphMode::default(),
        }
    }
}

/// Output format configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputSettings {
    /// Format used when the caller does not ask for one.
    #[serde(default = "default_format")]
    pub default_format: String,
}

fn default_format() -> String {
    FALLBACK_FORMAT.to_string()
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            default_format: default_format(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Default level when `RUST_LOG` is unset.
    #[serde(default)]
    pub level: LogLevel,

    /// Use compact log format.
    #[serde(default = "default_true")]
    pub compact: bool,

    /// Progress update step percentage.
    #[serde(default = "default_progress_step")]
    pub progress_step: u32,

    /// Write a log file per separation job.
    #[serde(default)]
    pub job_logs: bool,
}

fn default_true() -> bool {
    true
}

fn default_progress_step() -> u32 {
    20
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: LogLevel::default(),
            compact: true,
            progress_step: default_progress_step(),
            job_logs: false,
        }
    }
}

impl LoggingSettings {
    /// Job logger configuration derived from these settings.
    pub fn log_config(&self) -> LogConfig {
        LogConfig {
            level: self.level,
            compact: self.compact,
            progress_step: self.progress_step.max(1),
            ..LogConfig::default()
        }
    }
}

/// Names of config sections for targeted updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigSection {
    Paths,
    Engine,
    Output,
    Logging,
    Stems,
}

impl ConfigSection {
    /// All sections in file order.
    pub const ALL: [ConfigSection; 5] = [
        ConfigSection::Paths,
        ConfigSection::Engine,
        ConfigSection::Output,
        ConfigSection::Logging,
        ConfigSection::Stems,
    ];

    /// Get the TOML table name for this section.
    pub fn table_name(&self) -> &'static str {
        match self {
            ConfigSection::Paths => "paths",
            ConfigSection::Engine => "engine",
            ConfigSection::Output => "output",
            ConfigSection::Logging => "logging",
            ConfigSection::Stems => "stems",
        }
    }

    /// Comment written above the section in a generated file.
    pub fn comment(&self) -> &'static str {
        match self {
            ConfigSection::Paths => "# Output and log directories",
            ConfigSection::Engine => "# Audio engine (ffmpeg) invocation",
            ConfigSection::Output => "# Output format",
            ConfigSection::Logging => "# Logging configuration",
            ConfigSection::Stems => "# Default vocal/instrumental filter parameters",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_serializes() {
        let settings = Settings::default();
        let toml = toml::to_string_pretty(&settings).unwrap();
        assert!(toml.contains("[paths]"));
        assert!(toml.contains("[engine]"));
        assert!(toml.contains("program = \"ffmpeg\""));
        assert!(toml.contains("[stems.vocal]"));
    }

    #[test]
    fn settings_round_trip() {
        let settings = Settings::default();
        let toml = toml::to_string_pretty(&settings).unwrap();
        let parsed: Settings = toml::from_str(&toml).unwrap();
        assert_eq!(parsed.engine.program, settings.engine.program);
        assert_eq!(parsed.stems, settings.stems);
        assert_eq!(parsed.engine.graph_mode, GraphMode::Configurable);
    }

    #[test]
    fn missing_fields_use_defaults() {
        let minimal = "[engine]\nprogram = \"/opt/ffmpeg/bin/ffmpeg\"";
        let parsed: Settings = toml::from_str(minimal).unwrap();
        // Custom value preserved
        assert_eq!(parsed.engine.program, "/opt/ffmpeg/bin/ffmpeg");
        // Defaults applied for missing
        assert!(!parsed.engine.parallel_stems);
        assert_eq!(parsed.output.default_format, "wav");
        assert_eq!(parsed.stems.vocal.lowpass, 8000.0);
    }

    #[test]
    fn blank_output_folder_means_alongside_input() {
        let mut paths = PathSettings::default();
        assert_eq!(paths.output_folder(), None);
        paths.output_folder = "  ".to_string();
        assert_eq!(paths.output_folder(), None);
        paths.output_folder = "stems".to_string();
        assert_eq!(paths.output_folder(), Some("stems"));
    }

    #[test]
    fn graph_mode_parses_lowercase() {
        let parsed: Settings = toml::from_str("[engine]\ngraph_mode = \"legacy\"").unwrap();
        assert_eq!(parsed.engine.graph_mode, GraphMode::Legacy);
    }
}
