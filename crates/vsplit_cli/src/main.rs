//! Vocal Split command line front-end.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::Parser;
use vsplit_core::codec;
use vsplit_core::config::{ConfigManager, Settings, StemOverrides};
use vsplit_core::logging::{init_tracing, LogLevel};
use vsplit_core::separation::{SeparationOutput, SeparationRequest, Separator, Stem};

/// Split a stereo track into instrumental and vocal stems
#[derive(Parser, Debug)]
#[command(name = "vocal-split", version, about, long_about = None)]
struct Cli {
    /// Stereo input file
    #[arg(required_unless_present = "list_formats")]
    input: Option<PathBuf>,

    /// Output folder (default: <input dir>/output)
    #[arg(short, long = "out", value_name = "DIR")]
    output: Option<PathBuf>,

    /// Output format (wav, flac, mp3, ogg, aac, m4a)
    #[arg(short, long, value_name = "FMT")]
    format: Option<String>,

    /// Stem parameter overrides, JSON or TOML
    #[arg(short, long, value_name = "FILE")]
    params: Option<PathBuf>,

    /// Settings file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// List supported output formats and exit
    #[arg(long)]
    list_formats: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", error_report(&e));
            ExitCode::from(1)
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    if cli.list_formats {
        for format in codec::formats() {
            println!("{}", format);
        }
        return Ok(());
    }

    let settings = load_settings(cli.config.as_deref())?;

    let level = if cli.verbose {
        LogLevel::Debug
    } else {
        settings.logging.level
    };
    init_tracing(level);

    let Some(input) = cli.input else {
        bail!("No input file given");
    };

    let format = resolve_format(cli.format.as_deref(), &settings);

    let overrides = match &cli.params {
        Some(path) => read_overrides(path)?,
        None => StemOverrides::default(),
    };

    let separator = Separator::from_settings(&settings);
    separator
        .probe()
        .context("Install ffmpeg or set [engine] program in the settings file")?;

    let mut request = SeparationRequest::new(input)
        .with_format(format)
        .with_overrides(overrides);
    if let Some(dir) = cli
        .output
        .or_else(|| settings.paths.output_folder().map(PathBuf::from))
    {
        request = request.with_output_dir(dir);
    }

    let output = separator.separate(&request)?;

    print!("{}", summary(&output));
    Ok(())
}

/// One line per stem, in render order.
fn summary(output: &SeparationOutput) -> String {
    Stem::ORDER
        .iter()
        .map(|stem| format!("{:<13} {}\n", format!("{}:", stem), output.path(*stem).display()))
        .collect()
}

/// Single-line failure message with the full context chain.
fn error_report(e: &anyhow::Error) -> String {
    format!("Error: {:#}", e)
}

/// Settings from `--config`, or compiled-in defaults.
fn load_settings(path: Option<&Path>) -> Result<Settings> {
    let Some(path) = path else {
        return Ok(Settings::default());
    };

    let mut manager = ConfigManager::new(path);
    manager
        .load_or_create()
        .with_context(|| format!("Failed to load settings from {}", path.display()))?;
    Ok(manager.into_settings())
}

/// Lowercased output format, falling back to wav for unknown ones.
fn resolve_format(requested: Option<&str>, settings: &Settings) -> String {
    let format = requested
        .unwrap_or(&settings.output.default_format)
        .trim()
        .to_lowercase();

    if codec::is_supported(&format) {
        format
    } else {
        tracing::warn!(
            "Unsupported format '{}', using {}",
            format,
            codec::FALLBACK_FORMAT
        );
        codec::FALLBACK_FORMAT.to_string()
    }
}

/// Read an overrides file. `.toml` files are TOML, anything else JSON.
fn read_overrides(path: &Path) -> Result<StemOverrides> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read parameters from {}", path.display()))?;

    let is_toml = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

    let overrides = if is_toml {
        toml::from_str(&content)
            .with_context(|| format!("Invalid TOML parameters in {}", path.display()))?
    } else {
        serde_json::from_str(&content)
            .with_context(|| format!("Invalid JSON parameters in {}", path.display()))?
    };
    Ok(overrides)
}
