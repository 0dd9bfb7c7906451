//! Vocal Split core - stereo stem separation on top of ffmpeg.
//!
//! This crate holds all separation logic with no front-end dependencies.
//! It is used by the `vocal-split` CLI and can back any other front-end.

pub mod codec;
pub mod config;
pub mod engine;
pub mod filters;
pub mod logging;
pub mod separation;

pub use codec::CodecDescriptor;
pub use engine::{AudioEngine, FfmpegEngine};
pub use separation::{SeparationError, SeparationOutput, SeparationRequest, Separator, Stem};

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
