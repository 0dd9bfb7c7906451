//! Stereo stem separation.
//!
//! A job takes one stereo file and writes two derived files next to each
//! other: an instrumental stem (side channel, `L - R`) and a vocal stem
//! (mid channel, `(L + R) / 2`), each shaped by its own filter chain.
//!
//! # Example
//!
//! ```no_run
//! use vsplit_core::config::Settings;
//! use vsplit_core::separation::{SeparationRequest, Separator};
//!
//! let separator = Separator::from_settings(&Settings::default());
//! separator.probe().unwrap();
//!
//! let request = SeparationRequest::new("song.mp3").with_format("flac");
//! let output = separator.separate(&request).unwrap();
//! println!("{}", output.vocal_path.display());
//! ```

mod errors;
mod job;
mod separator;

pub use errors::{SeparationError, SeparationResult};
pub use job::{
    SeparationJob, SeparationOutput, SeparationRequest, Stem, DEFAULT_OUTPUT_DIR_NAME,
};
pub use separator::Separator;
