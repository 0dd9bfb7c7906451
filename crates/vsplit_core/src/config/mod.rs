//! Configuration management for Vocal Split.
//!
//! Configuration is layered:
//! 1. Compiled-in defaults (`Settings::default()`, `StemSettings::default()`)
//! 2. The TOML settings file, where missing keys keep their defaults
//! 3. Per-job [`StemOverrides`], merged onto the stem defaults with [`Merge`]
//!
//! The settings file is managed by [`ConfigManager`], which writes atomically
//! (temp file, then rename) and can update a single section in place.
//!
//! # Example
//!
//! ```no_run
//! use vsplit_core::config::{ConfigManager, ConfigSection};
//!
//! let mut config = ConfigManager::new(".config/settings.toml");
//! config.load_or_create().unwrap();
//!
//! println!("Engine: {}", config.settings().engine.program);
//!
//! config.settings_mut().engine.parallel_stems = true;
//! config.update_section(ConfigSection::Engine).unwrap();
//! ```

mod manager;
mod settings;
mod stems;

pub use manager::{ConfigError, ConfigManager, ConfigResult};
pub use settings::{
    ConfigSection, EngineSettings, LoggingSettings, OutputSettings, PathSettings, Settings,
};
pub use stems::{
    DynamicsOverrides, DynamicsSettings, EqOverrides, EqSettings, InstrumentalOverrides,
    InstrumentalSettings, Merge, StemOverrides, StemSettings, VocalOverrides, VocalSettings,
};
