//! roikit Settings Crate
//!
//! Handles engine configuration: hit-test and drawing tolerances, render
//! style, and per-scope profile policy, persisted as JSON or TOML.

pub mod config;
pub mod error;

pub use config::{Config, DrawingSettings, ProfileSettings, RenderSettings};
pub use error::{ConfigError, ConfigResult, SettingsError, SettingsResult};
