//! Configuration and settings management for roikit
//!
//! Provides configuration file handling, defaults, and validation.
//! Supports JSON and TOML file formats stored in platform-specific directories.
//!
//! Configuration is organized into logical sections:
//! - Drawing settings (hit tolerance, polygon closing, degenerate shapes)
//! - Render settings (frame fitting, strokes, handles, badges)
//! - Profile settings (per-scope limit and validation order)

use crate::error::{ConfigError, SettingsError, SettingsResult};
use roikit_core::constants;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Pointer interaction settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DrawingSettings {
    /// Distance in pixels within which a line or arrow is hit
    pub hit_tolerance_px: f64,
    /// Distance in pixels from the first vertex that closes a polygon
    pub polygon_close_tolerance_px: f64,
    /// Drop zero-area rectangles/circles and zero-length lines on completion
    pub discard_degenerate: bool,
}

impl Default for DrawingSettings {
    fn default() -> Self {
        Self {
            hit_tolerance_px: constants::HIT_TOLERANCE_PX,
            polygon_close_tolerance_px: constants::POLYGON_CLOSE_TOLERANCE_PX,
            discard_degenerate: true,
        }
    }
}

/// Drawing surface appearance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    /// Width of the container the frame is fitted into
    pub container_width: f64,
    /// Maximum frame height
    pub max_height: f64,
    /// Opacity of shape fills (0.0 - 1.0)
    pub fill_alpha: f32,
    /// Stroke width of unselected shapes
    pub stroke_width: f32,
    /// Stroke width of the selected shape
    pub selected_stroke_width: f32,
    /// Stroke width of a hovered shape
    pub hover_stroke_width: f32,
    /// Dash pattern for the selected shape's stroke (on, off, ...)
    pub dash_pattern: Vec<f32>,
    /// Edge length of selection handles
    pub handle_size: f32,
    /// Radius of comment badges
    pub badge_radius: f32,
    /// Offset of a comment badge from the shape's first anchor
    pub badge_offset: (f32, f32),
    /// Length of each arrow-head stroke
    pub arrow_head_length: f32,
    /// Surface color behind the base image, `#rrggbb`
    pub background: String,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            container_width: constants::DEFAULT_CONTAINER_WIDTH,
            max_height: constants::DEFAULT_MAX_FRAME_HEIGHT,
            fill_alpha: 0.2,
            stroke_width: 2.0,
            selected_stroke_width: 3.0,
            hover_stroke_width: 3.0,
            dash_pattern: vec![6.0, 4.0],
            handle_size: 8.0,
            badge_radius: constants::BADGE_RADIUS_PX,
            badge_offset: constants::BADGE_OFFSET_PX,
            arrow_head_length: constants::ARROW_HEAD_LENGTH_PX,
            background: "#1f2937".to_string(),
        }
    }
}

impl RenderSettings {
    /// Parses `background` into RGB components.
    pub fn background_rgb(&self) -> Option<(u8, u8, u8)> {
        parse_hex_rgb(&self.background)
    }
}

/// Profile creation policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileSettings {
    /// Maximum profiles within one (objective, camera) scope
    pub max_per_scope: usize,
    /// Check the profile limit before the duplicate-name check
    pub limit_check_first: bool,
}

impl Default for ProfileSettings {
    fn default() -> Self {
        Self {
            max_per_scope: constants::MAX_PROFILES_PER_SCOPE,
            limit_check_first: false,
        }
    }
}

/// Complete engine configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Pointer interaction settings
    pub drawing: DrawingSettings,
    /// Surface appearance
    pub render: RenderSettings,
    /// Profile policy
    pub profiles: ProfileSettings,
}

impl Config {
    /// Create new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Default config file location: `<config dir>/roikit/config.toml`
    pub fn default_path() -> SettingsResult<PathBuf> {
        let dir = dirs::config_dir().ok_or_else(|| {
            ConfigError::UnsupportedPlatform(std::env::consts::OS.to_string())
        })?;
        Ok(dir.join("roikit").join("config.toml"))
    }

    /// Load config from the default location, or defaults if no file exists
    pub fn load_or_default() -> SettingsResult<Self> {
        let path = Self::default_path()?;
        if path.exists() {
            Self::load_from_file(&path)
        } else {
            tracing::debug!("No config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| SettingsError::LoadError(format!("{}: {}", path.display(), e)))?;

        let config: Self = match extension(path) {
            Some("json") => serde_json::from_str(&content)?,
            Some("toml") => toml::from_str(&content)?,
            other => {
                return Err(ConfigError::UnsupportedFormat(other.unwrap_or("").to_string()).into())
            }
        };

        config.validate()?;
        tracing::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Save config to file (JSON or TOML)
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = match extension(path) {
            Some("json") => serde_json::to_string_pretty(self)?,
            Some("toml") => toml::to_string_pretty(self)?,
            other => {
                return Err(ConfigError::UnsupportedFormat(other.unwrap_or("").to_string()).into())
            }
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| SettingsError::ConfigDirectory(e.to_string()))?;
            }
        }
        std::fs::write(path, content)
            .map_err(|e| SettingsError::SaveError(format!("{}: {}", path.display(), e)))?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        let d = &self.drawing;
        check_positive("drawing.hit_tolerance_px", d.hit_tolerance_px)?;
        check_positive(
            "drawing.polygon_close_tolerance_px",
            d.polygon_close_tolerance_px,
        )?;

        let r = &self.render;
        check_positive("render.container_width", r.container_width)?;
        check_positive("render.max_height", r.max_height)?;
        if !(0.0..=1.0).contains(&r.fill_alpha) {
            return Err(out_of_range("render.fill_alpha", r.fill_alpha));
        }
        check_positive("render.stroke_width", r.stroke_width as f64)?;
        check_positive("render.selected_stroke_width", r.selected_stroke_width as f64)?;
        check_positive("render.hover_stroke_width", r.hover_stroke_width as f64)?;
        check_positive("render.handle_size", r.handle_size as f64)?;
        check_positive("render.badge_radius", r.badge_radius as f64)?;
        check_positive("render.arrow_head_length", r.arrow_head_length as f64)?;
        // tiny-skia needs an even, non-empty dash pattern of positive intervals
        if r.dash_pattern.len() < 2
            || r.dash_pattern.len() % 2 != 0
            || r.dash_pattern.iter().any(|v| !(*v > 0.0))
        {
            return Err(out_of_range(
                "render.dash_pattern",
                format!("{:?}", r.dash_pattern),
            ));
        }
        if r.background_rgb().is_none() {
            return Err(out_of_range("render.background", &r.background));
        }

        if self.profiles.max_per_scope == 0 {
            return Err(out_of_range("profiles.max_per_scope", 0));
        }

        Ok(())
    }
}

fn extension(path: &Path) -> Option<&str> {
    path.extension().and_then(|ext| ext.to_str())
}

fn check_positive(key: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(out_of_range(key, value))
    }
}

fn out_of_range(key: &str, value: impl ToString) -> ConfigError {
    ConfigError::ValueOutOfRange {
        key: key.to_string(),
        value: value.to_string(),
    }
}

fn parse_hex_rgb(s: &str) -> Option<(u8, u8, u8)> {
    let hex = s.trim().strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some((r, g, b))
}
