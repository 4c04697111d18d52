//! Render frame geometry and coordinate transformation.
//!
//! Handles conversion between pixel coordinates (raster surface space) and
//! percentage coordinates (frame space, both axes in [0, 100]). The frame is
//! the pixel size the camera still is drawn at; every transform must be
//! recomputed when it changes.

use std::fmt;

use roikit_core::constants::PERCENT_MAX;

use crate::model::{PercentPoint, PixelPoint};

/// Pixel size of the current raster surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameGeometry {
    width: f64,
    height: f64,
}

impl FrameGeometry {
    /// Creates a frame of the given pixel size.
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Fits an image into a container, preserving aspect ratio.
    ///
    /// The image is scaled to the container width first; when that exceeds
    /// `max_height` it is scaled to the maximum height instead. Returns `None`
    /// when any input dimension has no area.
    pub fn fit(
        natural_width: f64,
        natural_height: f64,
        container_width: f64,
        max_height: f64,
    ) -> Option<Self> {
        if !(natural_width > 0.0 && natural_height > 0.0)
            || !(container_width > 0.0 && max_height > 0.0)
        {
            return None;
        }

        let aspect = natural_width / natural_height;
        let mut width = container_width;
        let mut height = width / aspect;
        if height > max_height {
            height = max_height;
            width = height * aspect;
        }
        Some(Self::new(width, height))
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    /// Integer pixel size for raster allocation (at least 1x1).
    pub fn pixel_size(&self) -> (u32, u32) {
        (
            self.width.round().max(1.0) as u32,
            self.height.round().max(1.0) as u32,
        )
    }

    /// True when the frame has no drawable area.
    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    /// Scale basis for circle radii: the shorter frame side.
    ///
    /// Using the shorter side keeps circles round on any aspect ratio.
    pub fn radius_basis(&self) -> f64 {
        self.width.min(self.height)
    }

    /// Converts pixel coordinates to percentage coordinates.
    ///
    /// Formula:
    /// ```text
    /// percent_x = pixel_x / width * 100
    /// percent_y = pixel_y / height * 100
    /// ```
    pub fn to_percent(&self, point: PixelPoint) -> PercentPoint {
        PercentPoint::new(
            point.x / self.width * PERCENT_MAX,
            point.y / self.height * PERCENT_MAX,
        )
    }

    /// Converts percentage coordinates to pixel coordinates.
    pub fn to_pixel(&self, point: PercentPoint) -> PixelPoint {
        PixelPoint::new(
            point.x / PERCENT_MAX * self.width,
            point.y / PERCENT_MAX * self.height,
        )
    }

    /// Converts a pixel radius to a percentage of the radius basis.
    pub fn radius_to_percent(&self, radius_px: f64) -> f64 {
        radius_px / self.radius_basis() * PERCENT_MAX
    }

    /// Converts a percentage radius to pixels.
    pub fn radius_to_pixel(&self, radius_pct: f64) -> f64 {
        radius_pct / PERCENT_MAX * self.radius_basis()
    }

    /// Converts a horizontal pixel delta to a percentage delta.
    pub fn dx_to_percent(&self, dx: f64) -> f64 {
        dx / self.width * PERCENT_MAX
    }

    /// Converts a vertical pixel delta to a percentage delta.
    pub fn dy_to_percent(&self, dy: f64) -> f64 {
        dy / self.height * PERCENT_MAX
    }

    /// True when the point lies on the frame (inclusive bounds).
    pub fn contains(&self, point: PixelPoint) -> bool {
        point.x >= 0.0 && point.y >= 0.0 && point.x <= self.width && point.y <= self.height
    }
}

impl fmt::Display for FrameGeometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}x{:.1}", self.width, self.height)
    }
}

impl Default for FrameGeometry {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}
