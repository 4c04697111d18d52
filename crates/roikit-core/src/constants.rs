//! Engine-wide constants.
//!
//! These are the defaults the settings crate falls back to; the annotator
//! reads tunable values from `roikit_settings::Config` at runtime.

/// Upper bound of the percentage coordinate space.
pub const PERCENT_MAX: f64 = 100.0;

/// Maximum number of profiles within one (objective, camera) scope.
pub const MAX_PROFILES_PER_SCOPE: usize = 10;

/// Pixel distance within which a line or arrow counts as hit.
pub const HIT_TOLERANCE_PX: f64 = 5.0;

/// Pixel distance from the first vertex that closes an accumulating polygon.
pub const POLYGON_CLOSE_TOLERANCE_PX: f64 = 10.0;

/// Minimum vertex count of a polygon.
pub const MIN_POLYGON_POINTS: usize = 3;

/// Default container width the frame is fitted to.
pub const DEFAULT_CONTAINER_WIDTH: f64 = 960.0;

/// Default maximum frame height.
pub const DEFAULT_MAX_FRAME_HEIGHT: f64 = 600.0;

/// Radius of the comment badge, in pixels.
pub const BADGE_RADIUS_PX: f32 = 8.0;

/// Offset of the comment badge from the shape's first anchor, in pixels.
pub const BADGE_OFFSET_PX: (f32, f32) = (12.0, -12.0);

/// Length of each arrow-head stroke, in pixels.
pub const ARROW_HEAD_LENGTH_PX: f32 = 15.0;
