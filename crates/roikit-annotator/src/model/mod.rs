use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use roikit_core::constants::PERCENT_MAX;
use roikit_core::ShapeError;

use crate::frame::FrameGeometry;

mod annotation;
mod circle;
mod line;
mod polygon;
mod profile;
mod rectangle;

pub use annotation::{Shape, ShapeDraft, ShapePatch};
pub use circle::RoiCircle;
pub use line::{arrow_head, distance_to_segment, RoiLine};
pub use polygon::RoiPolygon;
pub use profile::Profile;
pub use rectangle::RoiRectangle;

/// Slack allowed on the [0, 100] bounds for floating-point rounding.
pub(crate) const RANGE_EPSILON: f64 = 1e-9;

/// A point in raster surface pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PixelPoint {
    pub x: f64,
    pub y: f64,
}

impl PixelPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &PixelPoint) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// A point in frame percentage space, both axes in [0, 100].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PercentPoint {
    pub x: f64,
    pub y: f64,
}

impl PercentPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

pub(crate) fn check_range(value: f64) -> Result<(), ShapeError> {
    if value.is_finite() && (-RANGE_EPSILON..=PERCENT_MAX + RANGE_EPSILON).contains(&value) {
        Ok(())
    } else {
        Err(ShapeError::CoordinateOutOfRange { value })
    }
}

/// Moves `delta` toward zero until `[lo + delta, hi + delta]` fits in [0, 100].
pub(crate) fn clamp_delta(delta: f64, lo: f64, hi: f64) -> f64 {
    delta.min(PERCENT_MAX - hi).max(-lo)
}

/// Behaviour shared by every ROI geometry kind.
pub trait RoiShape {
    /// Flat percentage coordinates in wire layout.
    fn coordinates(&self) -> Vec<f64>;

    /// First anchor point, where the comment badge attaches.
    fn anchor(&self) -> PercentPoint;

    /// Containment predicate in pixel space.
    fn contains(&self, p: PixelPoint, frame: &FrameGeometry, tolerance: f64) -> bool;

    /// Pixel positions of the selection handles.
    fn handles(&self, frame: &FrameGeometry) -> Vec<PixelPoint>;

    /// Bounding extent `(min_x, min_y, max_x, max_y)` of the positional
    /// coordinates, in percent. A translation must keep it inside [0, 100].
    fn extent(&self) -> (f64, f64, f64, f64);

    /// Shifts every position by a percentage delta, unclamped.
    fn translate(&mut self, dx: f64, dy: f64);

    /// Zero-area rectangles and circles, zero-length lines.
    fn is_degenerate(&self) -> bool;

    fn validate(&self) -> Result<(), ShapeError> {
        self.coordinates().into_iter().try_for_each(check_range)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeType {
    Rectangle,
    Circle,
    Polygon,
    Line,
    Arrow,
}

impl ShapeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShapeType::Rectangle => "rectangle",
            ShapeType::Circle => "circle",
            ShapeType::Polygon => "polygon",
            ShapeType::Line => "line",
            ShapeType::Arrow => "arrow",
        }
    }
}

impl fmt::Display for ShapeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShapeType {
    type Err = ShapeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rectangle" => Ok(ShapeType::Rectangle),
            "circle" => Ok(ShapeType::Circle),
            "polygon" => Ok(ShapeType::Polygon),
            "line" => Ok(ShapeType::Line),
            "arrow" => Ok(ShapeType::Arrow),
            other => Err(ShapeError::UnknownShapeType(other.to_string())),
        }
    }
}

/// Geometry of one annotation, tagged by kind.
#[derive(Debug, Clone, PartialEq)]
pub enum ShapeGeometry {
    Rectangle(RoiRectangle),
    Circle(RoiCircle),
    Polygon(RoiPolygon),
    Line(RoiLine),
    Arrow(RoiLine),
}

impl ShapeGeometry {
    pub fn shape_type(&self) -> ShapeType {
        match self {
            ShapeGeometry::Rectangle(_) => ShapeType::Rectangle,
            ShapeGeometry::Circle(_) => ShapeType::Circle,
            ShapeGeometry::Polygon(_) => ShapeType::Polygon,
            ShapeGeometry::Line(_) => ShapeType::Line,
            ShapeGeometry::Arrow(_) => ShapeType::Arrow,
        }
    }

    fn inner(&self) -> &dyn RoiShape {
        match self {
            ShapeGeometry::Rectangle(r) => r,
            ShapeGeometry::Circle(c) => c,
            ShapeGeometry::Polygon(p) => p,
            ShapeGeometry::Line(l) | ShapeGeometry::Arrow(l) => l,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn RoiShape {
        match self {
            ShapeGeometry::Rectangle(r) => r,
            ShapeGeometry::Circle(c) => c,
            ShapeGeometry::Polygon(p) => p,
            ShapeGeometry::Line(l) | ShapeGeometry::Arrow(l) => l,
        }
    }

    /// Builds a single-drag shape from its anchor and release points.
    ///
    /// Returns `None` for polygons, which are built point by point.
    pub fn from_drag(
        shape_type: ShapeType,
        anchor: PixelPoint,
        release: PixelPoint,
        frame: &FrameGeometry,
    ) -> Option<Self> {
        let a = frame.to_percent(anchor);
        let b = frame.to_percent(release);
        match shape_type {
            ShapeType::Rectangle => Some(ShapeGeometry::Rectangle(RoiRectangle::from_corners(a, b))),
            ShapeType::Circle => {
                let radius = frame.radius_to_percent(anchor.distance_to(&release));
                Some(ShapeGeometry::Circle(RoiCircle::new(a, radius)))
            }
            ShapeType::Line => Some(ShapeGeometry::Line(RoiLine::new(a, b))),
            ShapeType::Arrow => Some(ShapeGeometry::Arrow(RoiLine::new(a, b))),
            ShapeType::Polygon => None,
        }
    }

    /// Builds a polygon from pixel vertices.
    pub fn polygon_from_pixels(points: &[PixelPoint], frame: &FrameGeometry) -> Self {
        ShapeGeometry::Polygon(RoiPolygon::new(
            points.iter().map(|p| frame.to_percent(*p)).collect(),
        ))
    }

    /// Decodes the flat wire layout of `shape_type`.
    pub fn from_coordinates(shape_type: ShapeType, coords: &[f64]) -> Result<Self, ShapeError> {
        let malformed = || ShapeError::MalformedCoordinates {
            shape_type: shape_type.to_string(),
            len: coords.len(),
        };
        let geometry = match (shape_type, coords) {
            (ShapeType::Rectangle, &[x, y, w, h]) => {
                ShapeGeometry::Rectangle(RoiRectangle::new(x, y, w, h))
            }
            (ShapeType::Circle, &[cx, cy, r]) => {
                ShapeGeometry::Circle(RoiCircle::new(PercentPoint::new(cx, cy), r))
            }
            (ShapeType::Line, &[x1, y1, x2, y2]) => ShapeGeometry::Line(RoiLine::new(
                PercentPoint::new(x1, y1),
                PercentPoint::new(x2, y2),
            )),
            (ShapeType::Arrow, &[x1, y1, x2, y2]) => ShapeGeometry::Arrow(RoiLine::new(
                PercentPoint::new(x1, y1),
                PercentPoint::new(x2, y2),
            )),
            (ShapeType::Polygon, _) if coords.len() % 2 == 0 => ShapeGeometry::Polygon(
                RoiPolygon::new(
                    coords
                        .chunks_exact(2)
                        .map(|c| PercentPoint::new(c[0], c[1]))
                        .collect(),
                ),
            ),
            _ => return Err(malformed()),
        };
        geometry.validate()?;
        Ok(geometry)
    }

    /// Returns a copy moved by a percentage delta, clamped so every
    /// positional coordinate stays inside the frame.
    pub fn translated(&self, dx: f64, dy: f64) -> Self {
        let (min_x, min_y, max_x, max_y) = self.extent();
        let dx = clamp_delta(dx, min_x, max_x);
        let dy = clamp_delta(dy, min_y, max_y);
        let mut moved = self.clone();
        moved.inner_mut().translate(dx, dy);
        moved
    }
}

impl RoiShape for ShapeGeometry {
    fn coordinates(&self) -> Vec<f64> {
        self.inner().coordinates()
    }

    fn anchor(&self) -> PercentPoint {
        self.inner().anchor()
    }

    fn contains(&self, p: PixelPoint, frame: &FrameGeometry, tolerance: f64) -> bool {
        self.inner().contains(p, frame, tolerance)
    }

    fn handles(&self, frame: &FrameGeometry) -> Vec<PixelPoint> {
        self.inner().handles(frame)
    }

    fn extent(&self) -> (f64, f64, f64, f64) {
        self.inner().extent()
    }

    fn translate(&mut self, dx: f64, dy: f64) {
        self.inner_mut().translate(dx, dy);
    }

    fn is_degenerate(&self) -> bool {
        self.inner().is_degenerate()
    }

    fn validate(&self) -> Result<(), ShapeError> {
        self.inner().validate()
    }
}
