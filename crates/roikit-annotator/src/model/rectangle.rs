use super::{check_range, PercentPoint, PixelPoint, RoiShape};
use crate::frame::FrameGeometry;
use roikit_core::ShapeError;

/// Axis-aligned rectangle, `[x, y, width, height]` in percent.
#[derive(Debug, Clone, PartialEq)]
pub struct RoiRectangle {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl RoiRectangle {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Normalizes two opposite corners so width and height are non-negative.
    pub fn from_corners(a: PercentPoint, b: PercentPoint) -> Self {
        Self::new(
            a.x.min(b.x),
            a.y.min(b.y),
            (b.x - a.x).abs(),
            (b.y - a.y).abs(),
        )
    }

    /// Corner points clockwise from top-left.
    pub fn corners(&self) -> [PercentPoint; 4] {
        let (x1, y1) = (self.x, self.y);
        let (x2, y2) = (self.x + self.width, self.y + self.height);
        [
            PercentPoint::new(x1, y1),
            PercentPoint::new(x2, y1),
            PercentPoint::new(x2, y2),
            PercentPoint::new(x1, y2),
        ]
    }
}

impl RoiShape for RoiRectangle {
    fn coordinates(&self) -> Vec<f64> {
        vec![self.x, self.y, self.width, self.height]
    }

    fn anchor(&self) -> PercentPoint {
        PercentPoint::new(self.x, self.y)
    }

    fn contains(&self, p: PixelPoint, frame: &FrameGeometry, _tolerance: f64) -> bool {
        let min = frame.to_pixel(PercentPoint::new(self.x, self.y));
        let max = frame.to_pixel(PercentPoint::new(
            self.x + self.width,
            self.y + self.height,
        ));
        p.x >= min.x && p.x <= max.x && p.y >= min.y && p.y <= max.y
    }

    fn handles(&self, frame: &FrameGeometry) -> Vec<PixelPoint> {
        self.corners().iter().map(|c| frame.to_pixel(*c)).collect()
    }

    fn extent(&self) -> (f64, f64, f64, f64) {
        (self.x, self.y, self.x + self.width, self.y + self.height)
    }

    fn translate(&mut self, dx: f64, dy: f64) {
        self.x += dx;
        self.y += dy;
    }

    fn is_degenerate(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    fn validate(&self) -> Result<(), ShapeError> {
        check_range(self.x)?;
        check_range(self.y)?;
        check_range(self.width)?;
        check_range(self.height)?;
        check_range(self.x + self.width)?;
        check_range(self.y + self.height)
    }
}
