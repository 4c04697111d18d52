use super::{PercentPoint, PixelPoint, RoiShape};
use crate::frame::FrameGeometry;

/// Circle, `[centerX, centerY, radius]`.
///
/// The radius is a percentage of the shorter frame side, so a circle stays
/// round whatever the frame aspect ratio.
#[derive(Debug, Clone, PartialEq)]
pub struct RoiCircle {
    pub center: PercentPoint,
    pub radius: f64,
}

impl RoiCircle {
    pub fn new(center: PercentPoint, radius: f64) -> Self {
        Self { center, radius }
    }

    /// Center and radius in pixels.
    pub fn to_pixels(&self, frame: &FrameGeometry) -> (PixelPoint, f64) {
        (frame.to_pixel(self.center), frame.radius_to_pixel(self.radius))
    }
}

impl RoiShape for RoiCircle {
    fn coordinates(&self) -> Vec<f64> {
        vec![self.center.x, self.center.y, self.radius]
    }

    fn anchor(&self) -> PercentPoint {
        self.center
    }

    fn contains(&self, p: PixelPoint, frame: &FrameGeometry, _tolerance: f64) -> bool {
        let (center, radius) = self.to_pixels(frame);
        p.distance_to(&center) <= radius
    }

    fn handles(&self, frame: &FrameGeometry) -> Vec<PixelPoint> {
        let (center, radius) = self.to_pixels(frame);
        vec![center, PixelPoint::new(center.x + radius, center.y)]
    }

    fn extent(&self) -> (f64, f64, f64, f64) {
        // The radius is not positional; only the center is kept in range.
        (self.center.x, self.center.y, self.center.x, self.center.y)
    }

    fn translate(&mut self, dx: f64, dy: f64) {
        self.center.x += dx;
        self.center.y += dy;
    }

    fn is_degenerate(&self) -> bool {
        self.radius <= 0.0
    }
}
