use super::{PercentPoint, PixelPoint, RoiShape};
use crate::frame::FrameGeometry;

/// Angle between the shaft and each arrow-head stroke.
const ARROW_HEAD_ANGLE: f64 = std::f64::consts::PI / 6.0;

/// Line segment, `[x1, y1, x2, y2]`. Also backs arrows, which render a head
/// at `end`.
#[derive(Debug, Clone, PartialEq)]
pub struct RoiLine {
    pub start: PercentPoint,
    pub end: PercentPoint,
}

impl RoiLine {
    pub fn new(start: PercentPoint, end: PercentPoint) -> Self {
        Self { start, end }
    }
}

/// Distance from `p` to the segment `a`-`b`, projection clamped to the segment.
pub fn distance_to_segment(p: PixelPoint, a: PixelPoint, b: PixelPoint) -> f64 {
    let l2 = (b.x - a.x).powi(2) + (b.y - a.y).powi(2);
    if l2 == 0.0 {
        return p.distance_to(&a);
    }
    let t = (((p.x - a.x) * (b.x - a.x) + (p.y - a.y) * (b.y - a.y)) / l2).clamp(0.0, 1.0);
    let proj = PixelPoint::new(a.x + t * (b.x - a.x), a.y + t * (b.y - a.y));
    p.distance_to(&proj)
}

/// End points of the two head strokes of an arrow pointing from `from` to `tip`.
pub fn arrow_head(from: PixelPoint, tip: PixelPoint, length: f64) -> [PixelPoint; 2] {
    let angle = (tip.y - from.y).atan2(tip.x - from.x);
    let wing = |offset: f64| {
        PixelPoint::new(
            tip.x - length * (angle + offset).cos(),
            tip.y - length * (angle + offset).sin(),
        )
    };
    [wing(-ARROW_HEAD_ANGLE), wing(ARROW_HEAD_ANGLE)]
}

impl RoiShape for RoiLine {
    fn coordinates(&self) -> Vec<f64> {
        vec![self.start.x, self.start.y, self.end.x, self.end.y]
    }

    fn anchor(&self) -> PercentPoint {
        self.start
    }

    fn contains(&self, p: PixelPoint, frame: &FrameGeometry, tolerance: f64) -> bool {
        let a = frame.to_pixel(self.start);
        let b = frame.to_pixel(self.end);
        distance_to_segment(p, a, b) <= tolerance
    }

    fn handles(&self, frame: &FrameGeometry) -> Vec<PixelPoint> {
        vec![frame.to_pixel(self.start), frame.to_pixel(self.end)]
    }

    fn extent(&self) -> (f64, f64, f64, f64) {
        (
            self.start.x.min(self.end.x),
            self.start.y.min(self.end.y),
            self.start.x.max(self.end.x),
            self.start.y.max(self.end.y),
        )
    }

    fn translate(&mut self, dx: f64, dy: f64) {
        self.start.x += dx;
        self.start.y += dy;
        self.end.x += dx;
        self.end.y += dy;
    }

    fn is_degenerate(&self) -> bool {
        self.start == self.end
    }
}
