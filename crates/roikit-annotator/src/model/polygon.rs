use super::{PercentPoint, PixelPoint, RoiShape};
use crate::frame::FrameGeometry;
use roikit_core::constants::MIN_POLYGON_POINTS;
use roikit_core::ShapeError;

/// Closed polygon, `[x1, y1, ..., xn, yn]` with n >= 3.
#[derive(Debug, Clone, PartialEq)]
pub struct RoiPolygon {
    pub points: Vec<PercentPoint>,
}

impl RoiPolygon {
    pub fn new(points: Vec<PercentPoint>) -> Self {
        Self { points }
    }
}

/// Even-odd ray casting.
pub(crate) fn point_in_polygon(p: PixelPoint, vertices: &[PixelPoint]) -> bool {
    let n = vertices.len();
    if n < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let (vi, vj) = (vertices[i], vertices[j]);
        if ((vi.y > p.y) != (vj.y > p.y))
            && (p.x < (vj.x - vi.x) * (p.y - vi.y) / (vj.y - vi.y) + vi.x)
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}

impl RoiShape for RoiPolygon {
    fn coordinates(&self) -> Vec<f64> {
        self.points.iter().flat_map(|p| [p.x, p.y]).collect()
    }

    fn anchor(&self) -> PercentPoint {
        self.points.first().copied().unwrap_or_default()
    }

    fn contains(&self, p: PixelPoint, frame: &FrameGeometry, _tolerance: f64) -> bool {
        let vertices = self.handles(frame);
        point_in_polygon(p, &vertices)
    }

    fn handles(&self, frame: &FrameGeometry) -> Vec<PixelPoint> {
        self.points.iter().map(|p| frame.to_pixel(*p)).collect()
    }

    fn extent(&self) -> (f64, f64, f64, f64) {
        self.points.iter().fold(
            (f64::INFINITY, f64::INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
            |(x0, y0, x1, y1), p| (x0.min(p.x), y0.min(p.y), x1.max(p.x), y1.max(p.y)),
        )
    }

    fn translate(&mut self, dx: f64, dy: f64) {
        for p in &mut self.points {
            p.x += dx;
            p.y += dy;
        }
    }

    fn is_degenerate(&self) -> bool {
        self.points.len() < MIN_POLYGON_POINTS
    }

    fn validate(&self) -> Result<(), ShapeError> {
        if self.points.len() < MIN_POLYGON_POINTS {
            return Err(ShapeError::TooFewPoints {
                required: MIN_POLYGON_POINTS,
                actual: self.points.len(),
            });
        }
        self.coordinates()
            .into_iter()
            .try_for_each(super::check_range)
    }
}
