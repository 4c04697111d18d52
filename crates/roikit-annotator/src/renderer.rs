//! Raster renderer for annotation frames.
//!
//! Draws the camera still scaled to the frame, every visible profile's shapes
//! with selection and hover decoration, comment badges, and the shape being
//! drawn, using tiny-skia for anti-aliased 2D rendering.
//!
//! Every call to [`Renderer::render`] is a full redraw. The badge side table is
//! rebuilt on each pass and is the only state the renderer keeps besides the
//! scaled base image.

use image::{imageops::FilterType, RgbaImage};
use tiny_skia::{
    Color, ColorU8, FillRule, LineCap, LineJoin, Paint, Path, PathBuilder, Pixmap, PixmapPaint,
    Rect, Stroke, StrokeDash, Transform,
};

use roikit_core::{RoiColor, ShapeId};
use roikit_settings::RenderSettings;

use crate::drawing::DrawingPreview;
use crate::frame::FrameGeometry;
use crate::model::{arrow_head, PixelPoint, Profile, RoiShape, ShapeGeometry};

/// Resolved drawing parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderStyle {
    pub fill_alpha: f32,
    pub stroke_width: f32,
    pub selected_stroke_width: f32,
    pub hover_stroke_width: f32,
    pub dash_pattern: Vec<f32>,
    pub handle_size: f32,
    pub badge_radius: f32,
    pub badge_offset: (f32, f32),
    pub arrow_head_length: f32,
    pub background: (u8, u8, u8),
}

impl From<&RenderSettings> for RenderStyle {
    fn from(settings: &RenderSettings) -> Self {
        Self {
            fill_alpha: settings.fill_alpha,
            stroke_width: settings.stroke_width,
            selected_stroke_width: settings.selected_stroke_width,
            hover_stroke_width: settings.hover_stroke_width,
            dash_pattern: settings.dash_pattern.clone(),
            handle_size: settings.handle_size,
            badge_radius: settings.badge_radius,
            badge_offset: settings.badge_offset,
            arrow_head_length: settings.arrow_head_length,
            background: settings.background_rgb().unwrap_or((0, 0, 0)),
        }
    }
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self::from(&RenderSettings::default())
    }
}

/// A comment badge as drawn on the last pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Badge {
    pub center: PixelPoint,
    pub radius: f64,
}

impl Badge {
    pub fn contains(&self, p: PixelPoint) -> bool {
        p.distance_to(&self.center) <= self.radius
    }
}

/// Badge positions keyed by shape id, in draw order.
#[derive(Debug, Clone, Default)]
pub struct BadgeTable {
    entries: Vec<(ShapeId, Badge)>,
}

impl BadgeTable {
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn insert(&mut self, shape_id: ShapeId, badge: Badge) {
        self.entries.push((shape_id, badge));
    }

    pub fn get(&self, shape_id: ShapeId) -> Option<&Badge> {
        self.entries
            .iter()
            .find(|(id, _)| *id == shape_id)
            .map(|(_, badge)| badge)
    }

    /// The topmost badge under `p`.
    pub fn hit(&self, p: PixelPoint) -> Option<ShapeId> {
        self.entries
            .iter()
            .rev()
            .find(|(_, badge)| badge.contains(p))
            .map(|(id, _)| *id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Everything one redraw depends on besides the base image.
#[derive(Debug, Clone)]
pub struct Scene<'a> {
    pub profiles: &'a [Profile],
    pub selected: Option<ShapeId>,
    pub hovered: Option<ShapeId>,
    pub preview: Option<&'a DrawingPreview>,
    pub preview_color: RoiColor,
    /// Geometry to draw in place of a shape's own while it is being dragged.
    pub drag_override: Option<(ShapeId, &'a ShapeGeometry)>,
}

impl<'a> Scene<'a> {
    pub fn new(profiles: &'a [Profile]) -> Self {
        Self {
            profiles,
            selected: None,
            hovered: None,
            preview: None,
            preview_color: RoiColor::default(),
            drag_override: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Emphasis {
    Normal,
    Hovered,
    Selected,
}

pub struct Renderer {
    style: RenderStyle,
    base: Option<RgbaImage>,
    scaled: Option<Pixmap>,
    badges: BadgeTable,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new(RenderStyle::default())
    }
}

impl Renderer {
    pub fn new(style: RenderStyle) -> Self {
        Self {
            style,
            base: None,
            scaled: None,
            badges: BadgeTable::default(),
        }
    }

    /// Replaces the base image; it is rescaled on the next render.
    pub fn set_base_image(&mut self, image: RgbaImage) {
        self.base = Some(image);
        self.scaled = None;
    }

    pub fn badges(&self) -> &BadgeTable {
        &self.badges
    }

    /// The shape whose comment badge is under `p`, from the last pass.
    pub fn badge_at(&self, p: PixelPoint) -> Option<ShapeId> {
        self.badges.hit(p)
    }

    /// Redraws the whole frame. Returns `None` when the frame has no area.
    pub fn render(&mut self, frame: &FrameGeometry, scene: &Scene<'_>) -> Option<Pixmap> {
        self.badges.clear();
        if frame.is_empty() {
            return None;
        }
        let (width, height) = frame.pixel_size();
        let mut pixmap = Pixmap::new(width, height)?;

        let (r, g, b) = self.style.background;
        pixmap.fill(Color::from_rgba8(r, g, b, 255));
        if let Some(base) = self.scaled_base(width, height) {
            pixmap.draw_pixmap(
                0,
                0,
                base.as_ref(),
                &PixmapPaint::default(),
                Transform::identity(),
                None,
            );
        }

        for profile in scene.profiles.iter().filter(|p| p.visible) {
            for shape in &profile.shapes {
                let geometry = match scene.drag_override {
                    Some((id, geometry)) if id == shape.id => geometry,
                    _ => &shape.geometry,
                };
                let emphasis = if scene.selected == Some(shape.id) {
                    Emphasis::Selected
                } else if scene.hovered == Some(shape.id) {
                    Emphasis::Hovered
                } else {
                    Emphasis::Normal
                };
                self.draw_shape(&mut pixmap, geometry, shape.color, emphasis, frame);

                if shape.comment().is_some() {
                    let badge = self.draw_badge(&mut pixmap, geometry, shape.color, frame);
                    self.badges.insert(shape.id, badge);
                }
            }
        }

        match scene.preview {
            Some(DrawingPreview::Shape(geometry)) => {
                self.draw_shape(&mut pixmap, geometry, scene.preview_color, Emphasis::Normal, frame);
            }
            Some(DrawingPreview::Polyline { points, cursor }) => {
                self.draw_polyline(&mut pixmap, points, *cursor, scene.preview_color);
            }
            None => {}
        }

        Some(pixmap)
    }

    fn scaled_base(&mut self, width: u32, height: u32) -> Option<&Pixmap> {
        let stale = self
            .scaled
            .as_ref()
            .map_or(true, |p| p.width() != width || p.height() != height);
        if stale {
            self.scaled = self
                .base
                .as_ref()
                .and_then(|base| scale_to_pixmap(base, width, height));
        }
        self.scaled.as_ref()
    }

    fn draw_shape(
        &self,
        pixmap: &mut Pixmap,
        geometry: &ShapeGeometry,
        color: RoiColor,
        emphasis: Emphasis,
        frame: &FrameGeometry,
    ) {
        let style = &self.style;
        let Some(path) = shape_path(geometry, frame) else {
            return;
        };

        let fill_rule = match geometry {
            ShapeGeometry::Polygon(_) => FillRule::EvenOdd,
            _ => FillRule::Winding,
        };
        let closed = !matches!(geometry, ShapeGeometry::Line(_) | ShapeGeometry::Arrow(_));
        if closed {
            let fill = paint(color, style.fill_alpha);
            pixmap.fill_path(&path, &fill, fill_rule, Transform::identity(), None);
        }

        let mut stroke = Stroke {
            width: style.stroke_width,
            line_cap: LineCap::Round,
            line_join: LineJoin::Round,
            ..Default::default()
        };
        match emphasis {
            Emphasis::Selected => {
                stroke.width = style.selected_stroke_width;
                stroke.dash = StrokeDash::new(style.dash_pattern.clone(), 0.0);
            }
            Emphasis::Hovered => stroke.width = style.hover_stroke_width,
            Emphasis::Normal => {}
        }
        let solid = paint(color, 1.0);
        pixmap.stroke_path(&path, &solid, &stroke, Transform::identity(), None);

        if let ShapeGeometry::Arrow(line) = geometry {
            let from = frame.to_pixel(line.start);
            let tip = frame.to_pixel(line.end);
            if from != tip {
                let mut pb = PathBuilder::new();
                for wing in arrow_head(from, tip, style.arrow_head_length as f64) {
                    pb.move_to(tip.x as f32, tip.y as f32);
                    pb.line_to(wing.x as f32, wing.y as f32);
                }
                if let Some(head) = pb.finish() {
                    // heads stay solid even when the shaft is dashed
                    stroke.dash = None;
                    pixmap.stroke_path(&head, &solid, &stroke, Transform::identity(), None);
                }
            }
        }

        if emphasis == Emphasis::Selected {
            self.draw_handles(pixmap, &geometry.handles(frame), color);
        }
    }

    fn draw_handles(&self, pixmap: &mut Pixmap, handles: &[PixelPoint], color: RoiColor) {
        let size = self.style.handle_size;
        let fill = paint(color, 1.0);
        let mut outline = Paint::default();
        outline.set_color(Color::WHITE);
        outline.anti_alias = true;
        let stroke = Stroke {
            width: 1.0,
            ..Default::default()
        };

        for h in handles {
            let Some(rect) = Rect::from_xywh(
                h.x as f32 - size / 2.0,
                h.y as f32 - size / 2.0,
                size,
                size,
            ) else {
                continue;
            };
            let path = PathBuilder::from_rect(rect);
            pixmap.fill_path(&path, &fill, FillRule::Winding, Transform::identity(), None);
            pixmap.stroke_path(&path, &outline, &stroke, Transform::identity(), None);
        }
    }

    fn draw_badge(
        &self,
        pixmap: &mut Pixmap,
        geometry: &ShapeGeometry,
        color: RoiColor,
        frame: &FrameGeometry,
    ) -> Badge {
        let anchor = frame.to_pixel(geometry.anchor());
        let (ox, oy) = self.style.badge_offset;
        let badge = Badge {
            center: PixelPoint::new(anchor.x + ox as f64, anchor.y + oy as f64),
            radius: self.style.badge_radius as f64,
        };

        if let Some(path) = PathBuilder::from_circle(
            badge.center.x as f32,
            badge.center.y as f32,
            badge.radius as f32,
        ) {
            pixmap.fill_path(
                &path,
                &paint(color, 1.0),
                FillRule::Winding,
                Transform::identity(),
                None,
            );
            let mut outline = Paint::default();
            outline.set_color(Color::WHITE);
            outline.anti_alias = true;
            let stroke = Stroke {
                width: 1.5,
                ..Default::default()
            };
            pixmap.stroke_path(&path, &outline, &stroke, Transform::identity(), None);
        }
        badge
    }

    fn draw_polyline(
        &self,
        pixmap: &mut Pixmap,
        points: &[PixelPoint],
        cursor: Option<PixelPoint>,
        color: RoiColor,
    ) {
        let solid = paint(color, 1.0);
        let stroke = Stroke {
            width: self.style.stroke_width,
            line_cap: LineCap::Round,
            line_join: LineJoin::Round,
            ..Default::default()
        };

        if let Some(path) = open_path(points) {
            pixmap.stroke_path(&path, &solid, &stroke, Transform::identity(), None);
        }

        // rubber band from the last vertex to the cursor
        if let (Some(last), Some(cursor)) = (points.last(), cursor) {
            if let Some(band) = open_path(&[*last, cursor]) {
                let dashed = Stroke {
                    dash: StrokeDash::new(self.style.dash_pattern.clone(), 0.0),
                    ..stroke.clone()
                };
                pixmap.stroke_path(&band, &solid, &dashed, Transform::identity(), None);
            }
        }

        let dot = self.style.handle_size / 2.0;
        for p in points {
            if let Some(path) = PathBuilder::from_circle(p.x as f32, p.y as f32, dot / 2.0) {
                pixmap.fill_path(&path, &solid, FillRule::Winding, Transform::identity(), None);
            }
        }
    }
}

fn paint(color: RoiColor, alpha: f32) -> Paint<'static> {
    let (r, g, b) = color.rgb();
    let mut paint = Paint::default();
    paint.set_color(Color::from_rgba8(
        r,
        g,
        b,
        (alpha.clamp(0.0, 1.0) * 255.0).round() as u8,
    ));
    paint.anti_alias = true;
    paint
}

fn open_path(points: &[PixelPoint]) -> Option<Path> {
    let (first, rest) = points.split_first()?;
    let mut pb = PathBuilder::new();
    pb.move_to(first.x as f32, first.y as f32);
    for p in rest {
        pb.line_to(p.x as f32, p.y as f32);
    }
    pb.finish()
}

fn closed_path(points: &[PixelPoint]) -> Option<Path> {
    let (first, rest) = points.split_first()?;
    let mut pb = PathBuilder::new();
    pb.move_to(first.x as f32, first.y as f32);
    for p in rest {
        pb.line_to(p.x as f32, p.y as f32);
    }
    pb.close();
    pb.finish()
}

/// Pixel-space outline of a shape. Degenerate shapes have none.
fn shape_path(geometry: &ShapeGeometry, frame: &FrameGeometry) -> Option<Path> {
    match geometry {
        ShapeGeometry::Rectangle(rect) => {
            let corners: Vec<PixelPoint> =
                rect.corners().iter().map(|c| frame.to_pixel(*c)).collect();
            closed_path(&corners)
        }
        ShapeGeometry::Circle(circle) => {
            let (center, radius) = circle.to_pixels(frame);
            PathBuilder::from_circle(center.x as f32, center.y as f32, radius as f32)
        }
        ShapeGeometry::Polygon(polygon) => closed_path(&polygon.handles(frame)),
        ShapeGeometry::Line(line) | ShapeGeometry::Arrow(line) => {
            open_path(&[frame.to_pixel(line.start), frame.to_pixel(line.end)])
        }
    }
}

fn scale_to_pixmap(image: &RgbaImage, width: u32, height: u32) -> Option<Pixmap> {
    let scaled = if image.dimensions() == (width, height) {
        image.clone()
    } else {
        image::imageops::resize(image, width, height, FilterType::Triangle)
    };
    let mut pixmap = Pixmap::new(width, height)?;
    for (dst, src) in pixmap.pixels_mut().iter_mut().zip(scaled.pixels()) {
        let [r, g, b, a] = src.0;
        *dst = ColorU8::from_rgba(r, g, b, a).premultiply();
    }
    Some(pixmap)
}

/// Converts a rendered pixmap to a straight-alpha RGBA image.
pub fn pixmap_to_image(pixmap: &Pixmap) -> RgbaImage {
    let width = pixmap.width();
    let pixels = pixmap.pixels();
    RgbaImage::from_fn(width, pixmap.height(), |x, y| {
        let c = pixels[(y * width + x) as usize].demultiply();
        image::Rgba([c.red(), c.green(), c.blue(), c.alpha()])
    })
}
