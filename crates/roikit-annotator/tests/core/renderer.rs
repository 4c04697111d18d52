use image::{Rgba, RgbaImage};
use roikit_annotator::{
    pixmap_to_image, DrawingPreview, FrameGeometry, PercentPoint, PixelPoint, Profile,
    RenderStyle, Renderer, RoiLine, RoiRectangle, Scene, Shape, ShapeDraft, ShapeGeometry,
};
use roikit_core::{ProfileScope, RoiColor};

const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);

fn frame() -> FrameGeometry {
    FrameGeometry::new(200.0, 100.0)
}

fn renderer() -> Renderer {
    let mut renderer = Renderer::new(RenderStyle::default());
    renderer.set_base_image(RgbaImage::from_pixel(400, 200, BLACK));
    renderer
}

fn profile(geometries: Vec<ShapeGeometry>) -> Profile {
    let mut profile = Profile::new(ProfileScope::new("obj", "cam"), "p", RoiColor::Red);
    profile.shapes = geometries
        .into_iter()
        .map(|g| Shape::from_draft(ShapeDraft::new(g, RoiColor::Red)))
        .collect();
    profile
}

fn rect() -> ShapeGeometry {
    // pixels (20, 10) - (60, 30) on a 200x100 frame
    ShapeGeometry::Rectangle(RoiRectangle::new(10.0, 10.0, 20.0, 20.0))
}

fn pixel(image: &RgbaImage, x: u32, y: u32) -> [u8; 4] {
    image.get_pixel(x, y).0
}

#[test]
fn test_frame_size_and_base_image() {
    let mut renderer = Renderer::new(RenderStyle::default());
    renderer.set_base_image(RgbaImage::from_pixel(400, 200, Rgba([255, 255, 255, 255])));
    let pixmap = renderer.render(&frame(), &Scene::new(&[])).unwrap();
    let image = pixmap_to_image(&pixmap);

    assert_eq!(image.dimensions(), (200, 100));
    let [r, g, b, a] = pixel(&image, 100, 50);
    assert!(r > 250 && g > 250 && b > 250);
    assert_eq!(a, 255);
}

#[test]
fn test_shape_fill_is_translucent() {
    let profiles = [profile(vec![rect()])];
    let pixmap = renderer().render(&frame(), &Scene::new(&profiles)).unwrap();
    let image = pixmap_to_image(&pixmap);

    // inside: red at low opacity over black
    let [r, g, _, _] = pixel(&image, 40, 20);
    assert!(r > 30 && r < 100, "r = {}", r);
    assert!(g < 30);

    // outside is untouched
    assert_eq!(pixel(&image, 150, 80), [0, 0, 0, 255]);
}

#[test]
fn test_hidden_profile_is_not_drawn() {
    let mut hidden = profile(vec![rect()]);
    hidden.visible = false;
    let profiles = [hidden];
    let pixmap = renderer().render(&frame(), &Scene::new(&profiles)).unwrap();
    let image = pixmap_to_image(&pixmap);
    assert_eq!(pixel(&image, 40, 20), [0, 0, 0, 255]);
    assert_eq!(pixel(&image, 20, 20), [0, 0, 0, 255]);
}

#[test]
fn test_selected_shape_gets_handles() {
    let profiles = [profile(vec![rect()])];
    let mut scene = Scene::new(&profiles);
    scene.selected = Some(profiles[0].shapes[0].id);
    let pixmap = renderer().render(&frame(), &scene).unwrap();
    let image = pixmap_to_image(&pixmap);

    // handle centered on the top-left corner is opaque shape color
    let [r, g, _, _] = pixel(&image, 20, 10);
    assert!(r > 200 && g < 120, "{:?}", pixel(&image, 20, 10));
}

#[test]
fn test_comment_badge_goes_into_side_table() {
    let mut with_comment = profile(vec![rect(), rect()]);
    with_comment.shapes[0].comment = Some("rust on flange".to_string());
    let commented = with_comment.shapes[0].id;
    let profiles = [with_comment];

    let mut renderer = renderer();
    renderer.render(&frame(), &Scene::new(&profiles)).unwrap();

    assert_eq!(renderer.badges().len(), 1);
    let badge = *renderer.badges().get(commented).unwrap();
    // first anchor (20, 10) plus the default (12, -12) offset
    assert_eq!(badge.center, PixelPoint::new(32.0, -2.0));
    assert_eq!(badge.radius, 8.0);
    assert_eq!(renderer.badge_at(PixelPoint::new(34.0, 0.0)), Some(commented));
    assert_eq!(renderer.badge_at(PixelPoint::new(100.0, 50.0)), None);
}

#[test]
fn test_badge_table_is_rebuilt_each_pass() {
    let mut p = profile(vec![rect()]);
    p.shapes[0].comment = Some("note".to_string());
    let mut renderer = renderer();
    renderer
        .render(&frame(), &Scene::new(std::slice::from_ref(&p)))
        .unwrap();
    assert_eq!(renderer.badges().len(), 1);

    p.shapes[0].comment = None;
    renderer
        .render(&frame(), &Scene::new(std::slice::from_ref(&p)))
        .unwrap();
    assert!(renderer.badges().is_empty());
}

#[test]
fn test_drag_override_replaces_geometry() {
    let profiles = [profile(vec![rect()])];
    let moved = ShapeGeometry::Rectangle(RoiRectangle::new(60.0, 60.0, 20.0, 20.0));
    let mut scene = Scene::new(&profiles);
    scene.drag_override = Some((profiles[0].shapes[0].id, &moved));
    let pixmap = renderer().render(&frame(), &scene).unwrap();
    let image = pixmap_to_image(&pixmap);

    assert_eq!(pixel(&image, 40, 20), [0, 0, 0, 255]);
    assert!(pixel(&image, 140, 70)[0] > 30);
}

#[test]
fn test_preview_is_drawn() {
    let preview = DrawingPreview::Shape(ShapeGeometry::Line(RoiLine::new(
        PercentPoint::new(0.0, 50.0),
        PercentPoint::new(100.0, 50.0),
    )));
    let mut scene = Scene::new(&[]);
    scene.preview = Some(&preview);
    scene.preview_color = RoiColor::Green;
    let pixmap = renderer().render(&frame(), &scene).unwrap();
    let image = pixmap_to_image(&pixmap);

    let [r, g, _, _] = pixel(&image, 100, 50);
    assert!(g > 100 && r < 100, "{:?}", pixel(&image, 100, 50));
}

#[test]
fn test_polygon_preview_draws_rubber_band() {
    let preview = DrawingPreview::Polyline {
        points: vec![PixelPoint::new(20.0, 20.0), PixelPoint::new(100.0, 20.0)],
        cursor: Some(PixelPoint::new(100.0, 80.0)),
    };
    let mut scene = Scene::new(&[]);
    scene.preview = Some(&preview);
    let pixmap = renderer().render(&frame(), &scene).unwrap();
    let image = pixmap_to_image(&pixmap);

    assert!(pixel(&image, 60, 20)[0] > 100);
}
