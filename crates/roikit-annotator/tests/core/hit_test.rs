use roikit_annotator::{
    FrameGeometry, HitTester, PercentPoint, PixelPoint, Profile, RoiCircle, RoiLine, RoiPolygon,
    RoiRectangle, Shape, ShapeDraft, ShapeGeometry,
};
use roikit_core::{ProfileScope, RoiColor, ShapeId};

fn profile_with(name: &str, geometries: Vec<ShapeGeometry>) -> Profile {
    let mut profile = Profile::new(ProfileScope::new("obj", "cam"), name, RoiColor::Red);
    profile.shapes = geometries
        .into_iter()
        .map(|g| Shape::from_draft(ShapeDraft::new(g, RoiColor::Red)))
        .collect();
    profile
}

fn rect(x: f64, y: f64, w: f64, h: f64) -> ShapeGeometry {
    ShapeGeometry::Rectangle(RoiRectangle::new(x, y, w, h))
}

fn shape_id(profile: &Profile, index: usize) -> ShapeId {
    profile.shapes[index].id
}

#[test]
fn test_rectangle_hit_and_miss() {
    let frame = FrameGeometry::new(200.0, 100.0);
    let profile = profile_with("p", vec![rect(10.0, 10.0, 20.0, 20.0)]);
    let tester = HitTester::default();
    let profiles = [profile];

    let hit = tester
        .hit_test(PixelPoint::new(25.0, 25.0), &profiles, &frame)
        .unwrap();
    assert_eq!(hit.shape_id, shape_id(&profiles[0], 0));
    assert_eq!(hit.profile_id, profiles[0].id);

    assert!(tester
        .hit_test(PixelPoint::new(1.0, 1.0), &profiles, &frame)
        .is_none());
}

#[test]
fn test_later_shape_wins_when_overlapping() {
    let frame = FrameGeometry::new(100.0, 100.0);
    let profile = profile_with(
        "p",
        vec![rect(10.0, 10.0, 50.0, 50.0), rect(30.0, 30.0, 50.0, 50.0)],
    );
    let profiles = [profile];
    let hit = HitTester::default()
        .hit_test(PixelPoint::new(40.0, 40.0), &profiles, &frame)
        .unwrap();
    assert_eq!(hit.shape_id, shape_id(&profiles[0], 1));
}

#[test]
fn test_later_profile_wins_across_profiles() {
    let frame = FrameGeometry::new(100.0, 100.0);
    let below = profile_with("below", vec![rect(0.0, 0.0, 100.0, 100.0)]);
    let above = profile_with("above", vec![rect(40.0, 40.0, 20.0, 20.0)]);
    let profiles = [below, above];

    let hit = HitTester::default()
        .hit_test(PixelPoint::new(50.0, 50.0), &profiles, &frame)
        .unwrap();
    assert_eq!(hit.profile_id, profiles[1].id);

    let hit = HitTester::default()
        .hit_test(PixelPoint::new(10.0, 10.0), &profiles, &frame)
        .unwrap();
    assert_eq!(hit.profile_id, profiles[0].id);
}

#[test]
fn test_hidden_profiles_are_skipped() {
    let frame = FrameGeometry::new(100.0, 100.0);
    let below = profile_with("below", vec![rect(0.0, 0.0, 100.0, 100.0)]);
    let mut above = profile_with("above", vec![rect(40.0, 40.0, 20.0, 20.0)]);
    above.visible = false;
    let profiles = [below, above];

    let hit = HitTester::default()
        .hit_test(PixelPoint::new(50.0, 50.0), &profiles, &frame)
        .unwrap();
    assert_eq!(hit.profile_id, profiles[0].id);

    let mut hidden = profiles.clone();
    hidden[0].visible = false;
    assert!(HitTester::default()
        .hit_test(PixelPoint::new(50.0, 50.0), &hidden, &frame)
        .is_none());
}

#[test]
fn test_circle_distance_predicate() {
    let frame = FrameGeometry::new(200.0, 100.0);
    // center (100, 50), radius 10% of 100px = 10px
    let circle = ShapeGeometry::Circle(RoiCircle::new(PercentPoint::new(50.0, 50.0), 10.0));
    let profiles = [profile_with("p", vec![circle])];
    let tester = HitTester::default();

    assert!(tester
        .hit_test(PixelPoint::new(108.0, 50.0), &profiles, &frame)
        .is_some());
    assert!(tester
        .hit_test(PixelPoint::new(111.0, 50.0), &profiles, &frame)
        .is_none());
}

#[test]
fn test_line_and_arrow_use_tolerance() {
    let frame = FrameGeometry::new(100.0, 100.0);
    let line = ShapeGeometry::Line(RoiLine::new(
        PercentPoint::new(10.0, 20.0),
        PercentPoint::new(90.0, 20.0),
    ));
    let arrow = ShapeGeometry::Arrow(RoiLine::new(
        PercentPoint::new(10.0, 80.0),
        PercentPoint::new(90.0, 80.0),
    ));
    let profiles = [profile_with("p", vec![line, arrow])];
    let tester = HitTester::default();

    assert!(tester
        .hit_test(PixelPoint::new(50.0, 24.0), &profiles, &frame)
        .is_some());
    assert!(tester
        .hit_test(PixelPoint::new(50.0, 26.0), &profiles, &frame)
        .is_none());
    // past the end point the projection is clamped
    assert!(tester
        .hit_test(PixelPoint::new(94.0, 80.0), &profiles, &frame)
        .is_some());
    assert!(tester
        .hit_test(PixelPoint::new(96.0, 80.0), &profiles, &frame)
        .is_none());

    let strict = HitTester::new(1.0);
    assert!(strict
        .hit_test(PixelPoint::new(50.0, 24.0), &profiles, &frame)
        .is_none());
}

#[test]
fn test_polygon_even_odd() {
    let frame = FrameGeometry::new(100.0, 100.0);
    // a bow-tie: the left and right lobes are inside, the top notch is not
    let polygon = ShapeGeometry::Polygon(RoiPolygon::new(vec![
        PercentPoint::new(10.0, 10.0),
        PercentPoint::new(90.0, 90.0),
        PercentPoint::new(90.0, 10.0),
        PercentPoint::new(10.0, 90.0),
    ]));
    let profiles = [profile_with("p", vec![polygon])];
    let tester = HitTester::default();

    assert!(tester
        .hit_test(PixelPoint::new(20.0, 50.0), &profiles, &frame)
        .is_some());
    assert!(tester
        .hit_test(PixelPoint::new(50.0, 20.0), &profiles, &frame)
        .is_none());
}
