use roikit_annotator::serialization::DOCUMENT_VERSION;
use roikit_annotator::{
    PercentPoint, Profile, ProfileDocument, RoiLine, RoiPolygon, RoiShape, Shape, ShapeDraft,
    ShapeGeometry, ShapeRecord, ShapeType,
};
use roikit_core::{ProfileScope, RoiColor};
use tempfile::TempDir;

fn sample_profile() -> Profile {
    let mut profile = Profile::new(
        ProfileScope::new("objective-7", "camera-2"),
        "Leaks",
        RoiColor::Blue,
    );
    let polygon = ShapeGeometry::Polygon(RoiPolygon::new(vec![
        PercentPoint::new(10.0, 10.0),
        PercentPoint::new(40.0, 15.0),
        PercentPoint::new(25.0, 45.0),
    ]));
    let arrow = ShapeGeometry::Arrow(RoiLine::new(
        PercentPoint::new(80.0, 80.0),
        PercentPoint::new(60.0, 55.5),
    ));
    profile
        .shapes
        .push(Shape::from_draft(ShapeDraft::new(polygon, RoiColor::Blue)));
    profile.shapes.push(Shape::from_draft(
        ShapeDraft::new(arrow, RoiColor::Blue).with_comment("drip here"),
    ));
    profile
}

#[test]
fn test_document_file_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("profiles.json");

    let doc = ProfileDocument::new(vec![sample_profile()]);
    doc.save_to_file(&path).unwrap();
    let loaded = ProfileDocument::load_from_file(&path).unwrap();

    assert_eq!(loaded.version, DOCUMENT_VERSION);
    assert_eq!(loaded, doc);
}

#[test]
fn test_profile_json_layout() {
    let profile = sample_profile();
    let value = serde_json::to_value(&profile).unwrap();

    assert_eq!(value["objectiveId"], "objective-7");
    assert_eq!(value["cameraId"], "camera-2");
    assert_eq!(value["color"], "#3b82f6");
    assert_eq!(value["shapes"][0]["type"], "polygon");
    assert_eq!(
        value["shapes"][0]["coordinates"].as_array().unwrap().len(),
        6
    );
    assert_eq!(value["shapes"][1]["type"], "arrow");
    assert_eq!(value["shapes"][1]["comment"], "drip here");
}

#[test]
fn test_visibility_defaults_to_visible() {
    let mut value = serde_json::to_value(sample_profile()).unwrap();
    value.as_object_mut().unwrap().remove("visible");
    let profile: Profile = serde_json::from_value(value).unwrap();
    assert!(profile.visible);
}

#[test]
fn test_record_conversion_keeps_fields() {
    let profile = sample_profile();
    let shape = profile.shapes[1].clone();
    let record = ShapeRecord::from(shape.clone());

    assert_eq!(record.shape_type, "arrow");
    assert_eq!(record.coordinates, vec![80.0, 80.0, 60.0, 55.5]);
    assert_eq!(record.comment.as_deref(), Some("drip here"));

    let back = Shape::try_from(record).unwrap();
    assert_eq!(back, shape);
    assert_eq!(back.shape_type(), ShapeType::Arrow);
}

#[test]
fn test_record_with_short_polygon_is_rejected() {
    let mut record = ShapeRecord::from(sample_profile().shapes[0].clone());
    record.coordinates.truncate(4);
    assert!(Shape::try_from(record).is_err());
}

#[test]
fn test_odd_coordinate_count_is_rejected() {
    let mut record = ShapeRecord::from(sample_profile().shapes[0].clone());
    record.coordinates.pop();
    assert!(Shape::try_from(record).is_err());
}

#[test]
fn test_missing_file_reports_path() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("missing.json");
    let err = ProfileDocument::load_from_file(&path).unwrap_err();
    assert!(format!("{:#}", err).contains("missing.json"));
}

#[test]
fn test_loaded_shapes_are_valid() {
    let json = ProfileDocument::new(vec![sample_profile()])
        .to_json()
        .unwrap();
    let doc = ProfileDocument::from_json(&json).unwrap();
    for shape in doc.profiles.iter().flat_map(|p| p.shapes.iter()) {
        assert!(shape.geometry.validate().is_ok());
    }
}
