use roikit_annotator::{
    DrawingMachine, DrawingPreview, DrawingState, FrameGeometry, PixelPoint, PointerOutcome,
    RoiShape, ShapeGeometry, ShapeType, Tool,
};
use roikit_core::ShapeError;

fn armed(tool: Tool) -> DrawingMachine {
    let mut machine = DrawingMachine::default();
    machine.set_profile_active(true);
    machine.set_tool(tool);
    machine
}

fn assert_coords(geometry: &ShapeGeometry, expected: &[f64]) {
    let coords = geometry.coordinates();
    assert_eq!(coords.len(), expected.len(), "{:?}", coords);
    for (a, b) in coords.iter().zip(expected) {
        assert!((a - b).abs() < 1e-9, "{:?} != {:?}", coords, expected);
    }
}

fn finalized(outcome: PointerOutcome) -> ShapeGeometry {
    match outcome {
        PointerOutcome::Finalized(geometry) => geometry,
        other => panic!("expected a finalized shape, got {:?}", other),
    }
}

#[test]
fn test_rectangle_drag_finalizes_in_percent() {
    let frame = FrameGeometry::new(200.0, 100.0);
    let mut machine = armed(Tool::Rectangle);

    assert_eq!(
        machine.pointer_down(PixelPoint::new(60.0, 30.0), &frame),
        Ok(PointerOutcome::Started)
    );
    assert!(machine.pointer_move(PixelPoint::new(40.0, 20.0)));
    let geometry = finalized(
        machine
            .pointer_up(PixelPoint::new(20.0, 10.0), &frame)
            .unwrap(),
    );

    assert_eq!(geometry.shape_type(), ShapeType::Rectangle);
    assert_coords(&geometry, &[10.0, 10.0, 20.0, 20.0]);
    assert_eq!(machine.state(), &DrawingState::Armed(Tool::Rectangle));
}

#[test]
fn test_arrow_and_line_keep_direction() {
    let frame = FrameGeometry::new(100.0, 100.0);
    for (tool, shape_type) in [(Tool::Line, ShapeType::Line), (Tool::Arrow, ShapeType::Arrow)] {
        let mut machine = armed(tool);
        machine
            .pointer_down(PixelPoint::new(80.0, 10.0), &frame)
            .unwrap();
        let geometry = finalized(
            machine
                .pointer_up(PixelPoint::new(20.0, 60.0), &frame)
                .unwrap(),
        );
        assert_eq!(geometry.shape_type(), shape_type);
        assert_coords(&geometry, &[80.0, 10.0, 20.0, 60.0]);
    }
}

#[test]
fn test_zero_length_drag_still_finalizes() {
    let frame = FrameGeometry::new(100.0, 100.0);
    let mut machine = armed(Tool::Circle);
    machine
        .pointer_down(PixelPoint::new(50.0, 50.0), &frame)
        .unwrap();
    let geometry = finalized(
        machine
            .pointer_up(PixelPoint::new(50.0, 50.0), &frame)
            .unwrap(),
    );
    assert!(geometry.is_degenerate());
}

#[test]
fn test_release_outside_frame_is_rejected() {
    let frame = FrameGeometry::new(200.0, 100.0);
    let mut machine = armed(Tool::Line);
    machine
        .pointer_down(PixelPoint::new(100.0, 50.0), &frame)
        .unwrap();
    let err = machine
        .pointer_up(PixelPoint::new(250.0, 50.0), &frame)
        .unwrap_err();
    assert!(matches!(err, ShapeError::CoordinateOutOfRange { .. }));
    assert_eq!(machine.state(), &DrawingState::Armed(Tool::Line));
}

#[test]
fn test_polygon_closes_near_first_point() {
    let frame = FrameGeometry::new(100.0, 100.0);
    let mut machine = armed(Tool::Polygon);

    for p in [(0.0, 0.0), (10.0, 0.0), (5.0, 10.0)] {
        assert_eq!(
            machine.pointer_down(PixelPoint::new(p.0, p.1), &frame),
            Ok(PointerOutcome::PointAdded)
        );
    }
    // within 10px of (0, 0); the closing click is not a vertex
    let geometry = finalized(
        machine
            .pointer_down(PixelPoint::new(3.0, 4.0), &frame)
            .unwrap(),
    );
    assert_eq!(geometry.shape_type(), ShapeType::Polygon);
    assert_coords(&geometry, &[0.0, 0.0, 10.0, 0.0, 5.0, 10.0]);
    assert_eq!(machine.state(), &DrawingState::Armed(Tool::Polygon));
}

#[test]
fn test_polygon_near_first_point_with_two_points_keeps_accumulating() {
    let frame = FrameGeometry::new(100.0, 100.0);
    let mut machine = armed(Tool::Polygon);
    machine
        .pointer_down(PixelPoint::new(0.0, 0.0), &frame)
        .unwrap();
    assert_eq!(
        machine.pointer_down(PixelPoint::new(5.0, 0.0), &frame),
        Ok(PointerOutcome::PointAdded)
    );
    match machine.state() {
        DrawingState::PolygonAccumulating { points, .. } => assert_eq!(points.len(), 2),
        other => panic!("unexpected state {:?}", other),
    }
}

#[test]
fn test_polygon_with_too_few_points_is_refused() {
    let frame = FrameGeometry::new(100.0, 100.0);
    let mut machine = armed(Tool::Polygon);
    machine
        .pointer_down(PixelPoint::new(0.0, 0.0), &frame)
        .unwrap();
    machine
        .pointer_down(PixelPoint::new(40.0, 0.0), &frame)
        .unwrap();

    assert_eq!(
        machine.finish_polygon(&frame),
        Err(ShapeError::TooFewPoints {
            required: 3,
            actual: 2
        })
    );

    // switching tools silently drops the short polygon
    machine.set_tool(Tool::Rectangle);
    assert!(!machine.is_drawing());
    assert_eq!(machine.state(), &DrawingState::Armed(Tool::Rectangle));
}

#[test]
fn test_profile_switch_cancels_drag() {
    let frame = FrameGeometry::new(100.0, 100.0);
    let mut machine = armed(Tool::Rectangle);
    machine
        .pointer_down(PixelPoint::new(10.0, 10.0), &frame)
        .unwrap();
    assert!(machine.is_drawing());

    machine.set_profile_active(true);
    assert!(!machine.is_drawing());
    assert_eq!(
        machine.pointer_up(PixelPoint::new(50.0, 50.0), &frame),
        Ok(PointerOutcome::Ignored)
    );
}

#[test]
fn test_no_active_profile_leaves_machine_idle() {
    let frame = FrameGeometry::new(100.0, 100.0);
    let mut machine = DrawingMachine::default();
    machine.set_tool(Tool::Polygon);
    assert_eq!(
        machine.pointer_down(PixelPoint::new(10.0, 10.0), &frame),
        Ok(PointerOutcome::Ignored)
    );
    assert_eq!(machine.state(), &DrawingState::Idle);
}

#[test]
fn test_select_tool_defers_to_hit_testing() {
    let frame = FrameGeometry::new(100.0, 100.0);
    let mut machine = DrawingMachine::default();
    machine.set_tool(Tool::Select);
    let p = PixelPoint::new(12.0, 34.0);
    assert_eq!(machine.pointer_down(p, &frame), Ok(PointerOutcome::Select(p)));
}

#[test]
fn test_preview_follows_cursor() {
    let frame = FrameGeometry::new(100.0, 100.0);
    let mut machine = armed(Tool::Rectangle);
    assert!(machine.preview(&frame).is_none());

    machine
        .pointer_down(PixelPoint::new(10.0, 10.0), &frame)
        .unwrap();
    machine.pointer_move(PixelPoint::new(30.0, 20.0));
    match machine.preview(&frame) {
        Some(DrawingPreview::Shape(geometry)) => {
            assert_coords(&geometry, &[10.0, 10.0, 20.0, 10.0])
        }
        other => panic!("unexpected preview {:?}", other),
    }

    let mut machine = armed(Tool::Polygon);
    machine
        .pointer_down(PixelPoint::new(10.0, 10.0), &frame)
        .unwrap();
    machine.pointer_move(PixelPoint::new(40.0, 40.0));
    assert_eq!(
        machine.preview(&frame),
        Some(DrawingPreview::Polyline {
            points: vec![PixelPoint::new(10.0, 10.0)],
            cursor: Some(PixelPoint::new(40.0, 40.0)),
        })
    );
}
