use std::sync::Arc;

use image::{Rgba, RgbaImage};
use roikit_annotator::{
    AnnotationSurface, InMemoryProfileStore, PixelPoint, RoiShape, ShapeType, SurfaceEvent, Tool,
};
use roikit_core::{Error, ProfileError, ProfileScope, ShapeId};
use roikit_settings::Config;
use tokio::sync::broadcast::Receiver;

fn config() -> Config {
    let mut config = Config::default();
    config.render.container_width = 200.0;
    config.render.max_height = 100.0;
    config
}

/// A surface over an empty store with a 200x100 frame and no profiles.
async fn surface() -> (Arc<InMemoryProfileStore>, AnnotationSurface) {
    let store = Arc::new(InMemoryProfileStore::new());
    let mut surface = AnnotationSurface::open(
        store.clone(),
        ProfileScope::new("objective-1", "camera-1"),
        &config(),
    )
    .await
    .unwrap();
    surface.load_image(RgbaImage::from_pixel(400, 200, Rgba([0, 0, 0, 255])));
    (store, surface)
}

fn drain(rx: &mut Receiver<SurfaceEvent>) -> Vec<SurfaceEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

fn drag(surface: &mut AnnotationSurface, from: (f64, f64), to: (f64, f64)) {
    surface
        .pointer_down(PixelPoint::new(from.0, from.1))
        .unwrap();
    surface.pointer_move(PixelPoint::new(to.0, to.1));
    surface.pointer_up(PixelPoint::new(to.0, to.1)).unwrap();
}

/// Draws the rectangle covering pixels (20, 10) - (60, 30) and returns its id.
fn draw_rect(surface: &mut AnnotationSurface) -> ShapeId {
    surface.set_tool(Tool::Rectangle);
    drag(surface, (20.0, 10.0), (60.0, 30.0));
    let profile_id = surface.active_profile().unwrap();
    let profile = surface.session().profile(profile_id).unwrap();
    profile.shapes.last().unwrap().id
}

#[tokio::test]
async fn test_frame_fits_loaded_image() {
    let (_, surface) = surface().await;
    assert_eq!(surface.frame().width(), 200.0);
    assert_eq!(surface.frame().height(), 100.0);
    assert_eq!(surface.image().unwrap().dimensions(), (200, 100));
}

#[tokio::test]
async fn test_drawing_records_pending_add() {
    let (store, mut surface) = surface().await;
    let mut rx = surface.subscribe();
    surface.create_profile("Valves").await.unwrap();

    let id = draw_rect(&mut surface);
    assert_eq!(surface.pending_count(), 1);
    let (_, shape) = surface.session().find_shape(id).unwrap();
    assert_eq!(shape.shape_type(), ShapeType::Rectangle);
    assert_eq!(shape.geometry.coordinates(), vec![10.0, 10.0, 20.0, 20.0]);
    assert!(store.snapshot()[0].shapes.is_empty());

    let events = drain(&mut rx);
    assert!(matches!(events[0], SurfaceEvent::DrawingComplete(_)));
    assert!(matches!(events[1], SurfaceEvent::PendingChanges { count: 1 }));
}

#[tokio::test]
async fn test_click_without_drag_is_discarded() {
    let (_, mut surface) = surface().await;
    surface.create_profile("Valves").await.unwrap();
    surface.set_tool(Tool::Circle);
    let mut rx = surface.subscribe();

    drag(&mut surface, (50.0, 50.0), (50.0, 50.0));
    assert!(!surface.has_pending_changes());
    assert!(drain(&mut rx).is_empty());
}

#[tokio::test]
async fn test_drawing_needs_active_profile() {
    let (_, mut surface) = surface().await;
    surface.create_profile("Valves").await.unwrap();
    surface.set_active_profile(None).unwrap();
    surface.set_tool(Tool::Rectangle);

    drag(&mut surface, (20.0, 10.0), (60.0, 30.0));
    assert!(!surface.has_pending_changes());

    let err = surface.undo_last().unwrap_err();
    assert!(matches!(err, Error::Profile(ProfileError::NoActiveProfile)));
}

#[tokio::test]
async fn test_polygon_through_surface() {
    let (_, mut surface) = surface().await;
    let profile_id = surface.create_profile("Valves").await.unwrap();
    surface.set_tool(Tool::Polygon);

    for (x, y) in [(20.0, 20.0), (100.0, 20.0), (60.0, 80.0)] {
        surface.pointer_down(PixelPoint::new(x, y)).unwrap();
    }
    assert!(surface.machine().is_drawing());
    surface.finish_polygon().unwrap();

    let shapes = &surface.session().profile(profile_id).unwrap().shapes;
    assert_eq!(shapes.len(), 1);
    assert_eq!(shapes[0].shape_type(), ShapeType::Polygon);
    assert!(!surface.machine().is_drawing());
}

#[tokio::test]
async fn test_select_publishes_selection_and_click() {
    let (_, mut surface) = surface().await;
    let profile_id = surface.create_profile("Valves").await.unwrap();
    let id = draw_rect(&mut surface);
    surface.set_tool(Tool::Select);
    let mut rx = surface.subscribe();

    surface.pointer_down(PixelPoint::new(40.0, 20.0)).unwrap();
    surface.pointer_up(PixelPoint::new(40.0, 20.0)).unwrap();

    assert_eq!(surface.selection().unwrap().shape_id, id);
    let events = drain(&mut rx);
    assert_eq!(events.len(), 2);
    match &events[0] {
        SurfaceEvent::DrawingSelect { shape, profile_id: p } => {
            assert_eq!(*shape, Some(id));
            assert_eq!(*p, Some(profile_id));
        }
        other => panic!("unexpected event {:?}", other),
    }
    assert!(matches!(
        events[1],
        SurfaceEvent::CanvasClick { shape_id, .. } if shape_id == id
    ));
    // a click without movement records nothing
    assert_eq!(surface.pending_count(), 1);

    surface.pointer_down(PixelPoint::new(150.0, 80.0)).unwrap();
    assert!(surface.selection().is_none());
    let events = drain(&mut rx);
    assert!(matches!(
        events[..],
        [SurfaceEvent::DrawingSelect { shape: None, .. }]
    ));
}

#[tokio::test]
async fn test_drag_moves_selected_shape() {
    let (_, mut surface) = surface().await;
    surface.create_profile("Valves").await.unwrap();
    let id = draw_rect(&mut surface);
    surface.set_tool(Tool::Select);

    // 20px right, 20px down on a 200x100 frame
    drag(&mut surface, (40.0, 20.0), (60.0, 40.0));
    assert_eq!(surface.pending_count(), 2);
    let (_, shape) = surface.session().find_shape(id).unwrap();
    assert_eq!(shape.geometry.coordinates(), vec![20.0, 30.0, 20.0, 20.0]);
}

#[tokio::test]
async fn test_drag_is_clamped_to_frame() {
    let (_, mut surface) = surface().await;
    surface.create_profile("Valves").await.unwrap();
    let id = draw_rect(&mut surface);
    surface.set_tool(Tool::Select);

    drag(&mut surface, (40.0, 20.0), (190.0, -50.0));
    let (_, shape) = surface.session().find_shape(id).unwrap();
    assert_eq!(shape.geometry.coordinates(), vec![80.0, 0.0, 20.0, 20.0]);
    assert!(shape.geometry.validate().is_ok());
}

#[tokio::test]
async fn test_badge_hover_reports_comment_without_selecting() {
    let (_, mut surface) = surface().await;
    surface.create_profile("Valves").await.unwrap();
    let id = draw_rect(&mut surface);
    surface.set_tool(Tool::Select);
    surface.pointer_down(PixelPoint::new(40.0, 20.0)).unwrap();
    surface.pointer_up(PixelPoint::new(40.0, 20.0)).unwrap();
    assert!(surface
        .set_selected_comment(Some("weeping joint".into()))
        .unwrap());
    surface.pointer_down(PixelPoint::new(150.0, 80.0)).unwrap();
    surface.pointer_up(PixelPoint::new(150.0, 80.0)).unwrap();
    let mut rx = surface.subscribe();

    // badge sits 12px right of and 12px above the top-left corner
    assert_eq!(surface.badge_at(PixelPoint::new(32.0, 2.0)), Some(id));
    surface.pointer_move(PixelPoint::new(32.0, 2.0));
    let events = drain(&mut rx);
    assert_eq!(events.len(), 1);
    match &events[0] {
        SurfaceEvent::CommentHover(Some((shape_id, text))) => {
            assert_eq!(*shape_id, id);
            assert_eq!(text, "weeping joint");
        }
        other => panic!("unexpected event {:?}", other),
    }
    assert!(surface.selection().is_none());

    surface.pointer_move(PixelPoint::new(150.0, 80.0));
    assert!(matches!(
        drain(&mut rx)[..],
        [SurfaceEvent::CommentHover(None)]
    ));
}

#[tokio::test]
async fn test_hover_highlight_only_in_select_mode() {
    let (_, mut surface) = surface().await;
    surface.create_profile("Valves").await.unwrap();
    let id = draw_rect(&mut surface);

    surface.pointer_move(PixelPoint::new(40.0, 20.0));
    assert!(surface.hovered().is_none());

    surface.set_tool(Tool::Select);
    surface.pointer_move(PixelPoint::new(40.0, 20.0));
    assert_eq!(surface.hovered(), Some(id));
}

#[tokio::test]
async fn test_delete_and_comment_on_selection() {
    let (_, mut surface) = surface().await;
    surface.create_profile("Valves").await.unwrap();
    assert!(!surface.delete_selected().unwrap());

    let id = draw_rect(&mut surface);
    surface.set_tool(Tool::Select);
    surface.pointer_down(PixelPoint::new(40.0, 20.0)).unwrap();
    surface.pointer_up(PixelPoint::new(40.0, 20.0)).unwrap();

    assert!(surface.set_selected_comment(Some("  ".into())).unwrap());
    let (_, shape) = surface.session().find_shape(id).unwrap();
    assert_eq!(shape.comment(), None);

    assert!(surface.delete_selected().unwrap());
    assert!(surface.session().find_shape(id).is_none());
    assert!(surface.selection().is_none());
    // deleting an unsaved shape leaves nothing to save
    assert!(!surface.has_pending_changes());
}

#[tokio::test]
async fn test_undo_save_and_discard() {
    let (store, mut surface) = surface().await;
    let profile_id = surface.create_profile("Valves").await.unwrap();
    draw_rect(&mut surface);
    let second = draw_rect(&mut surface);

    assert_eq!(surface.undo_last().unwrap(), Some(second));
    assert_eq!(surface.pending_count(), 1);

    surface.save().await.unwrap();
    assert!(!surface.has_pending_changes());
    assert_eq!(store.snapshot()[0].shapes.len(), 1);

    draw_rect(&mut surface);
    surface.discard().await.unwrap();
    assert!(!surface.has_pending_changes());
    assert_eq!(
        surface.session().profile(profile_id).unwrap().shapes.len(),
        1
    );
}

#[tokio::test]
async fn test_hidden_profile_cannot_be_selected() {
    let (_, mut surface) = surface().await;
    let profile_id = surface.create_profile("Valves").await.unwrap();
    draw_rect(&mut surface);
    surface.set_tool(Tool::Select);
    surface.pointer_down(PixelPoint::new(40.0, 20.0)).unwrap();
    surface.pointer_up(PixelPoint::new(40.0, 20.0)).unwrap();
    assert!(surface.selection().is_some());

    assert!(!surface.toggle_visibility(profile_id).unwrap());
    assert!(surface.selection().is_none());

    surface.pointer_down(PixelPoint::new(40.0, 20.0)).unwrap();
    assert!(surface.selection().is_none());
}

#[tokio::test]
async fn test_deleting_active_profile_disarms_tools() {
    let (_, mut surface) = surface().await;
    let profile_id = surface.create_profile("Valves").await.unwrap();
    surface.set_tool(Tool::Rectangle);
    surface.delete_profile(profile_id).await.unwrap();

    assert!(surface.active_profile().is_none());
    drag(&mut surface, (20.0, 10.0), (60.0, 30.0));
    assert!(!surface.has_pending_changes());
}

#[tokio::test]
async fn test_resize_cancels_in_progress_drawing() {
    let (_, mut surface) = surface().await;
    surface.create_profile("Valves").await.unwrap();
    surface.set_tool(Tool::Rectangle);
    surface.pointer_down(PixelPoint::new(20.0, 10.0)).unwrap();
    assert!(surface.machine().is_drawing());

    surface.resize(100.0, 100.0);
    assert!(!surface.machine().is_drawing());
    assert_eq!(surface.frame().width(), 100.0);
    assert_eq!(surface.frame().height(), 50.0);
}
