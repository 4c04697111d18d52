//! The annotation surface.
//!
//! [`AnnotationSurface`] is the single-threaded facade a host drives with
//! pointer events. It owns the frame geometry, base image, drawing machine,
//! hit tester, renderer, selection and hover state, and the edit session, and
//! re-renders the whole frame after every change.
//!
//! # Pointer routing
//!
//! - Drawing tools feed the [`DrawingMachine`]; a finalized shape is recorded
//!   in the active profile as a pending add.
//! - The select tool hit tests on pointer-down, publishes the outcome and
//!   starts a move drag for the hit shape. Releasing a moved shape records one
//!   update with the translated geometry.
//! - Without an in-progress gesture, pointer-move tracks the hovered shape and
//!   the comment badge under the pointer.

use std::sync::Arc;

use image::RgbaImage;
use tiny_skia::Pixmap;

use roikit_core::{ProfileError, ProfileId, ProfileScope, Result, RoiColor, ShapeId};
use roikit_settings::{Config, DrawingSettings, RenderSettings};

use crate::drawing::{DrawingMachine, PointerOutcome, Tool};
use crate::events::{EventDispatcher, SurfaceEvent};
use crate::frame::FrameGeometry;
use crate::hit_test::{Hit, HitTester};
use crate::model::{PixelPoint, Profile, RoiShape, ShapeDraft, ShapeGeometry, ShapePatch};
use crate::renderer::{pixmap_to_image, RenderStyle, Renderer, Scene};
use crate::session::EditSession;
use crate::store::ProfileStore;

/// A select-mode drag of one shape.
#[derive(Debug, Clone)]
struct MoveDrag {
    hit: Hit,
    origin: PixelPoint,
    original: ShapeGeometry,
    current: ShapeGeometry,
}

pub struct AnnotationSurface {
    drawing: DrawingSettings,
    render: RenderSettings,
    session: EditSession,
    frame: FrameGeometry,
    natural_size: Option<(u32, u32)>,
    machine: DrawingMachine,
    hit_tester: HitTester,
    renderer: Renderer,
    active_profile: Option<ProfileId>,
    selection: Option<Hit>,
    hovered: Option<ShapeId>,
    hovered_badge: Option<ShapeId>,
    drag: Option<MoveDrag>,
    events: EventDispatcher,
    last_frame: Option<Pixmap>,
    last_pending: usize,
}

impl AnnotationSurface {
    pub fn new(session: EditSession, config: &Config) -> Self {
        let last_pending = session.pending_count();
        Self {
            drawing: config.drawing.clone(),
            render: config.render.clone(),
            session,
            frame: FrameGeometry::default(),
            natural_size: None,
            machine: DrawingMachine::new(config.drawing.polygon_close_tolerance_px),
            hit_tester: HitTester::new(config.drawing.hit_tolerance_px),
            renderer: Renderer::new(RenderStyle::from(&config.render)),
            active_profile: None,
            selection: None,
            hovered: None,
            hovered_badge: None,
            drag: None,
            events: EventDispatcher::default(),
            last_frame: None,
            last_pending,
        }
    }

    /// Opens an edit session on `scope` and wraps it in a surface.
    pub async fn open(
        store: Arc<dyn ProfileStore>,
        scope: ProfileScope,
        config: &Config,
    ) -> Result<Self> {
        let session = EditSession::open(store, scope, config.profiles.clone()).await?;
        Ok(Self::new(session, config))
    }

    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<SurfaceEvent> {
        self.events.subscribe()
    }

    pub fn session(&self) -> &EditSession {
        &self.session
    }

    pub fn profiles(&self) -> &[Profile] {
        self.session.profiles()
    }

    pub fn frame(&self) -> &FrameGeometry {
        &self.frame
    }

    pub fn tool(&self) -> Tool {
        self.machine.tool()
    }

    pub fn active_profile(&self) -> Option<ProfileId> {
        self.active_profile
    }

    pub fn selection(&self) -> Option<Hit> {
        self.selection
    }

    pub fn hovered(&self) -> Option<ShapeId> {
        self.hovered
    }

    pub fn machine(&self) -> &DrawingMachine {
        &self.machine
    }

    pub fn has_pending_changes(&self) -> bool {
        self.session.has_pending_changes()
    }

    pub fn pending_count(&self) -> usize {
        self.session.pending_count()
    }

    // ---- image and frame ----

    /// Sets the camera still and fits the frame to the configured container.
    pub fn load_image(&mut self, image: RgbaImage) {
        self.natural_size = Some(image.dimensions());
        self.renderer.set_base_image(image);
        self.refit();
    }

    /// Refits the frame to a new container size.
    pub fn resize(&mut self, container_width: f64, max_height: f64) {
        self.render.container_width = container_width;
        self.render.max_height = max_height;
        self.refit();
    }

    fn refit(&mut self) {
        let frame = self.natural_size.and_then(|(w, h)| {
            FrameGeometry::fit(
                w as f64,
                h as f64,
                self.render.container_width,
                self.render.max_height,
            )
        });
        self.frame = frame.unwrap_or_default();
        tracing::debug!("Frame is now {}", self.frame);
        // in-progress pixel points are meaningless in a new frame
        self.machine.cancel();
        self.drag = None;
        self.redraw();
    }

    // ---- tool and profile ----

    pub fn set_tool(&mut self, tool: Tool) {
        self.machine.set_tool(tool);
        self.drag = None;
        self.hovered = None;
        self.redraw();
    }

    pub fn set_active_profile(&mut self, id: Option<ProfileId>) -> Result<()> {
        if let Some(id) = id {
            if self.session.profile(id).is_none() {
                return Err(ProfileError::NotFound { id }.into());
            }
        }
        self.active_profile = id;
        self.machine.set_profile_active(id.is_some());
        self.redraw();
        Ok(())
    }

    fn active_color(&self) -> RoiColor {
        self.active_profile
            .and_then(|id| self.session.profile(id))
            .map(|p| p.color)
            .unwrap_or_default()
    }

    // ---- pointer events ----

    pub fn pointer_down(&mut self, point: PixelPoint) -> Result<()> {
        if self.frame.is_empty() {
            return Ok(());
        }
        let outcome = self.machine.pointer_down(point, &self.frame);
        match outcome {
            Ok(PointerOutcome::Select(p)) => {
                self.select_at(p);
                Ok(())
            }
            Ok(PointerOutcome::Finalized(geometry)) => self.complete(geometry),
            Ok(PointerOutcome::Started | PointerOutcome::PointAdded) => {
                self.redraw();
                Ok(())
            }
            Ok(PointerOutcome::Ignored) => Ok(()),
            Err(e) => {
                tracing::debug!("Rejected shape: {}", e);
                self.redraw();
                Err(e.into())
            }
        }
    }

    pub fn pointer_move(&mut self, point: PixelPoint) {
        if self.frame.is_empty() {
            return;
        }

        if let Some(drag) = &mut self.drag {
            let dx = self.frame.dx_to_percent(point.x - drag.origin.x);
            let dy = self.frame.dy_to_percent(point.y - drag.origin.y);
            drag.current = drag.original.translated(dx, dy);
            self.redraw();
            return;
        }

        if self.machine.pointer_move(point) {
            self.redraw();
            return;
        }

        self.update_hover(point);
    }

    pub fn pointer_up(&mut self, point: PixelPoint) -> Result<()> {
        if self.frame.is_empty() {
            return Ok(());
        }

        if let Some(drag) = self.drag.take() {
            if drag.current != drag.original {
                self.session.record_updated(
                    drag.hit.profile_id,
                    drag.hit.shape_id,
                    ShapePatch::geometry(drag.current),
                )?;
                self.publish_pending();
            }
            self.redraw();
            return Ok(());
        }

        match self.machine.pointer_up(point, &self.frame) {
            Ok(PointerOutcome::Finalized(geometry)) => self.complete(geometry),
            Ok(_) => Ok(()),
            Err(e) => {
                tracing::debug!("Rejected shape: {}", e);
                self.redraw();
                Err(e.into())
            }
        }
    }

    /// Completes the accumulating polygon without a closing click.
    pub fn finish_polygon(&mut self) -> Result<()> {
        let geometry = self.machine.finish_polygon(&self.frame);
        match geometry {
            Ok(geometry) => self.complete(geometry),
            Err(e) => {
                self.redraw();
                Err(e.into())
            }
        }
    }

    /// Drops the in-progress shape.
    pub fn cancel_drawing(&mut self) {
        if self.machine.cancel() {
            self.redraw();
        }
    }

    fn select_at(&mut self, point: PixelPoint) {
        let hit = self
            .hit_tester
            .hit_test(point, self.session.profiles(), &self.frame);
        self.selection = hit;
        self.events.publish(SurfaceEvent::DrawingSelect {
            shape: hit.map(|h| h.shape_id),
            profile_id: hit.map(|h| h.profile_id),
        });

        self.drag = None;
        if let Some(hit) = hit {
            self.events.publish(SurfaceEvent::CanvasClick {
                point,
                shape_id: hit.shape_id,
            });
            if let Some((_, shape)) = self.session.find_shape(hit.shape_id) {
                self.drag = Some(MoveDrag {
                    hit,
                    origin: point,
                    original: shape.geometry.clone(),
                    current: shape.geometry.clone(),
                });
            }
        }
        self.redraw();
    }

    fn update_hover(&mut self, point: PixelPoint) {
        let hovered = if self.machine.tool() == Tool::Select {
            self.hit_tester
                .hit_test(point, self.session.profiles(), &self.frame)
                .map(|h| h.shape_id)
        } else {
            None
        };

        let badge = self.renderer.badge_at(point);
        if badge != self.hovered_badge {
            self.hovered_badge = badge;
            let comment = badge.and_then(|id| {
                self.session
                    .find_shape(id)
                    .and_then(|(_, s)| s.comment().map(|c| (id, c.to_string())))
            });
            self.events.publish(SurfaceEvent::CommentHover(comment));
        }

        if hovered != self.hovered {
            self.hovered = hovered;
            self.redraw();
        }
    }

    fn complete(&mut self, geometry: ShapeGeometry) -> Result<()> {
        let profile_id = self.active_profile.ok_or(ProfileError::NoActiveProfile)?;

        if self.drawing.discard_degenerate && geometry.is_degenerate() {
            tracing::debug!("Discarding degenerate {}", geometry.shape_type());
            self.redraw();
            return Ok(());
        }

        let draft = ShapeDraft::new(geometry, self.active_color());
        self.session.record_drawn(profile_id, draft.clone())?;
        self.events.publish(SurfaceEvent::DrawingComplete(draft));
        self.publish_pending();
        self.redraw();
        Ok(())
    }

    // ---- edits ----

    /// Deletes the selected shape. Returns false when nothing is selected.
    pub fn delete_selected(&mut self) -> Result<bool> {
        let Some(hit) = self.selection else {
            return Ok(false);
        };
        self.session.record_deleted(hit.profile_id, hit.shape_id)?;
        self.selection = None;
        self.drag = None;
        self.publish_pending();
        self.redraw();
        Ok(true)
    }

    /// Replaces the selected shape's comment. Blank text clears it.
    pub fn set_selected_comment(&mut self, comment: Option<String>) -> Result<bool> {
        let Some(hit) = self.selection else {
            return Ok(false);
        };
        let comment = comment.filter(|c| !c.trim().is_empty());
        self.session
            .record_updated(hit.profile_id, hit.shape_id, ShapePatch::comment(comment))?;
        self.publish_pending();
        self.redraw();
        Ok(true)
    }

    /// Removes the topmost shape of the active profile.
    pub fn undo_last(&mut self) -> Result<Option<ShapeId>> {
        let profile_id = self.active_profile.ok_or(ProfileError::NoActiveProfile)?;
        let removed = self.session.undo_last(profile_id)?;
        if removed.is_some() {
            self.prune_stale();
            self.publish_pending();
            self.redraw();
        }
        Ok(removed)
    }

    pub async fn save(&mut self) -> Result<()> {
        if let Err(e) = self.session.save().await {
            // a partial save shortens the log and renames applied shapes
            self.prune_stale();
            self.publish_pending();
            self.redraw();
            return Err(e);
        }
        // saved shapes may carry new ids
        self.clear_transient();
        self.publish_pending();
        self.redraw();
        Ok(())
    }

    pub async fn discard(&mut self) -> Result<()> {
        self.session.discard().await?;
        self.clear_transient();
        self.publish_pending();
        self.redraw();
        Ok(())
    }

    // ---- profiles ----

    /// Creates a profile in the current scope and makes it active.
    pub async fn create_profile(&mut self, name: &str) -> Result<ProfileId> {
        let id = self.session.create_profile(name).await?.id;
        self.set_active_profile(Some(id))?;
        Ok(id)
    }

    pub async fn delete_profile(&mut self, id: ProfileId) -> Result<()> {
        self.session.delete_profile(id).await?;
        if self.active_profile == Some(id) {
            self.active_profile = None;
            self.machine.set_profile_active(false);
        }
        self.prune_stale();
        self.publish_pending();
        self.redraw();
        Ok(())
    }

    pub fn toggle_visibility(&mut self, id: ProfileId) -> Result<bool> {
        let visible = self.session.toggle_visibility(id)?;
        self.prune_stale();
        self.redraw();
        Ok(visible)
    }

    pub fn set_visibility(&mut self, ids: &[ProfileId], visible: bool) {
        self.session.set_visibility(ids, visible);
        self.prune_stale();
        self.redraw();
    }

    /// Loads another scope, dropping pending changes. Returns how many were
    /// dropped.
    pub async fn switch_scope(&mut self, scope: ProfileScope) -> Result<usize> {
        let dropped = self.session.switch_scope(scope).await?;
        self.active_profile = None;
        self.machine.set_profile_active(false);
        self.clear_transient();
        self.publish_pending();
        self.redraw();
        Ok(dropped)
    }

    fn clear_transient(&mut self) {
        self.selection = None;
        self.hovered = None;
        self.hovered_badge = None;
        self.drag = None;
        if let Some(id) = self.active_profile {
            if self.session.profile(id).is_none() {
                self.active_profile = None;
                self.machine.set_profile_active(false);
            }
        }
    }

    /// Drops selection and hover that point at removed or hidden shapes.
    fn prune_stale(&mut self) {
        let live = |session: &EditSession, id: ShapeId| {
            session
                .find_shape(id)
                .is_some_and(|(profile, _)| profile.visible)
        };
        if let Some(hit) = self.selection {
            if !live(&self.session, hit.shape_id) {
                self.selection = None;
                self.drag = None;
            }
        }
        if let Some(id) = self.hovered {
            if !live(&self.session, id) {
                self.hovered = None;
            }
        }
    }

    fn publish_pending(&mut self) {
        let count = self.session.pending_count();
        if count != self.last_pending {
            self.last_pending = count;
            self.events.publish(SurfaceEvent::PendingChanges { count });
        }
    }

    // ---- rendering ----

    fn redraw(&mut self) {
        let preview = self.machine.preview(&self.frame);
        let scene = Scene {
            profiles: self.session.profiles(),
            selected: self.selection.map(|h| h.shape_id),
            hovered: self.hovered,
            preview: preview.as_ref(),
            preview_color: self.active_color(),
            drag_override: self.drag.as_ref().map(|d| (d.hit.shape_id, &d.current)),
        };
        self.last_frame = self.renderer.render(&self.frame, &scene);
    }

    /// The last rendered frame.
    pub fn image(&self) -> Option<RgbaImage> {
        self.last_frame.as_ref().map(pixmap_to_image)
    }

    pub fn pixmap(&self) -> Option<&Pixmap> {
        self.last_frame.as_ref()
    }

    /// The shape whose comment badge is under `point`.
    pub fn badge_at(&self, point: PixelPoint) -> Option<ShapeId> {
        self.renderer.badge_at(point)
    }
}
