//! Events published by the annotation surface.
//!
//! Hosts subscribe to learn about finished drawings, selections to forward to
//! the comment thread, badge hovers and pending-change counts.

use roikit_core::{ProfileId, ShapeId};
use tokio::sync::broadcast;

use crate::model::{PixelPoint, ShapeDraft};

/// Surface event types
#[derive(Debug, Clone)]
pub enum SurfaceEvent {
    /// A shape was finalized and recorded as a pending add
    DrawingComplete(ShapeDraft),
    /// Outcome of a select-mode hit test (`shape` is `None` on a miss)
    DrawingSelect {
        shape: Option<ShapeId>,
        profile_id: Option<ProfileId>,
    },
    /// A click landed on a shape; for the comment thread
    CanvasClick { point: PixelPoint, shape_id: ShapeId },
    /// The comment badge under the pointer changed
    CommentHover(Option<(ShapeId, String)>),
    /// The pending-change log length changed
    PendingChanges { count: usize },
}

impl std::fmt::Display for SurfaceEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SurfaceEvent::DrawingComplete(draft) => {
                write!(f, "Drawing complete: {}", draft.geometry.shape_type())
            }
            SurfaceEvent::DrawingSelect { shape: Some(id), .. } => write!(f, "Selected {}", id),
            SurfaceEvent::DrawingSelect { shape: None, .. } => write!(f, "Selection cleared"),
            SurfaceEvent::CanvasClick { point, shape_id } => {
                write!(f, "Click on {} at ({:.1}, {:.1})", shape_id, point.x, point.y)
            }
            SurfaceEvent::CommentHover(Some((id, _))) => write!(f, "Hovering comment of {}", id),
            SurfaceEvent::CommentHover(None) => write!(f, "Comment hover ended"),
            SurfaceEvent::PendingChanges { count } => write!(f, "{} pending changes", count),
        }
    }
}

/// Broadcast dispatcher for surface events
#[derive(Clone)]
pub struct EventDispatcher {
    tx: broadcast::Sender<SurfaceEvent>,
}

impl EventDispatcher {
    pub fn new(buffer_size: usize) -> Self {
        let (tx, _) = broadcast::channel(buffer_size);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SurfaceEvent> {
        self.tx.subscribe()
    }

    /// Publishes to current subscribers; with none the event is dropped.
    pub fn publish(&self, event: SurfaceEvent) {
        tracing::trace!("{}", event);
        let _ = self.tx.send(event);
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventDispatcher {
    fn default() -> Self {
        Self::new(100)
    }
}
