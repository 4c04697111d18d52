//! Drawing state machine.
//!
//! Turns raw pointer events into finalized shape geometry. Points are kept in
//! pixel space while a shape is in progress and converted to percentage space
//! exactly once, at finalization; nothing else moves pointer coordinates into
//! persisted state.
//!
//! ```text
//! Idle ──(shape tool + active profile)──> Armed
//! Armed ──down──> Drawing ──up──> Armed            (rectangle, circle, line, arrow)
//! Armed ──down──> PolygonAccumulating ──close──> Armed
//! any ──tool/profile change──> Armed | Idle        (in-progress points dropped)
//! ```

use roikit_core::constants::{MIN_POLYGON_POINTS, POLYGON_CLOSE_TOLERANCE_PX};
use roikit_core::ShapeError;

use crate::frame::FrameGeometry;
use crate::model::{PixelPoint, RoiShape, ShapeGeometry, ShapeType};

/// Active pointer tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Tool {
    #[default]
    None,
    Select,
    Rectangle,
    Circle,
    Polygon,
    Line,
    Arrow,
}

impl Tool {
    /// The shape a drawing tool produces; `None` for select and none.
    pub fn shape_type(&self) -> Option<ShapeType> {
        match self {
            Tool::Rectangle => Some(ShapeType::Rectangle),
            Tool::Circle => Some(ShapeType::Circle),
            Tool::Polygon => Some(ShapeType::Polygon),
            Tool::Line => Some(ShapeType::Line),
            Tool::Arrow => Some(ShapeType::Arrow),
            Tool::None | Tool::Select => None,
        }
    }

    pub fn is_drawing_tool(&self) -> bool {
        self.shape_type().is_some()
    }
}

impl From<ShapeType> for Tool {
    fn from(shape_type: ShapeType) -> Self {
        match shape_type {
            ShapeType::Rectangle => Tool::Rectangle,
            ShapeType::Circle => Tool::Circle,
            ShapeType::Polygon => Tool::Polygon,
            ShapeType::Line => Tool::Line,
            ShapeType::Arrow => Tool::Arrow,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum DrawingState {
    #[default]
    Idle,
    Armed(Tool),
    Drawing {
        shape_type: ShapeType,
        anchor: PixelPoint,
        cursor: PixelPoint,
    },
    PolygonAccumulating {
        points: Vec<PixelPoint>,
        cursor: Option<PixelPoint>,
    },
}

/// Result of feeding a pointer event to the machine.
#[derive(Debug, Clone, PartialEq)]
pub enum PointerOutcome {
    /// Nothing to do in the current state.
    Ignored,
    /// A single-drag shape started at the anchor.
    Started,
    /// A polygon vertex was appended.
    PointAdded,
    /// Select tool: the caller should hit test this point.
    Select(PixelPoint),
    /// A shape was completed, in percentage space.
    Finalized(ShapeGeometry),
}

/// In-progress shape, for the renderer.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawingPreview {
    Shape(ShapeGeometry),
    Polyline {
        points: Vec<PixelPoint>,
        cursor: Option<PixelPoint>,
    },
}

#[derive(Debug, Clone)]
pub struct DrawingMachine {
    tool: Tool,
    profile_active: bool,
    state: DrawingState,
    close_tolerance: f64,
}

impl Default for DrawingMachine {
    fn default() -> Self {
        Self::new(POLYGON_CLOSE_TOLERANCE_PX)
    }
}

impl DrawingMachine {
    pub fn new(close_tolerance: f64) -> Self {
        Self {
            tool: Tool::None,
            profile_active: false,
            state: DrawingState::Idle,
            close_tolerance,
        }
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    pub fn state(&self) -> &DrawingState {
        &self.state
    }

    pub fn is_drawing(&self) -> bool {
        matches!(
            self.state,
            DrawingState::Drawing { .. } | DrawingState::PolygonAccumulating { .. }
        )
    }

    /// Changes the tool, dropping any in-progress shape.
    pub fn set_tool(&mut self, tool: Tool) {
        self.tool = tool;
        self.rest();
    }

    /// Records whether a profile is active. Any change of active profile
    /// drops the in-progress shape, so call this on every switch.
    pub fn set_profile_active(&mut self, active: bool) {
        self.profile_active = active;
        self.rest();
    }

    /// Drops the in-progress shape. Returns true if one existed.
    pub fn cancel(&mut self) -> bool {
        let was_drawing = self.is_drawing();
        self.rest();
        was_drawing
    }

    fn rest(&mut self) {
        if self.is_drawing() {
            tracing::debug!("Discarding in-progress {:?} shape", self.tool);
        }
        self.state = self.resting_state();
    }

    fn resting_state(&self) -> DrawingState {
        match self.tool {
            Tool::None => DrawingState::Idle,
            Tool::Select => DrawingState::Armed(Tool::Select),
            tool if self.profile_active => DrawingState::Armed(tool),
            _ => DrawingState::Idle,
        }
    }

    pub fn pointer_down(
        &mut self,
        point: PixelPoint,
        frame: &FrameGeometry,
    ) -> Result<PointerOutcome, ShapeError> {
        match &mut self.state {
            DrawingState::Idle | DrawingState::Drawing { .. } => Ok(PointerOutcome::Ignored),
            DrawingState::Armed(Tool::Select) => Ok(PointerOutcome::Select(point)),
            DrawingState::Armed(Tool::Polygon) => {
                self.state = DrawingState::PolygonAccumulating {
                    points: vec![point],
                    cursor: None,
                };
                Ok(PointerOutcome::PointAdded)
            }
            DrawingState::Armed(tool) => match tool.shape_type() {
                Some(shape_type) => {
                    self.state = DrawingState::Drawing {
                        shape_type,
                        anchor: point,
                        cursor: point,
                    };
                    Ok(PointerOutcome::Started)
                }
                None => Ok(PointerOutcome::Ignored),
            },
            DrawingState::PolygonAccumulating { points, .. } => {
                let closes = points.len() >= MIN_POLYGON_POINTS
                    && points[0].distance_to(&point) <= self.close_tolerance;
                if closes {
                    let points = std::mem::take(points);
                    self.finalize_polygon(&points, frame)
                        .map(PointerOutcome::Finalized)
                } else {
                    points.push(point);
                    Ok(PointerOutcome::PointAdded)
                }
            }
        }
    }

    /// Updates the rubber-band cursor. Returns true when a redraw is needed.
    pub fn pointer_move(&mut self, point: PixelPoint) -> bool {
        match &mut self.state {
            DrawingState::Drawing { cursor, .. } => {
                *cursor = point;
                true
            }
            DrawingState::PolygonAccumulating { cursor, .. } => {
                *cursor = Some(point);
                true
            }
            _ => false,
        }
    }

    pub fn pointer_up(
        &mut self,
        point: PixelPoint,
        frame: &FrameGeometry,
    ) -> Result<PointerOutcome, ShapeError> {
        let DrawingState::Drawing {
            shape_type, anchor, ..
        } = self.state
        else {
            return Ok(PointerOutcome::Ignored);
        };

        self.state = self.resting_state();
        if frame.is_empty() {
            return Err(ShapeError::EmptyFrame);
        }
        let geometry = ShapeGeometry::from_drag(shape_type, anchor, point, frame)
            .ok_or_else(|| ShapeError::UnknownShapeType(shape_type.to_string()))?;
        geometry.validate()?;
        tracing::debug!("Finalized {} at {:?}", shape_type, geometry.coordinates());
        Ok(PointerOutcome::Finalized(geometry))
    }

    /// Completes the accumulating polygon without a closing click.
    ///
    /// Refused with `TooFewPoints` below three vertices; the points are kept
    /// so the user can continue.
    pub fn finish_polygon(&mut self, frame: &FrameGeometry) -> Result<ShapeGeometry, ShapeError> {
        let count = match &self.state {
            DrawingState::PolygonAccumulating { points, .. } => points.len(),
            _ => 0,
        };
        if count < MIN_POLYGON_POINTS {
            return Err(ShapeError::TooFewPoints {
                required: MIN_POLYGON_POINTS,
                actual: count,
            });
        }
        let points = match std::mem::take(&mut self.state) {
            DrawingState::PolygonAccumulating { points, .. } => points,
            _ => Vec::new(),
        };
        self.finalize_polygon(&points, frame)
    }

    fn finalize_polygon(
        &mut self,
        points: &[PixelPoint],
        frame: &FrameGeometry,
    ) -> Result<ShapeGeometry, ShapeError> {
        self.state = self.resting_state();
        if frame.is_empty() {
            return Err(ShapeError::EmptyFrame);
        }
        let geometry = ShapeGeometry::polygon_from_pixels(points, frame);
        geometry.validate()?;
        tracing::debug!("Finalized polygon with {} points", points.len());
        Ok(geometry)
    }

    /// The shape being drawn, if any.
    pub fn preview(&self, frame: &FrameGeometry) -> Option<DrawingPreview> {
        match &self.state {
            DrawingState::Drawing {
                shape_type,
                anchor,
                cursor,
            } if !frame.is_empty() => {
                ShapeGeometry::from_drag(*shape_type, *anchor, *cursor, frame)
                    .map(DrawingPreview::Shape)
            }
            DrawingState::PolygonAccumulating { points, cursor } => {
                Some(DrawingPreview::Polyline {
                    points: points.clone(),
                    cursor: *cursor,
                })
            }
            _ => None,
        }
    }
}
