//! # roikit Annotator
//!
//! Region-of-interest drawing and editing on top of camera stills. Shapes
//! (rectangle, circle, polygon, line, arrow) are grouped into named,
//! independently visible profiles per (objective, camera) scope, edited
//! optimistically and flushed to an injected store on save.
//!
//! ## Architecture
//!
//! ```text
//! AnnotationSurface (pointer events, events out)
//!   ├── DrawingMachine (tool state, in-progress points)
//!   ├── HitTester (topmost shape under a point)
//!   ├── Renderer (tiny-skia raster, badge side table)
//!   └── EditSession (profiles, pending-change log)
//!         └── ProfileStore (async persistence seam)
//!
//! FrameGeometry (pixel <-> percentage transform) and the shape model are
//! shared by all of the above.
//! ```
//!
//! All persisted coordinates live in percentage space, [0, 100] on both
//! axes, so annotations survive any change of display size.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use roikit_annotator::{AnnotationSurface, InMemoryProfileStore, PixelPoint, Tool};
//!
//! let store = Arc::new(InMemoryProfileStore::new());
//! let mut surface = AnnotationSurface::open(store, scope, &config).await?;
//! surface.load_image(still);
//! surface.create_profile("Leaks").await?;
//! surface.set_tool(Tool::Rectangle);
//! surface.pointer_down(PixelPoint::new(40.0, 40.0))?;
//! surface.pointer_up(PixelPoint::new(120.0, 90.0))?;
//! surface.save().await?;
//! ```

pub mod drawing;
pub mod events;
pub mod frame;
pub mod model;
pub mod renderer;
pub mod serialization;
pub mod session;
pub mod store;
pub mod surface;

pub use drawing::{DrawingMachine, DrawingPreview, DrawingState, PointerOutcome, Tool};
pub use events::{EventDispatcher, SurfaceEvent};
pub use frame::FrameGeometry;
pub use hit_test::{Hit, HitTester};
pub use model::{
    PercentPoint, PixelPoint, Profile, RoiCircle, RoiLine, RoiPolygon, RoiRectangle, RoiShape,
    Shape, ShapeDraft, ShapeGeometry, ShapePatch, ShapeType,
};
pub use renderer::{pixmap_to_image, Badge, BadgeTable, RenderStyle, Renderer, Scene};
pub use serialization::{ProfileDocument, ShapeRecord};
pub use session::{EditSession, PendingChange};
pub use store::{BatchReport, InMemoryProfileStore, NewProfile, ProfileStore};
pub use surface::AnnotationSurface;
