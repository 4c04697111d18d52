//! # roikit
//!
//! Region-of-interest annotation for camera stills captured during
//! deployment pilots. Users group shapes into named, colored profiles per
//! (objective, camera) pair, draw rectangles, circles, polygons, lines and
//! arrows over the image, attach comments, and save or discard their edits
//! as a batch.
//!
//! ## Architecture
//!
//! roikit is organized as a workspace with multiple crates:
//!
//! 1. **roikit-core** - Ids, scopes, the profile color palette, errors, constants
//! 2. **roikit-settings** - Configuration (drawing, rendering, profile policy)
//! 3. **roikit-annotator** - Shapes, drawing state machine, hit testing,
//!    rendering, edit sessions and the annotation surface
//! 4. **roikit** - This crate: logging setup and the headless `render` command
//!
//! All geometry is stored in percentages of the rendered frame, so
//! annotations stay attached to the same image content at any display size.

pub mod cli;

pub use roikit_annotator::{
    AnnotationSurface, EditSession, FrameGeometry, InMemoryProfileStore, ProfileDocument,
    ProfileStore, Renderer, SurfaceEvent, Tool,
};
pub use roikit_core::{Error, ProfileId, ProfileScope, Result, RoiColor, ShapeId};
pub use roikit_settings::Config;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - Console output with pretty formatting
/// - RUST_LOG environment variable support
/// - INFO as the default level
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(tracing::Level::INFO.to_string()));

    // stdout carries nothing else, so logs go to stderr
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .pretty();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}
