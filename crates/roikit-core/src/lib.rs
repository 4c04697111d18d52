//! # roikit Core
//!
//! Core types, errors, and utilities shared by the roikit crates.
//! Provides the identifier and scope types, the fixed annotation palette,
//! engine-wide constants, and the error hierarchy used by the annotator.

pub mod constants;
pub mod error;
pub mod palette;
pub mod types;

pub use error::{Error, PersistenceError, ProfileError, Result, ShapeError};
pub use palette::RoiColor;
pub use types::{ProfileId, ProfileScope, ShapeId};
