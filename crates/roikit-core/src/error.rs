//! Error handling for roikit
//!
//! Provides the error types for every layer of the annotation engine:
//! - Profile errors (creation and lookup within a scope)
//! - Shape errors (invalid geometry, the `InvalidShape` family)
//! - Persistence errors (the injected profile store failed)
//!
//! All error types use `thiserror` for ergonomic error handling.

use std::collections::HashMap;

use crate::types::{ProfileId, ShapeId};
use thiserror::Error;

/// Profile error type
///
/// Raised synchronously while creating or addressing profiles. No state is
/// mutated when one of these is returned.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProfileError {
    /// A profile with the same name (case-insensitive) already exists in scope
    #[error("A profile named '{name}' already exists in this scope")]
    DuplicateName {
        /// The rejected name.
        name: String,
    },

    /// The scope already holds the maximum number of profiles
    #[error("Profile limit of {limit} reached for this scope")]
    ProfileLimitExceeded {
        /// The configured per-scope limit.
        limit: usize,
    },

    /// The profile name is empty after trimming
    #[error("Profile name must not be empty")]
    EmptyName,

    /// No profile with this id is loaded
    #[error("Profile {id} not found")]
    NotFound {
        /// The missing profile id.
        id: ProfileId,
    },

    /// A drawing tool was used without an active profile
    #[error("No active profile")]
    NoActiveProfile,
}

/// Shape error type
///
/// Represents geometry that cannot enter persisted state. Reported without
/// mutating any profile.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ShapeError {
    /// Polygon has too few vertices
    #[error("Polygon needs at least {required} points, got {actual}")]
    TooFewPoints {
        /// Minimum vertex count.
        required: usize,
        /// Vertex count supplied.
        actual: usize,
    },

    /// A coordinate fell outside the [0, 100] percentage space
    #[error("Coordinate {value} is outside the percentage range [0, 100]")]
    CoordinateOutOfRange {
        /// The offending value.
        value: f64,
    },

    /// A flat coordinate array does not match the layout of its shape type
    #[error("Malformed {shape_type} coordinates: {len} values")]
    MalformedCoordinates {
        /// The shape type name.
        shape_type: String,
        /// Number of values supplied.
        len: usize,
    },

    /// The shape type tag is not recognised
    #[error("Unknown shape type: {0}")]
    UnknownShapeType(String),

    /// The render frame has no area, so pixel points cannot be normalized
    #[error("Render frame is empty")]
    EmptyFrame,

    /// No shape with this id exists in the profile
    #[error("Shape {id} not found")]
    NotFound {
        /// The missing shape id.
        id: ShapeId,
    },
}

/// Persistence error type
///
/// Represents failures of the external profile store.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PersistenceError {
    /// The store rejected or failed a request
    #[error("Persistence failure: {reason}")]
    Failure {
        /// The reason reported by the store.
        reason: String,
    },

    /// A sequential replay stopped part-way through a batch
    #[error("Saved {applied} of {total} changes before failing: {reason}")]
    PartialBatch {
        /// Number of changes the store accepted.
        applied: usize,
        /// Number of changes in the batch.
        total: usize,
        /// The reason reported by the store.
        reason: String,
        /// Provisional to store-assigned ids for the adds that went through.
        id_map: HashMap<ShapeId, ShapeId>,
    },

    /// The store does not know the addressed profile
    #[error("Profile {id} not found in store")]
    ProfileNotFound {
        /// The missing profile id.
        id: ProfileId,
    },

    /// The store does not know the addressed shape
    #[error("Shape {id} not found in store")]
    ShapeNotFound {
        /// The missing shape id.
        id: ShapeId,
    },
}

impl PersistenceError {
    /// Create a failure from a message
    pub fn failure(reason: impl Into<String>) -> Self {
        PersistenceError::Failure {
            reason: reason.into(),
        }
    }
}

/// Main error type for roikit
///
/// A unified error type that can represent any error from all layers.
/// This is the primary error type used in public APIs.
#[derive(Error, Debug)]
pub enum Error {
    /// Profile error
    #[error(transparent)]
    Profile(#[from] ProfileError),

    /// Invalid shape
    #[error("Invalid shape: {0}")]
    InvalidShape(#[from] ShapeError),

    /// Persistence error
    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this error was detected synchronously by validation
    pub fn is_validation_error(&self) -> bool {
        matches!(self, Error::Profile(_) | Error::InvalidShape(_))
    }

    /// Check if this is a store failure the user may retry
    pub fn is_persistence_failure(&self) -> bool {
        matches!(self, Error::Persistence(_))
    }

    /// Check if this is a duplicate-name rejection
    pub fn is_duplicate_name(&self) -> bool {
        matches!(self, Error::Profile(ProfileError::DuplicateName { .. }))
    }

    /// Check if this is a profile-limit rejection
    pub fn is_profile_limit(&self) -> bool {
        matches!(self, Error::Profile(ProfileError::ProfileLimitExceeded { .. }))
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;
