//! Identifier and scope types
//!
//! Opaque ids for profiles and shapes, and the (objective, camera) scope key
//! profiles are grouped under.

pub mod ids;

pub use ids::{ProfileId, ProfileScope, ShapeId};
