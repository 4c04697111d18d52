use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use roikit_core::{RoiColor, ShapeError, ShapeId};

use super::{RoiShape, ShapeGeometry, ShapeType};
use crate::serialization::ShapeRecord;

/// A persisted annotation: geometry plus identity, color and comment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "ShapeRecord", try_from = "ShapeRecord")]
pub struct Shape {
    pub id: ShapeId,
    pub geometry: ShapeGeometry,
    pub color: RoiColor,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Shape {
    /// Materializes a draft under a fresh id.
    pub fn from_draft(draft: ShapeDraft) -> Self {
        Self::with_id(ShapeId::new(), draft)
    }

    pub fn with_id(id: ShapeId, draft: ShapeDraft) -> Self {
        let now = Utc::now();
        Self {
            id,
            geometry: draft.geometry,
            color: draft.color,
            comment: draft.comment,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn shape_type(&self) -> ShapeType {
        self.geometry.shape_type()
    }

    /// The comment, if it has visible content.
    pub fn comment(&self) -> Option<&str> {
        self.comment
            .as_deref()
            .filter(|c| !c.trim().is_empty())
    }

    /// Returns a copy with the patch applied and a fresh `updated_at`.
    pub fn patched(&self, patch: &ShapePatch) -> Result<Shape, ShapeError> {
        let mut next = self.clone();
        if let Some(geometry) = &patch.geometry {
            geometry.validate()?;
            next.geometry = geometry.clone();
        }
        if let Some(color) = patch.color {
            next.color = color;
        }
        if let Some(comment) = &patch.comment {
            next.comment = comment.clone();
        }
        next.updated_at = Utc::now();
        Ok(next)
    }
}

/// A shape that has not been given an id yet.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeDraft {
    pub geometry: ShapeGeometry,
    pub color: RoiColor,
    pub comment: Option<String>,
}

impl ShapeDraft {
    pub fn new(geometry: ShapeGeometry, color: RoiColor) -> Self {
        Self {
            geometry,
            color,
            comment: None,
        }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }
}

/// Whole-field replacements for an existing shape. `None` leaves a field
/// unchanged; `comment: Some(None)` clears the comment.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ShapePatch {
    pub geometry: Option<ShapeGeometry>,
    pub color: Option<RoiColor>,
    pub comment: Option<Option<String>>,
}

impl ShapePatch {
    pub fn geometry(geometry: ShapeGeometry) -> Self {
        Self {
            geometry: Some(geometry),
            ..Default::default()
        }
    }

    pub fn comment(comment: Option<String>) -> Self {
        Self {
            comment: Some(comment),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.geometry.is_none() && self.color.is_none() && self.comment.is_none()
    }

    pub fn validate(&self) -> Result<(), ShapeError> {
        match &self.geometry {
            Some(geometry) => geometry.validate(),
            None => Ok(()),
        }
    }
}
