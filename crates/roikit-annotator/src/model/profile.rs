use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use roikit_core::{ProfileId, ProfileScope, RoiColor, ShapeId};

use super::Shape;

fn visible_by_default() -> bool {
    true
}

/// A named, colored, independently visible collection of shapes within one
/// (objective, camera) scope. Shape order is z-order, later on top.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: ProfileId,
    #[serde(flatten)]
    pub scope: ProfileScope,
    pub name: String,
    pub color: RoiColor,
    #[serde(default)]
    pub shapes: Vec<Shape>,
    /// Local display state; never persisted through the edit log.
    #[serde(default = "visible_by_default")]
    pub visible: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    pub fn new(scope: ProfileScope, name: impl Into<String>, color: RoiColor) -> Self {
        let now = Utc::now();
        Self {
            id: ProfileId::new(),
            scope,
            name: name.into(),
            color,
            shapes: Vec::new(),
            visible: true,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn shape(&self, id: ShapeId) -> Option<&Shape> {
        self.shapes.iter().find(|s| s.id == id)
    }

    pub fn shape_index(&self, id: ShapeId) -> Option<usize> {
        self.shapes.iter().position(|s| s.id == id)
    }

    /// Case-insensitive name comparison ignoring surrounding whitespace.
    pub fn has_name(&self, name: &str) -> bool {
        normalize_name(&self.name) == normalize_name(name)
    }
}

pub(crate) fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}
