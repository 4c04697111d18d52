//! Wire records and the profile document file format.
//!
//! Shapes cross the boundary as flat percentage arrays tagged by type; inside
//! the crate they are always [`ShapeGeometry`] values. A profile document is a
//! versioned JSON file holding the profiles of one scope, used by the
//! headless renderer and by hosts exporting annotations.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use roikit_core::{RoiColor, ShapeError, ShapeId};

use crate::model::{Profile, RoiShape, Shape, ShapeGeometry, ShapeType};

pub const DOCUMENT_VERSION: u32 = 1;

/// Flat wire form of a [`Shape`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapeRecord {
    pub id: ShapeId,
    #[serde(rename = "type")]
    pub shape_type: String,
    pub coordinates: Vec<f64>,
    pub color: RoiColor,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Shape> for ShapeRecord {
    fn from(shape: Shape) -> Self {
        Self {
            id: shape.id,
            shape_type: shape.shape_type().to_string(),
            coordinates: shape.geometry.coordinates(),
            color: shape.color,
            comment: shape.comment,
            created_at: shape.created_at,
            updated_at: shape.updated_at,
        }
    }
}

impl TryFrom<ShapeRecord> for Shape {
    type Error = ShapeError;

    fn try_from(record: ShapeRecord) -> Result<Self, Self::Error> {
        let shape_type: ShapeType = record.shape_type.parse()?;
        let geometry = ShapeGeometry::from_coordinates(shape_type, &record.coordinates)?;
        Ok(Shape {
            id: record.id,
            geometry,
            color: record.color,
            comment: record.comment,
            created_at: record.created_at,
            updated_at: record.updated_at,
        })
    }
}

/// A file of profiles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileDocument {
    pub version: u32,
    pub profiles: Vec<Profile>,
}

impl Default for ProfileDocument {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl ProfileDocument {
    pub fn new(profiles: Vec<Profile>) -> Self {
        Self {
            version: DOCUMENT_VERSION,
            profiles,
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let doc: Self = serde_json::from_str(json).context("Failed to parse profile document")?;
        if doc.version > DOCUMENT_VERSION {
            anyhow::bail!(
                "Unsupported profile document version {} (max {})",
                doc.version,
                DOCUMENT_VERSION
            );
        }
        Ok(doc)
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize profile document")
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let doc = Self::from_json(&content)
            .with_context(|| format!("Invalid profile document {}", path.display()))?;
        tracing::info!(
            "Loaded {} profiles from {}",
            doc.profiles.len(),
            path.display()
        );
        Ok(doc)
    }

    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let json = self.to_json()?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }
}
