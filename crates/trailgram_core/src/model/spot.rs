//! Memory spot domain model.
//!
//! # Responsibility
//! - Define the leaf record of the folder forest: one geo-tagged entry.
//!
//! # Invariants
//! - `id` is stable and never reused for another spot.
//! - `image_reference` is an opaque key owned by the image store; the spot
//!   never carries image bytes.

use super::coordinate::Coordinate;
use super::now_epoch_ms;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier of a memory spot.
pub type SpotId = Uuid;

/// One geo-tagged journal entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemorySpot {
    id: SpotId,
    /// Human-readable title. May be empty.
    pub title: String,
    /// Free-form note. May be empty.
    #[serde(default)]
    pub description: String,
    /// Serialized as flat `latitude`/`longitude` fields.
    #[serde(flatten)]
    pub coordinate: Coordinate,
    /// Unix epoch milliseconds. Older files without this field decode to
    /// the moment of decoding.
    #[serde(default = "now_epoch_ms")]
    pub created_at: i64,
    /// Opaque photo key returned by an `ImageStore`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_reference: Option<String>,
}

impl MemorySpot {
    /// Creates a spot with a generated id, stamped with the current time.
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        coordinate: Coordinate,
    ) -> Self {
        Self::with_id(Uuid::new_v4(), title, description, coordinate)
    }

    /// Creates a spot with a caller-provided id.
    ///
    /// Used by import paths where identity already exists externally.
    pub fn with_id(
        id: SpotId,
        title: impl Into<String>,
        description: impl Into<String>,
        coordinate: Coordinate,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            description: description.into(),
            coordinate,
            created_at: now_epoch_ms(),
            image_reference: None,
        }
    }

    pub fn with_image_reference(mut self, reference: impl Into<String>) -> Self {
        self.image_reference = Some(reference.into());
        self
    }

    pub fn id(&self) -> SpotId {
        self.id
    }

    pub fn has_image(&self) -> bool {
        self.image_reference.is_some()
    }
}
