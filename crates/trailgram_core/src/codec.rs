//! Structured-text codec for the folder forest.
//!
//! # Responsibility
//! - Convert the ordered root-folder sequence to and from JSON bytes.
//! - Reject forests that break forest-wide id uniqueness, reuse the
//!   synthetic root id, or hold coordinates JSON cannot represent.
//!
//! # Invariants
//! - Encoding is deterministic: field order follows struct declaration.
//! - `decode_forest(encode_forest(f)) == f` for every modeled field.
//! - The synthetic root is never part of the encoded payload.

use crate::model::folder::{Folder, FolderId, ROOT_FOLDER_ID};
use crate::model::spot::SpotId;
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors from forest encoding/decoding.
#[derive(Debug)]
pub enum CodecError {
    /// Payload is not valid JSON or does not match the forest shape.
    Json(serde_json::Error),
    /// The same folder id appears twice in the decoded forest.
    DuplicateFolderId(FolderId),
    /// The same spot id appears twice in the decoded forest.
    DuplicateSpotId(SpotId),
    /// A folder or spot carries the id reserved for the synthetic root.
    ReservedId,
    /// A spot coordinate is NaN or infinite.
    NonFiniteCoordinate(SpotId),
}

impl Display for CodecError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json(err) => write!(f, "invalid forest payload: {err}"),
            Self::DuplicateFolderId(id) => write!(f, "duplicate folder id in forest: {id}"),
            Self::DuplicateSpotId(id) => write!(f, "duplicate spot id in forest: {id}"),
            Self::ReservedId => write!(f, "forest uses reserved root id {ROOT_FOLDER_ID}"),
            Self::NonFiniteCoordinate(id) => write!(f, "spot {id} has a non-finite coordinate"),
        }
    }
}

impl Error for CodecError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Json(err) => Some(err),
            Self::DuplicateFolderId(_) => None,
            Self::DuplicateSpotId(_) => None,
            Self::ReservedId => None,
            Self::NonFiniteCoordinate(_) => None,
        }
    }
}

impl From<serde_json::Error> for CodecError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

/// Encodes the root-folder sequence as pretty-printed JSON.
///
/// # Errors
/// - [`CodecError::NonFiniteCoordinate`] instead of writing a `null`
///   coordinate that would fail to decode.
pub fn encode_forest(forest: &[Folder]) -> Result<Vec<u8>, CodecError> {
    ensure_finite_coordinates(forest)?;
    Ok(serde_json::to_vec_pretty(forest)?)
}

/// Decodes a root-folder sequence previously produced by [`encode_forest`].
///
/// Missing optional fields fall back to defaults: no image reference, empty
/// spot/child lists, and `createdAt` set to the decode time.
///
/// # Errors
/// - [`CodecError::Json`] when the payload is malformed.
/// - [`CodecError::DuplicateFolderId`] / [`CodecError::DuplicateSpotId`] when
///   an id occurs more than once anywhere in the forest.
/// - [`CodecError::ReservedId`] when a folder or spot uses the nil id.
pub fn decode_forest(bytes: &[u8]) -> Result<Vec<Folder>, CodecError> {
    let forest: Vec<Folder> = serde_json::from_slice(bytes)?;
    ensure_unique_ids(&forest)?;
    Ok(forest)
}

/// Checks forest-wide uniqueness of folder ids and spot ids.
///
/// `ROOT_FOLDER_ID` belongs to the synthetic root and is rejected on any
/// stored folder or spot.
pub fn ensure_unique_ids(forest: &[Folder]) -> Result<(), CodecError> {
    let mut folder_ids = HashSet::new();
    let mut spot_ids = HashSet::new();
    for root in forest {
        for folder in root.all_folders() {
            if folder.id() == ROOT_FOLDER_ID {
                return Err(CodecError::ReservedId);
            }
            if !folder_ids.insert(folder.id()) {
                return Err(CodecError::DuplicateFolderId(folder.id()));
            }
            for spot in &folder.spots {
                if spot.id() == ROOT_FOLDER_ID {
                    return Err(CodecError::ReservedId);
                }
                if !spot_ids.insert(spot.id()) {
                    return Err(CodecError::DuplicateSpotId(spot.id()));
                }
            }
        }
    }
    Ok(())
}

/// Checks that every spot coordinate is finite.
pub fn ensure_finite_coordinates(forest: &[Folder]) -> Result<(), CodecError> {
    let bad_spot = forest
        .iter()
        .flat_map(Folder::all_spots)
        .find(|spot| !spot.coordinate.is_finite());
    match bad_spot {
        Some(spot) => Err(CodecError::NonFiniteCoordinate(spot.id())),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::{decode_forest, encode_forest, CodecError};
    use crate::model::coordinate::Coordinate;
    use crate::model::folder::{Folder, ROOT_FOLDER_ID};
    use crate::model::spot::MemorySpot;

    #[test]
    fn encoding_is_deterministic() {
        let mut folder = Folder::new("Trip");
        folder
            .spots
            .push(MemorySpot::new("Pier", "sunset", Coordinate::new(1.5, -2.5)));
        let forest = vec![folder];
        assert_eq!(
            encode_forest(&forest).unwrap(),
            encode_forest(&forest).unwrap()
        );
    }

    #[test]
    fn encoded_spot_uses_flat_camel_case_fields() {
        let mut folder = Folder::new("Trip");
        folder.spots.push(
            MemorySpot::new("Pier", "", Coordinate::new(1.5, -2.5)).with_image_reference("p.jpg"),
        );
        let bytes = encode_forest(&[folder]).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        let spot = &value[0]["spots"][0];
        assert_eq!(spot["latitude"], 1.5);
        assert_eq!(spot["longitude"], -2.5);
        assert_eq!(spot["imageReference"], "p.jpg");
        assert!(spot["createdAt"].is_i64());
    }

    #[test]
    fn absent_image_reference_is_omitted() {
        let mut folder = Folder::new("Trip");
        folder
            .spots
            .push(MemorySpot::new("Pier", "", Coordinate::new(0.0, 0.0)));
        let bytes = encode_forest(&[folder]).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(!text.contains("imageReference"));
    }

    #[test]
    fn decode_defaults_missing_optional_fields() {
        let payload = br#"[{
            "id": "6f1c1a52-3c1e-4f5e-9a55-1f1d8f0c2b7a",
            "name": "Old",
            "spots": [{
                "id": "0b8e2f6e-6a3a-4c1d-8f6b-2d6f0f3b9e11",
                "title": "Legacy",
                "latitude": 10,
                "longitude": 20.5
            }]
        }]"#;
        let forest = decode_forest(payload).unwrap();
        let spot = &forest[0].spots[0];
        assert_eq!(spot.title, "Legacy");
        assert_eq!(spot.description, "");
        assert_eq!(spot.coordinate, Coordinate::new(10.0, 20.5));
        assert!(spot.image_reference.is_none());
        assert!(spot.created_at > 0);
        assert!(forest[0].children.is_empty());
    }

    #[test]
    fn decode_rejects_duplicate_folder_ids() {
        let folder = Folder::new("Twice");
        let bytes = encode_forest(&[folder.clone(), folder]).unwrap();
        let err = decode_forest(&bytes).unwrap_err();
        assert!(matches!(err, CodecError::DuplicateFolderId(_)));
    }

    #[test]
    fn encode_rejects_non_finite_coordinate() {
        let mut folder = Folder::new("Trip");
        let spot = MemorySpot::new("Drift", "", Coordinate::new(f64::NAN, 2.0));
        let spot_id = spot.id();
        folder.spots.push(spot);

        let err = encode_forest(&[folder]).unwrap_err();
        assert!(matches!(err, CodecError::NonFiniteCoordinate(id) if id == spot_id));
    }

    #[test]
    fn decode_rejects_reserved_root_id() {
        let folder_payload = format!(
            r#"[{{"id": "{ROOT_FOLDER_ID}", "name": "Nil"}},
               {{"id": "6f1c1a52-3c1e-4f5e-9a55-1f1d8f0c2b7a", "name": "Real"}}]"#
        );
        let err = decode_forest(folder_payload.as_bytes()).unwrap_err();
        assert!(matches!(err, CodecError::ReservedId));

        let spot_payload = format!(
            r#"[{{
                "id": "6f1c1a52-3c1e-4f5e-9a55-1f1d8f0c2b7a",
                "name": "Real",
                "spots": [{{"id": "{ROOT_FOLDER_ID}", "title": "Nil", "latitude": 1, "longitude": 2}}]
            }}]"#
        );
        let err = decode_forest(spot_payload.as_bytes()).unwrap_err();
        assert!(matches!(err, CodecError::ReservedId));
    }

    #[test]
    fn decode_rejects_garbage() {
        let err = decode_forest(b"{ not json").unwrap_err();
        assert!(matches!(err, CodecError::Json(_)));
    }
}
