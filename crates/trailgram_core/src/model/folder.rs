//! Folder domain model and recursive subtree walks.
//!
//! # Responsibility
//! - Define the internal node of the forest: a named container holding an
//!   ordered spot list and an ordered child-folder list.
//! - Provide depth-first, pre-order walks used by the tree store.
//!
//! # Invariants
//! - Walks visit a folder's own spots before its children, and children in
//!   stored order.
//! - Walk helpers return at the first match; callers rely on forest-wide id
//!   uniqueness for that to be the only match.

use super::spot::{MemorySpot, SpotId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier of a folder.
pub type FolderId = Uuid;

/// Id of the synthetic root that wraps the top-level folders. Never persisted.
pub const ROOT_FOLDER_ID: FolderId = Uuid::nil();

/// Display name of the synthetic root.
pub const ROOT_FOLDER_NAME: &str = "All Folders";

/// Named container of spots and nested folders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Folder {
    id: FolderId,
    pub name: String,
    #[serde(default)]
    pub spots: Vec<MemorySpot>,
    #[serde(default)]
    pub children: Vec<Folder>,
}

impl Folder {
    /// Creates an empty folder with a generated id.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4(), name)
    }

    /// Creates an empty folder with a caller-provided id.
    pub fn with_id(id: FolderId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            spots: Vec::new(),
            children: Vec::new(),
        }
    }

    pub(crate) fn synthetic_root(children: Vec<Folder>) -> Self {
        Self {
            id: ROOT_FOLDER_ID,
            name: ROOT_FOLDER_NAME.to_string(),
            spots: Vec::new(),
            children,
        }
    }

    pub fn id(&self) -> FolderId {
        self.id
    }

    /// Returns `true` when the folder holds neither spots nor subfolders.
    pub fn is_empty(&self) -> bool {
        self.spots.is_empty() && self.children.is_empty()
    }

    /// Collects every spot in this subtree, pre-order.
    pub fn all_spots(&self) -> Vec<&MemorySpot> {
        let mut out = Vec::new();
        self.collect_spots(&mut out);
        out
    }

    /// Collects this folder and every descendant folder, pre-order.
    pub fn all_folders(&self) -> Vec<&Folder> {
        let mut out = Vec::new();
        self.collect_folders(&mut out);
        out
    }

    /// Ids of this folder and all descendant folders.
    pub fn folder_ids(&self) -> Vec<FolderId> {
        self.all_folders().into_iter().map(Folder::id).collect()
    }

    /// Ids of every spot in this subtree.
    pub fn spot_ids(&self) -> Vec<SpotId> {
        self.all_spots().into_iter().map(MemorySpot::id).collect()
    }

    fn collect_spots<'a>(&'a self, out: &mut Vec<&'a MemorySpot>) {
        out.extend(self.spots.iter());
        for child in &self.children {
            child.collect_spots(out);
        }
    }

    fn collect_folders<'a>(&'a self, out: &mut Vec<&'a Folder>) {
        out.push(self);
        for child in &self.children {
            child.collect_folders(out);
        }
    }

    /// Finds `id` among this folder and its descendants.
    pub fn find_folder(&self, id: FolderId) -> Option<&Folder> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find_folder(id))
    }

    pub(crate) fn find_folder_mut(&mut self, id: FolderId) -> Option<&mut Folder> {
        if self.id == id {
            return Some(self);
        }
        self.children
            .iter_mut()
            .find_map(|child| child.find_folder_mut(id))
    }

    /// Finds the folder in this subtree that directly owns `spot_id`.
    pub fn find_spot_owner(&self, spot_id: SpotId) -> Option<&Folder> {
        if self.spots.iter().any(|spot| spot.id() == spot_id) {
            return Some(self);
        }
        self.children
            .iter()
            .find_map(|child| child.find_spot_owner(spot_id))
    }

    pub fn find_spot(&self, spot_id: SpotId) -> Option<&MemorySpot> {
        self.find_spot_owner(spot_id)?
            .spots
            .iter()
            .find(|spot| spot.id() == spot_id)
    }

    pub(crate) fn find_spot_mut(&mut self, spot_id: SpotId) -> Option<&mut MemorySpot> {
        if let Some(index) = self.spots.iter().position(|spot| spot.id() == spot_id) {
            return Some(&mut self.spots[index]);
        }
        self.children
            .iter_mut()
            .find_map(|child| child.find_spot_mut(spot_id))
    }

    /// Removes the spot from whichever folder in this subtree owns it.
    pub(crate) fn take_spot(&mut self, spot_id: SpotId) -> Option<MemorySpot> {
        if let Some(index) = self.spots.iter().position(|spot| spot.id() == spot_id) {
            return Some(self.spots.remove(index));
        }
        self.children
            .iter_mut()
            .find_map(|child| child.take_spot(spot_id))
    }

    /// Detaches the descendant folder `id` (with its whole subtree).
    ///
    /// Never detaches `self`.
    pub(crate) fn take_descendant(&mut self, id: FolderId) -> Option<Folder> {
        if let Some(index) = self.children.iter().position(|child| child.id == id) {
            return Some(self.children.remove(index));
        }
        self.children
            .iter_mut()
            .find_map(|child| child.take_descendant(id))
    }

    /// Ids from this folder down to `id`, both inclusive.
    pub fn path_to(&self, id: FolderId) -> Option<Vec<FolderId>> {
        if self.id == id {
            return Some(vec![self.id]);
        }
        self.children.iter().find_map(|child| {
            let mut tail = child.path_to(id)?;
            tail.insert(0, self.id);
            Some(tail)
        })
    }
}
