//! Folder tree store.
//!
//! # Responsibility
//! - Own the in-memory folder forest and be its only writer.
//! - Apply by-id mutations anywhere in the tree, then persist the whole
//!   forest and notify observers.
//! - Provide read-only derived views (flattened lists, path lookup).
//!
//! # Invariants
//! - Targets are located by a depth-first, pre-order walk over the roots.
//! - Folder and spot ids stay unique across the forest; mutations that
//!   would introduce a duplicate are rejected as no-ops.
//! - Every stored coordinate is finite, so each snapshot decodes again.
//! - A missing target is a silent no-op: no write, no notification.
//! - A failed write is logged and never rolls back the in-memory change.
//! - The forest holds at least one root folder once `open` returns.

use crate::codec::{ensure_finite_coordinates, ensure_unique_ids};
use crate::config::StoreConfig;
use crate::model::coordinate::Coordinate;
use crate::model::folder::{Folder, FolderId, ROOT_FOLDER_ID};
use crate::model::spot::{MemorySpot, SpotId};
use crate::notify::{ChangeNotifier, SubscriptionId};
use crate::repo::forest_repo::{ForestRepoResult, ForestRepository, JsonFileForestRepository};
use log::{debug, error, info, warn};
use std::collections::HashSet;
use std::time::Instant;

/// Single-owner store for the folder forest.
///
/// Internally the top-level folders are the children of a synthetic root
/// (`ROOT_FOLDER_ID`) so path lookups and "add under root" share one walk.
/// Only the root's children are persisted.
pub struct FolderStore<R: ForestRepository> {
    repo: R,
    root: Folder,
    notifier: ChangeNotifier,
    focus_coordinate: Option<Coordinate>,
    staged_spot: Option<MemorySpot>,
}

impl FolderStore<JsonFileForestRepository> {
    /// Opens the store backed by `config.forest_path()`.
    pub fn open_file(config: &StoreConfig) -> Self {
        Self::open(JsonFileForestRepository::new(config.forest_path()), config)
    }
}

impl<R: ForestRepository> FolderStore<R> {
    /// Loads the forest from `repo`.
    ///
    /// A missing or unreadable snapshot starts an empty forest. An empty
    /// forest gets one default root folder, which is persisted immediately.
    pub fn open(repo: R, config: &StoreConfig) -> Self {
        let started_at = Instant::now();
        let forest = match repo.load() {
            Ok(Some(forest)) => {
                info!(
                    "event=forest_load module=store status=ok roots={} duration_ms={}",
                    forest.len(),
                    started_at.elapsed().as_millis()
                );
                forest
            }
            Ok(None) => {
                info!("event=forest_load module=store status=skip reason=no_snapshot");
                Vec::new()
            }
            Err(err) => {
                warn!(
                    "event=forest_load module=store status=error error_code=load_failed error={}",
                    err
                );
                Vec::new()
            }
        };

        let mut store = Self {
            repo,
            root: Folder::synthetic_root(forest),
            notifier: ChangeNotifier::new(),
            focus_coordinate: None,
            staged_spot: None,
        };

        if store.root.children.is_empty() {
            store
                .root
                .children
                .push(Folder::new(config.default_folder_name.clone()));
            store.write_snapshot("default_folder");
        }
        store
    }

    // ---- mutations -------------------------------------------------------

    /// Appends a new top-level folder and returns its id.
    pub fn add_root_folder(&mut self, name: impl Into<String>) -> FolderId {
        let folder = Folder::new(name);
        let id = folder.id();
        self.root.children.push(folder);
        self.commit("folder_add_root");
        id
    }

    /// Appends a new child folder under `parent_id`.
    ///
    /// `ROOT_FOLDER_ID` as parent adds a top-level folder. Returns `None`
    /// when the parent does not exist.
    pub fn add_subfolder(
        &mut self,
        name: impl Into<String>,
        parent_id: FolderId,
    ) -> Option<FolderId> {
        let Some(parent) = self.root.find_folder_mut(parent_id) else {
            self.skip("folder_add_child", "parent_not_found");
            return None;
        };
        let folder = Folder::new(name);
        let id = folder.id();
        parent.children.push(folder);
        self.commit("folder_add_child");
        Some(id)
    }

    pub fn rename_folder(&mut self, id: FolderId, name: impl Into<String>) -> bool {
        let Some(folder) = self.folder_mut(id) else {
            self.skip("folder_rename", "not_found");
            return false;
        };
        folder.name = name.into();
        self.commit("folder_rename");
        true
    }

    /// Removes the folder with all descendant folders and spots.
    pub fn delete_folder(&mut self, id: FolderId) -> bool {
        match self.root.take_descendant(id) {
            Some(removed) => {
                debug!(
                    "event=folder_delete module=store status=detached folders={} spots={}",
                    removed.all_folders().len(),
                    removed.all_spots().len()
                );
                self.commit("folder_delete");
                true
            }
            None => {
                self.skip("folder_delete", "not_found");
                false
            }
        }
    }

    /// Replaces the subtree whose root id matches `updated.id()`.
    ///
    /// Rejected when `updated` repeats an id internally, or reuses a folder
    /// or spot id that lives outside the subtree being replaced.
    pub fn replace_folder(&mut self, updated: Folder) -> bool {
        let id = updated.id();
        let Some(existing) = self.folder(id) else {
            self.skip("folder_replace", "not_found");
            return false;
        };

        let checked = std::slice::from_ref(&updated);
        if let Err(err) =
            ensure_unique_ids(checked).and_then(|()| ensure_finite_coordinates(checked))
        {
            warn!(
                "event=folder_replace module=store status=skip reason=invalid_subtree error={}",
                err
            );
            return false;
        }

        let own_folders: HashSet<FolderId> = existing.folder_ids().into_iter().collect();
        let own_spots: HashSet<SpotId> = existing.spot_ids().into_iter().collect();
        let folder_clash = updated.folder_ids().into_iter().any(|folder_id| {
            !own_folders.contains(&folder_id) && self.root.find_folder(folder_id).is_some()
        });
        let spot_clash = updated.spot_ids().into_iter().any(|spot_id| {
            !own_spots.contains(&spot_id) && self.root.find_spot(spot_id).is_some()
        });
        if folder_clash || spot_clash {
            self.skip("folder_replace", "id_in_use");
            return false;
        }

        if let Some(slot) = self.folder_mut(id) {
            *slot = updated;
        }
        self.commit("folder_replace");
        true
    }

    /// Appends `spot` to folder `folder_id`.
    ///
    /// Rejected when the folder is missing, the spot id is already used or
    /// reserved, or the coordinate is not finite.
    pub fn append_spot(&mut self, spot: MemorySpot, folder_id: FolderId) -> bool {
        if !spot.coordinate.is_finite() {
            self.skip("spot_append", "non_finite_coordinate");
            return false;
        }
        if spot.id() == ROOT_FOLDER_ID || self.root.find_spot(spot.id()).is_some() {
            self.skip("spot_append", "id_in_use");
            return false;
        }
        let Some(folder) = self.folder_mut(folder_id) else {
            self.skip("spot_append", "folder_not_found");
            return false;
        };
        folder.spots.push(spot);
        self.commit("spot_append");
        true
    }

    /// Removes the spot from its owning folder and returns it.
    pub fn remove_spot(&mut self, spot_id: SpotId) -> Option<MemorySpot> {
        let Some(spot) = self.root.take_spot(spot_id) else {
            self.skip("spot_remove", "not_found");
            return None;
        };
        self.commit("spot_remove");
        Some(spot)
    }

    /// Replaces the spot with the same id, keeping its position.
    ///
    /// Rejected when the new coordinate is not finite.
    pub fn update_spot(&mut self, spot: MemorySpot) -> bool {
        if !spot.coordinate.is_finite() {
            self.skip("spot_update", "non_finite_coordinate");
            return false;
        }
        let Some(slot) = self.root.find_spot_mut(spot.id()) else {
            self.skip("spot_update", "not_found");
            return false;
        };
        *slot = spot;
        self.commit("spot_update");
        true
    }

    /// Sets the photo reference of one spot.
    ///
    /// Called after an image store or upload has produced `reference`.
    pub fn attach_image(&mut self, spot_id: SpotId, reference: impl Into<String>) -> bool {
        let Some(spot) = self.root.find_spot_mut(spot_id) else {
            self.skip("spot_attach_image", "not_found");
            return false;
        };
        spot.image_reference = Some(reference.into());
        self.commit("spot_attach_image");
        true
    }

    /// Moves a spot to the end of folder `new_folder_id`.
    ///
    /// The destination is checked before the spot leaves its origin, so a
    /// missing destination never drops the spot. Moving into the current
    /// owner is a no-op.
    pub fn move_spot(&mut self, spot_id: SpotId, new_folder_id: FolderId) -> bool {
        let Some(origin_id) = self.find_folder_id(spot_id) else {
            self.skip("spot_move", "spot_not_found");
            return false;
        };
        if self.folder(new_folder_id).is_none() {
            self.skip("spot_move", "destination_not_found");
            return false;
        }
        if origin_id == new_folder_id {
            self.skip("spot_move", "same_folder");
            return false;
        }

        let Some(spot) = self.root.take_spot(spot_id) else {
            return false;
        };
        match self.folder_mut(new_folder_id) {
            Some(destination) => destination.spots.push(spot),
            None => {
                if let Some(origin) = self.folder_mut(origin_id) {
                    origin.spots.push(spot);
                }
                return false;
            }
        }
        self.commit("spot_move");
        true
    }

    /// Writes the current forest to the repository.
    ///
    /// Mutations call this internally; it is public so callers can flush
    /// on demand and observe the outcome.
    pub fn persist(&self) -> ForestRepoResult<()> {
        self.repo.save(&self.root.children)
    }

    // ---- queries ---------------------------------------------------------

    /// Top-level folders in stored order.
    pub fn folders(&self) -> &[Folder] {
        &self.root.children
    }

    /// Synthetic root whose children are the top-level folders.
    pub fn root_folder(&self) -> &Folder {
        &self.root
    }

    /// Finds a real (non-synthetic) folder by id.
    pub fn folder(&self, id: FolderId) -> Option<&Folder> {
        self.root
            .children
            .iter()
            .find_map(|folder| folder.find_folder(id))
    }

    pub fn spot(&self, spot_id: SpotId) -> Option<&MemorySpot> {
        self.root.find_spot(spot_id)
    }

    /// Id of the folder that owns `spot_id`.
    pub fn find_folder_id(&self, spot_id: SpotId) -> Option<FolderId> {
        self.root.find_spot_owner(spot_id).map(Folder::id)
    }

    /// Display name for a folder id; the synthetic root resolves too.
    pub fn folder_name(&self, id: FolderId) -> Option<&str> {
        self.root.find_folder(id).map(|folder| folder.name.as_str())
    }

    /// Every spot in the forest, pre-order.
    pub fn flattened_spots(&self) -> Vec<&MemorySpot> {
        self.root.all_spots()
    }

    /// Every folder in the forest, pre-order, without the synthetic root.
    pub fn flattened_folders(&self) -> Vec<&Folder> {
        self.root
            .children
            .iter()
            .flat_map(Folder::all_folders)
            .collect()
    }

    /// Resolves a path of folder ids descending from the synthetic root.
    ///
    /// The empty path resolves to the synthetic root itself.
    pub fn folder_at_path(&self, path: &[FolderId]) -> Option<&Folder> {
        path.iter().try_fold(&self.root, |current, id| {
            current.children.iter().find(|child| child.id() == *id)
        })
    }

    /// Ids from the top-level ancestor down to `folder_id`, inclusive.
    ///
    /// Feeding the result to [`Self::folder_at_path`] yields the folder.
    pub fn parent_chain(&self, folder_id: FolderId) -> Option<Vec<FolderId>> {
        if folder_id == ROOT_FOLDER_ID {
            return None;
        }
        let mut chain = self.root.path_to(folder_id)?;
        chain.remove(0);
        Some(chain)
    }

    // ---- observation -----------------------------------------------------

    /// Registers a listener fired after every successful mutation.
    pub fn subscribe(&mut self, listener: impl Fn() + Send + 'static) -> SubscriptionId {
        self.notifier.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.notifier.unsubscribe(id)
    }

    // ---- transient UI state (never persisted) ----------------------------

    pub fn focus_coordinate(&self) -> Option<Coordinate> {
        self.focus_coordinate
    }

    pub fn set_focus_coordinate(&mut self, coordinate: Option<Coordinate>) {
        self.focus_coordinate = coordinate;
    }

    pub fn take_focus_coordinate(&mut self) -> Option<Coordinate> {
        self.focus_coordinate.take()
    }

    pub fn staged_spot(&self) -> Option<&MemorySpot> {
        self.staged_spot.as_ref()
    }

    pub fn stage_spot(&mut self, spot: Option<MemorySpot>) {
        self.staged_spot = spot;
    }

    pub fn take_staged_spot(&mut self) -> Option<MemorySpot> {
        self.staged_spot.take()
    }

    // ---- internals -------------------------------------------------------

    fn folder_mut(&mut self, id: FolderId) -> Option<&mut Folder> {
        self.root
            .children
            .iter_mut()
            .find_map(|folder| folder.find_folder_mut(id))
    }

    fn commit(&self, event: &'static str) {
        self.write_snapshot(event);
        self.notifier.notify();
    }

    fn write_snapshot(&self, event: &'static str) {
        match self.persist() {
            Ok(()) => info!("event={event} module=store status=ok"),
            Err(err) => error!(
                "event={event} module=store status=error error_code=persist_failed error={err}"
            ),
        }
    }

    fn skip(&self, event: &'static str, reason: &'static str) {
        debug!("event={event} module=store status=skip reason={reason}");
    }
}
