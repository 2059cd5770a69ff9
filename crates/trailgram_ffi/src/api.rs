//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose stable, use-case-level folder/spot functions to Dart via FRB.
//! - Own the one process-wide `FolderStore` and serialize access to it.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Ids cross the boundary as hyphenated UUID strings.
//! - At most one store mutation (and therefore one file write) runs at a time.

use log::warn;
use std::sync::{Mutex, MutexGuard, PoisonError};
use trailgram_core::{
    core_version as core_version_inner, encode_forest, init_logging as init_logging_inner,
    ping as ping_inner, Coordinate, Folder, FolderId, FolderStore, ImageStore,
    JsonFileForestRepository, LocalImageStore, MemorySpot, StoreConfig,
};
use uuid::Uuid;

struct ActiveStore {
    config: StoreConfig,
    store: FolderStore<JsonFileForestRepository>,
}

static ACTIVE_STORE: Mutex<Option<ActiveStore>> = Mutex::new(None);

/// Minimal health-check API for FRB smoke integration.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Generic action response envelope for store mutations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreActionResponse {
    /// Whether the mutation was applied.
    pub ok: bool,
    /// Created/affected id (or image reference for `store_image`).
    pub id: Option<String>,
    /// Human-readable response message for diagnostics/UI.
    pub message: String,
}

impl StoreActionResponse {
    fn success(message: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            ok: true,
            id: Some(id.into()),
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            id: None,
            message: message.into(),
        }
    }

    fn from_applied(applied: bool, id: String, ok_message: &str, noop_message: &str) -> Self {
        if applied {
            Self::success(ok_message, id)
        } else {
            Self::failure(noop_message)
        }
    }
}

/// Flattened folder row for list/picker screens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderItem {
    pub id: String,
    /// `None` for top-level folders.
    pub parent_id: Option<String>,
    pub name: String,
    /// Zero for top-level folders.
    pub depth: u32,
    /// Spots held directly by this folder.
    pub spot_count: u32,
}

/// Flattened spot row for map/list screens.
#[derive(Debug, Clone, PartialEq)]
pub struct SpotItem {
    pub id: String,
    pub folder_id: String,
    pub title: String,
    pub description: String,
    pub latitude: f64,
    pub longitude: f64,
    pub created_at_ms: i64,
    pub image_reference: Option<String>,
}

/// Opens (or re-opens) the process-wide store under `data_dir`.
///
/// Any previously open store is replaced. Returns the first root folder id.
#[flutter_rust_bridge::frb(sync)]
pub fn store_open(data_dir: String) -> StoreActionResponse {
    let trimmed = data_dir.trim();
    if trimmed.is_empty() {
        return StoreActionResponse::failure("store_open failed: data_dir must not be empty");
    }
    let config = StoreConfig::new(trimmed);
    let store = FolderStore::open_file(&config);
    let first_root = store
        .folders()
        .first()
        .map(|folder| folder.id().to_string())
        .unwrap_or_default();
    *lock_active() = Some(ActiveStore { config, store });
    StoreActionResponse::success("Store opened.", first_root)
}

/// Returns the whole forest as its persisted JSON text.
#[flutter_rust_bridge::frb(sync)]
pub fn folders_json() -> String {
    with_active(|active| match encode_forest(active.store.folders()) {
        Ok(bytes) => String::from_utf8(bytes).unwrap_or_default(),
        Err(err) => {
            warn!("event=ffi_folders_json module=ffi status=error error={err}");
            String::new()
        }
    })
}

/// Lists every folder pre-order with parent ids and depth.
#[flutter_rust_bridge::frb(sync)]
pub fn list_folders() -> Vec<FolderItem> {
    with_active(|active| {
        let mut items = Vec::new();
        for root in active.store.folders() {
            collect_folder_items(root, None, 0, &mut items);
        }
        items
    })
}

/// Lists every spot pre-order with its owning folder id.
#[flutter_rust_bridge::frb(sync)]
pub fn list_spots() -> Vec<SpotItem> {
    with_active(|active| {
        active
            .store
            .flattened_folders()
            .into_iter()
            .flat_map(|folder| {
                folder
                    .spots
                    .iter()
                    .map(move |spot| to_spot_item(spot, folder.id()))
            })
            .collect()
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn add_root_folder(name: String) -> StoreActionResponse {
    let Some(name) = normalize_display_name(&name) else {
        return StoreActionResponse::failure("add_root_folder failed: name must not be blank");
    };
    with_active(|active| {
        let id = active.store.add_root_folder(name);
        StoreActionResponse::success("Folder created.", id.to_string())
    })
}

/// Creates a folder under `parent_id`; the nil UUID targets the top level.
#[flutter_rust_bridge::frb(sync)]
pub fn add_subfolder(name: String, parent_id: String) -> StoreActionResponse {
    let Some(name) = normalize_display_name(&name) else {
        return StoreActionResponse::failure("add_subfolder failed: name must not be blank");
    };
    let parent_id = match parse_id(&parent_id, "parent_id") {
        Ok(id) => id,
        Err(response) => return response,
    };
    with_active(|active| match active.store.add_subfolder(name, parent_id) {
        Some(id) => StoreActionResponse::success("Folder created.", id.to_string()),
        None => StoreActionResponse::failure("Parent folder not found."),
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn rename_folder(folder_id: String, name: String) -> StoreActionResponse {
    let Some(name) = normalize_display_name(&name) else {
        return StoreActionResponse::failure("rename_folder failed: name must not be blank");
    };
    let id = match parse_id(&folder_id, "folder_id") {
        Ok(id) => id,
        Err(response) => return response,
    };
    with_active(|active| {
        let applied = active.store.rename_folder(id, name);
        StoreActionResponse::from_applied(
            applied,
            id.to_string(),
            "Folder renamed.",
            "Folder not found.",
        )
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn delete_folder(folder_id: String) -> StoreActionResponse {
    let id = match parse_id(&folder_id, "folder_id") {
        Ok(id) => id,
        Err(response) => return response,
    };
    with_active(|active| {
        let applied = active.store.delete_folder(id);
        StoreActionResponse::from_applied(
            applied,
            id.to_string(),
            "Folder deleted.",
            "Folder not found.",
        )
    })
}

/// Creates a spot in `folder_id` and returns its new id.
#[flutter_rust_bridge::frb(sync)]
pub fn append_spot(
    folder_id: String,
    title: String,
    description: String,
    latitude: f64,
    longitude: f64,
    image_reference: Option<String>,
) -> StoreActionResponse {
    let folder_id = match parse_id(&folder_id, "folder_id") {
        Ok(id) => id,
        Err(response) => return response,
    };
    let coordinate = match parse_coordinate(latitude, longitude) {
        Ok(coordinate) => coordinate,
        Err(response) => return response,
    };
    let mut spot = MemorySpot::new(title.trim(), description, coordinate);
    spot.image_reference = image_reference.filter(|value| !value.trim().is_empty());
    let spot_id = spot.id();

    with_active(|active| {
        let applied = active.store.append_spot(spot, folder_id);
        if applied {
            active.store.set_focus_coordinate(Some(coordinate));
        }
        StoreActionResponse::from_applied(
            applied,
            spot_id.to_string(),
            "Spot saved.",
            "Folder not found.",
        )
    })
}

/// Edits title, note and coordinate; keeps creation time and photo.
#[flutter_rust_bridge::frb(sync)]
pub fn update_spot(
    spot_id: String,
    title: String,
    description: String,
    latitude: f64,
    longitude: f64,
) -> StoreActionResponse {
    let spot_id = match parse_id(&spot_id, "spot_id") {
        Ok(id) => id,
        Err(response) => return response,
    };
    let coordinate = match parse_coordinate(latitude, longitude) {
        Ok(coordinate) => coordinate,
        Err(response) => return response,
    };
    with_active(|active| {
        let Some(mut spot) = active.store.spot(spot_id).cloned() else {
            return StoreActionResponse::failure("Spot not found.");
        };
        spot.title = title.trim().to_string();
        spot.description = description;
        spot.coordinate = coordinate;
        let applied = active.store.update_spot(spot);
        StoreActionResponse::from_applied(
            applied,
            spot_id.to_string(),
            "Spot updated.",
            "Spot not found.",
        )
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn remove_spot(spot_id: String) -> StoreActionResponse {
    let spot_id = match parse_id(&spot_id, "spot_id") {
        Ok(id) => id,
        Err(response) => return response,
    };
    with_active(|active| match active.store.remove_spot(spot_id) {
        Some(_) => StoreActionResponse::success("Spot deleted.", spot_id.to_string()),
        None => StoreActionResponse::failure("Spot not found."),
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn move_spot(spot_id: String, folder_id: String) -> StoreActionResponse {
    let spot_id = match parse_id(&spot_id, "spot_id") {
        Ok(id) => id,
        Err(response) => return response,
    };
    let folder_id = match parse_id(&folder_id, "folder_id") {
        Ok(id) => id,
        Err(response) => return response,
    };
    with_active(|active| {
        let applied = active.store.move_spot(spot_id, folder_id);
        StoreActionResponse::from_applied(
            applied,
            spot_id.to_string(),
            "Spot moved.",
            "Spot or destination not found, or spot already there.",
        )
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn attach_image(spot_id: String, image_reference: String) -> StoreActionResponse {
    let spot_id = match parse_id(&spot_id, "spot_id") {
        Ok(id) => id,
        Err(response) => return response,
    };
    let reference = image_reference.trim();
    if reference.is_empty() {
        return StoreActionResponse::failure("attach_image failed: reference must not be blank");
    }
    with_active(|active| {
        let applied = active.store.attach_image(spot_id, reference);
        StoreActionResponse::from_applied(
            applied,
            spot_id.to_string(),
            "Image attached.",
            "Spot not found.",
        )
    })
}

/// Saves photo bytes next to the forest file; `id` carries the reference.
#[flutter_rust_bridge::frb(sync)]
pub fn store_image(bytes: Vec<u8>) -> StoreActionResponse {
    with_active(|active| {
        let images = LocalImageStore::new(active.config.image_dir());
        match images.store_image(&bytes) {
            Ok(reference) => StoreActionResponse::success("Image stored.", reference),
            Err(err) => StoreActionResponse::failure(format!("store_image failed: {err}")),
        }
    })
}

/// Returns the owning folder id of a spot, if any.
#[flutter_rust_bridge::frb(sync)]
pub fn find_folder_id(spot_id: String) -> Option<String> {
    let spot_id = Uuid::parse_str(spot_id.trim()).ok()?;
    with_active(|active| active.store.find_folder_id(spot_id).map(|id| id.to_string()))
}

#[flutter_rust_bridge::frb(sync)]
pub fn folder_name(folder_id: String) -> Option<String> {
    let folder_id = Uuid::parse_str(folder_id.trim()).ok()?;
    with_active(|active| active.store.folder_name(folder_id).map(str::to_owned))
}

fn lock_active() -> MutexGuard<'static, Option<ActiveStore>> {
    ACTIVE_STORE
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
}

fn with_active<T>(f: impl FnOnce(&mut ActiveStore) -> T) -> T {
    let mut guard = lock_active();
    let active = guard.get_or_insert_with(|| {
        let config = StoreConfig::from_env();
        let store = FolderStore::open_file(&config);
        ActiveStore { config, store }
    });
    f(active)
}

fn parse_id(value: &str, field: &str) -> Result<Uuid, StoreActionResponse> {
    Uuid::parse_str(value.trim())
        .map_err(|_| StoreActionResponse::failure(format!("invalid {field}: `{value}`")))
}

fn parse_coordinate(latitude: f64, longitude: f64) -> Result<Coordinate, StoreActionResponse> {
    if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
        return Err(StoreActionResponse::failure(format!(
            "coordinate out of range: latitude={latitude} longitude={longitude}"
        )));
    }
    Ok(Coordinate::new(latitude, longitude))
}

fn normalize_display_name(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn collect_folder_items(
    folder: &Folder,
    parent_id: Option<FolderId>,
    depth: u32,
    out: &mut Vec<FolderItem>,
) {
    out.push(FolderItem {
        id: folder.id().to_string(),
        parent_id: parent_id.map(|id| id.to_string()),
        name: folder.name.clone(),
        depth,
        spot_count: folder.spots.len() as u32,
    });
    for child in &folder.children {
        collect_folder_items(child, Some(folder.id()), depth + 1, out);
    }
}

fn to_spot_item(spot: &MemorySpot, folder_id: FolderId) -> SpotItem {
    SpotItem {
        id: spot.id().to_string(),
        folder_id: folder_id.to_string(),
        title: spot.title.clone(),
        description: spot.description.clone(),
        latitude: spot.coordinate.latitude,
        longitude: spot.coordinate.longitude,
        created_at_ms: spot.created_at,
        image_reference: spot.image_reference.clone(),
    }
}
