use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use trailgram_core::{
    Coordinate, Folder, FolderStore, MemoryForestRepository, MemorySpot, StoreConfig,
    ROOT_FOLDER_ID,
};
use uuid::Uuid;

fn open(repo: &MemoryForestRepository) -> FolderStore<&MemoryForestRepository> {
    FolderStore::open(repo, &StoreConfig::new("/unused"))
}

fn spot(title: &str) -> MemorySpot {
    MemorySpot::new(title, "", Coordinate::new(35.0, 139.0))
}

fn count_notifications(store: &mut FolderStore<&MemoryForestRepository>) -> Arc<AtomicUsize> {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    store.subscribe(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    calls
}

fn snapshot_views(
    store: &FolderStore<&MemoryForestRepository>,
) -> (Vec<Folder>, Vec<MemorySpot>) {
    (
        store.flattened_folders().into_iter().cloned().collect(),
        store.flattened_spots().into_iter().cloned().collect(),
    )
}

#[test]
fn japan_trip_scenario() {
    let repo = MemoryForestRepository::new();
    let mut store = open(&repo);
    let root_id = store.folders()[0].id();
    assert_eq!(store.folders()[0].name, "My Spots");

    let japan_id = store.add_subfolder("Japan 2024", root_id).unwrap();
    assert_eq!(store.flattened_folders().len(), 2);

    let shibuya = MemorySpot::new("Shibuya", "", Coordinate::new(35.6595, 139.7005));
    assert!(store.append_spot(shibuya.clone(), japan_id));
    assert_eq!(store.flattened_spots(), vec![&shibuya]);
    assert_eq!(store.find_folder_id(shibuya.id()), Some(japan_id));

    assert!(store.delete_folder(japan_id));
    assert_eq!(store.flattened_folders().len(), 1);
    assert_eq!(store.flattened_folders()[0].id(), root_id);
    assert!(store.flattened_spots().is_empty());
}

#[test]
fn ids_stay_unique_after_many_inserts() {
    let repo = MemoryForestRepository::new();
    let mut store = open(&repo);
    let mut parent = store.folders()[0].id();

    for depth in 0..5 {
        store.add_root_folder(format!("Root {depth}"));
        parent = store.add_subfolder(format!("Level {depth}"), parent).unwrap();
        assert!(store.append_spot(spot("a"), parent));
        assert!(store.append_spot(spot("b"), parent));
    }

    let folder_ids = store
        .flattened_folders()
        .into_iter()
        .map(Folder::id)
        .collect::<Vec<_>>();
    let unique_folders = folder_ids.iter().collect::<HashSet<_>>();
    assert_eq!(folder_ids.len(), unique_folders.len());

    let spot_ids = store
        .flattened_spots()
        .into_iter()
        .map(MemorySpot::id)
        .collect::<Vec<_>>();
    let unique_spots = spot_ids.iter().collect::<HashSet<_>>();
    assert_eq!(spot_ids.len(), 10);
    assert_eq!(spot_ids.len(), unique_spots.len());
}

#[test]
fn append_spot_rejects_reused_spot_id() {
    let repo = MemoryForestRepository::new();
    let mut store = open(&repo);
    let root_id = store.folders()[0].id();
    let other_id = store.add_root_folder("Other");
    let existing = spot("Once");

    assert!(store.append_spot(existing.clone(), root_id));
    assert!(!store.append_spot(existing.clone(), other_id));
    assert_eq!(store.flattened_spots().len(), 1);
    assert_eq!(store.find_folder_id(existing.id()), Some(root_id));
}

#[test]
fn added_subfolder_is_reachable_through_parent_chain() {
    let repo = MemoryForestRepository::new();
    let mut store = open(&repo);
    let root_id = store.folders()[0].id();
    let europe_id = store.add_subfolder("Europe", root_id).unwrap();
    let paris_id = store.add_subfolder("Paris", europe_id).unwrap();

    let paris = store
        .flattened_folders()
        .into_iter()
        .find(|folder| folder.name == "Paris")
        .expect("Paris should be listed");
    assert_eq!(paris.id(), paris_id);

    let chain = store.parent_chain(paris_id).unwrap();
    assert_eq!(chain, vec![root_id, europe_id, paris_id]);
    assert_eq!(store.folder_at_path(&chain).map(Folder::id), Some(paris_id));
}

#[test]
fn add_subfolder_with_unknown_parent_is_noop() {
    let repo = MemoryForestRepository::new();
    let mut store = open(&repo);
    let saves = repo.save_count();

    assert!(store.add_subfolder("Lost", Uuid::new_v4()).is_none());
    assert_eq!(store.flattened_folders().len(), 1);
    assert_eq!(repo.save_count(), saves);
}

#[test]
fn delete_folder_removes_all_descendants_and_spots() {
    let repo = MemoryForestRepository::new();
    let mut store = open(&repo);
    let root_id = store.folders()[0].id();
    let asia_id = store.add_subfolder("Asia", root_id).unwrap();
    let japan_id = store.add_subfolder("Japan", asia_id).unwrap();
    let tokyo_id = store.add_subfolder("Tokyo", japan_id).unwrap();
    let kept_id = store.add_subfolder("Kept", root_id).unwrap();

    let asia_spot = spot("Asia spot");
    let tokyo_spot = spot("Tokyo spot");
    let kept_spot = spot("Kept spot");
    assert!(store.append_spot(asia_spot.clone(), asia_id));
    assert!(store.append_spot(tokyo_spot.clone(), tokyo_id));
    assert!(store.append_spot(kept_spot.clone(), kept_id));

    assert!(store.delete_folder(asia_id));

    let folder_ids = store
        .flattened_folders()
        .into_iter()
        .map(Folder::id)
        .collect::<HashSet<_>>();
    for gone in [asia_id, japan_id, tokyo_id] {
        assert!(!folder_ids.contains(&gone));
    }
    assert!(folder_ids.contains(&kept_id));

    let spot_ids = store
        .flattened_spots()
        .into_iter()
        .map(MemorySpot::id)
        .collect::<Vec<_>>();
    assert_eq!(spot_ids, vec![kept_spot.id()]);
    assert!(store.find_folder_id(tokyo_spot.id()).is_none());
    assert!(store.find_folder_id(asia_spot.id()).is_none());
}

#[test]
fn deleting_a_root_removes_it_from_top_level() {
    let repo = MemoryForestRepository::new();
    let mut store = open(&repo);
    let second = store.add_root_folder("Second");

    assert!(store.delete_folder(second));
    assert_eq!(store.folders().len(), 1);
    assert!(store.folder(second).is_none());
}

#[test]
fn move_spot_preserves_count_and_updates_owner() {
    let repo = MemoryForestRepository::new();
    let mut store = open(&repo);
    let root_id = store.folders()[0].id();
    let nested_id = store.add_subfolder("Nested", root_id).unwrap();
    let deep_id = store.add_subfolder("Deep", nested_id).unwrap();

    let moving = spot("Moving");
    assert!(store.append_spot(moving.clone(), root_id));
    assert!(store.append_spot(spot("Staying"), nested_id));
    let before = store.flattened_spots().len();

    assert!(store.move_spot(moving.id(), deep_id));
    assert_eq!(store.flattened_spots().len(), before);
    assert_eq!(store.find_folder_id(moving.id()), Some(deep_id));
}

#[test]
fn move_spot_to_missing_destination_keeps_spot_in_place() {
    let repo = MemoryForestRepository::new();
    let mut store = open(&repo);
    let root_id = store.folders()[0].id();
    let first = spot("First");
    let second = spot("Second");
    assert!(store.append_spot(first.clone(), root_id));
    assert!(store.append_spot(second.clone(), root_id));
    let saves = repo.save_count();

    assert!(!store.move_spot(first.id(), Uuid::new_v4()));
    assert!(!store.move_spot(first.id(), ROOT_FOLDER_ID));
    assert_eq!(store.find_folder_id(first.id()), Some(root_id));
    assert_eq!(store.folders()[0].spots, vec![first, second]);
    assert_eq!(repo.save_count(), saves);
}

#[test]
fn move_spot_into_current_owner_is_noop() {
    let repo = MemoryForestRepository::new();
    let mut store = open(&repo);
    let root_id = store.folders()[0].id();
    let first = spot("First");
    assert!(store.append_spot(first.clone(), root_id));
    assert!(store.append_spot(spot("Second"), root_id));

    assert!(!store.move_spot(first.id(), root_id));
    assert_eq!(store.folders()[0].spots[0].id(), first.id());
}

#[test]
fn mutations_with_unknown_ids_change_nothing_and_stay_silent() {
    let repo = MemoryForestRepository::new();
    let mut store = open(&repo);
    let root_id = store.folders()[0].id();
    let known = spot("Known");
    assert!(store.append_spot(known.clone(), root_id));
    store.add_subfolder("Child", root_id).unwrap();

    let calls = count_notifications(&mut store);
    let saves = repo.save_count();
    let before = snapshot_views(&store);
    let missing = Uuid::new_v4();

    assert!(store.add_subfolder("X", missing).is_none());
    assert!(!store.rename_folder(missing, "X"));
    assert!(!store.delete_folder(missing));
    assert!(!store.replace_folder(Folder::with_id(missing, "X")));
    assert!(!store.append_spot(spot("X"), missing));
    assert!(store.remove_spot(missing).is_none());
    assert!(!store.update_spot(MemorySpot::with_id(
        missing,
        "X",
        "",
        Coordinate::new(0.0, 0.0)
    )));
    assert!(!store.attach_image(missing, "x.jpg"));
    assert!(!store.move_spot(missing, root_id));

    assert_eq!(snapshot_views(&store), before);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(repo.save_count(), saves);
}

#[test]
fn successful_mutations_notify_and_persist_once_each() {
    let repo = MemoryForestRepository::new();
    let mut store = open(&repo);
    let calls = count_notifications(&mut store);
    let saves = repo.save_count();
    let root_id = store.folders()[0].id();

    let child_id = store.add_subfolder("Child", root_id).unwrap();
    assert!(store.rename_folder(child_id, "Renamed"));
    let item = spot("Item");
    assert!(store.append_spot(item.clone(), child_id));

    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert_eq!(repo.save_count(), saves + 3);
    assert_eq!(repo.snapshot().unwrap(), store.folders().to_vec());
}

#[test]
fn rename_twice_with_same_name_matches_single_rename() {
    let repo = MemoryForestRepository::new();
    let mut store = open(&repo);
    let root_id = store.folders()[0].id();

    assert!(store.rename_folder(root_id, "Travels"));
    let once = store.folders().to_vec();
    assert!(store.rename_folder(root_id, "Travels"));
    assert_eq!(store.folders().to_vec(), once);
    assert_eq!(store.folder_name(root_id), Some("Travels"));
}

#[test]
fn rename_reaches_nested_folder() {
    let repo = MemoryForestRepository::new();
    let mut store = open(&repo);
    let root_id = store.folders()[0].id();
    let a = store.add_subfolder("A", root_id).unwrap();
    let b = store.add_subfolder("B", a).unwrap();

    assert!(store.rename_folder(b, "Bee"));
    assert_eq!(store.folder_name(b), Some("Bee"));
    assert_eq!(store.folders()[0].children[0].children[0].name, "Bee");
}

#[test]
fn update_spot_keeps_position() {
    let repo = MemoryForestRepository::new();
    let mut store = open(&repo);
    let root_id = store.folders()[0].id();
    let first = spot("First");
    let second = spot("Second");
    let third = spot("Third");
    for item in [&first, &second, &third] {
        assert!(store.append_spot(item.clone(), root_id));
    }

    let mut edited = second.clone();
    edited.title = "Second (edited)".to_string();
    edited.description = "new note".to_string();
    assert!(store.update_spot(edited.clone()));

    let titles = store.folders()[0]
        .spots
        .iter()
        .map(|item| item.title.as_str())
        .collect::<Vec<_>>();
    assert_eq!(titles, vec!["First", "Second (edited)", "Third"]);
    assert_eq!(store.spot(second.id()), Some(&edited));
}

#[test]
fn remove_spot_returns_removed_value() {
    let repo = MemoryForestRepository::new();
    let mut store = open(&repo);
    let root_id = store.folders()[0].id();
    let nested_id = store.add_subfolder("Nested", root_id).unwrap();
    let item = spot("Item");
    assert!(store.append_spot(item.clone(), nested_id));

    assert_eq!(store.remove_spot(item.id()), Some(item.clone()));
    assert!(store.spot(item.id()).is_none());
    assert!(store.remove_spot(item.id()).is_none());
}

#[test]
fn attach_image_sets_reference() {
    let repo = MemoryForestRepository::new();
    let mut store = open(&repo);
    let root_id = store.folders()[0].id();
    let item = spot("Photo");
    assert!(store.append_spot(item.clone(), root_id));

    assert!(store.attach_image(item.id(), "abc.jpg"));
    assert_eq!(
        store.spot(item.id()).and_then(|s| s.image_reference.as_deref()),
        Some("abc.jpg")
    );
}

#[test]
fn replace_folder_swaps_whole_subtree() {
    let repo = MemoryForestRepository::new();
    let mut store = open(&repo);
    let root_id = store.folders()[0].id();
    let trip_id = store.add_subfolder("Trip", root_id).unwrap();
    let old_child = store.add_subfolder("Old day", trip_id).unwrap();

    let mut updated = store.folder(trip_id).unwrap().clone();
    updated.name = "Trip (edited)".to_string();
    updated.children.clear();
    updated.children.push(Folder::new("New day"));
    let kept_spot = spot("Kept");
    updated.spots.push(kept_spot.clone());

    assert!(store.replace_folder(updated));
    let trip = store.folder(trip_id).unwrap();
    assert_eq!(trip.name, "Trip (edited)");
    assert_eq!(trip.children.len(), 1);
    assert_eq!(trip.children[0].name, "New day");
    assert!(store.folder(old_child).is_none());
    assert_eq!(store.find_folder_id(kept_spot.id()), Some(trip_id));
}

#[test]
fn replace_folder_rejects_ids_used_elsewhere() {
    let repo = MemoryForestRepository::new();
    let mut store = open(&repo);
    let root_id = store.folders()[0].id();
    let left_id = store.add_subfolder("Left", root_id).unwrap();
    let right_id = store.add_subfolder("Right", root_id).unwrap();
    let right_spot = spot("Right spot");
    assert!(store.append_spot(right_spot.clone(), right_id));

    let mut stealing_spot = store.folder(left_id).unwrap().clone();
    stealing_spot.spots.push(right_spot.clone());
    assert!(!store.replace_folder(stealing_spot));

    let mut stealing_folder = store.folder(left_id).unwrap().clone();
    stealing_folder.children.push(Folder::with_id(right_id, "Copy"));
    assert!(!store.replace_folder(stealing_folder));

    assert!(store.folder(left_id).unwrap().is_empty());
    assert_eq!(store.find_folder_id(right_spot.id()), Some(right_id));
}

#[test]
fn folder_at_path_resolves_each_segment() {
    let repo = MemoryForestRepository::new();
    let mut store = open(&repo);
    let root_id = store.folders()[0].id();
    let a = store.add_subfolder("A", root_id).unwrap();
    let b = store.add_subfolder("B", a).unwrap();

    assert_eq!(store.folder_at_path(&[]).map(Folder::id), Some(ROOT_FOLDER_ID));
    assert_eq!(store.folder_at_path(&[root_id, a, b]).map(Folder::id), Some(b));
    assert!(store.folder_at_path(&[a]).is_none());
    assert!(store.folder_at_path(&[root_id, b]).is_none());
}

#[test]
fn flattened_views_are_pre_order() {
    let repo = MemoryForestRepository::new();
    let mut store = open(&repo);
    let first_root = store.folders()[0].id();
    let child = store.add_subfolder("Child", first_root).unwrap();
    let second_root = store.add_root_folder("Second");

    let s_child = spot("child");
    let s_root = spot("root");
    let s_second = spot("second");
    assert!(store.append_spot(s_child.clone(), child));
    assert!(store.append_spot(s_second.clone(), second_root));
    assert!(store.append_spot(s_root.clone(), first_root));

    let folder_order = store
        .flattened_folders()
        .into_iter()
        .map(Folder::id)
        .collect::<Vec<_>>();
    assert_eq!(folder_order, vec![first_root, child, second_root]);

    let spot_order = store
        .flattened_spots()
        .into_iter()
        .map(MemorySpot::id)
        .collect::<Vec<_>>();
    assert_eq!(spot_order, vec![s_root.id(), s_child.id(), s_second.id()]);
}

#[test]
fn unsubscribed_listener_stops_receiving() {
    let repo = MemoryForestRepository::new();
    let mut store = open(&repo);
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let subscription = store.subscribe(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    store.add_root_folder("One");
    assert!(store.unsubscribe(subscription));
    store.add_root_folder("Two");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn non_finite_coordinates_never_enter_the_forest() {
    let repo = MemoryForestRepository::new();
    let mut store = open(&repo);
    let folder_id = store.folders()[0].id();
    let kept = spot("Pier");
    assert!(store.append_spot(kept.clone(), folder_id));
    let saves = repo.save_count();
    let calls = count_notifications(&mut store);

    let drifting = MemorySpot::new("Drift", "", Coordinate::new(f64::NAN, 2.0));
    assert!(!store.append_spot(drifting, folder_id));

    let mut moved = kept.clone();
    moved.coordinate = Coordinate::new(1.0, f64::INFINITY);
    assert!(!store.update_spot(moved));

    let mut subtree = store.folder(folder_id).unwrap().clone();
    subtree.spots.push(MemorySpot::new(
        "Void",
        "",
        Coordinate::new(f64::NEG_INFINITY, 0.0),
    ));
    assert!(!store.replace_folder(subtree));

    assert_eq!(store.flattened_spots().len(), 1);
    assert_eq!(store.spot(kept.id()).unwrap().coordinate, kept.coordinate);
    assert_eq!(repo.save_count(), saves);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn synthetic_root_id_is_not_accepted_as_spot_id() {
    let repo = MemoryForestRepository::new();
    let mut store = open(&repo);
    let folder_id = store.folders()[0].id();

    let reserved = MemorySpot::with_id(ROOT_FOLDER_ID, "Nil", "", Coordinate::new(0.0, 0.0));
    assert!(!store.append_spot(reserved.clone(), folder_id));

    let mut subtree = store.folder(folder_id).unwrap().clone();
    subtree.spots.push(reserved);
    assert!(!store.replace_folder(subtree));
    assert!(store.flattened_spots().is_empty());
}
