//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `trailgram_core` linkage.
//! - Optionally open a data directory and summarize its folder forest.
//!
//! Usage: `trailgram_cli [DATA_DIR]`

use trailgram_core::{FolderStore, StoreConfig};

fn main() {
    println!("trailgram_core ping={}", trailgram_core::ping());
    println!("trailgram_core version={}", trailgram_core::core_version());

    let Some(data_dir) = std::env::args().nth(1) else {
        return;
    };

    // Opening creates the default folder file when the directory is empty.
    let config = StoreConfig::new(data_dir);
    let store = FolderStore::open_file(&config);
    println!("forest path={}", config.forest_path().display());
    println!("roots={}", store.folders().len());
    println!("folders={}", store.flattened_folders().len());
    let spots = store.flattened_spots();
    println!("spots={}", spots.len());
    println!(
        "photos={}",
        spots.iter().filter(|spot| spot.has_image()).count()
    );
    for folder in store.folders() {
        println!(
            "- {} ({} spots total)",
            folder.name,
            folder.all_spots().len()
        );
    }
}
