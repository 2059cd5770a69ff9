//! Core domain logic for Trailgram.
//! This crate is the single source of truth for folder-tree invariants.

pub mod codec;
pub mod config;
pub mod image;
pub mod logging;
pub mod model;
pub mod notify;
pub mod repo;
pub mod service;

pub use codec::{decode_forest, encode_forest, CodecError};
pub use config::StoreConfig;
pub use image::{ImageStore, ImageStoreError, ImageStoreResult, LocalImageStore};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::coordinate::Coordinate;
pub use model::folder::{Folder, FolderId, ROOT_FOLDER_ID, ROOT_FOLDER_NAME};
pub use model::spot::{MemorySpot, SpotId};
pub use notify::{ChangeNotifier, SubscriptionId};
pub use repo::forest_repo::{
    ForestRepoError, ForestRepoResult, ForestRepository, JsonFileForestRepository,
    MemoryForestRepository,
};
pub use service::folder_store::FolderStore;

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
