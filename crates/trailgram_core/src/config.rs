//! Store configuration.
//!
//! # Responsibility
//! - Resolve where the forest file and image files live.
//! - Carry the default-folder name used when a forest starts empty.
//!
//! # Invariants
//! - `data_dir` is the only directory the store writes into.
//! - Environment overrides are trimmed; blank values fall back to defaults.

use std::path::PathBuf;

/// Default forest file name inside `data_dir`.
pub const DEFAULT_FOREST_FILE_NAME: &str = "folders.json";
/// Name of the folder synthesized when the forest is empty on load.
pub const DEFAULT_FOLDER_NAME: &str = "My Spots";
/// Default image directory name inside `data_dir`.
pub const DEFAULT_IMAGE_DIR_NAME: &str = "images";

/// Environment variable overriding `data_dir`.
pub const DATA_DIR_ENV: &str = "TRAILGRAM_DATA_DIR";
/// Environment variable overriding `forest_file_name`.
pub const FOREST_FILE_ENV: &str = "TRAILGRAM_FOREST_FILE";

/// Filesystem and naming settings for one folder store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub data_dir: PathBuf,
    pub forest_file_name: String,
    pub default_folder_name: String,
    pub image_dir_name: String,
}

impl StoreConfig {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            forest_file_name: DEFAULT_FOREST_FILE_NAME.to_string(),
            default_folder_name: DEFAULT_FOLDER_NAME.to_string(),
            image_dir_name: DEFAULT_IMAGE_DIR_NAME.to_string(),
        }
    }

    /// Builds config from `TRAILGRAM_DATA_DIR` / `TRAILGRAM_FOREST_FILE`.
    ///
    /// Without `TRAILGRAM_DATA_DIR`, data lives in `<temp_dir>/trailgram`.
    pub fn from_env() -> Self {
        let data_dir = non_blank_env(DATA_DIR_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| std::env::temp_dir().join("trailgram"));
        let mut config = Self::new(data_dir);
        if let Some(file_name) = non_blank_env(FOREST_FILE_ENV) {
            config.forest_file_name = file_name;
        }
        config
    }

    pub fn forest_path(&self) -> PathBuf {
        self.data_dir.join(&self.forest_file_name)
    }

    pub fn image_dir(&self) -> PathBuf {
        self.data_dir.join(&self.image_dir_name)
    }
}

fn non_blank_env(key: &str) -> Option<String> {
    let raw = std::env::var(key).ok()?;
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
