//! Forest persistence contracts and implementations.
//!
//! # Responsibility
//! - Load and save the whole root-folder sequence as one snapshot.
//! - Keep file layout and codec details inside the repository boundary.
//!
//! # Invariants
//! - `save` overwrites the previous snapshot as a whole; there is no
//!   partial/incremental write.
//! - `load` returns `Ok(None)` when nothing was ever persisted.
//! - File writes go through a sibling temp file and a rename, so a reader
//!   never observes a half-written snapshot.

use crate::codec::{decode_forest, encode_forest, CodecError};
use crate::model::folder::Folder;
use log::{error, info};
use std::cell::{Cell, RefCell};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Result type used by forest repository operations.
pub type ForestRepoResult<T> = Result<T, ForestRepoError>;

/// Errors from forest repository operations.
#[derive(Debug)]
pub enum ForestRepoError {
    /// Filesystem read/write failure.
    Io { path: PathBuf, source: io::Error },
    /// Snapshot bytes could not be encoded or decoded.
    Codec(CodecError),
    /// In-memory repository configured to reject writes.
    WriteRejected,
}

impl Display for ForestRepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "forest file `{}`: {source}", path.display()),
            Self::Codec(err) => write!(f, "{err}"),
            Self::WriteRejected => write!(f, "forest write rejected"),
        }
    }
}

impl Error for ForestRepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Codec(err) => Some(err),
            Self::WriteRejected => None,
        }
    }
}

impl From<CodecError> for ForestRepoError {
    fn from(value: CodecError) -> Self {
        Self::Codec(value)
    }
}

/// Snapshot persistence for the folder forest.
pub trait ForestRepository {
    /// Loads the last saved forest, or `None` when no snapshot exists.
    fn load(&self) -> ForestRepoResult<Option<Vec<Folder>>>;
    /// Replaces the persisted snapshot with `forest`.
    fn save(&self, forest: &[Folder]) -> ForestRepoResult<()>;
}

impl<R: ForestRepository + ?Sized> ForestRepository for &R {
    fn load(&self) -> ForestRepoResult<Option<Vec<Folder>>> {
        (**self).load()
    }

    fn save(&self, forest: &[Folder]) -> ForestRepoResult<()> {
        (**self).save(forest)
    }
}

/// JSON file repository storing the forest in one file.
#[derive(Debug, Clone)]
pub struct JsonFileForestRepository {
    path: PathBuf,
}

impl JsonFileForestRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|value| value.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn io_error(&self, path: &Path, source: io::Error) -> ForestRepoError {
        ForestRepoError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

impl ForestRepository for JsonFileForestRepository {
    fn load(&self) -> ForestRepoResult<Option<Vec<Folder>>> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(self.io_error(&self.path, err)),
        };
        Ok(Some(decode_forest(&bytes)?))
    }

    fn save(&self, forest: &[Folder]) -> ForestRepoResult<()> {
        let started_at = Instant::now();
        let bytes = encode_forest(forest)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|err| self.io_error(parent, err))?;
            }
        }

        let temp_path = self.temp_path();
        let result = std::fs::write(&temp_path, &bytes)
            .map_err(|err| self.io_error(&temp_path, err))
            .and_then(|()| {
                std::fs::rename(&temp_path, &self.path)
                    .map_err(|err| self.io_error(&self.path, err))
            });

        match &result {
            Ok(()) => info!(
                "event=forest_save module=repo status=ok roots={} bytes={} duration_ms={}",
                forest.len(),
                bytes.len(),
                started_at.elapsed().as_millis()
            ),
            Err(err) => {
                let _ = std::fs::remove_file(&temp_path);
                error!(
                    "event=forest_save module=repo status=error duration_ms={} error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
            }
        }
        result
    }
}

/// In-process repository holding the last saved snapshot.
///
/// Used by tests and by callers that want a store without a file.
#[derive(Debug, Default)]
pub struct MemoryForestRepository {
    snapshot: RefCell<Option<Vec<Folder>>>,
    save_count: Cell<usize>,
    reject_writes: Cell<bool>,
}

impl MemoryForestRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a repository that already holds `forest` as its snapshot.
    pub fn with_snapshot(forest: Vec<Folder>) -> Self {
        let repo = Self::default();
        repo.snapshot.replace(Some(forest));
        repo
    }

    /// Last saved snapshot, if any.
    pub fn snapshot(&self) -> Option<Vec<Folder>> {
        self.snapshot.borrow().clone()
    }

    /// Number of successful `save` calls.
    pub fn save_count(&self) -> usize {
        self.save_count.get()
    }

    /// Makes subsequent `save` calls fail with [`ForestRepoError::WriteRejected`].
    pub fn set_reject_writes(&self, reject: bool) {
        self.reject_writes.set(reject);
    }
}

impl ForestRepository for MemoryForestRepository {
    fn load(&self) -> ForestRepoResult<Option<Vec<Folder>>> {
        Ok(self.snapshot.borrow().clone())
    }

    fn save(&self, forest: &[Folder]) -> ForestRepoResult<()> {
        if self.reject_writes.get() {
            return Err(ForestRepoError::WriteRejected);
        }
        self.snapshot.replace(Some(forest.to_vec()));
        self.save_count.set(self.save_count.get() + 1);
        Ok(())
    }
}
