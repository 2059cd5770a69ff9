//! Image store collaborator.
//!
//! # Responsibility
//! - Persist raw photo bytes and hand back an opaque reference.
//! - Resolve references back to readable locations.
//!
//! # Invariants
//! - The folder store only ever sees references, never image bytes.
//! - References produced by `LocalImageStore` are bare file names; anything
//!   containing a path separator is rejected.

use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io;
use std::path::PathBuf;
use uuid::Uuid;

const IMAGE_EXTENSION: &str = "jpg";

/// Result type used by image store operations.
pub type ImageStoreResult<T> = Result<T, ImageStoreError>;

/// Errors from image store operations.
#[derive(Debug)]
pub enum ImageStoreError {
    /// Payload had zero bytes.
    EmptyImage,
    /// Reference is not a bare file name produced by this store.
    InvalidReference(String),
    /// Filesystem failure.
    Io { path: PathBuf, source: io::Error },
}

impl Display for ImageStoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyImage => write!(f, "image payload is empty"),
            Self::InvalidReference(value) => write!(f, "invalid image reference `{value}`"),
            Self::Io { path, source } => write!(f, "image file `{}`: {source}", path.display()),
        }
    }
}

impl Error for ImageStoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::EmptyImage => None,
            Self::InvalidReference(_) => None,
        }
    }
}

/// Storage for spot photos.
pub trait ImageStore {
    /// Stores `bytes` and returns the reference to put on a spot.
    fn store_image(&self, bytes: &[u8]) -> ImageStoreResult<String>;
    /// Resolves a reference to a path, if it names an existing image.
    fn image_path(&self, reference: &str) -> Option<PathBuf>;
    /// Deletes the image. Returns `false` when nothing was stored under it.
    fn remove_image(&self, reference: &str) -> ImageStoreResult<bool>;
}

/// Image store writing `<uuid>.jpg` files into one directory.
#[derive(Debug, Clone)]
pub struct LocalImageStore {
    dir: PathBuf,
}

impl LocalImageStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn resolve(&self, reference: &str) -> ImageStoreResult<PathBuf> {
        let trimmed = reference.trim();
        if trimmed.is_empty()
            || trimmed.contains(['/', '\\'])
            || trimmed == "."
            || trimmed == ".."
        {
            return Err(ImageStoreError::InvalidReference(reference.to_string()));
        }
        Ok(self.dir.join(trimmed))
    }
}

impl ImageStore for LocalImageStore {
    fn store_image(&self, bytes: &[u8]) -> ImageStoreResult<String> {
        if bytes.is_empty() {
            return Err(ImageStoreError::EmptyImage);
        }
        std::fs::create_dir_all(&self.dir).map_err(|source| ImageStoreError::Io {
            path: self.dir.clone(),
            source,
        })?;

        let reference = format!("{}.{IMAGE_EXTENSION}", Uuid::new_v4());
        let path = self.dir.join(&reference);
        std::fs::write(&path, bytes).map_err(|source| ImageStoreError::Io {
            path: path.clone(),
            source,
        })?;

        info!(
            "event=image_store module=image status=ok bytes={}",
            bytes.len()
        );
        Ok(reference)
    }

    fn image_path(&self, reference: &str) -> Option<PathBuf> {
        let path = self.resolve(reference).ok()?;
        path.is_file().then_some(path)
    }

    fn remove_image(&self, reference: &str) -> ImageStoreResult<bool> {
        let path = self.resolve(reference)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                warn!("event=image_remove module=image status=skip reason=not_found");
                Ok(false)
            }
            Err(source) => Err(ImageStoreError::Io { path, source }),
        }
    }
}
