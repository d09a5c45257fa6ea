//! The content store the pipeline reads from.
//!
//! The resolver and the renderers only ever need three operations, captured
//! by [`ContentStore`]:
//!
//! | Operation | Used by |
//! |-----------|---------|
//! | [`stat`](ContentStore::stat) | existence probes in [`crate::resolve`] |
//! | [`read_dir`](ContentStore::read_dir) | [`crate::listing`] |
//! | [`read_file`](ContentStore::read_file) | markup, plaintext and readme fetches |
//!
//! All paths are navigated paths (`/`-separated, absolute). A trailing `/`
//! asks for a directory: statting `/notes.md/` fails even if `/notes.md`
//! exists.
//!
//! Two backends ship with the crate:
//!
//! - [`FsStore`]: a directory on disk, metadata from `.meta.toml` sidecars.
//! - [`MemoryStore`]: in-memory, records every call. Used by tests and by
//!   embedders that already hold their content in memory.

mod fs;
mod memory;

pub use fs::FsStore;
pub use memory::{MemoryStore, StoreCall};

use crate::metadata::MetadataError;
use crate::types::{DirEntry, ResourceStat};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Not a directory: {0}")]
    NotADirectory(String),
    #[error("Is a directory: {0}")]
    IsADirectory(String),
    #[error("Invalid path: {0}")]
    InvalidPath(String),
    #[error("IO error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Metadata error at {path}: {source}")]
    Metadata {
        path: String,
        #[source]
        source: MetadataError,
    },
}

impl StoreError {
    /// Map an I/O error to the matching variant, keeping the navigated path.
    pub fn io(path: &str, err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound(path.to_string()),
            std::io::ErrorKind::NotADirectory => Self::NotADirectory(path.to_string()),
            std::io::ErrorKind::IsADirectory => Self::IsADirectory(path.to_string()),
            _ => Self::Io {
                path: path.to_string(),
                source: err,
            },
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// A path-addressable content store.
pub trait ContentStore {
    /// Probe a path. Fails if nothing exists there.
    fn stat(&self, path: &str) -> Result<ResourceStat, StoreError>;

    /// List a directory with the stat of every entry, hidden ones included.
    fn read_dir(&self, path: &str) -> Result<Vec<DirEntry>, StoreError>;

    /// Read a file's raw content.
    fn read_file(&self, path: &str) -> Result<String, StoreError>;
}

impl<T: ContentStore + ?Sized> ContentStore for &T {
    fn stat(&self, path: &str) -> Result<ResourceStat, StoreError> {
        (**self).stat(path)
    }

    fn read_dir(&self, path: &str) -> Result<Vec<DirEntry>, StoreError> {
        (**self).read_dir(path)
    }

    fn read_file(&self, path: &str) -> Result<String, StoreError> {
        (**self).read_file(path)
    }
}

impl<T: ContentStore + ?Sized> ContentStore for Box<T> {
    fn stat(&self, path: &str) -> Result<ResourceStat, StoreError> {
        (**self).stat(path)
    }

    fn read_dir(&self, path: &str) -> Result<Vec<DirEntry>, StoreError> {
        (**self).read_dir(path)
    }

    fn read_file(&self, path: &str) -> Result<String, StoreError> {
        (**self).read_file(path)
    }
}
