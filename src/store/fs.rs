//! Filesystem-backed content store.

use super::{ContentStore, StoreError};
use crate::metadata;
use crate::naming;
use crate::types::{DirEntry, Metadata, ResourceKind, ResourceStat};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use time::OffsetDateTime;

/// A content store over a directory on disk.
///
/// Navigated paths map onto the root: `/notes/today.md` reads
/// `<root>/notes/today.md`. Paths containing `..` are rejected.
///
/// `ctime` is the file's creation time where the platform reports one, the
/// modification time otherwise. Metadata is read from the `.meta.toml`
/// sidecar of the entry's parent directory (see [`crate::metadata`]). A
/// sidecar that cannot be parsed fails `read_dir` on its directory, while
/// `stat` logs a warning and falls back to empty metadata.
#[derive(Debug, Clone)]
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a navigated path onto the filesystem, keeping a trailing `/` so
    /// the OS rejects a file probed as a directory.
    fn locate(&self, path: &str) -> Result<PathBuf, StoreError> {
        let segments =
            naming::segments(path).ok_or_else(|| StoreError::InvalidPath(path.to_string()))?;
        let mut located = self.root.clone();
        for segment in &segments {
            located.push(segment);
        }
        if naming::is_directory_path(path) && !segments.is_empty() {
            located.as_mut_os_string().push("/");
        }
        Ok(located)
    }

    fn sidecar(&self, dir: &Path, path: &str) -> Result<BTreeMap<String, Metadata>, StoreError> {
        metadata::read_sidecar(dir).map_err(|source| StoreError::Metadata {
            path: path.to_string(),
            source,
        })
    }

    /// Metadata of `name` from its parent's sidecar. The root has none.
    fn entry_metadata(&self, path: &str) -> Result<Metadata, StoreError> {
        let Some(normalized) = naming::normalize(path) else {
            return Err(StoreError::InvalidPath(path.to_string()));
        };
        if normalized == "/" {
            return Ok(Metadata::default());
        }
        let parent = naming::parent(&normalized);
        let name = naming::file_name(&normalized);
        let parent_dir = self.locate(parent)?;
        Ok(self
            .sidecar(&parent_dir, parent)?
            .remove(name)
            .unwrap_or_default())
    }
}

fn stat_from(fs_meta: &fs::Metadata, metadata: Metadata) -> ResourceStat {
    let kind = if fs_meta.is_dir() {
        ResourceKind::Directory
    } else {
        ResourceKind::File
    };
    let ctime = fs_meta
        .created()
        .or_else(|_| fs_meta.modified())
        .map(OffsetDateTime::from)
        .unwrap_or(OffsetDateTime::UNIX_EPOCH);
    ResourceStat {
        kind,
        ctime,
        metadata,
    }
}

impl ContentStore for FsStore {
    fn stat(&self, path: &str) -> Result<ResourceStat, StoreError> {
        let located = self.locate(path)?;
        let fs_meta = fs::metadata(&located).map_err(|e| StoreError::io(path, e))?;
        let metadata = match self.entry_metadata(path) {
            Ok(metadata) => metadata,
            Err(err @ StoreError::Metadata { .. }) => {
                tracing::warn!(path, error = %err, "ignoring unreadable sidecar");
                Metadata::default()
            }
            Err(err) => return Err(err),
        };
        Ok(stat_from(&fs_meta, metadata))
    }

    fn read_dir(&self, path: &str) -> Result<Vec<DirEntry>, StoreError> {
        let located = self.locate(path)?;
        let mut sidecar = self.sidecar(&located, path)?;

        let mut entries = Vec::new();
        for entry in fs::read_dir(&located).map_err(|e| StoreError::io(path, e))? {
            let entry = entry.map_err(|e| StoreError::io(path, e))?;
            let name = entry.file_name().to_string_lossy().into_owned();
            let fs_meta = fs::metadata(entry.path())
                .map_err(|e| StoreError::io(&naming::join(path, &name), e))?;
            let metadata = sidecar.remove(&name).unwrap_or_default();
            entries.push(DirEntry {
                stat: stat_from(&fs_meta, metadata),
                name,
            });
        }

        // OS order is arbitrary; sort by name so listings with equal ctimes
        // are reproducible.
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    fn read_file(&self, path: &str) -> Result<String, StoreError> {
        let located = self.locate(path)?;
        let bytes = fs::read(&located).map_err(|e| StoreError::io(path, e))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::write_site;
    use tempfile::TempDir;

    fn site() -> (TempDir, FsStore) {
        let tmp = write_site(&[
            ("notes/today.md", "# Today"),
            ("hello.txt", "hello"),
            (
                metadata::SIDECAR_NAME,
                "[\"notes\"]\ntitle = \"Notebook\"\n\n[\"hello.txt\"]\ndescription = \"Greeting\"\n",
            ),
        ]);
        let store = FsStore::new(tmp.path());
        (tmp, store)
    }

    #[test]
    fn stat_file_and_directory() {
        let (_tmp, store) = site();
        assert!(store.stat("/hello.txt").unwrap().is_file());
        assert!(store.stat("/notes").unwrap().is_directory());
        assert!(store.stat("/notes/").unwrap().is_directory());
        assert!(store.stat("/").unwrap().is_directory());
    }

    #[test]
    fn stat_missing_is_not_found() {
        let (_tmp, store) = site();
        assert!(store.stat("/nope.md").unwrap_err().is_not_found());
    }

    #[test]
    fn stat_file_with_trailing_slash_fails() {
        let (_tmp, store) = site();
        assert!(store.stat("/hello.txt/").is_err());
    }

    #[test]
    fn stat_reads_metadata_from_parent_sidecar() {
        let (_tmp, store) = site();
        let stat = store.stat("/notes/").unwrap();
        assert_eq!(stat.metadata.title.as_deref(), Some("Notebook"));
        let stat = store.stat("/hello.txt").unwrap();
        assert_eq!(stat.metadata.description.as_deref(), Some("Greeting"));
    }

    #[test]
    fn parent_segments_are_rejected() {
        let (_tmp, store) = site();
        assert!(matches!(
            store.stat("/../etc/passwd"),
            Err(StoreError::InvalidPath(_))
        ));
    }

    #[test]
    fn read_dir_includes_hidden_entries_sorted_by_name() {
        let (_tmp, store) = site();
        let names: Vec<String> = store
            .read_dir("/")
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(names, vec![".meta.toml", "hello.txt", "notes"]);
    }

    #[test]
    fn read_dir_attaches_metadata() {
        let (_tmp, store) = site();
        let entries = store.read_dir("/").unwrap();
        let notes = entries.iter().find(|e| e.name == "notes").unwrap();
        assert!(notes.stat.is_directory());
        assert_eq!(notes.stat.metadata.title.as_deref(), Some("Notebook"));
    }

    #[test]
    fn read_file_returns_content() {
        let (_tmp, store) = site();
        assert_eq!(store.read_file("/notes/today.md").unwrap(), "# Today");
    }

    #[test]
    fn invalid_sidecar_is_metadata_error() {
        let (tmp, store) = site();
        fs::write(tmp.path().join("notes").join(metadata::SIDECAR_NAME), "[oops").unwrap();
        assert!(matches!(
            store.read_dir("/notes/"),
            Err(StoreError::Metadata { .. })
        ));
    }

    #[test]
    fn invalid_sidecar_keeps_entries_reachable() {
        let (tmp, store) = site();
        fs::write(tmp.path().join("notes").join(metadata::SIDECAR_NAME), "[oops").unwrap();
        let stat = store.stat("/notes/today.md").unwrap();
        assert!(stat.is_file());
        assert_eq!(stat.metadata, Metadata::default());
    }
}
