//! In-memory content store.

use super::{ContentStore, StoreError};
use crate::naming;
use crate::types::{DirEntry, Metadata, ResourceKind, ResourceStat};
use std::cell::RefCell;
use time::OffsetDateTime;

/// A store call, as recorded by [`MemoryStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    Stat(String),
    ReadDir(String),
    ReadFile(String),
}

#[derive(Debug, Clone)]
struct Node {
    path: String,
    kind: ResourceKind,
    ctime: OffsetDateTime,
    metadata: Metadata,
    content: String,
    unreadable: bool,
}

impl Node {
    fn stat(&self) -> ResourceStat {
        ResourceStat {
            kind: self.kind,
            ctime: self.ctime,
            metadata: self.metadata.clone(),
        }
    }
}

/// In-memory store for tests and embedders.
///
/// Entries keep insertion order, which is also the order `read_dir` returns
/// them in. Parent directories are created implicitly. Every call is
/// recorded and can be inspected with [`calls`](Self::calls).
///
/// The store is single-threaded: call recording uses a `RefCell`.
///
/// ```
/// use hyperpage::store::{ContentStore, MemoryStore};
///
/// let store = MemoryStore::new()
///     .with_file("/notes/today.md", "# Today")
///     .with_file("/hello.txt", "hello");
///
/// assert!(store.stat("/notes/").unwrap().is_directory());
/// assert_eq!(store.read_file("/hello.txt").unwrap(), "hello");
/// ```
#[derive(Debug, Default)]
pub struct MemoryStore {
    nodes: Vec<Node>,
    calls: RefCell<Vec<StoreCall>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file with creation time at the Unix epoch.
    pub fn with_file(self, path: &str, content: impl Into<String>) -> Self {
        self.with_file_at(path, content, 0)
    }

    /// Add a file with an explicit creation time in Unix seconds.
    ///
    /// # Panics
    ///
    /// Panics if `path` is not a valid navigated path or `ctime` is out of range.
    pub fn with_file_at(mut self, path: &str, content: impl Into<String>, ctime: i64) -> Self {
        let path = naming::normalize(path).unwrap_or_else(|| panic!("invalid path {path}"));
        self.ensure_parents(&path);
        self.upsert(Node {
            path,
            kind: ResourceKind::File,
            ctime: unix(ctime),
            metadata: Metadata::default(),
            content: content.into(),
            unreadable: false,
        });
        self
    }

    /// Add an empty directory.
    pub fn with_dir(self, path: &str) -> Self {
        self.with_dir_at(path, 0)
    }

    /// Add an empty directory with an explicit creation time in Unix seconds.
    ///
    /// # Panics
    ///
    /// Panics if `path` is not a valid navigated path or `ctime` is out of range.
    pub fn with_dir_at(mut self, path: &str, ctime: i64) -> Self {
        let path = naming::normalize(path).unwrap_or_else(|| panic!("invalid path {path}"));
        self.ensure_parents(&path);
        if path != "/" {
            self.upsert(Node {
                path,
                kind: ResourceKind::Directory,
                ctime: unix(ctime),
                metadata: Metadata::default(),
                content: String::new(),
                unreadable: false,
            });
        }
        self
    }

    /// Attach metadata to an existing entry.
    ///
    /// # Panics
    ///
    /// Panics if no entry exists at `path`.
    pub fn with_metadata(mut self, path: &str, metadata: Metadata) -> Self {
        self.node_mut(path).metadata = metadata;
        self
    }

    /// Make reads of an existing entry fail while probes still succeed.
    ///
    /// # Panics
    ///
    /// Panics if no entry exists at `path`.
    pub fn with_unreadable(mut self, path: &str) -> Self {
        self.node_mut(path).unreadable = true;
        self
    }

    /// All calls made so far, oldest first.
    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls.borrow().clone()
    }

    /// Forget the recorded calls.
    pub fn clear_calls(&self) {
        self.calls.borrow_mut().clear();
    }

    fn node_mut(&mut self, path: &str) -> &mut Node {
        let key = naming::normalize(path).unwrap_or_default();
        self.nodes
            .iter_mut()
            .find(|n| n.path == key)
            .unwrap_or_else(|| panic!("no entry at {path}"))
    }

    fn upsert(&mut self, node: Node) {
        match self.nodes.iter_mut().find(|n| n.path == node.path) {
            Some(existing) => *existing = node,
            None => self.nodes.push(node),
        }
    }

    fn ensure_parents(&mut self, path: &str) {
        let parent = naming::parent(path);
        if parent == "/" || self.nodes.iter().any(|n| n.path == parent) {
            return;
        }
        self.ensure_parents(parent);
        self.nodes.push(Node {
            path: parent.to_string(),
            kind: ResourceKind::Directory,
            ctime: OffsetDateTime::UNIX_EPOCH,
            metadata: Metadata::default(),
            content: String::new(),
            unreadable: false,
        });
    }

    fn record(&self, call: StoreCall) {
        self.calls.borrow_mut().push(call);
    }

    /// Look a path up, honoring the trailing-slash-means-directory rule.
    fn lookup(&self, path: &str) -> Result<Option<&Node>, StoreError> {
        let key =
            naming::normalize(path).ok_or_else(|| StoreError::InvalidPath(path.to_string()))?;
        if key == "/" {
            return Ok(None);
        }
        let node = self
            .nodes
            .iter()
            .find(|n| n.path == key)
            .ok_or_else(|| StoreError::NotFound(path.to_string()))?;
        if naming::is_directory_path(path) && node.kind == ResourceKind::File {
            return Err(StoreError::NotADirectory(path.to_string()));
        }
        Ok(Some(node))
    }
}

fn unix(secs: i64) -> OffsetDateTime {
    OffsetDateTime::from_unix_timestamp(secs)
        .unwrap_or_else(|_| panic!("timestamp {secs} out of range"))
}

fn root_stat() -> ResourceStat {
    ResourceStat {
        kind: ResourceKind::Directory,
        ctime: OffsetDateTime::UNIX_EPOCH,
        metadata: Metadata::default(),
    }
}

impl ContentStore for MemoryStore {
    fn stat(&self, path: &str) -> Result<ResourceStat, StoreError> {
        self.record(StoreCall::Stat(path.to_string()));
        Ok(self.lookup(path)?.map(Node::stat).unwrap_or_else(root_stat))
    }

    fn read_dir(&self, path: &str) -> Result<Vec<DirEntry>, StoreError> {
        self.record(StoreCall::ReadDir(path.to_string()));
        let key = match self.lookup(path)? {
            None => "/".to_string(),
            Some(node) if node.kind == ResourceKind::File => {
                return Err(StoreError::NotADirectory(path.to_string()));
            }
            Some(node) if node.unreadable => {
                return Err(StoreError::Io {
                    path: path.to_string(),
                    source: std::io::Error::other("unreadable"),
                });
            }
            Some(node) => node.path.clone(),
        };
        Ok(self
            .nodes
            .iter()
            .filter(|n| naming::parent(&n.path) == key)
            .map(|n| DirEntry {
                name: naming::file_name(&n.path).to_string(),
                stat: n.stat(),
            })
            .collect())
    }

    fn read_file(&self, path: &str) -> Result<String, StoreError> {
        self.record(StoreCall::ReadFile(path.to_string()));
        match self.lookup(path)? {
            None => Err(StoreError::IsADirectory(path.to_string())),
            Some(node) if node.kind == ResourceKind::Directory => {
                Err(StoreError::IsADirectory(path.to_string()))
            }
            Some(node) if node.unreadable => Err(StoreError::Io {
                path: path.to_string(),
                source: std::io::Error::other("unreadable"),
            }),
            Some(node) => Ok(node.content.clone()),
        }
    }
}
