//! Shared types passed between the store, the resolver and the renderers.
//!
//! None of these are persisted: a [`ResourceStat`] is fetched fresh for every
//! render pass and a [`DirectoryEntry`] is derived from one listing call and
//! never mutated afterwards.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// What a store path points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    File,
    Directory,
}

/// Free-form metadata a store attaches to an entry.
///
/// Only three fields carry meaning for rendering; anything else in the
/// backing record is ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Metadata {
    /// Display title used in listings instead of the entry name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// One-line description shown under a file in listings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Navigation target of a `.goto` redirect marker.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
}

impl Metadata {
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_href(mut self, href: impl Into<String>) -> Self {
        self.href = Some(href.into());
        self
    }
}

/// Result of a successful existence probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceStat {
    pub kind: ResourceKind,
    #[serde(with = "time::serde::rfc3339")]
    pub ctime: OffsetDateTime,
    #[serde(skip_serializing_if = "metadata_is_empty")]
    pub metadata: Metadata,
}

fn metadata_is_empty(metadata: &Metadata) -> bool {
    *metadata == Metadata::default()
}

impl ResourceStat {
    pub fn is_file(&self) -> bool {
        self.kind == ResourceKind::File
    }

    pub fn is_directory(&self) -> bool {
        self.kind == ResourceKind::Directory
    }
}

/// One raw entry returned by a directory read, before any filtering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    pub stat: ResourceStat,
}

/// A listing row derived from a [`DirEntry`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectoryEntry {
    pub name: String,
    /// `metadata.title`, falling back to `name`.
    pub title: String,
    pub is_directory: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub ctime: OffsetDateTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}
