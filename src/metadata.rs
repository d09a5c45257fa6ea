//! Entry metadata: sidecar loading and field resolution.
//!
//! A content directory carries metadata for its entries in one hidden sidecar
//! file, `.meta.toml`, a table keyed by entry name:
//!
//! ```toml
//! ["notes.md"]
//! title = "Field notes"
//! description = "Things I wrote down"
//!
//! ["elsewhere.goto"]
//! href = "https://example.com/"
//! ```
//!
//! The sidecar starts with a dot, so it is itself hidden from listings. A
//! directory's own metadata lives in its parent's sidecar, under its name.
//!
//! ## Resolution priority
//!
//! Each displayed field is resolved independently, the first non-empty value
//! wins:
//!
//! - **Title**: `metadata.title` → entry name
//! - **Description**: `metadata.description` → None

use crate::types::Metadata;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Name of the per-directory metadata sidecar.
pub const SIDECAR_NAME: &str = ".meta.toml";

#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Resolve a metadata field from multiple sources.
///
/// Takes a list of optional values in priority order and returns the first
/// non-None, non-empty value.
///
/// ```text
/// title: resolve(&[metadata.title, Some(name)])
/// ```
pub fn resolve(sources: &[Option<&str>]) -> Option<String> {
    sources
        .iter()
        .filter_map(|opt| {
            opt.map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
        })
        .next()
}

/// Display title of an entry: its metadata title, or its name.
pub fn entry_title(name: &str, metadata: &Metadata) -> String {
    resolve(&[metadata.title.as_deref(), Some(name)]).unwrap_or_else(|| name.to_string())
}

/// Non-empty description of an entry, if any.
pub fn entry_description(metadata: &Metadata) -> Option<String> {
    resolve(&[metadata.description.as_deref()])
}

/// Parse sidecar TOML text into a per-entry table.
pub fn parse_sidecar(content: &str) -> Result<BTreeMap<String, Metadata>, MetadataError> {
    Ok(toml::from_str(content)?)
}

/// Read the `.meta.toml` sidecar of a directory.
///
/// Returns an empty table when the directory has no sidecar.
pub fn read_sidecar(dir: &Path) -> Result<BTreeMap<String, Metadata>, MetadataError> {
    let sidecar = dir.join(SIDECAR_NAME);
    if !sidecar.exists() {
        return Ok(BTreeMap::new());
    }
    let content = fs::read_to_string(sidecar)?;
    parse_sidecar(&content)
}
