//! Shared test utilities for the hyperpage test suite.
//!
//! Provides a ready-made site, lookup helpers that panic with a clear message
//! on a miss, and a converter that records what it was asked to convert.
//!
//! # Usage
//!
//! ```rust,ignore
//! use crate::test_helpers::*;
//!
//! let (rendered, loading) = render_path(sample_site(), "/notes/");
//! let listing = rendered.listing.as_ref().unwrap();
//!
//! assert_listing_shape(listing, &["drafts"], &["latest.md", "older.txt", "README.md"]);
//! let latest = find_entry(listing, "latest.md");
//! assert_eq!(latest.title, "Latest entry");
//! ```

use std::cell::RefCell;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

use crate::config::SiteConfig;
use crate::dispatch::{Dispatcher, RenderPass, Rendered};
use crate::listing::DirectoryListing;
use crate::markdown::{Cmark, MarkupConverter};
use crate::store::MemoryStore;
use crate::types::{DirectoryEntry, Metadata};

// =========================================================================
// Fixture setup
// =========================================================================

/// A small site covering every strategy.
///
/// ```text
/// /index.md
/// /.ui/ui.html
/// /notes/drafts/idea.txt
/// /notes/older.txt          ctime 100
/// /notes/latest.md          ctime 200, titled
/// /notes/.private
/// /notes/README.md
/// /media/cat.png
/// /media/talk.mp4
/// /media/theme.mp3
/// /media/paper.pdf
/// /links/home.goto          href = "/"
/// /links/dead.goto          no href
/// /app.html                 two scripts
/// ```
pub fn sample_site() -> MemoryStore {
    MemoryStore::new()
        .with_file("/index.md", "# Welcome\n\nStart at [notes](/notes/).")
        .with_file("/.ui/ui.html", "<main>renderer</main>")
        .with_file_at("/notes/drafts/idea.txt", "maybe", 50)
        .with_file_at("/notes/older.txt", "old news", 100)
        .with_file_at("/notes/latest.md", "# Latest", 200)
        .with_file("/notes/.private", "hidden")
        .with_file("/notes/README.md", "Notes about *notes*.")
        .with_metadata(
            "/notes/latest.md",
            Metadata::default()
                .with_title("Latest entry")
                .with_description("The newest one"),
        )
        .with_file("/media/cat.png", "")
        .with_file("/media/talk.mp4", "")
        .with_file("/media/theme.mp3", "")
        .with_file("/media/paper.pdf", "")
        .with_file("/links/home.goto", "")
        .with_metadata("/links/home.goto", Metadata::default().with_href("/"))
        .with_file("/links/dead.goto", "")
        .with_file(
            "/app.html",
            "<h1>App</h1><script>boot()</script><script src=\"/vendor.js\"></script>",
        )
}

/// Write `files` (path relative to the root, content) into a fresh temp
/// directory, creating parent directories as needed.
pub fn write_site(files: &[(&str, &str)]) -> TempDir {
    let tmp = TempDir::new().unwrap();
    for (path, content) in files {
        write_file(tmp.path(), path, content);
    }
    tmp
}

pub fn write_file(root: &Path, path: &str, content: &str) {
    let target = root.join(path.trim_start_matches('/'));
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&target, content).unwrap();
}

// =========================================================================
// Rendering shortcuts
// =========================================================================

/// Render `path` once with default config. Returns the view and whether the
/// pass was still loading when it finished.
pub fn render_path(store: MemoryStore, path: &str) -> (Rendered, bool) {
    let dispatcher = Dispatcher::new(store, Cmark::default(), SiteConfig::default());
    let mut pass = RenderPass::new(1, path);
    let rendered = dispatcher
        .render(&mut pass)
        .unwrap_or_else(|e| panic!("rendering {path} failed: {e}"));
    (rendered, pass.is_loading())
}

// =========================================================================
// Listing lookups: panics with a clear message on miss
// =========================================================================

pub fn entry_names(listing: &DirectoryListing) -> Vec<&str> {
    listing.entries.iter().map(|e| e.name.as_str()).collect()
}

/// Find a listing entry by name. Panics if not found.
pub fn find_entry<'a>(listing: &'a DirectoryListing, name: &str) -> &'a DirectoryEntry {
    listing
        .entries
        .iter()
        .find(|e| e.name == name)
        .unwrap_or_else(|| {
            panic!(
                "entry '{name}' not found in {}. Available: {:?}",
                listing.path,
                entry_names(listing)
            )
        })
}

/// Assert the exact directory and file rows of a listing, in order.
pub fn assert_listing_shape(listing: &DirectoryListing, directories: &[&str], files: &[&str]) {
    let actual_dirs: Vec<&str> = listing.directories().map(|e| e.name.as_str()).collect();
    let actual_files: Vec<&str> = listing.files().map(|e| e.name.as_str()).collect();
    assert_eq!(actual_dirs, directories, "directory rows of {}", listing.path);
    assert_eq!(actual_files, files, "file rows of {}", listing.path);
    let first_file = listing.entries.iter().position(|e| !e.is_directory);
    let last_dir = listing.entries.iter().rposition(|e| e.is_directory);
    if let (Some(first_file), Some(last_dir)) = (first_file, last_dir) {
        assert!(last_dir < first_file, "directories must precede files");
    }
}

// =========================================================================
// Recording converter
// =========================================================================

/// Wraps every input in `<converted>` and remembers it.
#[derive(Debug, Default)]
pub struct RecordingConverter {
    inputs: RefCell<Vec<String>>,
}

impl RecordingConverter {
    pub fn inputs(&self) -> Vec<String> {
        self.inputs.borrow().clone()
    }
}

impl MarkupConverter for RecordingConverter {
    fn to_markup(&self, text: &str) -> String {
        self.inputs.borrow_mut().push(text.to_string());
        format!("<converted>{text}</converted>")
    }
}
