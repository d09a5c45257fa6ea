//! Directory listings.
//!
//! A listing is built from one `read_dir` call:
//!
//! 1. Hidden entries (name starts with `.`) are dropped.
//! 2. Each entry's title is its metadata title, or its name.
//! 3. Directories come first, sorted by title in locale order.
//! 4. Files follow, newest first by creation time. Files created at the same
//!    instant keep the order the store returned them in.
//! 5. The first file (in that order) whose name matches one of the configured
//!    readme names, ignoring case, is fetched and embedded under the rows.
//!
//! ## Locale order
//!
//! Titles compare the way a UI collator does for Latin text: accents and case
//! are ignored first (`"é"` sorts with `"e"`, `"B"` with `"b"`), then accents
//! break ties, then lowercase sorts before uppercase.

use crate::markdown::MarkupConverter;
use crate::metadata;
use crate::naming;
use crate::store::{ContentStore, StoreError};
use crate::strategy::MARKDOWN_EXTENSIONS;
use crate::types::{DirEntry, DirectoryEntry};
use maud::{Markup, PreEscaped, html};
use serde::Serialize;
use std::cmp::Ordering;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// A directory's rows plus its embedded readme, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectoryListing {
    /// The listed directory, as navigated.
    pub path: String,
    /// Directories first, then files.
    pub entries: Vec<DirectoryEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub readme: Option<Readme>,
}

impl DirectoryListing {
    pub fn directories(&self) -> impl Iterator<Item = &DirectoryEntry> {
        self.entries.iter().filter(|e| e.is_directory)
    }

    pub fn files(&self) -> impl Iterator<Item = &DirectoryEntry> {
        self.entries.iter().filter(|e| !e.is_directory)
    }

    /// Link target of an entry: its absolute path, with a trailing `/` for
    /// directories.
    pub fn href(&self, entry: &DirectoryEntry) -> String {
        let path = naming::join(&naming::as_directory(&self.path), &entry.name);
        if entry.is_directory {
            naming::as_directory(&path)
        } else {
            path
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Readme {
    pub name: String,
    pub body: ReadmeBody,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "format", content = "content", rename_all = "lowercase")]
pub enum ReadmeBody {
    /// Converted markdown, embedded as raw markup.
    Markup(String),
    /// Anything else, shown verbatim in a `<pre>` block.
    Text(String),
}

fn to_entry(raw: DirEntry) -> DirectoryEntry {
    DirectoryEntry {
        title: metadata::entry_title(&raw.name, &raw.stat.metadata),
        description: metadata::entry_description(&raw.stat.metadata),
        is_directory: raw.stat.is_directory(),
        ctime: raw.stat.ctime,
        name: raw.name,
    }
}

type CollationKey = (String, String, String);

fn collation_key(title: &str) -> CollationKey {
    let primary = title
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect();
    let secondary = title.nfd().flat_map(char::to_lowercase).collect();
    let tertiary = title
        .chars()
        .map(|c| {
            if c.is_lowercase() {
                c.to_uppercase().next().unwrap_or(c)
            } else {
                c.to_lowercase().next().unwrap_or(c)
            }
        })
        .collect();
    (primary, secondary, tertiary)
}

/// Compare two titles in locale order.
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
    collation_key(a).cmp(&collation_key(b))
}

/// Order entries for display: directories by title, then files newest first.
///
/// Both sorts are stable.
pub fn sort_entries(entries: Vec<DirectoryEntry>) -> Vec<DirectoryEntry> {
    let (mut directories, mut files): (Vec<_>, Vec<_>) =
        entries.into_iter().partition(|e| e.is_directory);
    directories.sort_by_cached_key(|e| collation_key(&e.title));
    files.sort_by(|a, b| b.ctime.cmp(&a.ctime));
    directories.extend(files);
    directories
}

/// First file in `entries` whose name matches one of `readme_names`,
/// ignoring case.
pub fn find_readme<'a, N: AsRef<str>>(
    entries: &'a [DirectoryEntry],
    readme_names: &[N],
) -> Option<&'a DirectoryEntry> {
    entries.iter().filter(|e| !e.is_directory).find(|e| {
        readme_names
            .iter()
            .any(|name| name.as_ref().eq_ignore_ascii_case(&e.name))
    })
}

/// Build the listing of directory `dir`.
pub fn build_listing<S, M, N>(
    store: &S,
    converter: &M,
    dir: &str,
    readme_names: &[N],
) -> Result<DirectoryListing, StoreError>
where
    S: ContentStore,
    M: MarkupConverter,
    N: AsRef<str>,
{
    let raw = store.read_dir(dir)?;
    let visible: Vec<DirectoryEntry> = raw
        .into_iter()
        .filter(|e| !naming::is_hidden(&e.name))
        .map(to_entry)
        .collect();
    let entries = sort_entries(visible);

    let readme = match find_readme(&entries, readme_names) {
        Some(entry) => {
            let readme_path = naming::join(&naming::as_directory(dir), &entry.name);
            let text = store.read_file(&readme_path)?;
            let body = if naming::has_extension(&entry.name, MARKDOWN_EXTENSIONS) {
                ReadmeBody::Markup(converter.to_markup(&text))
            } else {
                ReadmeBody::Text(text)
            };
            tracing::debug!(dir, readme = %entry.name, "embedding readme");
            Some(Readme {
                name: entry.name.clone(),
                body,
            })
        }
        None => None,
    };

    Ok(DirectoryListing {
        path: dir.to_string(),
        entries,
        readme,
    })
}

/// Medium date, e.g. `Oct 16, 2026`.
pub fn format_date(ctime: OffsetDateTime) -> String {
    ctime
        .format(format_description!(
            "[month repr:short] [day padding:none], [year]"
        ))
        .unwrap_or_default()
}

pub fn render_listing(listing: &DirectoryListing) -> Markup {
    html! {
        div.listing {
            @for entry in listing.directories() {
                div.entry.directory {
                    div { a href=(listing.href(entry)) title=(entry.title) { (entry.title) } }
                    div { small { "Directory" } }
                }
            }
            @for entry in listing.files() {
                div.entry.file {
                    div { a href=(listing.href(entry)) title=(entry.title) { (entry.title) } }
                    @if let Some(description) = &entry.description {
                        div.description { (description) }
                    }
                    div {
                        small {
                            time datetime=(entry.ctime.format(&Rfc3339).unwrap_or_default()) {
                                (format_date(entry.ctime))
                            }
                        }
                    }
                }
            }
        }
        @if let Some(readme) = &listing.readme {
            div.readme data-name=(readme.name) {
                @match &readme.body {
                    ReadmeBody::Markup(markup) => { (PreEscaped(markup)) }
                    ReadmeBody::Text(text) => { pre { (text) } }
                }
            }
        }
    }
}
