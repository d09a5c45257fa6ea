//! CLI output formatting.
//!
//! # Information-First Display
//!
//! Every entity leads with its semantic identity (title, or the navigated
//! path) on a header line, with store paths and details on indented context
//! lines underneath. The same helpers are used by every command so a
//! resolution and a listing of the same directory read alike.
//!
//! # Output Format
//!
//! ## Resolve
//!
//! ```text
//! /docs/ → /docs/index.md
//!     Kind: file
//!     Strategy: markup
//!     Created: Oct 8, 2026
//! ```
//!
//! ## Listing
//!
//! ```text
//! /docs/
//! 001 Alpha/
//!     Source: alpha/
//! 002 Fresh
//!     Source: new.txt
//!     Description: Just written
//!     Created: Oct 8, 2026
//!
//! Readme: README.md
//!     Docs for the docs
//! ```
//!
//! ## Scripts
//!
//! ```text
//! 001 text/javascript inline (12 bytes)
//! 002 module external /app.js
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure: no I/O, no side effects.

use crate::listing::{DirectoryListing, ReadmeBody, format_date};
use crate::resolve::Resolution;
use crate::script::{ScriptPayload, ScriptSource};
use crate::strategy::RenderStrategy;
use crate::types::ResourceKind;

/// Longest readme preview shown under a listing.
const PREVIEW_CHARS: usize = 60;

// ============================================================================
// Shared entity display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Format an entity header: positional index + title.
///
/// ```text
/// 001 Landscapes
/// ```
fn entity_header(index: usize, title: &str) -> String {
    format!("{} {}", format_index(index), title)
}

/// Format an indented `Label: value` context line.
fn context_line(label: &str, value: &str) -> String {
    format!("{}{}: {}", indent(1), label, value)
}

/// Strip HTML tags from a string (simple angle-bracket stripping).
fn strip_html_tags(html: &str) -> String {
    let mut result = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => result.push(c),
            _ => {}
        }
    }
    result
}

/// Truncate text to `max` characters, appending `...` if truncated.
fn truncate_desc(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let kept: String = text.chars().take(max).collect();
        format!("{}...", kept)
    }
}

/// First non-blank line of a readme, tags stripped.
fn readme_preview(body: &ReadmeBody) -> Option<String> {
    let text = match body {
        ReadmeBody::Markup(html) => strip_html_tags(html),
        ReadmeBody::Text(text) => text.clone(),
    };
    text.lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(|line| truncate_desc(line, PREVIEW_CHARS))
}

// ============================================================================
// Resolve
// ============================================================================

/// Format a resolution and the strategy chosen for it.
pub fn format_resolution(
    path: &str,
    resolution: &Resolution,
    strategy: RenderStrategy,
) -> Vec<String> {
    let mut lines = Vec::new();
    match resolution {
        Resolution::Missing => {
            lines.push(format!("{} → missing", path));
        }
        Resolution::Found(resource) => {
            lines.push(format!("{} → {}", path, resource.path));
            let kind = match resource.kind {
                ResourceKind::File => "file",
                ResourceKind::Directory => "directory",
            };
            lines.push(context_line("Kind", kind));
        }
    }
    lines.push(context_line("Strategy", strategy.name()));

    if let Some(resource) = resolution.found() {
        lines.push(context_line("Created", &format_date(resource.stat.ctime)));
        let metadata = &resource.stat.metadata;
        if let Some(title) = &metadata.title {
            lines.push(context_line("Title", title));
        }
        if let Some(description) = &metadata.description {
            lines.push(context_line("Description", description));
        }
        if let Some(href) = &metadata.href {
            lines.push(context_line("Href", href));
        }
    }
    lines
}

pub fn print_resolution(path: &str, resolution: &Resolution, strategy: RenderStrategy) {
    for line in format_resolution(path, resolution, strategy) {
        println!("{}", line);
    }
}

// ============================================================================
// Listing
// ============================================================================

/// Format a directory listing: directories then files, then the readme.
pub fn format_listing(listing: &DirectoryListing) -> Vec<String> {
    let mut lines = vec![listing.path.clone()];

    for (i, entry) in listing.entries.iter().enumerate() {
        if entry.is_directory {
            lines.push(entity_header(i + 1, &format!("{}/", entry.title)));
            lines.push(context_line("Source", &format!("{}/", entry.name)));
        } else {
            lines.push(entity_header(i + 1, &entry.title));
            lines.push(context_line("Source", &entry.name));
            if let Some(description) = &entry.description {
                lines.push(context_line("Description", description));
            }
            lines.push(context_line("Created", &format_date(entry.ctime)));
        }
    }

    if listing.entries.is_empty() {
        lines.push(format!("{}(empty)", indent(1)));
    }

    if let Some(readme) = &listing.readme {
        lines.push(String::new());
        lines.push(format!("Readme: {}", readme.name));
        if let Some(preview) = readme_preview(&readme.body) {
            lines.push(format!("{}{}", indent(1), preview));
        }
    }
    lines
}

pub fn print_listing(listing: &DirectoryListing) {
    for line in format_listing(listing) {
        println!("{}", line);
    }
}

// ============================================================================
// Scripts
// ============================================================================

/// Format re-activated scripts, one line each, in execution order.
pub fn format_scripts(scripts: &[ScriptPayload]) -> Vec<String> {
    if scripts.is_empty() {
        return vec!["No scripts".to_string()];
    }
    scripts
        .iter()
        .enumerate()
        .map(|(i, script)| {
            let source = match &script.source {
                ScriptSource::Inline(text) => format!("inline ({} bytes)", text.len()),
                ScriptSource::External(src) => format!("external {}", src),
                ScriptSource::Empty => "empty".to_string(),
            };
            format!("{} {} {}", format_index(i + 1), script.script_type, source)
        })
        .collect()
}

pub fn print_scripts(scripts: &[ScriptPayload]) {
    for line in format_scripts(scripts) {
        println!("{}", line);
    }
}
