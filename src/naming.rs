//! Centralized parsing for navigated paths and entry names.
//!
//! Every component works with the same path convention: navigated paths are
//! absolute, `/`-separated, and a trailing `/` means "this names a directory,
//! resolve its index". This module keeps all of the string handling for that
//! convention in one place:
//!
//! - `"/"` → root directory
//! - `"/notes/"` → directory `notes`, resolve its index
//! - `"/notes/today.md"` → file `today.md`, extension `md`
//! - `"/.ui/ui.html"` → hidden directory `.ui`, file `ui.html`
//!
//! ## Extensions
//!
//! Extensions are taken from the final segment only, after its last dot, and
//! lowercased. A dotfile such as `.goto` therefore has the extension `goto`,
//! matching how the redirect marker is recognized.

/// Whether the navigated path asks for a directory (ends with `/`).
pub fn is_directory_path(path: &str) -> bool {
    path.ends_with('/')
}

/// Entries whose name starts with `.` are hidden from listings.
pub fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}

/// Last segment of a path. Empty for a directory path such as `/notes/`.
pub fn file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Lowercased extension of the final path segment, if it has one.
pub fn extension(path: &str) -> Option<String> {
    let name = file_name(path);
    name.rfind('.')
        .map(|dot| &name[dot + 1..])
        .filter(|ext| !ext.is_empty())
        .map(str::to_ascii_lowercase)
}

/// Whether `path` ends in one of `extensions` (compared case-insensitively).
pub fn has_extension(path: &str, extensions: &[&str]) -> bool {
    extension(path).is_some_and(|ext| extensions.contains(&ext.as_str()))
}

/// Append an entry name to a directory path.
///
/// - `join("/", "a.md")` → `"/a.md"`
/// - `join("/docs/", "a.md")` → `"/docs/a.md"`
/// - `join("/docs", "a.md")` → `"/docs/a.md"`
pub fn join(dir: &str, name: &str) -> String {
    if dir.ends_with('/') {
        format!("{dir}{name}")
    } else {
        format!("{dir}/{name}")
    }
}

/// Ensure a directory path ends with a single `/`.
pub fn as_directory(path: &str) -> String {
    if path.ends_with('/') {
        path.to_string()
    } else {
        format!("{path}/")
    }
}

/// Split a path into its non-empty segments, dropping `.` segments.
///
/// Returns `None` if any segment is `..`; navigated paths never climb above
/// the site root.
pub fn segments(path: &str) -> Option<Vec<&str>> {
    let mut parts = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => return None,
            other => parts.push(other),
        }
    }
    Some(parts)
}

/// Canonical form used as a lookup key: leading `/`, no trailing `/`.
///
/// `"/docs/"`, `"docs"` and `"/docs"` all normalize to `"/docs"`; the root
/// normalizes to `"/"`.
pub fn normalize(path: &str) -> Option<String> {
    let parts = segments(path)?;
    Some(format!("/{}", parts.join("/")))
}

/// Parent directory of a normalized path (`"/a/b"` → `"/a"`, `"/a"` → `"/"`).
pub fn parent(path: &str) -> &str {
    match path.rfind('/') {
        Some(0) | None => "/",
        Some(pos) => &path[..pos],
    }
}

/// Resolve a redirect target against the page it was found on.
///
/// Site-absolute targets (`/x`) are returned as-is, relative targets are
/// joined onto the directory of `base`. Targets carrying a scheme
/// (`https://…`) leave the site and yield `None`.
pub fn resolve_href(base: &str, href: &str) -> Option<String> {
    if href.contains("://") || href.starts_with("//") {
        return None;
    }
    if href.starts_with('/') {
        return Some(href.to_string());
    }
    let dir = match base.rfind('/') {
        Some(pos) => &base[..=pos],
        None => "/",
    };
    Some(format!("{dir}{href}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directory_paths_end_with_slash() {
        assert!(is_directory_path("/"));
        assert!(is_directory_path("/notes/"));
        assert!(!is_directory_path("/notes"));
    }

    #[test]
    fn hidden_names_start_with_dot() {
        assert!(is_hidden(".meta.toml"));
        assert!(is_hidden(".ui"));
        assert!(!is_hidden("readme.md"));
    }

    #[test]
    fn file_name_is_last_segment() {
        assert_eq!(file_name("/papers/research.pdf"), "research.pdf");
        assert_eq!(file_name("/notes/"), "");
        assert_eq!(file_name("plain"), "plain");
    }

    #[test]
    fn extension_is_lowercased() {
        assert_eq!(extension("/photos/Dawn.JPG").as_deref(), Some("jpg"));
        assert_eq!(extension("/a/b.tar.gz").as_deref(), Some("gz"));
        assert_eq!(extension("/README"), None);
        assert_eq!(extension("/trailing."), None);
    }

    #[test]
    fn extension_only_looks_at_final_segment() {
        assert_eq!(extension("/v1.2/notes"), None);
        assert_eq!(extension("/clips.mov/index"), None);
    }

    #[test]
    fn dotfile_extension() {
        assert_eq!(extension("/.goto").as_deref(), Some("goto"));
    }

    #[test]
    fn has_extension_ignores_case() {
        assert!(has_extension("/a/B.PNG", &["png", "jpg"]));
        assert!(!has_extension("/a/b.png.txt", &["png"]));
    }

    #[test]
    fn join_handles_trailing_slash() {
        assert_eq!(join("/", "a.md"), "/a.md");
        assert_eq!(join("/docs/", "a.md"), "/docs/a.md");
        assert_eq!(join("/docs", "a.md"), "/docs/a.md");
    }

    #[test]
    fn normalize_strips_slashes_and_dots() {
        assert_eq!(normalize("/docs/").as_deref(), Some("/docs"));
        assert_eq!(normalize("docs").as_deref(), Some("/docs"));
        assert_eq!(normalize("/./docs//a.md").as_deref(), Some("/docs/a.md"));
        assert_eq!(normalize("/").as_deref(), Some("/"));
        assert_eq!(normalize("").as_deref(), Some("/"));
    }

    #[test]
    fn normalize_rejects_parent_segments() {
        assert_eq!(normalize("/docs/../../etc/passwd"), None);
    }

    #[test]
    fn parent_of_normalized_paths() {
        assert_eq!(parent("/a/b"), "/a");
        assert_eq!(parent("/a"), "/");
        assert_eq!(parent("/"), "/");
    }

    #[test]
    fn resolve_href_variants() {
        assert_eq!(resolve_href("/a/b.goto", "/x").as_deref(), Some("/x"));
        assert_eq!(resolve_href("/a/b.goto", "c.md").as_deref(), Some("/a/c.md"));
        assert_eq!(resolve_href("/a/b.goto", "https://example.com/"), None);
        assert_eq!(resolve_href("/a/b.goto", "//cdn.example.com/x"), None);
    }
}
