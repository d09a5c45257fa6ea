//! Standalone HTML documents around a rendered view.
//!
//! The page unit only produces the view itself. For output outside a page
//! shell (the CLI), [`render_document`] wraps it in a full document:
//!
//! - title from the resolved store path
//! - CSS custom properties from `[colors]`, then `static/style.css`
//! - body classes `page` or `directory`, plus `loading` while the pass has
//!   not cleared its flag
//! - for a scheduled redirect, a `<meta http-equiv="refresh">` with the
//!   configured delay, so static output still navigates

use crate::config::{self, SiteConfig};
use crate::dispatch::{Redirect, Rendered};
use maud::{DOCTYPE, Markup, html};

const CSS_STATIC: &str = include_str!("../static/style.css");

fn body_classes(rendered: &Rendered, loading: bool) -> String {
    if loading {
        format!("{} loading", rendered.body_class())
    } else {
        rendered.body_class().to_string()
    }
}

fn refresh_content(redirect: &Redirect) -> String {
    format!("{};url={}", redirect.delay.as_secs_f64(), redirect.target)
}

/// Renders the base HTML document structure
fn base_document(
    title: &str,
    css: &str,
    redirect: Option<&Redirect>,
    body_class: &str,
    content: Markup,
) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                @if let Some(redirect) = redirect {
                    meta http-equiv="refresh" content=(refresh_content(redirect));
                }
                title { (title) }
                style { (css) }
            }
            body class=(body_class) {
                main.page-content {
                    (content)
                }
            }
        }
    }
}

/// Wrap `rendered` in a full HTML document.
pub fn render_document(rendered: &Rendered, loading: bool, config: &SiteConfig) -> Markup {
    let color_css = config::generate_color_css(&config.colors);
    let css = format!("{color_css}\n\n{CSS_STATIC}");
    let title = rendered.resolved_path().unwrap_or(&rendered.path);
    base_document(
        title,
        &css,
        rendered.redirect.as_ref(),
        &body_classes(rendered, loading),
        rendered.body.clone(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::test_helpers::{render_path, sample_site};
    use crate::types::Metadata;

    fn document(store: MemoryStore, path: &str) -> String {
        let (rendered, loading) = render_path(store, path);
        render_document(&rendered, loading, &SiteConfig::default()).into_string()
    }

    #[test]
    fn document_includes_doctype_and_colors() {
        let html = document(MemoryStore::new().with_file("/a.txt", "hi"), "/a.txt");
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("--color-bg: #ffffff"));
        assert!(html.contains("<title>/a.txt</title>"));
        assert!(html.contains("<pre>hi</pre>"));
    }

    #[test]
    fn page_and_directory_body_classes() {
        let store = || MemoryStore::new().with_file("/d/a.txt", "hi");
        assert!(document(store(), "/d/a.txt").contains(r#"<body class="page">"#));
        assert!(document(store(), "/d/").contains(r#"<body class="directory">"#));
    }

    #[test]
    fn loading_class_when_flag_still_set() {
        let (rendered, _) = render_path(MemoryStore::new().with_file("/a.txt", "hi"), "/a.txt");
        let html = render_document(&rendered, true, &SiteConfig::default()).into_string();
        assert!(html.contains(r#"<body class="page loading">"#));
    }

    #[test]
    fn title_prefers_resolved_index() {
        let html = document(MemoryStore::new().with_file("/d/index.md", "# x"), "/d/");
        assert!(html.contains("<title>/d/index.md</title>"));
    }

    #[test]
    fn redirect_adds_meta_refresh() {
        let store = MemoryStore::new()
            .with_file("/go.goto", "")
            .with_metadata("/go.goto", Metadata::default().with_href("/x"));
        let html = document(store, "/go.goto");
        assert!(html.contains(r#"<meta http-equiv="refresh" content="3;url=/x">"#));
    }

    #[test]
    fn no_refresh_without_redirect() {
        let html = document(sample_site(), "/links/dead.goto");
        assert!(!html.contains("http-equiv"));
    }

    #[test]
    fn empty_href_adds_no_refresh() {
        let store = MemoryStore::new()
            .with_file("/go.goto", "")
            .with_metadata("/go.goto", Metadata::default().with_href(""));
        assert!(!document(store, "/go.goto").contains("http-equiv"));
    }

    #[test]
    fn listing_document_links_entries() {
        let html = document(sample_site(), "/notes/");
        assert!(html.contains(r#"<body class="directory">"#));
        assert!(html.contains(r#"href="/notes/drafts/""#));
        assert!(html.contains(r#"href="/notes/latest.md""#));
        assert!(!html.contains(".private"));
    }
}
