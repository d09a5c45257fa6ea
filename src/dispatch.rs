//! Render dispatch: one navigated path in, one rendered view out.
//!
//! A pass runs strictly in sequence:
//!
//! ```text
//! RenderPass::new (loading = true)
//!   → resolve        store probes, failures become Missing
//!   → classify       exactly one RenderStrategy
//!   → render         at most one content fetch (two for a listing with readme)
//! ```
//!
//! ## Loading flag
//!
//! The flag lives on the [`RenderPass`], never on shared state. Strategies
//! that need no fetch clear it as soon as they are chosen; directories clear
//! it before the listing is read; markup and plaintext clear it only once
//! their content has arrived. A failed fetch aborts the pass with
//! [`RenderError::Fetch`] and leaves the flag set.

use crate::config::SiteConfig;
use crate::listing::{self, DirectoryListing};
use crate::markdown::MarkupConverter;
use crate::markup::Fragment;
use crate::naming;
use crate::resolve::{self, Resolution};
use crate::script::{self, ScriptPayload};
use crate::store::{ContentStore, StoreError};
use crate::strategy::{self, MARKDOWN_EXTENSIONS, RenderStrategy};
use maud::{Markup, PreEscaped, html};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Failed to fetch {path}: {source}")]
    Fetch {
        path: String,
        #[source]
        source: StoreError,
    },
}

/// State owned by one render pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderPass {
    generation: u64,
    path: String,
    loading: bool,
    strategy: Option<RenderStrategy>,
}

impl RenderPass {
    /// Start a pass. The loading flag is set from the start.
    pub fn new(generation: u64, path: impl Into<String>) -> Self {
        Self {
            generation,
            path: path.into(),
            loading: true,
            strategy: None,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// The strategy chosen for this pass, once classification has run.
    pub fn strategy(&self) -> Option<RenderStrategy> {
        self.strategy
    }

    fn clear_loading(&mut self) {
        self.loading = false;
    }
}

/// A navigation the view asks for after a delay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    /// The `href` exactly as given in metadata.
    pub target: String,
    pub delay: Duration,
}

/// The outcome of a completed pass.
#[derive(Debug, Clone)]
pub struct Rendered {
    /// The navigated path.
    pub path: String,
    pub resolution: Resolution,
    pub strategy: RenderStrategy,
    pub body: Markup,
    pub listing: Option<DirectoryListing>,
    pub redirect: Option<Redirect>,
    /// Re-activated scripts of a markup page, in document order.
    pub scripts: Vec<ScriptPayload>,
}

impl Rendered {
    fn new(pass: &RenderPass, resolution: Resolution, strategy: RenderStrategy, body: Markup) -> Self {
        Self {
            path: pass.path.clone(),
            resolution,
            strategy,
            body,
            listing: None,
            redirect: None,
            scripts: Vec::new(),
        }
    }

    /// `directory` for listings, `page` for everything else.
    pub fn body_class(&self) -> &'static str {
        match self.strategy {
            RenderStrategy::Directory => "directory",
            _ => "page",
        }
    }

    /// The store path whose content was rendered, if any.
    pub fn resolved_path(&self) -> Option<&str> {
        self.resolution.found().map(|r| r.path.as_str())
    }
}

/// Runs render passes against a store.
#[derive(Debug, Clone)]
pub struct Dispatcher<S, M> {
    store: S,
    converter: M,
    config: SiteConfig,
}

impl<S: ContentStore, M: MarkupConverter> Dispatcher<S, M> {
    pub fn new(store: S, converter: M, config: SiteConfig) -> Self {
        Self {
            store,
            converter,
            config,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    /// Resolve and classify a path without fetching any content.
    pub fn classify(&self, path: &str) -> (Resolution, RenderStrategy) {
        let resolution = resolve::resolve(&self.store, path, &self.config.index.candidates);
        let strategy = strategy::classify(&resolution, &self.config.render);
        (resolution, strategy)
    }

    /// Run `pass` to completion.
    pub fn render(&self, pass: &mut RenderPass) -> Result<Rendered, RenderError> {
        let path = pass.path.clone();
        let (resolution, strategy) = self.classify(&path);
        pass.strategy = Some(strategy);
        tracing::debug!(generation = pass.generation, path = %path, strategy = %strategy, "dispatching");

        let Some(resource) = resolution.found().cloned() else {
            pass.clear_loading();
            return Ok(Rendered::new(pass, resolution, strategy, not_found_panel()));
        };
        let target = resource.path.as_str();

        if strategy.clears_loading_immediately() {
            pass.clear_loading();
        }

        let rendered = match strategy {
            RenderStrategy::NotFound => Rendered::new(pass, resolution, strategy, not_found_panel()),
            RenderStrategy::SelfReference => {
                let body = self_reference_notice(target);
                Rendered::new(pass, resolution, strategy, body)
            }
            RenderStrategy::Image => {
                let body = html! { img src=(target) title=(target) alt=(target); };
                Rendered::new(pass, resolution, strategy, body)
            }
            RenderStrategy::Video => {
                let body = html! { video controls { source src=(target); } };
                Rendered::new(pass, resolution, strategy, body)
            }
            RenderStrategy::Audio => {
                let body = html! { audio controls { source src=(target); } };
                Rendered::new(pass, resolution, strategy, body)
            }
            RenderStrategy::Download => {
                let name = naming::file_name(target);
                let body = html! {
                    a href=(target) download=(name) title={ "Download " (name) } { (name) }
                };
                Rendered::new(pass, resolution, strategy, body)
            }
            RenderStrategy::Redirect => {
                let delay = self.config.render.redirect_delay();
                match resource.stat.metadata.href.clone() {
                    Some(href) if !href.is_empty() => {
                        let body = redirect_notice(&href, delay);
                        let mut rendered = Rendered::new(pass, resolution, strategy, body);
                        rendered.redirect = Some(Redirect {
                            target: href,
                            delay,
                        });
                        rendered
                    }
                    _ => {
                        tracing::debug!(path = target, "redirect marker has no href");
                        Rendered::new(pass, resolution, strategy, html! {})
                    }
                }
            }
            RenderStrategy::Directory => {
                let listing = listing::build_listing(
                    &self.store,
                    &self.converter,
                    target,
                    &self.config.listing.readme_names,
                )
                .map_err(|source| fetch_failed(target, source))?;
                let body = listing::render_listing(&listing);
                let mut rendered = Rendered::new(pass, resolution, strategy, body);
                rendered.listing = Some(listing);
                rendered
            }
            RenderStrategy::Markup => {
                let raw = self.fetch(target)?;
                let html = if naming::has_extension(target, MARKDOWN_EXTENSIONS) {
                    self.converter.to_markup(&raw)
                } else {
                    raw
                };
                let mut fragment = Fragment::parse(&html);
                pass.clear_loading();
                let scripts =
                    script::reactivate(&mut fragment, &self.config.render.default_script_type);
                let body = PreEscaped(fragment.to_html());
                let mut rendered = Rendered::new(pass, resolution, strategy, body);
                rendered.scripts = scripts;
                rendered
            }
            RenderStrategy::Plaintext => {
                let text = self.fetch(target)?;
                pass.clear_loading();
                let body = html! { pre { (text) } };
                Rendered::new(pass, resolution, strategy, body)
            }
        };
        Ok(rendered)
    }

    fn fetch(&self, path: &str) -> Result<String, RenderError> {
        self.store
            .read_file(path)
            .map_err(|source| fetch_failed(path, source))
    }
}

fn fetch_failed(path: &str, source: StoreError) -> RenderError {
    tracing::warn!(path, error = %source, "content fetch failed");
    RenderError::Fetch {
        path: path.to_string(),
        source,
    }
}

fn not_found_panel() -> Markup {
    html! {
        div.not-found {
            h2 { "404 Not Found" }
            p { "The content you are looking for at this path is no longer here or has never been here." }
            p { "Please contact me if this is not what you were expecting." }
        }
    }
}

fn self_reference_notice(path: &str) -> Markup {
    html! {
        div.notice {
            "This is " code { (path) } ", the page renderer itself. Aborting render to avoid recursion."
        }
    }
}

/// `3000ms` → `3 seconds`, `1000ms` → `1 second`, `1500ms` → `1.5 seconds`.
fn describe_delay(delay: Duration) -> String {
    let secs = delay.as_secs_f64();
    let unit = if secs == 1.0 { "second" } else { "seconds" };
    format!("{secs} {unit}")
}

fn redirect_notice(href: &str, delay: Duration) -> Markup {
    html! {
        p.redirect {
            "Redirecting to " a href=(href) { (href) } " in " (describe_delay(delay)) "..."
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markdown::Cmark;
    use crate::script::ScriptSource;
    use crate::store::{MemoryStore, StoreCall};
    use crate::types::Metadata;

    fn dispatcher(store: MemoryStore) -> Dispatcher<MemoryStore, Cmark> {
        Dispatcher::new(store, Cmark::default(), SiteConfig::default())
    }

    fn render(d: &Dispatcher<MemoryStore, Cmark>, path: &str) -> (RenderPass, Rendered) {
        let mut pass = RenderPass::new(1, path);
        let rendered = d.render(&mut pass).unwrap();
        (pass, rendered)
    }

    fn body(rendered: &Rendered) -> String {
        rendered.body.clone().into_string()
    }

    fn reads(store: &MemoryStore) -> usize {
        store
            .calls()
            .iter()
            .filter(|c| !matches!(c, StoreCall::Stat(_)))
            .count()
    }

    #[test]
    fn new_pass_starts_loading() {
        let pass = RenderPass::new(7, "/a");
        assert!(pass.is_loading());
        assert_eq!(pass.generation(), 7);
        assert_eq!(pass.strategy(), None);
    }

    #[test]
    fn missing_renders_only_the_not_found_panel() {
        let d = dispatcher(MemoryStore::new());
        let (pass, rendered) = render(&d, "/gone.md");
        assert_eq!(rendered.strategy, RenderStrategy::NotFound);
        assert!(!pass.is_loading());
        let html = body(&rendered);
        assert!(html.contains("<h2>404 Not Found</h2>"));
        assert_eq!(html.matches("<p>").count(), 2);
        assert_eq!(reads(d.store()), 0);
        assert_eq!(rendered.body_class(), "page");
    }

    #[test]
    fn self_reference_fetches_nothing() {
        let d = dispatcher(MemoryStore::new().with_file("/.ui/ui.html", "<p>shell</p>"));
        let (pass, rendered) = render(&d, "/.ui/ui.html");
        assert_eq!(rendered.strategy, RenderStrategy::SelfReference);
        assert!(!pass.is_loading());
        assert!(body(&rendered).contains("Aborting render"));
        assert!(!body(&rendered).contains("shell"));
        assert_eq!(reads(d.store()), 0);
    }

    #[test]
    fn image_embed_uses_path() {
        let d = dispatcher(MemoryStore::new().with_file("/pics/cat.PNG", ""));
        let (pass, rendered) = render(&d, "/pics/cat.PNG");
        assert!(!pass.is_loading());
        assert_eq!(
            body(&rendered),
            r#"<img src="/pics/cat.PNG" title="/pics/cat.PNG" alt="/pics/cat.PNG">"#
        );
        assert_eq!(reads(d.store()), 0);
    }

    #[test]
    fn video_and_audio_wrap_a_source() {
        let d = dispatcher(
            MemoryStore::new()
                .with_file("/clip.webm", "")
                .with_file("/song.ogg", ""),
        );
        let (_, video) = render(&d, "/clip.webm");
        assert_eq!(
            body(&video),
            r#"<video controls><source src="/clip.webm"></video>"#
        );
        let (_, audio) = render(&d, "/song.ogg");
        assert_eq!(
            body(&audio),
            r#"<audio controls><source src="/song.ogg"></audio>"#
        );
    }

    #[test]
    fn download_link_is_labeled_with_last_segment() {
        let d = dispatcher(MemoryStore::new().with_file("/files/report.pdf", ""));
        let (_, rendered) = render(&d, "/files/report.pdf");
        assert_eq!(
            body(&rendered),
            r#"<a href="/files/report.pdf" download="report.pdf" title="Download report.pdf">report.pdf</a>"#
        );
    }

    #[test]
    fn redirect_with_href_schedules_navigation() {
        let store = MemoryStore::new()
            .with_file("/go.goto", "")
            .with_metadata("/go.goto", Metadata::default().with_href("/x"));
        let d = dispatcher(store);
        let (pass, rendered) = render(&d, "/go.goto");
        assert!(!pass.is_loading());
        assert_eq!(
            rendered.redirect,
            Some(Redirect {
                target: "/x".into(),
                delay: Duration::from_millis(3000),
            })
        );
        let html = body(&rendered);
        assert!(html.contains(r#"Redirecting to <a href="/x">/x</a> in 3 seconds..."#));
        assert_eq!(reads(d.store()), 0);
    }

    #[test]
    fn redirect_without_href_renders_nothing() {
        let d = dispatcher(MemoryStore::new().with_file("/go.goto", "ignored"));
        let (pass, rendered) = render(&d, "/go.goto");
        assert_eq!(rendered.strategy, RenderStrategy::Redirect);
        assert!(rendered.redirect.is_none());
        assert_eq!(body(&rendered), "");
        assert!(!pass.is_loading());
    }

    #[test]
    fn redirect_with_empty_href_renders_nothing() {
        let store = MemoryStore::new()
            .with_file("/go.goto", "")
            .with_metadata("/go.goto", Metadata::default().with_href(""));
        let d = dispatcher(store);
        let (pass, rendered) = render(&d, "/go.goto");
        assert!(rendered.redirect.is_none());
        assert_eq!(body(&rendered), "");
        assert!(!pass.is_loading());
    }

    #[test]
    fn script_with_quoted_angle_bracket_keeps_its_source() {
        let d = dispatcher(
            MemoryStore::new().with_file("/p.html", r#"<script data-cfg="a>b" src="/x.js"></script>"#),
        );
        let (_, rendered) = render(&d, "/p.html");
        assert_eq!(rendered.scripts.len(), 1);
        assert_eq!(
            rendered.scripts[0].source,
            ScriptSource::External("/x.js".into())
        );
        assert_eq!(
            body(&rendered),
            r#"<script type="text/javascript" src="/x.js"></script>"#
        );
    }

    #[test]
    fn markdown_page_is_converted_and_scripts_reactivated() {
        let store = MemoryStore::new().with_file(
            "/post.md",
            "# Hello\n\n<script>track()</script>\n\n<script src=\"/widget.js\" async></script>\n",
        );
        let d = dispatcher(store);
        let (pass, rendered) = render(&d, "/post.md");
        assert!(!pass.is_loading());
        let html = body(&rendered);
        assert!(html.contains("<h1>Hello</h1>"));
        assert!(html.contains(r#"<script type="text/javascript">track()</script>"#));
        assert!(html.contains(r#"<script type="text/javascript" src="/widget.js"></script>"#));
        assert_eq!(rendered.scripts.len(), 2);
        assert_eq!(
            rendered.scripts[1].source,
            ScriptSource::External("/widget.js".into())
        );
    }

    #[test]
    fn html_page_is_injected_raw() {
        let d = dispatcher(MemoryStore::new().with_file("/p.html", "<em>raw</em> # not md"));
        let (_, rendered) = render(&d, "/p.html");
        assert_eq!(body(&rendered), "<em>raw</em> # not md");
        assert!(rendered.scripts.is_empty());
    }

    #[test]
    fn plaintext_is_escaped_in_pre() {
        let d = dispatcher(MemoryStore::new().with_file("/notes.txt", "a < b"));
        let (pass, rendered) = render(&d, "/notes.txt");
        assert!(!pass.is_loading());
        assert_eq!(body(&rendered), "<pre>a &lt; b</pre>");
    }

    #[test]
    fn directory_index_is_rendered_as_page() {
        let store = MemoryStore::new()
            .with_file("/docs/index.md", "# Docs")
            .with_file("/docs/index.html", "<p>html index</p>");
        let d = dispatcher(store);
        let (_, rendered) = render(&d, "/docs/");
        assert_eq!(rendered.strategy, RenderStrategy::Markup);
        assert_eq!(rendered.resolved_path(), Some("/docs/index.html"));
        assert_eq!(body(&rendered), "<p>html index</p>");
    }

    #[test]
    fn bare_directory_renders_listing() {
        let store = MemoryStore::new()
            .with_file("/docs/a.txt", "")
            .with_file("/docs/.secret", "");
        let d = dispatcher(store);
        let (pass, rendered) = render(&d, "/docs/");
        assert_eq!(rendered.strategy, RenderStrategy::Directory);
        assert_eq!(rendered.body_class(), "directory");
        assert!(!pass.is_loading());
        let listing = rendered.listing.as_ref().unwrap();
        assert_eq!(listing.entries.len(), 1);
        assert!(!body(&rendered).contains(".secret"));
    }

    #[test]
    fn fetch_failure_propagates_and_keeps_loading() {
        let store = MemoryStore::new()
            .with_file("/broken.md", "x")
            .with_unreadable("/broken.md");
        let d = dispatcher(store);
        let mut pass = RenderPass::new(1, "/broken.md");
        let err = d.render(&mut pass).unwrap_err();
        assert!(matches!(err, RenderError::Fetch { ref path, .. } if path == "/broken.md"));
        assert!(pass.is_loading());
        assert_eq!(pass.strategy(), Some(RenderStrategy::Markup));
    }

    #[test]
    fn listing_failure_clears_loading_first() {
        let store = MemoryStore::new()
            .with_file("/d/x.txt", "")
            .with_unreadable("/d");
        let d = dispatcher(store);
        let mut pass = RenderPass::new(1, "/d/");
        assert!(d.render(&mut pass).is_err());
        assert!(!pass.is_loading());
    }

    #[test]
    fn describe_delay_units() {
        assert_eq!(describe_delay(Duration::from_millis(3000)), "3 seconds");
        assert_eq!(describe_delay(Duration::from_millis(1000)), "1 second");
        assert_eq!(describe_delay(Duration::from_millis(1500)), "1.5 seconds");
    }
}
