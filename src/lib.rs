//! # hyperpage
//!
//! Single-page rendering for a hypermedia site backed by a path-addressable
//! content store. Given a navigated path, hyperpage decides which resource
//! backs it, how that resource should be shown, and produces the view.
//!
//! # Architecture: One Pass per Navigation
//!
//! ```text
//! navigate("/docs/")
//!   1. Resolve    /docs/index.html → /docs/index.md → /docs/     (store probes)
//!   2. Classify   one RenderStrategy from an ordered rule table
//!   3. Render     media embed, download link, redirect notice,
//!                 markup (+ script re-activation), plaintext,
//!                 directory listing (+ readme), or the 404 panel
//!   4. Commit     only if no newer navigation has started
//! ```
//!
//! Every pass is sequential and owns its own loading flag. The page unit
//! ([`page::PageContent`]) keeps a render generation so a slow pass that
//! finishes after a newer navigation is discarded instead of overwriting the
//! newer view, and binds `.goto` redirects to that generation so they are
//! cancelled when superseded.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`store`] | `ContentStore` trait plus filesystem and in-memory backends |
//! | [`resolve`] | Navigated path → resolved resource or `Missing` |
//! | [`strategy`] | Resolution → exactly one `RenderStrategy` |
//! | [`dispatch`] | Runs a render pass and produces the view |
//! | [`listing`] | Directory listings: filtering, ordering, readme embedding |
//! | [`markup`] | Flat tree over injected HTML: opaque runs and `<script>` elements |
//! | [`script`] | Script re-activation and the `ScriptHost` hand-off |
//! | [`page`] | The embeddable unit: generations, commits, scheduled redirects |
//! | [`document`] | Full HTML documents around a view (CLI output) |
//! | [`markdown`] | `MarkupConverter` trait and the pulldown-cmark converter |
//! | [`config`] | `config.toml` loading, validation, merging, and CSS generation |
//! | [`metadata`] | `.meta.toml` sidecars and title/description resolution |
//! | [`naming`] | Navigated path conventions: directories, extensions, joins |
//! | [`types`] | Shared types: stats, directory entries, metadata |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Collaborators Are Traits
//!
//! The store and the markdown converter are consumed through fixed contracts
//! ([`store::ContentStore`], [`markdown::MarkupConverter`]), so the pipeline
//! runs unchanged over a directory on disk, an in-memory store in tests, or
//! an embedder's own backend.
//!
//! ## Scripts Are Handed Off, Not Triggered
//!
//! Injected markup is parsed into a [`markup::Fragment`] first. Scripts present
//! at that point are rebuilt into clean, ordered elements and their payloads
//! are returned, so a [`script::ScriptHost`] runs them explicitly.
//!
//! ## Failures Stay Where They Happen
//!
//! A failed existence probe is a not-found page, never an error. A failed
//! content fetch after resolution aborts the pass with an error and leaves
//! the unit in its loading state; there is no retry and no error panel.

pub mod config;
pub mod dispatch;
pub mod document;
pub mod listing;
pub mod markdown;
pub mod markup;
pub mod metadata;
pub mod naming;
pub mod output;
pub mod page;
pub mod resolve;
pub mod script;
pub mod store;
pub mod strategy;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
