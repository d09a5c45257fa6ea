//! Markdown-to-markup conversion.
//!
//! The renderers treat conversion as a collaborator with a fixed contract,
//! [`MarkupConverter`]. The stock implementation is pulldown-cmark.
//!
//! Output is **not** sanitized: a markdown page may embed raw `<script>`
//! blocks on purpose, and those are re-activated after injection (see
//! [`crate::script`]).

use crate::config::MarkdownConfig;
use pulldown_cmark::{Options, Parser, html};

/// Converts markdown text into an HTML string.
pub trait MarkupConverter {
    fn to_markup(&self, text: &str) -> String;
}

impl<T: MarkupConverter + ?Sized> MarkupConverter for &T {
    fn to_markup(&self, text: &str) -> String {
        (**self).to_markup(text)
    }
}

/// pulldown-cmark with the extensions enabled in `[markdown]`.
#[derive(Debug, Clone)]
pub struct Cmark {
    options: Options,
}

impl Cmark {
    pub fn new(config: &MarkdownConfig) -> Self {
        let mut options = Options::empty();
        options.set(Options::ENABLE_TABLES, config.tables);
        options.set(Options::ENABLE_STRIKETHROUGH, config.strikethrough);
        options.set(Options::ENABLE_FOOTNOTES, config.footnotes);
        Self { options }
    }
}

impl Default for Cmark {
    fn default() -> Self {
        Self::new(&MarkdownConfig::default())
    }
}

impl MarkupConverter for Cmark {
    fn to_markup(&self, text: &str) -> String {
        let parser = Parser::new_ext(text, self.options);
        let mut out = String::new();
        html::push_html(&mut out, parser);
        out
    }
}
