//! A minimal tree over injected markup: opaque HTML runs and script elements.
//!
//! Page content is assigned as raw HTML. The only structure the pipeline
//! needs to see inside it is where the `<script>` elements are, so a fragment
//! is parsed into a flat sequence of [`Node`]s: everything that is not a
//! script stays an opaque [`Node::Markup`] run and is written back verbatim.
//!
//! HTML comments are skipped over as markup, so a commented-out script is not
//! picked up:
//!
//! ```text
//! <p>hi</p><!-- <script>old()</script> --><script src="/a.js"></script>
//! └ Markup ──────────────────────────────┘└ Script ──────────────────────┘
//! ```

use regex::{Captures, Regex};
use std::sync::LazyLock;

static SCRIPT_OR_COMMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<!--.*?-->|<script\b((?:[^>"']|"[^"]*"|'[^']*')*)>(.*?)</script\s*>"#).unwrap()
});

static ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([^\s"'>/=]+)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+)))?"#).unwrap()
});

/// How the host is asked to schedule a script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Execution {
    /// Runs in document order, each script after the previous one.
    Ordered,
    Async,
    Deferred,
}

/// A `<script>` element: its attributes in source order and its inline text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptElement {
    attributes: Vec<(String, Option<String>)>,
    text: String,
}

impl ScriptElement {
    pub fn new() -> Self {
        Self {
            attributes: Vec::new(),
            text: String::new(),
        }
    }

    fn from_captures(caps: &Captures<'_>) -> Self {
        let raw_attrs = caps.get(1).map_or("", |m| m.as_str());
        let attributes = ATTRIBUTE
            .captures_iter(raw_attrs)
            .map(|attr| {
                let value = attr
                    .get(2)
                    .or_else(|| attr.get(3))
                    .or_else(|| attr.get(4))
                    .map(|v| v.as_str().to_string());
                (attr[1].to_ascii_lowercase(), value)
            })
            .collect();
        Self {
            attributes,
            text: caps.get(2).map_or("", |m| m.as_str()).to_string(),
        }
    }

    /// Value of an attribute. Present-but-valueless attributes yield `Some("")`.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_deref().unwrap_or(""))
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attribute(name).is_some()
    }

    /// Set an attribute, replacing an existing one of the same name.
    pub fn set_attribute(&mut self, name: &str, value: &str) {
        let value = Some(value.to_string());
        match self
            .attributes
            .iter_mut()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
        {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((name.to_ascii_lowercase(), value)),
        }
    }

    pub fn remove_attribute(&mut self, name: &str) {
        self.attributes.retain(|(n, _)| !n.eq_ignore_ascii_case(name));
    }

    /// Declared `type`, if set and non-blank.
    pub fn script_type(&self) -> Option<&str> {
        self.attribute("type").filter(|t| !t.trim().is_empty())
    }

    /// External source reference, if set and non-blank.
    pub fn src(&self) -> Option<&str> {
        self.attribute("src").filter(|s| !s.trim().is_empty())
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn execution(&self) -> Execution {
        if self.has_attribute("async") {
            Execution::Async
        } else if self.has_attribute("defer") {
            Execution::Deferred
        } else {
            Execution::Ordered
        }
    }

    pub fn to_html(&self) -> String {
        let mut out = String::from("<script");
        for (name, value) in &self.attributes {
            out.push(' ');
            out.push_str(name);
            if let Some(value) = value {
                out.push_str("=\"");
                out.push_str(&escape_attribute(value));
                out.push('"');
            }
        }
        out.push('>');
        out.push_str(&self.text);
        out.push_str("</script>");
        out
    }
}

impl Default for ScriptElement {
    fn default() -> Self {
        Self::new()
    }
}

fn escape_attribute(value: &str) -> String {
    value.replace('&', "&amp;").replace('"', "&quot;")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Markup(String),
    Script(ScriptElement),
}

/// Parsed injected markup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fragment {
    nodes: Vec<Node>,
}

impl Fragment {
    pub fn parse(html: &str) -> Self {
        let mut nodes = Vec::new();
        let mut pending = String::new();
        let mut last = 0;

        for caps in SCRIPT_OR_COMMENT.captures_iter(html) {
            let Some(whole) = caps.get(0) else { continue };
            pending.push_str(&html[last..whole.start()]);
            last = whole.end();

            if whole.as_str().starts_with("<!--") {
                pending.push_str(whole.as_str());
                continue;
            }
            if !pending.is_empty() {
                nodes.push(Node::Markup(std::mem::take(&mut pending)));
            }
            nodes.push(Node::Script(ScriptElement::from_captures(&caps)));
        }

        pending.push_str(&html[last..]);
        if !pending.is_empty() {
            nodes.push(Node::Markup(pending));
        }
        Self { nodes }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Positions of the script elements present right now.
    ///
    /// The returned list is a snapshot: replacing nodes afterwards does not
    /// change it.
    pub fn script_indices(&self) -> Vec<usize> {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(i, node)| matches!(node, Node::Script(_)).then_some(i))
            .collect()
    }

    pub fn scripts(&self) -> impl Iterator<Item = &ScriptElement> {
        self.nodes.iter().filter_map(|node| match node {
            Node::Script(script) => Some(script),
            Node::Markup(_) => None,
        })
    }

    pub fn get(&self, index: usize) -> Option<&Node> {
        self.nodes.get(index)
    }

    /// Swap the node at `index` for `node`, returning the old one.
    ///
    /// Returns `None` and leaves the fragment untouched if `index` is out of
    /// range.
    pub fn replace(&mut self, index: usize, node: Node) -> Option<Node> {
        let slot = self.nodes.get_mut(index)?;
        Some(std::mem::replace(slot, node))
    }

    pub fn to_html(&self) -> String {
        let mut out = String::new();
        for node in &self.nodes {
            match node {
                Node::Markup(html) => out.push_str(html),
                Node::Script(script) => out.push_str(&script.to_html()),
            }
        }
        out
    }
}
