//! Script re-activation for injected markup.
//!
//! Scripts inside markup assigned as raw HTML never run on their own. After a
//! markup page is parsed into a [`Fragment`], [`reactivate`] rebuilds every
//! script that was present at that moment into a clean element the host will
//! execute in document order, and hands the payloads to the caller so a
//! [`ScriptHost`] can run them programmatically.
//!
//! The set of scripts is snapshotted before any replacement, so the pass ends
//! after exactly that many elements whatever the replacements contain.

use crate::markup::{Execution, Fragment, Node, ScriptElement};
use serde::Serialize;

/// Type given to scripts that declare none.
pub const DEFAULT_SCRIPT_TYPE: &str = "text/javascript";

/// What a re-activated script runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum ScriptSource {
    Inline(String),
    External(String),
    /// Neither inline text nor a source reference.
    Empty,
}

/// A re-activated script, ready for a host to execute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScriptPayload {
    pub script_type: String,
    pub source: ScriptSource,
    pub execution: Execution,
}

/// Executes re-activated scripts.
///
/// The pipeline itself has no script engine; embedders that do implement
/// this. `Vec<ScriptPayload>` collects payloads for inspection.
pub trait ScriptHost {
    fn execute(&mut self, payload: &ScriptPayload);
}

impl ScriptHost for Vec<ScriptPayload> {
    fn execute(&mut self, payload: &ScriptPayload) {
        self.push(payload.clone());
    }
}

/// Build the replacement for one script and the payload it carries.
///
/// The replacement keeps the declared type (or `default_type`), copies the
/// inline text when non-empty and the `src` reference otherwise, and is
/// marked for ordered execution.
pub fn rebuild(original: &ScriptElement, default_type: &str) -> (ScriptElement, ScriptPayload) {
    let script_type = original.script_type().unwrap_or(default_type).to_string();

    let mut replacement = ScriptElement::new();
    replacement.set_attribute("type", &script_type);

    let source = if !original.text().is_empty() {
        replacement.set_text(original.text());
        ScriptSource::Inline(original.text().to_string())
    } else if let Some(src) = original.src() {
        replacement.set_attribute("src", src);
        ScriptSource::External(src.to_string())
    } else {
        ScriptSource::Empty
    };

    let payload = ScriptPayload {
        script_type,
        source,
        execution: replacement.execution(),
    };
    (replacement, payload)
}

/// Replace every script present in `fragment` with a re-activated copy.
///
/// Returns the payloads in document order, one per replaced script.
pub fn reactivate(fragment: &mut Fragment, default_type: &str) -> Vec<ScriptPayload> {
    let snapshot = fragment.script_indices();
    let mut payloads = Vec::with_capacity(snapshot.len());

    for index in snapshot {
        let Some(Node::Script(original)) = fragment.get(index) else {
            continue;
        };
        let (replacement, payload) = rebuild(original, default_type);
        fragment.replace(index, Node::Script(replacement));
        payloads.push(payload);
    }

    tracing::debug!(count = payloads.len(), "re-activated scripts");
    payloads
}
