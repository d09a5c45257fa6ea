//! Path resolution: which resource backs a navigated path.
//!
//! ```text
//! "/docs/"      → /docs/index.html → /docs/index.md → /docs/ (listing)
//! "/docs/a.md"  → /docs/a.md
//! ```
//!
//! A failed probe is never an error here: it is logged and the resolution
//! becomes [`Resolution::Missing`], which renders the not-found panel.

use crate::naming;
use crate::store::ContentStore;
use crate::types::{ResourceKind, ResourceStat};
use serde::Serialize;

/// A concrete resource found for a navigated path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedResource {
    pub kind: ResourceKind,
    /// The store path that exists: an index file or the navigated path.
    pub path: String,
    pub stat: ResourceStat,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Resolution {
    Found(ResolvedResource),
    Missing,
}

impl Resolution {
    pub fn found(&self) -> Option<&ResolvedResource> {
        match self {
            Self::Found(resource) => Some(resource),
            Self::Missing => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }
}

fn probe(store: &impl ContentStore, path: &str) -> Option<ResourceStat> {
    match store.stat(path) {
        Ok(stat) => Some(stat),
        Err(err) => {
            tracing::debug!(path, error = %err, "probe failed");
            None
        }
    }
}

/// Resolve a navigated path against `store`.
///
/// A directory path probes each of `candidates` inside it, then the
/// directory itself; the first hit wins. When only the directory exists the
/// resolved kind is [`ResourceKind::Directory`].
pub fn resolve<S, C>(store: &S, path: &str, candidates: &[C]) -> Resolution
where
    S: ContentStore,
    C: AsRef<str>,
{
    if naming::is_directory_path(path) {
        for candidate in candidates {
            let candidate_path = naming::join(path, candidate.as_ref());
            if let Some(stat) = probe(store, &candidate_path) {
                tracing::debug!(path, index = %candidate_path, "resolved directory index");
                return Resolution::Found(ResolvedResource {
                    kind: stat.kind,
                    path: candidate_path,
                    stat,
                });
            }
        }
        return match probe(store, path) {
            Some(stat) => Resolution::Found(ResolvedResource {
                kind: ResourceKind::Directory,
                path: path.to_string(),
                stat,
            }),
            None => Resolution::Missing,
        };
    }

    match probe(store, path) {
        Some(stat) => Resolution::Found(ResolvedResource {
            kind: stat.kind,
            path: path.to_string(),
            stat,
        }),
        None => Resolution::Missing,
    }
}
