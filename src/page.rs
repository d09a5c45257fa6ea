//! The embeddable page unit.
//!
//! [`PageContent`] is keyed to the current navigation path and re-renders on
//! every navigation. It owns the only state that outlives a pass:
//!
//! - the **render generation**, bumped by every [`navigate`](PageContent::navigate).
//!   A pass's result is committed only while its generation is current; a
//!   slower, older pass finishing late is discarded.
//! - the **scheduled redirect** of a `.goto` page, bound to the generation
//!   that scheduled it. A new navigation, [`teardown`](PageContent::teardown),
//!   or the redirect firing all cancel it.
//!
//! Time is passed in explicitly (`now: Instant`) so embedders drive the
//! redirect from their own event loop.
//!
//! ```
//! use hyperpage::config::SiteConfig;
//! use hyperpage::dispatch::Dispatcher;
//! use hyperpage::markdown::Cmark;
//! use hyperpage::page::PageContent;
//! use hyperpage::script::ScriptPayload;
//! use hyperpage::store::MemoryStore;
//!
//! let store = MemoryStore::new().with_file("/index.md", "# Home");
//! let dispatcher = Dispatcher::new(store, Cmark::default(), SiteConfig::default());
//! let mut page = PageContent::new(dispatcher, Vec::<ScriptPayload>::new());
//!
//! assert!(page.render("/").unwrap());
//! assert!(!page.is_loading());
//! assert!(page.current().unwrap().body.0.contains("<h1>Home</h1>"));
//! ```

use crate::dispatch::{Dispatcher, RenderError, RenderPass, Rendered};
use crate::markdown::MarkupConverter;
use crate::script::ScriptHost;
use crate::store::ContentStore;
use std::time::Instant;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PageError {
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error("Page unit has been torn down")]
    TornDown,
}

/// A pending navigation scheduled by a redirect marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledRedirect {
    generation: u64,
    target: String,
    due: Instant,
}

impl ScheduledRedirect {
    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn due(&self) -> Instant {
        self.due
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

pub struct PageContent<S, M, H> {
    dispatcher: Dispatcher<S, M>,
    host: H,
    generation: u64,
    path: Option<String>,
    loading: bool,
    current: Option<Rendered>,
    redirect: Option<ScheduledRedirect>,
    torn_down: bool,
}

impl<S, M, H> PageContent<S, M, H>
where
    S: ContentStore,
    M: MarkupConverter,
    H: ScriptHost,
{
    pub fn new(dispatcher: Dispatcher<S, M>, host: H) -> Self {
        Self {
            dispatcher,
            host,
            generation: 0,
            path: None,
            loading: false,
            current: None,
            redirect: None,
            torn_down: false,
        }
    }

    /// Start a new pass for `path`.
    ///
    /// Supersedes any pass still in flight and cancels a pending redirect.
    pub fn navigate(&mut self, path: &str) -> RenderPass {
        self.generation += 1;
        self.cancel_redirect();
        self.path = Some(path.to_string());
        self.loading = true;
        tracing::debug!(generation = self.generation, path, "navigation started");
        RenderPass::new(self.generation, path)
    }

    /// Run a pass without touching the visible state.
    pub fn run(&self, pass: &mut RenderPass) -> Result<Rendered, RenderError> {
        self.dispatcher.render(pass)
    }

    /// Apply a finished pass.
    ///
    /// Returns `false`, changing nothing, when the pass has been superseded
    /// or the unit torn down. Otherwise the view is replaced, re-activated
    /// scripts are handed to the host in document order, and a redirect is
    /// scheduled `delay` after `now`.
    pub fn commit(&mut self, pass: &RenderPass, rendered: Rendered, now: Instant) -> bool {
        if self.torn_down {
            tracing::debug!(generation = pass.generation(), "discarding pass after teardown");
            return false;
        }
        if pass.generation() != self.generation {
            tracing::debug!(
                generation = pass.generation(),
                current = self.generation,
                path = pass.path(),
                "discarding stale pass"
            );
            return false;
        }

        for payload in &rendered.scripts {
            self.host.execute(payload);
        }
        if let Some(redirect) = &rendered.redirect {
            self.redirect = Some(ScheduledRedirect {
                generation: pass.generation(),
                target: redirect.target.clone(),
                due: now + redirect.delay,
            });
        }
        self.loading = pass.is_loading();

        tracing::info!(
            generation = pass.generation(),
            path = pass.path(),
            strategy = %rendered.strategy,
            "rendered"
        );
        self.current = Some(rendered);
        true
    }

    /// Navigate to `path` and render it to completion.
    ///
    /// A fetch failure is returned as an error and leaves the unit loading.
    pub fn render(&mut self, path: &str) -> Result<bool, PageError> {
        if self.torn_down {
            return Err(PageError::TornDown);
        }
        let mut pass = self.navigate(path);
        let rendered = self.run(&mut pass)?;
        Ok(self.commit(&pass, rendered, Instant::now()))
    }

    /// The redirect target, once its delay has elapsed.
    ///
    /// Fires at most once; the redirect is cancelled when it fires.
    pub fn poll_redirect(&mut self, now: Instant) -> Option<String> {
        let due = self
            .redirect
            .as_ref()
            .is_some_and(|r| r.generation == self.generation && now >= r.due);
        if !due {
            return None;
        }
        let fired = self.redirect.take()?;
        tracing::debug!(href = %fired.target, "redirect fired");
        Some(fired.target)
    }

    pub fn next_redirect_due(&self) -> Option<Instant> {
        self.redirect.as_ref().map(ScheduledRedirect::due)
    }

    pub fn scheduled_redirect(&self) -> Option<&ScheduledRedirect> {
        self.redirect.as_ref()
    }

    /// Cancel a pending redirect. Returns whether one was pending.
    pub fn cancel_redirect(&mut self) -> bool {
        match self.redirect.take() {
            Some(cancelled) => {
                tracing::debug!(href = %cancelled.target, "redirect cancelled");
                true
            }
            None => false,
        }
    }

    /// Release the unit: pending redirects are cancelled and in-flight
    /// passes can no longer commit.
    pub fn teardown(&mut self) {
        self.cancel_redirect();
        self.torn_down = true;
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The path of the latest navigation.
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// Whether the latest navigation is still loading.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// The last committed view.
    pub fn current(&self) -> Option<&Rendered> {
        self.current.as_ref()
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn dispatcher(&self) -> &Dispatcher<S, M> {
        &self.dispatcher
    }
}
