//! Page transitions: hide, fetch, join, replace, reveal.
//!
//! [`PageLoader::load`] starts a transition and hands back a
//! [`LoadRequest`] for the fetcher. The frame loop feeds fetch results to
//! [`PageLoader::complete`] and calls [`PageLoader::poll`] every frame to
//! fire the timers. Only the newest token may touch the surface; it is
//! checked when a result arrives, again when the content is committed and
//! once more when the content is revealed.

use web_time::{Duration, Instant};

use super::surface::PageSurface;
use super::token::{LoadToken, LoadTokenSource};
use crate::error::VitrineError;
use crate::options::PageOptions;

/// A fetch the frame loop should dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadRequest {
    /// Token of the `load` call that issued this request.
    pub token: LoadToken,
    /// Page URL or site-relative path.
    pub url: String,
}

/// What happened to a fetch result handed to [`PageLoader::complete`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionOutcome {
    /// A newer load superseded this one; the result was dropped.
    Stale,
    /// The fetch failed; the container keeps its content.
    Failed,
    /// The markup is queued and commits once the hide timer has elapsed.
    Queued,
    /// The markup was committed right away.
    Committed,
}

#[derive(Debug, Clone)]
struct PendingCommit {
    token: LoadToken,
    html: String,
}

/// Drives page transitions against a [`PageSurface`].
#[derive(Debug, Clone)]
pub struct PageLoader {
    tokens: LoadTokenSource,
    current: Option<LoadToken>,
    hide_deadline: Option<Instant>,
    pending: Option<PendingCommit>,
    reveal_at: Option<(LoadToken, Instant)>,

    container: String,
    content: String,
    hide_class: String,
    hide_duration: Duration,
    reveal_delay: Duration,
}

impl PageLoader {
    /// Loader using the selectors and timings from `options`.
    #[must_use]
    pub fn new(options: &PageOptions) -> Self {
        Self {
            tokens: LoadTokenSource::default(),
            current: None,
            hide_deadline: None,
            pending: None,
            reveal_at: None,
            container: options.container.clone(),
            content: options.content.clone(),
            hide_class: options.hide_class.clone(),
            hide_duration: options.hide_duration(),
            reveal_delay: options.reveal_delay(),
        }
    }

    /// Token of the most recent `load` call.
    #[must_use]
    pub fn current_token(&self) -> Option<LoadToken> {
        self.current
    }

    /// Whether `token` is still the newest load.
    #[must_use]
    pub fn is_current(&self, token: LoadToken) -> bool {
        self.current == Some(token)
    }

    /// Whether the container is inside its hide window.
    #[must_use]
    pub fn is_hiding(&self) -> bool {
        self.hide_deadline.is_some()
    }

    /// Whether any timer or queued commit is outstanding.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.hide_deadline.is_some()
            || self.pending.is_some()
            || self.reveal_at.is_some()
    }

    /// Start loading `url`: issue a token, hide the container and restart
    /// the hide timer. The returned request must be fetched by the caller.
    pub fn load(
        &mut self,
        url: &str,
        now: Instant,
        surface: &mut dyn PageSurface,
    ) -> LoadRequest {
        let token = self.tokens.issue();
        self.current = Some(token);
        surface.add_class(&self.container, &self.hide_class);
        self.hide_deadline = Some(now + self.hide_duration);
        // Anything queued by an older load can never commit now.
        self.pending = None;
        log::debug!("page load {token} started: {url}");
        LoadRequest {
            token,
            url: url.to_owned(),
        }
    }

    /// Hand a fetch result back to the loader.
    pub fn complete(
        &mut self,
        token: LoadToken,
        result: Result<String, VitrineError>,
        now: Instant,
        surface: &mut dyn PageSurface,
    ) -> CompletionOutcome {
        if !self.is_current(token) {
            log::debug!("page load {token} superseded, result dropped");
            return CompletionOutcome::Stale;
        }
        match result {
            Err(e) => {
                log::warn!("{e}");
                CompletionOutcome::Failed
            }
            Ok(html) => {
                self.pending = Some(PendingCommit { token, html });
                let _ = self.poll(now, surface);
                if self.pending.is_some() {
                    CompletionOutcome::Queued
                } else {
                    CompletionOutcome::Committed
                }
            }
        }
    }

    /// Fire whatever timers are due. Returns `true` if the surface was
    /// written.
    pub fn poll(&mut self, now: Instant, surface: &mut dyn PageSurface) -> bool {
        let mut wrote = false;

        if self.hide_deadline.is_some_and(|deadline| now >= deadline) {
            self.hide_deadline = None;
            surface.remove_class(&self.container, &self.hide_class);
            wrote = true;
        }

        if self.hide_deadline.is_none() {
            if let Some(commit) = self.pending.take() {
                if self.is_current(commit.token) {
                    surface.set_inner_html(&self.container, &commit.html);
                    self.reveal_at = Some((commit.token, now + self.reveal_delay));
                    log::debug!("page load {} committed", commit.token);
                    wrote = true;
                }
            }
        }

        if let Some((token, at)) = self.reveal_at {
            if now >= at {
                self.reveal_at = None;
                if self.is_current(token) {
                    surface.remove_class(&self.content, &self.hide_class);
                    log::debug!("page load {token} revealed");
                    wrote = true;
                }
            }
        }

        wrote
    }
}
