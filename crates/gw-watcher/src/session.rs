//! The async driver that connects creation events, the batcher and the host.
//!
//! One task runs [`WatchSession::run`]; it alternates between receiving
//! events and waiting for the batcher's deadline with `tokio::select!`, so
//! event handling and flushing never interleave.

use std::future::Future;
use std::time::Instant;

use camino::{Utf8Path, Utf8PathBuf};
use gw_core::Rule;
use gw_rules::{AppendReport, IgnoreFileError, IgnoreFileModel};
use tokio::sync::mpsc;

use crate::batcher::EventBatcher;
use crate::events::{CreationEvent, Decision, Flush};

/// The user-facing side of a watch session.
pub trait WatchHost {
    /// Presents a flush and returns the user's choice. May block; the
    /// session does not process events until it returns.
    fn decide(&mut self, flush: &Flush) -> Decision;

    /// Persists patterns the user asked never to be warned about again.
    fn suppress_warnings(&mut self, patterns: &[String]) {
        let _ = patterns;
    }

    /// Reports the outcome of appending rules to the ignore file.
    fn rules_appended(&mut self, result: &Result<AppendReport, IgnoreFileError>) {
        let _ = result;
    }

    /// Called for every creation before it is offered to the batcher.
    /// Returning new rules replaces the active set, e.g. after a new
    /// manifest changed what frameworks are detected.
    fn rules_after_creation(&mut self, relative: &Utf8Path) -> Option<Vec<Rule>> {
        let _ = relative;
        None
    }
}

/// Counters for one finished session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    /// Creation events received.
    pub events: usize,
    /// Events that were queued for a warning.
    pub queued: usize,
    /// Flushes presented to the host.
    pub flushes: usize,
    /// Rules appended to the ignore file.
    pub rules_added: usize,
}

/// Drives an [`EventBatcher`] from a stream of [`CreationEvent`]s.
#[derive(Debug)]
pub struct WatchSession<H> {
    root: Utf8PathBuf,
    batcher: EventBatcher,
    ignore_file: IgnoreFileModel,
    host: H,
    stats: SessionStats,
}

impl<H: WatchHost> WatchSession<H> {
    /// Creates a session for `root`, which must be the same (canonical) path
    /// the events are reported under.
    #[must_use]
    pub fn new(root: &Utf8Path, batcher: EventBatcher, ignore_file: IgnoreFileModel, host: H) -> Self {
        Self {
            root: root.to_owned(),
            batcher,
            ignore_file,
            host,
            stats: SessionStats::default(),
        }
    }

    /// The host.
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Consumes the session, returning the host.
    pub fn into_host(self) -> H {
        self.host
    }

    /// The batcher, for inspection.
    pub fn batcher(&self) -> &EventBatcher {
        &self.batcher
    }

    /// Runs until `shutdown` completes or the event channel closes.
    ///
    /// Pending events are discarded on exit without a final flush.
    pub async fn run<F>(&mut self, events: &mut mpsc::Receiver<CreationEvent>, shutdown: F) -> SessionStats
    where
        F: Future<Output = ()>,
    {
        self.batcher.start();
        tracing::info!(root = %self.root, "Watch session started");
        tokio::pin!(shutdown);

        loop {
            let deadline = self.batcher.deadline();
            tokio::select! {
                () = &mut shutdown => break,
                event = events.recv() => match event {
                    Some(event) => self.handle_event(&event),
                    None => break,
                },
                () = wait_until(deadline) => self.flush(),
            }
        }

        self.batcher.stop();
        tracing::info!(
            root = %self.root,
            events = self.stats.events,
            flushes = self.stats.flushes,
            rules_added = self.stats.rules_added,
            "Watch session ended"
        );
        self.stats
    }

    fn handle_event(&mut self, event: &CreationEvent) {
        self.stats.events += 1;
        let Ok(relative) = event.path.strip_prefix(&self.root) else {
            tracing::trace!(path = %event.path, "Event outside the watched root");
            return;
        };
        if let Some(rules) = self.host.rules_after_creation(relative) {
            tracing::info!(rules = rules.len(), "Active rules refreshed");
            self.batcher.set_rules(rules);
        }
        if self.batcher.offer(relative, event.is_dir, now()).is_queued() {
            self.stats.queued += 1;
        }
    }

    fn flush(&mut self) {
        let Some(flush) = self.batcher.fire(now()) else {
            return;
        };
        self.stats.flushes += 1;

        let decision = self.host.decide(&flush);
        tracing::debug!(?decision, paths = flush.len(), "Flush decided");

        match decision {
            Decision::AddToIgnoreFile => self.add_to_ignore_file(&flush),
            Decision::Dismiss => {}
            Decision::NeverWarn => {
                for pattern in flush.patterns() {
                    self.batcher.dismiss_pattern(pattern);
                }
            }
            Decision::Suppress => {
                let patterns: Vec<String> = flush.patterns().into_iter().map(str::to_owned).collect();
                for pattern in &patterns {
                    self.batcher.suppress_pattern(pattern);
                }
                self.host.suppress_warnings(&patterns);
            }
        }

        self.batcher.complete_flush();
    }

    fn add_to_ignore_file(&mut self, flush: &Flush) {
        let result = self.ignore_file.append_rules(&self.root, &flush.rules(), None);
        match &result {
            Ok(report) => {
                self.stats.rules_added += report.added.len();
                match self.ignore_file.coverage(&self.root) {
                    Ok(snapshot) => self.batcher.refresh_coverage(snapshot),
                    Err(error) => tracing::warn!(%error, "Could not reload ignore file"),
                }
            }
            Err(error) => tracing::warn!(%error, "Could not update ignore file"),
        }
        self.host.rules_appended(&result);
    }
}

fn now() -> Instant {
    tokio::time::Instant::now().into_std()
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(tokio::time::Instant::from_std(deadline)).await,
        None => std::future::pending().await,
    }
}
