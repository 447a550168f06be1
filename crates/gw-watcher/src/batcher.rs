//! Debounced batching of risky file creations.
//!
//! [`EventBatcher`] is a plain state machine driven by explicit time values:
//!
//! ```text
//!            start()                offer()                 fire(now >= deadline)
//! Stopped ──────────► Watching ─────────────► Accumulating ─────────────────────► Flushing
//!    ▲                   ▲  ▲                   │    ▲  offer() re-arms               │
//!    │                   │  └───────────────────┘    └──── complete_flush() ──────────┤
//!    │ stop()            └──────────────── complete_flush() ──────────────────────────┘
//!    └── from any state
//! ```
//!
//! Every qualifying event replaces the single deadline with `now + debounce`,
//! so a burst is reported once, one quiet period after its last event.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use camino::{Utf8Path, Utf8PathBuf};
use gw_core::{Config, FxHashSet, Rule};
use gw_rules::{IgnoreSnapshot, PatternMatcher};

use crate::events::{Flush, PendingEvent};

/// Lifecycle state of an [`EventBatcher`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatcherState {
    /// Not watching; every event is dropped.
    Stopped,
    /// Watching with nothing pending.
    Watching,
    /// At least one event is pending and the timer is armed.
    Accumulating {
        /// When the pending events become due.
        deadline: Instant,
    },
    /// A flush has been handed out and not yet completed.
    Flushing {
        /// Deadline armed by events that arrived during the flush.
        next_deadline: Option<Instant>,
    },
}

/// Why [`EventBatcher::offer`] did not queue an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The batcher is stopped.
    Stopped,
    /// The ignore file already covers the path.
    Covered,
    /// No active rule matches the path.
    NoMatch,
    /// Every matching pattern was dismissed this session.
    Dismissed,
    /// Every matching pattern is in `suppressed_warnings`.
    Suppressed,
}

/// Result of offering one creation event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Offer {
    /// The event is pending under `pattern`.
    Queued {
        /// Pattern of the matching rule.
        pattern: String,
    },
    /// The event was dropped.
    Skipped(SkipReason),
}

impl Offer {
    /// Returns `true` if the event was queued.
    #[must_use]
    pub const fn is_queued(&self) -> bool {
        matches!(self, Self::Queued { .. })
    }
}

/// Collects risky creations and releases them as one [`Flush`] after a
/// quiet period.
///
/// Paths are relative to the watched root. Pending entries are keyed by path,
/// so recreating a file replaces its entry instead of adding a second one.
///
/// # Examples
///
/// ```
/// use std::time::{Duration, Instant};
///
/// use camino::Utf8Path;
/// use gw_core::{Config, Rule, Severity};
/// use gw_rules::IgnoreSnapshot;
/// use gw_watcher::{EventBatcher, Flush};
///
/// let rules = vec![Rule::new(".env", Severity::Critical, "Secrets")];
/// let coverage = IgnoreSnapshot::empty(Utf8Path::new("/repo"));
/// let mut batcher = EventBatcher::new(rules, coverage, &Config::default());
/// batcher.start();
///
/// let t0 = Instant::now();
/// assert!(batcher.offer(Utf8Path::new(".env.local"), false, t0).is_queued());
/// assert!(batcher.fire(t0 + Duration::from_millis(100)).is_none());
///
/// let flush = batcher.fire(t0 + Duration::from_millis(500)).unwrap();
/// assert!(matches!(flush, Flush::Single(_)));
/// batcher.complete_flush();
/// ```
#[derive(Debug)]
pub struct EventBatcher {
    state: BatcherState,
    debounce: Duration,
    matcher: PatternMatcher,
    rules: Vec<Rule>,
    coverage: IgnoreSnapshot,
    suppressed: FxHashSet<String>,
    dismissed: FxHashSet<String>,
    pending: BTreeMap<Utf8PathBuf, PendingEvent>,
}

impl EventBatcher {
    /// Creates a stopped batcher over the given active rules.
    ///
    /// The debounce window and the suppressed patterns come from `config`.
    #[must_use]
    pub fn new(rules: Vec<Rule>, coverage: IgnoreSnapshot, config: &Config) -> Self {
        Self {
            state: BatcherState::Stopped,
            debounce: config.watch.debounce(),
            matcher: PatternMatcher::new(),
            rules,
            coverage,
            suppressed: config.suppressed_warnings.iter().cloned().collect(),
            dismissed: FxHashSet::default(),
            pending: BTreeMap::new(),
        }
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> BatcherState {
        self.state
    }

    /// The armed deadline, if events are pending.
    #[must_use]
    pub const fn deadline(&self) -> Option<Instant> {
        match self.state {
            BatcherState::Accumulating { deadline } => Some(deadline),
            _ => None,
        }
    }

    /// Number of pending paths.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// The quiet period.
    #[must_use]
    pub const fn debounce(&self) -> Duration {
        self.debounce
    }

    /// Starts watching. Has no effect unless stopped.
    pub fn start(&mut self) {
        if self.state == BatcherState::Stopped {
            self.state = BatcherState::Watching;
            tracing::debug!(debounce_ms = self.debounce.as_millis(), "Batcher started");
        }
    }

    /// Stops watching, disarming the timer and discarding pending events.
    pub fn stop(&mut self) {
        let discarded = self.pending.len();
        self.pending.clear();
        self.state = BatcherState::Stopped;
        tracing::debug!(discarded, "Batcher stopped");
    }

    /// Offers a creation event observed at `now`.
    ///
    /// The event qualifies when the ignore file doesn't cover it and some
    /// active rule matches whose pattern is neither dismissed nor suppressed.
    /// The first such rule, in rule order, is recorded. Qualifying events
    /// re-arm the deadline to `now + debounce`.
    pub fn offer(&mut self, relative: &Utf8Path, is_dir: bool, now: Instant) -> Offer {
        if self.state == BatcherState::Stopped {
            return Offer::Skipped(SkipReason::Stopped);
        }
        if self.coverage.is_covered(relative, is_dir) {
            tracing::trace!(path = %relative, "Already covered by ignore file");
            return Offer::Skipped(SkipReason::Covered);
        }

        let rule = match self.first_active_match(relative) {
            Ok(rule) => rule.clone(),
            Err(reason) => {
                tracing::trace!(path = %relative, ?reason, "Creation skipped");
                return Offer::Skipped(reason);
            }
        };

        let pattern = rule.pattern.clone();
        tracing::debug!(path = %relative, %pattern, "Queued risky creation");
        self.pending.insert(
            relative.to_owned(),
            PendingEvent {
                path: relative.to_owned(),
                is_dir,
                matched_pattern: pattern.clone(),
                rule,
            },
        );

        let deadline = now + self.debounce;
        self.state = match self.state {
            BatcherState::Flushing { .. } => BatcherState::Flushing {
                next_deadline: Some(deadline),
            },
            _ => BatcherState::Accumulating { deadline },
        };
        Offer::Queued { pattern }
    }

    /// Releases every pending event if the deadline has passed.
    ///
    /// On success the batcher enters [`BatcherState::Flushing`] until
    /// [`complete_flush`](Self::complete_flush) is called.
    pub fn fire(&mut self, now: Instant) -> Option<Flush> {
        let BatcherState::Accumulating { deadline } = self.state else {
            return None;
        };
        if now < deadline {
            return None;
        }

        let pending: Vec<PendingEvent> = std::mem::take(&mut self.pending).into_values().collect();
        let Some(flush) = Flush::from_pending(pending) else {
            self.state = BatcherState::Watching;
            return None;
        };

        tracing::debug!(paths = flush.len(), patterns = flush.patterns().len(), "Flushing");
        self.state = BatcherState::Flushing {
            next_deadline: None,
        };
        Some(flush)
    }

    /// Marks the current flush as handled.
    ///
    /// Events queued while flushing are qualified again against the current
    /// coverage, dismissals and suppressions, since handling the flush may
    /// have changed them. Survivors keep their deadline.
    pub fn complete_flush(&mut self) {
        let BatcherState::Flushing { next_deadline } = self.state else {
            return;
        };

        let queued = std::mem::take(&mut self.pending);
        let before = queued.len();
        for (path, mut event) in queued {
            if self.coverage.is_covered(&path, event.is_dir) {
                continue;
            }
            let Ok(rule) = self.first_active_match(&path).cloned() else {
                continue;
            };
            event.matched_pattern.clone_from(&rule.pattern);
            event.rule = rule;
            self.pending.insert(path, event);
        }
        let dropped = before - self.pending.len();
        if dropped > 0 {
            tracing::debug!(dropped, kept = self.pending.len(), "Dropped events handled by the flush");
        }

        self.state = match next_deadline {
            Some(deadline) if !self.pending.is_empty() => BatcherState::Accumulating { deadline },
            _ => BatcherState::Watching,
        };
    }

    /// Stops warning about `pattern` for the rest of the session.
    ///
    /// Returns `false` if it was already dismissed.
    pub fn dismiss_pattern(&mut self, pattern: &str) -> bool {
        self.dismissed.insert(pattern.to_owned())
    }

    /// Adds `pattern` to the suppressed set.
    ///
    /// Returns `false` if it was already suppressed.
    pub fn suppress_pattern(&mut self, pattern: &str) -> bool {
        self.suppressed.insert(pattern.to_owned())
    }

    /// Returns `true` if `pattern` was dismissed this session.
    #[must_use]
    pub fn is_dismissed(&self, pattern: &str) -> bool {
        self.dismissed.contains(pattern)
    }

    /// Replaces the ignore-file snapshot, e.g. after rules were appended.
    pub fn refresh_coverage(&mut self, coverage: IgnoreSnapshot) {
        self.coverage = coverage;
    }

    /// Replaces the active rules, e.g. after detection was refreshed.
    pub fn set_rules(&mut self, rules: Vec<Rule>) {
        self.rules = rules;
    }

    fn first_active_match(&self, relative: &Utf8Path) -> Result<&Rule, SkipReason> {
        let mut blocked = None;
        for rule in &self.rules {
            if !self.matcher.matches_path(relative, &rule.pattern) {
                continue;
            }
            if self.dismissed.contains(&rule.pattern) {
                blocked.get_or_insert(SkipReason::Dismissed);
            } else if self.suppressed.contains(&rule.pattern) {
                blocked.get_or_insert(SkipReason::Suppressed);
            } else {
                return Ok(rule);
            }
        }
        Err(blocked.unwrap_or(SkipReason::NoMatch))
    }
}
