//! Event and decision types exchanged between the watcher, the batcher and
//! the host.
//!
//! # Event Flow
//!
//! ```text
//! notify Create event
//!        │
//!        ▼
//!   CreationEvent ──► EventBatcher::offer ──► PendingEvent (keyed by path)
//!                                                   │ quiet period elapses
//!                                                   ▼
//!                                     Flush ──► WatchHost::decide ──► Decision
//! ```

use std::time::Instant;

use camino::{Utf8Path, Utf8PathBuf};
use gw_core::{FxHashMap, Rule, fx_hash_map};
use smallvec::{SmallVec, smallvec};

/// A file or directory that appeared under the watched root.
///
/// # Examples
///
/// ```
/// use camino::Utf8PathBuf;
/// use gw_watcher::CreationEvent;
///
/// let event = CreationEvent::new(Utf8PathBuf::from("/repo/.env.local"), false);
/// assert_eq!(event.file_name(), Some(".env.local"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreationEvent {
    /// Absolute path of the new entry.
    pub path: Utf8PathBuf,

    /// Whether the new entry is a directory.
    pub is_dir: bool,

    /// When the event was received.
    pub timestamp: Instant,
}

impl CreationEvent {
    /// Creates an event stamped with the current instant.
    #[inline]
    #[must_use]
    pub fn new(path: Utf8PathBuf, is_dir: bool) -> Self {
        Self {
            path,
            is_dir,
            timestamp: Instant::now(),
        }
    }

    /// Returns the final path component.
    #[inline]
    #[must_use]
    pub fn file_name(&self) -> Option<&str> {
        self.path.file_name()
    }
}

/// A creation that matched a rule and awaits the next flush.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingEvent {
    /// Path relative to the watched root.
    pub path: Utf8PathBuf,

    /// Whether the created path is a directory.
    pub is_dir: bool,

    /// Pattern of the rule that matched.
    pub matched_pattern: String,

    /// The matching rule.
    pub rule: Rule,
}

/// All pending paths that matched one pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternGroup {
    /// The shared pattern.
    pub pattern: String,

    /// The rule behind the pattern.
    pub rule: Rule,

    /// Paths, in flush order.
    pub paths: SmallVec<[Utf8PathBuf; 8]>,
}

/// One consolidated decision point produced by the batcher.
///
/// # Examples
///
/// ```
/// use camino::Utf8PathBuf;
/// use gw_core::{Rule, Severity};
/// use gw_watcher::{Flush, PendingEvent};
///
/// let rule = Rule::new("*.log", Severity::Recommended, "Log files");
/// let pending = |path: &str| PendingEvent {
///     path: Utf8PathBuf::from(path),
///     is_dir: false,
///     matched_pattern: rule.pattern.clone(),
///     rule: rule.clone(),
/// };
///
/// let flush = Flush::from_pending(vec![pending("a.log"), pending("b.log")]).unwrap();
/// assert_eq!(flush.len(), 2);
/// assert_eq!(flush.patterns(), ["*.log"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Flush {
    /// Exactly one path was pending.
    Single(PendingEvent),

    /// Several paths, grouped by matched pattern in first-seen order.
    Batch(Vec<PatternGroup>),
}

impl Flush {
    /// Builds a flush from pending events in flush order. Returns `None` when
    /// nothing is pending.
    #[must_use]
    pub fn from_pending(mut pending: Vec<PendingEvent>) -> Option<Self> {
        match pending.len() {
            0 => None,
            1 => pending.pop().map(Self::Single),
            _ => {
                let mut index: FxHashMap<String, usize> = fx_hash_map();
                let mut groups: Vec<PatternGroup> = Vec::new();
                for event in pending {
                    if let Some(&slot) = index.get(&event.matched_pattern) {
                        groups[slot].paths.push(event.path);
                    } else {
                        index.insert(event.matched_pattern.clone(), groups.len());
                        groups.push(PatternGroup {
                            pattern: event.matched_pattern,
                            rule: event.rule,
                            paths: smallvec![event.path],
                        });
                    }
                }
                Some(Self::Batch(groups))
            }
        }
    }

    /// Total number of paths.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Single(_) => 1,
            Self::Batch(groups) => groups.iter().map(|g| g.paths.len()).sum(),
        }
    }

    /// Always `false`; an empty flush is never produced.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Distinct matched patterns.
    #[must_use]
    pub fn patterns(&self) -> Vec<&str> {
        match self {
            Self::Single(event) => vec![event.matched_pattern.as_str()],
            Self::Batch(groups) => groups.iter().map(|g| g.pattern.as_str()).collect(),
        }
    }

    /// Distinct rules, one per pattern.
    #[must_use]
    pub fn rules(&self) -> Vec<Rule> {
        match self {
            Self::Single(event) => vec![event.rule.clone()],
            Self::Batch(groups) => groups.iter().map(|g| g.rule.clone()).collect(),
        }
    }

    /// Every path in the flush.
    pub fn paths(&self) -> impl Iterator<Item = &Utf8Path> {
        let paths: Vec<&Utf8Path> = match self {
            Self::Single(event) => vec![event.path.as_path()],
            Self::Batch(groups) => groups
                .iter()
                .flat_map(|g| g.paths.iter().map(Utf8PathBuf::as_path))
                .collect(),
        };
        paths.into_iter()
    }
}

/// The host's answer to a [`Flush`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Decision {
    /// Append the flush's rules to the ignore file.
    AddToIgnoreFile,

    /// Do nothing this time.
    Dismiss,

    /// Stop warning about these patterns for the rest of the session.
    NeverWarn,

    /// Stop warning about these patterns and ask the host to persist that
    /// choice in `suppressed_warnings`.
    Suppress,
}

#[cfg(test)]
mod tests {
    use super::*;
    use gw_core::Severity;

    fn pending(path: &str, pattern: &str) -> PendingEvent {
        PendingEvent {
            path: Utf8PathBuf::from(path),
            is_dir: false,
            matched_pattern: pattern.to_owned(),
            rule: Rule::new(pattern, Severity::Critical, "test"),
        }
    }

    #[test]
    fn test_empty_pending_yields_no_flush() {
        assert!(Flush::from_pending(Vec::new()).is_none());
    }

    #[test]
    fn test_single_pending() {
        let flush = Flush::from_pending(vec![pending(".env", ".env")]).unwrap();
        assert!(matches!(flush, Flush::Single(ref e) if e.path == ".env"));
        assert_eq!(flush.len(), 1);
        assert!(!flush.is_empty());
    }

    #[test]
    fn test_batch_groups_by_pattern_in_first_seen_order() {
        let flush = Flush::from_pending(vec![
            pending("b.pem", "*.pem"),
            pending(".env", ".env"),
            pending("c.pem", "*.pem"),
        ])
        .unwrap();

        assert_eq!(flush.patterns(), ["*.pem", ".env"]);
        assert_eq!(flush.len(), 3);
        let Flush::Batch(groups) = &flush else {
            panic!("expected a batch");
        };
        assert_eq!(groups[0].paths.as_slice(), ["b.pem", "c.pem"]);
        let paths: Vec<_> = flush.paths().map(Utf8Path::as_str).collect();
        assert_eq!(paths, ["b.pem", "c.pem", ".env"]);
    }
}
