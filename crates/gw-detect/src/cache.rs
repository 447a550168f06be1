//! Per-root cache of detection results.
//!
//! This module provides [`DetectionCache`], a thread-safe map from project
//! root to the detections last computed for it.
//!
//! # Safety Pattern
//!
//! - **Never exposes guards** publicly
//! - **Clones data** on `get()` operations
//! - **Holds the lock** only for the map operation itself

use camino::{Utf8Path, Utf8PathBuf};
use gw_core::{FrameworkDetection, FxHashMap};
use parking_lot::RwLock;

/// A thread-safe cache of detections keyed by project root.
///
/// The cache is a pure optimization: it is only written after a root has
/// been probed, and a forced refresh always bypasses it.
///
/// # Examples
///
/// ```
/// use camino::{Utf8Path, Utf8PathBuf};
/// use gw_core::{Ecosystem, FrameworkDetection};
/// use gw_detect::DetectionCache;
///
/// let cache = DetectionCache::new();
/// let root = Utf8Path::new("/work/app");
/// let detection = FrameworkDetection::new(
///     "node",
///     "Node.js",
///     Utf8PathBuf::from("/work/app/package.json"),
///     0.8,
///     Ecosystem::Node,
/// );
///
/// cache.insert(root, vec![detection]);
/// assert_eq!(cache.get(root).map(|d| d.len()), Some(1));
/// ```
#[derive(Debug, Default)]
pub struct DetectionCache {
    entries: RwLock<FxHashMap<Utf8PathBuf, Vec<FrameworkDetection>>>,
}

impl DetectionCache {
    /// Creates an empty cache.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a clone of the cached detections for `root`.
    ///
    /// An empty result for a probed root is cached as `Some(vec![])`, which
    /// is distinct from a miss.
    #[must_use]
    pub fn get(&self, root: &Utf8Path) -> Option<Vec<FrameworkDetection>> {
        self.entries.read().get(root).cloned()
    }

    /// Stores the detections for `root`, replacing any previous entry.
    pub fn insert(&self, root: &Utf8Path, detections: Vec<FrameworkDetection>) {
        self.entries.write().insert(root.to_owned(), detections);
    }

    /// Drops the entry for `root`. Returns `true` if one existed.
    pub fn remove(&self, root: &Utf8Path) -> bool {
        self.entries.write().remove(root).is_some()
    }

    /// Drops every entry.
    pub fn clear(&self) {
        self.entries.write().clear();
    }

    /// Number of cached roots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns `true` if nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}
