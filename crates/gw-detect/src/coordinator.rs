//! Runs every detector over every registered project root.

use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use gw_core::FrameworkDetection;
use rayon::prelude::*;

use crate::cache::DetectionCache;
use crate::detector::{FrameworkDetector, dedup_detections};
use crate::detectors::default_detectors;
use crate::walker::{ManifestWalker, WalkOutcome};

/// Coordinates detection across project roots, with a per-root cache.
///
/// Cloning is cheap and clones share the cache.
///
/// # Examples
///
/// ```
/// use camino::Utf8Path;
/// use gw_detect::DetectionCoordinator;
///
/// let dir = tempfile::tempdir().unwrap();
/// let root = Utf8Path::from_path(dir.path()).unwrap();
/// std::fs::write(root.join("go.mod"), "module example.com/x\n").unwrap();
///
/// let coordinator = DetectionCoordinator::new(vec![root.to_owned()]);
/// let detections = coordinator.detect_all(false);
/// assert_eq!(detections[0].id.as_str(), "go");
/// ```
#[derive(Clone)]
pub struct DetectionCoordinator {
    roots: Vec<Utf8PathBuf>,
    detectors: Arc<[Arc<dyn FrameworkDetector>]>,
    cache: Arc<DetectionCache>,
}

impl std::fmt::Debug for DetectionCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DetectionCoordinator")
            .field("roots", &self.roots)
            .field("detectors", &self.detectors.len())
            .field("cached_roots", &self.cache.len())
            .finish()
    }
}

impl DetectionCoordinator {
    /// Creates a coordinator using the built-in detectors.
    #[must_use]
    pub fn new(roots: Vec<Utf8PathBuf>) -> Self {
        Self::with_detectors(roots, default_detectors())
    }

    /// Creates a coordinator with a custom detector list, run in the given
    /// order.
    #[must_use]
    pub fn with_detectors(roots: Vec<Utf8PathBuf>, detectors: Vec<Arc<dyn FrameworkDetector>>) -> Self {
        Self {
            roots,
            detectors: detectors.into(),
            cache: Arc::new(DetectionCache::new()),
        }
    }

    /// The registered roots.
    #[must_use]
    pub fn roots(&self) -> &[Utf8PathBuf] {
        &self.roots
    }

    /// Detects frameworks under every registered root.
    ///
    /// Roots are probed in parallel; output order follows root order. With
    /// `force_refresh == false` a cached root is not re-read. The combined
    /// result keeps one detection per framework id. No roots means no
    /// detections.
    #[must_use]
    pub fn detect_all(&self, force_refresh: bool) -> Vec<FrameworkDetection> {
        let per_root: Vec<Vec<FrameworkDetection>> = self
            .roots
            .par_iter()
            .map(|root| self.detect_root(root, force_refresh))
            .collect();
        dedup_detections(per_root.into_iter().flatten().collect())
    }

    /// Detects frameworks under one root, consulting the cache unless
    /// `force_refresh` is set.
    ///
    /// Detector failures are logged and skipped; the remaining detections
    /// are still returned and cached.
    #[must_use]
    pub fn detect_root(&self, root: &Utf8Path, force_refresh: bool) -> Vec<FrameworkDetection> {
        if !force_refresh {
            if let Some(cached) = self.cache.get(root) {
                tracing::trace!(%root, "Detection cache hit");
                return cached;
            }
        }

        let manifests = self.walk(root);
        let mut detections = Vec::new();
        for detector in self.detectors.iter() {
            let own = manifests.matching(detector.trigger_files());
            let report = detector.detect_manifests(root, &own);
            for failure in &report.failures {
                if failure.is_recoverable() {
                    tracing::warn!(
                        ecosystem = %detector.ecosystem(),
                        manifest = ?failure.path(),
                        error = %failure,
                        "Skipped unreadable manifest"
                    );
                } else {
                    tracing::warn!(
                        %root,
                        ecosystem = %detector.ecosystem(),
                        error = %failure,
                        "Framework detection failed"
                    );
                }
            }
            detections.extend(report.detections);
        }

        let detections = dedup_detections(detections);
        tracing::info!(%root, count = detections.len(), force_refresh, "Detected frameworks");
        self.cache.insert(root, detections.clone());
        detections
    }

    /// Walks `root` once for the trigger files of every detector.
    ///
    /// A root that cannot be walked yields no manifests; marker files are
    /// still probed by each detector.
    fn walk(&self, root: &Utf8Path) -> WalkOutcome {
        let names: Vec<&str> = self
            .detectors
            .iter()
            .flat_map(|detector| detector.trigger_files().iter().copied())
            .collect();

        let outcome = match ManifestWalker::new(root) {
            Ok(walker) => walker.collect(&names),
            Err(error) => {
                tracing::warn!(%root, %error, "Cannot walk project root");
                return WalkOutcome::default();
            }
        };
        for error in &outcome.errors {
            tracing::debug!(%root, %error, "Skipped entry during manifest walk");
        }
        outcome
    }

    /// Drops every cached result.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// Drops the cached result for `root`. Returns `true` if one existed.
    pub fn invalidate(&self, root: &Utf8Path) -> bool {
        self.cache.remove(root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detector::DetectorReport;
    use crate::error::DetectError;
    use gw_core::Ecosystem;
    use std::fs;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts probes and reports a fixed set of detections.
    struct Fixed {
        calls: AtomicUsize,
        detections: Vec<(&'static str, f32, &'static str)>,
        fail: bool,
    }

    impl Fixed {
        fn new(detections: Vec<(&'static str, f32, &'static str)>) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                detections,
                fail: false,
            })
        }
    }

    impl FrameworkDetector for Fixed {
        fn ecosystem(&self) -> Ecosystem {
            Ecosystem::Node
        }

        fn trigger_files(&self) -> &'static [&'static str] {
            &["package.json"]
        }

        fn detect_manifests(&self, root: &Utf8Path, _manifests: &[Utf8PathBuf]) -> DetectorReport {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut report = DetectorReport::default();
            for (id, confidence, rel) in &self.detections {
                report.detections.push(FrameworkDetection::new(
                    *id,
                    *id,
                    root.join(rel),
                    *confidence,
                    Ecosystem::Node,
                ));
            }
            if self.fail {
                report
                    .failures
                    .push(DetectError::manifest(root.join("package.json"), "broken"));
            }
            report
        }
    }

    fn coordinator(roots: &[&str], detector: &Arc<Fixed>) -> DetectionCoordinator {
        let detector: Arc<dyn FrameworkDetector> = Arc::<Fixed>::clone(detector);
        DetectionCoordinator::with_detectors(
            roots.iter().map(|r| Utf8PathBuf::from(*r)).collect(),
            vec![detector],
        )
    }

    #[test]
    fn test_cached_results_skip_probing() {
        let detector = Fixed::new(vec![("node", 0.8, "package.json")]);
        let coordinator = coordinator(&["/a"], &detector);

        let first = coordinator.detect_all(false);
        let second = coordinator.detect_all(false);
        assert_eq!(first, second);
        assert_eq!(detector.calls.load(Ordering::SeqCst), 1);

        let _ = coordinator.detect_all(true);
        assert_eq!(detector.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_invalidate_and_clear() {
        let detector = Fixed::new(vec![("node", 0.8, "package.json")]);
        let coordinator = coordinator(&["/a", "/b"], &detector);

        let _ = coordinator.detect_all(false);
        assert_eq!(detector.calls.load(Ordering::SeqCst), 2);

        assert!(coordinator.invalidate(Utf8Path::new("/a")));
        let _ = coordinator.detect_all(false);
        assert_eq!(detector.calls.load(Ordering::SeqCst), 3);

        coordinator.clear_cache();
        let _ = coordinator.detect_all(false);
        assert_eq!(detector.calls.load(Ordering::SeqCst), 5);
    }

    #[test]
    fn test_clones_share_cache() {
        let detector = Fixed::new(vec![("node", 0.8, "package.json")]);
        let coordinator = coordinator(&["/a"], &detector);
        let clone = coordinator.clone();

        let _ = coordinator.detect_all(false);
        let _ = clone.detect_all(false);
        assert_eq!(detector.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_dedup_across_detectors() {
        let detector: Arc<dyn FrameworkDetector> = Fixed::new(vec![("react", 0.85, "package.json")]);
        let other: Arc<dyn FrameworkDetector> = Fixed::new(vec![("react", 0.90, "web/package.json")]);
        let coordinator = DetectionCoordinator::with_detectors(
            vec![Utf8PathBuf::from("/a")],
            vec![detector, other],
        );

        let detections = coordinator.detect_all(false);
        assert_eq!(detections.len(), 1);
        assert!((detections[0].confidence - 0.90).abs() < f32::EPSILON);
    }

    #[test]
    fn test_failures_do_not_discard_detections() {
        let detector = Arc::new(Fixed {
            calls: AtomicUsize::new(0),
            detections: vec![("node", 0.8, "package.json")],
            fail: true,
        });
        let coordinator = coordinator(&["/a"], &detector);
        assert_eq!(coordinator.detect_all(false).len(), 1);
    }

    #[test]
    fn test_no_roots_no_detections() {
        assert!(DetectionCoordinator::new(Vec::new()).detect_all(false).is_empty());
    }

    #[test]
    fn test_nextjs_project_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8Path::from_path(dir.path()).unwrap();
        fs::write(
            root.join("package.json"),
            r#"{"dependencies": {"next": "14.0.0"}}"#,
        )
        .unwrap();
        fs::write(root.join("next.config.js"), "module.exports = {};").unwrap();

        let detections = DetectionCoordinator::new(vec![root.to_owned()]).detect_all(false);
        let ids: Vec<_> = detections.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, ["node", "nextjs"]);
        assert!((detections[0].confidence - 0.8).abs() < f32::EPSILON);
        assert!((detections[1].confidence - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_force_refresh_reads_current_disk_state() {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8Path::from_path(dir.path()).unwrap();
        let manifest = root.join("package.json");
        let coordinator = DetectionCoordinator::new(vec![root.to_owned()]);
        let ids = |detections: &[FrameworkDetection]| -> Vec<String> {
            detections.iter().map(|d| d.id.to_string()).collect()
        };

        fs::write(&manifest, r#"{"dependencies": {"express": "4.19.0"}}"#).unwrap();
        let first = ids(&coordinator.detect_all(false));
        assert!(first.contains(&"express".to_owned()));

        fs::write(&manifest, r#"{"dependencies": {"next": "14.0.0"}}"#).unwrap();
        let cached = ids(&coordinator.detect_all(false));
        assert_eq!(cached, first);

        let refreshed = ids(&coordinator.detect_all(true));
        assert!(refreshed.contains(&"nextjs".to_owned()));
        assert!(!refreshed.contains(&"express".to_owned()));

        assert_eq!(ids(&coordinator.detect_all(false)), refreshed);
    }

    /// Records the manifests it was handed.
    struct Recording {
        triggers: &'static [&'static str],
        seen: parking_lot::Mutex<Vec<Utf8PathBuf>>,
    }

    impl FrameworkDetector for Recording {
        fn ecosystem(&self) -> Ecosystem {
            Ecosystem::Go
        }

        fn trigger_files(&self) -> &'static [&'static str] {
            self.triggers
        }

        fn detect_manifests(&self, _root: &Utf8Path, manifests: &[Utf8PathBuf]) -> DetectorReport {
            self.seen.lock().extend_from_slice(manifests);
            DetectorReport::default()
        }
    }

    #[test]
    fn test_each_detector_gets_only_its_manifests() {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8Path::from_path(dir.path()).unwrap();
        fs::write(root.join("go.mod"), "module example.com/x\n").unwrap();
        fs::create_dir_all(root.join("web")).unwrap();
        fs::write(root.join("web/package.json"), "{}").unwrap();

        let go = Arc::new(Recording {
            triggers: &["go.mod"],
            seen: parking_lot::Mutex::new(Vec::new()),
        });
        let node = Arc::new(Recording {
            triggers: &["package.json"],
            seen: parking_lot::Mutex::new(Vec::new()),
        });
        let detectors: Vec<Arc<dyn FrameworkDetector>> = vec![
            Arc::<Recording>::clone(&go),
            Arc::<Recording>::clone(&node),
        ];
        let _ = DetectionCoordinator::with_detectors(vec![root.to_owned()], detectors).detect_all(false);

        assert_eq!(*go.seen.lock(), [root.join("go.mod")]);
        assert_eq!(*node.seen.lock(), [root.join("web/package.json")]);
    }

    #[test]
    fn test_missing_root_yields_nothing() {
        let coordinator = DetectionCoordinator::new(vec![Utf8PathBuf::from("/nonexistent/gitward")]);
        assert!(coordinator.detect_all(true).is_empty());
    }
}
