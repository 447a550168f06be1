//! The detector seam and the profile-driven detector shared by every
//! built-in ecosystem.

use camino::{Utf8Path, Utf8PathBuf};
use gw_core::{Ecosystem, FrameworkDetection, FrameworkId, FxHashSet, fx_hash_map};

use crate::error::DetectError;
use crate::manifest::read_dependencies;
use crate::walker::ManifestWalker;

/// Confidence of the plain "ecosystem present" detection.
pub const BASE_CONFIDENCE: f32 = 0.8;

/// Bonus when a framework's config file sits next to its manifest.
pub const CONFIG_FILE_BONUS: f32 = 0.05;

/// Outcome of one detector run over one root.
///
/// Detection never fails as a whole: anything that went wrong is reported in
/// [`failures`](Self::failures) next to the detections that were still
/// possible.
#[derive(Debug, Default)]
pub struct DetectorReport {
    /// Deduplicated detections.
    pub detections: Vec<FrameworkDetection>,
    /// Problems encountered along the way.
    pub failures: Vec<DetectError>,
}

impl DetectorReport {
    /// A report holding a single failure.
    #[must_use]
    pub fn failed(error: DetectError) -> Self {
        Self {
            detections: Vec::new(),
            failures: vec![error],
        }
    }
}

/// Finds frameworks of one ecosystem under a project root.
///
/// Implementations must be cheap to share across threads; the coordinator
/// runs roots in parallel.
pub trait FrameworkDetector: Send + Sync {
    /// The ecosystem this detector covers.
    fn ecosystem(&self) -> Ecosystem;

    /// Manifest file names this detector looks for. A name may contain one
    /// `*`.
    fn trigger_files(&self) -> &'static [&'static str];

    /// Builds detections from manifests already found under `root`.
    ///
    /// `manifests` holds only files matching [`trigger_files`](Self::trigger_files),
    /// sorted by path. Must not panic.
    fn detect_manifests(&self, root: &Utf8Path, manifests: &[Utf8PathBuf]) -> DetectorReport;

    /// Walks `root` for this detector's manifests and probes them.
    ///
    /// The coordinator walks each root once for all detectors instead.
    fn detect(&self, root: &Utf8Path) -> DetectorReport {
        let walk = match ManifestWalker::new(root) {
            Ok(walker) => walker.collect(self.trigger_files()),
            Err(err) => return DetectorReport::failed(err),
        };
        let mut report = self.detect_manifests(root, &walk.paths);
        let mut failures = walk.errors;
        failures.append(&mut report.failures);
        report.failures = failures;
        report
    }
}

/// A framework recognized by its dependencies.
#[derive(Debug, Clone, Copy)]
pub struct FrameworkSignature {
    /// Framework id, matching the rule catalog.
    pub id: &'static str,
    /// Human-readable name.
    pub display_name: &'static str,
    /// Any of these dependency names triggers the signature. A trailing `*`
    /// matches by prefix.
    pub dependencies: &'static [&'static str],
    /// Config files, relative to the manifest directory or the root, that
    /// raise confidence by [`CONFIG_FILE_BONUS`].
    pub config_files: &'static [&'static str],
    /// Confidence when a dependency matches.
    pub confidence: f32,
}

/// A file whose mere presence identifies a framework.
#[derive(Debug, Clone, Copy)]
pub struct MarkerFile {
    /// Path relative to the root or to a manifest directory.
    pub path: &'static str,
    /// Framework id.
    pub id: &'static str,
    /// Human-readable name.
    pub display_name: &'static str,
    /// Confidence of the detection.
    pub confidence: f32,
}

/// Declarative description of one ecosystem's detection rules.
///
/// Every built-in detector is an `EcosystemProfile`; the per-ecosystem
/// modules only differ in data.
#[derive(Debug, Clone, Copy)]
pub struct EcosystemProfile {
    /// The ecosystem.
    pub ecosystem: Ecosystem,
    /// Manifest names to look for.
    pub manifests: &'static [&'static str],
    /// Whether dependency names compare case-insensitively.
    pub case_insensitive: bool,
    /// Dependency-driven signatures.
    pub signatures: &'static [FrameworkSignature],
    /// Marker files.
    pub markers: &'static [MarkerFile],
}

impl FrameworkDetector for EcosystemProfile {
    fn ecosystem(&self) -> Ecosystem {
        self.ecosystem
    }

    fn trigger_files(&self) -> &'static [&'static str] {
        self.manifests
    }

    fn detect_manifests(&self, root: &Utf8Path, manifests: &[Utf8PathBuf]) -> DetectorReport {
        let mut detections = Vec::new();
        let mut failures = Vec::new();
        let mut marker_dirs: Vec<&Utf8Path> = vec![root];

        for manifest in manifests {
            detections.push(FrameworkDetection::new(
                FrameworkId::from_static(self.ecosystem.as_str()),
                self.ecosystem.display_name(),
                manifest.clone(),
                BASE_CONFIDENCE,
                self.ecosystem,
            ));

            let dir = manifest.parent().unwrap_or(root);
            if !marker_dirs.contains(&dir) {
                marker_dirs.push(dir);
            }

            let dependencies = match read_dependencies(manifest) {
                Ok(deps) => self.normalize(deps),
                Err(err) => {
                    tracing::debug!(%manifest, error = %err, "Manifest unreadable");
                    failures.push(err);
                    continue;
                }
            };

            for signature in self.signatures {
                if !self.signature_matches(signature, &dependencies) {
                    continue;
                }
                let has_config = signature
                    .config_files
                    .iter()
                    .any(|config| dir.join(config).is_file() || root.join(config).is_file());
                let confidence = if has_config {
                    (signature.confidence + CONFIG_FILE_BONUS).min(1.0)
                } else {
                    signature.confidence
                };
                detections.push(FrameworkDetection::new(
                    signature.id,
                    signature.display_name,
                    manifest.clone(),
                    confidence,
                    self.ecosystem,
                ));
            }
        }

        for marker in self.markers {
            for dir in &marker_dirs {
                let path: Utf8PathBuf = dir.join(marker.path);
                if path.is_file() {
                    detections.push(FrameworkDetection::new(
                        marker.id,
                        marker.display_name,
                        path,
                        marker.confidence,
                        self.ecosystem,
                    ));
                }
            }
        }

        let detections = dedup_detections(detections);
        tracing::debug!(
            ecosystem = %self.ecosystem,
            %root,
            manifests = manifests.len(),
            detections = detections.len(),
            failures = failures.len(),
            "Detector finished"
        );
        DetectorReport {
            detections,
            failures,
        }
    }
}

impl EcosystemProfile {
    fn normalize(&self, deps: Vec<String>) -> FxHashSet<String> {
        if self.case_insensitive {
            deps.into_iter().map(|d| d.to_lowercase()).collect()
        } else {
            deps.into_iter().collect()
        }
    }

    fn signature_matches(&self, signature: &FrameworkSignature, deps: &FxHashSet<String>) -> bool {
        signature.dependencies.iter().any(|wanted| {
            let wanted = if self.case_insensitive {
                wanted.to_lowercase()
            } else {
                (*wanted).to_owned()
            };
            match wanted.strip_suffix('*') {
                Some(prefix) => deps.iter().any(|dep| dep.starts_with(prefix)),
                None => deps.contains(&wanted),
            }
        })
    }
}

/// Keeps one detection per framework id.
///
/// Higher confidence wins; on a tie the detection with fewer path segments
/// wins. Output keeps the order in which ids first appeared.
///
/// # Examples
///
/// ```
/// use camino::Utf8PathBuf;
/// use gw_core::{Ecosystem, FrameworkDetection};
/// use gw_detect::dedup_detections;
///
/// let a = FrameworkDetection::new("react", "React", Utf8PathBuf::from("/p/a/package.json"), 0.85, Ecosystem::Node);
/// let b = FrameworkDetection::new("react", "React", Utf8PathBuf::from("/p/b/package.json"), 0.90, Ecosystem::Node);
///
/// let kept = dedup_detections(vec![a, b]);
/// assert_eq!(kept.len(), 1);
/// assert!((kept[0].confidence - 0.90).abs() < f32::EPSILON);
/// ```
#[must_use]
pub fn dedup_detections(detections: Vec<FrameworkDetection>) -> Vec<FrameworkDetection> {
    let mut index = fx_hash_map();
    let mut kept: Vec<FrameworkDetection> = Vec::with_capacity(detections.len());
    for detection in detections {
        match index.get(&detection.id) {
            Some(&slot) => {
                let current: &mut FrameworkDetection = &mut kept[slot];
                if detection.supersedes(current) {
                    *current = detection;
                }
            }
            None => {
                index.insert(detection.id.clone(), kept.len());
                kept.push(detection);
            }
        }
    }
    kept
}
