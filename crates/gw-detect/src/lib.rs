//! Framework detection for gitward.
//!
//! Detectors look for ecosystem manifests (`package.json`, `pyproject.toml`,
//! `go.mod`, ...) under a project root, read their declared dependencies,
//! and report which frameworks are in use together with a confidence score.
//!
//! # Overview
//!
//! - [`ManifestWalker`]: finds manifests while pruning dependency directories
//! - [`read_dependencies`]: extracts dependency names from one manifest
//! - [`FrameworkDetector`]: the per-ecosystem detector seam
//! - [`DetectionCoordinator`]: runs every detector over every root, cached
//!
//! # Example
//!
//! ```
//! use camino::Utf8Path;
//! use gw_detect::DetectionCoordinator;
//!
//! let dir = tempfile::tempdir().unwrap();
//! let root = Utf8Path::from_path(dir.path()).unwrap();
//! std::fs::write(root.join("Cargo.toml"), "[package]\nname = \"demo\"\n\n[dependencies]\nbevy = \"0.14\"\n").unwrap();
//!
//! let coordinator = DetectionCoordinator::new(vec![root.to_owned()]);
//! let ids: Vec<_> = coordinator.detect_all(false).iter().map(|d| d.id.to_string()).collect();
//! assert_eq!(ids, ["rust", "bevy"]);
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod cache;
pub mod coordinator;
pub mod detector;
pub mod detectors;
pub mod error;
pub mod manifest;
pub mod walker;

pub use cache::DetectionCache;
pub use coordinator::DetectionCoordinator;
pub use detector::{
    BASE_CONFIDENCE, CONFIG_FILE_BONUS, DetectorReport, EcosystemProfile, FrameworkDetector,
    FrameworkSignature, MarkerFile, dedup_detections,
};
pub use detectors::default_detectors;
pub use error::DetectError;
pub use manifest::{ManifestKind, read_dependencies};
pub use walker::{ManifestWalker, WalkOutcome};
