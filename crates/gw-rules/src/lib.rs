//! Pattern matching and rule resolution for gitward.
//!
//! This crate answers two questions: which ignore rules apply to a project,
//! and does a given path fall under one of them.
//!
//! # Overview
//!
//! - [`PatternMatcher`]: gitignore-style matching of one path against one pattern
//! - [`RuleCatalog`]: the embedded, per-ecosystem rule data
//! - [`RuleEngine`]: merges catalog rules for a set of framework detections
//! - [`IgnoreFileModel`]: reads and appends to the project's ignore file
//! - [`scan_staged`]: classifies files staged for commit
//!
//! # Example
//!
//! ```
//! use camino::{Utf8Path, Utf8PathBuf};
//! use gw_core::{Ecosystem, FrameworkDetection, Severity};
//! use gw_rules::{RuleEngine, filter_by_severity};
//!
//! let engine = RuleEngine::builtin();
//! let detections = [
//!     FrameworkDetection::new("python", "Python", Utf8PathBuf::from("/srv/app/requirements.txt"), 0.8, Ecosystem::Python),
//!     FrameworkDetection::new("django", "Django", Utf8PathBuf::from("/srv/app/manage.py"), 0.98, Ecosystem::Python),
//! ];
//!
//! let rules = engine.rules_for_detections(&detections);
//! let critical = filter_by_severity(&rules, Severity::Critical);
//! assert!(critical.iter().any(|r| r.pattern == "db.sqlite3"));
//!
//! let hit = engine.match_first(Utf8Path::new("app/__pycache__/views.cpython-312.pyc"), &rules);
//! assert_eq!(hit.map(|r| r.pattern.as_str()), Some("__pycache__/"));
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod catalog;
pub mod engine;
pub mod error;
pub mod ignore_file;
pub mod matcher;
pub mod staged;

pub use catalog::{RuleCatalog, RuleSet};
pub use engine::{RuleEngine, filter_by_severity};
pub use error::{CatalogError, IgnoreFileError};
pub use ignore_file::{AppendReport, DEFAULT_IGNORE_FILE, IgnoreFileModel, IgnoreSnapshot};
pub use matcher::{MatcherOptions, PatternMatcher, QuestionMark, glob_to_regex};
pub use staged::{Finding, StagedFile, StagedFileSource, StagedReport, scan_staged};
