//! Framework detection types.
//!
//! This module provides the [`Ecosystem`] grouping, the [`FrameworkId`]
//! newtype, and [`FrameworkDetection`], the record produced by each detection
//! pass.

use std::borrow::Cow;
use std::fmt;

use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

/// A language/platform grouping that shares one base rule set.
///
/// # Examples
///
/// ```
/// use gw_core::Ecosystem;
///
/// assert_eq!(Ecosystem::Node.as_str(), "node");
/// assert_eq!(Ecosystem::Python.display_name(), "Python");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ecosystem {
    /// JavaScript / TypeScript projects driven by `package.json`.
    Node,
    /// Python projects (`requirements.txt`, `pyproject.toml`, `Pipfile`).
    Python,
    /// JVM projects built with Maven or Gradle.
    Java,
    /// Cargo projects.
    Rust,
    /// Go modules.
    Go,
    /// Composer-managed PHP projects.
    Php,
    /// Bundler-managed Ruby projects.
    Ruby,
}

impl Ecosystem {
    /// Every supported ecosystem, in registration order.
    pub const ALL: [Self; 7] = [
        Self::Node,
        Self::Python,
        Self::Java,
        Self::Rust,
        Self::Go,
        Self::Php,
        Self::Ruby,
    ];

    /// Returns the stable lower-case key used in catalogs and JSON output.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Node => "node",
            Self::Python => "python",
            Self::Java => "java",
            Self::Rust => "rust",
            Self::Go => "go",
            Self::Php => "php",
            Self::Ruby => "ruby",
        }
    }

    /// Returns a human-readable name.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Node => "Node.js",
            Self::Python => "Python",
            Self::Java => "Java",
            Self::Rust => "Rust",
            Self::Go => "Go",
            Self::Php => "PHP",
            Self::Ruby => "Ruby",
        }
    }
}

impl fmt::Display for Ecosystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Identifier of a detected framework, e.g. `"nextjs"` or `"django"`.
///
/// The base "ecosystem present" detection uses the ecosystem key itself as
/// its id (`"node"`, `"python"`, ...). Built-in ids are `'static` and never
/// allocate.
///
/// # Examples
///
/// ```
/// use gw_core::FrameworkId;
///
/// let id = FrameworkId::from_static("nextjs");
/// assert_eq!(id, FrameworkId::new("nextjs".to_owned()));
/// assert_eq!(id.as_str(), "nextjs");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FrameworkId(Cow<'static, str>);

impl FrameworkId {
    /// Creates an id from an owned string.
    #[inline]
    #[must_use]
    pub fn new(id: String) -> Self {
        Self(Cow::Owned(id))
    }

    /// Creates an id from a static string without allocating.
    #[inline]
    #[must_use]
    pub const fn from_static(id: &'static str) -> Self {
        Self(Cow::Borrowed(id))
    }

    /// Returns the id as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FrameworkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&'static str> for FrameworkId {
    #[inline]
    fn from(id: &'static str) -> Self {
        Self::from_static(id)
    }
}

/// One framework identified in a project tree.
///
/// Produced by a detector for a single pass; a refresh replaces the whole set.
///
/// # Examples
///
/// ```
/// use gw_core::{Ecosystem, FrameworkDetection};
/// use camino::Utf8PathBuf;
///
/// let detection = FrameworkDetection::new(
///     "nextjs",
///     "Next.js",
///     Utf8PathBuf::from("/work/app/package.json"),
///     1.0,
///     Ecosystem::Node,
/// );
/// assert_eq!(detection.id.as_str(), "nextjs");
/// assert_eq!(detection.path_depth(), 3);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameworkDetection {
    /// Framework identifier.
    pub id: FrameworkId,

    /// Human-readable framework name.
    pub display_name: String,

    /// The manifest or marker file that produced this detection.
    pub detected_at_path: Utf8PathBuf,

    /// Certainty in `[0.0, 1.0]`.
    pub confidence: f32,

    /// Ecosystem the framework belongs to.
    pub ecosystem: Ecosystem,
}

impl FrameworkDetection {
    /// Creates a detection, clamping `confidence` into `[0.0, 1.0]`.
    #[must_use]
    pub fn new(
        id: impl Into<FrameworkId>,
        display_name: impl Into<String>,
        detected_at_path: Utf8PathBuf,
        confidence: f32,
        ecosystem: Ecosystem,
    ) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            detected_at_path,
            confidence: confidence.clamp(0.0, 1.0),
            ecosystem,
        }
    }

    /// Number of path segments in [`detected_at_path`](Self::detected_at_path).
    ///
    /// Used to prefer detections closer to the project root on ties.
    #[must_use]
    pub fn path_depth(&self) -> usize {
        self.detected_at_path
            .components()
            .filter(|c| matches!(c, camino::Utf8Component::Normal(_)))
            .count()
    }

    /// Returns `true` if `self` should replace `other` for the same framework id.
    ///
    /// Higher confidence wins; on equal confidence the detection with fewer
    /// path segments wins. An exact tie keeps `other`.
    #[must_use]
    pub fn supersedes(&self, other: &Self) -> bool {
        match self.confidence.total_cmp(&other.confidence) {
            std::cmp::Ordering::Greater => true,
            std::cmp::Ordering::Less => false,
            std::cmp::Ordering::Equal => self.path_depth() < other.path_depth(),
        }
    }
}
