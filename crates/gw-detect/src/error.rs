//! Error types for the gw-detect crate.
//!
//! This module provides the [`DetectError`] type for failures that can occur
//! while locating and reading project manifests.

use camino::Utf8PathBuf;

/// Errors that can occur during framework detection.
///
/// Detectors never return these directly. They travel inside a
/// [`DetectorReport`](crate::DetectorReport) next to whatever detections
/// were still possible, and the coordinator logs them.
///
/// # Error Recovery Strategy
///
/// - **Root errors** ([`DetectError::Config`]): the whole root is skipped
/// - **Walk errors** ([`DetectError::Walk`]): the unreadable entry is skipped
/// - **Read/manifest errors**: the manifest still counts as present, but its
///   dependencies are unknown
///
/// # Examples
///
/// ```
/// use gw_detect::DetectError;
///
/// let err = DetectError::manifest("app/package.json", "expected a JSON object");
/// assert!(err.is_recoverable());
/// assert_eq!(err.path().map(|p| p.as_str()), Some("app/package.json"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum DetectError {
    /// Failed to walk part of the directory tree.
    #[error("failed to walk directory: {0}")]
    Walk(#[from] ignore::Error),

    /// Failed to read a manifest file.
    #[error("failed to read manifest {path}: {source}")]
    Read {
        /// The manifest that couldn't be read.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A manifest was read but its contents are malformed.
    #[error("malformed manifest {path}: {reason}")]
    Manifest {
        /// The offending manifest.
        path: Utf8PathBuf,
        /// What was wrong with it.
        reason: String,
    },

    /// A path is not valid UTF-8.
    #[error("path is not valid UTF-8: {}", _0.display())]
    NonUtf8Path(std::path::PathBuf),

    /// The project root is unusable.
    #[error("invalid project root: {0}")]
    Config(String),
}

impl DetectError {
    /// Creates a new [`DetectError::Read`] error.
    #[inline]
    pub fn read(path: impl Into<Utf8PathBuf>, source: std::io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }

    /// Creates a new [`DetectError::Manifest`] error.
    #[inline]
    pub fn manifest(path: impl Into<Utf8PathBuf>, reason: impl Into<String>) -> Self {
        Self::Manifest {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Creates a new [`DetectError::Config`] error.
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Returns `true` if detection of the root continued past this error.
    #[inline]
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Config(_))
    }

    /// Returns the manifest path associated with this error, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Utf8PathBuf> {
        match self {
            Self::Read { path, .. } | Self::Manifest { path, .. } => Some(path),
            Self::Walk(_) | Self::NonUtf8Path(_) | Self::Config(_) => None,
        }
    }
}
