//! Error types for the gw-rules crate.

use camino::Utf8PathBuf;
use gw_core::Ecosystem;

/// Errors raised while loading a rule catalog.
///
/// Built-in catalogs are embedded at compile time, so in practice this only
/// surfaces for catalogs loaded from user-supplied TOML.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// The catalog text is not valid TOML for the catalog schema.
    #[error("failed to parse rule catalog '{name}': {source}")]
    Parse {
        /// Name of the catalog source.
        name: String,
        /// The underlying TOML error.
        #[source]
        source: toml::de::Error,
    },

    /// Two catalogs declare the same ecosystem.
    #[error("duplicate rule catalog for ecosystem '{0}'")]
    DuplicateEcosystem(Ecosystem),
}

/// Errors raised while reading or writing the ignore file.
///
/// This is the structured failure surfaced to callers of
/// [`IgnoreFileModel`](crate::IgnoreFileModel); the error message is meant to
/// be shown to the user as-is.
///
/// # Examples
///
/// ```
/// use gw_rules::IgnoreFileError;
/// use std::io;
///
/// let err = IgnoreFileError::write(
///     "/repo/.gitignore",
///     io::Error::new(io::ErrorKind::PermissionDenied, "read-only file system"),
/// );
/// assert!(err.to_string().contains("/repo/.gitignore"));
/// assert_eq!(err.path().as_str(), "/repo/.gitignore");
/// ```
#[derive(Debug, thiserror::Error)]
pub enum IgnoreFileError {
    /// The ignore file exists but could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        /// Path of the ignore file.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Writing the ignore file failed (permissions, disk, ...).
    #[error("failed to write {path}: {source}")]
    Write {
        /// Path of the ignore file.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl IgnoreFileError {
    /// Creates a new [`IgnoreFileError::Read`] error.
    #[inline]
    pub fn read(path: impl Into<Utf8PathBuf>, source: std::io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }

    /// Creates a new [`IgnoreFileError::Write`] error.
    #[inline]
    pub fn write(path: impl Into<Utf8PathBuf>, source: std::io::Error) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }

    /// Returns the ignore file path involved.
    #[must_use]
    pub fn path(&self) -> &Utf8PathBuf {
        match self {
            Self::Read { path, .. } | Self::Write { path, .. } => path,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_ignore_file_error_display() {
        let err = IgnoreFileError::read(
            "/repo/.gitignore",
            io::Error::new(io::ErrorKind::InvalidData, "stream did not contain valid UTF-8"),
        );
        assert_eq!(
            err.to_string(),
            "failed to read /repo/.gitignore: stream did not contain valid UTF-8"
        );
    }

    #[test]
    fn test_duplicate_ecosystem_display() {
        let err = CatalogError::DuplicateEcosystem(Ecosystem::Go);
        assert!(err.to_string().contains("'go'"));
    }
}
