//! Error types for the gw-watcher crate.

use camino::Utf8PathBuf;

/// Errors that can occur while watching a project for new files.
///
/// # Error Recovery Strategy
///
/// - **Notify errors** ([`WatchError::Notify`]): Fatal, the OS watcher is unusable
/// - **Path not found** ([`WatchError::PathNotFound`]): Fatal, the root must exist
/// - **Channel closed** ([`WatchError::ChannelClosed`]): Fatal, the watcher thread is gone
/// - **Non-UTF-8 path** ([`WatchError::NonUtf8Path`]): Recoverable, the event is skipped
/// - **I/O errors** ([`WatchError::Io`]): Fatal
///
/// # Examples
///
/// ```
/// use gw_watcher::WatchError;
///
/// let err = WatchError::path_not_found("/missing/project");
/// assert!(err.is_fatal());
/// assert_eq!(err.to_string(), "path does not exist: /missing/project");
/// ```
#[derive(Debug, thiserror::Error)]
pub enum WatchError {
    /// Failed to initialize or operate the notify watcher.
    #[error("notify watcher error: {0}")]
    Notify(#[from] notify::Error),

    /// The directory to watch does not exist.
    #[error("path does not exist: {0}")]
    PathNotFound(Utf8PathBuf),

    /// The watcher thread stopped unexpectedly.
    #[error("event channel closed unexpectedly")]
    ChannelClosed,

    /// A path in a file event is not valid UTF-8.
    #[error("path is not valid UTF-8: {}", _0.display())]
    NonUtf8Path(std::path::PathBuf),

    /// An I/O error occurred while resolving the watch root.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl WatchError {
    /// Creates a new [`WatchError::PathNotFound`] error.
    #[inline]
    pub fn path_not_found(path: impl Into<Utf8PathBuf>) -> Self {
        Self::PathNotFound(path.into())
    }

    /// Creates a new [`WatchError::NonUtf8Path`] error.
    #[inline]
    pub fn non_utf8_path(path: impl Into<std::path::PathBuf>) -> Self {
        Self::NonUtf8Path(path.into())
    }

    /// Returns `true` if watching can continue after this error.
    #[inline]
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::NonUtf8Path(_))
    }

    /// Returns `true` if watching must stop.
    #[inline]
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        !self.is_recoverable()
    }
}
