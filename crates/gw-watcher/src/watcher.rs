//! Bridge from the synchronous `notify` watcher to tokio.
//!
//! ```text
//! ┌──────────────────── Blocking thread (spawn_blocking) ────────────────────┐
//! │  RecommendedWatcher ──► callback (Create events only, UTF-8, not .git/)  │
//! └───────────────────────────────────────┬──────────────────────────────────┘
//!                                         │ blocking_send
//!                                         ▼
//! ┌──────────────────────────── Async runtime ───────────────────────────────┐
//! │  FileWatcher (shutdown control) ──► mpsc::Receiver<CreationEvent>        │
//! └──────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Debouncing is not done here; [`EventBatcher`](crate::EventBatcher) owns
//! the quiet-period logic so it can be driven by explicit time in tests.

use std::path::PathBuf;

use camino::{Utf8Path, Utf8PathBuf};
use notify::event::CreateKind;
use notify::{Event, EventKind, RecursiveMode, Watcher};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use gw_core::WatchConfig;

use crate::error::WatchError;
use crate::events::CreationEvent;

/// Default channel capacity for creation events.
const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// Watches a project root for newly created files and directories.
///
/// Dropping the watcher signals the background thread to stop.
///
/// # Examples
///
/// ```no_run
/// use camino::Utf8Path;
/// use gw_core::WatchConfig;
/// use gw_watcher::FileWatcher;
///
/// # async fn example() -> Result<(), gw_watcher::WatchError> {
/// let mut watcher = FileWatcher::new(Utf8Path::new("."), &WatchConfig::default())?;
/// while let Some(event) = watcher.recv().await {
///     println!("created: {}", event.path);
/// }
/// # Ok(())
/// # }
/// ```
pub struct FileWatcher {
    shutdown_tx: Option<oneshot::Sender<()>>,
    task_handle: Option<JoinHandle<Result<(), WatchError>>>,
    event_rx: mpsc::Receiver<CreationEvent>,
    watch_path: Utf8PathBuf,
}

impl std::fmt::Debug for FileWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileWatcher")
            .field("watch_path", &self.watch_path)
            .field("is_running", &self.is_running())
            .finish_non_exhaustive()
    }
}

impl FileWatcher {
    /// Starts watching `path`. Must be called within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`WatchError::PathNotFound`] if the path doesn't exist and
    /// [`WatchError::Io`] if it cannot be canonicalized.
    pub fn new(path: &Utf8Path, config: &WatchConfig) -> Result<Self, WatchError> {
        Self::with_capacity(path, config, DEFAULT_CHANNEL_CAPACITY)
    }

    /// Starts watching with a custom channel capacity.
    ///
    /// # Errors
    ///
    /// Same as [`FileWatcher::new`].
    pub fn with_capacity(
        path: &Utf8Path,
        config: &WatchConfig,
        channel_capacity: usize,
    ) -> Result<Self, WatchError> {
        if !path.exists() {
            return Err(WatchError::path_not_found(path));
        }
        let watch_path = path.canonicalize_utf8()?;

        let (event_tx, event_rx) = mpsc::channel(channel_capacity);
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let task_path = watch_path.clone();
        let recursive = config.recursive;
        let task_handle = tokio::task::spawn_blocking(move || {
            run_watcher_loop(task_path, recursive, event_tx, shutdown_rx)
        });

        Ok(Self {
            shutdown_tx: Some(shutdown_tx),
            task_handle: Some(task_handle),
            event_rx,
            watch_path,
        })
    }

    /// Receives the next creation event. Returns `None` once the watcher has
    /// stopped.
    pub async fn recv(&mut self) -> Option<CreationEvent> {
        self.event_rx.recv().await
    }

    /// Returns the event receiver, for use with `tokio::select!`.
    pub fn events(&mut self) -> &mut mpsc::Receiver<CreationEvent> {
        &mut self.event_rx
    }

    /// The canonical path being watched.
    #[must_use]
    pub fn watch_path(&self) -> &Utf8Path {
        &self.watch_path
    }

    /// Returns `true` while the background thread is alive.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.shutdown_tx.is_some() && self.task_handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Stops the background thread and waits for it.
    ///
    /// # Errors
    ///
    /// Returns the error the watcher thread stopped with, or
    /// [`WatchError::ChannelClosed`] if it panicked.
    pub async fn shutdown(mut self) -> Result<(), WatchError> {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.task_handle.take() {
            match handle.await {
                Ok(result) => result?,
                Err(_join_error) => return Err(WatchError::ChannelClosed),
            }
        }
        Ok(())
    }
}

impl Drop for FileWatcher {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

#[allow(clippy::needless_pass_by_value)] // Owned values live for the whole blocking task
fn run_watcher_loop(
    path: Utf8PathBuf,
    recursive: bool,
    event_tx: mpsc::Sender<CreationEvent>,
    shutdown_rx: oneshot::Receiver<()>,
) -> Result<(), WatchError> {
    let tx = event_tx;
    let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| match res {
        Ok(event) => {
            let EventKind::Create(kind) = event.kind else {
                return;
            };
            for path in event.paths {
                let Some(creation) = to_creation_event(path, kind) else {
                    continue;
                };
                if tx.blocking_send(creation).is_err() {
                    tracing::debug!("Event channel closed, dropping creation events");
                    return;
                }
            }
        }
        Err(error) => tracing::warn!(%error, "Watcher error"),
    })?;

    let mode = if recursive {
        RecursiveMode::Recursive
    } else {
        RecursiveMode::NonRecursive
    };
    watcher.watch(path.as_std_path(), mode)?;
    tracing::info!(%path, recursive, "File watcher started");

    let _ = shutdown_rx.blocking_recv();

    tracing::info!(%path, "File watcher stopped");
    Ok(())
}

fn to_creation_event(path: PathBuf, kind: CreateKind) -> Option<CreationEvent> {
    let path = match Utf8PathBuf::try_from(path) {
        Ok(path) => path,
        Err(e) => {
            let error = WatchError::non_utf8_path(e.into_path_buf());
            tracing::warn!(%error, "Skipping creation event");
            return None;
        }
    };
    if is_vcs_internal(&path) {
        return None;
    }
    let is_dir = match kind {
        CreateKind::Folder => true,
        CreateKind::File => false,
        _ => path.is_dir(),
    };
    Some(CreationEvent::new(path, is_dir))
}

/// Paths inside a version-control metadata directory.
fn is_vcs_internal(path: &Utf8Path) -> bool {
    path.components()
        .any(|c| matches!(c.as_str(), ".git" | ".hg" | ".svn"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::Duration;

    #[test]
    fn test_vcs_paths_are_filtered() {
        assert!(is_vcs_internal(Utf8Path::new("/repo/.git/index.lock")));
        assert!(!is_vcs_internal(Utf8Path::new("/repo/.gitignore")));
        assert!(!is_vcs_internal(Utf8Path::new("/repo/src/git.rs")));
    }

    #[test]
    fn test_creation_kind_sets_is_dir() {
        let event = to_creation_event(PathBuf::from("/repo/dist"), CreateKind::Folder).unwrap();
        assert!(event.is_dir);
        let event = to_creation_event(PathBuf::from("/repo/.env"), CreateKind::File).unwrap();
        assert!(!event.is_dir);
        assert!(to_creation_event(PathBuf::from("/repo/.git/HEAD"), CreateKind::File).is_none());
    }

    #[tokio::test]
    async fn test_watcher_path_not_found() {
        let result = FileWatcher::new(
            Utf8Path::new("/nonexistent/gitward/watch"),
            &WatchConfig::default(),
        );
        assert!(matches!(result, Err(WatchError::PathNotFound(_))));
    }

    #[tokio::test]
    async fn test_watcher_starts_and_shuts_down() {
        let dir = tempfile::tempdir().unwrap();
        let path = Utf8Path::from_path(dir.path()).unwrap();

        let watcher = FileWatcher::new(path, &WatchConfig::default()).unwrap();
        assert!(watcher.watch_path().is_absolute());
        assert!(watcher.shutdown().await.is_ok());
    }

    #[tokio::test]
    async fn test_watcher_reports_created_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = Utf8Path::from_path(dir.path()).unwrap();
        let mut watcher = FileWatcher::new(path, &WatchConfig::default()).unwrap();

        // Give the backend a moment to register the watch.
        tokio::time::sleep(Duration::from_millis(100)).await;
        fs::write(dir.path().join(".env"), "SECRET=1").unwrap();

        let event = tokio::time::timeout(Duration::from_secs(2), watcher.recv()).await;
        watcher.shutdown().await.unwrap();

        // Timing-dependent on some CI filesystems.
        if let Ok(Some(event)) = event {
            assert_eq!(event.file_name(), Some(".env"));
        }
    }
}
