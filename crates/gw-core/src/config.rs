//! Configuration structures for gitward.
//!
//! - [`WatchConfig`] - File-creation watcher settings (debounce, recursion)
//! - [`Config`] - Root configuration, the settings surface the host persists
//!
//! All configuration types implement [`Default`] and deserialize with
//! `#[serde(default)]`, so a partial `.gitward.json` is always valid.

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// File name of the per-project configuration file.
pub const CONFIG_FILE_NAME: &str = ".gitward.json";

/// Configuration for the file-creation watcher.
///
/// # Examples
///
/// ```
/// use gw_core::WatchConfig;
///
/// let config = WatchConfig::default();
/// assert_eq!(config.debounce_ms, 500);
/// assert!(config.recursive);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    /// Quiet period in milliseconds before pending warnings are flushed.
    ///
    /// Every qualifying event re-arms the timer, so a burst of creations is
    /// reported once, `debounce_ms` after the last one.
    pub debounce_ms: u64,

    /// Whether to watch subdirectories recursively.
    pub recursive: bool,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 500,
            recursive: true,
        }
    }
}

impl WatchConfig {
    /// Returns the debounce window as a [`Duration`](std::time::Duration).
    #[inline]
    #[must_use]
    pub const fn debounce(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.debounce_ms)
    }
}

/// Root configuration for gitward.
///
/// Mirrors the settings surface exposed to users. The core reads it; only the
/// host (the CLI) persists it.
///
/// # Examples
///
/// ```
/// use gw_core::Config;
///
/// let config: Config = serde_json::from_str(r#"{"suppressed_warnings": ["*.log"]}"#).unwrap();
/// assert!(config.enabled);
/// assert!(config.is_suppressed("*.log"));
/// assert_eq!(config.watch.debounce_ms, 500);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Master switch.
    pub enabled: bool,

    /// Offer missing rules after detection.
    pub auto_suggest: bool,

    /// Check staged files before commit.
    pub pre_commit_check: bool,

    /// Append missing rules without prompting.
    pub modify_gitignore_automatically: bool,

    /// Warn when risky files are created while watching.
    pub watch_file_creation: bool,

    /// Rule patterns never suggested.
    pub ignored_patterns: Vec<String>,

    /// Rule patterns that never raise a creation warning.
    pub suppressed_warnings: Vec<String>,

    /// Watcher settings.
    pub watch: WatchConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            enabled: true,
            auto_suggest: true,
            pre_commit_check: true,
            modify_gitignore_automatically: false,
            watch_file_creation: true,
            ignored_patterns: Vec::new(),
            suppressed_warnings: Vec::new(),
            watch: WatchConfig::default(),
        }
    }
}

impl Config {
    /// Loads a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Parse`] if it is not valid JSON, and
    /// [`ConfigError::InvalidOption`] if a value is out of range.
    pub fn load(path: &Utf8Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads `<root>/.gitward.json`, or returns defaults when it is absent.
    ///
    /// # Errors
    ///
    /// Same as [`load`](Self::load) for a file that exists but is unreadable
    /// or invalid. Returns [`ConfigError::MissingDirectory`] when `root`
    /// itself does not exist.
    pub fn load_or_default(root: &Utf8Path) -> Result<Self, ConfigError> {
        if !root.is_dir() {
            return Err(ConfigError::MissingDirectory(root.to_owned()));
        }
        let path = Self::path_in(root);
        if path.is_file() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Writes this configuration as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be written.
    pub fn save(&self, path: &Utf8Path) -> Result<(), ConfigError> {
        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');
        std::fs::write(path, json).map_err(|e| ConfigError::io(path, e))
    }

    /// Returns the configuration file path for a project root.
    #[must_use]
    pub fn path_in(root: &Utf8Path) -> Utf8PathBuf {
        root.join(CONFIG_FILE_NAME)
    }

    /// Checks value ranges that serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidOption`] for a zero debounce window.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.watch.debounce_ms == 0 {
            return Err(ConfigError::invalid_option(
                "watch.debounce_ms",
                "must be greater than zero",
            ));
        }
        Ok(())
    }

    /// Returns `true` if warnings for `pattern` are suppressed.
    #[must_use]
    pub fn is_suppressed(&self, pattern: &str) -> bool {
        self.suppressed_warnings.iter().any(|p| p == pattern)
    }

    /// Returns `true` if `pattern` must never be suggested.
    #[must_use]
    pub fn is_ignored_pattern(&self, pattern: &str) -> bool {
        self.ignored_patterns.iter().any(|p| p == pattern)
    }

    /// Adds `pattern` to [`suppressed_warnings`](Self::suppressed_warnings).
    ///
    /// Returns `false` if it was already present.
    pub fn suppress(&mut self, pattern: &str) -> bool {
        if self.is_suppressed(pattern) {
            return false;
        }
        self.suppressed_warnings.push(pattern.to_owned());
        true
    }
}
