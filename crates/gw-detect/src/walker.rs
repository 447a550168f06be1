//! Manifest discovery.
//!
//! [`ManifestWalker`] walks a project tree with the `ignore` crate and
//! collects files whose name matches one of a detector's trigger names.
//! Dependency and build-output directories are pruned so that, for example,
//! every `package.json` inside `node_modules` is never visited.

use camino::{Utf8Path, Utf8PathBuf};
use ignore::WalkBuilder;

use crate::error::DetectError;

/// Directories never descended into.
const SKIP_DIRECTORIES: &[&str] = &[
    "node_modules",
    "bower_components",
    "vendor",
    "target",
    "dist",
    "build",
    "out",
    ".git",
    ".hg",
    ".svn",
    "venv",
    ".venv",
    "env",
    "__pycache__",
    ".tox",
    ".gradle",
    ".next",
    ".nuxt",
    ".idea",
];

/// Default maximum recursion depth below the root.
const DEFAULT_MAX_DEPTH: usize = 8;

/// Paths found by one walk, plus entries that could not be visited.
#[derive(Debug, Default)]
pub struct WalkOutcome {
    /// Matching files, sorted by path.
    pub paths: Vec<Utf8PathBuf>,
    /// Entries skipped because of an error.
    pub errors: Vec<DetectError>,
}

impl WalkOutcome {
    /// Found paths whose file name matches one of `names`, in walk order.
    #[must_use]
    pub fn matching(&self, names: &[&str]) -> Vec<Utf8PathBuf> {
        self.paths
            .iter()
            .filter(|path| {
                path.file_name()
                    .is_some_and(|file_name| names.iter().any(|name| name_matches(file_name, name)))
            })
            .cloned()
            .collect()
    }
}

/// Walks a project tree looking for manifests.
///
/// # Examples
///
/// ```
/// use camino::Utf8Path;
/// use gw_detect::ManifestWalker;
///
/// let dir = tempfile::tempdir().unwrap();
/// let root = Utf8Path::from_path(dir.path()).unwrap();
/// std::fs::create_dir_all(root.join("web/node_modules/left-pad")).unwrap();
/// std::fs::write(root.join("web/package.json"), "{}").unwrap();
/// std::fs::write(root.join("web/node_modules/left-pad/package.json"), "{}").unwrap();
///
/// let outcome = ManifestWalker::new(root).unwrap().collect(&["package.json"]);
/// assert_eq!(outcome.paths, vec![root.join("web/package.json")]);
/// ```
#[derive(Debug, Clone)]
pub struct ManifestWalker {
    root: Utf8PathBuf,
    skip_dirs: Vec<String>,
    max_depth: Option<usize>,
}

impl ManifestWalker {
    /// Creates a walker rooted at `root`.
    ///
    /// # Errors
    ///
    /// Returns [`DetectError::Config`] if the root doesn't exist or isn't a
    /// directory.
    pub fn new(root: &Utf8Path) -> Result<Self, DetectError> {
        if !root.exists() {
            return Err(DetectError::config(format!(
                "root path does not exist: {root}"
            )));
        }
        if !root.is_dir() {
            return Err(DetectError::config(format!(
                "root path is not a directory: {root}"
            )));
        }

        Ok(Self {
            root: root.to_owned(),
            skip_dirs: Vec::new(),
            max_depth: Some(DEFAULT_MAX_DEPTH),
        })
    }

    /// Adds directory names to prune, beyond the built-in list.
    #[must_use]
    pub fn with_skip_dirs(mut self, dirs: &[&str]) -> Self {
        self.skip_dirs.extend(dirs.iter().map(ToString::to_string));
        self
    }

    /// Limits recursion depth; `None` walks the whole tree.
    #[must_use]
    pub const fn with_max_depth(mut self, depth: Option<usize>) -> Self {
        self.max_depth = depth;
        self
    }

    /// Returns the root directory being walked.
    #[inline]
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Collects every file whose name matches one of `names`.
    ///
    /// A name may contain one `*`, e.g. `requirements*.txt`. Errors on
    /// individual entries are collected rather than aborting the walk.
    #[must_use]
    pub fn collect(&self, names: &[&str]) -> WalkOutcome {
        let mut outcome = WalkOutcome::default();

        for result in self.build_walker() {
            let entry = match result {
                Ok(entry) => entry,
                Err(err) => {
                    outcome.errors.push(DetectError::Walk(err));
                    continue;
                }
            };

            if !entry.file_type().is_some_and(|ft| ft.is_file()) {
                continue;
            }

            let Some(path) = Utf8Path::from_path(entry.path()) else {
                outcome
                    .errors
                    .push(DetectError::NonUtf8Path(entry.path().to_owned()));
                continue;
            };

            let is_manifest = path
                .file_name()
                .is_some_and(|file_name| names.iter().any(|name| name_matches(file_name, name)));
            if is_manifest {
                outcome.paths.push(path.to_owned());
            }
        }

        outcome.paths.sort();
        tracing::trace!(
            root = %self.root,
            found = outcome.paths.len(),
            errors = outcome.errors.len(),
            "Manifest walk finished"
        );
        outcome
    }

    fn build_walker(&self) -> ignore::Walk {
        let mut skip: Vec<String> = SKIP_DIRECTORIES.iter().map(ToString::to_string).collect();
        skip.extend(self.skip_dirs.iter().cloned());

        WalkBuilder::new(&self.root)
            .standard_filters(true)
            .follow_links(false)
            .max_depth(self.max_depth)
            .require_git(false)
            .sort_by_file_name(|a, b| a.cmp(b))
            .filter_entry(move |entry| {
                let is_dir = entry.file_type().is_some_and(|ft| ft.is_dir());
                // Depth 0 is the root itself, which is never pruned.
                !(is_dir
                    && entry.depth() > 0
                    && entry
                        .file_name()
                        .to_str()
                        .is_some_and(|name| skip.iter().any(|s| s == name)))
            })
            .build()
    }
}

/// Matches a file name against a trigger name with at most one `*`.
fn name_matches(file_name: &str, pattern: &str) -> bool {
    match pattern.split_once('*') {
        None => file_name == pattern,
        Some((prefix, suffix)) => {
            file_name.len() >= prefix.len() + suffix.len()
                && file_name.starts_with(prefix)
                && file_name.ends_with(suffix)
        }
    }
}
