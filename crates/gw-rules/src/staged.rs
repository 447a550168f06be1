//! Classification of files staged for commit.
//!
//! Where staged paths come from is the host's business; [`StagedFileSource`]
//! is the seam. The scan itself treats `?` in patterns as a single-character
//! wildcard, unlike the creation watcher.

use camino::Utf8PathBuf;
use gw_core::{Rule, Severity};

use crate::matcher::{MatcherOptions, PatternMatcher};

/// A path staged for commit, relative to the repository root.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StagedFile {
    /// Repository-relative path.
    pub path: Utf8PathBuf,
}

impl StagedFile {
    /// Creates a staged file entry.
    #[must_use]
    pub fn new(path: impl Into<Utf8PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

/// Supplies the list of staged files.
pub trait StagedFileSource {
    /// Error produced when the list cannot be obtained.
    type Error;

    /// Returns every staged path.
    ///
    /// # Errors
    ///
    /// Implementation-defined.
    fn staged_files(&self) -> Result<Vec<StagedFile>, Self::Error>;
}

impl StagedFileSource for Vec<StagedFile> {
    type Error = std::convert::Infallible;

    fn staged_files(&self) -> Result<Vec<StagedFile>, Self::Error> {
        Ok(self.clone())
    }
}

/// A staged file that matched a rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    /// The staged path.
    pub path: Utf8PathBuf,
    /// First rule that matched it.
    pub rule: Rule,
}

/// Result of [`scan_staged`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StagedReport {
    /// Findings in staged-file order.
    pub findings: Vec<Finding>,
}

impl StagedReport {
    /// Findings of exactly `severity`.
    pub fn by_severity(&self, severity: Severity) -> impl Iterator<Item = &Finding> {
        self.findings
            .iter()
            .filter(move |finding| finding.rule.severity == severity)
    }

    /// Returns `true` if any finding is [`Severity::Critical`].
    #[must_use]
    pub fn has_critical(&self) -> bool {
        self.findings.iter().any(|finding| finding.rule.is_critical())
    }

    /// Returns `true` if no staged file matched.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.findings.is_empty()
    }
}

/// Matches every staged file against `rules`, recording the first rule hit.
///
/// # Examples
///
/// ```
/// use gw_core::{Rule, Severity};
/// use gw_rules::{StagedFile, scan_staged};
///
/// let rules = [Rule::new(".env", Severity::Critical, "secrets")];
/// let files = [StagedFile::new("src/main.rs"), StagedFile::new("api/.env.production")];
///
/// let report = scan_staged(&files, &rules);
/// assert!(report.has_critical());
/// assert_eq!(report.findings[0].path, "api/.env.production");
/// ```
#[must_use]
pub fn scan_staged(files: &[StagedFile], rules: &[Rule]) -> StagedReport {
    let matcher = PatternMatcher::with_options(MatcherOptions::single_char_wildcard());
    let findings: Vec<Finding> = files
        .iter()
        .filter_map(|file| {
            rules
                .iter()
                .find(|rule| matcher.matches_path(&file.path, &rule.pattern))
                .map(|rule| Finding {
                    path: file.path.clone(),
                    rule: rule.clone(),
                })
        })
        .collect();

    tracing::debug!(
        staged = files.len(),
        findings = findings.len(),
        "Scanned staged files"
    );
    StagedReport { findings }
}
