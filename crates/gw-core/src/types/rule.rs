//! Ignore rules.

use serde::{Deserialize, Serialize};

use super::Severity;

/// A single ignore-list rule: a gitignore-style pattern plus why it matters.
///
/// Rules are loaded once from the built-in catalog and never mutated.
///
/// # Examples
///
/// ```
/// use gw_core::{Rule, Severity};
///
/// let rule = Rule::new(".env", Severity::Critical, "Environment secrets");
/// assert_eq!(rule.normalized_pattern(), ".env");
///
/// let dir = Rule::new("node_modules/", Severity::Recommended, "Dependencies");
/// assert_eq!(dir.normalized_pattern(), "node_modules");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rule {
    /// The gitignore-style pattern, exactly as it is written to the ignore file.
    pub pattern: String,

    /// Urgency tier.
    pub severity: Severity,

    /// Human-readable explanation shown to the user.
    pub reason: String,
}

impl Rule {
    /// Creates a new rule.
    #[must_use]
    pub fn new(pattern: impl Into<String>, severity: Severity, reason: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            severity,
            reason: reason.into(),
        }
    }

    /// Returns the pattern with any trailing `/` removed.
    ///
    /// `node_modules/` and `node_modules` name the same entry in an ignore
    /// file; comparisons between rules and existing lines use this form.
    #[inline]
    #[must_use]
    pub fn normalized_pattern(&self) -> &str {
        normalize_pattern(&self.pattern)
    }

    /// Returns `true` if this rule is [`Severity::Critical`].
    #[inline]
    #[must_use]
    pub fn is_critical(&self) -> bool {
        self.severity == Severity::Critical
    }
}

/// Strips every trailing `/` from a pattern.
///
/// # Examples
///
/// ```
/// use gw_core::normalize_pattern;
///
/// assert_eq!(normalize_pattern("dist/"), "dist");
/// assert_eq!(normalize_pattern("*.log"), "*.log");
/// ```
#[inline]
#[must_use]
pub fn normalize_pattern(pattern: &str) -> &str {
    pattern.trim_end_matches('/')
}
