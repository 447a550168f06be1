//! Rule resolution against a set of framework detections.

use std::sync::Arc;

use camino::Utf8Path;
use gw_core::{Config, Ecosystem, FrameworkDetection, FxHashSet, Rule, Severity, fx_hash_set};

use crate::catalog::RuleCatalog;
use crate::matcher::{MatcherOptions, PatternMatcher};

/// Resolves which rules apply to a project and matches paths against them.
///
/// # Examples
///
/// ```
/// use camino::{Utf8Path, Utf8PathBuf};
/// use gw_core::{Ecosystem, FrameworkDetection};
/// use gw_rules::RuleEngine;
///
/// let engine = RuleEngine::builtin();
/// let detections = [FrameworkDetection::new(
///     "node",
///     "Node.js",
///     Utf8PathBuf::from("/work/package.json"),
///     0.8,
///     Ecosystem::Node,
/// )];
///
/// let rules = engine.rules_for_detections(&detections);
/// let hit = engine.match_first(Utf8Path::new("web/node_modules/x/index.js"), &rules);
/// assert_eq!(hit.map(|r| r.pattern.as_str()), Some("node_modules/"));
/// ```
#[derive(Debug)]
pub struct RuleEngine {
    catalog: Arc<RuleCatalog>,
    matcher: PatternMatcher,
}

impl RuleEngine {
    /// Creates an engine over `catalog` with a default matcher.
    #[must_use]
    pub fn new(catalog: Arc<RuleCatalog>) -> Self {
        Self::with_options(catalog, MatcherOptions::default())
    }

    /// Creates an engine over `catalog` with custom matcher options.
    #[must_use]
    pub fn with_options(catalog: Arc<RuleCatalog>, options: MatcherOptions) -> Self {
        Self {
            catalog,
            matcher: PatternMatcher::with_options(options),
        }
    }

    /// Creates an engine over the built-in catalog.
    #[must_use]
    pub fn builtin() -> Self {
        Self::new(RuleCatalog::builtin())
    }

    /// The catalog this engine reads from.
    #[must_use]
    pub fn catalog(&self) -> &RuleCatalog {
        &self.catalog
    }

    /// The matcher used by [`match_first`](Self::match_first).
    #[must_use]
    pub fn matcher(&self) -> &PatternMatcher {
        &self.matcher
    }

    /// Merges the rules that apply to `detections`.
    ///
    /// Ecosystems are visited in order of first appearance. For each one the
    /// base rules come first, then the rules of every framework detected in
    /// that ecosystem, in detection order. A pattern already emitted is
    /// skipped, so the first occurrence wins. Ecosystems without a catalog
    /// entry contribute nothing.
    #[must_use]
    pub fn rules_for_detections(&self, detections: &[FrameworkDetection]) -> Vec<Rule> {
        let mut ecosystems: Vec<Ecosystem> = Vec::new();
        for detection in detections {
            if !ecosystems.contains(&detection.ecosystem) {
                ecosystems.push(detection.ecosystem);
            }
        }

        let mut seen: FxHashSet<&str> = fx_hash_set();
        let mut merged = Vec::new();
        for ecosystem in ecosystems {
            let Some(set) = self.catalog.rule_set(ecosystem) else {
                tracing::debug!(%ecosystem, "No rule set for ecosystem");
                continue;
            };

            let framework_rules = detections
                .iter()
                .filter(|d| d.ecosystem == ecosystem)
                .flat_map(|d| set.framework(&d.id));

            for rule in set.base_rules.iter().chain(framework_rules) {
                if seen.insert(rule.pattern.as_str()) {
                    merged.push(rule.clone());
                }
            }
        }

        tracing::trace!(
            detections = detections.len(),
            rules = merged.len(),
            "Resolved rules for detections"
        );
        merged
    }

    /// Like [`rules_for_detections`](Self::rules_for_detections), minus any
    /// rule whose pattern the user listed in
    /// [`Config::ignored_patterns`].
    #[must_use]
    pub fn active_rules(&self, detections: &[FrameworkDetection], config: &Config) -> Vec<Rule> {
        let mut rules = self.rules_for_detections(detections);
        rules.retain(|rule| !config.is_ignored_pattern(&rule.pattern));
        rules
    }

    /// Returns the first rule in `rules` that matches `relative_path`.
    ///
    /// Rule order decides which rule is reported when several match.
    #[must_use]
    pub fn match_first<'r>(&self, relative_path: &Utf8Path, rules: &'r [Rule]) -> Option<&'r Rule> {
        rules
            .iter()
            .find(|rule| self.matcher.matches_path(relative_path, &rule.pattern))
    }
}

/// Keeps the rules whose severity is at least `min`, preserving order.
///
/// # Examples
///
/// ```
/// use gw_core::{Rule, Severity};
/// use gw_rules::filter_by_severity;
///
/// let rules = [
///     Rule::new(".env", Severity::Critical, "secrets"),
///     Rule::new("dist/", Severity::Recommended, "build output"),
///     Rule::new(".DS_Store", Severity::Optional, "metadata"),
/// ];
/// let urgent = filter_by_severity(&rules, Severity::Recommended);
/// assert_eq!(urgent.len(), 2);
/// ```
#[must_use]
pub fn filter_by_severity(rules: &[Rule], min: Severity) -> Vec<Rule> {
    rules
        .iter()
        .filter(|rule| rule.severity.is_at_least(min))
        .cloned()
        .collect()
}
