//! The built-in rule catalog.
//!
//! Each ecosystem ships one TOML file under `catalog/`, embedded at compile
//! time. A file names its ecosystem, lists the base rules that apply whenever
//! the ecosystem is present, and groups framework rules by framework id:
//!
//! ```toml
//! ecosystem = "node"
//!
//! [[base]]
//! pattern = "node_modules/"
//! severity = "recommended"
//! reason = "Installed dependencies"
//!
//! [[frameworks.nextjs]]
//! pattern = ".next/"
//! severity = "recommended"
//! reason = "Next.js build output"
//! ```
//!
//! The catalog is parsed once per process and never mutated afterwards.

use std::sync::{Arc, LazyLock};

use gw_core::{Ecosystem, FrameworkId, FxHashMap, Rule, fx_hash_map_with_capacity};
use serde::Deserialize;

use crate::error::CatalogError;

/// Embedded catalog sources, in ecosystem registration order.
const BUILTIN_SOURCES: [(&str, &str); 7] = [
    ("node.toml", include_str!("../catalog/node.toml")),
    ("python.toml", include_str!("../catalog/python.toml")),
    ("java.toml", include_str!("../catalog/java.toml")),
    ("rust.toml", include_str!("../catalog/rust.toml")),
    ("go.toml", include_str!("../catalog/go.toml")),
    ("php.toml", include_str!("../catalog/php.toml")),
    ("ruby.toml", include_str!("../catalog/ruby.toml")),
];

static BUILTIN: LazyLock<Arc<RuleCatalog>> = LazyLock::new(|| {
    let mut catalog = RuleCatalog::default();
    for (name, source) in BUILTIN_SOURCES {
        let added = RuleCatalog::parse_source(name, source)
            .and_then(|(ecosystem, set)| catalog.insert(ecosystem, set));
        if let Err(error) = added {
            tracing::error!(catalog = name, %error, "Skipping built-in rule catalog");
        }
    }
    tracing::debug!(
        ecosystems = catalog.sets.len(),
        rules = catalog.rule_count(),
        "Loaded built-in rule catalog"
    );
    Arc::new(catalog)
});

/// On-disk shape of one catalog file.
#[derive(Debug, Deserialize)]
struct CatalogFile {
    ecosystem: Ecosystem,
    #[serde(default)]
    base: Vec<Rule>,
    #[serde(default)]
    frameworks: FxHashMap<FrameworkId, Vec<Rule>>,
}

/// Rules for one ecosystem.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSet {
    /// Rules that apply whenever the ecosystem is detected.
    pub base_rules: Vec<Rule>,

    /// Additional rules per framework id.
    pub framework_rules: FxHashMap<FrameworkId, Vec<Rule>>,
}

impl RuleSet {
    /// Returns the rules registered for `id`, or an empty slice.
    #[must_use]
    pub fn framework(&self, id: &FrameworkId) -> &[Rule] {
        self.framework_rules.get(id).map_or(&[], Vec::as_slice)
    }

    /// Total number of rules in this set, base and framework.
    #[must_use]
    pub fn rule_count(&self) -> usize {
        self.base_rules.len() + self.framework_rules.values().map(Vec::len).sum::<usize>()
    }
}

/// Immutable map from [`Ecosystem`] to its [`RuleSet`].
///
/// # Examples
///
/// ```
/// use gw_core::{Ecosystem, FrameworkId};
/// use gw_rules::RuleCatalog;
///
/// let catalog = RuleCatalog::builtin();
/// let node = catalog.rule_set(Ecosystem::Node).unwrap();
/// assert!(node.base_rules.iter().any(|r| r.pattern == "node_modules/"));
/// assert!(!node.framework(&FrameworkId::from_static("nextjs")).is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleCatalog {
    sets: FxHashMap<Ecosystem, RuleSet>,
}

impl RuleCatalog {
    /// Returns the process-wide built-in catalog.
    ///
    /// The first call parses the embedded TOML; later calls are a refcount
    /// bump. A built-in file that fails to parse is logged and left out.
    #[must_use]
    pub fn builtin() -> Arc<Self> {
        Arc::clone(&BUILTIN)
    }

    /// Builds a catalog from named TOML sources.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Parse`] for malformed TOML and
    /// [`CatalogError::DuplicateEcosystem`] if two sources claim the same
    /// ecosystem.
    pub fn from_sources<'a>(
        sources: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Result<Self, CatalogError> {
        let mut catalog = Self {
            sets: fx_hash_map_with_capacity(Ecosystem::ALL.len()),
        };
        for (name, source) in sources {
            let (ecosystem, set) = Self::parse_source(name, source)?;
            catalog.insert(ecosystem, set)?;
        }
        Ok(catalog)
    }

    /// Returns the rule set for `ecosystem`, if the catalog has one.
    #[must_use]
    pub fn rule_set(&self, ecosystem: Ecosystem) -> Option<&RuleSet> {
        self.sets.get(&ecosystem)
    }

    /// Ecosystems present in this catalog, in [`Ecosystem::ALL`] order.
    pub fn ecosystems(&self) -> impl Iterator<Item = Ecosystem> + '_ {
        Ecosystem::ALL
            .into_iter()
            .filter(|ecosystem| self.sets.contains_key(ecosystem))
    }

    /// Total number of rules across all ecosystems.
    #[must_use]
    pub fn rule_count(&self) -> usize {
        self.sets.values().map(RuleSet::rule_count).sum()
    }

    fn parse_source(name: &str, source: &str) -> Result<(Ecosystem, RuleSet), CatalogError> {
        let file: CatalogFile = toml::from_str(source).map_err(|source| CatalogError::Parse {
            name: name.to_owned(),
            source,
        })?;
        Ok((
            file.ecosystem,
            RuleSet {
                base_rules: file.base,
                framework_rules: file.frameworks,
            },
        ))
    }

    fn insert(&mut self, ecosystem: Ecosystem, set: RuleSet) -> Result<(), CatalogError> {
        if self.sets.contains_key(&ecosystem) {
            return Err(CatalogError::DuplicateEcosystem(ecosystem));
        }
        self.sets.insert(ecosystem, set);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gw_core::{FxHashSet, Severity};

    #[test]
    fn test_builtin_covers_every_ecosystem() {
        let catalog = RuleCatalog::builtin();
        let loaded: Vec<_> = catalog.ecosystems().collect();
        assert_eq!(loaded, Ecosystem::ALL);
    }

    #[test]
    fn test_builtin_patterns_unique_within_each_list() {
        let catalog = RuleCatalog::builtin();
        for ecosystem in Ecosystem::ALL {
            let set = catalog.rule_set(ecosystem).unwrap();
            let lists = std::iter::once(&set.base_rules).chain(set.framework_rules.values());
            for rules in lists {
                let mut seen = FxHashSet::default();
                for rule in rules {
                    assert!(
                        seen.insert(rule.pattern.as_str()),
                        "duplicate pattern {} in {ecosystem}",
                        rule.pattern
                    );
                }
            }
        }
    }

    #[test]
    fn test_builtin_env_is_critical_for_node() {
        let catalog = RuleCatalog::builtin();
        let node = catalog.rule_set(Ecosystem::Node).unwrap();
        let env = node.base_rules.iter().find(|r| r.pattern == ".env").unwrap();
        assert_eq!(env.severity, Severity::Critical);
    }

    #[test]
    fn test_from_sources_parses_frameworks() {
        let source = r#"
            ecosystem = "go"

            [[base]]
            pattern = "*.exe"
            severity = "recommended"
            reason = "Binaries"

            [[frameworks.gin]]
            pattern = "tmp/"
            severity = "optional"
            reason = "Reload dir"
        "#;
        let catalog = RuleCatalog::from_sources([("go.toml", source)]).unwrap();
        let go = catalog.rule_set(Ecosystem::Go).unwrap();
        assert_eq!(go.base_rules.len(), 1);
        assert_eq!(go.framework(&"gin".into())[0].severity, Severity::Optional);
        assert!(go.framework(&"echo".into()).is_empty());
        assert_eq!(catalog.rule_count(), 2);
        assert!(catalog.rule_set(Ecosystem::Node).is_none());
    }

    #[test]
    fn test_from_sources_rejects_duplicates() {
        let source = "ecosystem = \"ruby\"\n";
        let err = RuleCatalog::from_sources([("a.toml", source), ("b.toml", source)]).unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateEcosystem(Ecosystem::Ruby)));
    }

    #[test]
    fn test_from_sources_reports_parse_errors() {
        let err = RuleCatalog::from_sources([("bad.toml", "ecosystem = \"cobol\"")]).unwrap_err();
        match err {
            CatalogError::Parse { name, .. } => assert_eq!(name, "bad.toml"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
