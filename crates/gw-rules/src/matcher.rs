//! Gitignore-style pattern matching for a single candidate path.
//!
//! [`PatternMatcher::matches`] evaluates one path against one pattern. The
//! checks run in a fixed precedence order and the first one that succeeds
//! wins:
//!
//! 1. Trailing `/` is stripped from the pattern.
//! 2. Exact base-name match.
//! 3. The `.env` family: pattern `.env` also matches `.env.local`,
//!    `.env.production`, and every other `.env.*` base name.
//! 4. Directory containment: the path contains `/<pattern>/` or starts with
//!    `<pattern>/`.
//! 5. Globs: patterns containing `*` are translated to an anchored regex and
//!    tested against both the base name and the full relative path.
//!
//! Matching is case-sensitive and there is no negation: a pattern can only
//! add risk, never remove it. Character classes and escaped wildcards are not
//! supported.
//!
//! # Examples
//!
//! ```
//! use gw_rules::PatternMatcher;
//!
//! let matcher = PatternMatcher::new();
//!
//! assert!(matcher.matches("config/.env.production", ".env.production", ".env"));
//! assert!(!matcher.matches(".environment", ".environment", ".env"));
//! assert!(matcher.matches("web/node_modules/react/index.js", "index.js", "node_modules/"));
//! assert!(matcher.matches("logs/app.log", "app.log", "*.log"));
//! assert!(!matcher.matches("src/main.rs", "main.rs", "*.log"));
//! ```

use std::borrow::Cow;

use camino::Utf8Path;
use gw_core::{FxHashMap, normalize_pattern};
use parking_lot::RwLock;
use regex::Regex;

/// Special-cased pattern whose variants are all treated as secrets.
const ENV_PATTERN: &str = ".env";

/// How `?` is treated inside glob patterns.
///
/// The staged-file scanner treats `?` as a single-character wildcard while
/// the creation watcher keeps it literal. Both behaviors are exposed through
/// one shared option instead of being reconciled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum QuestionMark {
    /// `?` matches a literal question mark.
    #[default]
    Literal,
    /// `?` matches any single character except `/`.
    SingleChar,
}

/// Options shared by every [`PatternMatcher`] call site.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct MatcherOptions {
    /// Treatment of `?` in globs.
    pub question_mark: QuestionMark,
}

impl MatcherOptions {
    /// Options with `?` acting as a single-character wildcard.
    #[must_use]
    pub const fn single_char_wildcard() -> Self {
        Self {
            question_mark: QuestionMark::SingleChar,
        }
    }
}

/// Evaluates candidate paths against gitignore-style patterns.
///
/// Semantically a pure function; the only state is a memo of compiled glob
/// regexes, keyed by normalized pattern. Invalid globs are memoized as
/// never-matching.
#[derive(Debug, Default)]
pub struct PatternMatcher {
    options: MatcherOptions,
    compiled: RwLock<FxHashMap<String, Option<Regex>>>,
}

impl PatternMatcher {
    /// Creates a matcher with default options (`?` is literal).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a matcher with the given options.
    #[must_use]
    pub fn with_options(options: MatcherOptions) -> Self {
        Self {
            options,
            compiled: RwLock::default(),
        }
    }

    /// Returns the options this matcher was built with.
    #[must_use]
    pub const fn options(&self) -> MatcherOptions {
        self.options
    }

    /// Returns `true` if the candidate matches `pattern`.
    ///
    /// # Arguments
    ///
    /// * `full_relative_path` - Path relative to the project root, `/`-separated
    /// * `base_name` - Final component of that path
    /// * `pattern` - Gitignore-style rule pattern
    #[must_use]
    pub fn matches(&self, full_relative_path: &str, base_name: &str, pattern: &str) -> bool {
        let normalized = normalize_pattern(pattern);
        if normalized.is_empty() {
            return false;
        }

        if base_name == normalized {
            return true;
        }

        if normalized == ENV_PATTERN && is_env_variant(base_name) {
            return true;
        }

        if full_relative_path
            .strip_prefix(normalized)
            .is_some_and(|rest| rest.starts_with('/'))
        {
            return true;
        }
        if full_relative_path.contains(&format!("/{normalized}/")) {
            return true;
        }

        if self.is_glob(normalized) {
            return self.with_regex(normalized, |re| {
                re.is_match(base_name) || re.is_match(full_relative_path)
            });
        }

        false
    }

    /// Matches a relative path, deriving the base name and normalizing
    /// separators.
    ///
    /// # Examples
    ///
    /// ```
    /// use gw_rules::PatternMatcher;
    /// use camino::Utf8Path;
    ///
    /// let matcher = PatternMatcher::new();
    /// assert!(matcher.matches_path(Utf8Path::new("certs/server.pem"), "*.pem"));
    /// ```
    #[must_use]
    pub fn matches_path(&self, relative: &Utf8Path, pattern: &str) -> bool {
        let full = slash_path(relative);
        let base = relative.file_name().unwrap_or(&*full);
        self.matches(&full, base, pattern)
    }

    fn is_glob(&self, pattern: &str) -> bool {
        pattern.contains('*')
            || (self.options.question_mark == QuestionMark::SingleChar && pattern.contains('?'))
    }

    fn with_regex(&self, pattern: &str, test: impl FnOnce(&Regex) -> bool) -> bool {
        if let Some(entry) = self.compiled.read().get(pattern) {
            return entry.as_ref().is_some_and(test);
        }

        let compiled = match Regex::new(&glob_to_regex(pattern, self.options)) {
            Ok(re) => Some(re),
            Err(error) => {
                tracing::debug!(pattern, %error, "Glob pattern did not compile");
                None
            }
        };
        let matched = compiled.as_ref().is_some_and(test);
        self.compiled.write().insert(pattern.to_owned(), compiled);
        matched
    }
}

/// Translates a glob into an anchored regex source string.
///
/// Literal text is escaped, `**/` matches zero or more leading directories,
/// a bare `**` matches across separators, and `*` matches within one path
/// segment.
///
/// # Examples
///
/// ```
/// use gw_rules::{MatcherOptions, glob_to_regex};
///
/// assert_eq!(glob_to_regex("*.log", MatcherOptions::default()), r"^[^/]*\.log$");
/// assert_eq!(glob_to_regex("**/cache", MatcherOptions::default()), r"^(?:.*/)?cache$");
/// ```
#[must_use]
pub fn glob_to_regex(pattern: &str, options: MatcherOptions) -> String {
    let mut out = String::with_capacity(pattern.len() * 2 + 2);
    out.push('^');

    let mut chars = pattern.chars().peekable();
    let mut literal = [0u8; 4];
    while let Some(c) = chars.next() {
        match c {
            '*' if chars.peek() == Some(&'*') => {
                chars.next();
                if chars.peek() == Some(&'/') {
                    chars.next();
                    out.push_str("(?:.*/)?");
                } else {
                    out.push_str(".*");
                }
            }
            '*' => out.push_str("[^/]*"),
            '?' if options.question_mark == QuestionMark::SingleChar => out.push_str("[^/]"),
            _ => out.push_str(&regex::escape(c.encode_utf8(&mut literal))),
        }
    }

    out.push('$');
    out
}

/// Returns `true` for `.env` and any `.env.<suffix>` base name.
fn is_env_variant(base_name: &str) -> bool {
    base_name == ENV_PATTERN
        || base_name
            .strip_prefix(ENV_PATTERN)
            .is_some_and(|rest| rest.starts_with('.'))
}

/// Renders a path with `/` separators regardless of platform.
fn slash_path(path: &Utf8Path) -> Cow<'_, str> {
    if cfg!(windows) {
        Cow::Owned(path.as_str().replace('\\', "/"))
    } else {
        Cow::Borrowed(path.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(path: &str, pattern: &str) -> bool {
        PatternMatcher::new().matches_path(Utf8Path::new(path), pattern)
    }

    #[test]
    fn test_exact_base_name() {
        assert!(check("secrets.json", "secrets.json"));
        assert!(check("deep/nested/secrets.json", "secrets.json"));
        assert!(!check("secrets.json.bak", "secrets.json"));
    }

    #[test]
    fn test_trailing_slash_is_ignored() {
        assert!(check("dist", "dist/"));
        assert!(check("dist/main.js", "dist/"));
        assert!(check("packages/app/dist/main.js", "dist//"));
    }

    #[test]
    fn test_env_family() {
        assert!(check(".env", ".env"));
        assert!(check(".env.local", ".env"));
        assert!(check("apps/api/.env.production", ".env"));
        assert!(!check(".environment", ".env"));
        assert!(!check(".envrc", ".env"));
    }

    #[test]
    fn test_env_special_case_only_for_env_pattern() {
        assert!(!check(".npmrc.local", ".npmrc"));
    }

    #[test]
    fn test_directory_containment() {
        assert!(check("node_modules/react/index.js", "node_modules"));
        assert!(check("web/node_modules/react/index.js", "node_modules"));
        assert!(!check("my_node_modules/react/index.js", "node_modules"));
        assert!(!check("src/node_modules_backup.js", "node_modules"));
    }

    #[test]
    fn test_non_glob_property() {
        // For patterns without '*', a match is exactly base-name equality or
        // directory containment.
        let cases = [
            ("build/out.o", "build", true),
            ("a/build/out.o", "build", true),
            ("a/build", "build", true),
            ("a/rebuild/out.o", "build", false),
            ("a/build.rs", "build", false),
            ("target", "target", true),
        ];
        for (path, pattern, expected) in cases {
            assert_eq!(check(path, pattern), expected, "{path} vs {pattern}");
        }
    }

    #[test]
    fn test_single_star_stays_in_segment() {
        assert!(check("app.log", "*.log"));
        assert!(check("var/app.log", "*.log"));
        assert!(check("logs/app.log", "logs/*.log"));
        assert!(!check("logs/2024/app.log", "logs/*.log"));
    }

    #[test]
    fn test_double_star_crosses_segments() {
        assert!(check("logs/2024/01/app.log", "logs/**/*.log"));
        assert!(check("cache", "**/cache"));
        assert!(check("a/b/cache", "**/cache"));
        assert!(check("coverage/lcov/index.html", "coverage/**"));
    }

    #[test]
    fn test_glob_escapes_literals() {
        assert!(!check("appXlog", "*.log"));
        assert!(check("file+1.tmp", "file+*.tmp"));
        assert!(check("id_rsa.(1)", "id_rsa.(*)"));
    }

    #[test]
    fn test_matching_is_case_sensitive() {
        assert!(!check("APP.LOG", "*.log"));
        assert!(!check(".ENV", ".env"));
        assert!(!check("Node_Modules/x.js", "node_modules"));
    }

    #[test]
    fn test_question_mark_literal_by_default() {
        assert!(!check("a1.txt", "a?.txt"));
        assert!(check("a?.txt", "a?.txt"));
        assert!(!check("x1.tmp", "x?.*"));
    }

    #[test]
    fn test_question_mark_single_char_option() {
        let matcher = PatternMatcher::with_options(MatcherOptions::single_char_wildcard());
        assert!(matcher.matches("a1.txt", "a1.txt", "a?.txt"));
        assert!(!matcher.matches("a12.txt", "a12.txt", "a?.txt"));
        assert!(!matcher.matches("a/b", "b", "a?b"));
    }

    #[test]
    fn test_empty_pattern_never_matches() {
        assert!(!check("anything", ""));
        assert!(!check("anything", "/"));
    }

    #[test]
    fn test_regex_is_memoized() {
        let matcher = PatternMatcher::new();
        assert!(matcher.matches("a.log", "a.log", "*.log"));
        assert!(matcher.matches("b.log", "b.log", "*.log/"));
        assert_eq!(matcher.compiled.read().len(), 1);
    }
}
