//! Reading and appending to a project's ignore file.
//!
//! The model never rewrites or reorders existing content. New rules are
//! appended as a block with a header comment, and an append that would add
//! nothing writes nothing.
//!
//! Concurrent appends from two processes are not coordinated: each reads the
//! file, computes what is missing, then appends, so a racing pair can write
//! the same pattern twice. Duplicated lines are harmless to git.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};

use camino::{Utf8Path, Utf8PathBuf};
use gw_core::{FrameworkDetection, FxHashSet, Rule, Severity, normalize_pattern};
use ignore::gitignore::{Gitignore, GitignoreBuilder};

use crate::error::IgnoreFileError;

/// Default ignore file name.
pub const DEFAULT_IGNORE_FILE: &str = ".gitignore";

/// Name written into generated header comments.
const TOOL_NAME: &str = "gitward";

/// Outcome of [`IgnoreFileModel::append_rules`] and
/// [`IgnoreFileModel::create_with_rules`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppendReport {
    /// The ignore file that was inspected.
    pub path: Utf8PathBuf,

    /// Rules written by this call, in output order.
    pub added: Vec<Rule>,

    /// Requested rules whose pattern the file already listed, in request
    /// order.
    pub already_present: Vec<Rule>,
}

impl AppendReport {
    /// Returns `true` if nothing was written.
    #[must_use]
    pub fn is_unchanged(&self) -> bool {
        self.added.is_empty()
    }
}

/// The ignore file of one project root.
///
/// # Examples
///
/// ```
/// use camino::Utf8Path;
/// use gw_core::{Rule, Severity};
/// use gw_rules::IgnoreFileModel;
///
/// let dir = tempfile::tempdir().unwrap();
/// let root = Utf8Path::from_path(dir.path()).unwrap();
/// let model = IgnoreFileModel::new();
///
/// let rules = [Rule::new("dist/", Severity::Recommended, "build output")];
/// let report = model.append_rules(root, &rules, Some("Vite")).unwrap();
/// assert_eq!(report.added.len(), 1);
///
/// // A second append finds nothing missing and leaves the file untouched.
/// let again = model.append_rules(root, &rules, Some("Vite")).unwrap();
/// assert!(again.is_unchanged());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IgnoreFileModel {
    file_name: String,
}

impl Default for IgnoreFileModel {
    fn default() -> Self {
        Self {
            file_name: DEFAULT_IGNORE_FILE.to_owned(),
        }
    }
}

impl IgnoreFileModel {
    /// Creates a model for `.gitignore`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a model for a differently named ignore file.
    #[must_use]
    pub fn with_file_name(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
        }
    }

    /// Path of the ignore file under `root`.
    #[must_use]
    pub fn path(&self, root: &Utf8Path) -> Utf8PathBuf {
        root.join(&self.file_name)
    }

    /// Returns the normalized patterns currently listed in the ignore file.
    ///
    /// Blank lines and `#` comments are skipped; each line is trimmed and
    /// loses any trailing `/`. A missing file yields an empty set.
    ///
    /// # Errors
    ///
    /// Returns [`IgnoreFileError::Read`] if the file exists but cannot be read.
    pub fn existing_patterns(&self, root: &Utf8Path) -> Result<FxHashSet<String>, IgnoreFileError> {
        let content = self.read(root)?;
        Ok(parse_patterns(&content))
    }

    /// Returns the rules whose normalized pattern is not in the ignore file.
    ///
    /// # Errors
    ///
    /// Same as [`existing_patterns`](Self::existing_patterns).
    pub fn missing_rules(&self, root: &Utf8Path, rules: &[Rule]) -> Result<Vec<Rule>, IgnoreFileError> {
        let existing = self.existing_patterns(root)?;
        Ok(select_missing(rules, &existing).0)
    }

    /// Appends every missing rule as one block.
    ///
    /// The block starts with a blank separator line when the file already has
    /// content, then a header comment naming `label`. Critical rules are
    /// preceded by their reason as a comment. The file is created if absent.
    ///
    /// # Errors
    ///
    /// Returns [`IgnoreFileError::Read`] if the existing file cannot be read
    /// and [`IgnoreFileError::Write`] if the append fails.
    pub fn append_rules(
        &self,
        root: &Utf8Path,
        rules: &[Rule],
        label: Option<&str>,
    ) -> Result<AppendReport, IgnoreFileError> {
        let path = self.path(root);
        let content = self.read(root)?;
        let existing = parse_patterns(&content);
        let (missing, already_present) = select_missing(rules, &existing);

        if missing.is_empty() {
            tracing::debug!(%path, already_present = already_present.len(), "Ignore file already up to date");
            return Ok(AppendReport {
                path,
                added: missing,
                already_present,
            });
        }

        let mut block = String::new();
        if !content.is_empty() && !content.ends_with('\n') {
            block.push('\n');
        }
        if !content.trim().is_empty() {
            block.push('\n');
        }
        match label {
            Some(label) => block.push_str(&format!("# Added by {TOOL_NAME} for {label}\n")),
            None => block.push_str(&format!("# Added by {TOOL_NAME}\n")),
        }
        push_rules(&mut block, &missing);

        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .and_then(|mut file| file.write_all(block.as_bytes()))
            .map_err(|e| IgnoreFileError::write(&path, e))?;

        tracing::info!(
            %path,
            added = missing.len(),
            already_present = already_present.len(),
            "Appended ignore rules"
        );
        Ok(AppendReport {
            path,
            added: missing,
            already_present,
        })
    }

    /// Writes a fresh ignore file grouped into Critical, Recommended and
    /// Optional sections.
    ///
    /// If the file already exists this falls back to
    /// [`append_rules`](Self::append_rules), labelled with the detected
    /// framework names.
    ///
    /// # Errors
    ///
    /// Returns [`IgnoreFileError::Write`] if the file cannot be created, or any
    /// error of the append fallback.
    pub fn create_with_rules(
        &self,
        root: &Utf8Path,
        rules: &[Rule],
        detections: &[FrameworkDetection],
    ) -> Result<AppendReport, IgnoreFileError> {
        let path = self.path(root);
        let label = detection_label(detections);

        let file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                tracing::debug!(%path, "Ignore file exists, appending instead");
                let label = (!label.is_empty()).then_some(label.as_str());
                return self.append_rules(root, rules, label);
            }
            Err(e) => return Err(IgnoreFileError::write(&path, e)),
        };

        let (unique, _) = select_missing(rules, &FxHashSet::default());
        let content = render_fresh(&unique, &label);
        fill_new_file(&path, file, &content).map_err(|e| IgnoreFileError::write(&path, e))?;

        tracing::info!(%path, added = unique.len(), "Created ignore file");
        Ok(AppendReport {
            path,
            added: unique,
            already_present: Vec::new(),
        })
    }

    /// Builds a real gitignore matcher from the current file contents.
    ///
    /// # Errors
    ///
    /// Returns [`IgnoreFileError::Read`] if the file exists but cannot be read.
    pub fn coverage(&self, root: &Utf8Path) -> Result<IgnoreSnapshot, IgnoreFileError> {
        let content = self.read(root)?;
        Ok(IgnoreSnapshot::from_content(root, &content))
    }

    fn read(&self, root: &Utf8Path) -> Result<String, IgnoreFileError> {
        let path = self.path(root);
        match fs::read_to_string(&path) {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(String::new()),
            Err(e) => Err(IgnoreFileError::read(path, e)),
        }
    }
}

/// A point-in-time gitignore matcher used to answer "is this path already
/// ignored?".
///
/// Unlike [`PatternMatcher`](crate::PatternMatcher) this follows full
/// gitignore semantics, negation included.
///
/// # Examples
///
/// ```
/// use camino::Utf8Path;
/// use gw_rules::IgnoreSnapshot;
///
/// let snapshot = IgnoreSnapshot::from_content(Utf8Path::new("/repo"), "dist/\n*.log\n!keep.log\n");
/// assert!(snapshot.is_covered(Utf8Path::new("dist/app.js"), false));
/// assert!(snapshot.is_covered(Utf8Path::new("logs/a.log"), false));
/// assert!(!snapshot.is_covered(Utf8Path::new("keep.log"), false));
/// assert!(!snapshot.is_covered(Utf8Path::new("src/main.rs"), false));
/// ```
#[derive(Debug, Clone)]
pub struct IgnoreSnapshot {
    root: Utf8PathBuf,
    matcher: Gitignore,
}

impl IgnoreSnapshot {
    /// Builds a snapshot from ignore-file text. Lines that fail to parse are
    /// skipped.
    #[must_use]
    pub fn from_content(root: &Utf8Path, content: &str) -> Self {
        let mut builder = GitignoreBuilder::new(root);
        for line in content.lines() {
            if let Err(error) = builder.add_line(None, line) {
                tracing::debug!(line, %error, "Skipping unparsable ignore line");
            }
        }
        let matcher = builder.build().unwrap_or_else(|error| {
            tracing::warn!(%root, %error, "Failed to build ignore matcher");
            Gitignore::empty()
        });
        Self {
            root: root.to_owned(),
            matcher,
        }
    }

    /// A snapshot that covers nothing.
    #[must_use]
    pub fn empty(root: &Utf8Path) -> Self {
        Self {
            root: root.to_owned(),
            matcher: Gitignore::empty(),
        }
    }

    /// Returns `true` if `path` or one of its parent directories is ignored.
    ///
    /// `path` may be relative to the root or absolute under it; an absolute
    /// path outside the root is never covered.
    #[must_use]
    pub fn is_covered(&self, path: &Utf8Path, is_dir: bool) -> bool {
        let relative = if path.is_absolute() {
            match path.strip_prefix(&self.root) {
                Ok(relative) => relative,
                Err(_) => return false,
            }
        } else {
            path
        };
        if relative.as_str().is_empty() {
            return false;
        }
        self.matcher
            .matched_path_or_any_parents(relative.as_std_path(), is_dir)
            .is_ignore()
    }

    /// Number of patterns in the snapshot.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)] // Pattern counts fit in usize
    pub fn len(&self) -> usize {
        self.matcher.num_ignores() as usize + self.matcher.num_whitelists() as usize
    }

    /// Returns `true` if the snapshot holds no patterns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn parse_patterns(content: &str) -> FxHashSet<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(|line| normalize_pattern(line).to_owned())
        .filter(|line| !line.is_empty())
        .collect()
}

/// Splits `rules` into those not yet in `existing` and those already there.
/// Both sides are deduplicated by normalized pattern and keep input order.
fn select_missing(rules: &[Rule], existing: &FxHashSet<String>) -> (Vec<Rule>, Vec<Rule>) {
    let mut seen: FxHashSet<&str> = FxHashSet::default();
    let mut missing = Vec::new();
    let mut already_present = Vec::new();
    for rule in rules {
        let normalized = rule.normalized_pattern();
        if !seen.insert(normalized) {
            continue;
        }
        if existing.contains(normalized) {
            already_present.push(rule.clone());
        } else {
            missing.push(rule.clone());
        }
    }
    (missing, already_present)
}

/// Writes `content` into a file this call just created. On failure the
/// partial file is removed so it is never mistaken for user content.
fn fill_new_file(path: &Utf8Path, mut file: impl Write, content: &str) -> io::Result<()> {
    let result = file.write_all(content.as_bytes()).and_then(|()| file.flush());
    if result.is_err() {
        drop(file);
        if let Err(error) = fs::remove_file(path) {
            tracing::warn!(%path, %error, "Could not remove partial ignore file");
        }
    }
    result
}

fn push_rules(out: &mut String, rules: &[Rule]) {
    for rule in rules {
        if rule.is_critical() {
            out.push_str("# ");
            out.push_str(&rule.reason);
            out.push('\n');
        }
        out.push_str(&rule.pattern);
        out.push('\n');
    }
}

fn render_fresh(rules: &[Rule], label: &str) -> String {
    let mut out = format!("# Generated by {TOOL_NAME}\n");
    if !label.is_empty() {
        out.push_str(&format!("# Detected: {label}\n"));
    }

    for severity in Severity::ALL {
        let section: Vec<Rule> = rules
            .iter()
            .filter(|rule| rule.severity == severity)
            .cloned()
            .collect();
        if section.is_empty() {
            continue;
        }
        out.push('\n');
        out.push_str(&format!("# {}\n", severity.label()));
        push_rules(&mut out, &section);
    }
    out
}

/// Distinct display names of `detections`, in order, joined with `, `.
fn detection_label(detections: &[FrameworkDetection]) -> String {
    let mut names: Vec<&str> = Vec::new();
    for detection in detections {
        if !names.contains(&detection.display_name.as_str()) {
            names.push(&detection.display_name);
        }
    }
    names.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use gw_core::Ecosystem;
    use tempfile::TempDir;

    fn root(dir: &TempDir) -> &Utf8Path {
        Utf8Path::from_path(dir.path()).unwrap()
    }

    fn read(dir: &TempDir) -> String {
        fs::read_to_string(dir.path().join(".gitignore")).unwrap()
    }

    fn rules() -> Vec<Rule> {
        vec![
            Rule::new(".env", Severity::Critical, "Environment secrets"),
            Rule::new("node_modules/", Severity::Recommended, "Dependencies"),
            Rule::new(".DS_Store", Severity::Optional, "Finder metadata"),
        ]
    }

    #[test]
    fn test_existing_patterns_skips_comments_and_normalizes() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(".gitignore"),
            "# deps\nnode_modules/\n\n   \n  dist  \n*.log\n",
        )
        .unwrap();
        let patterns = IgnoreFileModel::new().existing_patterns(root(&dir)).unwrap();
        let mut sorted: Vec<_> = patterns.into_iter().collect();
        sorted.sort();
        assert_eq!(sorted, ["*.log", "dist", "node_modules"]);
    }

    #[test]
    fn test_existing_patterns_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(IgnoreFileModel::new().existing_patterns(root(&dir)).unwrap().is_empty());
    }

    #[test]
    fn test_custom_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let model = IgnoreFileModel::with_file_name(".dockerignore");
        let rules = [Rule::new(".env", Severity::Critical, "Secrets")];

        model.append_rules(root(&dir), &rules, None).unwrap();
        assert!(root(&dir).join(".dockerignore").is_file());
        assert!(!root(&dir).join(".gitignore").exists());
    }

    #[test]
    fn test_missing_rules_disjoint_from_existing() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(".gitignore"), "node_modules\n.env\n").unwrap();
        let model = IgnoreFileModel::new();

        let missing = model.missing_rules(root(&dir), &rules()).unwrap();
        let existing = model.existing_patterns(root(&dir)).unwrap();
        assert_eq!(missing.len(), 1);
        assert_eq!(missing[0].pattern, ".DS_Store");
        assert!(missing.iter().all(|r| !existing.contains(r.normalized_pattern())));
    }

    #[test]
    fn test_append_preserves_existing_content() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(".gitignore"), "target").unwrap();
        let model = IgnoreFileModel::new();

        let report = model.append_rules(root(&dir), &rules(), Some("Next.js")).unwrap();
        assert_eq!(report.added.len(), 3);
        assert!(report.already_present.is_empty());

        insta::assert_snapshot!(read(&dir), @r"
        target

        # Added by gitward for Next.js
        # Environment secrets
        .env
        node_modules/
        .DS_Store
        ");
    }

    #[test]
    fn test_append_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let model = IgnoreFileModel::new();

        model.append_rules(root(&dir), &rules(), None).unwrap();
        let first = read(&dir);
        let report = model.append_rules(root(&dir), &rules(), None).unwrap();

        assert!(report.is_unchanged());
        assert_eq!(report.already_present, rules());
        assert_eq!(read(&dir), first);
        assert!(first.starts_with("# Added by gitward\n"));
    }

    #[test]
    fn test_append_only_writes_missing_rules() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(".gitignore"), "# mine\n.env.local\nnode_modules\n").unwrap();
        let model = IgnoreFileModel::new();

        let report = model.append_rules(root(&dir), &rules(), None).unwrap();
        let added: Vec<_> = report.added.iter().map(|r| r.pattern.as_str()).collect();
        assert_eq!(added, [".env", ".DS_Store"]);
        let present: Vec<_> = report.already_present.iter().map(|r| r.pattern.as_str()).collect();
        assert_eq!(present, ["node_modules/"]);

        let content = read(&dir);
        assert!(content.starts_with("# mine\n.env.local\nnode_modules\n\n# Added by gitward\n"));
        assert!(content.ends_with('\n'));
    }

    #[test]
    fn test_append_keeps_original_content_as_prefix() {
        let cases = [
            ("empty", ""),
            ("whitespace only", "  \n\t\n"),
            ("no trailing newline", "target"),
            ("crlf", "target\r\n*.log\r\n"),
            ("comments only", "# build output\n# nothing yet\n"),
            ("header already present", "# Added by gitward\n.env\n"),
        ];

        for (name, original) in cases {
            let dir = tempfile::tempdir().unwrap();
            fs::write(dir.path().join(".gitignore"), original).unwrap();

            let report = IgnoreFileModel::new()
                .append_rules(root(&dir), &rules(), None)
                .unwrap();
            let updated = read(&dir);

            assert!(updated.starts_with(original), "{name}: {updated:?}");
            assert!(!report.is_unchanged(), "{name}");
            assert!(updated.ends_with(".DS_Store\n"), "{name}: {updated:?}");
        }
    }

    #[test]
    fn test_append_deduplicates_requested_rules() {
        let dir = tempfile::tempdir().unwrap();
        let duplicated = [
            Rule::new("dist/", Severity::Recommended, "a"),
            Rule::new("dist", Severity::Recommended, "b"),
        ];
        let report = IgnoreFileModel::new()
            .append_rules(root(&dir), &duplicated, None)
            .unwrap();
        assert_eq!(report.added.len(), 1);
        assert_eq!(read(&dir), "# Added by gitward\ndist/\n");
    }

    #[test]
    fn test_create_with_rules_sections() {
        let dir = tempfile::tempdir().unwrap();
        let detections = [
            FrameworkDetection::new(
                "node",
                "Node.js",
                dir.path().join("package.json").try_into().unwrap(),
                0.8,
                Ecosystem::Node,
            ),
            FrameworkDetection::new(
                "nextjs",
                "Next.js",
                dir.path().join("package.json").try_into().unwrap(),
                1.0,
                Ecosystem::Node,
            ),
        ];
        let mut all = rules();
        all.push(Rule::new(".next/", Severity::Recommended, "Build output"));

        let report = IgnoreFileModel::new()
            .create_with_rules(root(&dir), &all, &detections)
            .unwrap();
        assert_eq!(report.added.len(), 4);

        insta::assert_snapshot!(read(&dir), @r"
        # Generated by gitward
        # Detected: Node.js, Next.js

        # Critical
        # Environment secrets
        .env

        # Recommended
        node_modules/
        .next/

        # Optional
        .DS_Store
        ");
    }

    #[test]
    fn test_create_skips_empty_sections() {
        let dir = tempfile::tempdir().unwrap();
        let only = [Rule::new("target/", Severity::Recommended, "Cargo output")];
        IgnoreFileModel::new()
            .create_with_rules(root(&dir), &only, &[])
            .unwrap();
        assert_eq!(read(&dir), "# Generated by gitward\n\n# Recommended\ntarget/\n");
    }

    #[test]
    fn test_create_falls_back_to_append() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(".gitignore"), ".env\n").unwrap();
        let detections = [FrameworkDetection::new(
            "django",
            "Django",
            dir.path().join("manage.py").try_into().unwrap(),
            0.98,
            Ecosystem::Python,
        )];

        let report = IgnoreFileModel::new()
            .create_with_rules(root(&dir), &rules(), &detections)
            .unwrap();
        assert_eq!(report.already_present, [rules()[0].clone()]);
        assert_eq!(
            read(&dir),
            ".env\n\n# Added by gitward for Django\nnode_modules/\n.DS_Store\n"
        );
    }

    /// Accepts a few bytes, then fails.
    struct ShortWriter(usize);

    impl Write for ShortWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.0 == 0 {
                return Err(io::Error::new(io::ErrorKind::StorageFull, "disk full"));
            }
            let n = buf.len().min(self.0);
            self.0 -= n;
            Ok(n)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_failed_fresh_write_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = root(&dir).join(".gitignore");
        fs::write(&path, "# Gene").unwrap();

        let err = fill_new_file(&path, ShortWriter(6), "# Generated by gitward\n.env\n").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::StorageFull);
        assert!(!path.exists());

        // A later append starts from a clean slate.
        let report = IgnoreFileModel::new()
            .append_rules(root(&dir), &rules(), None)
            .unwrap();
        assert_eq!(report.added.len(), 3);
        assert!(read(&dir).starts_with("# Added by gitward\n"));
    }

    #[test]
    fn test_fill_new_file_success_keeps_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = root(&dir).join(".gitignore");
        let file = OpenOptions::new().write(true).create_new(true).open(&path).unwrap();

        fill_new_file(&path, file, ".env\n").unwrap();
        assert_eq!(read(&dir), ".env\n");
    }

    #[test]
    fn test_coverage_uses_gitignore_semantics() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(".gitignore"), "build/\n/secret.txt\n").unwrap();
        let snapshot = IgnoreFileModel::new().coverage(root(&dir)).unwrap();

        assert_eq!(snapshot.len(), 2);
        assert!(snapshot.is_covered(Utf8Path::new("build/out.o"), false));
        assert!(snapshot.is_covered(Utf8Path::new("secret.txt"), false));
        assert!(!snapshot.is_covered(Utf8Path::new("nested/secret.txt"), false));
        assert!(snapshot.is_covered(&root(&dir).join("build/a/b.o"), false));
        assert!(!snapshot.is_covered(Utf8Path::new("/elsewhere/build/x"), false));
    }

    #[test]
    fn test_coverage_without_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot = IgnoreFileModel::new().coverage(root(&dir)).unwrap();
        assert!(snapshot.is_empty());
        assert!(!snapshot.is_covered(Utf8Path::new("anything"), false));
    }

    #[cfg(unix)]
    #[test]
    fn test_append_write_failure_is_reported() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".gitignore");
        fs::write(&path, "").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o444)).unwrap();

        // Root can write through read-only permissions; nothing to assert then.
        if OpenOptions::new().append(true).open(&path).is_ok() {
            return;
        }
        let err = IgnoreFileModel::new()
            .append_rules(root(&dir), &rules(), None)
            .unwrap_err();
        assert!(matches!(err, IgnoreFileError::Write { .. }));
    }
}
