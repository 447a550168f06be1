//! Terminal host for `gitward watch`.

use std::fmt::Write as _;
use std::io::{self, BufRead, Write};

use camino::{Utf8Path, Utf8PathBuf};
use gw_core::{Config, Rule};
use gw_detect::{DetectionCoordinator, ManifestKind};
use gw_rules::{AppendReport, IgnoreFileError, RuleEngine};
use gw_watcher::{Decision, Flush, WatchHost};

/// Prompts on stdin/stdout, or decides on its own when the configuration
/// says so.
pub struct TerminalHost {
    root: Utf8PathBuf,
    config: Config,
    config_path: Utf8PathBuf,
    coordinator: DetectionCoordinator,
    engine: RuleEngine,
}

impl TerminalHost {
    pub fn new(
        root: &Utf8Path,
        config: Config,
        config_path: Utf8PathBuf,
        coordinator: DetectionCoordinator,
        engine: RuleEngine,
    ) -> Self {
        Self {
            root: root.to_owned(),
            config,
            config_path,
            coordinator,
            engine,
        }
    }

    fn ask(flush: &Flush) -> Decision {
        let mut stdout = io::stdout().lock();
        let _ = write!(stdout, "{}", render_flush(flush));
        let _ = write!(
            stdout,
            "[a]dd to ignore file, [d]ismiss, [n]ever warn this session, [s]uppress permanently: "
        );
        let _ = stdout.flush();
        drop(stdout);

        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(0) | Err(_) => Decision::Dismiss,
            Ok(_) => parse_choice(&line).unwrap_or(Decision::Dismiss),
        }
    }
}

impl WatchHost for TerminalHost {
    fn decide(&mut self, flush: &Flush) -> Decision {
        if self.config.modify_gitignore_automatically {
            tracing::info!(patterns = ?flush.patterns(), "Adding to ignore file automatically");
            return Decision::AddToIgnoreFile;
        }
        if !self.config.auto_suggest {
            tracing::warn!(paths = flush.len(), patterns = ?flush.patterns(), "Risky files created");
            return Decision::Dismiss;
        }
        Self::ask(flush)
    }

    fn suppress_warnings(&mut self, patterns: &[String]) {
        let mut changed = false;
        for pattern in patterns {
            changed |= self.config.suppress(pattern);
        }
        if !changed {
            return;
        }
        match self.config.save(&self.config_path) {
            Ok(()) => tracing::info!(path = %self.config_path, ?patterns, "Suppressed warnings saved"),
            Err(error) => tracing::warn!(%error, "Could not save suppressed warnings"),
        }
    }

    fn rules_appended(&mut self, result: &Result<AppendReport, IgnoreFileError>) {
        let mut stdout = io::stdout().lock();
        match result {
            Ok(report) => {
                let _ = write!(stdout, "{}", render_append(report));
            }
            Err(error) => {
                let _ = writeln!(stdout, "Could not update the ignore file: {error}");
            }
        }
    }

    fn rules_after_creation(&mut self, relative: &Utf8Path) -> Option<Vec<Rule>> {
        let name = relative.file_name()?;
        ManifestKind::from_file_name(name)?;

        tracing::debug!(manifest = %relative, "Manifest created, re-detecting");
        let detections = self.coordinator.detect_all(true);
        Some(self.engine.active_rules(&detections, &self.config))
    }
}

/// Describes a flush for the terminal.
pub fn render_flush(flush: &Flush) -> String {
    let mut out = String::new();
    match flush {
        Flush::Single(event) => {
            let _ = writeln!(
                out,
                "\n{} [{}] matches `{}`: {}",
                event.path, event.rule.severity, event.matched_pattern, event.rule.reason
            );
        }
        Flush::Batch(groups) => {
            let _ = writeln!(out, "\n{} risky files were created:", flush.len());
            for group in groups {
                let _ = writeln!(
                    out,
                    "  `{}` [{}] {}",
                    group.pattern, group.rule.severity, group.rule.reason
                );
                for path in &group.paths {
                    let _ = writeln!(out, "      {path}");
                }
            }
        }
    }
    out
}

/// Describes what an append wrote and what the file already had.
pub fn render_append(report: &AppendReport) -> String {
    let mut out = String::new();
    if !report.added.is_empty() {
        let _ = writeln!(
            out,
            "Added {} to {}.",
            quoted_patterns(&report.added),
            report.path
        );
    }
    if !report.already_present.is_empty() {
        let _ = writeln!(
            out,
            "{} already lists {}.",
            report.path,
            quoted_patterns(&report.already_present)
        );
    }
    out
}

fn quoted_patterns(rules: &[Rule]) -> String {
    rules
        .iter()
        .map(|rule| format!("`{}`", rule.pattern))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Maps a typed answer to a decision.
pub fn parse_choice(input: &str) -> Option<Decision> {
    match input.trim().to_ascii_lowercase().as_str() {
        "a" | "add" => Some(Decision::AddToIgnoreFile),
        "d" | "dismiss" | "" => Some(Decision::Dismiss),
        "n" | "never" => Some(Decision::NeverWarn),
        "s" | "suppress" => Some(Decision::Suppress),
        _ => None,
    }
}
