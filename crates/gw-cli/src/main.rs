//! CLI entry point for gitward.
//!
//! Detects the frameworks a project uses and keeps secrets and build
//! artifacts out of commits.
//!
//! # Usage
//!
//! ```bash
//! gitward [OPTIONS] <COMMAND>
//!
//! # Show detected frameworks
//! gitward detect --json
//!
//! # List the rules that apply, Critical only
//! gitward rules --min-severity critical
//!
//! # Show missing ignore rules and write them
//! gitward scan --apply
//!
//! # Pre-commit hook: fail when a Critical file is staged
//! gitward check
//!
//! # Warn about risky files as they are created
//! gitward watch
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

mod git;
mod prompt;

use std::io::Write;
use std::process::ExitCode;

use camino::{Utf8Path, Utf8PathBuf};
use clap::{Parser, Subcommand};
use color_eyre::eyre::eyre;
use gw_core::{Config, FrameworkDetection, Rule, Severity};
use gw_detect::DetectionCoordinator;
use gw_rules::{IgnoreFileModel, RuleEngine, StagedFileSource, filter_by_severity, scan_staged};
use gw_watcher::{EventBatcher, FileWatcher, WatchSession};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::git::GitIndex;
use crate::prompt::TerminalHost;

// =============================================================================
// CLI ARGUMENT TYPES
// =============================================================================

/// Keeps secrets and build artifacts out of your commits.
///
/// Detects the frameworks a project uses from its manifests and matches
/// files against curated ignore rules for them.
#[derive(Parser)]
#[command(name = "gitward", version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Command to execute.
    #[command(subcommand)]
    command: Commands,

    /// Project root. Defaults to the current directory.
    #[arg(short, long, global = true, env = "GITWARD_PATH")]
    path: Option<Utf8PathBuf>,

    /// Configuration file. Defaults to `<root>/.gitward.json`.
    #[arg(short, long, global = true, env = "GITWARD_CONFIG")]
    config: Option<Utf8PathBuf>,

    /// Enable verbose logging (debug level).
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    no_color: bool,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Show the frameworks detected in the project.
    Detect {
        /// Print detections as JSON.
        #[arg(long)]
        json: bool,
    },

    /// List the ignore rules that apply to the project.
    Rules {
        /// Only show rules at or above this severity.
        #[arg(short, long, default_value_t = Severity::Optional)]
        min_severity: Severity,

        /// Print rules as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Report rules missing from the ignore file.
    Scan {
        /// Write the missing rules to the ignore file.
        #[arg(short, long)]
        apply: bool,
    },

    /// Check staged files; exits non-zero if a Critical file is staged.
    Check,

    /// Warn about risky files as they are created.
    Watch,
}

/// Resolved project root and configuration.
struct Context {
    root: Utf8PathBuf,
    config: Config,
    config_path: Utf8PathBuf,
}

// =============================================================================
// INITIALIZATION FUNCTIONS
// =============================================================================

/// Initializes the tracing subscriber for logging.
///
/// Respects `RUST_LOG` if set. Otherwise uses `debug` with `--verbose` and
/// `info` by default, with `notify` held at `warn`.
fn init_tracing(verbose: bool, no_color: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = if verbose { "debug" } else { "info" };
        EnvFilter::new(format!("{level},notify=warn"))
    });

    let use_ansi = !no_color && std::env::var("NO_COLOR").is_err();

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_ansi(use_ansi)
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

/// Resolves the project root and loads its configuration.
fn build_context(cli: &Cli) -> color_eyre::Result<Context> {
    let root = cli.path.clone().unwrap_or_else(|| Utf8PathBuf::from("."));
    if !root.is_dir() {
        return Err(eyre!("Project root is not a directory: {root}"));
    }

    let (config, config_path) = match &cli.config {
        Some(path) => (Config::load(path)?, path.clone()),
        None => (Config::load_or_default(&root)?, Config::path_in(&root)),
    };

    Ok(Context {
        root,
        config,
        config_path,
    })
}

fn detect(root: &Utf8Path) -> Vec<FrameworkDetection> {
    DetectionCoordinator::new(vec![root.to_owned()]).detect_all(false)
}

// =============================================================================
// COMMAND IMPLEMENTATIONS
// =============================================================================

fn run_detect(ctx: &Context, json: bool) -> color_eyre::Result<ExitCode> {
    let detections = detect(&ctx.root);
    let mut stdout = std::io::stdout().lock();

    if json {
        writeln!(stdout, "{}", serde_json::to_string_pretty(&detections)?)?;
        return Ok(ExitCode::SUCCESS);
    }

    if detections.is_empty() {
        writeln!(stdout, "No frameworks detected in {}", ctx.root)?;
        return Ok(ExitCode::SUCCESS);
    }
    for detection in &detections {
        writeln!(
            stdout,
            "{:<16} {:<10} {:>4.0}%  {}",
            detection.display_name,
            detection.ecosystem,
            detection.confidence * 100.0,
            detection.detected_at_path
        )?;
    }
    Ok(ExitCode::SUCCESS)
}

fn run_rules(ctx: &Context, min_severity: Severity, json: bool) -> color_eyre::Result<ExitCode> {
    let detections = detect(&ctx.root);
    let rules = filter_by_severity(
        &RuleEngine::builtin().active_rules(&detections, &ctx.config),
        min_severity,
    );
    let mut stdout = std::io::stdout().lock();

    if json {
        writeln!(stdout, "{}", serde_json::to_string_pretty(&rules)?)?;
    } else {
        write!(stdout, "{}", render_rules(&rules))?;
    }
    Ok(ExitCode::SUCCESS)
}

fn run_scan(ctx: &Context, apply: bool) -> color_eyre::Result<ExitCode> {
    let detections = detect(&ctx.root);
    let rules = RuleEngine::builtin().active_rules(&detections, &ctx.config);
    let model = IgnoreFileModel::new();
    let missing = model.missing_rules(&ctx.root, &rules)?;
    info!(root = %ctx.root, rules = rules.len(), missing = missing.len(), "Scanned ignore file");

    let mut stdout = std::io::stdout().lock();
    if missing.is_empty() {
        writeln!(stdout, "{} covers every applicable rule.", model.path(&ctx.root))?;
        return Ok(ExitCode::SUCCESS);
    }

    writeln!(stdout, "Missing from {}:", model.path(&ctx.root))?;
    write!(stdout, "{}", render_rules(&missing))?;

    if apply || ctx.config.modify_gitignore_automatically {
        let report = model.create_with_rules(&ctx.root, &rules, &detections)?;
        write!(stdout, "\n{}", prompt::render_append(&report))?;
    } else {
        writeln!(stdout, "\nRun `gitward scan --apply` to add them.")?;
    }
    Ok(ExitCode::SUCCESS)
}

fn run_check(ctx: &Context) -> color_eyre::Result<ExitCode> {
    if !ctx.config.pre_commit_check {
        info!("Pre-commit check disabled in configuration");
        return Ok(ExitCode::SUCCESS);
    }

    let staged = GitIndex::new(&ctx.root).staged_files()?;
    let detections = detect(&ctx.root);
    let rules = RuleEngine::builtin().active_rules(&detections, &ctx.config);
    let report = scan_staged(&staged, &rules);

    let mut stdout = std::io::stdout().lock();
    if report.is_clean() {
        writeln!(stdout, "{} staged file(s), nothing risky.", staged.len())?;
        return Ok(ExitCode::SUCCESS);
    }

    for severity in Severity::ALL {
        let findings: Vec<_> = report.by_severity(severity).collect();
        if findings.is_empty() {
            continue;
        }
        writeln!(stdout, "{severity}:")?;
        for finding in findings {
            writeln!(
                stdout,
                "  {}  (`{}`: {})",
                finding.path, finding.rule.pattern, finding.rule.reason
            )?;
        }
    }

    if report.has_critical() {
        writeln!(stdout, "\nCommit blocked: Critical files are staged.")?;
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

async fn run_watch(ctx: Context) -> color_eyre::Result<ExitCode> {
    if !ctx.config.watch_file_creation {
        info!("File-creation warnings disabled in configuration");
        return Ok(ExitCode::SUCCESS);
    }

    let mut watcher = FileWatcher::new(&ctx.root, &ctx.config.watch)?;
    let root = watcher.watch_path().to_owned();

    let coordinator = DetectionCoordinator::new(vec![root.clone()]);
    let engine = RuleEngine::builtin();
    let detections = coordinator.detect_all(false);
    let rules = engine.active_rules(&detections, &ctx.config);
    info!(%root, frameworks = detections.len(), rules = rules.len(), "Watching for risky files");

    let ignore_file = IgnoreFileModel::new();
    let batcher = EventBatcher::new(rules, ignore_file.coverage(&root)?, &ctx.config);
    let host = TerminalHost::new(&root, ctx.config, ctx.config_path, coordinator, engine);

    let mut session = WatchSession::new(&root, batcher, ignore_file, host);
    let stats = session.run(watcher.events(), shutdown_signal()).await;
    watcher.shutdown().await?;

    info!(
        events = stats.events,
        warnings = stats.flushes,
        rules_added = stats.rules_added,
        "Stopped watching"
    );
    Ok(ExitCode::SUCCESS)
}

/// Completes on Ctrl-C, or SIGTERM on Unix.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = sigterm.recv() => info!("Received SIGTERM, shutting down"),
                }
            }
            Err(error) => {
                tracing::warn!(%error, "Could not install SIGTERM handler");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

// =============================================================================
// OUTPUT HELPERS
// =============================================================================

/// Lists rules grouped by severity, most urgent first.
fn render_rules(rules: &[Rule]) -> String {
    use std::fmt::Write;

    let mut out = String::new();
    for severity in Severity::ALL {
        let mut group = rules.iter().filter(|rule| rule.severity == severity).peekable();
        if group.peek().is_none() {
            continue;
        }
        let _ = writeln!(out, "{severity}:");
        for rule in group {
            let _ = writeln!(out, "  {:<28} {}", rule.pattern, rule.reason);
        }
    }
    out
}

// =============================================================================
// MAIN ENTRY POINT
// =============================================================================

/// Application entry point.
#[tokio::main]
async fn main() -> color_eyre::Result<ExitCode> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.no_color);

    let ctx = build_context(&cli)?;
    if !ctx.config.enabled && !matches!(cli.command, Commands::Detect { .. } | Commands::Rules { .. }) {
        info!(config = %ctx.config_path, "gitward is disabled in configuration");
        return Ok(ExitCode::SUCCESS);
    }

    match cli.command {
        Commands::Detect { json } => run_detect(&ctx, json),
        Commands::Rules { min_severity, json } => run_rules(&ctx, min_severity, json),
        Commands::Scan { apply } => run_scan(&ctx, apply),
        Commands::Check => run_check(&ctx),
        Commands::Watch => run_watch(ctx).await,
    }
}
