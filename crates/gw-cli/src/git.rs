//! Staged files read from `git`.

use std::process::Command;

use camino::{Utf8Path, Utf8PathBuf};
use color_eyre::eyre::{WrapErr, bail};
use gw_rules::{StagedFile, StagedFileSource};

/// The index of the git repository containing `root`.
#[derive(Debug, Clone)]
pub struct GitIndex {
    root: Utf8PathBuf,
}

impl GitIndex {
    pub fn new(root: &Utf8Path) -> Self {
        Self {
            root: root.to_owned(),
        }
    }
}

impl StagedFileSource for GitIndex {
    type Error = color_eyre::Report;

    /// Added, copied, modified and renamed paths, relative to `root`.
    fn staged_files(&self) -> Result<Vec<StagedFile>, Self::Error> {
        let output = Command::new("git")
            .arg("-C")
            .arg(self.root.as_str())
            .args(["diff", "--cached", "--name-only", "--relative", "-z", "--diff-filter=ACMR"])
            .output()
            .wrap_err("failed to run git")?;

        if !output.status.success() {
            bail!(
                "git diff --cached failed: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }
        Ok(parse_name_list(&output.stdout))
    }
}

/// Splits NUL-separated `--name-only -z` output.
fn parse_name_list(stdout: &[u8]) -> Vec<StagedFile> {
    stdout
        .split(|&b| b == 0)
        .filter(|name| !name.is_empty())
        .filter_map(|name| match std::str::from_utf8(name) {
            Ok(name) => Some(StagedFile::new(name)),
            Err(_) => {
                tracing::warn!(path = %String::from_utf8_lossy(name), "Skipping non-UTF-8 staged path");
                None
            }
        })
        .collect()
}
