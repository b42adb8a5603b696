//! Top-level directories touched by a pull request.
//!
//! Computed once per run and handed to the driver as a set; the driver only
//! ever asks whether a project directory is in it.

use std::collections::BTreeSet;
use std::path::Path;
use std::process::Command;

use crate::SyncError;

/// Set of top-level content directory names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModifiedDirs(BTreeSet<String>);

impl ModifiedDirs {
    /// Reduce changed file paths to their first component. Paths without a
    /// directory part (files at the root) are dropped.
    pub fn from_paths<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(
            paths
                .into_iter()
                .filter_map(|p| {
                    let p = p.as_ref().trim().trim_start_matches("./");
                    let (top, _) = p.split_once('/')?;
                    (!top.is_empty()).then(|| top.to_string())
                })
                .collect(),
        )
    }

    /// Take directory names as given, e.g. from `--modified`.
    pub fn from_dirs<I, S>(dirs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(
            dirs.into_iter()
                .map(|d| d.as_ref().trim().trim_start_matches("./").trim_end_matches('/').to_string())
                .filter(|d| !d.is_empty())
                .collect(),
        )
    }

    pub fn contains(&self, dir: &str) -> bool {
        self.0.contains(dir)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

/// Run `git diff --name-only origin/<base>...<head>` in `repo` and reduce the
/// result to top-level directories.
pub fn from_git(repo: &Path, base_ref: &str, head: &str) -> Result<ModifiedDirs, SyncError> {
    let range = format!("origin/{base_ref}...{head}");
    let output = Command::new("git")
        .arg("-C")
        .arg(repo)
        .args(["diff", "--name-only", &range])
        .output()
        .map_err(|e| SyncError::Git(format!("failed to run git: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        return Err(SyncError::Git(format!(
            "git diff {range} failed (status {}): {stderr}",
            output.status
        )));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let dirs = ModifiedDirs::from_paths(stdout.lines());
    tracing::info!(
        "{} modified director{} between origin/{base_ref} and {head}",
        dirs.len(),
        if dirs.len() == 1 { "y" } else { "ies" }
    );
    Ok(dirs)
}
