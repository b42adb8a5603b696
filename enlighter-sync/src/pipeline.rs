//! Shared `sync-content` entrypoint.

use std::path::Path;

use enlighter_core::{content, RunContext, Settings};
use enlighter_store::RowStore;

use crate::modified::{self, ModifiedDirs};
use crate::reconcile::Reconciler;
use crate::report::ContentReport;
use crate::SyncError;

/// Work out which top-level directories this run treats as modified.
///
/// - outside a PR: none, drafts are never created
/// - explicit directories given: exactly those
/// - otherwise: `git diff` between `origin/<base>` and `HEAD` in `root`
pub fn resolve_modified(
    ctx: &RunContext,
    root: &Path,
    explicit: &[String],
) -> Result<ModifiedDirs, SyncError> {
    let Some(pr) = &ctx.pull_request else {
        return Ok(ModifiedDirs::default());
    };
    if !explicit.is_empty() {
        return Ok(ModifiedDirs::from_dirs(explicit));
    }
    let base = pr.base_ref.as_deref().unwrap_or(&ctx.ref_name);
    modified::from_git(root, base, "HEAD")
}

/// Load the content tree under `root` and reconcile it with the store.
///
/// The tree is loaded in full first; a content error returns before any
/// remote call is made.
pub fn sync_content(
    store: &dyn RowStore,
    ctx: &RunContext,
    settings: &Settings,
    modified: &ModifiedDirs,
    root: &Path,
    dry_run: bool,
) -> Result<ContentReport, SyncError> {
    let tree = content::load_tree(
        root,
        &settings.layout,
        settings.features.require_stage_metadata,
    )?;
    tracing::info!(
        "loaded {} project(s) with {} stage(s) from {}",
        tree.len(),
        tree.iter().map(|p| p.stages.len()).sum::<usize>(),
        root.display()
    );
    if let Some(pr) = ctx.pr_number() {
        tracing::info!("pull request #{pr}: {} modified director(ies)", modified.len());
    }
    Reconciler::new(store, ctx, settings, modified, dry_run).run(&tree)
}

#[cfg(test)]
mod tests {
    use enlighter_core::PrNumber;
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn no_modified_dirs_outside_pr() {
        let root = TempDir::new().expect("root");
        let ctx = RunContext::from_lookup(|_| None).expect("ctx");
        let dirs = resolve_modified(&ctx, root.path(), &["project_1_x".to_string()]).expect("dirs");
        assert!(dirs.is_empty());
    }

    #[test]
    fn explicit_dirs_win_in_pr() {
        let root = TempDir::new().expect("root");
        let ctx = RunContext::from_lookup(|_| None)
            .expect("ctx")
            .with_pr_number(PrNumber::try_from(3).expect("pr"));
        let dirs = resolve_modified(&ctx, root.path(), &["project_1_x/".to_string()]).expect("dirs");
        assert!(dirs.contains("project_1_x"));
    }

    #[test]
    fn empty_root_syncs_nothing() {
        let root = TempDir::new().expect("root");
        let store = enlighter_store::MemoryStore::new();
        let ctx = RunContext::from_lookup(|_| None).expect("ctx");
        let report = sync_content(
            &store,
            &ctx,
            &Settings::default(),
            &ModifiedDirs::default(),
            root.path(),
            false,
        )
        .expect("sync");
        assert!(report.outcomes.is_empty());
    }
}
