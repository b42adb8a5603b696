//! `enlighter sync-content`: reconcile projects and stages with the backend.

use anyhow::{Context, Result};
use clap::Args;

use enlighter_sync::{pipeline, Action, ContentReport, Outcome};

use super::{connect, dry_run_prefix, ContentArgs, PrArgs};

/// Arguments for `enlighter sync-content`.
#[derive(Args, Debug)]
pub struct SyncContentArgs {
    #[command(flatten)]
    pub content: ContentArgs,

    #[command(flatten)]
    pub pr: PrArgs,

    /// Top-level directories changed by the pull request. When omitted in a
    /// PR run they are taken from `git diff origin/<base>...HEAD`.
    #[arg(long, value_name = "DIR", num_args = 1..)]
    pub modified: Vec<String>,

    /// Report what would be written without touching the backend.
    #[arg(long)]
    pub dry_run: bool,
}

impl SyncContentArgs {
    pub fn run(self) -> Result<()> {
        let settings = self.content.settings()?;
        let ctx = self.pr.context()?;
        let store = connect()?;

        let modified = pipeline::resolve_modified(&ctx, &self.content.root, &self.modified)
            .context("failed to determine modified directories")?;
        let report = pipeline::sync_content(
            &store,
            &ctx,
            &settings,
            &modified,
            &self.content.root,
            self.dry_run,
        )
        .context("content sync failed")?;

        print_report(&report, self.dry_run);
        Ok(())
    }
}

fn print_report(report: &ContentReport, dry_run: bool) {
    let prefix = dry_run_prefix(dry_run);
    for outcome in &report.outcomes {
        if let Some(line) = outcome_line(outcome) {
            println!("{line}");
        }
    }
    for path in &report.skipped_files {
        println!("  ?  {}", path.display());
    }

    println!("{prefix}Projects:");
    println!("{}", report.projects);
    println!("{prefix}Stages:");
    println!("{}", report.stages);
}

/// One line per row that was (or would be) written. No-ops are silent.
pub fn outcome_line(outcome: &Outcome) -> Option<String> {
    let subject = format!("{} {} ({})", outcome.kind, outcome.key, outcome.label);
    match &outcome.action {
        Action::Created => Some(format!("  +  {subject}")),
        Action::WouldCreate => Some(format!("  ~  {subject} (new)")),
        Action::Updated { fields } => Some(format!("  ✎  {subject}: {}", fields.join(", "))),
        Action::WouldUpdate { fields } => Some(format!("  ~  {subject}: {}", fields.join(", "))),
        Action::Deleted => Some(format!("  -  {subject}")),
        Action::WouldDelete => Some(format!("  ~  {subject} (delete)")),
        Action::Unchanged => None,
    }
}
