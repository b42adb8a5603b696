//! `enlighter delete-drafts`: remove one pull request's draft rows.

use anyhow::{Context, Result};
use clap::Args;

use enlighter_core::Settings;
use enlighter_sync::delete_drafts;

use super::sync::outcome_line;
use super::{connect, dry_run_prefix, PrArgs};

/// Arguments for `enlighter delete-drafts`.
#[derive(Args, Debug)]
pub struct DeleteDraftsArgs {
    #[command(flatten)]
    pub pr: PrArgs,

    /// Settings file, for custom table names.
    #[arg(long)]
    pub config: Option<std::path::PathBuf>,

    /// Report what would be deleted without touching the backend.
    #[arg(long)]
    pub dry_run: bool,
}

impl DeleteDraftsArgs {
    pub fn run(self) -> Result<()> {
        let ctx = self.pr.context()?;
        let pr = ctx
            .pr_number()
            .context("not a pull request run; set PR_NUMBER with GITHUB_EVENT_NAME=pull_request or pass --pr")?;
        let settings = match &self.config {
            Some(path) => Settings::load(path).context("failed to load settings")?,
            None => Settings::default(),
        };
        let store = connect()?;

        let report = delete_drafts(&store, &settings.tables, pr, self.dry_run)
            .with_context(|| format!("draft cleanup failed for PR #{pr}"))?;

        for outcome in &report.outcomes {
            if let Some(line) = outcome_line(outcome) {
                println!("{line}");
            }
        }
        println!("{}Draft cleanup for PR #{pr}:", dry_run_prefix(self.dry_run));
        println!("{report}");
        Ok(())
    }
}
