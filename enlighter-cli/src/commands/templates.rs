//! `enlighter sync-templates`

use anyhow::{Context, Result};
use clap::Args;

use enlighter_sync::sync_templates;

use super::sync::outcome_line;
use super::{connect, dry_run_prefix, ContentArgs};

/// Arguments for `enlighter sync-templates`.
#[derive(Args, Debug)]
pub struct SyncTemplatesArgs {
    #[command(flatten)]
    pub content: ContentArgs,

    /// Report what would be written without touching the backend.
    #[arg(long)]
    pub dry_run: bool,
}

impl SyncTemplatesArgs {
    pub fn run(self) -> Result<()> {
        let settings = self.content.settings()?;
        let store = connect()?;

        let report = sync_templates(&store, &settings, &self.content.root, self.dry_run)
            .context("template sync failed")?;

        for outcome in &report.outcomes {
            if let Some(line) = outcome_line(outcome) {
                println!("{line}");
            }
        }
        for path in &report.skipped_files {
            println!("  ?  {}", path.display());
        }
        println!("{}Templates:", dry_run_prefix(self.dry_run));
        println!("{}", report.tally);
        Ok(())
    }
}
