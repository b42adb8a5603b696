//! `enlighter diff`: show unified diffs for what sync-content would write.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use enlighter_sync::{diff_content, pipeline};

use super::{connect, ContentArgs, PrArgs};

/// Arguments for `enlighter diff`.
#[derive(Args, Debug)]
pub struct DiffArgs {
    #[command(flatten)]
    pub content: ContentArgs,

    #[command(flatten)]
    pub pr: PrArgs,

    /// Top-level directories changed by the pull request.
    #[arg(long, value_name = "DIR", num_args = 1..)]
    pub modified: Vec<String>,
}

impl DiffArgs {
    pub fn run(self) -> Result<()> {
        let settings = self.content.settings()?;
        let ctx = self.pr.context()?;
        let store = connect()?;

        let modified = pipeline::resolve_modified(&ctx, &self.content.root, &self.modified)
            .context("failed to determine modified directories")?;
        let diffs = diff_content(&store, &ctx, &settings, &modified, &self.content.root)
            .context("diff failed")?;

        if diffs.is_empty() {
            println!("No differences.");
            return Ok(());
        }

        for row in diffs {
            let verb = if row.create { "create" } else { "update" };
            println!(
                "{}",
                format!("{} {} {} ({})", verb, row.kind, row.id, row.label).bold()
            );
            for field in row.fields {
                print!("{}", field.unified_diff);
                if !field.unified_diff.ends_with('\n') {
                    println!();
                }
            }
        }

        Ok(())
    }
}
