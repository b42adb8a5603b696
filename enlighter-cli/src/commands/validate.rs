//! `enlighter validate`

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;

use enlighter_core::validate::validate_tree;

use super::ContentArgs;

/// Arguments for `enlighter validate`.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub content: ContentArgs,
}

impl ValidateArgs {
    pub fn run(self) -> Result<()> {
        let settings = self.content.settings()?;
        let issues = validate_tree(
            &self.content.root,
            &settings.layout,
            settings.features.require_stage_metadata,
        )
        .context("validation could not run")?;

        if issues.is_empty() {
            println!("{} content tree is valid", "✓".green());
            return Ok(());
        }
        for issue in &issues {
            println!("{} {issue}", "✗".red());
        }
        bail!("{} issue(s) found", issues.len())
    }
}
