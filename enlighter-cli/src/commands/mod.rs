//! Subcommands and the argument groups they share.

pub mod cleanup;
pub mod diff;
pub mod list;
pub mod sync;
pub mod templates;
pub mod validate;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use enlighter_core::{Credentials, PrNumber, RunContext, Settings};
use enlighter_store::RestStore;

/// Where the content lives and how it is laid out.
#[derive(Args, Debug)]
pub struct ContentArgs {
    /// Root of the content checkout.
    #[arg(long, default_value = ".")]
    pub root: PathBuf,

    /// Settings file (defaults to `<root>/enlighter.yaml` when present).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl ContentArgs {
    pub fn settings(&self) -> Result<Settings> {
        Settings::discover(&self.root, self.config.as_deref()).context("failed to load settings")
    }
}

/// Pull-request selection for commands that create or delete drafts.
#[derive(Args, Debug)]
pub struct PrArgs {
    /// Treat this run as pull request <N>, overriding PR_NUMBER.
    #[arg(long, value_name = "N", value_parser = parse_pr)]
    pub pr: Option<PrNumber>,
}

impl PrArgs {
    pub fn context(&self) -> Result<RunContext> {
        RunContext::from_env_with_pr(self.pr).context("invalid CI environment")
    }
}

fn parse_pr(raw: &str) -> std::result::Result<PrNumber, String> {
    PrNumber::parse(raw).map_err(|e| e.to_string())
}

/// Connect to the backend named by `SUPABASE_URL` / `SUPABASE_KEY`.
pub fn connect() -> Result<RestStore> {
    let credentials = Credentials::from_env().context("backend credentials are not configured")?;
    tracing::debug!("using backend at {}", credentials.url);
    Ok(RestStore::new(&credentials))
}

/// `"[dry-run] "` or nothing.
pub fn dry_run_prefix(dry_run: bool) -> &'static str {
    if dry_run {
        "[dry-run] "
    } else {
        ""
    }
}
