//! Enlighter: sync a lesson content tree into the hosted backend.
//!
//! # Usage
//!
//! ```text
//! enlighter sync-content   [--root <dir>] [--pr <n>] [--modified <dir>...] [--dry-run]
//! enlighter sync-templates [--root <dir>] [--dry-run]
//! enlighter delete-drafts  [--pr <n>] [--dry-run]
//! enlighter diff           [--root <dir>] [--pr <n>] [--modified <dir>...]
//! enlighter list           [--root <dir>] [--json]
//! enlighter validate       [--root <dir>]
//! ```
//!
//! Run context comes from the CI environment (`GITHUB_EVENT_NAME`,
//! `PR_NUMBER`, `GITHUB_BASE_REF`, ...); backend credentials from
//! `SUPABASE_URL` and `SUPABASE_KEY`.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{
    cleanup::DeleteDraftsArgs, diff::DiffArgs, list::ListArgs, sync::SyncContentArgs,
    templates::SyncTemplatesArgs, validate::ValidateArgs,
};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "enlighter",
    version,
    about = "Sync lesson projects, stages and templates into the content backend",
    long_about = None,
)]
struct Cli {
    /// Log debug output (overridden by RUST_LOG).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create or update project and stage rows from the content tree.
    SyncContent(SyncContentArgs),

    /// Create or update content templates.
    SyncTemplates(SyncTemplatesArgs),

    /// Delete the draft rows created for a pull request.
    DeleteDrafts(DeleteDraftsArgs),

    /// Show unified diffs of what sync-content would write.
    Diff(DiffArgs),

    /// List the projects and stages found in the content tree.
    List(ListArgs),

    /// Check the content tree for problems without contacting the backend.
    Validate(ValidateArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.command {
        Commands::SyncContent(args) => args.run(),
        Commands::SyncTemplates(args) => args.run(),
        Commands::DeleteDrafts(args) => args.run(),
        Commands::Diff(args) => args.run(),
        Commands::List(args) => args.run(),
        Commands::Validate(args) => args.run(),
    }
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
