//! # enlighter-sync
//!
//! Reconciliation of a local content tree with the remote row store.
//!
//! - [`sync_content`] creates or updates project and stage rows, using draft
//!   IDs for directories a pull request touches.
//! - [`sync_templates`] mirrors the templates directory, keyed by name.
//! - [`delete_drafts`] removes the draft rows of one pull request.
//! - [`diff_content`] previews `sync_content` as unified diffs.

pub mod cleanup;
pub mod diff;
pub mod error;
pub mod fields;
pub mod modified;
pub mod pipeline;
pub mod reconcile;
pub mod report;
pub mod templates;

pub use cleanup::delete_drafts;
pub use diff::{diff_content, FieldDiff, RowDiff};
pub use error::SyncError;
pub use fields::RowPlan;
pub use modified::ModifiedDirs;
pub use pipeline::{resolve_modified, sync_content};
pub use reconcile::{PlannedRow, Reconciler};
pub use report::{Action, CleanupReport, ContentReport, Outcome, Tally, TemplateReport};
pub use templates::{sync_templates, sync_templates_at};
