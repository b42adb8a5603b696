//! Per-row outcomes and per-run tallies.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

use enlighter_core::EntityKind;

/// What happened to a single row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    Created,
    Updated { fields: Vec<String> },
    Unchanged,
    Deleted,
    /// `--dry-run`: the row *would* have been created.
    WouldCreate,
    /// `--dry-run`: the row *would* have been updated.
    WouldUpdate { fields: Vec<String> },
    /// `--dry-run`: the row *would* have been deleted.
    WouldDelete,
}

/// Outcome of reconciling or deleting one row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Outcome {
    pub kind: EntityKind,
    /// Row ID for projects and stages, template name for templates.
    pub key: String,
    pub label: String,
    #[serde(flatten)]
    pub action: Action,
}

/// Counters for one entity kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Tally {
    pub created: usize,
    pub updated: usize,
    pub unchanged: usize,
    /// Files skipped because their name did not parse or could not be read.
    pub skipped: usize,
    /// Kept for summary compatibility; no current path increments it.
    pub not_found: usize,
}

impl Tally {
    pub fn record(&mut self, action: &Action) {
        match action {
            Action::Created | Action::WouldCreate => self.created += 1,
            Action::Updated { .. } | Action::WouldUpdate { .. } => self.updated += 1,
            Action::Unchanged => self.unchanged += 1,
            Action::Deleted | Action::WouldDelete => {}
        }
    }

    pub fn writes(&self) -> usize {
        self.created + self.updated
    }

    pub fn total(&self) -> usize {
        self.created + self.updated + self.unchanged + self.skipped + self.not_found
    }
}

impl fmt::Display for Tally {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "- Created: {}", self.created)?;
        writeln!(f, "- Updated: {}", self.updated)?;
        writeln!(f, "- Unchanged: {}", self.unchanged)?;
        writeln!(f, "- Skipped (invalid filename): {}", self.skipped)?;
        writeln!(f, "- Not found in store: {}", self.not_found)?;
        write!(f, "- Total processed: {}", self.total())
    }
}

/// Result of `sync-content`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ContentReport {
    pub projects: Tally,
    pub stages: Tally,
    pub outcomes: Vec<Outcome>,
    pub skipped_files: Vec<PathBuf>,
}

impl ContentReport {
    pub(crate) fn push(&mut self, outcome: Outcome) {
        match outcome.kind {
            EntityKind::Project => self.projects.record(&outcome.action),
            EntityKind::Stage => self.stages.record(&outcome.action),
            EntityKind::Template => {}
        }
        self.outcomes.push(outcome);
    }
}

/// Result of `sync-templates`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TemplateReport {
    pub tally: Tally,
    pub outcomes: Vec<Outcome>,
    pub skipped_files: Vec<PathBuf>,
}

/// Result of `delete-drafts`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CleanupReport {
    pub deleted_projects: usize,
    pub deleted_stages: usize,
    /// Negative IDs that did not decode.
    pub malformed: usize,
    /// Drafts that belong to a different PR and were left alone.
    pub retained: usize,
    pub outcomes: Vec<Outcome>,
}

impl CleanupReport {
    pub fn total_deleted(&self) -> usize {
        self.deleted_projects + self.deleted_stages
    }
}

impl fmt::Display for CleanupReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "- Deleted draft projects: {}", self.deleted_projects)?;
        writeln!(f, "- Deleted draft stages: {}", self.deleted_stages)?;
        writeln!(f, "- Skipped (malformed id): {}", self.malformed)?;
        writeln!(f, "- Left for other pull requests: {}", self.retained)?;
        write!(f, "- Total deleted entities: {}", self.total_deleted())
    }
}
