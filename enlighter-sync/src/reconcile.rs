//! Reconciliation driver for projects and stages.
//!
//! ## Per-row protocol
//!
//! 1. Resolve the effective ID: the real ID, or the draft ID when this is a
//!    PR run and the project directory is among the modified directories.
//! 2. Point-lookup the remote row at that ID.
//! 3. No row → create it (projects are tagged `is_draft` iff the ID is negative).
//! 4. Row exists → diff tracked fields; send one update with the changed
//!    fields plus `github_file_url`, or nothing if no field differs.
//!
//! A project is reconciled before its stages, since stage rows reference the
//! project's effective ID.

use serde_json::{json, Value};

use enlighter_core::{
    draft, EntityKind, ProjectContent, RunContext, Settings, StageContent,
};
use enlighter_store::{Filter, Row, RowStore};

use crate::fields::{normalize_line_endings, plan_row, to_row, RowPlan};
use crate::modified::ModifiedDirs;
use crate::report::{Action, ContentReport, Outcome};
use crate::SyncError;

const GITHUB_FILE_URL: &str = "github_file_url";

/// A planned change for one row, before anything is written.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedRow {
    pub kind: EntityKind,
    pub id: i64,
    pub label: String,
    pub local: Row,
    pub remote: Option<Row>,
    pub plan: RowPlan,
}

/// The driver. Borrowed collaborators only; one instance per run.
pub struct Reconciler<'a> {
    store: &'a dyn RowStore,
    ctx: &'a RunContext,
    settings: &'a Settings,
    modified: &'a ModifiedDirs,
    dry_run: bool,
}

impl<'a> Reconciler<'a> {
    pub fn new(
        store: &'a dyn RowStore,
        ctx: &'a RunContext,
        settings: &'a Settings,
        modified: &'a ModifiedDirs,
        dry_run: bool,
    ) -> Self {
        Self {
            store,
            ctx,
            settings,
            modified,
            dry_run,
        }
    }

    /// Whether rows of this project directory are drafts in this run.
    pub fn is_draft_dir(&self, project: &ProjectContent) -> bool {
        self.ctx.is_pull_request() && self.modified.contains(&project.dir.name)
    }

    fn resolve_id(&self, real_id: i64, draft_dir: bool) -> Result<i64, SyncError> {
        let pr = self.ctx.pr_number().map(|pr| pr.get());
        Ok(draft::effective_id(real_id, pr, draft_dir)?)
    }

    // -----------------------------------------------------------------------
    // Planning
    // -----------------------------------------------------------------------

    /// Plan the project row of `project`.
    pub fn plan_project(&self, project: &ProjectContent) -> Result<PlannedRow, SyncError> {
        let id = self.resolve_id(project.meta.id, self.is_draft_dir(project))?;
        let local = to_row(&project.meta)?;
        let remote = self
            .store
            .find_one(&self.settings.tables.projects, &Filter::id(id))?;

        let mut create_extra = Row::new();
        create_extra.insert("is_draft".to_string(), Value::Bool(draft::is_draft(id)));
        let plan = plan_row("id", json!(id), &local, remote.as_ref(), create_extra, &[]);

        Ok(PlannedRow {
            kind: EntityKind::Project,
            id,
            label: project.meta.title.clone(),
            local,
            remote,
            plan,
        })
    }

    /// Plan one stage row. `project_id` is the owning project's effective ID.
    pub fn plan_stage(
        &self,
        stage: &StageContent,
        project_id: i64,
        draft_dir: bool,
    ) -> Result<PlannedRow, SyncError> {
        let id = self.resolve_id(stage.file.name.real_id, draft_dir)?;
        let local = self.stage_row(stage, project_id, draft::is_draft(id));
        let remote = self
            .store
            .find_one(&self.settings.tables.stages, &Filter::id(id))?;

        let always: &[&str] = if self.settings.features.stamp_github_url {
            &[GITHUB_FILE_URL]
        } else {
            &[]
        };
        let plan = plan_row("id", json!(id), &local, remote.as_ref(), Row::new(), always);

        Ok(PlannedRow {
            kind: EntityKind::Stage,
            id,
            label: stage.title().to_string(),
            local,
            remote,
            plan,
        })
    }

    fn stage_row(&self, stage: &StageContent, project_id: i64, draft: bool) -> Row {
        let mut row = Row::new();
        row.insert("project_id".to_string(), json!(project_id));
        row.insert("order_num".to_string(), json!(stage.file.name.order_num));
        row.insert("title".to_string(), json!(stage.title()));
        row.insert(
            "description".to_string(),
            json!(normalize_line_endings(&stage.description)),
        );
        if let Some(next) = stage.next_button_title() {
            row.insert("next_button_title".to_string(), json!(next));
        }
        if self.settings.features.stamp_github_url {
            row.insert(
                GITHUB_FILE_URL.to_string(),
                json!(self.ctx.github_file_url(&stage.file.rel_path, draft)),
            );
        }
        row
    }

    /// Plan every row of `tree` without writing anything.
    pub fn plan(&self, tree: &[ProjectContent]) -> Result<Vec<PlannedRow>, SyncError> {
        let mut planned = Vec::new();
        for project in tree {
            let draft_dir = self.is_draft_dir(project);
            let project_row = self.plan_project(project)?;
            let project_id = project_row.id;
            planned.push(project_row);
            for stage in &project.stages {
                planned.push(self.plan_stage(stage, project_id, draft_dir)?);
            }
        }
        Ok(planned)
    }

    // -----------------------------------------------------------------------
    // Applying
    // -----------------------------------------------------------------------

    fn table(&self, kind: EntityKind) -> &str {
        match kind {
            EntityKind::Project => &self.settings.tables.projects,
            EntityKind::Stage => &self.settings.tables.stages,
            EntityKind::Template => &self.settings.tables.templates,
        }
    }

    /// Execute a plan (or describe it, in dry-run mode).
    pub fn apply(&self, planned: PlannedRow) -> Result<Outcome, SyncError> {
        let table = self.table(planned.kind);
        let kind = planned.kind;
        let id = planned.id;

        let action = match planned.plan {
            RowPlan::Unchanged => {
                tracing::debug!("no changes for {kind} {id} ({})", planned.label);
                Action::Unchanged
            }
            RowPlan::Create(_) if self.dry_run => {
                tracing::info!("[dry-run] would create {kind} {id} ({})", planned.label);
                Action::WouldCreate
            }
            RowPlan::Create(row) => {
                tracing::info!("creating {kind} {id} ({})", planned.label);
                self.store.insert(table, &row)?;
                Action::Created
            }
            RowPlan::Update { changed, .. } if self.dry_run => {
                tracing::info!(
                    "[dry-run] would update {kind} {id} ({}): {}",
                    planned.label,
                    changed.join(", ")
                );
                Action::WouldUpdate { fields: changed }
            }
            RowPlan::Update { patch, changed } => {
                tracing::info!(
                    "updating {kind} {id} ({}): {}",
                    planned.label,
                    changed.join(", ")
                );
                self.store.update(table, &Filter::id(id), &patch)?;
                Action::Updated { fields: changed }
            }
        };

        Ok(Outcome {
            kind,
            key: id.to_string(),
            label: planned.label,
            action,
        })
    }

    /// Reconcile every project and stage of `tree`, one row at a time.
    pub fn run(&self, tree: &[ProjectContent]) -> Result<ContentReport, SyncError> {
        let mut report = ContentReport::default();
        for project in tree {
            let draft_dir = self.is_draft_dir(project);
            if draft_dir {
                tracing::info!("{} is modified in this PR; using draft ids", project.dir.name);
            }

            let project_row = self.plan_project(project)?;
            let project_id = project_row.id;
            report.push(self.apply(project_row)?);

            for stage in &project.stages {
                let planned = self.plan_stage(stage, project_id, draft_dir)?;
                report.push(self.apply(planned)?);
            }

            for path in &project.skipped {
                tracing::warn!("skipping {}: file name doesn't match expected pattern", path.display());
                report.stages.skipped += 1;
                report.skipped_files.push(path.clone());
            }
        }
        Ok(report)
    }
}
