//! Deletion of one pull request's draft rows.
//!
//! Projects go first: each negative project ID is decoded, and drafts of the
//! current PR are deleted together with every stage pointing at them. A second
//! sweep removes draft stages of the same PR that no longer hang off a draft
//! project (e.g. the project was cleaned up earlier or never made it in).
//! Negative IDs that do not decode are logged and left alone.

use std::collections::HashSet;

use enlighter_core::{draft, EntityKind, PrNumber};
use enlighter_core::settings::Tables;
use enlighter_store::{Filter, Row, RowStore};

use crate::report::{Action, CleanupReport, Outcome};
use crate::SyncError;

fn row_id(row: &Row) -> Option<i64> {
    row.get("id").and_then(|v| v.as_i64())
}

fn row_label(row: &Row) -> String {
    row.get("title")
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string()
}

/// Whether `id` is a well-formed draft of `pr`. Malformed IDs are warned
/// about and counted.
fn belongs_to(
    kind: EntityKind,
    id: i64,
    pr: PrNumber,
    report: &mut CleanupReport,
) -> bool {
    match draft::decode(id) {
        Ok(parts) if parts.pr_number == pr.get() => true,
        Ok(parts) => {
            tracing::info!("{kind} {id} belongs to PR #{}; leaving it", parts.pr_number);
            report.retained += 1;
            false
        }
        Err(e) => {
            tracing::warn!("skipping {kind} {id}: {e}");
            report.malformed += 1;
            false
        }
    }
}

/// Delete every draft project and stage created for `pr`.
pub fn delete_drafts(
    store: &dyn RowStore,
    tables: &Tables,
    pr: PrNumber,
    dry_run: bool,
) -> Result<CleanupReport, SyncError> {
    let mut report = CleanupReport::default();
    let mut removed_stages: HashSet<i64> = HashSet::new();
    let deleted = if dry_run {
        Action::WouldDelete
    } else {
        Action::Deleted
    };

    let projects = store.select(&tables.projects, &Filter::lt("id", 0))?;
    tracing::info!("found {} draft project row(s)", projects.len());

    for project in &projects {
        let Some(id) = row_id(project) else {
            tracing::warn!("skipping project row without an integer id");
            report.malformed += 1;
            continue;
        };
        if !belongs_to(EntityKind::Project, id, pr, &mut report) {
            continue;
        }

        let stage_filter = Filter::eq("project_id", id);
        let stages = store.select(&tables.stages, &stage_filter)?;
        if !dry_run && !stages.is_empty() {
            store.delete(&tables.stages, &stage_filter)?;
        }
        for stage in &stages {
            let Some(stage_id) = row_id(stage) else { continue };
            if removed_stages.insert(stage_id) {
                report.deleted_stages += 1;
                report.outcomes.push(Outcome {
                    kind: EntityKind::Stage,
                    key: stage_id.to_string(),
                    label: row_label(stage),
                    action: deleted.clone(),
                });
            }
        }

        if dry_run {
            tracing::info!("[dry-run] would delete project {id} and {} stage(s)", stages.len());
        } else {
            store.delete(&tables.projects, &Filter::id(id))?;
            tracing::info!("deleted project {id} and {} stage(s)", stages.len());
        }
        report.deleted_projects += 1;
        report.outcomes.push(Outcome {
            kind: EntityKind::Project,
            key: id.to_string(),
            label: row_label(project),
            action: deleted.clone(),
        });
    }

    let stages = store.select(&tables.stages, &Filter::lt("id", 0))?;
    for stage in &stages {
        let Some(id) = row_id(stage) else {
            tracing::warn!("skipping stage row without an integer id");
            report.malformed += 1;
            continue;
        };
        if removed_stages.contains(&id) || !belongs_to(EntityKind::Stage, id, pr, &mut report) {
            continue;
        }
        if dry_run {
            tracing::info!("[dry-run] would delete stage {id}");
        } else {
            store.delete(&tables.stages, &Filter::id(id))?;
            tracing::info!("deleted stage {id}");
        }
        removed_stages.insert(id);
        report.deleted_stages += 1;
        report.outcomes.push(Outcome {
            kind: EntityKind::Stage,
            key: id.to_string(),
            label: row_label(stage),
            action: deleted.clone(),
        });
    }

    Ok(report)
}
