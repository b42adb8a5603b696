//! Template reconciliation, keyed by name rather than ID.

use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::json;

use enlighter_core::{content, EntityKind, Settings};
use enlighter_store::{Filter, Row, RowStore};

use crate::fields::normalize_line_endings;
use crate::report::{Action, Outcome, TemplateReport};
use crate::SyncError;

/// Sync every template under `<root>/<templates_dir>/`, stamping updates with
/// the current time.
pub fn sync_templates(
    store: &dyn RowStore,
    settings: &Settings,
    root: &Path,
    dry_run: bool,
) -> Result<TemplateReport, SyncError> {
    sync_templates_at(store, settings, root, dry_run, Utc::now())
}

/// Like [`sync_templates`] with an explicit `updated_at` timestamp.
///
/// - absent row: insert `{name, template}`
/// - row with different text: update `{template, updated_at}`
/// - row with the same text: nothing
pub fn sync_templates_at(
    store: &dyn RowStore,
    settings: &Settings,
    root: &Path,
    dry_run: bool,
    now: DateTime<Utc>,
) -> Result<TemplateReport, SyncError> {
    let table = &settings.tables.templates;
    let mut report = TemplateReport::default();

    let files = content::list_templates(root, &settings.layout)?;
    if files.is_empty() {
        tracing::info!(
            "no templates found under {}",
            root.join(&settings.layout.templates_dir).display()
        );
    }

    for file in files {
        let text = match std::fs::read_to_string(&file.path) {
            Ok(text) => normalize_line_endings(&text),
            Err(e) => {
                tracing::warn!("skipping template {}: {e}", file.path.display());
                report.tally.skipped += 1;
                report.skipped_files.push(file.path);
                continue;
            }
        };

        let filter = Filter::eq("name", file.name.as_str());
        let existing = store.find_one(table, &filter)?;

        let action = match existing {
            None if dry_run => {
                tracing::info!("[dry-run] would create template {}", file.name);
                Action::WouldCreate
            }
            None => {
                tracing::info!("creating template {}", file.name);
                let mut row = Row::new();
                row.insert("name".to_string(), json!(file.name));
                row.insert("template".to_string(), json!(text));
                store.insert(table, &row)?;
                Action::Created
            }
            Some(remote) if remote.get("template").and_then(|v| v.as_str()) == Some(text.as_str()) => {
                tracing::debug!("template {} is up to date", file.name);
                Action::Unchanged
            }
            Some(_) if dry_run => {
                tracing::info!("[dry-run] would update template {}", file.name);
                Action::WouldUpdate {
                    fields: vec!["template".to_string()],
                }
            }
            Some(_) => {
                tracing::info!("updating template {}", file.name);
                let mut patch = Row::new();
                patch.insert("template".to_string(), json!(text));
                patch.insert(
                    "updated_at".to_string(),
                    json!(now.to_rfc3339_opts(SecondsFormat::Secs, true)),
                );
                store.update(table, &filter, &patch)?;
                Action::Updated {
                    fields: vec!["template".to_string()],
                }
            }
        };

        report.tally.record(&action);
        report.outcomes.push(Outcome {
            kind: EntityKind::Template,
            key: file.name.clone(),
            label: file.name,
            action,
        });
    }

    Ok(report)
}
