//! Unified-diff preview of what `sync-content` would write.

use std::path::Path;

use serde_json::Value;
use similar::TextDiff;

use enlighter_core::{content, EntityKind, ProjectContent, RunContext, Settings};
use enlighter_store::RowStore;

use crate::fields::RowPlan;
use crate::modified::ModifiedDirs;
use crate::reconcile::{PlannedRow, Reconciler};
use crate::SyncError;

/// Diff of a single field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDiff {
    pub field: String,
    pub unified_diff: String,
}

/// Pending change to one row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowDiff {
    pub kind: EntityKind,
    pub id: i64,
    pub label: String,
    /// `true` when the row does not exist remotely yet.
    pub create: bool,
    pub fields: Vec<FieldDiff>,
}

/// Load the content tree under `root` and diff it against the store.
///
/// Nothing is written.
pub fn diff_content(
    store: &dyn RowStore,
    ctx: &RunContext,
    settings: &Settings,
    modified: &ModifiedDirs,
    root: &Path,
) -> Result<Vec<RowDiff>, SyncError> {
    let tree = content::load_tree(
        root,
        &settings.layout,
        settings.features.require_stage_metadata,
    )?;
    diff_tree(store, ctx, settings, modified, &tree)
}

/// Diff an already loaded tree against the store.
pub fn diff_tree(
    store: &dyn RowStore,
    ctx: &RunContext,
    settings: &Settings,
    modified: &ModifiedDirs,
    tree: &[ProjectContent],
) -> Result<Vec<RowDiff>, SyncError> {
    let planned = Reconciler::new(store, ctx, settings, modified, true).plan(tree)?;
    Ok(planned.iter().filter_map(row_diff).collect())
}

fn row_diff(planned: &PlannedRow) -> Option<RowDiff> {
    let (create, names): (bool, Vec<&str>) = match &planned.plan {
        RowPlan::Unchanged => return None,
        RowPlan::Create(_) => (true, planned.local.keys().map(String::as_str).collect()),
        RowPlan::Update { changed, .. } => (false, changed.iter().map(String::as_str).collect()),
    };

    let fields = names
        .into_iter()
        .map(|name| {
            let old = planned
                .remote
                .as_ref()
                .and_then(|r| r.get(name))
                .map(display_value)
                .unwrap_or_default();
            let new = planned.local.get(name).map(display_value).unwrap_or_default();
            let header = format!("{}/{}/{}", planned.kind, planned.id, name);
            FieldDiff {
                field: name.to_string(),
                unified_diff: unified(&old, &new, &header),
            }
        })
        .collect();

    Some(RowDiff {
        kind: planned.kind,
        id: planned.id,
        label: planned.label.clone(),
        create,
        fields,
    })
}

fn unified(old: &str, new: &str, header: &str) -> String {
    let old_header = format!("a/{header}");
    let new_header = format!("b/{header}");
    TextDiff::from_lines(old, new)
        .unified_diff()
        .header(&old_header, &new_header)
        .context_radius(3)
        .to_string()
}

/// Strings as-is with a trailing newline, everything else as JSON.
fn display_value(value: &Value) -> String {
    let mut text = match value {
        Value::Null => return String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    if !text.ends_with('\n') {
        text.push('\n');
    }
    text
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use enlighter_store::MemoryStore;

    use super::*;

    #[test]
    fn update_diff_shows_old_and_new_lines() {
        let diff = unified("<p>old</p>\n", "<p>new</p>\n", "stage/37/description");
        assert!(diff.contains("--- a/stage/37/description"));
        assert!(diff.contains("+++ b/stage/37/description"));
        assert!(diff.contains("-<p>old</p>"));
        assert!(diff.contains("+<p>new</p>"));
    }

    #[test]
    fn values_render_for_diffing() {
        assert_eq!(display_value(&json!("x")), "x\n");
        assert_eq!(display_value(&json!(["a", "b"])), "[\"a\",\"b\"]\n");
        assert_eq!(display_value(&Value::Null), "");
    }

    #[test]
    fn empty_tree_has_no_diffs() {
        let store = MemoryStore::new();
        let ctx = RunContext::from_lookup(|_| None).expect("ctx");
        let diffs = diff_tree(
            &store,
            &ctx,
            &Settings::default(),
            &ModifiedDirs::default(),
            &[],
        )
        .expect("diff");
        assert!(diffs.is_empty());
    }
}
