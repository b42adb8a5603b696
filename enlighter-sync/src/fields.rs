//! Field-level diffing between a local row and its remote counterpart.

use serde::Serialize;
use serde_json::Value;

use enlighter_store::Row;

use crate::SyncError;

/// What a reconciliation step will do to one row.
#[derive(Debug, Clone, PartialEq)]
pub enum RowPlan {
    /// No remote row: insert this full row.
    Create(Row),
    /// Remote row differs: send `patch`, which holds the `changed` fields
    /// plus any always-refreshed fields.
    Update { patch: Row, changed: Vec<String> },
    /// Remote row already matches.
    Unchanged,
}

/// Names of the local fields whose value differs from the remote row.
///
/// A field missing remotely counts as `null`. Order follows `local`.
pub fn changed_fields(local: &Row, remote: &Row) -> Vec<String> {
    local
        .iter()
        .filter(|(name, value)| !values_equal(value, remote.get(*name).unwrap_or(&Value::Null)))
        .map(|(name, _)| name.clone())
        .collect()
}

/// Decide between create, update and no-op for one row.
///
/// - `create_extra` is added only when creating (e.g. `is_draft`).
/// - `always` names fields that ride along with any update, whether or not
///   they changed themselves.
pub fn plan_row(
    id_column: &str,
    id: Value,
    local: &Row,
    remote: Option<&Row>,
    create_extra: Row,
    always: &[&str],
) -> RowPlan {
    let Some(remote) = remote else {
        let mut row = Row::new();
        row.insert(id_column.to_string(), id);
        row.extend(local.clone());
        row.extend(create_extra);
        return RowPlan::Create(row);
    };

    let changed = changed_fields(local, remote);
    if changed.is_empty() {
        return RowPlan::Unchanged;
    }

    let mut patch = Row::new();
    for name in changed.iter().map(String::as_str).chain(always.iter().copied()) {
        if let Some(value) = local.get(name) {
            patch.insert(name.to_string(), value.clone());
        }
    }
    RowPlan::Update { patch, changed }
}

/// JSON equality that treats `5` and `5.0` as the same number.
fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_i64(), y.as_i64()) {
            (Some(x), Some(y)) => x == y,
            _ => x.as_f64() == y.as_f64(),
        },
        _ => a == b,
    }
}

/// Serialise a local model into a row. Anything but a JSON object is an error.
pub fn to_row<T: Serialize>(value: &T) -> Result<Row, SyncError> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(SyncError::NotARow(other.to_string())),
    }
}

/// Normalise line endings to LF before comparing file text.
pub(crate) fn normalize_line_endings(content: &str) -> String {
    content.replace("\r\n", "\n")
}
