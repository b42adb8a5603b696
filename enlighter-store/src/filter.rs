//! Row and filter types shared by every store.

use std::cmp::Ordering;

use serde_json::Value;

/// A row is a JSON object keyed by column name.
pub type Row = serde_json::Map<String, Value>;

/// A single-column predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// `column = value`
    Eq { column: String, value: Value },
    /// `column < value`
    Lt { column: String, value: Value },
}

impl Filter {
    pub fn eq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Eq {
            column: column.into(),
            value: value.into(),
        }
    }

    pub fn lt(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Lt {
            column: column.into(),
            value: value.into(),
        }
    }

    /// `id = <id>`
    pub fn id(id: i64) -> Self {
        Self::eq("id", id)
    }

    pub fn column(&self) -> &str {
        match self {
            Self::Eq { column, .. } | Self::Lt { column, .. } => column,
        }
    }

    /// PostgREST query value, e.g. `eq.42` or `lt.0`.
    pub fn query_value(&self) -> String {
        let (op, value) = match self {
            Self::Eq { value, .. } => ("eq", value),
            Self::Lt { value, .. } => ("lt", value),
        };
        match value {
            Value::String(s) => format!("{op}.{s}"),
            other => format!("{op}.{other}"),
        }
    }

    /// Evaluate the predicate against an in-memory row.
    pub fn matches(&self, row: &Row) -> bool {
        let Some(actual) = row.get(self.column()) else {
            return false;
        };
        match self {
            Self::Eq { value, .. } => compare(actual, value) == Some(Ordering::Equal),
            Self::Lt { value, .. } => compare(actual, value) == Some(Ordering::Less),
        }
    }
}

fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_i64(), y.as_i64()) {
            (Some(x), Some(y)) => Some(x.cmp(&y)),
            _ => x.as_f64()?.partial_cmp(&y.as_f64()?),
        },
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        _ if a == b => Some(Ordering::Equal),
        _ => None,
    }
}
