//! In-memory row store.
//!
//! Rows live in a `BTreeMap<table, Vec<Row>>` behind a `RefCell`; the store is
//! single-threaded like the driver that uses it. Every successful write is
//! appended to a log so callers can assert exactly which writes a run issued.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

use crate::error::StoreError;
use crate::filter::{Filter, Row};
use crate::RowStore;

/// A write the store accepted.
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOp {
    Insert { table: String, row: Row },
    Update { table: String, filter: Filter, patch: Row },
    Delete { table: String, filter: Filter, count: usize },
}

impl WriteOp {
    pub fn table(&self) -> &str {
        match self {
            WriteOp::Insert { table, .. }
            | WriteOp::Update { table, .. }
            | WriteOp::Delete { table, .. } => table,
        }
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RefCell<BTreeMap<String, Vec<Row>>>,
    log: RefCell<Vec<WriteOp>>,
    fail_writes: Cell<bool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Put rows in place without logging a write.
    pub fn seed(&self, table: &str, rows: impl IntoIterator<Item = Row>) {
        self.tables
            .borrow_mut()
            .entry(table.to_string())
            .or_default()
            .extend(rows);
    }

    /// Current contents of `table`.
    pub fn rows(&self, table: &str) -> Vec<Row> {
        self.tables
            .borrow()
            .get(table)
            .cloned()
            .unwrap_or_default()
    }

    /// Every write accepted so far, in order.
    pub fn writes(&self) -> Vec<WriteOp> {
        self.log.borrow().clone()
    }

    /// Forget the write log, keeping the rows.
    pub fn clear_writes(&self) {
        self.log.borrow_mut().clear();
    }

    /// Make every subsequent write fail with HTTP 503.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.set(fail);
    }

    fn check_writable(&self, method: &'static str, table: &str) -> Result<(), StoreError> {
        if self.fail_writes.get() {
            return Err(StoreError::Http {
                method,
                table: table.to_string(),
                status: 503,
                body: "service unavailable".to_string(),
            });
        }
        Ok(())
    }
}

impl RowStore for MemoryStore {
    fn select(&self, table: &str, filter: &Filter) -> Result<Vec<Row>, StoreError> {
        Ok(self
            .tables
            .borrow()
            .get(table)
            .map(|rows| rows.iter().filter(|r| filter.matches(r)).cloned().collect())
            .unwrap_or_default())
    }

    fn insert(&self, table: &str, row: &Row) -> Result<Row, StoreError> {
        self.check_writable("POST", table)?;
        self.tables
            .borrow_mut()
            .entry(table.to_string())
            .or_default()
            .push(row.clone());
        self.log.borrow_mut().push(WriteOp::Insert {
            table: table.to_string(),
            row: row.clone(),
        });
        Ok(row.clone())
    }

    fn update(&self, table: &str, filter: &Filter, patch: &Row) -> Result<Vec<Row>, StoreError> {
        self.check_writable("PATCH", table)?;
        let mut updated = Vec::new();
        if let Some(rows) = self.tables.borrow_mut().get_mut(table) {
            for row in rows.iter_mut().filter(|r| filter.matches(r)) {
                for (column, value) in patch {
                    row.insert(column.clone(), value.clone());
                }
                updated.push(row.clone());
            }
        }
        self.log.borrow_mut().push(WriteOp::Update {
            table: table.to_string(),
            filter: filter.clone(),
            patch: patch.clone(),
        });
        Ok(updated)
    }

    fn delete(&self, table: &str, filter: &Filter) -> Result<usize, StoreError> {
        self.check_writable("DELETE", table)?;
        let mut count = 0;
        if let Some(rows) = self.tables.borrow_mut().get_mut(table) {
            let before = rows.len();
            rows.retain(|r| !filter.matches(r));
            count = before - rows.len();
        }
        self.log.borrow_mut().push(WriteOp::Delete {
            table: table.to_string(),
            filter: filter.clone(),
            count,
        });
        Ok(count)
    }
}
