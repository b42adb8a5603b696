//! # enlighter-store
//!
//! The row store the sync driver talks to.
//!
//! [`RowStore`] is the seam: four blocking operations over named tables and a
//! single-column [`Filter`]. [`RestStore`] implements it against the hosted
//! backend's PostgREST endpoint; [`MemoryStore`] keeps rows in memory and
//! records every write, which is what the driver tests assert against.
//!
//! No operation retries. A failed call surfaces as [`StoreError`] and is
//! expected to end the run.

pub mod error;
pub mod filter;
pub mod memory;
pub mod rest;

pub use error::StoreError;
pub use filter::{Filter, Row};
pub use memory::{MemoryStore, WriteOp};
pub use rest::RestStore;

/// Table-oriented access to the remote store.
pub trait RowStore {
    /// Every row of `table` matching `filter`.
    fn select(&self, table: &str, filter: &Filter) -> Result<Vec<Row>, StoreError>;

    /// Insert one row and return it as stored.
    fn insert(&self, table: &str, row: &Row) -> Result<Row, StoreError>;

    /// Apply `patch` to every matching row and return the updated rows.
    fn update(&self, table: &str, filter: &Filter, patch: &Row) -> Result<Vec<Row>, StoreError>;

    /// Delete every matching row and return how many went.
    fn delete(&self, table: &str, filter: &Filter) -> Result<usize, StoreError>;

    /// Point lookup: the first matching row, if any.
    fn find_one(&self, table: &str, filter: &Filter) -> Result<Option<Row>, StoreError> {
        Ok(self.select(table, filter)?.into_iter().next())
    }
}
