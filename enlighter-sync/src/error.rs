//! Error types for enlighter-sync.

use thiserror::Error;

use enlighter_core::{CodecError, ConfigError, ContentError};
use enlighter_store::StoreError;

/// All errors that can end a sync run.
///
/// Nothing here is retried; the caller reports the error and exits.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Missing or malformed local content.
    #[error("content error: {0}")]
    Content(#[from] ContentError),

    /// A real ID or PR number outside the draft-ID domain.
    #[error("draft id error: {0}")]
    Codec(#[from] CodecError),

    /// Invalid run context or settings.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Any failure from the row store.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// A local model could not be turned into a JSON row.
    #[error("failed to serialise row: {0}")]
    Serialize(#[from] serde_json::Error),

    /// A local model serialised to something other than a JSON object.
    #[error("expected a JSON object row, got {0}")]
    NotARow(String),

    /// The modified-paths lookup failed.
    #[error("git error: {0}")]
    Git(String),
}
