//! Error types for enlighter-store.

use thiserror::Error;

/// All errors a row store can return.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend answered with a non-success status.
    #[error("{method} {table} failed with HTTP {status}: {body}")]
    Http {
        method: &'static str,
        table: String,
        status: u16,
        body: String,
    },

    /// The request never got a response (DNS, TLS, connection reset, timeout).
    #[error("{method} {table} failed: {message}")]
    Transport {
        method: &'static str,
        table: String,
        message: String,
    },

    /// The response body was not the expected JSON.
    #[error("could not decode {table} response: {source}")]
    Decode {
        table: String,
        #[source]
        source: std::io::Error,
    },

    /// An insert returned no row.
    #[error("insert into {table} returned no row")]
    EmptyInsert { table: String },
}
