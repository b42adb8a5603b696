//! Error types for enlighter-core.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from the draft-ID codec.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// `encode` was called outside its domain (`real_id >= 1`, `0 <= pr <= 99999`).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A negative row ID that cannot be split into a real ID and a PR suffix.
    #[error("malformed draft id {id}: {reason}")]
    MalformedDraftId { id: i64, reason: &'static str },
}

/// Errors raised while reading the local content tree.
#[derive(Debug, Error)]
pub enum ContentError {
    /// A project directory has no sidecar file.
    #[error("project directory {dir} has no {sidecar}")]
    MissingSidecar { dir: PathBuf, sidecar: String },

    /// The sidecar exists but is not a valid project object.
    #[error("invalid project sidecar at {path}: {source}")]
    InvalidSidecar {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The sidecar's `id` is zero or negative.
    #[error("project sidecar at {path} has id {id}; ids must be positive")]
    InvalidProjectId { path: PathBuf, id: i64 },

    /// A stage file has no embedded metadata block.
    #[error("stage file {path} has no metadata block")]
    MissingMetadata { path: PathBuf },

    /// The metadata block exists but does not hold a valid JSON object.
    #[error("invalid metadata block in {path}: {message}")]
    InvalidMetadata { path: PathBuf, message: String },

    /// A file name does not follow `<order>_<id>_<title>.<ext>`.
    #[error("file name does not match <order>_<id>_<title> pattern: {path}")]
    InvalidFilename { path: PathBuf },

    /// Underlying I/O failure, with the path that was being read.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised while assembling the run context or settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required environment variable is unset or empty.
    #[error("environment variable {0} must be set")]
    MissingVar(&'static str),

    /// The PR number is not a positive integer within the encodable range.
    #[error("PR number must be an integer in 1..=99999, got '{0}'")]
    InvalidPrNumber(String),

    /// The settings file could not be parsed.
    #[error("failed to parse settings at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// The settings file could not be read.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience constructor for [`ContentError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> ContentError {
    ContentError::Io {
        path: path.into(),
        source,
    }
}
