//! Enlighter core library — content model, draft-ID codec, run context.
//!
//! - [`draft`] — encode / decode of negative draft row IDs
//! - [`types`] — newtypes and content structs
//! - [`content`] — discovery and loading of the local content tree
//! - [`context`] — CI run context and backend credentials
//! - [`settings`] — optional `enlighter.yaml` feature flags and conventions
//! - [`validate`] — markup and layout checks
//! - [`error`] — [`CodecError`], [`ContentError`], [`ConfigError`]

pub mod content;
pub mod context;
pub mod draft;
pub mod error;
pub mod settings;
pub mod types;
pub mod validate;

pub use context::{Credentials, PullRequest, RunContext};
pub use draft::DraftParts;
pub use error::{CodecError, ConfigError, ContentError};
pub use settings::Settings;
pub use types::{
    EntityKind, PrNumber, ProjectContent, ProjectDir, ProjectMeta, StageContent, StageFile,
    StageMeta, StageName, TemplateFile,
};
