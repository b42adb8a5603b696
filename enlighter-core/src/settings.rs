//! Optional `enlighter.yaml` settings.
//!
//! Every field has a default, so an absent file and an empty file behave the
//! same. The file only carries behaviour switches and naming conventions;
//! the run context and credentials always come from the environment.
//!
//! ```yaml
//! features:
//!   stamp_github_url: true
//!   require_stage_metadata: true
//!   draft_scheme: concatenated
//! tables:
//!   projects: projects
//!   stages: stages
//!   templates: content_templates
//! layout:
//!   project_prefix: project_
//!   stage_extension: html
//!   templates_dir: templates
//!   sidecar: project.json
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// File name looked up in the content root when no explicit path is given.
pub const SETTINGS_FILE: &str = "enlighter.yaml";

/// How draft IDs are derived. Only the concatenation scheme is supported;
/// the older fixed-offset scheme could not tell drafts of different PRs apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DraftScheme {
    #[default]
    Concatenated,
}

/// Optional driver behaviours.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Features {
    /// Compute and store `github_file_url` for each stage.
    pub stamp_github_url: bool,
    /// Abort the run when a stage file has no metadata block.
    pub require_stage_metadata: bool,
    pub draft_scheme: DraftScheme,
}

impl Default for Features {
    fn default() -> Self {
        Self {
            stamp_github_url: true,
            require_stage_metadata: true,
            draft_scheme: DraftScheme::Concatenated,
        }
    }
}

/// Remote table names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tables {
    pub projects: String,
    pub stages: String,
    pub templates: String,
}

impl Default for Tables {
    fn default() -> Self {
        Self {
            projects: "projects".to_string(),
            stages: "stages".to_string(),
            templates: "content_templates".to_string(),
        }
    }
}

/// Naming conventions of the content tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Layout {
    pub project_prefix: String,
    pub stage_extension: String,
    pub templates_dir: String,
    pub sidecar: String,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            project_prefix: "project_".to_string(),
            stage_extension: "html".to_string(),
            templates_dir: "templates".to_string(),
            sidecar: "project.json".to_string(),
        }
    }
}

/// Root of the settings document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub features: Features,
    pub tables: Tables,
    pub layout: Layout,
}

impl Settings {
    /// Load settings from an explicit file. The file must exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load `explicit` if given, else `<root>/enlighter.yaml` if present,
    /// else defaults.
    pub fn discover(root: &Path, explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        let candidate: PathBuf = root.join(SETTINGS_FILE);
        if candidate.is_file() {
            tracing::debug!("loading settings from {}", candidate.display());
            return Self::load(&candidate);
        }
        Ok(Self::default())
    }
}
