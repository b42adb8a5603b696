//! Domain types for the content tree.
//!
//! All path fields use `PathBuf`; `rel_path` strings are always `/`-separated
//! and relative to the content root, since they end up inside source URLs.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::draft::MAX_PR_NUMBER;
use crate::error::ConfigError;

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// A validated pull-request number, `1..=99999`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct PrNumber(u32);

impl PrNumber {
    /// Parse a PR number as supplied by CI. Whitespace is trimmed.
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let value: i64 = raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidPrNumber(raw.to_string()))?;
        Self::try_from(value)
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl TryFrom<i64> for PrNumber {
    type Error = ConfigError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        if (1..=i64::from(MAX_PR_NUMBER)).contains(&value) {
            Ok(Self(value as u32))
        } else {
            Err(ConfigError::InvalidPrNumber(value.to_string()))
        }
    }
}

impl fmt::Display for PrNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// The kind of content row being reconciled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Project,
    Stage,
    Template,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Project => write!(f, "project"),
            EntityKind::Stage => write!(f, "stage"),
            EntityKind::Template => write!(f, "template"),
        }
    }
}

// ---------------------------------------------------------------------------
// Sidecar and metadata payloads
// ---------------------------------------------------------------------------

/// The `project.json` sidecar of a project directory.
///
/// Only `id` and `title` are mandatory. Optional attributes that are absent
/// are not tracked at all, so the remote value is left alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectMeta {
    #[serde(skip_serializing)]
    pub id: i64,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub readme: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ides: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available_in_web: Option<bool>,
}

/// The JSON object embedded in a stage file's metadata comment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageMeta {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub next_button_title: Option<String>,
}

// ---------------------------------------------------------------------------
// Discovered content
// ---------------------------------------------------------------------------

/// A directory named `<prefix><id>_<name>` under the content root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectDir {
    /// Directory name, as it appears in modified-path listings.
    pub name: String,
    pub path: PathBuf,
    /// Numeric ID embedded in the directory name.
    pub dir_id: i64,
    /// Human label embedded in the directory name, underscores as spaces.
    pub label: String,
}

/// The parts of a `<order>_<id>_<title>.<ext>` stage file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageName {
    pub order_num: i64,
    pub real_id: i64,
    pub title: String,
}

/// A stage file located inside a project directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageFile {
    pub name: StageName,
    pub path: PathBuf,
    pub rel_path: String,
}

/// A fully loaded stage: file name parts, metadata, and body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageContent {
    pub file: StageFile,
    pub meta: Option<StageMeta>,
    /// File text with the metadata comment removed.
    pub description: String,
}

impl StageContent {
    /// Title from metadata, falling back to the file-name title.
    pub fn title(&self) -> &str {
        self.meta
            .as_ref()
            .and_then(|m| m.title.as_deref())
            .unwrap_or(&self.file.name.title)
    }

    pub fn next_button_title(&self) -> Option<&str> {
        self.meta.as_ref().and_then(|m| m.next_button_title.as_deref())
    }
}

/// A fully loaded project directory.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectContent {
    pub dir: ProjectDir,
    pub meta: ProjectMeta,
    pub stages: Vec<StageContent>,
    /// Files with the stage extension whose names did not parse.
    pub skipped: Vec<PathBuf>,
}

/// A reusable content template, keyed by file stem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateFile {
    pub name: String,
    pub path: PathBuf,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
