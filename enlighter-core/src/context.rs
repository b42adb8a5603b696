//! Run context and credentials.
//!
//! Both are built once at process start and passed by reference. Each has a
//! `from_lookup` constructor taking a variable lookup closure so tests never
//! touch the process environment; `from_env` delegates to it.

use crate::error::ConfigError;
use crate::types::PrNumber;

const DEFAULT_OWNER: &str = "hyperskill";
const DEFAULT_REPO: &str = "enlighter-content";
const DEFAULT_BRANCH: &str = "main";

/// Pull-request details, present only when the run is a PR run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequest {
    pub number: PrNumber,
    pub base_ref: Option<String>,
    pub head_ref: Option<String>,
}

/// What this CI invocation is running against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunContext {
    pub event_name: Option<String>,
    pub pull_request: Option<PullRequest>,
    pub ref_name: String,
    pub repo_owner: String,
    pub repo_name: String,
}

impl RunContext {
    /// Build the context from a variable lookup.
    ///
    /// A PR run is declared by `GITHUB_EVENT_NAME=pull_request`; it requires
    /// `PR_NUMBER` to be a positive integer.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::from_lookup_with_pr(lookup, None)
    }

    /// Like [`RunContext::from_lookup`], with an explicit PR number.
    ///
    /// `pr_override` makes the run a PR run and replaces `PR_NUMBER`, which is
    /// then neither required nor parsed.
    pub fn from_lookup_with_pr<F>(lookup: F, pr_override: Option<PrNumber>) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let event_name = var("GITHUB_EVENT_NAME");
        let number = match pr_override {
            Some(number) => Some(number),
            None if event_name.as_deref() == Some("pull_request") => {
                let raw = var("PR_NUMBER").ok_or(ConfigError::MissingVar("PR_NUMBER"))?;
                Some(PrNumber::parse(&raw)?)
            }
            None => None,
        };
        let pull_request = number.map(|number| PullRequest {
            number,
            base_ref: var("GITHUB_BASE_REF"),
            head_ref: var("GITHUB_HEAD_REF"),
        });

        let repo_name = var("GITHUB_REPOSITORY")
            .and_then(|full| full.rsplit('/').next().map(str::to_string))
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| DEFAULT_REPO.to_string());

        Ok(Self {
            event_name,
            pull_request,
            ref_name: var("GITHUB_REF_NAME").unwrap_or_else(|| DEFAULT_BRANCH.to_string()),
            repo_owner: var("GITHUB_REPOSITORY_OWNER").unwrap_or_else(|| DEFAULT_OWNER.to_string()),
            repo_name,
        })
    }

    /// `from_lookup` over the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// `from_lookup_with_pr` over the process environment.
    pub fn from_env_with_pr(pr_override: Option<PrNumber>) -> Result<Self, ConfigError> {
        Self::from_lookup_with_pr(|name| std::env::var(name).ok(), pr_override)
    }

    /// Force a PR context with `number`, keeping any refs already known.
    pub fn with_pr_number(mut self, number: PrNumber) -> Self {
        match self.pull_request.as_mut() {
            Some(pr) => pr.number = number,
            None => {
                self.pull_request = Some(PullRequest {
                    number,
                    base_ref: None,
                    head_ref: None,
                })
            }
        }
        self
    }

    pub fn is_pull_request(&self) -> bool {
        self.pull_request.is_some()
    }

    pub fn pr_number(&self) -> Option<PrNumber> {
        self.pull_request.as_ref().map(|pr| pr.number)
    }

    /// Branch a row's source URL should point at.
    ///
    /// Draft rows mirror the PR head; real rows mirror the base branch (or the
    /// current ref outside a PR), so a PR run never repoints real rows at an
    /// unmerged branch.
    pub fn source_branch(&self, draft: bool) -> &str {
        match &self.pull_request {
            Some(pr) if draft => pr.head_ref.as_deref().unwrap_or(&self.ref_name),
            Some(pr) => pr.base_ref.as_deref().unwrap_or(&self.ref_name),
            None => &self.ref_name,
        }
    }

    /// `https://github.com/<owner>/<repo>/blob/<branch>/<rel_path>`.
    pub fn github_file_url(&self, rel_path: &str, draft: bool) -> String {
        format!(
            "https://github.com/{}/{}/blob/{}/{}",
            self.repo_owner,
            self.repo_name,
            self.source_branch(draft),
            rel_path.trim_start_matches('/'),
        )
    }
}

/// Connection details for the hosted backend.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub url: String,
    pub key: String,
}

impl Credentials {
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &'static str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::MissingVar(name))
        };
        Ok(Self {
            url: var("SUPABASE_URL")?,
            key: var("SUPABASE_KEY")?,
        })
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("url", &self.url)
            .field("key", &"<redacted>")
            .finish()
    }
}
