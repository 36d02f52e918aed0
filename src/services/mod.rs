//! Service layer for the indexer.
//!
//! This module contains one fetcher per platform:
//! - GitHub repositories and gists (`GitHubIndexer`)
//! - HuggingFace models, datasets and spaces (`HuggingFaceIndexer`)
//!
//! Both implement [`ProjectSource`], which is all the orchestrator sees.

mod github;
mod huggingface;
mod paging;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::{AppError, Result};
use crate::models::{Project, ProjectKind, Source};

pub use github::{GitHubGist, GitHubIndexer, GitHubRepo, gist_to_project, repo_to_project};
pub use huggingface::{HfRepoInfo, HuggingFaceIndexer, to_project as hf_to_project};
pub use paging::{PaginatedFetchConfig, PaginatedFetchResult};

/// API quota reported by a platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitInfo {
    pub limit: u64,
    pub remaining: u64,
    pub reset_at: Option<DateTime<Utc>>,
}

/// A platform that can list public projects for an account.
#[async_trait]
pub trait ProjectSource: Send + Sync {
    /// Platform this source fetches from.
    fn source(&self) -> Source;

    /// Categories this source can list, in fetch order.
    fn categories(&self) -> &'static [ProjectKind];

    /// Account to index: the configured one, or the token's owner.
    async fn resolve_account(&self) -> Result<String>;

    /// Fetch every public project of one category.
    async fn list_category(&self, account: &str, kind: ProjectKind) -> Result<Vec<Project>>;

    /// Remaining API quota, if the platform reports one.
    async fn rate_limit(&self) -> Result<Option<RateLimitInfo>> {
        Ok(None)
    }
}

/// Human-readable label for one category of one source.
pub fn category_label(source: Source, kind: ProjectKind) -> String {
    format!("{} {}", source, kind.plural())
}

/// Error for a category the source does not serve.
pub(crate) fn unsupported_category(source: Source, kind: ProjectKind) -> AppError {
    AppError::validation(format!("{source} does not provide {}", kind.plural()))
}

/// Drop projects missing identifying fields, logging each one.
pub(crate) fn retain_valid(projects: Vec<Project>, context: &str) -> Vec<Project> {
    projects
        .into_iter()
        .filter(|project| match project.validate() {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Skipping invalid item from {}: {}", context, e);
                false
            }
        })
        .collect()
}
