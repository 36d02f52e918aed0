// src/services/github.rs

//! GitHub fetcher for public repositories and gists.

use async_trait::async_trait;
use chrono::DateTime;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::{AppError, Result};
use crate::models::{Config, GitHubConfig, Project, ProjectKind, Source, parse_timestamp};
use crate::services::paging::PaginatedFetchConfig;
use crate::services::{
    ProjectSource, RateLimitInfo, category_label, retain_valid, unsupported_category,
};
use crate::utils::{ApiClient, auth_header, create_async_client};

const CATEGORIES: &[ProjectKind] = &[ProjectKind::Repository, ProjectKind::Gist];

/// Repository as returned by `/users/{user}/repos`.
#[derive(Debug, Clone, Deserialize)]
pub struct GitHubRepo {
    pub name: String,
    pub full_name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub html_url: String,
    pub created_at: String,
    pub updated_at: String,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub topics: Option<Vec<String>>,
    #[serde(default)]
    pub private: bool,
}

/// Gist as returned by `/users/{user}/gists`.
#[derive(Debug, Clone, Deserialize)]
pub struct GitHubGist {
    pub id: String,
    #[serde(default)]
    pub description: Option<String>,
    pub html_url: String,
    pub created_at: String,
    pub updated_at: String,
    #[serde(default)]
    pub public: Option<bool>,
    /// File name -> file info, in API order
    #[serde(default)]
    pub files: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct GitHubUser {
    login: String,
}

#[derive(Debug, Deserialize)]
struct RateLimitResponse {
    rate: RateLimitResource,
}

#[derive(Debug, Deserialize)]
struct RateLimitResource {
    limit: u64,
    remaining: u64,
    #[serde(default)]
    reset: Option<i64>,
}

fn timestamp(raw: &str, context: &str) -> Result<chrono::DateTime<chrono::Utc>> {
    parse_timestamp(raw).map_err(|e| AppError::malformed(context, e))
}

/// Convert a GitHub repository into a project.
pub fn repo_to_project(repo: &GitHubRepo) -> Result<Project> {
    let context = category_label(Source::GitHub, ProjectKind::Repository);
    Ok(Project {
        source: Source::GitHub,
        kind: ProjectKind::Repository,
        name: repo.name.clone(),
        full_name: repo.full_name.clone(),
        description: repo.description.clone(),
        url: repo.html_url.clone(),
        created_at: Some(timestamp(&repo.created_at, &context)?),
        updated_at: Some(timestamp(&repo.updated_at, &context)?),
        primary_language: repo.language.clone(),
        topics: repo.topics.clone().unwrap_or_default(),
    })
}

/// Convert a GitHub gist owned by `owner` into a project.
///
/// Gists have no name or topics; the id doubles as the name and a missing
/// description is synthesized from the first file.
pub fn gist_to_project(gist: &GitHubGist, owner: &str) -> Result<Project> {
    let context = category_label(Source::GitHub, ProjectKind::Gist);
    let first_file = gist.files.iter().next();

    let description = gist
        .description
        .clone()
        .filter(|d| !d.is_empty())
        .or_else(|| first_file.map(|(file_name, _)| format!("Gist containing {file_name}")));

    let language = first_file
        .and_then(|(_, info)| info.get("language"))
        .and_then(Value::as_str)
        .map(String::from);

    Ok(Project {
        source: Source::GitHub,
        kind: ProjectKind::Gist,
        name: gist.id.clone(),
        full_name: format!("{}/gist:{}", owner, gist.id),
        description,
        url: gist.html_url.clone(),
        created_at: Some(timestamp(&gist.created_at, &context)?),
        updated_at: Some(timestamp(&gist.updated_at, &context)?),
        primary_language: language,
        topics: Vec::new(),
    })
}

/// Fetches public repositories and gists from the GitHub REST API.
pub struct GitHubIndexer {
    api: ApiClient,
    config: GitHubConfig,
}

impl GitHubIndexer {
    /// Create an indexer; fails with `Auth` when no token is available.
    pub fn new(config: &Config, token: Option<&str>) -> Result<Self> {
        let token = token
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::auth(Source::GitHub.as_str(), "API token not provided"))?;

        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            auth_header(Source::GitHub, format!("token {token}"))?,
        );
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github.v3+json"),
        );

        let client = create_async_client(&config.http, headers)?;
        Ok(Self {
            api: ApiClient::new(client, &config.github.api_base, Source::GitHub)?,
            config: config.github.clone(),
        })
    }

    /// Login of the token's owner.
    pub async fn authenticated_user(&self) -> Result<String> {
        let user: GitHubUser = self.api.get_json("/user", &[], "GitHub user").await?;
        Ok(user.login)
    }

    /// All public repositories of `username`.
    pub async fn fetch_public_repos(&self, username: &str) -> Result<Vec<Project>> {
        let context = category_label(Source::GitHub, ProjectKind::Repository);
        log::info!("Fetching public repositories for {}", username);

        let fetch = PaginatedFetchConfig::numbered(
            context.clone(),
            format!("/users/{username}/repos"),
            self.config.per_page,
            vec![("type", "public".into()), ("sort", "updated".into())],
        );
        let result = self.api.fetch_pages::<GitHubRepo>(&fetch).await?;

        let mut projects = Vec::with_capacity(result.items.len());
        for repo in &result.items {
            // The endpoint is public-only, but check anyway
            if repo.private {
                log::debug!("Skipping private repository {}", repo.full_name);
                continue;
            }
            projects.push(repo_to_project(repo)?);
        }

        let projects = retain_valid(projects, &context);
        log::info!(
            "Total public repositories fetched: {} ({} pages)",
            projects.len(),
            result.pages_fetched
        );
        Ok(projects)
    }

    /// All public gists of `username`.
    pub async fn fetch_public_gists(&self, username: &str) -> Result<Vec<Project>> {
        let context = category_label(Source::GitHub, ProjectKind::Gist);
        log::info!("Fetching public gists for {}", username);

        let fetch = PaginatedFetchConfig::numbered(
            context.clone(),
            format!("/users/{username}/gists"),
            self.config.per_page,
            Vec::new(),
        );
        let result = self.api.fetch_pages::<GitHubGist>(&fetch).await?;

        let mut projects = Vec::with_capacity(result.items.len());
        for gist in &result.items {
            if gist.public == Some(false) {
                log::debug!("Skipping secret gist {}", gist.id);
                continue;
            }
            projects.push(gist_to_project(gist, username)?);
        }

        let projects = retain_valid(projects, &context);
        log::info!(
            "Total public gists fetched: {} ({} pages)",
            projects.len(),
            result.pages_fetched
        );
        Ok(projects)
    }

    /// Current core API quota.
    pub async fn check_rate_limit(&self) -> Result<RateLimitInfo> {
        let response: RateLimitResponse = self
            .api
            .get_json("/rate_limit", &[], "GitHub rate limit")
            .await?;
        Ok(RateLimitInfo {
            limit: response.rate.limit,
            remaining: response.rate.remaining,
            reset_at: response
                .rate
                .reset
                .and_then(|secs| DateTime::from_timestamp(secs, 0)),
        })
    }
}

#[async_trait]
impl ProjectSource for GitHubIndexer {
    fn source(&self) -> Source {
        Source::GitHub
    }

    fn categories(&self) -> &'static [ProjectKind] {
        CATEGORIES
    }

    async fn resolve_account(&self) -> Result<String> {
        match &self.config.username {
            Some(username) if !username.trim().is_empty() => Ok(username.trim().to_string()),
            _ => self.authenticated_user().await,
        }
    }

    async fn list_category(&self, account: &str, kind: ProjectKind) -> Result<Vec<Project>> {
        match kind {
            ProjectKind::Repository => self.fetch_public_repos(account).await,
            ProjectKind::Gist => self.fetch_public_gists(account).await,
            other => Err(unsupported_category(Source::GitHub, other)),
        }
    }

    async fn rate_limit(&self) -> Result<Option<RateLimitInfo>> {
        if !self.config.check_rate_limit {
            return Ok(None);
        }
        self.check_rate_limit().await.map(Some)
    }
}
