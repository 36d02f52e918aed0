// src/services/huggingface.rs

//! HuggingFace Hub fetcher for public models, datasets and spaces.

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderMap};
use serde::Deserialize;
use serde_json::Value;

use crate::error::{AppError, Result};
use crate::models::{
    Config, HuggingFaceConfig, Project, ProjectKind, Source, parse_timestamp, short_name,
};
use crate::services::paging::PaginatedFetchConfig;
use crate::services::{ProjectSource, category_label, retain_valid, unsupported_category};
use crate::utils::{ApiClient, auth_header, create_async_client};

const CATEGORIES: &[ProjectKind] = &[ProjectKind::Model, ProjectKind::Dataset, ProjectKind::Space];

/// Entry of the `/models`, `/datasets` and `/spaces` listings.
#[derive(Debug, Clone, Deserialize)]
pub struct HfRepoInfo {
    /// `author/name`
    pub id: String,
    #[serde(rename = "cardData", default)]
    pub card_data: Option<Value>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "createdAt", default)]
    pub created_at: Option<String>,
    #[serde(rename = "lastModified", default)]
    pub last_modified: Option<String>,
    #[serde(default)]
    pub pipeline_tag: Option<String>,
    #[serde(default)]
    pub sdk: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub private: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct WhoAmI {
    name: String,
}

/// List endpoint for a category.
fn listing_path(kind: ProjectKind) -> Option<&'static str> {
    match kind {
        ProjectKind::Model => Some("/models"),
        ProjectKind::Dataset => Some("/datasets"),
        ProjectKind::Space => Some("/spaces"),
        _ => None,
    }
}

/// Lenient timestamp parsing; the Hub omits or varies these fields.
fn optional_timestamp(raw: Option<&str>) -> Option<chrono::DateTime<chrono::Utc>> {
    raw.filter(|s| !s.is_empty())
        .and_then(|s| parse_timestamp(s).ok())
}

/// Convert a Hub listing entry into a project of the given kind.
pub fn to_project(info: &HfRepoInfo, kind: ProjectKind, web_base: &str) -> Project {
    let web_base = web_base.trim_end_matches('/');
    let url = match kind {
        ProjectKind::Dataset => format!("{}/datasets/{}", web_base, info.id),
        ProjectKind::Space => format!("{}/spaces/{}", web_base, info.id),
        _ => format!("{}/{}", web_base, info.id),
    };

    let description = info
        .card_data
        .as_ref()
        .and_then(|card| card.get("description"))
        .and_then(Value::as_str)
        .filter(|d| !d.is_empty())
        .map(String::from)
        .or_else(|| info.description.clone().filter(|d| !d.is_empty()));

    // Language slot carries the pipeline tag for models and the SDK for spaces
    let primary_language = match kind {
        ProjectKind::Model => info.pipeline_tag.clone(),
        ProjectKind::Space => info.sdk.clone(),
        _ => None,
    };

    Project {
        source: Source::HuggingFace,
        kind,
        name: short_name(&info.id).to_string(),
        full_name: info.id.clone(),
        description,
        url,
        created_at: optional_timestamp(info.created_at.as_deref()),
        updated_at: optional_timestamp(info.last_modified.as_deref()),
        primary_language,
        topics: info.tags.clone().unwrap_or_default(),
    }
}

/// Fetches public models, datasets and spaces from the HuggingFace Hub API.
pub struct HuggingFaceIndexer {
    api: ApiClient,
    config: HuggingFaceConfig,
}

impl HuggingFaceIndexer {
    /// Create an indexer; fails with `Auth` when no token is available.
    pub fn new(config: &Config, token: Option<&str>) -> Result<Self> {
        let token = token
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                AppError::auth(Source::HuggingFace.as_str(), "API token not provided")
            })?;

        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            auth_header(Source::HuggingFace, format!("Bearer {token}"))?,
        );

        let client = create_async_client(&config.http, headers)?;
        Ok(Self {
            api: ApiClient::new(client, &config.huggingface.api_base, Source::HuggingFace)?,
            config: config.huggingface.clone(),
        })
    }

    /// Name of the token's owner.
    pub async fn authenticated_user(&self) -> Result<String> {
        let whoami: WhoAmI = self
            .api
            .get_json("/whoami-v2", &[], "HuggingFace whoami")
            .await?;
        Ok(whoami.name)
    }

    /// All public resources of one kind published by `author`.
    pub async fn fetch_public(&self, author: &str, kind: ProjectKind) -> Result<Vec<Project>> {
        let path = listing_path(kind).ok_or_else(|| unsupported_category(Source::HuggingFace, kind))?;
        let context = category_label(Source::HuggingFace, kind);
        log::info!("Fetching public {} for {}", kind.plural(), author);

        let fetch = PaginatedFetchConfig::offset(
            context.clone(),
            path,
            self.config.page_limit,
            vec![("author", author.to_string()), ("full", "true".into())],
        );
        let result = self.api.fetch_pages::<HfRepoInfo>(&fetch).await?;

        let projects: Vec<Project> = result
            .items
            .iter()
            .filter(|info| {
                let private = info.private.unwrap_or(false);
                if private {
                    log::debug!("Skipping private {} {}", kind, info.id);
                }
                !private
            })
            .map(|info| to_project(info, kind, &self.config.web_base))
            .collect();

        let projects = retain_valid(projects, &context);
        log::info!(
            "Total public {} fetched: {} ({} pages)",
            kind.plural(),
            projects.len(),
            result.pages_fetched
        );
        Ok(projects)
    }
}

#[async_trait]
impl ProjectSource for HuggingFaceIndexer {
    fn source(&self) -> Source {
        Source::HuggingFace
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
        self.fetch_public(account, kind).await
    }
}
