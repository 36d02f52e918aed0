// src/pipeline/indexer.rs

//! Indexing run: fetch every platform, merge, persist.

use chrono::{DateTime, Utc};

use crate::error::{AppError, Result};
use crate::models::{Config, Credentials, ProjectKind, Source};
use crate::pipeline::{MergeStats, ProjectIndex};
use crate::services::{
    GitHubIndexer, HuggingFaceIndexer, ProjectSource, RateLimitInfo, category_label,
};
use crate::storage::IndexStorage;

/// Outcome of one indexing run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub added: usize,
    pub updated: usize,
    /// Categories that contributed nothing because of an error
    pub failed_categories: Vec<(Source, ProjectKind)>,
    /// Platforms whose account could not be resolved
    pub failed_sources: Vec<Source>,
    /// Quota reported by each platform at the end of its fetches
    pub rate_limits: Vec<(Source, RateLimitInfo)>,
    pub total_projects: usize,
    pub snapshot_location: String,
    pub export_count: usize,
}

/// Construct one indexer per platform that has a token.
///
/// Returns `FatalConfig` when no platform can be initialized.
pub fn build_sources(
    config: &Config,
    credentials: &Credentials,
) -> Result<Vec<Box<dyn ProjectSource>>> {
    let mut sources: Vec<Box<dyn ProjectSource>> = Vec::new();

    match GitHubIndexer::new(config, credentials.github_token.as_deref()) {
        Ok(indexer) => {
            log::info!("GitHub indexer initialized");
            sources.push(Box::new(indexer));
        }
        Err(e) => log::warn!("GitHub indexer not initialized: {}", e),
    }

    match HuggingFaceIndexer::new(config, credentials.huggingface_token.as_deref()) {
        Ok(indexer) => {
            log::info!("HuggingFace indexer initialized");
            sources.push(Box::new(indexer));
        }
        Err(e) => log::warn!("HuggingFace indexer not initialized: {}", e),
    }

    if sources.is_empty() {
        return Err(AppError::FatalConfig(
            "no platform indexer could be initialized; set GITHUB_API_KEY or HF_CLI".into(),
        ));
    }
    Ok(sources)
}

/// Fetch every category of one source into the index.
///
/// Failures are logged and recorded, never propagated. The quota is checked
/// even when the account lookup fails.
async fn index_source(
    source: &dyn ProjectSource,
    index: &mut ProjectIndex,
    summary: &mut RunSummary,
) -> MergeStats {
    let platform = source.source();

    let stats = match source.resolve_account().await {
        Ok(account) => fetch_categories(source, &account, index, summary).await,
        Err(e) => {
            log::error!("Skipping {}: could not resolve account: {}", platform, e);
            summary.failed_sources.push(platform);
            MergeStats::default()
        }
    };

    match source.rate_limit().await {
        Ok(Some(rate)) => {
            log::info!(
                "{} rate limit: {}/{} remaining",
                platform,
                rate.remaining,
                rate.limit
            );
            summary.rate_limits.push((platform, rate));
        }
        Ok(None) => {}
        Err(e) => log::warn!("Could not check {} rate limit: {}", platform, e),
    }

    stats
}

async fn fetch_categories(
    source: &dyn ProjectSource,
    account: &str,
    index: &mut ProjectIndex,
    summary: &mut RunSummary,
) -> MergeStats {
    let platform = source.source();
    let mut stats = MergeStats::default();
    log::info!("Indexing {} projects for {}", platform, account);

    for &kind in source.categories() {
        let label = category_label(platform, kind);
        match source.list_category(account, kind).await {
            Ok(projects) => {
                let merged = index.merge_many(projects);
                log::info!("{}: {}", label, merged);
                stats.absorb(merged);
            }
            Err(e) => {
                log::error!("Failed to fetch {}: {}", label, e);
                summary.failed_categories.push((platform, kind));
            }
        }
    }

    stats
}

/// Run one indexing pass over `sources` and persist the result.
pub async fn run_indexer(
    storage: &dyn IndexStorage,
    sources: &[Box<dyn ProjectSource>],
) -> Result<RunSummary> {
    if sources.is_empty() {
        return Err(AppError::FatalConfig("no platform indexers configured".into()));
    }

    let start_time = Utc::now();
    log::info!("Starting project indexing...");

    let mut index = storage.load_or_empty().await;
    let mut summary = RunSummary {
        start_time,
        end_time: start_time,
        added: 0,
        updated: 0,
        failed_categories: Vec::new(),
        failed_sources: Vec::new(),
        rate_limits: Vec::new(),
        total_projects: 0,
        snapshot_location: storage.snapshot_location(),
        export_count: 0,
    };

    let mut totals = MergeStats::default();
    for source in sources {
        let stats = index_source(source.as_ref(), &mut index, &mut summary).await;
        totals.absorb(stats);
    }

    index.sort_by_created(true);
    index.recompute_metadata();

    storage.save_index(&index).await?;
    let exports = storage.write_organized(&index).await?;

    summary.added = totals.added;
    summary.updated = totals.updated;
    summary.total_projects = index.len();
    summary.export_count = exports.files.len();
    summary.end_time = Utc::now();

    log::info!(
        "Indexing complete: {} projects ({}), {} records in {} export files",
        summary.total_projects,
        totals,
        exports.project_count,
        summary.export_count
    );
    if !summary.failed_categories.is_empty() || !summary.failed_sources.is_empty() {
        log::warn!(
            "{} categories and {} platforms failed this run",
            summary.failed_categories.len(),
            summary.failed_sources.len()
        );
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Project;
    use crate::storage::LocalStorage;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use tempfile::TempDir;

    /// Scripted source: each category either yields projects or fails.
    struct FakeSource {
        source: Source,
        categories: &'static [ProjectKind],
        account: std::result::Result<String, String>,
        results: HashMap<ProjectKind, std::result::Result<Vec<Project>, String>>,
        remaining: Option<u64>,
    }

    #[async_trait]
    impl ProjectSource for FakeSource {
        fn source(&self) -> Source {
            self.source
        }

        fn categories(&self) -> &'static [ProjectKind] {
            self.categories
        }

        async fn resolve_account(&self) -> Result<String> {
            self.account
                .clone()
                .map_err(|m| AppError::auth(self.source.as_str(), m))
        }

        async fn list_category(&self, _account: &str, kind: ProjectKind) -> Result<Vec<Project>> {
            match self.results.get(&kind) {
                Some(Ok(projects)) => Ok(projects.clone()),
                Some(Err(message)) => Err(AppError::transport(
                    category_label(self.source, kind),
                    message,
                )),
                None => Ok(Vec::new()),
            }
        }

        async fn rate_limit(&self) -> Result<Option<RateLimitInfo>> {
            Ok(self.remaining.map(|remaining| RateLimitInfo {
                limit: 5000,
                remaining,
                reset_at: None,
            }))
        }
    }

    fn project(source: Source, kind: ProjectKind, full_name: &str) -> Project {
        Project {
            source,
            kind,
            name: full_name.to_string(),
            full_name: full_name.to_string(),
            description: None,
            url: format!("https://example.com/{full_name}"),
            created_at: None,
            updated_at: None,
            primary_language: None,
            topics: Vec::new(),
        }
    }

    fn github_ok() -> FakeSource {
        FakeSource {
            source: Source::GitHub,
            categories: &[ProjectKind::Repository, ProjectKind::Gist],
            account: Ok("octocat".into()),
            results: HashMap::from([
                (
                    ProjectKind::Repository,
                    Ok(vec![project(Source::GitHub, ProjectKind::Repository, "octocat/hello")]),
                ),
                (
                    ProjectKind::Gist,
                    Ok(vec![project(Source::GitHub, ProjectKind::Gist, "octocat/gist:1")]),
                ),
            ]),
            remaining: Some(4990),
        }
    }

    fn huggingface_down() -> FakeSource {
        let down = || Err("HTTP 503".to_string());
        FakeSource {
            source: Source::HuggingFace,
            categories: &[ProjectKind::Model, ProjectKind::Dataset, ProjectKind::Space],
            account: Ok("someone".into()),
            results: HashMap::from([
                (ProjectKind::Model, down()),
                (ProjectKind::Dataset, down()),
                (ProjectKind::Space, down()),
            ]),
            remaining: None,
        }
    }

    #[tokio::test]
    async fn test_partial_failure_still_persists() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());
        let sources: Vec<Box<dyn ProjectSource>> =
            vec![Box::new(github_ok()), Box::new(huggingface_down())];

        let summary = run_indexer(&storage, &sources).await.unwrap();
        assert_eq!(summary.added, 2);
        assert_eq!(summary.updated, 0);
        assert_eq!(summary.total_projects, 2);
        assert_eq!(summary.failed_categories.len(), 3);
        assert_eq!(summary.export_count, 2);

        let index = storage.load_index().await.unwrap().unwrap();
        assert_eq!(index.len(), 2);
        assert_eq!(index.metadata().total_projects, 2);
        assert_eq!(index.metadata().sources["GitHub"], 2);
        assert_eq!(index.metadata().sources["HuggingFace"], 0);
    }

    #[tokio::test]
    async fn test_second_run_updates_instead_of_adding() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());
        let sources: Vec<Box<dyn ProjectSource>> = vec![Box::new(github_ok())];

        run_indexer(&storage, &sources).await.unwrap();
        let summary = run_indexer(&storage, &sources).await.unwrap();

        assert_eq!(summary.added, 0);
        assert_eq!(summary.updated, 2);
        assert_eq!(summary.total_projects, 2);
    }

    #[tokio::test]
    async fn test_failed_category_keeps_prior_records() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());

        let first: Vec<Box<dyn ProjectSource>> = vec![Box::new(github_ok())];
        run_indexer(&storage, &first).await.unwrap();

        let mut gists_down = github_ok();
        gists_down
            .results
            .insert(ProjectKind::Gist, Err("HTTP 502".into()));
        let second: Vec<Box<dyn ProjectSource>> = vec![Box::new(gists_down)];
        let summary = run_indexer(&storage, &second).await.unwrap();

        assert_eq!(summary.failed_categories, vec![(Source::GitHub, ProjectKind::Gist)]);
        assert_eq!(summary.added, 0);
        assert_eq!(summary.updated, 1);
        assert_eq!(summary.total_projects, 2);

        let index = storage.load_index().await.unwrap().unwrap();
        let gist = project(Source::GitHub, ProjectKind::Gist, "octocat/gist:1");
        assert_eq!(index.find(&gist), Some(&gist));
        assert!(storage.organized_path().join("github_gists.json").exists());
    }

    #[tokio::test]
    async fn test_rate_limit_checked_when_account_fails() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());
        let mut rejected = github_ok();
        rejected.account = Err("bad credentials".into());
        rejected.remaining = Some(0);
        let sources: Vec<Box<dyn ProjectSource>> = vec![Box::new(rejected)];

        let summary = run_indexer(&storage, &sources).await.unwrap();
        assert_eq!(summary.failed_sources, vec![Source::GitHub]);
        assert_eq!(summary.rate_limits.len(), 1);
        assert_eq!(summary.rate_limits[0].0, Source::GitHub);
        assert_eq!(summary.rate_limits[0].1.remaining, 0);
    }

    #[tokio::test]
    async fn test_unresolved_account_contributes_nothing() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());
        let mut broken = huggingface_down();
        broken.account = Err("token rejected".into());
        let sources: Vec<Box<dyn ProjectSource>> = vec![Box::new(github_ok()), Box::new(broken)];

        let summary = run_indexer(&storage, &sources).await.unwrap();
        assert_eq!(summary.failed_sources, vec![Source::HuggingFace]);
        assert!(summary.failed_categories.is_empty());
        assert_eq!(summary.total_projects, 2);
    }

    #[tokio::test]
    async fn test_no_sources_is_fatal_and_writes_nothing() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());

        let err = run_indexer(&storage, &[]).await.err().unwrap();
        assert!(matches!(err, AppError::FatalConfig(_)));
        assert!(!storage.index_path().exists());
    }

    #[test]
    fn test_build_sources_without_tokens_is_fatal() {
        let err = build_sources(&Config::default(), &Credentials::default())
            .err()
            .unwrap();
        assert!(matches!(err, AppError::FatalConfig(_)));
    }

    #[test]
    fn test_build_sources_with_one_token() {
        let credentials = Credentials {
            github_token: None,
            huggingface_token: Some("hf_test".into()),
        };
        let sources = build_sources(&Config::default(), &credentials).unwrap();
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].source(), Source::HuggingFace);
    }
}
