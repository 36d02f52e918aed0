//! Integration tests for GitHubIndexer using wiremock
//!
//! These tests validate pagination, filtering and error mapping against a
//! mock GitHub API.

use project_indexer::error::AppError;
use project_indexer::models::{Config, ProjectKind};
use project_indexer::services::{GitHubIndexer, ProjectSource};
use serde_json::{Value, json};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(server: &MockServer) -> Config {
    let mut config = Config::default();
    config.github.api_base = server.uri();
    config
}

fn repo(n: usize) -> Value {
    json!({
        "name": format!("repo-{n}"),
        "full_name": format!("octocat/repo-{n}"),
        "description": null,
        "html_url": format!("https://github.com/octocat/repo-{n}"),
        "created_at": "2021-03-04T05:06:07Z",
        "updated_at": "2024-01-01T00:00:00Z",
        "language": "Rust",
        "topics": ["cli"],
        "private": false
    })
}

fn repos(range: std::ops::Range<usize>) -> Value {
    Value::Array(range.map(repo).collect())
}

/// Pages of 100, 100 and 37 stop after the short page
#[tokio::test]
async fn test_repository_pagination() {
    let mock_server = MockServer::start().await;

    for (page, items) in [("1", repos(0..100)), ("2", repos(100..200)), ("3", repos(200..237))] {
        Mock::given(method("GET"))
            .and(path("/users/octocat/repos"))
            .and(query_param("type", "public"))
            .and(query_param("per_page", "100"))
            .and(query_param("page", page))
            .respond_with(ResponseTemplate::new(200).set_body_json(items))
            .expect(1)
            .mount(&mock_server)
            .await;
    }

    let indexer = GitHubIndexer::new(&config_for(&mock_server), Some("ghp_test")).unwrap();
    let projects = indexer.fetch_public_repos("octocat").await.unwrap();

    assert_eq!(projects.len(), 237);
    assert_eq!(projects[0].full_name, "octocat/repo-0");
    assert_eq!(projects[236].full_name, "octocat/repo-236");
    assert!(projects.iter().all(|p| p.kind == ProjectKind::Repository));
}

/// Requests carry the token and the v3 media type
#[tokio::test]
async fn test_auth_headers_sent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/user"))
        .and(header("authorization", "token ghp_test"))
        .and(header("accept", "application/vnd.github.v3+json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "login": "octocat" })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let indexer = GitHubIndexer::new(&config_for(&mock_server), Some("ghp_test")).unwrap();
    assert_eq!(indexer.resolve_account().await.unwrap(), "octocat");
}

/// A rejected token surfaces as an authentication error
#[tokio::test]
async fn test_unauthorized_user_lookup() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/user"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "message": "Bad credentials" })))
        .mount(&mock_server)
        .await;

    let indexer = GitHubIndexer::new(&config_for(&mock_server), Some("expired")).unwrap();
    let err = indexer.resolve_account().await.err().unwrap();
    assert!(matches!(err, AppError::Auth { .. }), "unexpected error: {err}");
}

/// Private repositories and secret gists never reach the output
#[tokio::test]
async fn test_non_public_items_filtered() {
    let mock_server = MockServer::start().await;

    let mut private = repo(1);
    private["private"] = json!(true);
    Mock::given(method("GET"))
        .and(path("/users/octocat/repos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([repo(0), private])))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/users/octocat/gists"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": "abc",
                "description": "",
                "html_url": "https://gist.github.com/abc",
                "created_at": "2022-01-01T00:00:00Z",
                "updated_at": "2022-01-02T00:00:00Z",
                "public": true,
                "files": {
                    "notes.md": { "filename": "notes.md", "language": "Markdown" },
                    "run.sh": { "filename": "run.sh", "language": "Shell" }
                }
            },
            {
                "id": "secret",
                "description": "hidden",
                "html_url": "https://gist.github.com/secret",
                "created_at": "2022-01-01T00:00:00Z",
                "updated_at": "2022-01-02T00:00:00Z",
                "public": false,
                "files": {}
            }
        ])))
        .mount(&mock_server)
        .await;

    let indexer = GitHubIndexer::new(&config_for(&mock_server), Some("ghp_test")).unwrap();

    let repos = indexer
        .list_category("octocat", ProjectKind::Repository)
        .await
        .unwrap();
    assert_eq!(repos.len(), 1);
    assert_eq!(repos[0].full_name, "octocat/repo-0");

    let gists = indexer.list_category("octocat", ProjectKind::Gist).await.unwrap();
    assert_eq!(gists.len(), 1);
    assert_eq!(gists[0].full_name, "octocat/gist:abc");
    assert_eq!(gists[0].description.as_deref(), Some("Gist containing notes.md"));
    assert_eq!(gists[0].primary_language.as_deref(), Some("Markdown"));
}

/// Server errors become transport errors
#[tokio::test]
async fn test_server_error_is_transport() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users/octocat/gists"))
        .respond_with(ResponseTemplate::new(502))
        .expect(1)
        .mount(&mock_server)
        .await;

    let indexer = GitHubIndexer::new(&config_for(&mock_server), Some("ghp_test")).unwrap();
    let err = indexer.fetch_public_gists("octocat").await.err().unwrap();
    assert!(matches!(err, AppError::Transport { .. }), "unexpected error: {err}");
}

/// A body that is not a list is a malformed response
#[tokio::test]
async fn test_unexpected_shape_is_malformed() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users/octocat/repos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": [] })))
        .mount(&mock_server)
        .await;

    let indexer = GitHubIndexer::new(&config_for(&mock_server), Some("ghp_test")).unwrap();
    let err = indexer.fetch_public_repos("octocat").await.err().unwrap();
    assert!(matches!(err, AppError::MalformedResponse { .. }), "unexpected error: {err}");
}

#[tokio::test]
async fn test_rate_limit() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rate_limit"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "rate": { "limit": 5000, "remaining": 4990, "reset": 1700000000 }
        })))
        .mount(&mock_server)
        .await;

    let indexer = GitHubIndexer::new(&config_for(&mock_server), Some("ghp_test")).unwrap();
    let rate = indexer.rate_limit().await.unwrap().unwrap();
    assert_eq!(rate.limit, 5000);
    assert_eq!(rate.remaining, 4990);
    assert!(rate.reset_at.is_some());
}
