// src/models/mod.rs

//! Domain models for the indexer.
//!
//! This module contains the data structures shared by the fetchers, the
//! index store and the storage layer.

mod config;
mod credentials;
mod project;

// Re-export all public types
pub use config::{
    Config, GITHUB_MAX_PER_PAGE, GitHubConfig, HUGGINGFACE_MAX_LIMIT, HttpConfig,
    HuggingFaceConfig, LoggingConfig, PathsConfig,
};
pub use credentials::Credentials;
pub use project::{Project, ProjectKey, ProjectKind, Source, parse_timestamp, short_name};
