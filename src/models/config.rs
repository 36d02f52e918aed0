//! Application configuration structures.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{AppError, Result};

/// Largest page GitHub list endpoints accept.
pub const GITHUB_MAX_PER_PAGE: usize = 100;

/// Largest `limit` the HuggingFace list endpoints accept.
pub const HUGGINGFACE_MAX_LIMIT: usize = 500;

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Output locations
    #[serde(default)]
    pub paths: PathsConfig,

    /// HTTP client settings
    #[serde(default)]
    pub http: HttpConfig,

    /// GitHub endpoint settings
    #[serde(default)]
    pub github: GitHubConfig,

    /// HuggingFace endpoint settings
    #[serde(default)]
    pub huggingface: HuggingFaceConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.http.user_agent.trim().is_empty() {
            return Err(AppError::validation("http.user_agent is empty"));
        }
        if self.http.timeout_secs == 0 {
            return Err(AppError::validation("http.timeout_secs must be > 0"));
        }
        if !(1..=GITHUB_MAX_PER_PAGE).contains(&self.github.per_page) {
            return Err(AppError::validation(format!(
                "github.per_page must be between 1 and {GITHUB_MAX_PER_PAGE}"
            )));
        }
        if !(1..=HUGGINGFACE_MAX_LIMIT).contains(&self.huggingface.page_limit) {
            return Err(AppError::validation(format!(
                "huggingface.page_limit must be between 1 and {HUGGINGFACE_MAX_LIMIT}"
            )));
        }
        for (key, value) in [
            ("github.api_base", &self.github.api_base),
            ("huggingface.api_base", &self.huggingface.api_base),
            ("huggingface.web_base", &self.huggingface.web_base),
        ] {
            Url::parse(value)
                .map_err(|e| AppError::validation(format!("{key} is not a valid URL: {e}")))?;
        }
        if self.paths.index_file.trim().is_empty() {
            return Err(AppError::validation("paths.index_file is empty"));
        }
        Ok(())
    }

    /// Full path of the unified snapshot.
    pub fn index_path(&self) -> PathBuf {
        Path::new(&self.paths.output_dir).join(&self.paths.index_file)
    }

    /// Directory holding the per-category exports.
    pub fn organized_path(&self) -> PathBuf {
        Path::new(&self.paths.output_dir).join(&self.paths.organized_dir)
    }
}

/// Where the index and its exports are written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    #[serde(default = "defaults::output_dir")]
    pub output_dir: String,

    /// Snapshot file name, relative to `output_dir`
    #[serde(default = "defaults::index_file")]
    pub index_file: String,

    /// Export directory name, relative to `output_dir`
    #[serde(default = "defaults::organized_dir")]
    pub organized_dir: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            output_dir: defaults::output_dir(),
            index_file: defaults::index_file(),
            organized_dir: defaults::organized_dir(),
        }
    }
}

/// HTTP client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
        }
    }
}

/// GitHub API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubConfig {
    #[serde(default = "defaults::github_api_base")]
    pub api_base: String,

    /// Account to index; the token's owner when unset
    #[serde(default)]
    pub username: Option<String>,

    #[serde(default = "defaults::github_per_page")]
    pub per_page: usize,

    /// Log the remaining API quota after fetching
    #[serde(default = "defaults::enabled")]
    pub check_rate_limit: bool,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_base: defaults::github_api_base(),
            username: None,
            per_page: defaults::github_per_page(),
            check_rate_limit: true,
        }
    }
}

/// HuggingFace Hub settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HuggingFaceConfig {
    #[serde(default = "defaults::huggingface_api_base")]
    pub api_base: String,

    /// Base for project links
    #[serde(default = "defaults::huggingface_web_base")]
    pub web_base: String,

    /// Account to index; the token's owner when unset
    #[serde(default)]
    pub username: Option<String>,

    #[serde(default = "defaults::huggingface_page_limit")]
    pub page_limit: usize,
}

impl Default for HuggingFaceConfig {
    fn default() -> Self {
        Self {
            api_base: defaults::huggingface_api_base(),
            web_base: defaults::huggingface_web_base(),
            username: None,
            page_limit: defaults::huggingface_page_limit(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset
    #[serde(default = "defaults::log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::log_level(),
        }
    }
}

mod defaults {
    pub fn output_dir() -> String {
        "data".into()
    }
    pub fn index_file() -> String {
        "project_index.json".into()
    }
    pub fn organized_dir() -> String {
        "organized".into()
    }

    pub fn user_agent() -> String {
        concat!("project-indexer/", env!("CARGO_PKG_VERSION")).into()
    }
    pub fn timeout() -> u64 {
        30
    }

    pub fn github_api_base() -> String {
        "https://api.github.com".into()
    }
    pub fn github_per_page() -> usize {
        super::GITHUB_MAX_PER_PAGE
    }

    pub fn huggingface_api_base() -> String {
        "https://huggingface.co/api".into()
    }
    pub fn huggingface_web_base() -> String {
        "https://huggingface.co".into()
    }
    pub fn huggingface_page_limit() -> usize {
        super::HUGGINGFACE_MAX_LIMIT
    }

    pub fn enabled() -> bool {
        true
    }
    pub fn log_level() -> String {
        "info".into()
    }
}
