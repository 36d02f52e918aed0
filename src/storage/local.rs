//! Local filesystem storage implementation.
//!
//! ## Storage Layout
//!
//! ```text
//! {root}/
//! ├── {index_file}            # Unified snapshot
//! └── {organized_dir}/
//!     └── {source}_{kinds}.json
//! ```
//!
//! Every write goes to a `.tmp` sibling first and is renamed into place, so
//! an interrupted run leaves the previous file intact.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Serialize;
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::{Config, ProjectKind, Source};
use crate::pipeline::{IndexSnapshot, ProjectIndex};
use crate::storage::{ExportMetadata, IndexStorage, export_file_name};

const DEFAULT_INDEX_FILE: &str = "project_index.json";
const DEFAULT_ORGANIZED_DIR: &str = "organized";

/// Local filesystem storage backend.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root_dir: PathBuf,
    index_file: String,
    organized_dir: String,
}

impl LocalStorage {
    /// Create a new LocalStorage rooted at the given directory.
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
            index_file: DEFAULT_INDEX_FILE.to_string(),
            organized_dir: DEFAULT_ORGANIZED_DIR.to_string(),
        }
    }

    /// Create a LocalStorage laid out per the `[paths]` configuration.
    pub fn from_config(config: &Config) -> Self {
        Self {
            root_dir: PathBuf::from(&config.paths.output_dir),
            index_file: config.paths.index_file.clone(),
            organized_dir: config.paths.organized_dir.clone(),
        }
    }

    /// Full path of the snapshot file.
    pub fn index_path(&self) -> PathBuf {
        self.path(&self.index_file)
    }

    /// Full path of the exports directory.
    pub fn organized_path(&self) -> PathBuf {
        self.path(&self.organized_dir)
    }

    /// Get the full path for a relative key.
    fn path(&self, key: &str) -> PathBuf {
        self.root_dir.join(key)
    }

    /// Relative key of the export for one (source, kind) pair.
    fn export_key(&self, source: Source, kind: ProjectKind) -> String {
        format!("{}/{}", self.organized_dir, export_file_name(source, kind))
    }

    /// Ensure parent directory exists.
    async fn ensure_dir(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, key: &str, bytes: &[u8]) -> Result<()> {
        let path = self.path(key);
        self.ensure_dir(&path).await?;

        let tmp = path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    /// Write JSON data.
    async fn write_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(value)?;
        self.write_bytes(key, &bytes).await
    }

    /// Read bytes, returning None if file doesn't exist.
    async fn read_bytes(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path(key);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Io(e)),
        }
    }
}

#[async_trait]
impl IndexStorage for LocalStorage {
    fn snapshot_location(&self) -> String {
        self.index_path().display().to_string()
    }

    async fn load_index(&self) -> Result<Option<ProjectIndex>> {
        let bytes = match self.read_bytes(&self.index_file).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return Ok(None),
            Err(e) => return Err(AppError::snapshot_load(self.snapshot_location(), e)),
        };

        let snapshot: IndexSnapshot = serde_json::from_slice(&bytes)
            .map_err(|e| AppError::snapshot_load(self.snapshot_location(), e))?;
        Ok(Some(ProjectIndex::from_snapshot(snapshot)))
    }

    async fn save_index(&self, index: &ProjectIndex) -> Result<()> {
        let json = index.to_json()?;
        self.write_bytes(&self.index_file, json.as_bytes()).await?;
        log::info!(
            "Saved {} projects to {}",
            index.len(),
            self.snapshot_location()
        );
        Ok(())
    }

    async fn write_organized(&self, index: &ProjectIndex) -> Result<ExportMetadata> {
        let mut files = Vec::new();
        let mut project_count = 0;

        for source in Source::ALL {
            for kind in ProjectKind::ALL {
                let projects = index.filter_by(source, kind);
                if projects.is_empty() {
                    continue;
                }

                let key = self.export_key(source, kind);
                self.write_json(&key, &projects).await?;
                log::info!("Saved {} {} {} to {}", projects.len(), source, kind.plural(), key);

                project_count += projects.len();
                files.push(key);
            }
        }

        Ok(ExportMetadata {
            files,
            project_count,
        })
    }
}
