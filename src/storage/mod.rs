//! Storage abstractions for the project index.
//!
//! A run reads the previous snapshot once, then writes the new snapshot and
//! one export file per non-empty (source, kind) pair.
//!
//! ## Directory Structure
//!
//! ```text
//! data/
//! ├── project_index.json              # Unified snapshot
//! └── organized/                      # Per-category exports
//!     ├── github_repositories.json
//!     ├── github_gists.json
//!     └── huggingface_models.json
//! ```

pub mod local;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{ProjectKind, Source};
use crate::pipeline::ProjectIndex;

pub use local::LocalStorage;

/// Metadata about an export write operation.
#[derive(Debug, Clone)]
pub struct ExportMetadata {
    /// Export files written, relative to the storage root
    pub files: Vec<String>,
    /// Records written across all files
    pub project_count: usize,
}

/// File name of the export for one (source, kind) pair.
pub fn export_file_name(source: Source, kind: ProjectKind) -> String {
    format!("{}_{}.json", source.slug(), kind.plural())
}

/// Trait for index storage backends.
#[async_trait]
pub trait IndexStorage: Send + Sync {
    /// Human-readable location of the snapshot.
    fn snapshot_location(&self) -> String;

    /// Load the previous snapshot.
    ///
    /// `Ok(None)` when there is none; `SnapshotLoad` when it cannot be parsed.
    async fn load_index(&self) -> Result<Option<ProjectIndex>>;

    /// Load the previous snapshot, starting empty when it is missing or unreadable.
    async fn load_or_empty(&self) -> ProjectIndex {
        match self.load_index().await {
            Ok(Some(index)) => {
                log::info!(
                    "Loaded {} projects from {}",
                    index.len(),
                    self.snapshot_location()
                );
                index
            }
            Ok(None) => {
                log::info!(
                    "No existing index at {}, starting fresh",
                    self.snapshot_location()
                );
                ProjectIndex::new()
            }
            Err(e) => {
                log::warn!("{}. Starting with an empty index.", e);
                ProjectIndex::new()
            }
        }
    }

    /// Persist the unified snapshot.
    async fn save_index(&self, index: &ProjectIndex) -> Result<()>;

    /// Write one JSON array per non-empty (source, kind) pair.
    async fn write_organized(&self, index: &ProjectIndex) -> Result<ExportMetadata>;
}
