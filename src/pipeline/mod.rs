//! Pipeline entry points.
//!
//! - `index`: the in-memory project index and its snapshot format
//! - `run_indexer`: fetch every configured platform and persist the result

pub mod index;
pub mod indexer;

pub use index::{
    INDEX_VERSION, IndexMetadata, IndexSnapshot, MergeOutcome, MergeStats, ProjectIndex,
};
pub use indexer::{RunSummary, build_sources, run_indexer};
