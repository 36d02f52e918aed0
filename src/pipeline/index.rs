// src/pipeline/index.rs

//! Unified project index with upsert semantics.
//!
//! Projects are identified by `(source, full_name)`. Merging a project whose
//! key is already present replaces the stored value in place; otherwise the
//! project is appended. A position map keeps lookups constant-time while the
//! `Vec` keeps the order that ends up in the snapshot.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::Result;
use crate::models::{Project, ProjectKey, ProjectKind, Source, parse_timestamp};

/// Snapshot format version.
pub const INDEX_VERSION: &str = "1.0";

/// Summary metadata written alongside the projects.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IndexMetadata {
    /// Regenerated on every write, so an unreadable value only falls back to now
    #[serde(default = "Utc::now", deserialize_with = "generated_at_or_now")]
    pub generated_at: DateTime<Utc>,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub total_projects: usize,
    /// Project count per source name
    #[serde(default)]
    pub sources: BTreeMap<String, usize>,
    /// Project count per kind name
    #[serde(default)]
    pub types: BTreeMap<String, usize>,
}

fn default_version() -> String {
    INDEX_VERSION.to_string()
}

fn generated_at_or_now<'de, D>(deserializer: D) -> std::result::Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Value::deserialize(deserializer)?;
    Ok(raw
        .as_str()
        .and_then(|text| parse_timestamp(text).ok())
        .unwrap_or_else(Utc::now))
}

impl Default for IndexMetadata {
    fn default() -> Self {
        Self {
            generated_at: Utc::now(),
            version: default_version(),
            total_projects: 0,
            sources: BTreeMap::new(),
            types: BTreeMap::new(),
        }
    }
}

/// On-disk form of the index.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct IndexSnapshot {
    #[serde(default)]
    pub metadata: IndexMetadata,
    #[serde(default)]
    pub projects: Vec<Project>,
}

/// What a single merge did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    Added,
    Updated,
}

/// Counts accumulated over a batch merge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    pub added: usize,
    pub updated: usize,
}

impl MergeStats {
    pub fn record(&mut self, outcome: MergeOutcome) {
        match outcome {
            MergeOutcome::Added => self.added += 1,
            MergeOutcome::Updated => self.updated += 1,
        }
    }

    pub fn absorb(&mut self, other: MergeStats) {
        self.added += other.added;
        self.updated += other.updated;
    }
}

impl fmt::Display for MergeStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} added, {} updated", self.added, self.updated)
    }
}

/// In-memory project index.
#[derive(Debug, Clone, Default)]
pub struct ProjectIndex {
    metadata: IndexMetadata,
    projects: Vec<Project>,
    positions: HashMap<ProjectKey, usize>,
}

impl ProjectIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an index from a snapshot. Duplicate keys collapse to the last one.
    pub fn from_snapshot(snapshot: IndexSnapshot) -> Self {
        let mut index = Self {
            metadata: snapshot.metadata,
            ..Self::default()
        };
        index.merge_many(snapshot.projects);
        index
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&SnapshotRef {
            metadata: &self.metadata,
            projects: &self.projects,
        })?)
    }

    /// Parse an index from JSON produced by [`ProjectIndex::to_json`].
    pub fn from_json(json: &str) -> Result<Self> {
        let snapshot: IndexSnapshot = serde_json::from_str(json)?;
        Ok(Self::from_snapshot(snapshot))
    }

    pub fn metadata(&self) -> &IndexMetadata {
        &self.metadata
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn len(&self) -> usize {
        self.projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    /// Identity key of a project.
    pub fn compute_key(project: &Project) -> ProjectKey {
        project.key()
    }

    /// Stored project with the same key, if any.
    pub fn find(&self, project: &Project) -> Option<&Project> {
        self.get(&project.key())
    }

    /// Stored project for a key, if any.
    pub fn get(&self, key: &ProjectKey) -> Option<&Project> {
        self.positions.get(key).map(|&i| &self.projects[i])
    }

    /// Insert or replace a project, keeping the position of a replaced one.
    pub fn merge_one(&mut self, project: Project) -> MergeOutcome {
        let key = Self::compute_key(&project);
        match self.positions.get(&key) {
            Some(&i) => {
                self.projects[i] = project;
                MergeOutcome::Updated
            }
            None => {
                self.positions.insert(key, self.projects.len());
                self.projects.push(project);
                MergeOutcome::Added
            }
        }
    }

    /// Merge a batch in order.
    pub fn merge_many(&mut self, projects: impl IntoIterator<Item = Project>) -> MergeStats {
        let mut stats = MergeStats::default();
        for project in projects {
            stats.record(self.merge_one(project));
        }
        stats
    }

    /// Projects from one source, in index order.
    pub fn filter_by_source(&self, source: Source) -> Vec<&Project> {
        self.projects.iter().filter(|p| p.source == source).collect()
    }

    /// Projects of one kind, in index order.
    pub fn filter_by_kind(&self, kind: ProjectKind) -> Vec<&Project> {
        self.projects.iter().filter(|p| p.kind == kind).collect()
    }

    /// Projects matching both a source and a kind, in index order.
    pub fn filter_by(&self, source: Source, kind: ProjectKind) -> Vec<&Project> {
        self.projects
            .iter()
            .filter(|p| p.source == source && p.kind == kind)
            .collect()
    }

    /// Stable sort by creation date. Missing dates count as the earliest.
    pub fn sort_by_created(&mut self, descending: bool) {
        if descending {
            self.projects.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        } else {
            self.projects.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        }
        self.rebuild_positions();
    }

    /// Refresh the metadata from the current contents.
    pub fn recompute_metadata(&mut self) {
        let mut sources: BTreeMap<String, usize> = Source::ALL
            .iter()
            .map(|s| (s.as_str().to_string(), 0))
            .collect();
        let mut types: BTreeMap<String, usize> = BTreeMap::new();

        for project in &self.projects {
            *sources.entry(project.source.as_str().to_string()).or_default() += 1;
            *types.entry(project.kind.as_str().to_string()).or_default() += 1;
        }

        self.metadata = IndexMetadata {
            generated_at: Utc::now(),
            version: default_version(),
            total_projects: self.projects.len(),
            sources,
            types,
        };
    }

    fn rebuild_positions(&mut self) {
        self.positions = self
            .projects
            .iter()
            .enumerate()
            .map(|(i, p)| (p.key(), i))
            .collect();
    }
}

/// Borrowed snapshot, serialized without cloning the projects.
#[derive(Serialize)]
struct SnapshotRef<'a> {
    metadata: &'a IndexMetadata,
    projects: &'a [Project],
}
