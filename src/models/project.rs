//! Unified project record.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::{AppError, Result};

/// Platform a project was fetched from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Source {
    GitHub,
    HuggingFace,
}

impl Source {
    /// Every known source, in export order.
    pub const ALL: [Source; 2] = [Source::GitHub, Source::HuggingFace];

    /// Display name, as written to the snapshot.
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::GitHub => "GitHub",
            Source::HuggingFace => "HuggingFace",
        }
    }

    /// Lowercase identifier used in file names.
    pub fn slug(&self) -> &'static str {
        match self {
            Source::GitHub => "github",
            Source::HuggingFace => "huggingface",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of resource a project represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ProjectKind {
    Repository,
    Gist,
    Model,
    Dataset,
    Space,
}

impl ProjectKind {
    /// Every known kind, in export order.
    pub const ALL: [ProjectKind; 5] = [
        ProjectKind::Repository,
        ProjectKind::Gist,
        ProjectKind::Model,
        ProjectKind::Dataset,
        ProjectKind::Space,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectKind::Repository => "Repository",
            ProjectKind::Gist => "Gist",
            ProjectKind::Model => "Model",
            ProjectKind::Dataset => "Dataset",
            ProjectKind::Space => "Space",
        }
    }

    /// Plural lowercase name, used for categories and export files.
    pub fn plural(&self) -> &'static str {
        match self {
            ProjectKind::Repository => "repositories",
            ProjectKind::Gist => "gists",
            ProjectKind::Model => "models",
            ProjectKind::Dataset => "datasets",
            ProjectKind::Space => "spaces",
        }
    }
}

impl fmt::Display for ProjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of a project within an index.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProjectKey {
    pub source: Source,
    pub full_name: String,
}

impl fmt::Display for ProjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.source, self.full_name)
    }
}

/// A project fetched from one of the platforms.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Project {
    /// Platform the project lives on
    pub source: Source,

    /// Resource kind
    #[serde(rename = "type", alias = "kind")]
    pub kind: ProjectKind,

    /// Short name (last path segment)
    pub name: String,

    /// Identifier unique within the source (e.g. `owner/repo`)
    pub full_name: String,

    #[serde(default)]
    pub description: Option<String>,

    /// Direct link to the project
    pub url: String,

    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub updated_at: Option<DateTime<Utc>>,

    /// Programming language, pipeline tag or SDK depending on the source
    #[serde(rename = "language", alias = "primary_language", default)]
    pub primary_language: Option<String>,

    #[serde(default)]
    pub topics: Vec<String>,
}

impl Project {
    /// Identity key used for merging.
    pub fn key(&self) -> ProjectKey {
        ProjectKey {
            source: self.source,
            full_name: self.full_name.clone(),
        }
    }

    /// Check that the identifying fields are present.
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("name", &self.name),
            ("full_name", &self.full_name),
            ("url", &self.url),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(AppError::validation(format!(
                    "{} {} has an empty {}",
                    self.source, self.kind, field
                )));
            }
        }
        Ok(())
    }
}

/// Parse an ISO-8601 timestamp.
///
/// A trailing `Z` or an explicit offset is honored. Timestamps without an
/// offset (`2023-05-01T12:00:00`) and bare dates (`2023-05-01`) are taken
/// as UTC.
pub fn parse_timestamp(text: &str) -> Result<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Ok(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Ok(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .map(|date| date.and_time(NaiveTime::MIN).and_utc())
        .map_err(|e| AppError::validation(format!("Invalid timestamp '{text}': {e}")))
}

/// Deserialize an optional timestamp, reading anything unparsable as absent.
pub(crate) fn lenient_timestamp<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw
        .as_ref()
        .and_then(Value::as_str)
        .and_then(|text| parse_timestamp(text).ok()))
}

/// Last `/`-separated segment of an identifier, or the identifier itself.
pub fn short_name(identifier: &str) -> &str {
    identifier.rsplit('/').next().unwrap_or(identifier)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_project() -> Project {
        Project {
            source: Source::GitHub,
            kind: ProjectKind::Repository,
            name: "widget".to_string(),
            full_name: "octocat/widget".to_string(),
            description: None,
            url: "https://github.com/octocat/widget".to_string(),
            created_at: Some(Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap()),
            updated_at: None,
            primary_language: Some("Rust".to_string()),
            topics: vec!["cli".to_string()],
        }
    }

    #[test]
    fn test_parse_timestamp_accepts_z_suffix() {
        let parsed = parse_timestamp("2024-01-02T03:04:05Z").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap());
    }

    #[test]
    fn test_parse_timestamp_normalizes_offset() {
        let parsed = parse_timestamp("2024-01-02T05:04:05.000+02:00").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap());
    }

    #[test]
    fn test_parse_timestamp_without_offset_is_utc() {
        let parsed = parse_timestamp("2025-01-15T10:30:00.123456").unwrap();
        assert_eq!(
            parsed,
            Utc.with_ymd_and_hms(2025, 1, 15, 10, 30, 0).unwrap()
                + chrono::Duration::microseconds(123_456)
        );

        let parsed = parse_timestamp("2023-05-01T12:00:00").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2023, 5, 1, 12, 0, 0).unwrap());

        let parsed = parse_timestamp("2023-05-01").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2023, 5, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_timestamp_rejects_garbage() {
        assert!(parse_timestamp("yesterday").is_err());
        assert!(parse_timestamp("").is_err());
    }

    #[test]
    fn test_short_name() {
        assert_eq!(short_name("someone/cool-model"), "cool-model");
        assert_eq!(short_name("standalone"), "standalone");
    }

    #[test]
    fn test_validate_rejects_empty_fields() {
        assert!(sample_project().validate().is_ok());

        let mut project = sample_project();
        project.url = " ".to_string();
        let err = project.validate().unwrap_err();
        assert!(err.to_string().contains("url"));

        let mut project = sample_project();
        project.full_name.clear();
        assert!(project.validate().is_err());
    }

    #[test]
    fn test_key_display() {
        assert_eq!(sample_project().key().to_string(), "GitHub:octocat/widget");
    }

    #[test]
    fn test_serialization_uses_snapshot_field_names() {
        let value = serde_json::to_value(sample_project()).unwrap();
        assert_eq!(value["type"], "Repository");
        assert_eq!(value["source"], "GitHub");
        assert_eq!(value["language"], "Rust");
        assert!(value["description"].is_null());
        assert!(value["updated_at"].is_null());
        assert!(value["created_at"].as_str().unwrap().starts_with("2024-01-02T03:04:05"));
    }

    #[test]
    fn test_deserialize_with_offset_and_missing_optionals() {
        let json = r#"{
            "source": "HuggingFace",
            "type": "Space",
            "name": "demo",
            "full_name": "someone/demo",
            "url": "https://huggingface.co/spaces/someone/demo",
            "created_at": "2023-06-01T10:00:00+00:00"
        }"#;
        let project: Project = serde_json::from_str(json).unwrap();
        assert_eq!(project.kind, ProjectKind::Space);
        assert!(project.topics.is_empty());
        assert!(project.primary_language.is_none());
        assert!(project.created_at.is_some());
    }

    #[test]
    fn test_deserialize_tolerates_odd_timestamps() {
        let json = r#"{
            "source": "GitHub",
            "type": "Gist",
            "name": "abc",
            "full_name": "octocat/gist:abc",
            "url": "https://gist.github.com/abc",
            "created_at": "2022-03-04T05:06:07",
            "updated_at": "not a date"
        }"#;
        let project: Project = serde_json::from_str(json).unwrap();
        assert_eq!(
            project.created_at,
            Some(Utc.with_ymd_and_hms(2022, 3, 4, 5, 6, 7).unwrap())
        );
        assert!(project.updated_at.is_none());
    }
}
