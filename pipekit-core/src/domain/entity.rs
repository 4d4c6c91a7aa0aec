//! Platform entity types
//!
//! Shapes returned by the platform API. Only the fields the CLI reads are
//! modeled; unknown fields are ignored on deserialization.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An organization the API token has access to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    pub id: String,
    pub name: String,
}

/// A dataset (parent of dataset versions)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dataset {
    pub id: String,
    pub name: String,
}

/// A version of a dataset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetVersion {
    pub id: String,
    /// Id of the parent dataset
    pub origin_id: String,
    /// Name of the parent dataset
    pub name: String,
    /// Version label (e.g. "train", "v2")
    pub version: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// A version of a model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelVersion {
    pub id: String,
    /// Id of the parent model
    pub origin_id: String,
    /// Version name
    pub name: String,
    /// Name of the parent model
    pub origin_name: String,
}

/// A datalake
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Datalake {
    pub id: String,
    pub name: String,
}

/// A training experiment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Experiment {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub project_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dataset_version_ignores_unknown_fields() {
        let version: DatasetVersion = from_toml(
            r#"id = "v1"
origin_id = "d1"
name = "cats"
version = "train"
size = 42
"#,
        );
        assert_eq!(version.origin_id, "d1");
        assert_eq!(version.created_at, None);
    }

    fn from_toml<T: serde::de::DeserializeOwned>(source: &str) -> T {
        toml::from_str(source).unwrap()
    }
}
