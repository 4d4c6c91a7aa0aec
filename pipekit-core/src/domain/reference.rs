//! References to platform entities embedded in a run config
//!
//! A reference lives under `input.<slot>` or `output.<slot>` and always
//! carries the entity `id` once known; the remaining fields are descriptive
//! and filled in by enrichment.

use serde::{Deserialize, Serialize};
use toml::{Table, Value};

/// Kind of platform entity a slot points to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    DatasetVersion,
    ModelVersion,
    Datalake,
    Experiment,
}

/// Known reference slot names under `input` / `output`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    DatasetVersion,
    ModelVersion,
    Datalake,
    TrainDatasetVersion,
    TestDatasetVersion,
    ValidationDatasetVersion,
    Experiment,
}

impl Slot {
    pub const ALL: [Slot; 7] = [
        Slot::DatasetVersion,
        Slot::ModelVersion,
        Slot::Datalake,
        Slot::TrainDatasetVersion,
        Slot::TestDatasetVersion,
        Slot::ValidationDatasetVersion,
        Slot::Experiment,
    ];

    /// Key of the slot inside its section
    pub fn key(&self) -> &'static str {
        match self {
            Slot::DatasetVersion => "dataset_version",
            Slot::ModelVersion => "model_version",
            Slot::Datalake => "datalake",
            Slot::TrainDatasetVersion => "train_dataset_version",
            Slot::TestDatasetVersion => "test_dataset_version",
            Slot::ValidationDatasetVersion => "validation_dataset_version",
            Slot::Experiment => "experiment",
        }
    }

    pub fn kind(&self) -> EntityKind {
        match self {
            Slot::DatasetVersion
            | Slot::TrainDatasetVersion
            | Slot::TestDatasetVersion
            | Slot::ValidationDatasetVersion => EntityKind::DatasetVersion,
            Slot::ModelVersion => EntityKind::ModelVersion,
            Slot::Datalake => EntityKind::Datalake,
            Slot::Experiment => EntityKind::Experiment,
        }
    }
}

/// Typed view of a `{id, name, origin_name, url, ...}` reference table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<String>,
}

impl EntityRef {
    /// Keys filled in from the platform once the entity exists
    pub const RESOLVED_FIELDS: [&'static str; 4] = ["id", "version_name", "origin_name", "url"];

    /// Reference holding only an id
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Self::default()
        }
    }

    /// Reference holding only a name (outputs that do not exist yet)
    pub fn with_name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Reads a reference from a TOML table
    ///
    /// Hand-edited files sometimes carry integer ids, so integers are
    /// accepted for every field and stringified. Unknown keys are ignored.
    pub fn from_table(table: &Table) -> Self {
        let field = |key: &str| table.get(key).and_then(scalar_to_string);
        Self {
            id: field("id"),
            name: field("name"),
            version_name: field("version_name"),
            origin_name: field("origin_name"),
            url: field("url"),
            visibility: field("visibility"),
        }
    }

    /// Converts the reference into a TOML table, omitting absent fields
    pub fn to_table(&self) -> Table {
        let mut table = Table::new();
        let fields = [
            ("id", &self.id),
            ("name", &self.name),
            ("version_name", &self.version_name),
            ("origin_name", &self.origin_name),
            ("url", &self.url),
            ("visibility", &self.visibility),
        ];
        for (key, value) in fields {
            if let Some(value) = value {
                table.insert(key.to_string(), Value::String(value.clone()));
            }
        }
        table
    }

    /// Non-empty id, if any
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.trim().is_empty())
    }

    /// Non-empty name, if any
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref().filter(|name| !name.trim().is_empty())
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Integer(i) => Some(i.to_string()),
        _ => None,
    }
}
