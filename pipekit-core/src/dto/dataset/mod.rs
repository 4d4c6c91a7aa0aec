//! Dataset DTOs

use serde::{Deserialize, Serialize};

/// Request to create a new version on an existing dataset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDatasetVersion {
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Query used to look up a dataset version by its label
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetVersionQuery {
    pub version: String,
}
