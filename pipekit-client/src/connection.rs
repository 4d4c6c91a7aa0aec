//! Connection context and browsable URL builders

use pipekit_core::domain::entity::{DatasetVersion, ModelVersion};

/// Where the client is connected: platform host and resolved organization
///
/// Enough context to build links to entities in the platform web UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    pub host: String,
    pub organization_id: String,
}

impl Connection {
    pub fn new(host: impl Into<String>, organization_id: impl Into<String>) -> Self {
        let host = host.into();
        Self {
            host: host.trim_end_matches('/').to_string(),
            organization_id: organization_id.into(),
        }
    }

    pub fn dataset_version_url(&self, version: &DatasetVersion) -> String {
        format!(
            "{}/{}/dataset/{}/version/{}/assets?offset=0&q=&order_by=-created_at",
            self.host, self.organization_id, version.origin_id, version.id
        )
    }

    pub fn model_version_url(&self, version: &ModelVersion) -> String {
        format!(
            "{}/{}/model/{}/version/{}",
            self.host, self.organization_id, version.origin_id, version.id
        )
    }

    pub fn datalake_url(&self, datalake_id: &str) -> String {
        format!(
            "{}/{}/datalake/{}?offset=0&q=&order_by=-created_at",
            self.host, self.organization_id, datalake_id
        )
    }

    pub fn experiment_url(&self, experiment_id: &str) -> String {
        format!(
            "{}/{}/experiment/{}",
            self.host, self.organization_id, experiment_id
        )
    }
}
