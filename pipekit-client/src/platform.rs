//! Lookup seam over the platform
//!
//! The run lifecycle only talks to the platform through this trait, which is
//! implemented by [`PlatformClient`] and by in-memory doubles in tests.

use async_trait::async_trait;
use pipekit_core::domain::entity::{Dataset, DatasetVersion, Datalake, Experiment, ModelVersion};

use crate::error::Result;
use crate::{Connection, PlatformClient};

#[async_trait]
pub trait Platform: Send + Sync {
    /// Host and organization the lookups run against
    fn connection(&self) -> &Connection;

    async fn get_dataset(&self, dataset_id: &str) -> Result<Dataset>;

    async fn get_dataset_version(&self, version_id: &str) -> Result<DatasetVersion>;

    /// Find a version of `dataset_id` by its version name
    async fn find_dataset_version(&self, dataset_id: &str, version: &str) -> Result<DatasetVersion>;

    async fn delete_dataset_version(&self, version_id: &str) -> Result<()>;

    async fn get_model_version(&self, version_id: &str) -> Result<ModelVersion>;

    async fn get_datalake(&self, datalake_id: &str) -> Result<Datalake>;

    async fn get_experiment(&self, experiment_id: &str) -> Result<Experiment>;
}

#[async_trait]
impl Platform for PlatformClient {
    fn connection(&self) -> &Connection {
        PlatformClient::connection(self)
    }

    async fn get_dataset(&self, dataset_id: &str) -> Result<Dataset> {
        PlatformClient::get_dataset(self, dataset_id).await
    }

    async fn get_dataset_version(&self, version_id: &str) -> Result<DatasetVersion> {
        PlatformClient::get_dataset_version(self, version_id).await
    }

    async fn find_dataset_version(&self, dataset_id: &str, version: &str) -> Result<DatasetVersion> {
        PlatformClient::find_dataset_version(self, dataset_id, version).await
    }

    async fn delete_dataset_version(&self, version_id: &str) -> Result<()> {
        PlatformClient::delete_dataset_version(self, version_id).await
    }

    async fn get_model_version(&self, version_id: &str) -> Result<ModelVersion> {
        PlatformClient::get_model_version(self, version_id).await
    }

    async fn get_datalake(&self, datalake_id: &str) -> Result<Datalake> {
        PlatformClient::get_datalake(self, datalake_id).await
    }

    async fn get_experiment(&self, experiment_id: &str) -> Result<Experiment> {
        PlatformClient::get_experiment(self, experiment_id).await
    }
}
