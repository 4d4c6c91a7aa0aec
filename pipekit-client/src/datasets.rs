//! Dataset and dataset version endpoints

use crate::PlatformClient;
use crate::error::{ClientError, Result};
use pipekit_core::domain::entity::{Dataset, DatasetVersion};
use pipekit_core::dto::dataset::{CreateDatasetVersion, DatasetVersionQuery};

impl PlatformClient {
    // =============================================================================
    // Datasets
    // =============================================================================

    /// Get a dataset by ID
    pub async fn get_dataset(&self, dataset_id: &str) -> Result<Dataset> {
        let response = self
            .get(&format!("/api/dataset/{}", dataset_id))
            .send()
            .await?;

        self.handle_response(response).await
    }

    // =============================================================================
    // Dataset Versions
    // =============================================================================

    /// Get a dataset version by ID
    ///
    /// # Arguments
    /// * `version_id` - The dataset version ID
    pub async fn get_dataset_version(&self, version_id: &str) -> Result<DatasetVersion> {
        let response = self
            .get(&format!("/api/dataset/version/{}", version_id))
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// List all versions of a dataset
    pub async fn list_dataset_versions(&self, dataset_id: &str) -> Result<Vec<DatasetVersion>> {
        let response = self
            .get(&format!("/api/dataset/{}/versions", dataset_id))
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Find a version of a dataset by its version name
    ///
    /// # Arguments
    /// * `dataset_id` - The parent dataset ID
    /// * `version` - The version label (e.g., "train")
    ///
    /// # Returns
    /// `ClientError::NotFound` when the dataset has no such version
    pub async fn find_dataset_version(&self, dataset_id: &str, version: &str) -> Result<DatasetVersion> {
        let query = DatasetVersionQuery {
            version: version.to_string(),
        };
        let response = self
            .get(&format!("/api/dataset/{}/versions", dataset_id))
            .query(&query)
            .send()
            .await?;

        let versions: Vec<DatasetVersion> = self.handle_response(response).await?;
        versions
            .into_iter()
            .find(|v| v.version == version)
            .ok_or_else(|| {
                ClientError::NotFound(format!("version '{}' of dataset {}", version, dataset_id))
            })
    }

    /// Create a new version on an existing dataset
    pub async fn create_dataset_version(
        &self,
        dataset_id: &str,
        req: CreateDatasetVersion,
    ) -> Result<DatasetVersion> {
        let response = self
            .post(&format!("/api/dataset/{}/versions", dataset_id))
            .json(&req)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Delete a dataset version
    pub async fn delete_dataset_version(&self, version_id: &str) -> Result<()> {
        let response = self
            .delete(&format!("/api/dataset/version/{}", version_id))
            .send()
            .await?;

        self.handle_empty_response(response).await
    }
}
