//! Model version endpoints

use crate::PlatformClient;
use crate::error::Result;
use pipekit_core::domain::entity::ModelVersion;

impl PlatformClient {
    /// Get a model version by ID
    ///
    /// # Arguments
    /// * `version_id` - The model version ID
    pub async fn get_model_version(&self, version_id: &str) -> Result<ModelVersion> {
        let response = self
            .get(&format!("/api/model/version/{}", version_id))
            .send()
            .await?;

        self.handle_response(response).await
    }
}
