//! Experiment endpoints

use crate::PlatformClient;
use crate::error::Result;
use pipekit_core::domain::entity::Experiment;

impl PlatformClient {
    /// Get an experiment by ID
    pub async fn get_experiment(&self, experiment_id: &str) -> Result<Experiment> {
        let response = self
            .get(&format!("/api/experiment/{}", experiment_id))
            .send()
            .await?;

        self.handle_response(response).await
    }
}
