//! Datalake endpoints

use crate::PlatformClient;
use crate::error::Result;
use pipekit_core::domain::entity::Datalake;

impl PlatformClient {
    /// Get a datalake by ID
    pub async fn get_datalake(&self, datalake_id: &str) -> Result<Datalake> {
        let response = self
            .get(&format!("/api/datalake/{}", datalake_id))
            .send()
            .await?;

        self.handle_response(response).await
    }
}
