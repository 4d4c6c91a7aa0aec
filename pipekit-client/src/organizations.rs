//! Organization endpoints

use crate::PlatformClient;
use crate::error::{ClientError, Result};
use pipekit_core::domain::entity::Organization;

impl PlatformClient {
    /// Find an organization the token has access to by its name
    ///
    /// # Arguments
    /// * `name` - The organization name
    pub async fn find_organization(&self, name: &str) -> Result<Organization> {
        let response = self
            .get("/api/organizations")
            .query(&[("name", name)])
            .send()
            .await?;

        let organizations: Vec<Organization> = self.handle_response(response).await?;
        organizations
            .into_iter()
            .find(|org| org.name == name)
            .ok_or_else(|| ClientError::NotFound(format!("organization '{}'", name)))
    }
}
