//! Platform connection seam
//!
//! The host to connect to is only known once the run config is chosen
//! (`auth.host` may pin it), so the orchestrator receives a [`Connector`]
//! rather than a ready client.

use async_trait::async_trait;
use pipekit_client::{Platform, PlatformClient};
use std::sync::Arc;
use tracing::info;

use crate::config::EnvConfig;
use crate::error::Result;

#[async_trait]
pub trait Connector: Send + Sync {
    /// Opens a platform session for `env`
    async fn connect(&self, env: &EnvConfig) -> Result<Arc<dyn Platform>>;
}

/// Connects over HTTP with [`PlatformClient`]
#[derive(Debug, Default)]
pub struct HttpConnector;

impl HttpConnector {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Connector for HttpConnector {
    async fn connect(&self, env: &EnvConfig) -> Result<Arc<dyn Platform>> {
        let client =
            PlatformClient::connect(env.host.as_str(), env.api_token.as_str(), &env.organization_name)
                .await?;
        info!(
            "Connected to {} ({}) as organization '{}'",
            env.host, env.environment, env.organization_name
        );
        Ok(Arc::new(client))
    }
}
