//! Configuration module
//!
//! Global CLI settings. Platform credentials are only resolved by commands
//! that talk to the platform.

use anyhow::{Context, Result};
use pipekit_runner::config::{
    ENV_API_TOKEN, ENV_ENVIRONMENT, ENV_HOST, ENV_ORGANIZATION, EnvConfig,
};
use pipekit_runner::pipeline::PipelineConfig;
use std::path::PathBuf;

/// CLI configuration
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Root of the pipeline search
    pub search_path: PathBuf,
    pub organization: Option<String>,
    pub environment: Option<String>,
    pub host: Option<String>,
    pub api_token: Option<String>,
}

impl Config {
    /// Platform environment from the global flags (or their env variables)
    pub fn env_config(&self) -> Result<EnvConfig> {
        let env = EnvConfig::from_lookup(|key| match key {
            ENV_ORGANIZATION => self.organization.clone(),
            ENV_API_TOKEN => self.api_token.clone(),
            ENV_ENVIRONMENT => self.environment.clone(),
            ENV_HOST => self.host.clone(),
            _ => None,
        })
        .context("Platform credentials are required (--organization / --api-token)")?;
        Ok(env)
    }

    /// Locates a pipeline by name under the search path
    pub fn find_pipeline(&self, name: &str) -> Result<PipelineConfig> {
        Ok(PipelineConfig::find(name, &self.search_path)?)
    }
}
