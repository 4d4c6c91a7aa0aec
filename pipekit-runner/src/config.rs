//! Environment configuration
//!
//! Which platform to talk to and with which credentials. Built once at the
//! start of a command and passed explicitly to everything that needs it.

use std::fmt;
use std::str::FromStr;

use crate::error::{Result, RunError};

pub const ENV_ORGANIZATION: &str = "PIPEKIT_ORGANIZATION";
pub const ENV_API_TOKEN: &str = "PIPEKIT_API_TOKEN";
pub const ENV_ENVIRONMENT: &str = "PIPEKIT_ENV";
pub const ENV_HOST: &str = "PIPEKIT_HOST";

/// Platform deployment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Prod,
    Staging,
    Local,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Prod => "PROD",
            Environment::Staging => "STAGING",
            Environment::Local => "LOCAL",
        }
    }

    /// Host URL of the deployment
    pub fn default_host(&self) -> &'static str {
        match self {
            Environment::Prod => "https://app.picsellia.com",
            Environment::Staging => "https://staging.picsellia.com",
            Environment::Local => "http://localhost:8000",
        }
    }

    /// Deployment whose default host is `host`, if any
    pub fn from_host(host: &str) -> Option<Self> {
        let host = host.trim_end_matches('/');
        [Environment::Prod, Environment::Staging, Environment::Local]
            .into_iter()
            .find(|env| env.default_host() == host)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Environment {
    type Err = RunError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PROD" | "PRODUCTION" => Ok(Environment::Prod),
            "STAGING" => Ok(Environment::Staging),
            "LOCAL" => Ok(Environment::Local),
            other => Err(RunError::Env(format!(
                "unknown environment '{}' (expected PROD, STAGING or LOCAL)",
                other
            ))),
        }
    }
}

/// Credentials and target host for platform access
#[derive(Clone, PartialEq, Eq)]
pub struct EnvConfig {
    pub organization_name: String,
    pub api_token: String,
    pub host: String,
    pub environment: Environment,
}

impl fmt::Debug for EnvConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnvConfig")
            .field("organization_name", &self.organization_name)
            .field("api_token", &"<redacted>")
            .field("host", &self.host)
            .field("environment", &self.environment)
            .finish()
    }
}

impl EnvConfig {
    /// Creates a configuration targeting the default host of `environment`
    pub fn new(
        organization_name: impl Into<String>,
        api_token: impl Into<String>,
        environment: Environment,
    ) -> Self {
        Self {
            organization_name: organization_name.into(),
            api_token: api_token.into(),
            host: environment.default_host().to_string(),
            environment,
        }
    }

    /// Creates configuration from a key lookup
    ///
    /// Expected keys:
    /// - PIPEKIT_ORGANIZATION (required)
    /// - PIPEKIT_API_TOKEN (required)
    /// - PIPEKIT_ENV (optional, PROD | STAGING | LOCAL, default: PROD)
    /// - PIPEKIT_HOST (optional, overrides the environment's default host)
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let organization_name = value(ENV_ORGANIZATION)
            .ok_or_else(|| RunError::Env(format!("{} is not set", ENV_ORGANIZATION)))?;
        let api_token = value(ENV_API_TOKEN)
            .ok_or_else(|| RunError::Env(format!("{} is not set", ENV_API_TOKEN)))?;
        let environment = match value(ENV_ENVIRONMENT) {
            Some(raw) => raw.parse()?,
            None => Environment::default(),
        };

        let mut config = Self::new(organization_name, api_token, environment);
        if let Some(host) = value(ENV_HOST) {
            config.host = host.trim_end_matches('/').to_string();
        }

        config.validate()?;
        Ok(config)
    }

    /// Creates configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Returns a copy of this configuration targeting `host`
    ///
    /// Used when a run config pins `auth.host`. The environment follows the
    /// host when it is a known deployment.
    pub fn with_host(&self, host: &str) -> Self {
        let host = host.trim_end_matches('/').to_string();
        Self {
            environment: Environment::from_host(&host).unwrap_or(self.environment),
            host,
            ..self.clone()
        }
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<()> {
        if self.organization_name.trim().is_empty() {
            return Err(RunError::Env("organization name cannot be empty".to_string()));
        }

        if self.api_token.trim().is_empty() {
            return Err(RunError::Env("API token cannot be empty".to_string()));
        }

        if !self.host.starts_with("http://") && !self.host.starts_with("https://") {
            return Err(RunError::Env(format!(
                "host must start with http:// or https:// (got '{}')",
                self.host
            )));
        }

        Ok(())
    }
}
