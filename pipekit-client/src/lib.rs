//! Pipekit Platform Client
//!
//! A small, type-safe HTTP client for the ML platform that pipelines run
//! against. It covers the lookups the run lifecycle needs (dataset versions,
//! model versions, datalakes, experiments) plus dataset version management.
//!
//! Consumers that only need lookups should depend on the [`Platform`] trait
//! rather than on [`PlatformClient`] directly, so they can be exercised with
//! an in-memory implementation.
//!
//! # Example
//!
//! ```no_run
//! use pipekit_client::{Platform, PlatformClient};
//!
//! #[tokio::main]
//! async fn main() -> pipekit_client::Result<()> {
//!     let client = PlatformClient::connect("https://app.picsellia.com", "token", "my-org").await?;
//!
//!     let version = client.get_dataset_version("0190a3b1-...").await?;
//!     println!("{} / {}", version.name, version.version);
//!     Ok(())
//! }
//! ```

mod connection;
mod datalakes;
mod datasets;
pub mod error;
mod experiments;
mod models;
mod organizations;
mod platform;

// Re-export commonly used types
pub use connection::Connection;
pub use error::{ClientError, Result};
pub use platform::Platform;

use reqwest::header::AUTHORIZATION;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::debug;

/// HTTP client for the platform API
///
/// Every request carries the API token. The client is bound to a single
/// organization, resolved by name when connecting.
#[derive(Debug, Clone)]
pub struct PlatformClient {
    connection: Connection,
    api_token: String,
    client: Client,
}

impl PlatformClient {
    /// Create a client for an already-resolved organization
    ///
    /// # Arguments
    /// * `connection` - Host and organization id
    /// * `api_token` - API token sent on every request
    pub fn new(connection: Connection, api_token: impl Into<String>) -> Self {
        Self::with_client(connection, api_token, Client::new())
    }

    /// Create a client with a custom HTTP client
    ///
    /// This allows you to configure timeouts, proxies, TLS settings, etc.
    pub fn with_client(connection: Connection, api_token: impl Into<String>, client: Client) -> Self {
        Self {
            connection,
            api_token: api_token.into(),
            client,
        }
    }

    /// Connect to the platform, resolving the organization by name
    ///
    /// # Arguments
    /// * `host` - Platform base URL (e.g., "https://app.picsellia.com")
    /// * `api_token` - API token
    /// * `organization_name` - Name of the organization to work in
    pub async fn connect(
        host: impl Into<String>,
        api_token: impl Into<String>,
        organization_name: &str,
    ) -> Result<Self> {
        let host = host.into();
        let api_token = api_token.into();
        if api_token.trim().is_empty() {
            return Err(ClientError::InvalidRequest("API token is empty".to_string()));
        }

        let bootstrap = Self::new(Connection::new(host, ""), api_token);
        let organization = bootstrap.find_organization(organization_name).await?;
        debug!(
            "Connected to {} as organization {} ({})",
            bootstrap.connection.host, organization.name, organization.id
        );

        Ok(Self {
            connection: Connection::new(bootstrap.connection.host, organization.id),
            ..bootstrap
        })
    }

    /// Get the connection context of this client
    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    /// Get the base URL of the platform
    pub fn host(&self) -> &str {
        &self.connection.host
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.connection.host, path)
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        builder.header(AUTHORIZATION, format!("Token {}", self.api_token))
    }

    fn get(&self, path: &str) -> RequestBuilder {
        self.authorized(self.client.get(self.url(path)))
    }

    fn post(&self, path: &str) -> RequestBuilder {
        self.authorized(self.client.post(self.url(path)))
    }

    fn delete(&self, path: &str) -> RequestBuilder {
        self.authorized(self.client.delete(self.url(path)))
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Handle an API response and deserialize JSON
    ///
    /// This method checks the status code and returns an appropriate error if
    /// the request failed, or deserializes the response body if successful.
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
    }

    /// Handle an API response that returns no content (e.g., DELETE operations)
    async fn handle_empty_response(&self, response: reqwest::Response) -> Result<()> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_trims_trailing_slash() {
        let client = PlatformClient::new(Connection::new("http://localhost:8000/", "org"), "tok");
        assert_eq!(client.host(), "http://localhost:8000");
        assert_eq!(client.url("/api/datalake/1"), "http://localhost:8000/api/datalake/1");
    }

    #[tokio::test]
    async fn test_connect_rejects_empty_token() {
        let err = PlatformClient::connect("http://localhost:8000", "  ", "org")
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn test_connect_surfaces_transport_errors() {
        // Nothing listens on port 1.
        let err = PlatformClient::connect("http://127.0.0.1:1", "tok", "org")
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::RequestFailed(_)));
    }
}
