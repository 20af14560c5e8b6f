//! HTTP client for the world placement server
//!
//! The world server is an opaque, possibly slow sink: it accepts
//! set-block calls that overwrite per coordinate, reports a health
//! status, and exposes the player position the renderer anchors to.
//! Placements are not retried here — retry policy, if any, belongs to
//! the server side.

use crate::types::{
    PixcubeError, PlacementCommand, PositionResponse, Result, ServerStatus, SetBlockRequest,
};
use glam::IVec3;
use reqwest::Client;
use std::time::Duration;

/// Default world server URL
pub const DEFAULT_SERVER_URL: &str = "http://localhost:4711";

/// Default timeout for health check requests (5 seconds)
const DEFAULT_HEALTH_TIMEOUT: Duration = Duration::from_secs(5);

/// Default timeout for placement and position requests (10 seconds)
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Anything that can accept a stream of block placements
///
/// The renderer only needs this one call; implementations decide how a
/// placement reaches the world. Repeated placements at the same
/// coordinate overwrite.
#[allow(async_fn_in_trait)]
pub trait BlockSink {
    /// Deliver one placement
    async fn set_block(&self, command: PlacementCommand) -> Result<()>;
}

/// HTTP client for a world placement server
///
/// # Example
///
/// ```no_run
/// use pixcube::{BlockRef, PlacementCommand, WorldClient};
/// use pixcube::client::BlockSink;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let client = WorldClient::new("http://localhost:4711");
///
///     // Check server health
///     let status = client.health_check().await?;
///     println!("Server: {}", status.status);
///
///     // Anchor at the player and place one block
///     let anchor = client.player_position().await?;
///     let command = PlacementCommand::new(anchor, BlockRef::new(35, 2));
///     client.set_block(command).await?;
///
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct WorldClient {
    client: Client,
    base_url: String,
    health_timeout: Duration,
    request_timeout: Duration,
}

impl WorldClient {
    /// Create a new client with default settings
    ///
    /// # Arguments
    ///
    /// * `base_url` - Base URL of the world server (e.g., "http://localhost:4711")
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            health_timeout: DEFAULT_HEALTH_TIMEOUT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Create a client from the `PIXCUBE_SERVER_URL` environment
    /// variable, falling back to the default URL
    pub fn from_env() -> Self {
        let url =
            std::env::var("PIXCUBE_SERVER_URL").unwrap_or_else(|_| DEFAULT_SERVER_URL.to_string());
        Self::new(url)
    }

    /// Set the timeout for health check requests
    pub fn with_health_timeout(mut self, timeout: Duration) -> Self {
        self.health_timeout = timeout;
        self
    }

    /// Set the timeout for placement and position requests
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Check the world server's health status
    pub async fn health_check(&self) -> Result<ServerStatus> {
        let url = format!("{}/health", self.base_url);

        let response = self
            .client
            .get(&url)
            .timeout(self.health_timeout)
            .send()
            .await
            .map_err(|e| self.transport_error(e, self.health_timeout))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(PixcubeError::ServerError(format!(
                "health check failed ({}): {}",
                status, error_text
            )));
        }

        response
            .json::<ServerStatus>()
            .await
            .map_err(|e| PixcubeError::ParseError(format!("failed to parse health response: {}", e)))
    }

    /// Current player position, used as the render anchor
    pub async fn player_position(&self) -> Result<IVec3> {
        let url = format!("{}/player/position", self.base_url);

        let response = self
            .client
            .get(&url)
            .timeout(self.request_timeout)
            .send()
            .await
            .map_err(|e| self.transport_error(e, self.request_timeout))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(PixcubeError::ServerError(format!(
                "position query failed ({}): {}",
                status, error_text
            )));
        }

        let position = response.json::<PositionResponse>().await.map_err(|e| {
            PixcubeError::ParseError(format!("failed to parse position response: {}", e))
        })?;

        Ok(position.into())
    }

    /// Map a transport-level failure onto the error taxonomy
    fn transport_error(&self, error: reqwest::Error, timeout: Duration) -> PixcubeError {
        if error.is_timeout() {
            PixcubeError::TimeoutError(timeout.as_secs())
        } else if error.is_connect() {
            PixcubeError::ConnectionError(format!(
                "failed to connect to server at {}: {}",
                self.base_url, error
            ))
        } else {
            PixcubeError::RequestFailed(error)
        }
    }
}

impl BlockSink for WorldClient {
    async fn set_block(&self, command: PlacementCommand) -> Result<()> {
        let url = format!("{}/world/block", self.base_url);
        let body = SetBlockRequest::from(command);

        let response = self
            .client
            .post(&url)
            .json(&body)
            .timeout(self.request_timeout)
            .send()
            .await
            .map_err(|e| self.transport_error(e, self.request_timeout))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(PixcubeError::ServerError(format!(
                "set block at {} failed ({}): {}",
                command.pos, status, error_text
            )));
        }

        Ok(())
    }
}
