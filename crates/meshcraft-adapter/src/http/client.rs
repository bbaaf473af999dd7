/*
[INPUT]:  HTTP configuration (base URL, timeouts, session token)
[OUTPUT]: Configured reqwest client ready for API calls
[POS]:    HTTP layer - core client implementation
[UPDATE]: When adding connection options or changing client behavior
*/

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::auth::SessionManager;
use crate::http::{MeshcraftError, Result};
use crate::types::ApiEnvelope;

/// Base URL for the MeshCraft API
pub const DEFAULT_BASE_URL: &str = "https://api.meshcraft.app";

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub timeout: Duration,
    pub connect_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

/// Main HTTP client for the MeshCraft API
#[derive(Debug, Clone)]
pub struct MeshcraftClient {
    http_client: Client,
    base_url: Url,
    session: SessionManager,
    timeout: Duration,
}

impl MeshcraftClient {
    /// Create a new client with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(ClientConfig::default())
    }

    /// Create a new client with custom configuration
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        Self::with_config_and_base_url(config, DEFAULT_BASE_URL)
    }

    /// Create a client against a custom backend (staging, mock server)
    pub fn with_config_and_base_url(config: ClientConfig, base_url: &str) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .build()?;

        Ok(Self {
            http_client,
            base_url: Url::parse(base_url)?,
            session: SessionManager::new(),
            timeout: config.timeout,
        })
    }

    /// Share an existing session (token store) with this client
    pub fn with_session(mut self, session: SessionManager) -> Self {
        self.session = session;
        self
    }

    /// Session used to authorize requests
    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build full URL for an endpoint
    fn url(&self, endpoint: &str) -> std::result::Result<Url, url::ParseError> {
        self.base_url.join(endpoint)
    }

    /// Build request builder, attaching the bearer token when signed in
    pub(crate) fn request(&self, method: Method, endpoint: &str) -> Result<RequestBuilder> {
        let url = self.url(endpoint)?;
        debug!(%method, %url, "building request");
        let builder = self.http_client.request(method, url);
        Ok(match self.session.valid_token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        })
    }

    /// Send and unwrap the `data` payload of the response envelope
    pub(crate) async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T> {
        let envelope: ApiEnvelope<T> = self.send_envelope(builder).await?;
        envelope
            .data
            .ok_or_else(|| MeshcraftError::InvalidResponse("response has no data".to_string()))
    }

    /// Send a mutation whose payload the caller does not need
    pub(crate) async fn send_unit(&self, builder: RequestBuilder) -> Result<()> {
        let _: ApiEnvelope<serde_json::Value> = self.send_envelope(builder).await?;
        Ok(())
    }

    async fn send_envelope<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> Result<ApiEnvelope<T>> {
        let response = builder
            .send()
            .await
            .map_err(|err| self.transport_error(err))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| self.transport_error(err))?;

        if status == StatusCode::UNAUTHORIZED {
            return Err(MeshcraftError::Unauthorized);
        }

        if !status.is_success() {
            let message = serde_json::from_str::<ApiEnvelope<serde_json::Value>>(&body)
                .map(|envelope| envelope.failure_message())
                .unwrap_or_else(|_| {
                    status
                        .canonical_reason()
                        .unwrap_or("request failed")
                        .to_string()
                });
            debug!(status = status.as_u16(), %message, "request failed");
            return Err(MeshcraftError::api_error(status, message));
        }

        let envelope: ApiEnvelope<T> = serde_json::from_str(&body)?;
        if !envelope.success {
            return Err(MeshcraftError::api_error(status, envelope.failure_message()));
        }
        Ok(envelope)
    }

    fn transport_error(&self, err: reqwest::Error) -> MeshcraftError {
        if err.is_timeout() {
            MeshcraftError::Timeout {
                duration: self.timeout.as_secs(),
            }
        } else {
            MeshcraftError::Http(err)
        }
    }
}
