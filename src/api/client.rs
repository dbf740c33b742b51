//! HTTP client for the healing service

use crate::api::types::{BroadcastResponse, HealingCode, IntentionRequest, SoulArchiveEntry};
use crate::config::{ClientConfig, StatusPolicy};
use crate::error::{ApiError, ApiResult};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tokio::time::timeout;

/// The three remote operations the view depends on
#[async_trait]
pub trait HealingApi: Send + Sync {
    /// Submit an intention and receive the constructed packet
    async fn broadcast_intention(&self, request: &IntentionRequest) -> ApiResult<BroadcastResponse>;

    /// Search the healing code catalog; an empty query means no filter
    async fn search_healing_codes(&self, query: &str) -> ApiResult<Vec<HealingCode>>;

    /// Fetch every stored soul archive entry
    async fn load_soul_archives(&self) -> ApiResult<Vec<SoulArchiveEntry>>;
}

/// reqwest-backed [`HealingApi`] bound to one origin
#[derive(Debug, Clone)]
pub struct HealingClient {
    client: Client,
    base_url: String,
    status_policy: StatusPolicy,
    request_timeout: Option<Duration>,
}

impl HealingClient {
    /// Create a client from validated configuration
    pub fn new(config: &ClientConfig) -> ApiResult<Self> {
        config.validate()?;

        let client = Client::builder()
            .build()
            .map_err(|e| ApiError::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.origin().to_string(),
            status_policy: config.status_policy,
            request_timeout: config.request_timeout(),
        })
    }

    /// Origin every request is addressed to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send the request and read its body, bounded as a whole by the configured timeout
    async fn call<T: DeserializeOwned>(&self, request: RequestBuilder) -> ApiResult<T> {
        match self.request_timeout {
            Some(limit) => timeout(limit, self.exchange(request))
                .await
                .map_err(|_| ApiError::timeout(limit))?,
            None => self.exchange(request).await,
        }
    }

    async fn exchange<T: DeserializeOwned>(&self, request: RequestBuilder) -> ApiResult<T> {
        let response = request.send().await?;
        self.read_json(response).await
    }

    async fn read_json<T: DeserializeOwned>(&self, response: Response) -> ApiResult<T> {
        let status = response.status();
        let url = response.url().to_string();
        let body = response.text().await?;

        if !status.is_success() {
            match self.status_policy {
                StatusPolicy::Strict => {
                    tracing::warn!("{} returned status {}", url, status);
                    return Err(ApiError::status(status.as_u16(), body));
                }
                StatusPolicy::Lenient => {
                    tracing::warn!("{} returned status {}, using body as result", url, status);
                }
            }
        }

        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl HealingApi for HealingClient {
    async fn broadcast_intention(&self, request: &IntentionRequest) -> ApiResult<BroadcastResponse> {
        let url = self.endpoint("/api/network-packet");
        tracing::debug!("POST {} field_type={}", url, request.field_type);

        self.call(self.client.post(&url).json(request)).await
    }

    async fn search_healing_codes(&self, query: &str) -> ApiResult<Vec<HealingCode>> {
        let url = self.endpoint("/api/healing-codes");
        tracing::debug!("GET {} search={:?}", url, query);

        self.call(self.client.get(&url).query(&[("search", query)]))
            .await
    }

    async fn load_soul_archives(&self) -> ApiResult<Vec<SoulArchiveEntry>> {
        let url = self.endpoint("/api/soul-archives");
        tracing::debug!("GET {}", url);

        self.call(self.client.get(&url)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = HealingClient::new(&ClientConfig::with_base_url("http://localhost:5000/")).unwrap();
        assert_eq!(client.base_url(), "http://localhost:5000");
        assert_eq!(
            client.endpoint("/api/soul-archives"),
            "http://localhost:5000/api/soul-archives"
        );
    }

    #[test]
    fn test_invalid_config_rejected() {
        let result = HealingClient::new(&ClientConfig::with_base_url("healing-api"));
        assert!(matches!(result, Err(ApiError::Config { .. })));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_transport_error() {
        // Port 9 (discard) on localhost is expected to refuse connections
        let client = HealingClient::new(&ClientConfig::with_base_url("http://127.0.0.1:9")).unwrap();
        let err = client.load_soul_archives().await.unwrap_err();
        assert!(err.is_transport());
    }
}
