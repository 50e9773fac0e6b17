//! HTTP Client
//!
//! `reqwest`-backed [`Transport`] with bearer authentication and a
//! configurable timeout.

use crate::client::transport::{Transport, TransportResponse};
use crate::config::ClientConfig;
use crate::error::{DeepSeekError, Result};
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// HTTP transport bound to one base URL and API key
#[derive(Debug, Clone)]
pub struct HttpClient {
    /// Inner reqwest client
    client: Client,

    /// Base URL without a trailing slash
    base_url: String,
}

impl HttpClient {
    /// Create a new HTTP client
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let mut auth = HeaderValue::from_str(&format!("Bearer {}", config.api_key))
            .map_err(|e| DeepSeekError::Config(format!("Invalid API key format: {}", e)))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent)
                .map_err(|e| DeepSeekError::Config(format!("Invalid user agent: {}", e)))?,
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .connect_timeout(Duration::from_secs(10))
            .pool_max_idle_per_host(10)
            .build()
            .map_err(|e| DeepSeekError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for an endpoint path
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

#[async_trait]
impl Transport for HttpClient {
    async fn post_json(&self, path: &str, body: String) -> Result<TransportResponse> {
        let url = self.endpoint(path);
        debug!(%url, bytes = body.len(), "sending request");

        let response = self.client.post(&url).body(body).send().await?;
        let status = response.status().as_u16();
        debug!(%url, status, "response headers received");

        let body = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(DeepSeekError::from));

        Ok(TransportResponse::new(status, Box::pin(body)))
    }
}
