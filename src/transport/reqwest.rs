//! # Bundled reqwest Adapter
//!
//! Reference [`Adapter`] implementation backed by a shared [`reqwest::Client`].
//! Supports all six verbs. Non-success statuses are surfaced as
//! [`ClientError::ApiError`]; adapters with other policies are free to return
//! the raw response instead.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use ::reqwest::{Client, Method, StatusCode, Url};

use crate::error::{ClientError, ClientResult};
use crate::transport::{Adapter, ResponseData, TransportRequest, Verb};

/// Configuration for the bundled reqwest adapter
#[derive(Debug, Clone)]
pub struct ReqwestAdapterConfig {
    /// Request timeout in milliseconds
    pub timeout_ms: u64,
}

impl Default for ReqwestAdapterConfig {
    fn default() -> Self {
        Self { timeout_ms: 30000 }
    }
}

/// HTTPS transport adapter backed by reqwest
#[derive(Debug, Clone)]
pub struct ReqwestAdapter {
    client: Client,
}

impl ReqwestAdapter {
    /// Create a new adapter with the given configuration
    pub fn new(config: ReqwestAdapterConfig) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .user_agent(format!("acorn-client/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ClientError::config_error(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client })
    }

    fn build_url(request: &TransportRequest) -> ClientResult<Url> {
        let base = format!("https://{}:{}/", request.host, request.port);
        let base = Url::parse(&base).map_err(|e| {
            ClientError::config_error(format!("Invalid host '{}': {}", request.host, e))
        })?;

        let url = base
            .join(request.rest_path.trim_start_matches('/'))
            .map_err(|e| {
                ClientError::config_error(format!(
                    "Invalid rest path '{}': {}",
                    request.rest_path, e
                ))
            })?;

        Ok(url)
    }

    async fn send(
        &self,
        verb: Verb,
        method: Method,
        request: TransportRequest,
    ) -> ClientResult<ResponseData> {
        let url = Self::build_url(&request)?;

        debug!(verb = %verb, url = %url, "Dispatching request via reqwest adapter");

        let mut builder = self.client.request(method, url);
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        if verb.accepts_query() {
            if let Some(ref query) = request.query {
                builder = builder.query(query);
            }
        }
        if verb.accepts_body() {
            if let Some(ref body) = request.body {
                builder = builder.json(body);
            }
        }

        let response = builder.send().await?;
        let status = response.status();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.to_string(), v.to_string()))
            })
            .collect();

        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), message));
        }

        // HEAD and 204 responses carry no body; non-JSON bodies settle as None
        let body = if verb == Verb::Head || status == StatusCode::NO_CONTENT {
            None
        } else {
            response.json().await.ok()
        };

        Ok(ResponseData {
            status: status.as_u16(),
            headers,
            body,
        })
    }
}

#[async_trait]
impl Adapter for ReqwestAdapter {
    fn name(&self) -> &'static str {
        "reqwest"
    }

    async fn options(&self, request: TransportRequest) -> ClientResult<ResponseData> {
        self.send(Verb::Options, Method::OPTIONS, request).await
    }

    async fn head(&self, request: TransportRequest) -> ClientResult<ResponseData> {
        self.send(Verb::Head, Method::HEAD, request).await
    }

    async fn get(&self, request: TransportRequest) -> ClientResult<ResponseData> {
        self.send(Verb::Get, Method::GET, request).await
    }

    async fn post(&self, request: TransportRequest) -> ClientResult<ResponseData> {
        self.send(Verb::Post, Method::POST, request).await
    }

    async fn put(&self, request: TransportRequest) -> ClientResult<ResponseData> {
        self.send(Verb::Put, Method::PUT, request).await
    }

    async fn delete(&self, request: TransportRequest) -> ClientResult<ResponseData> {
        self.send(Verb::Delete, Method::DELETE, request).await
    }
}
