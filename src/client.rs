//! # REST Client Facade
//!
//! [`RestClient`] exposes one operation per HTTP verb and delegates each to
//! the currently bound [`Adapter`]. The adapter is a runtime-swappable
//! strategy value; verb operations with no bound capability fail with a
//! verb-specific missing-method error when awaited, never synchronously, so
//! callers handle every verb uniformly.
//!
//! The client is cheap to clone (the adapter is shared behind an `Arc`),
//! which is what lets [`RestClient::batch`] hand the coordinator its own
//! handle.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info};

use crate::batch::RequestBatch;
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::transport::{Adapter, ResponseData, TransportRequest, Verb};

/// Per-request options accepted by every verb operation.
///
/// `body` is only forwarded for write verbs, `query` only for verbs that
/// accept one. `additional_headers` are merged over the client's
/// instance-level headers, per-request values winning.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Path segment appended to the host
    pub rest_path: String,
    /// Query parameters
    pub query: Option<HashMap<String, String>>,
    /// JSON payload (write verbs only)
    pub body: Option<serde_json::Value>,
    /// Headers merged over the instance-level headers
    pub additional_headers: Option<HashMap<String, String>>,
}

impl RequestOptions {
    /// Options targeting the given rest path
    pub fn path(rest_path: impl Into<String>) -> Self {
        Self {
            rest_path: rest_path.into(),
            ..Self::default()
        }
    }

    /// Add a query parameter
    #[must_use]
    pub fn query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query
            .get_or_insert_with(HashMap::new)
            .insert(name.into(), value.into());
        self
    }

    /// Set the JSON payload
    #[must_use]
    pub fn body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Add a per-request header
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.additional_headers
            .get_or_insert_with(HashMap::new)
            .insert(name.into(), value.into());
        self
    }
}

/// Verb-named facade over a pluggable transport adapter
#[derive(Clone)]
pub struct RestClient {
    host: String,
    port: u16,
    headers: HashMap<String, String>,
    adapter: Option<Arc<dyn Adapter>>,
}

impl std::fmt::Debug for RestClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestClient")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("headers", &self.headers.len())
            .field("adapter", &self.adapter.as_ref().map(|a| a.name()))
            .finish()
    }
}

impl RestClient {
    /// Create a client with no adapter bound.
    ///
    /// Every verb operation fails with a missing-method error until an
    /// adapter is set. The host is mandatory: an empty host is a synchronous
    /// configuration error.
    pub fn new(config: ClientConfig) -> ClientResult<Self> {
        if config.host.is_empty() {
            return Err(ClientError::config_error("Host URL is mandatory"));
        }

        info!(
            host = %config.host,
            port = config.port,
            "Created REST client"
        );

        Ok(Self {
            host: config.host,
            port: config.port,
            headers: config.headers,
            adapter: None,
        })
    }

    /// Create a client with an adapter bound from the start
    pub fn with_adapter(config: ClientConfig, adapter: Arc<dyn Adapter>) -> ClientResult<Self> {
        let mut client = Self::new(config)?;
        client.set_adapter(adapter);
        Ok(client)
    }

    /// Bind a new adapter, replacing any current one
    pub fn set_adapter(&mut self, adapter: Arc<dyn Adapter>) {
        debug!(adapter = adapter.name(), "Bound transport adapter");
        self.adapter = Some(adapter);
    }

    /// Unbind the current adapter; verb operations fail until a new one is set
    pub fn remove_adapter(&mut self) {
        debug!("Removed transport adapter");
        self.adapter = None;
    }

    /// Name of the currently bound adapter, if any
    #[must_use]
    pub fn adapter_name(&self) -> Option<&'static str> {
        self.adapter.as_ref().map(|a| a.name())
    }

    /// Target host
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Target port
    #[must_use]
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Instance-level headers applied to every request
    #[must_use]
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Start a batch bound to a handle of this client.
    ///
    /// Queued calls see the adapter bound at the time the batch was created;
    /// swapping the client's adapter afterwards affects later batches only.
    #[must_use]
    pub fn batch(&self) -> RequestBatch {
        RequestBatch::new(self.clone())
    }

    /// OPTIONS request (no query, no body)
    pub async fn options(&self, request: RequestOptions) -> ClientResult<ResponseData> {
        let adapter = self.bound_adapter(Verb::Options)?;
        adapter
            .options(self.transport_request(Verb::Options, request))
            .await
    }

    /// HEAD request
    pub async fn head(&self, request: RequestOptions) -> ClientResult<ResponseData> {
        let adapter = self.bound_adapter(Verb::Head)?;
        adapter
            .head(self.transport_request(Verb::Head, request))
            .await
    }

    /// GET request
    pub async fn get(&self, request: RequestOptions) -> ClientResult<ResponseData> {
        let adapter = self.bound_adapter(Verb::Get)?;
        adapter
            .get(self.transport_request(Verb::Get, request))
            .await
    }

    /// POST request
    pub async fn post(&self, request: RequestOptions) -> ClientResult<ResponseData> {
        let adapter = self.bound_adapter(Verb::Post)?;
        adapter
            .post(self.transport_request(Verb::Post, request))
            .await
    }

    /// PUT request
    pub async fn put(&self, request: RequestOptions) -> ClientResult<ResponseData> {
        let adapter = self.bound_adapter(Verb::Put)?;
        adapter
            .put(self.transport_request(Verb::Put, request))
            .await
    }

    /// DELETE request
    pub async fn delete(&self, request: RequestOptions) -> ClientResult<ResponseData> {
        let adapter = self.bound_adapter(Verb::Delete)?;
        adapter
            .delete(self.transport_request(Verb::Delete, request))
            .await
    }

    /// Dispatch a request for any verb; the batch layer queues through this.
    pub async fn request(&self, verb: Verb, request: RequestOptions) -> ClientResult<ResponseData> {
        match verb {
            Verb::Options => self.options(request).await,
            Verb::Head => self.head(request).await,
            Verb::Get => self.get(request).await,
            Verb::Post => self.post(request).await,
            Verb::Put => self.put(request).await,
            Verb::Delete => self.delete(request).await,
        }
    }

    fn bound_adapter(&self, verb: Verb) -> ClientResult<Arc<dyn Adapter>> {
        self.adapter
            .clone()
            .ok_or(ClientError::MissingAdapterMethod { verb })
    }

    fn transport_request(&self, verb: Verb, request: RequestOptions) -> TransportRequest {
        let RequestOptions {
            rest_path,
            query,
            body,
            additional_headers,
        } = request;

        let mut headers = self.headers.clone();
        if let Some(additional) = additional_headers {
            headers.extend(additional);
        }

        debug!(
            verb = %verb,
            host = %self.host,
            rest_path = %rest_path,
            "Dispatching request"
        );

        TransportRequest {
            host: self.host.clone(),
            port: self.port,
            rest_path,
            headers,
            query: if verb.accepts_query() { query } else { None },
            body: if verb.accepts_body() { body } else { None },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    /// Adapter that echoes the merged request headers back as response headers.
    struct EchoAdapter;

    #[async_trait]
    impl Adapter for EchoAdapter {
        fn name(&self) -> &'static str {
            "echo"
        }

        async fn get(&self, request: TransportRequest) -> ClientResult<ResponseData> {
            Ok(ResponseData {
                status: 200,
                headers: request.headers,
                body: request.body,
            })
        }
    }

    fn config() -> ClientConfig {
        let mut config = ClientConfig::for_host("api.example.com");
        config
            .headers
            .insert("Accept".to_string(), "application/json".to_string());
        config
            .headers
            .insert("X-Tenant".to_string(), "base".to_string());
        config
    }

    #[test]
    fn test_empty_host_is_a_construction_error() {
        let result = RestClient::new(ClientConfig::default());
        match result {
            Err(ClientError::ConfigError(message)) => {
                assert_eq!(message, "Host URL is mandatory");
            }
            other => panic!("expected config error, got {other:?}"),
        }
    }

    #[test]
    fn test_default_port_applies() {
        let client = RestClient::new(ClientConfig::for_host("api.example.com")).unwrap();
        assert_eq!(client.port(), 443);
        assert_eq!(client.host(), "api.example.com");
    }

    #[tokio::test]
    async fn test_no_adapter_fails_with_verb_specific_error() {
        let client = RestClient::new(config()).unwrap();
        for verb in Verb::ALL {
            let error = client
                .request(verb, RequestOptions::default())
                .await
                .unwrap_err();
            match error {
                ClientError::MissingAdapterMethod { verb: reported } => {
                    assert_eq!(reported, verb);
                }
                other => panic!("unexpected error for {verb}: {other}"),
            }
        }
    }

    #[tokio::test]
    async fn test_additional_headers_merge_over_instance_headers() {
        let client = RestClient::with_adapter(config(), Arc::new(EchoAdapter)).unwrap();

        let response = client
            .get(
                RequestOptions::path("v1/items")
                    .header("X-Tenant", "override")
                    .header("X-Request-Id", "42"),
            )
            .await
            .unwrap();

        assert_eq!(response.headers["Accept"], "application/json");
        assert_eq!(response.headers["X-Tenant"], "override");
        assert_eq!(response.headers["X-Request-Id"], "42");
    }

    #[tokio::test]
    async fn test_adapter_hot_swap() {
        let mut client = RestClient::new(config()).unwrap();
        assert!(client.adapter_name().is_none());

        client.set_adapter(Arc::new(EchoAdapter));
        assert_eq!(client.adapter_name(), Some("echo"));
        assert!(client.get(RequestOptions::default()).await.is_ok());

        client.remove_adapter();
        let error = client.get(RequestOptions::default()).await.unwrap_err();
        assert!(error.is_missing_adapter_method());
    }

    #[tokio::test]
    async fn test_body_dropped_for_read_verbs() {
        let client = RestClient::with_adapter(config(), Arc::new(EchoAdapter)).unwrap();

        let response = client
            .get(RequestOptions::path("v1/items").body(serde_json::json!({"k": "v"})))
            .await
            .unwrap();

        assert_eq!(response.body, None);
    }
}
