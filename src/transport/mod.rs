//! # Transport Abstraction
//!
//! Defines the adapter seam between the verb facade and whatever actually
//! moves bytes. An [`Adapter`] exposes one method per HTTP verb, each taking
//! the same uniform request bundle; every method has a default body that
//! fails with [`ClientError::MissingAdapterMethod`], so an implementation
//! overrides only the verbs it supports and the facade treats the rest as
//! unsupported. Adapters are swapped at runtime through
//! [`RestClient::set_adapter`](crate::client::RestClient::set_adapter).

use std::collections::HashMap;
use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{ClientError, ClientResult};

pub mod reqwest;

pub use self::reqwest::{ReqwestAdapter, ReqwestAdapterConfig};

/// The closed set of HTTP verbs an adapter can support.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Verb {
    Options,
    Head,
    Get,
    Post,
    Put,
    Delete,
}

impl Verb {
    /// Every verb the facade dispatches, in wire-name order.
    pub const ALL: [Verb; 6] = [
        Verb::Options,
        Verb::Head,
        Verb::Get,
        Verb::Post,
        Verb::Put,
        Verb::Delete,
    ];

    /// Wire name of the verb.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Verb::Options => "OPTIONS",
            Verb::Head => "HEAD",
            Verb::Get => "GET",
            Verb::Post => "POST",
            Verb::Put => "PUT",
            Verb::Delete => "DELETE",
        }
    }

    /// Whether the verb carries a request body.
    #[must_use]
    pub fn accepts_body(&self) -> bool {
        matches!(self, Verb::Post | Verb::Put)
    }

    /// Whether the verb carries query parameters.
    #[must_use]
    pub fn accepts_query(&self) -> bool {
        matches!(self, Verb::Head | Verb::Get | Verb::Delete)
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Uniform parameter bundle handed to every adapter verb method.
///
/// Headers arrive already merged (instance headers overlaid with the
/// per-request `additional_headers`). `query` and `body` are only populated
/// for verbs that accept them.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    /// Target host, without scheme (e.g. "api.example.com")
    pub host: String,
    /// Target port
    pub port: u16,
    /// Path segment appended to the host (e.g. "v1/items")
    pub rest_path: String,
    /// Merged request headers
    pub headers: HashMap<String, String>,
    /// Query parameters, for verbs that accept them
    pub query: Option<HashMap<String, String>>,
    /// JSON payload, for write verbs
    pub body: Option<serde_json::Value>,
}

/// Transport-level response, normalized across adapters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseData {
    /// HTTP status code
    pub status: u16,
    /// Response headers
    pub headers: HashMap<String, String>,
    /// Decoded JSON body, if the response carried one
    pub body: Option<serde_json::Value>,
}

impl ResponseData {
    /// Whether the status code is in the 2xx range.
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Pluggable transport capability set.
///
/// One method per verb; the default bodies reject with the verb-specific
/// missing-method error before any network interaction, so a partial adapter
/// is a valid adapter.
#[async_trait]
pub trait Adapter: Send + Sync {
    /// Adapter name for debugging/logging.
    fn name(&self) -> &'static str;

    async fn options(&self, request: TransportRequest) -> ClientResult<ResponseData> {
        let _ = request;
        Err(ClientError::missing_adapter_method(Verb::Options))
    }

    async fn head(&self, request: TransportRequest) -> ClientResult<ResponseData> {
        let _ = request;
        Err(ClientError::missing_adapter_method(Verb::Head))
    }

    async fn get(&self, request: TransportRequest) -> ClientResult<ResponseData> {
        let _ = request;
        Err(ClientError::missing_adapter_method(Verb::Get))
    }

    async fn post(&self, request: TransportRequest) -> ClientResult<ResponseData> {
        let _ = request;
        Err(ClientError::missing_adapter_method(Verb::Post))
    }

    async fn put(&self, request: TransportRequest) -> ClientResult<ResponseData> {
        let _ = request;
        Err(ClientError::missing_adapter_method(Verb::Put))
    }

    async fn delete(&self, request: TransportRequest) -> ClientResult<ResponseData> {
        let _ = request;
        Err(ClientError::missing_adapter_method(Verb::Delete))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verb_set_is_closed_and_ordered() {
        assert_eq!(Verb::ALL.len(), 6);
        let names: Vec<&str> = Verb::ALL.iter().map(Verb::as_str).collect();
        assert_eq!(names, ["OPTIONS", "HEAD", "GET", "POST", "PUT", "DELETE"]);
    }

    #[test]
    fn test_verb_payload_rules() {
        assert!(Verb::Post.accepts_body());
        assert!(Verb::Put.accepts_body());
        assert!(!Verb::Get.accepts_body());
        assert!(Verb::Get.accepts_query());
        assert!(Verb::Delete.accepts_query());
        assert!(!Verb::Options.accepts_query());
    }

    #[test]
    fn test_response_success_range() {
        let response = ResponseData {
            status: 204,
            headers: HashMap::new(),
            body: None,
        };
        assert!(response.is_success());

        let response = ResponseData {
            status: 404,
            headers: HashMap::new(),
            body: None,
        };
        assert!(!response.is_success());
    }

    struct EmptyAdapter;

    #[async_trait]
    impl Adapter for EmptyAdapter {
        fn name(&self) -> &'static str {
            "empty"
        }
    }

    #[tokio::test]
    async fn test_default_methods_reject_with_specific_verb() {
        let adapter = EmptyAdapter;
        let request = TransportRequest {
            host: "localhost".to_string(),
            port: 443,
            rest_path: String::new(),
            headers: HashMap::new(),
            query: None,
            body: None,
        };

        let error = adapter.put(request).await.unwrap_err();
        match error {
            ClientError::MissingAdapterMethod { verb } => assert_eq!(verb, Verb::Put),
            other => panic!("unexpected error: {other}"),
        }
    }
}
