//! # Acorn Client
//!
//! Pluggable REST client facade with request batching.
//!
//! A [`RestClient`] exposes one operation per HTTP verb and delegates each to
//! an interchangeable transport [`Adapter`]. The batch layer queues verb
//! calls for deferred joint settling: [`batch::settle`] waits for every
//! queued operation to terminate (failures become data, never aggregate
//! errors) and [`batch::bifurcate`] splits the outcome records into success
//! and error buckets.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use acorn_client::{ClientConfig, RequestOptions, RestClient};
//! use acorn_client::transport::{ReqwestAdapter, ReqwestAdapterConfig};
//!
//! # async fn example() -> acorn_client::ClientResult<()> {
//! let adapter = Arc::new(ReqwestAdapter::new(ReqwestAdapterConfig::default())?);
//! let client = RestClient::with_adapter(ClientConfig::for_host("api.example.com"), adapter)?;
//!
//! // Single-request fast path
//! let item = client.get(RequestOptions::path("v1/items/7")).await?;
//!
//! // Batched path: queue now, settle together
//! let mut batch = client.batch();
//! batch
//!     .get(RequestOptions::path("v1/items/8"))
//!     .get(RequestOptions::path("v1/items/9"));
//! let report = batch.drain().await;
//! # let _ = (item, report);
//! # Ok(())
//! # }
//! ```

pub mod batch;
pub mod client;
pub mod config;
pub mod error;
pub mod transport;

// Re-export commonly used types for convenience
pub use batch::{bifurcate, settle, BatchOutcome, DrainReport, Outcome, RequestBatch};
pub use client::{RequestOptions, RestClient};
pub use config::{ClientConfig, DEFAULT_HTTPS_PORT};
pub use error::{ClientError, ClientResult};
pub use transport::{Adapter, ResponseData, TransportRequest, Verb};
