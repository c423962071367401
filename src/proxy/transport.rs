//! Outbound transport capability.
//!
//! # Design Decisions
//! - The engine only ever sees the `Transport` trait; the hyper client is
//!   one implementation, and tests substitute their own
//! - The dispatch timeout covers the wait for the upstream's status and
//!   headers, not the body stream that follows; long-lived streams stay up
//! - Protocol selection (HTTP/1.1 vs HTTP/2) belongs to the transport

use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response};
use hyper_util::client::legacy::{connect::HttpConnector, Client};
use hyper_util::rt::TokioExecutor;
use thiserror::Error;
use tokio::time::timeout;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("upstream request failed: {0}")]
    Http(#[from] hyper_util::client::legacy::Error),

    #[error("upstream did not respond within {0:?}")]
    Timeout(Duration),
}

/// Capability to perform one outbound request.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn perform(&self, request: Request<Body>) -> Result<Response<Body>, TransportError>;
}

/// Pooled hyper client with connect and dispatch timeouts.
pub struct HyperTransport {
    client: Client<HttpConnector, Body>,
    dispatch_timeout: Duration,
}

impl HyperTransport {
    pub fn new(connect_timeout: Duration, dispatch_timeout: Duration) -> Self {
        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(connect_timeout));

        let client = Client::builder(TokioExecutor::new()).build(connector);

        Self {
            client,
            dispatch_timeout,
        }
    }
}

#[async_trait]
impl Transport for HyperTransport {
    async fn perform(&self, request: Request<Body>) -> Result<Response<Body>, TransportError> {
        match timeout(self.dispatch_timeout, self.client.request(request)).await {
            Ok(Ok(response)) => Ok(response.map(Body::new)),
            Ok(Err(error)) => Err(TransportError::Http(error)),
            Err(_) => Err(TransportError::Timeout(self.dispatch_timeout)),
        }
    }
}
