//! Proxy orchestration.
//!
//! # Responsibilities
//! - Derive the outbound request from the inbound one without ever
//!   writing to the caller's request
//! - Strip hop-by-hop and `Connection`-named headers in both directions
//! - Record the forwarding chain and dispatch through the transport
//! - Relay status, headers, streamed body and trailers back to the client
//!
//! # Design Decisions
//! - All engine state is fixed at construction and shared read-only
//!   across concurrently handled requests; per-request data lives on the
//!   task's own stack
//! - `handle` never fails outward: failures become client-visible
//!   statuses and a report to the error sink

use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{request, HeaderName, Request, Response};
use tracing::debug;

use crate::config::loader::ConfigError;
use crate::config::schema::ProxyConfig;
use crate::config::validation;
use crate::proxy::director::{Director, OriginDirector};
use crate::proxy::error::ProxyError;
use crate::proxy::forwarded;
use crate::proxy::headers::{self, HopHeaders, PROXY_CONNECTION};
use crate::proxy::relay::{self, TrailerRelay};
use crate::proxy::sink::{ErrorSink, LogSink};
use crate::proxy::transport::{HyperTransport, Transport};

/// Single-backend forwarding engine.
///
/// Safe to invoke concurrently; each call runs exactly one
/// request/response cycle.
pub struct ProxyEngine {
    director: Arc<dyn Director>,
    transport: Arc<dyn Transport>,
    error_sink: Arc<dyn ErrorSink>,
    hop_headers: HopHeaders,
}

impl ProxyEngine {
    pub fn new(director: Arc<dyn Director>, transport: Arc<dyn Transport>) -> Self {
        Self {
            director,
            transport,
            error_sink: Arc::new(LogSink),
            hop_headers: HopHeaders::new(),
        }
    }

    /// Replace the default tracing-backed error sink.
    pub fn with_error_sink(mut self, sink: Arc<dyn ErrorSink>) -> Self {
        self.error_sink = sink;
        self
    }

    /// Register additional hop-by-hop header names for this instance.
    pub fn with_extra_hop_headers(mut self, names: impl IntoIterator<Item = HeaderName>) -> Self {
        self.hop_headers = HopHeaders::with_extra(names);
        self
    }

    /// Build an engine for the configured backend origin, using the
    /// pooled hyper transport.
    pub fn from_config(config: &ProxyConfig) -> Result<Self, ConfigError> {
        let origin = validation::parse_origin(&config.upstream.origin)
            .map_err(|error| ConfigError::Validation(vec![error]))?;
        let extra = validation::parse_hop_headers(&config.forwarding.extra_hop_headers)
            .map_err(|error| ConfigError::Validation(vec![error]))?;

        let transport = HyperTransport::new(
            std::time::Duration::from_secs(config.timeouts.connect_secs),
            std::time::Duration::from_secs(config.timeouts.dispatch_secs),
        );

        Ok(Self::new(Arc::new(OriginDirector::new(origin)), Arc::new(transport))
            .with_extra_hop_headers(extra))
    }

    /// Run one full proxy cycle for an inbound request.
    pub async fn handle(&self, request: Request<Body>, client_addr: SocketAddr) -> Response<Body> {
        match self.proxy(request, client_addr).await {
            Ok(response) => response,
            Err(error) => {
                self.error_sink.report(&error);
                failure_response(&error)
            }
        }
    }

    async fn proxy(
        &self,
        request: Request<Body>,
        client_addr: SocketAddr,
    ) -> Result<Response<Body>, ProxyError> {
        let (parts, body) = request.into_parts();

        let outbound = self.build_outbound(&parts, client_addr)?;
        debug!(
            method = %outbound.method,
            target = %outbound.uri,
            "dispatching upstream"
        );

        let upstream = self
            .transport
            .perform(Request::from_parts(outbound, body))
            .await?;
        debug!(status = %upstream.status(), "upstream responded");

        Ok(self.relay_response(upstream))
    }

    /// Derive the outbound request head from the inbound one.
    ///
    /// Takes the inbound parts by shared reference: the caller's request
    /// is never written to, only its header multi-map is deep-copied.
    fn build_outbound(
        &self,
        inbound: &request::Parts,
        client_addr: SocketAddr,
    ) -> Result<request::Parts, ProxyError> {
        let target = self
            .director
            .rewrite(&inbound.uri)
            .map_err(ProxyError::Route)?;

        let (mut outbound, ()) = Request::new(()).into_parts();
        outbound.method = inbound.method.clone();
        outbound.uri = target;

        // Host survives the copy (it is not hop-by-hop); the HTTP version
        // stays at the transport's discretion.
        let excluded = self.hop_headers.exclusion_for(&inbound.headers);
        headers::copy_headers(&mut outbound.headers, &inbound.headers, &excluded);
        outbound.headers.remove(PROXY_CONNECTION);

        forwarded::annotate(&mut outbound.headers, client_addr.ip());

        Ok(outbound)
    }

    /// Sanitize the upstream response and wire up the streaming relay.
    fn relay_response(&self, upstream: Response<Body>) -> Response<Body> {
        let (parts, body) = upstream.into_parts();

        let announced = relay::trailer_names(&parts.headers);
        let excluded = self.hop_headers.exclusion_for(&parts.headers);

        let (mut client, ()) = Response::new(()).into_parts();
        client.status = parts.status;
        headers::copy_headers(&mut client.headers, &parts.headers, &excluded);
        // The raw Trailer header was hop-stripped above; re-announce the
        // declared names so the client can expect them.
        relay::announce_trailers(&mut client.headers, &announced);

        let body = TrailerRelay::new(body, announced, Arc::clone(&self.error_sink));
        Response::from_parts(client, Body::new(body))
    }
}

fn failure_response(error: &ProxyError) -> Response<Body> {
    let status = error.status();
    let body = Body::from(format!(
        "{}\n",
        status.canonical_reason().unwrap_or("proxy failure")
    ));
    let mut response = Response::new(body);
    *response.status_mut() = status;
    response
}
