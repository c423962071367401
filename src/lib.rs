//! Single-backend HTTP reverse proxy.
//!
//! Accepts an inbound request, rewrites it against the configured backend
//! origin, forwards it, and relays the response (status, headers,
//! streamed body and trailers) back to the client, with correct
//! hop-by-hop header and forwarding-chain semantics.

pub mod config;
pub mod http;
pub mod observability;
pub mod proxy;

pub use config::ProxyConfig;
pub use http::HttpServer;
pub use proxy::ProxyEngine;
