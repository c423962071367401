//! Proxy failure taxonomy.
//!
//! Three classes, matching where in the cycle they can occur:
//! - routing: no valid target could be produced, nothing was sent
//! - dispatch: the upstream transport failed, nothing reached the client
//! - stream: the relay broke after the status and headers were committed,
//!   so the only remaining option is terminating the stream

use axum::http::StatusCode;
use thiserror::Error;

use crate::proxy::transport::TransportError;

#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("request routing failed: {0}")]
    Route(#[source] axum::http::Error),

    #[error("upstream dispatch failed: {0}")]
    Dispatch(#[from] TransportError),

    #[error("response stream interrupted: {0}")]
    Stream(#[source] axum::Error),
}

impl ProxyError {
    /// Client-visible status for failures that happen before any byte is
    /// written. 502 for routing and dispatch failures, 504 when the
    /// transport reports its own deadline expired.
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::Dispatch(TransportError::Timeout(_)) => StatusCode::GATEWAY_TIMEOUT,
            _ => StatusCode::BAD_GATEWAY,
        }
    }
}
