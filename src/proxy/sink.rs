//! Error reporting sink.
//!
//! Sink writes are best-effort diagnostics; they are never part of the
//! request's success or failure contract.

use crate::proxy::error::ProxyError;

/// Destination for proxy failure reports.
pub trait ErrorSink: Send + Sync {
    fn report(&self, error: &ProxyError);
}

/// Default sink: a structured log line through tracing.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl ErrorSink for LogSink {
    fn report(&self, error: &ProxyError) {
        tracing::error!(error = %error, "proxy request failed");
    }
}
