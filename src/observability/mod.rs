//! Observability subsystem.
//!
//! Structured logging through tracing; per-request HTTP spans come from
//! the server's `TraceLayer`, failures flow through the engine's error
//! sink.

pub mod logging;
