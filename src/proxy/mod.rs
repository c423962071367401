//! Forwarding engine subsystem.
//!
//! # Data Flow
//! ```text
//! inbound request
//!     → director.rs (target URI rewrite)
//!     → headers.rs (hop-by-hop + Connection-token strip)
//!     → forwarded.rs (X-Forwarded-For annotation)
//!     → transport.rs (outbound dispatch)
//!     → headers.rs again (response-direction strip)
//!     → relay.rs (streamed body + trailers)
//!     → client
//! ```
//!
//! # Design Decisions
//! - The caller's inbound request is lent read-only; the engine derives
//!   its own outbound copy and never writes back
//! - Transport, director and error sink are injected capabilities, so
//!   the engine owns protocol semantics and nothing else

pub mod director;
pub mod engine;
pub mod error;
pub mod forwarded;
pub mod headers;
pub mod relay;
pub mod sink;
pub mod transport;

pub use director::{Director, OriginDirector};
pub use engine::ProxyEngine;
pub use error::ProxyError;
pub use headers::HopHeaders;
pub use sink::{ErrorSink, LogSink};
pub use transport::{HyperTransport, Transport, TransportError};
