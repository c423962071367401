//! HTTP hosting subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, connect info)
//!     → proxy engine (full forwarding cycle)
//!     → response streamed back to the client
//! ```

pub mod server;

pub use server::HttpServer;
