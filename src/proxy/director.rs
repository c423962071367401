//! Target rewriting: inbound request URI onto the backend origin.
//!
//! # Design Decisions
//! - Queries are joined as raw strings, never re-parsed into key/value
//!   pairs, so duplicate keys and encoding quirks from either side survive
//! - Paths are joined with a single slash regardless of which side
//!   contributes it

use axum::http::uri::{self, Uri};

/// Maps an inbound request URI to the outbound target URI.
///
/// The engine takes this as a trait object so callers can route
/// dynamically; most deployments use [`OriginDirector`].
pub trait Director: Send + Sync {
    fn rewrite(&self, inbound: &Uri) -> Result<Uri, axum::http::Error>;
}

/// Director for a single fixed backend origin.
///
/// The origin may carry its own base path and query; both are combined
/// with the inbound request's path and query.
#[derive(Debug, Clone)]
pub struct OriginDirector {
    origin: Uri,
}

impl OriginDirector {
    pub fn new(origin: Uri) -> Self {
        Self { origin }
    }
}

impl Director for OriginDirector {
    fn rewrite(&self, inbound: &Uri) -> Result<Uri, axum::http::Error> {
        let path = join_paths(self.origin.path(), inbound.path());
        let query = join_queries(self.origin.query(), inbound.query());

        let path_and_query = if query.is_empty() {
            path
        } else {
            format!("{path}?{query}")
        };

        let mut parts = uri::Parts::default();
        parts.scheme = self.origin.scheme().cloned();
        parts.authority = self.origin.authority().cloned();
        parts.path_and_query = Some(path_and_query.parse::<uri::PathAndQuery>()?);
        Ok(Uri::from_parts(parts)?)
    }
}

/// Join two URL paths with exactly one slash between them.
fn join_paths(base: &str, req: &str) -> String {
    match (base.ends_with('/'), req.starts_with('/')) {
        (true, true) => format!("{}{}", base, &req[1..]),
        (false, false) => format!("{}/{}", base, req),
        _ => format!("{}{}", base, req),
    }
}

/// Concatenate two raw query strings, in their original encoded form.
fn join_queries(base: Option<&str>, req: Option<&str>) -> String {
    let base = base.unwrap_or("");
    let req = req.unwrap_or("");
    match (base.is_empty(), req.is_empty()) {
        (false, false) => format!("{base}&{req}"),
        (false, true) => base.to_string(),
        (true, _) => req.to_string(),
    }
}
