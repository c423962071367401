//! Forwarding-chain bookkeeping (`X-Forwarded-For`).

use std::net::IpAddr;

use axum::http::{HeaderMap, HeaderName, HeaderValue};

pub const X_FORWARDED_FOR: HeaderName = HeaderName::from_static("x-forwarded-for");

/// Append a client address to an existing forwarding chain.
pub fn client_chain(existing: Option<&str>, client: &str) -> String {
    match existing {
        Some(prior) if !prior.is_empty() => format!("{prior}, {client}"),
        _ => client.to_string(),
    }
}

/// Record the connecting client on the outbound request's
/// `X-Forwarded-For` header. Multiple pre-existing values are collapsed
/// into one comma-separated chain before the client IP is appended.
/// Request direction only.
pub fn annotate(headers: &mut HeaderMap, client_ip: IpAddr) {
    let prior = headers
        .get_all(X_FORWARDED_FOR)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .collect::<Vec<_>>()
        .join(", ");

    let chain = client_chain(
        (!prior.is_empty()).then_some(prior.as_str()),
        &client_ip.to_string(),
    );
    if let Ok(value) = HeaderValue::from_str(&chain) {
        headers.insert(X_FORWARDED_FOR, value);
    }
}
