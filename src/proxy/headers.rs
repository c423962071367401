//! Hop-by-hop header registry and header transfer.
//!
//! # Responsibilities
//! - Keep the set of connection-scoped header names that never cross a hop
//! - Resolve the per-message `Connection` token list into extra exclusions
//! - Copy header multi-maps between messages without touching the source
//!
//! # Design Decisions
//! - The registry is immutable after construction and carried per engine
//!   instance, so two engines (or two tests) can extend it independently
//! - `http::HeaderName` canonicalizes to lowercase, which gives us
//!   case-insensitive exact-name matching for free

use std::collections::HashSet;

use axum::http::header::{self, HeaderMap, HeaderName};

/// Legacy field some clients send; never standard, never forwarded.
pub const PROXY_CONNECTION: HeaderName = HeaderName::from_static("proxy-connection");

/// Connection-scoped headers that are consumed by each hop.
///
/// `trailer` is the real announcement field; the look-alike `trailers`
/// is an ordinary end-to-end header and is deliberately not listed.
const BASE_HOP_HEADERS: [HeaderName; 8] = [
    header::CONNECTION,
    HeaderName::from_static("keep-alive"),
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
];

/// Registry of hop-by-hop header names.
///
/// Holds the standard set plus any per-instance extensions registered at
/// construction time. Read-only while the engine is serving.
#[derive(Debug, Clone, Default)]
pub struct HopHeaders {
    extra: Vec<HeaderName>,
}

impl HopHeaders {
    /// The standard registry, with no extensions.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry extended with additional field names.
    pub fn with_extra(names: impl IntoIterator<Item = HeaderName>) -> Self {
        Self {
            extra: names.into_iter().collect(),
        }
    }

    /// Whether `name` is consumed by this hop rather than forwarded.
    pub fn is_hop_by_hop(&self, name: &HeaderName) -> bool {
        BASE_HOP_HEADERS.contains(name) || self.extra.contains(name)
    }

    /// Full exclusion set for one message: the registry plus whatever the
    /// message's own `Connection` header names for this hop only.
    pub fn exclusion_for(&self, headers: &HeaderMap) -> HashSet<HeaderName> {
        let mut excluded: HashSet<HeaderName> = BASE_HOP_HEADERS
            .iter()
            .chain(self.extra.iter())
            .cloned()
            .collect();
        excluded.extend(connection_tokens(headers));
        excluded
    }
}

/// Header names listed in a message's `Connection` header.
///
/// Tokens are comma-separated; surrounding whitespace is trimmed and empty
/// or malformed tokens are dropped. An absent header yields an empty list.
pub fn connection_tokens(headers: &HeaderMap) -> Vec<HeaderName> {
    headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .filter_map(|token| HeaderName::from_bytes(token.as_bytes()).ok())
        .collect()
}

/// Append every non-excluded (name, value) pair of `src` to `dst`.
///
/// Order and multiplicity are preserved: a header occurring twice arrives
/// as two values. Only `dst` is mutated.
pub fn copy_headers(dst: &mut HeaderMap, src: &HeaderMap, excluded: &HashSet<HeaderName>) {
    for (name, value) in src.iter() {
        if !excluded.contains(name) {
            dst.append(name.clone(), value.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn base_registry_matches_canonical_names() {
        let hop = HopHeaders::new();
        assert!(hop.is_hop_by_hop(&header::CONNECTION));
        assert!(hop.is_hop_by_hop(&HeaderName::from_static("keep-alive")));
        assert!(hop.is_hop_by_hop(&header::TRANSFER_ENCODING));
        assert!(hop.is_hop_by_hop(&header::UPGRADE));
        // The announcement field is hop-by-hop, the look-alike is not.
        assert!(hop.is_hop_by_hop(&header::TRAILER));
        assert!(!hop.is_hop_by_hop(&HeaderName::from_static("trailers")));
        assert!(!hop.is_hop_by_hop(&header::CONTENT_TYPE));
    }

    #[test]
    fn mixed_case_lookups_match() {
        let hop = HopHeaders::new();
        let name = HeaderName::from_bytes(b"Keep-Alive").unwrap();
        assert!(hop.is_hop_by_hop(&name));
    }

    #[test]
    fn extensions_are_per_instance() {
        let fake = HeaderName::from_static("x-fake-hop-header");
        let extended = HopHeaders::with_extra([fake.clone()]);
        assert!(extended.is_hop_by_hop(&fake));

        let plain = HopHeaders::new();
        assert!(!plain.is_hop_by_hop(&fake));
    }

    #[test]
    fn connection_tokens_split_and_trim() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONNECTION,
            HeaderValue::from_static("Upgrade,  x-fake-connection-token , ,close"),
        );
        let tokens = connection_tokens(&headers);
        assert_eq!(
            tokens,
            vec![
                header::UPGRADE,
                HeaderName::from_static("x-fake-connection-token"),
                HeaderName::from_static("close"),
            ]
        );
    }

    #[test]
    fn connection_tokens_absent_header() {
        assert!(connection_tokens(&HeaderMap::new()).is_empty());
    }

    #[test]
    fn copy_preserves_multiplicity_and_skips_excluded() {
        let mut src = HeaderMap::new();
        src.append("x-multi-value", HeaderValue::from_static("foo"));
        src.append("x-multi-value", HeaderValue::from_static("bar"));
        src.insert(header::UPGRADE, HeaderValue::from_static("websocket"));

        let hop = HopHeaders::new();
        let excluded = hop.exclusion_for(&src);

        let mut dst = HeaderMap::new();
        copy_headers(&mut dst, &src, &excluded);

        let values: Vec<_> = dst.get_all("x-multi-value").iter().collect();
        assert_eq!(values, vec!["foo", "bar"]);
        assert!(dst.get(header::UPGRADE).is_none());

        // The source is untouched.
        assert_eq!(src.len(), 3);
        assert!(src.get(header::UPGRADE).is_some());
    }

    #[test]
    fn exclusion_includes_connection_tokens() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONNECTION,
            HeaderValue::from_static("X-Fake-Connection-Token"),
        );
        let excluded = HopHeaders::new().exclusion_for(&headers);
        assert!(excluded.contains(&HeaderName::from_static("x-fake-connection-token")));
        assert!(excluded.contains(&header::CONNECTION));
    }
}
