//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check the origin is an absolute http(s) URI
//! - Check extra hop-by-hop names are valid header names
//! - Validate value ranges (timeouts > 0, bind address parses)
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Validation is a pure function of the config
//! - Runs before the config is accepted into the system

use std::net::SocketAddr;

use axum::http::{HeaderName, Uri};
use thiserror::Error;

use crate::config::schema::ProxyConfig;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("listener.bind_address {0:?} is not a valid socket address")]
    BindAddress(String),

    #[error("upstream.origin {0:?} is not an absolute http(s) URI")]
    Origin(String),

    #[error("forwarding.extra_hop_headers entry {0:?} is not a valid header name")]
    HopHeader(String),

    #[error("timeouts.{0} must be greater than zero")]
    Timeout(&'static str),
}

/// Parse and check the configured backend origin.
pub fn parse_origin(origin: &str) -> Result<Uri, ValidationError> {
    let uri: Uri = origin
        .parse()
        .map_err(|_| ValidationError::Origin(origin.to_string()))?;
    let scheme_ok = matches!(uri.scheme_str(), Some("http") | Some("https"));
    if !scheme_ok || uri.authority().is_none() {
        return Err(ValidationError::Origin(origin.to_string()));
    }
    Ok(uri)
}

/// Parse the configured extra hop-by-hop names.
pub fn parse_hop_headers(names: &[String]) -> Result<Vec<HeaderName>, ValidationError> {
    names
        .iter()
        .map(|name| {
            HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| ValidationError::HopHeader(name.clone()))
        })
        .collect()
}

/// Validate a loaded configuration, collecting every problem found.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if let Err(error) = parse_origin(&config.upstream.origin) {
        errors.push(error);
    }

    for name in &config.forwarding.extra_hop_headers {
        if HeaderName::from_bytes(name.as_bytes()).is_err() {
            errors.push(ValidationError::HopHeader(name.clone()));
        }
    }

    if config.timeouts.connect_secs == 0 {
        errors.push(ValidationError::Timeout("connect_secs"));
    }
    if config.timeouts.dispatch_secs == 0 {
        errors.push(ValidationError::Timeout("dispatch_secs"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(validate_config(&ProxyConfig::default()).is_ok());
    }

    #[test]
    fn collects_every_error() {
        let mut config = ProxyConfig::default();
        config.listener.bind_address = "not-an-address".into();
        config.upstream.origin = "ftp://backend".into();
        config.forwarding.extra_hop_headers = vec!["bad header".into()];
        config.timeouts.dispatch_secs = 0;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
    }

    #[test]
    fn origin_requires_authority() {
        assert!(parse_origin("http://127.0.0.1:3000/base?sta=tic").is_ok());
        assert!(parse_origin("/relative/path").is_err());
        assert!(parse_origin("backend:3000").is_err());
    }
}
