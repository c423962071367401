//! Streaming response relay with trailer delivery.
//!
//! # Responsibilities
//! - Re-announce the backend's declared trailer names before the body
//! - Forward body frames incrementally, never buffering the whole body
//! - Deliver the backend's trailer fields once its body stream ends,
//!   filtered to the announced names
//!
//! # Design Decisions
//! - The sequencing the protocol requires (trailers only after the body)
//!   falls out of the frame stream: a trailer frame can only arrive after
//!   the last data frame
//! - Mid-stream upstream errors are reported to the sink and propagated;
//!   the status line is already on the wire, so the stream just ends

use std::pin::Pin;
use std::sync::Arc;
use std::task::{ready, Context, Poll};

use axum::body::Body;
use axum::http::header::{self, HeaderMap, HeaderName, HeaderValue};
use http_body::{Body as HttpBody, Frame, SizeHint};
use hyper::body::Bytes;

use crate::proxy::error::ProxyError;
use crate::proxy::sink::ErrorSink;

/// Trailer field names a message declares via its `Trailer` header.
pub fn trailer_names(headers: &HeaderMap) -> Vec<HeaderName> {
    headers
        .get_all(header::TRAILER)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .filter_map(|name| HeaderName::from_bytes(name.as_bytes()).ok())
        .collect()
}

/// Declare `names` on the outgoing `Trailer` header. No-op when empty.
pub fn announce_trailers(headers: &mut HeaderMap, names: &[HeaderName]) {
    if names.is_empty() {
        return;
    }
    let joined = names
        .iter()
        .map(HeaderName::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    if let Ok(value) = HeaderValue::from_str(&joined) {
        headers.insert(header::TRAILER, value);
    }
}

/// Body adaptor that relays an upstream body to the client.
///
/// Data frames pass through untouched; the trailer frame is filtered to
/// the announced names (undeclared trailers are dropped, declared but
/// never sent ones simply yield nothing).
pub struct TrailerRelay {
    upstream: Body,
    announced: Vec<HeaderName>,
    error_sink: Arc<dyn ErrorSink>,
}

impl TrailerRelay {
    pub fn new(upstream: Body, announced: Vec<HeaderName>, error_sink: Arc<dyn ErrorSink>) -> Self {
        Self {
            upstream,
            announced,
            error_sink,
        }
    }

    fn filter_trailers(&self, trailers: HeaderMap) -> HeaderMap {
        let mut kept = HeaderMap::new();
        for (name, value) in trailers.iter() {
            if self.announced.contains(name) {
                kept.append(name.clone(), value.clone());
            }
        }
        kept
    }
}

impl HttpBody for TrailerRelay {
    type Data = Bytes;
    type Error = ProxyError;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        let this = self.get_mut();
        loop {
            return match ready!(Pin::new(&mut this.upstream).poll_frame(cx)) {
                None => Poll::Ready(None),
                Some(Ok(frame)) => match frame.into_trailers() {
                    Ok(trailers) => {
                        if this.announced.is_empty() {
                            continue;
                        }
                        Poll::Ready(Some(Ok(Frame::trailers(this.filter_trailers(trailers)))))
                    }
                    Err(frame) => Poll::Ready(Some(Ok(frame))),
                },
                Some(Err(error)) => {
                    let error = ProxyError::Stream(error);
                    this.error_sink.report(&error);
                    Poll::Ready(Some(Err(error)))
                }
            };
        }
    }

    fn is_end_stream(&self) -> bool {
        self.upstream.is_end_stream()
    }

    fn size_hint(&self) -> SizeHint {
        self.upstream.size_hint()
    }
}
