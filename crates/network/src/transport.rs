// crates/network/src/transport.rs
//! The narrow contract the streaming adapter needs from an HTTP client

use crate::error::{NetworkError, NetworkResult};
use bodystream_core::SharedStream;
use bytes::Bytes;
use reqwest::Method;
use std::io;

/// Consumes one chunk of a response body
pub type ChunkHandler<'a> = dyn FnMut(&[u8]) -> io::Result<()> + 'a;

/// Request metadata; the body travels separately
#[derive(Debug, Clone)]
pub struct TransportRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
}

impl TransportRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn put(url: impl Into<String>) -> Self {
        Self::new(Method::PUT, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::POST, url)
    }

    /// Adds a header
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// How the request body reaches the transport
#[derive(Debug)]
pub enum OutgoingBody {
    /// No body
    Empty,
    /// Fully buffered in memory
    Buffered(Bytes),
    /// Pulled incrementally from a stream
    Streamed(SharedStream),
}

impl OutgoingBody {
    pub fn is_streamed(&self) -> bool {
        matches!(self, OutgoingBody::Streamed(_))
    }
}

/// Status, headers and (unless it was handed to a chunk handler) the body
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    /// Empty when the body was delivered chunk by chunk
    pub body: Bytes,
}

impl TransportResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// First value of the named header, compared case-insensitively
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Declared body length, if the server sent one
    pub fn content_length(&self) -> Option<u64> {
        self.header("content-length").and_then(|v| v.trim().parse().ok())
    }

    /// Turns a non-success status into [`NetworkError::Status`]
    pub fn error_for_status(self) -> NetworkResult<Self> {
        if self.is_success() {
            return Ok(self);
        }
        let reason = reqwest::StatusCode::from_u16(self.status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or("Unknown")
            .to_string();
        Err(NetworkError::Status {
            status: self.status,
            reason,
        })
    }
}

/// Performs one request/response exchange.
///
/// When `on_chunk` is given the response body must be delivered through it, in
/// order, and the returned body left empty. Errors from the handler abort the
/// exchange and are returned as [`NetworkError::Io`].
pub trait Transport {
    fn execute(
        &mut self,
        request: TransportRequest,
        body: OutgoingBody,
        on_chunk: Option<&mut ChunkHandler<'_>>,
    ) -> NetworkResult<TransportResponse>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn execute(
        &mut self,
        request: TransportRequest,
        body: OutgoingBody,
        on_chunk: Option<&mut ChunkHandler<'_>>,
    ) -> NetworkResult<TransportResponse> {
        (**self).execute(request, body, on_chunk)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: u16) -> TransportResponse {
        TransportResponse {
            status,
            headers: vec![("Content-Length".to_string(), "42".to_string())],
            body: Bytes::new(),
        }
    }

    #[test]
    fn test_request_builders() {
        let req = TransportRequest::put("http://example.invalid/a").header("x-amz-acl", "private");
        assert_eq!(req.method, Method::PUT);
        assert_eq!(req.headers, vec![("x-amz-acl".to_string(), "private".to_string())]);
        assert_eq!(TransportRequest::get("u").method, Method::GET);
        assert_eq!(TransportRequest::post("u").method, Method::POST);
    }

    #[test]
    fn test_header_lookup_ignores_case() {
        let res = response(200);
        assert_eq!(res.header("content-length"), Some("42"));
        assert_eq!(res.content_length(), Some(42));
        assert_eq!(res.header("etag"), None);
    }

    #[test]
    fn test_error_for_status() {
        assert!(response(204).error_for_status().is_ok());

        match response(404).error_for_status() {
            Err(NetworkError::Status { status, reason }) => {
                assert_eq!(status, 404);
                assert_eq!(reason, "Not Found");
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_outgoing_body_kind() {
        assert!(!OutgoingBody::Empty.is_streamed());
        assert!(!OutgoingBody::Buffered(Bytes::from_static(b"x")).is_streamed());
    }
}
