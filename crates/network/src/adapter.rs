// crates/network/src/adapter.rs
//! Streaming adapter for HTTP exchanges
//!
//! Decides, per request, whether the body and the response sink are streams
//! and wires chunked transfer through a [`Transport`] accordingly.

use crate::error::{NetworkError, NetworkResult};
use crate::transport::{ChunkHandler, OutgoingBody, Transport, TransportRequest, TransportResponse};
use bodystream_core::{SharedStream, Stream};
use bytes::Bytes;

/// Adapter configuration
#[derive(Debug, Clone, Copy, Default)]
pub struct AdapterConfig {
    /// Log a notice whenever a request or response is streamed
    pub debug: bool,
}

impl AdapterConfig {
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}

/// A request body as supplied by the caller
#[derive(Debug, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    /// In-memory payload, sent as is
    Bytes(Bytes),
    /// Payload pulled from a stream
    Stream(SharedStream),
}

impl From<Bytes> for RequestBody {
    fn from(bytes: Bytes) -> Self {
        RequestBody::Bytes(bytes)
    }
}

impl From<Vec<u8>> for RequestBody {
    fn from(bytes: Vec<u8>) -> Self {
        RequestBody::Bytes(Bytes::from(bytes))
    }
}

impl From<&'static str> for RequestBody {
    fn from(text: &'static str) -> Self {
        RequestBody::Bytes(Bytes::from_static(text.as_bytes()))
    }
}

impl From<SharedStream> for RequestBody {
    fn from(stream: SharedStream) -> Self {
        RequestBody::Stream(stream)
    }
}

/// Routes stream arguments of a request through a transport
#[derive(Debug, Clone, Default)]
pub struct StreamingAdapter {
    config: AdapterConfig,
}

impl StreamingAdapter {
    pub fn new(config: AdapterConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AdapterConfig {
        &self.config
    }

    /// Performs one exchange.
    ///
    /// An explicit `on_chunk` handler always receives the response body and
    /// leaves `sink` untouched. Otherwise a writable `sink` is rewound (unless
    /// it is stdout or cannot rewind) and receives every chunk in order.
    /// A stream body is rewound and sent incrementally; a body stream that
    /// cannot be read fails with [`NetworkError::Unsupported`] before the
    /// transport is called.
    pub fn request<T: Transport + ?Sized>(
        &self,
        transport: &mut T,
        request: TransportRequest,
        body: RequestBody,
        sink: Option<&mut dyn Stream>,
        on_chunk: Option<&mut ChunkHandler<'_>>,
    ) -> NetworkResult<TransportResponse> {
        let body = self.prepare_body(body)?;

        let mut forward_to_sink;
        let handler: Option<&mut ChunkHandler<'_>> = match (on_chunk, sink) {
            (Some(callback), sink) => {
                if sink.is_some() {
                    log::trace!("chunk handler supplied, leaving response sink alone");
                }
                Some(callback)
            }
            (None, Some(sink)) if sink.capabilities().write => {
                self.notice("Response using streaming");
                if sink.capabilities().rewind && !sink.is_stdout() {
                    sink.rewind()?;
                }
                forward_to_sink = move |chunk: &[u8]| sink.write_all(chunk);
                Some(&mut forward_to_sink)
            }
            (None, Some(_)) => {
                log::warn!("response sink is not writable, buffering response");
                None
            }
            (None, None) => None,
        };

        transport.execute(request, body, handler)
    }

    fn prepare_body(&self, body: RequestBody) -> NetworkResult<OutgoingBody> {
        match body {
            RequestBody::Empty => Ok(OutgoingBody::Empty),
            RequestBody::Bytes(bytes) => Ok(OutgoingBody::Buffered(bytes)),
            RequestBody::Stream(mut stream) => {
                if !stream.capabilities().read {
                    return Err(NetworkError::Unsupported(
                        "request body stream is not readable".to_string(),
                    ));
                }
                self.notice("Request using streaming");
                if stream.capabilities().rewind {
                    stream.rewind()?;
                }
                Ok(OutgoingBody::Streamed(stream))
            }
        }
    }

    fn notice(&self, message: &str) {
        if self.config.debug {
            log::debug!("{}", message);
        }
    }
}
