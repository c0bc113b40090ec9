// crates/network/src/lib.rs
//! HTTP exchanges with streamed request bodies and response sinks

mod adapter;
mod client;
mod error;
mod transport;

pub use adapter::{AdapterConfig, RequestBody, StreamingAdapter};
pub use client::{Client, ClientConfig, StreamingClient, DEFAULT_CHUNK_SIZE};
pub use error::{NetworkError, NetworkResult};
pub use reqwest::Method;
pub use transport::{ChunkHandler, OutgoingBody, Transport, TransportRequest, TransportResponse};
