// crates/network/src/client.rs
//! Blocking HTTP client implementing [`Transport`]

use crate::adapter::{AdapterConfig, RequestBody, StreamingAdapter};
use crate::error::{NetworkError, NetworkResult};
use crate::transport::{ChunkHandler, OutgoingBody, Transport, TransportRequest, TransportResponse};
use bodystream_core::{SharedReader, SharedStream, Stream};
use bytes::Bytes;
use reqwest::blocking::{Body, Client as ReqwestClient};
use reqwest::{Method, Url};
use std::io::Read;
use std::time::Duration;

/// Default size of the pieces a response body is handed out in
pub const DEFAULT_CHUNK_SIZE: usize = 16 * 1024;

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Time allowed to establish a connection
    pub connect_timeout: Duration,
    /// Deadline for the whole exchange, body included. `None` lets a
    /// throttled transfer take as long as its rate requires.
    pub timeout: Option<Duration>,
    /// User agent string
    pub user_agent: String,
    /// Maximum redirects to follow
    pub max_redirects: usize,
    /// Response chunk size in bytes
    pub chunk_size: usize,
    /// Honour proxy settings from the environment
    pub use_proxy: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(30),
            timeout: None,
            user_agent: format!("bodystream/{}", env!("CARGO_PKG_VERSION")),
            max_redirects: 10,
            chunk_size: DEFAULT_CHUNK_SIZE,
            use_proxy: true,
        }
    }
}

/// HTTP client
#[derive(Clone)]
pub struct Client {
    inner: ReqwestClient,
    config: ClientConfig,
}

impl Client {
    /// Creates a new client with default configuration
    pub fn new() -> NetworkResult<Self> {
        Self::with_config(ClientConfig::default())
    }

    /// Creates a new client with custom configuration
    pub fn with_config(config: ClientConfig) -> NetworkResult<Self> {
        if config.chunk_size == 0 {
            return Err(NetworkError::Custom("chunk size must be positive".to_string()));
        }

        let mut builder = ReqwestClient::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects));
        if !config.use_proxy {
            builder = builder.no_proxy();
        }
        let client = builder.build().map_err(NetworkError::Http)?;

        Ok(Self {
            inner: client,
            config,
        })
    }

    /// Gets the client configuration
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }
}

impl Transport for Client {
    fn execute(
        &mut self,
        request: TransportRequest,
        body: OutgoingBody,
        on_chunk: Option<&mut ChunkHandler<'_>>,
    ) -> NetworkResult<TransportResponse> {
        let url = Url::parse(&request.url)
            .map_err(|e| NetworkError::InvalidUrl(format!("{}: {}", request.url, e)))?;

        let mut builder = self.inner.request(request.method, url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        builder = match body {
            OutgoingBody::Empty => builder,
            OutgoingBody::Buffered(bytes) => builder.body(bytes),
            OutgoingBody::Streamed(stream) => {
                let len = stream.size_hint();
                let reader = SharedReader::new(stream);
                match len {
                    Some(len) => builder.body(Body::sized(reader, len)),
                    None => builder.body(Body::new(reader)),
                }
            }
        };

        let mut response = builder.send()?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        log::debug!("{} {}", status, response.url());

        let body = match on_chunk {
            Some(handler) => {
                let mut buf = vec![0u8; self.config.chunk_size];
                loop {
                    let n = response.read(&mut buf)?;
                    if n == 0 {
                        break;
                    }
                    handler(&buf[..n])?;
                }
                Bytes::new()
            }
            None => response.bytes()?,
        };

        Ok(TransportResponse {
            status,
            headers,
            body,
        })
    }
}

/// A transport paired with a streaming adapter
pub struct StreamingClient<T = Client> {
    transport: T,
    adapter: StreamingAdapter,
}

impl StreamingClient<Client> {
    /// Builds a reqwest-backed streaming client
    pub fn new(config: ClientConfig, adapter: AdapterConfig) -> NetworkResult<Self> {
        Ok(Self::with_transport(Client::with_config(config)?, adapter))
    }
}

impl<T: Transport> StreamingClient<T> {
    pub fn with_transport(transport: T, adapter: AdapterConfig) -> Self {
        Self {
            transport,
            adapter: StreamingAdapter::new(adapter),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Sends `request` through the adapter
    pub fn request(
        &mut self,
        request: TransportRequest,
        body: RequestBody,
        sink: Option<&mut dyn Stream>,
        on_chunk: Option<&mut ChunkHandler<'_>>,
    ) -> NetworkResult<TransportResponse> {
        self.adapter
            .request(&mut self.transport, request, body, sink, on_chunk)
    }

    /// GETs `url`, writing the response body into `sink`
    pub fn download(&mut self, url: &str, sink: &mut dyn Stream) -> NetworkResult<TransportResponse> {
        log::info!("Downloading {}", url);
        self.request(TransportRequest::get(url), RequestBody::Empty, Some(sink), None)
    }

    /// Sends `body` to `url`, buffering the (usually small) response
    pub fn upload(
        &mut self,
        method: Method,
        url: &str,
        body: SharedStream,
    ) -> NetworkResult<TransportResponse> {
        log::info!("Uploading to {}", url);
        self.request(
            TransportRequest::new(method, url),
            RequestBody::Stream(body),
            None,
            None,
        )
    }
}
