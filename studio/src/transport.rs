//! HTTP transport for the generate endpoint.
//!
//! The transport's whole job is to turn a [`GenerationRequest`] into a byte
//! stream; it does not decode or interpret the bytes. A trait seam lets
//! tests substitute scripted chunk sequences for the network.

use std::time::Duration;

use bytes::Bytes;
use futures::TryStreamExt;
use futures::stream::BoxStream;

use crate::session::GenerationRequest;

const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Errors crossing the transport boundary.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The request could not be made at all.
    #[error("request failed: {0}")]
    Request(String),

    /// The server answered with a non-success status before streaming.
    #[error("server returned status {status}: {body}")]
    Status { status: u16, body: String },

    /// The body stream failed mid-read.
    #[error("stream read failed: {0}")]
    Read(String),
}

/// The chunked response body. Chunk boundaries are arbitrary and carry no
/// meaning.
pub type ByteStream = BoxStream<'static, Result<Bytes, TransportError>>;

/// Capability to open one generation stream per request.
#[async_trait::async_trait]
pub trait GenerationTransport: Send + Sync {
    /// # Errors
    ///
    /// Fails before yielding any byte when the request cannot be made or the
    /// server rejects it.
    async fn stream_generate(&self, request: &GenerationRequest) -> Result<ByteStream, TransportError>;
}

/// Production transport against a running relay server.
pub struct HttpTransport {
    http: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(base_url: &str) -> Result<Self, TransportError> {
        // Connect timeout only: a healthy generation stream can legitimately
        // run for minutes, so no overall request timeout.
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()
            .map_err(|e| TransportError::Request(e.to_string()))?;
        Ok(Self { http, base_url: base_url.trim_end_matches('/').to_string() })
    }
}

#[async_trait::async_trait]
impl GenerationTransport for HttpTransport {
    async fn stream_generate(&self, request: &GenerationRequest) -> Result<ByteStream, TransportError> {
        let url = format!("{}/api/generate", self.base_url);
        let response = self
            .http
            .post(url)
            .json(request)
            .send()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::Status { status: status.as_u16(), body });
        }

        Ok(Box::pin(
            response
                .bytes_stream()
                .map_err(|e| TransportError::Read(e.to_string())),
        ))
    }
}
