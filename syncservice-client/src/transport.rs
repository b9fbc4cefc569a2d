//! Transport abstraction.
//!
//! The client only needs "execute one request, hand back status and body".
//! [`HttpTransport`] provides that on top of `reqwest`; tests and embedders can
//! plug in their own [`Transport`].

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult, TransportError};
use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use futures::future;
use futures::stream::{self, BoxStream, StreamExt, TryStreamExt};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Body, Certificate, Client, Method, RequestBuilder, StatusCode, Url};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tokio::time::Instant;
use tracing::debug;

const UPLOAD_CHUNK_SIZE: usize = 64 * 1024;

/// Streamed request body.
pub type UploadStream = BoxStream<'static, Result<Bytes, std::io::Error>>;

/// Streamed response body. Dropping it releases the underlying connection.
pub type ResponseStream = BoxStream<'static, Result<Bytes, TransportError>>;

/// Body of an outgoing request.
pub enum RequestBody {
    Empty,
    /// Serialized JSON document.
    Json(Bytes),
    /// Raw payload sent as `application/octet-stream`.
    Bytes(Bytes),
    /// Raw payload streamed as `application/octet-stream`.
    Stream(UploadStream),
}

impl RequestBody {
    /// Serializes `value` into a JSON body.
    pub fn json<T: serde::Serialize + ?Sized>(value: &T) -> Result<Self, TransportError> {
        Ok(RequestBody::Json(Bytes::from(serde_json::to_vec(value)?)))
    }

    /// Streams `file` in fixed-size chunks.
    pub fn file(file: tokio::fs::File) -> Self {
        let chunks = stream::try_unfold(file, |mut file| async move {
            let mut buf = BytesMut::with_capacity(UPLOAD_CHUNK_SIZE);
            let read = file.read_buf(&mut buf).await?;
            Ok::<_, std::io::Error>((read > 0).then(|| (buf.freeze(), file)))
        });
        RequestBody::Stream(chunks.boxed())
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, RequestBody::Empty)
    }
}

impl fmt::Debug for RequestBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestBody::Empty => f.write_str("Empty"),
            RequestBody::Json(b) => write!(f, "Json({} bytes)", b.len()),
            RequestBody::Bytes(b) => write!(f, "Bytes({} bytes)", b.len()),
            RequestBody::Stream(_) => f.write_str("Stream"),
        }
    }
}

/// A fully resolved request, relative to the transport's base URL.
#[derive(Debug)]
pub struct TransportRequest {
    pub method: Method,
    /// Absolute path starting with `/api/v1`.
    pub path: String,
    pub query: Vec<(&'static str, String)>,
    pub body: RequestBody,
}

/// Status and streamed body of a completed exchange.
pub struct TransportResponse {
    status: StatusCode,
    body: ResponseStream,
}

impl TransportResponse {
    pub fn new(status: StatusCode, body: ResponseStream) -> Self {
        Self { status, body }
    }

    /// Builds a response with an in-memory body.
    pub fn from_bytes(status: StatusCode, body: impl Into<Bytes>) -> Self {
        let body = body.into();
        Self::new(
            status,
            stream::once(async move { Ok::<_, TransportError>(body) }).boxed(),
        )
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Drains the body into memory.
    pub async fn bytes(self) -> Result<Bytes, TransportError> {
        let mut body = self.body;
        let mut buf = BytesMut::new();
        while let Some(chunk) = body.try_next().await? {
            buf.extend_from_slice(&chunk);
        }
        Ok(buf.freeze())
    }

    /// Drains the body as UTF-8 text, replacing invalid sequences.
    pub async fn text(self) -> Result<String, TransportError> {
        let bytes = self.bytes().await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    pub fn into_stream(self) -> ResponseStream {
        self.body
    }
}

impl fmt::Debug for TransportResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransportResponse")
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

/// Executes one HTTP exchange.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: TransportRequest)
    -> Result<TransportResponse, TransportError>;
}

/// A step applied to every outgoing request, such as authentication or a
/// user-supplied hook.
pub trait RequestDecorator: Send + Sync {
    fn decorate(&self, request: RequestBuilder) -> RequestBuilder;
}

impl<F> RequestDecorator for F
where
    F: Fn(RequestBuilder) -> RequestBuilder + Send + Sync,
{
    fn decorate(&self, request: RequestBuilder) -> RequestBuilder {
        self(request)
    }
}

/// HTTP Basic authentication with the application key and secret.
#[derive(Clone)]
pub struct BasicAuth {
    app_key: String,
    app_secret: String,
}

impl BasicAuth {
    pub fn new(app_key: impl Into<String>, app_secret: impl Into<String>) -> Self {
        Self {
            app_key: app_key.into(),
            app_secret: app_secret.into(),
        }
    }
}

impl fmt::Debug for BasicAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicAuth")
            .field("app_key", &self.app_key)
            .field("app_secret", &"<redacted>")
            .finish()
    }
}

impl RequestDecorator for BasicAuth {
    fn decorate(&self, request: RequestBuilder) -> RequestBuilder {
        request.basic_auth(&self.app_key, Some(&self.app_secret))
    }
}

/// `reqwest`-backed transport.
pub struct HttpTransport {
    client: Client,
    base_url: String,
    decorators: Vec<Arc<dyn RequestDecorator>>,
    write_timeout: Option<Duration>,
}

impl HttpTransport {
    /// Builds the HTTP client described by `config`.
    ///
    /// The configuration is expected to be validated already; TLS material
    /// that fails to parse is still reported as a configuration error.
    pub fn from_config(config: &ClientConfig) -> ClientResult<Self> {
        let base_url = config.base_url()?;
        let mut builder = Client::builder();

        if let Some(timeout) = config.connect_timeout() {
            builder = builder.connect_timeout(timeout);
        }
        if let Some(timeout) = config.read_timeout() {
            builder = builder.read_timeout(timeout);
        }
        if let Some(pem) = &config.ca_certificate_pem {
            let cert = Certificate::from_pem(pem.as_bytes())
                .map_err(|e| ClientError::Config(format!("invalid CA certificate: {e}")))?;
            builder = builder.add_root_certificate(cert);
        }
        if config.accept_invalid_hostnames {
            builder = builder.danger_accept_invalid_hostnames(true);
        }

        let client = builder
            .build()
            .map_err(|e| ClientError::Config(format!("failed to create HTTP client: {e}")))?;

        let mut decorators: Vec<Arc<dyn RequestDecorator>> = Vec::new();
        if let Some(auth) = config.credentials() {
            decorators.push(Arc::new(auth));
        }
        if let Some(interceptor) = &config.interceptor {
            decorators.push(interceptor.decorator());
        }

        Ok(Self {
            client,
            base_url: trim_base(&base_url),
            decorators,
            write_timeout: config.write_timeout(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// Fails an upload that stalls for longer than `timeout`.
///
/// The clock covers producing each chunk and the gap until the connection
/// asks for the next one, which is how long the previous chunk took to
/// write. Waiting for the response afterwards is not covered.
fn with_write_timeout(body: UploadStream, timeout: Duration) -> UploadStream {
    stream::try_unfold((body, None::<Instant>), move |(mut body, last_sent)| async move {
        if last_sent.is_some_and(|sent| sent.elapsed() > timeout) {
            return Err(write_timed_out(timeout));
        }
        match tokio::time::timeout(timeout, body.try_next()).await {
            Ok(Ok(Some(chunk))) => Ok(Some((chunk, (body, Some(Instant::now()))))),
            Ok(Ok(None)) => Ok(None),
            Ok(Err(e)) => Err(e),
            Err(_) => Err(write_timed_out(timeout)),
        }
    })
    .boxed()
}

fn write_timed_out(timeout: Duration) -> std::io::Error {
    std::io::Error::new(
        std::io::ErrorKind::TimedOut,
        format!("upload stalled for more than {timeout:?}"),
    )
}

fn trim_base(url: &Url) -> String {
    url.as_str().trim_end_matches('/').to_string()
}

impl fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpTransport")
            .field("base_url", &self.base_url)
            .field("decorators", &self.decorators.len())
            .field("write_timeout", &self.write_timeout)
            .finish()
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(
        &self,
        request: TransportRequest,
    ) -> Result<TransportResponse, TransportError> {
        let url = format!("{}{}", self.base_url, request.path);
        let mut builder = self.client.request(request.method, &url);

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }

        builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(body) => builder.header(CONTENT_TYPE, "application/json").body(body),
            RequestBody::Bytes(body) => {
                let builder = builder.header(CONTENT_TYPE, "application/octet-stream");
                match self.write_timeout {
                    None => builder.body(body),
                    Some(timeout) => {
                        let chunk = stream::once(future::ready(Ok::<_, std::io::Error>(body)));
                        builder.body(Body::wrap_stream(with_write_timeout(chunk.boxed(), timeout)))
                    }
                }
            }
            RequestBody::Stream(body) => {
                let body = match self.write_timeout {
                    None => body,
                    Some(timeout) => with_write_timeout(body, timeout),
                };
                builder
                    .header(CONTENT_TYPE, "application/octet-stream")
                    .body(Body::wrap_stream(body))
            }
        };

        for decorator in &self.decorators {
            builder = decorator.decorate(builder);
        }

        let response = builder.send().await?;
        let status = response.status();
        debug!("{} answered {}", url, status);

        Ok(TransportResponse::new(
            status,
            response.bytes_stream().map_err(TransportError::from).boxed(),
        ))
    }
}
