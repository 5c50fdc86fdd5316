//! One request/response exchange.
//!
//! An exchange moves through `Built -> Sending -> AwaitingResponse ->
//! ReceivingBody -> Complete`. A failure in any of the middle states moves
//! it to `Faulted` and is reported together with the state it happened in.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use futures::StreamExt;
use http::header::{AUTHORIZATION, CONTENT_LENGTH, CONTENT_TYPE, PROXY_AUTHORIZATION};
use http::{HeaderMap, StatusCode};
use kunai_core::constants::TRANSFER_CHUNK_SIZE;
use kunai_core::trace::TraceSink;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::{ClientError, ClientResult, TransportFailure};
use crate::request::{RequestBody, RequestDescriptor};
use crate::transport::{OutgoingBody, OutgoingRequest, Transport};

/// Progress of an exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExchangeState {
    Built,
    Sending,
    AwaitingResponse,
    ReceivingBody,
    Complete,
    Faulted,
}

impl fmt::Display for ExchangeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Built => "Built",
            Self::Sending => "Sending",
            Self::AwaitingResponse => "AwaitingResponse",
            Self::ReceivingBody => "ReceivingBody",
            Self::Complete => "Complete",
            Self::Faulted => "Faulted",
        };
        f.write_str(name)
    }
}

/// Which response statuses let the exchange continue into the body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusPolicy {
    /// Only 2xx. Anything else fails before the body is read.
    RequireSuccess,
    /// 2xx and 404.
    SuccessOrNotFound,
    /// Every status is handed back to the caller.
    AcceptAny,
}

impl StatusPolicy {
    #[must_use]
    pub fn accepts(self, status: StatusCode) -> bool {
        match self {
            Self::RequireSuccess => status.is_success(),
            Self::SuccessOrNotFound => status.is_success() || status == StatusCode::NOT_FOUND,
            Self::AcceptAny => true,
        }
    }
}

/// Where response body bytes go.
pub enum ResponseSink<'a> {
    /// Bytes are read and dropped.
    Discard,
    /// Bytes are collected in memory.
    Buffer(Vec<u8>),
    /// Bytes are written through as they arrive.
    Writer(&'a mut (dyn AsyncWrite + Unpin + Send)),
    /// Bytes go to a local file, created once the response is accepted.
    File { path: PathBuf, file: Option<File> },
}

impl ResponseSink<'_> {
    /// Creates a sink writing to the file at `path`.
    #[must_use]
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::File {
            path: path.into(),
            file: None,
        }
    }

    /// Returns the collected bytes of a [`ResponseSink::Buffer`].
    #[must_use]
    pub fn into_buffer(self) -> Option<Vec<u8>> {
        match self {
            Self::Buffer(buffer) => Some(buffer),
            Self::Discard | Self::Writer(_) | Self::File { .. } => None,
        }
    }

    async fn write(&mut self, chunk: &[u8]) -> io::Result<()> {
        match self {
            Self::Discard => Ok(()),
            Self::Buffer(buffer) => {
                buffer.extend_from_slice(chunk);
                Ok(())
            }
            Self::Writer(writer) => writer.write_all(chunk).await,
            Self::File { path, file } => open_sink_file(path, file).await?.write_all(chunk).await,
        }
    }

    async fn finish(&mut self) -> io::Result<()> {
        match self {
            Self::Writer(writer) => writer.flush().await,
            Self::File { path, file } => open_sink_file(path, file).await?.flush().await,
            Self::Discard | Self::Buffer(_) => Ok(()),
        }
    }
}

impl fmt::Debug for ResponseSink<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Discard => f.write_str("Discard"),
            Self::Buffer(buffer) => f.debug_tuple("Buffer").field(&buffer.len()).finish(),
            Self::Writer(_) => f.write_str("Writer"),
            Self::File { path, .. } => f.debug_tuple("File").field(path).finish(),
        }
    }
}

/// Response metadata, frozen once the exchange completes.
#[derive(Debug, Clone)]
pub struct ResponseMeta {
    pub status: StatusCode,
    pub headers: HeaderMap,
    /// Declared `Content-Length`.
    pub content_length: Option<u64>,
    pub content_type: Option<String>,
    /// Body bytes actually delivered to the sink.
    pub bytes_received: u64,
    /// Set when the declared length was checked and did not match.
    pub length_mismatch: bool,
}

/// Per-exchange options chosen by the operation.
#[derive(Debug, Clone, Copy)]
pub struct ExchangeOptions {
    pub policy: StatusPolicy,
    /// Compare the declared `Content-Length` with the bytes received.
    pub verify_length: bool,
    /// Copy a buffered response body into the trace.
    pub trace_response_body: bool,
}

/// A single request/response exchange.
pub struct Exchange<'t> {
    request: RequestDescriptor,
    trace: Option<&'t dyn TraceSink>,
    state: ExchangeState,
}

impl<'t> Exchange<'t> {
    #[must_use]
    pub fn new(request: RequestDescriptor, trace: Option<&'t dyn TraceSink>) -> Self {
        Self {
            request,
            trace,
            state: ExchangeState::Built,
        }
    }

    #[must_use]
    pub fn state(&self) -> ExchangeState {
        self.state
    }

    /// ## Summary
    /// Sends the request and streams the response body into `sink`.
    ///
    /// A status rejected by `options.policy` fails the exchange before any
    /// body byte reaches the sink. A `Content-Length` mismatch is logged and
    /// flagged in the returned [`ResponseMeta`] but does not fail.
    ///
    /// ## Errors
    /// Returns [`ClientError::TransportError`] carrying the state the
    /// exchange was in when the connection, the request body, the response
    /// head, the response body or the sink failed.
    #[tracing::instrument(
        skip_all,
        fields(method = %self.request.method, url = %self.request.url)
    )]
    pub async fn run<T: Transport>(
        mut self,
        transport: &T,
        options: ExchangeOptions,
        sink: &mut ResponseSink<'_>,
    ) -> ClientResult<ResponseMeta> {
        self.trace_request();

        let method = self
            .request
            .method
            .to_http()
            .map_err(|e| ClientError::BuildError(format!("invalid method: {e}")))?;
        let bodiless_response = self.request.method.is_bodiless_response();
        let has_body = !self.request.body.is_empty();

        let body = match std::mem::take(&mut self.request.body) {
            RequestBody::Empty => OutgoingBody::Empty,
            RequestBody::Buffer(bytes) => OutgoingBody::Buffer(bytes),
            RequestBody::File(path) => {
                self.enter(ExchangeState::Sending);
                file_body(&path)
                    .await
                    .map_err(|e| self.fault(TransportFailure::Io(e)))?
            }
        };

        self.enter(if has_body {
            ExchangeState::Sending
        } else {
            ExchangeState::AwaitingResponse
        });

        let outgoing = OutgoingRequest {
            method,
            url: self.request.url.clone(),
            headers: self.request.headers.clone(),
            body,
        };

        let response = match transport.send(outgoing).await {
            Ok(response) => response,
            Err(failure) => {
                if has_body && !failure.is_send_failure() {
                    self.state = ExchangeState::AwaitingResponse;
                }
                return Err(self.fault(failure));
            }
        };

        self.enter(ExchangeState::AwaitingResponse);
        self.trace_response_head(response.status, &response.headers);

        if !options.policy.accepts(response.status) {
            tracing::debug!(status = %response.status, "Status rejected");
            return Err(self.fault(TransportFailure::Status(response.status)));
        }

        let status = response.status;
        let headers = response.headers;
        let mut body = response.body;

        self.enter(ExchangeState::ReceivingBody);
        let mut bytes_received: u64 = 0;
        if !bodiless_response {
            while let Some(chunk) = body.next().await {
                let chunk: Bytes = chunk.map_err(|e| self.fault(e))?;
                sink.write(&chunk)
                    .await
                    .map_err(|e| self.fault(TransportFailure::Io(e)))?;
                bytes_received += chunk.len() as u64;
            }
        }
        drop(body);
        sink.finish()
            .await
            .map_err(|e| self.fault(TransportFailure::Io(e)))?;

        let content_length = headers
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok());
        let content_type = headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);

        let length_mismatch = options.verify_length
            && content_length.is_some_and(|declared| declared != bytes_received);
        if length_mismatch {
            tracing::warn!(
                declared = content_length,
                received = bytes_received,
                "Content-Length mismatch"
            );
            self.trace_line(&format!(
                "Content-Length mismatch: declared {}, received {bytes_received}",
                content_length.unwrap_or_default()
            ));
        }

        if options.trace_response_body
            && let ResponseSink::Buffer(buffer) = sink
        {
            self.trace_text(&String::from_utf8_lossy(buffer));
        }

        self.enter(ExchangeState::Complete);

        Ok(ResponseMeta {
            status,
            headers,
            content_length,
            content_type,
            bytes_received,
            length_mismatch,
        })
    }

    fn enter(&mut self, state: ExchangeState) {
        tracing::trace!(from = %self.state, to = %state, "Exchange state");
        self.state = state;
    }

    /// Moves to `Faulted` and reports the state the failure happened in.
    fn fault(&mut self, source: TransportFailure) -> ClientError {
        let state = self.state;
        self.state = ExchangeState::Faulted;
        tracing::debug!(state = %state, error = %source, "Exchange faulted");
        self.trace_line(&format!("Failed in state {state}: {source}"));
        ClientError::TransportError { state, source }
    }

    fn trace_request(&self) {
        if self.trace.is_none() {
            return;
        }
        self.trace_line(&format!("{} {}", self.request.method, self.request.url));
        self.trace_headers(&self.request.headers);
        match &self.request.body {
            RequestBody::Buffer(bytes) => self.trace_text(&String::from_utf8_lossy(bytes)),
            RequestBody::File(path) => self.trace_line(&format!("<file {}>", path.display())),
            RequestBody::Empty => {}
        }
    }

    fn trace_response_head(&self, status: StatusCode, headers: &HeaderMap) {
        if self.trace.is_none() {
            return;
        }
        self.trace_line(&format!(
            "{} {}",
            status.as_u16(),
            status.canonical_reason().unwrap_or_default()
        ));
        self.trace_headers(headers);
    }

    fn trace_headers(&self, headers: &HeaderMap) {
        for (name, value) in headers {
            let value = if name == AUTHORIZATION || name == PROXY_AUTHORIZATION {
                "***"
            } else {
                value.to_str().unwrap_or("<binary>")
            };
            self.trace_line(&format!("{name}: {value}"));
        }
    }

    fn trace_text(&self, text: &str) {
        for line in text.lines() {
            self.trace_line(line);
        }
    }

    fn trace_line(&self, line: &str) {
        if let Some(trace) = self.trace {
            trace.write_line(line);
        }
    }
}

async fn open_sink_file<'f>(path: &Path, file: &'f mut Option<File>) -> io::Result<&'f mut File> {
    if file.is_none() {
        *file = Some(File::create(path).await?);
    }
    file.as_mut()
        .ok_or_else(|| io::Error::other("download file not open"))
}

/// Opens `path` as a streamed body of known length.
async fn file_body(path: &Path) -> io::Result<OutgoingBody> {
    let file = File::open(path).await?;
    let length = file.metadata().await?.len();
    let chunks = futures::stream::try_unfold(file, read_chunk);
    Ok(OutgoingBody::Stream {
        length,
        chunks: Box::pin(chunks),
    })
}

async fn read_chunk(mut file: File) -> io::Result<Option<(Bytes, File)>> {
    let mut buf = vec![0u8; TRANSFER_CHUNK_SIZE];
    let read = file.read(&mut buf).await?;
    if read == 0 {
        return Ok(None);
    }
    buf.truncate(read);
    Ok(Some((Bytes::from(buf), file)))
}
