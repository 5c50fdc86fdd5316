//! The operation facade.

use std::path::Path;
use std::sync::Arc;

use bytes::Bytes;
use http::StatusCode;
use kunai_core::config::{ConnectionConfig, normalize_base_path};
use kunai_rfc::rfc::dav::parse::parse_multistatus;
use kunai_rfc::rfc::dav::{Depth, Multistatus, PropfindRequest};
use tokio::io::AsyncWrite;

use crate::entry::Listing;
use crate::error::ClientResult;
use crate::exchange::{Exchange, ResponseMeta, ResponseSink};
use crate::operation::{Operation, UploadSource};
use crate::path;
use crate::request;
use crate::transport::{HttpTransport, Transport};

/// A `WebDAV` client bound to one server configuration.
///
/// Every method performs one independent exchange; calls may run
/// concurrently on a shared client.
#[derive(Debug)]
pub struct Client<T: Transport = HttpTransport> {
    config: Arc<ConnectionConfig>,
    transport: T,
}

impl Client<HttpTransport> {
    /// ## Summary
    /// Creates a client using the reqwest transport.
    ///
    /// ## Errors
    /// Returns [`ClientError::BuildError`](crate::ClientError::BuildError) if the transport cannot be created
    /// from the configuration.
    pub fn new(config: ConnectionConfig) -> ClientResult<Self> {
        let config = config.normalized();
        let transport = HttpTransport::new(&config)?;
        Ok(Self::with_transport(config, transport))
    }

    /// ## Summary
    /// Creates a client from `.env`, the environment and `kunai.toml`.
    ///
    /// ## Errors
    /// Returns an error if the configuration cannot be loaded or the
    /// transport cannot be created.
    pub fn from_env() -> ClientResult<Self> {
        Self::new(kunai_core::config::load_config()?)
    }
}

impl<T: Transport> Client<T> {
    /// Creates a client sending requests through `transport`.
    #[must_use]
    pub fn with_transport(config: ConnectionConfig, transport: T) -> Self {
        Self {
            config: Arc::new(config.normalized()),
            transport,
        }
    }

    #[must_use]
    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// ## Summary
    /// Lists `path` with a `propname` request body.
    ///
    /// `depth` of `None` omits the `Depth` header. The queried collection
    /// itself is not part of the listing.
    ///
    /// ## Errors
    /// Fails if the request cannot be built or sent, if the server answers
    /// with a non-2xx status, or if the body is not a valid multistatus.
    pub async fn list(&self, path: &str, depth: Option<Depth>) -> ClientResult<Listing> {
        self.list_with(path, depth, PropfindRequest::propname()).await
    }

    /// ## Summary
    /// Lists `path` with a caller-chosen PROPFIND body.
    ///
    /// Entries carry lengths, types and modification times when the request
    /// asks for them and the server reports them with a `200` status.
    ///
    /// ## Errors
    /// Same as [`Client::list`].
    pub async fn list_with(
        &self,
        path: &str,
        depth: Option<Depth>,
        request: PropfindRequest,
    ) -> ClientResult<Listing> {
        let root = path::listing_root(&self.config)?;
        let multistatus = self.propfind(path, depth, request).await?;
        Ok(Listing::new(multistatus, root, normalize_base_path(path)))
    }

    /// ## Summary
    /// Runs a PROPFIND and returns the parsed multistatus.
    ///
    /// ## Errors
    /// Returns [`ClientError::TransportError`](crate::ClientError::TransportError) on a non-2xx status,
    /// [`ClientError::ParseError`](crate::ClientError::ParseError) for malformed XML or a missing
    /// `multistatus` root, and [`ClientError::ProtocolError`](crate::ClientError::ProtocolError) for a
    /// `response` without `href`.
    #[tracing::instrument(skip(self, request))]
    pub async fn propfind(
        &self,
        path: &str,
        depth: Option<Depth>,
        request: PropfindRequest,
    ) -> ClientResult<Multistatus> {
        let operation = Operation::PropertyFind { depth, request };
        self.execute(operation, path, ResponseSink::Buffer(Vec::new()), |_, sink| {
            let body = sink.into_buffer().unwrap_or_default();
            Ok(parse_multistatus(&body)?)
        })
        .await
    }

    /// ## Summary
    /// Uploads a local file with `PUT`, streaming it in chunks.
    ///
    /// The server's status is returned as is.
    ///
    /// ## Errors
    /// Fails if the file cannot be read or the exchange fails.
    #[tracing::instrument(skip(self, local_path), fields(local = %local_path.as_ref().display()))]
    pub async fn upload(&self, local_path: impl AsRef<Path>, remote: &str) -> ClientResult<StatusCode> {
        let operation = Operation::Upload {
            source: UploadSource::File(local_path.as_ref().to_path_buf()),
        };
        self.execute(operation, remote, ResponseSink::Discard, |meta, _| Ok(meta.status))
            .await
    }

    /// ## Summary
    /// Uploads an in-memory buffer with `PUT`.
    ///
    /// ## Errors
    /// Fails if the exchange fails.
    #[tracing::instrument(skip(self, bytes))]
    pub async fn upload_bytes(&self, bytes: impl Into<Bytes>, remote: &str) -> ClientResult<StatusCode> {
        let operation = Operation::Upload {
            source: UploadSource::Bytes(bytes.into()),
        };
        self.execute(operation, remote, ResponseSink::Discard, |meta, _| Ok(meta.status))
            .await
    }

    /// ## Summary
    /// Downloads `remote` into a local file.
    ///
    /// The file is only created once the server answered with a 2xx status.
    /// A `Content-Length` mismatch is logged; the received bytes are kept.
    ///
    /// ## Errors
    /// Returns [`ClientError::TransportError`](crate::ClientError::TransportError) on a non-2xx status or when
    /// the body or the file write fails.
    #[tracing::instrument(skip(self, local_path), fields(local = %local_path.as_ref().display()))]
    pub async fn download(&self, remote: &str, local_path: impl AsRef<Path>) -> ClientResult<StatusCode> {
        let sink = ResponseSink::file(local_path.as_ref());
        self.execute(Operation::Download, remote, sink, |meta, _| Ok(meta.status))
            .await
    }

    /// ## Summary
    /// Downloads `remote` into any writer and returns the response metadata.
    ///
    /// ## Errors
    /// Same as [`Client::download`].
    #[tracing::instrument(skip(self, writer))]
    pub async fn download_to(
        &self,
        remote: &str,
        writer: &mut (dyn AsyncWrite + Unpin + Send),
    ) -> ClientResult<ResponseMeta> {
        self.execute(Operation::Download, remote, ResponseSink::Writer(writer), |meta, _| Ok(meta))
            .await
    }

    /// ## Summary
    /// Downloads `remote` into memory.
    ///
    /// ## Errors
    /// Same as [`Client::download`].
    #[tracing::instrument(skip(self))]
    pub async fn download_bytes(&self, remote: &str) -> ClientResult<Bytes> {
        let sink = ResponseSink::Buffer(Vec::new());
        self.execute(Operation::Download, remote, sink, |_, sink| {
            Ok(Bytes::from(sink.into_buffer().unwrap_or_default()))
        })
        .await
    }

    /// ## Summary
    /// Creates a collection with `MKCOL`.
    ///
    /// A collection that already exists usually yields `405`; it is
    /// returned as the status, not as an error.
    ///
    /// ## Errors
    /// Fails only if the exchange itself fails.
    #[tracing::instrument(skip(self))]
    pub async fn create_directory(&self, remote: &str) -> ClientResult<StatusCode> {
        self.execute(Operation::CreateCollection, remote, ResponseSink::Discard, |meta, _| {
            Ok(meta.status)
        })
        .await
    }

    /// ## Summary
    /// Deletes `remote`. A trailing `/` is kept for collections.
    ///
    /// ## Errors
    /// Fails only if the exchange itself fails.
    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, remote: &str) -> ClientResult<StatusCode> {
        self.execute(Operation::Delete, remote, ResponseSink::Discard, |meta, _| Ok(meta.status))
            .await
    }

    /// ## Summary
    /// Checks whether `remote` exists with `HEAD`.
    ///
    /// ## Errors
    /// Any status other than 2xx or 404, and any transport failure, is an error.
    #[tracing::instrument(skip(self))]
    pub async fn exists(&self, remote: &str) -> ClientResult<bool> {
        let result = self
            .execute(Operation::Exists, remote, ResponseSink::Discard, |meta, _| {
                Ok(meta.status.is_success())
            })
            .await;

        match result {
            Err(err) if err.status() == Some(StatusCode::NOT_FOUND) => {
                tracing::debug!("Not found reported as transport error");
                Ok(false)
            }
            other => other,
        }
    }

    /// Runs one operation against `path` and hands the outcome to `interpret`.
    async fn execute<'w, R, F>(
        &self,
        operation: Operation,
        path: &str,
        mut sink: ResponseSink<'w>,
        interpret: F,
    ) -> ClientResult<R>
    where
        F: FnOnce(ResponseMeta, ResponseSink<'w>) -> ClientResult<R>,
    {
        let url = path::resolve(&self.config, path, operation.append_trailing_slash(path))?;
        let (body, upload_file) = operation.body()?;
        let request = request::build(
            &self.config,
            operation.method(),
            url,
            &operation.headers(),
            body,
            upload_file,
            operation.content_type(),
        )?;

        let meta = Exchange::new(request, self.config.trace.as_deref())
            .run(&self.transport, operation.options(), &mut sink)
            .await?;

        tracing::debug!(
            method = %operation.method(),
            status = %meta.status,
            bytes = meta.bytes_received,
            "Operation complete"
        );

        interpret(meta, sink)
    }
}
