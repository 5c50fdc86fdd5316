//! The HTTP boundary.
//!
//! A [`Transport`] opens a connection, streams the request body out and
//! hands back the status, headers and a body stream. Any HTTP client that
//! can do that is substitutable; [`HttpTransport`] is the reqwest one.

mod native;

use std::future::Future;
use std::io;

use bytes::Bytes;
use futures::stream::BoxStream;
use http::{HeaderMap, Method, StatusCode};
use reqwest::Url;

use crate::error::TransportFailure;

pub use native::HttpTransport;

/// Request body as seen by the transport.
pub enum OutgoingBody {
    Empty,
    Buffer(Bytes),
    /// A body of known length produced chunk by chunk.
    Stream {
        length: u64,
        chunks: BoxStream<'static, io::Result<Bytes>>,
    },
}

impl OutgoingBody {
    /// Returns the body length, if known.
    #[must_use]
    pub fn len(&self) -> u64 {
        match self {
            Self::Empty => 0,
            Self::Buffer(bytes) => bytes.len() as u64,
            Self::Stream { length, .. } => *length,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for OutgoingBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => f.write_str("Empty"),
            Self::Buffer(bytes) => f.debug_tuple("Buffer").field(&bytes.len()).finish(),
            Self::Stream { length, .. } => f.debug_struct("Stream").field("length", length).finish_non_exhaustive(),
        }
    }
}

/// A request handed to a [`Transport`].
#[derive(Debug)]
pub struct OutgoingRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: OutgoingBody,
}

/// Status, headers and the still-unread body of a response.
pub struct IncomingResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: BoxStream<'static, Result<Bytes, TransportFailure>>,
}

impl std::fmt::Debug for IncomingResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IncomingResponse")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

/// Executes one HTTP request.
pub trait Transport: Send + Sync {
    /// ## Summary
    /// Sends `request` and resolves once the response head has arrived.
    ///
    /// The response body is not read; it is returned as a stream.
    ///
    /// ## Errors
    /// Returns a [`TransportFailure`] if the connection cannot be opened,
    /// the request body cannot be sent, or no response head arrives.
    fn send(
        &self,
        request: OutgoingRequest,
    ) -> impl Future<Output = Result<IncomingResponse, TransportFailure>> + Send;
}
