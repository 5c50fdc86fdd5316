//! In-memory transport for unit tests.

use std::collections::VecDeque;
use std::io;
use std::sync::Mutex;

use bytes::Bytes;
use futures::{TryStreamExt, stream};
use http::header::{CONTENT_LENGTH, HeaderName, HeaderValue};
use http::{HeaderMap, Method, StatusCode};
use reqwest::Url;

use crate::error::TransportFailure;
use crate::transport::{IncomingResponse, OutgoingBody, OutgoingRequest, Transport};

/// A canned response.
pub struct Scripted {
    status: StatusCode,
    headers: HeaderMap,
    body: Vec<u8>,
    broken_body: bool,
    refuse: bool,
}

impl Scripted {
    /// Responds with `status` and `body`, declaring the body length.
    pub fn ok(status: u16, body: &[u8]) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_LENGTH, HeaderValue::from(body.len()));
        Self {
            status: StatusCode::from_u16(status).unwrap(),
            headers,
            body: body.to_vec(),
            broken_body: false,
            refuse: false,
        }
    }

    /// Fails to connect.
    pub fn fail() -> Self {
        Self {
            refuse: true,
            ..Self::ok(200, b"")
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.insert(
            HeaderName::from_bytes(name.as_bytes()).unwrap(),
            HeaderValue::from_str(value).unwrap(),
        );
        self
    }

    /// Delivers the body and then a connection reset.
    pub fn broken_body(mut self) -> Self {
        self.broken_body = true;
        self
    }
}

/// A request as the mock saw it.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
    pub declared_length: u64,
}

impl Recorded {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// Replays scripted responses in order and records every request.
#[derive(Default)]
pub struct MockTransport {
    script: Mutex<VecDeque<Scripted>>,
    requests: Mutex<Vec<Recorded>>,
}

impl MockTransport {
    pub fn new(script: Vec<Scripted>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> Recorded {
        self.requests().pop().unwrap()
    }
}

impl Transport for MockTransport {
    async fn send(&self, request: OutgoingRequest) -> Result<IncomingResponse, TransportFailure> {
        let declared_length = request.body.len();
        let body = match request.body {
            OutgoingBody::Empty => Vec::new(),
            OutgoingBody::Buffer(bytes) => bytes.to_vec(),
            OutgoingBody::Stream { chunks, .. } => {
                let chunks: Vec<Bytes> = chunks.try_collect().await?;
                chunks.concat()
            }
        };
        self.requests.lock().unwrap().push(Recorded {
            method: request.method,
            url: request.url,
            headers: request.headers,
            body,
            declared_length,
        });

        let scripted = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| io::Error::other("no scripted response left"))?;
        if scripted.refuse {
            return Err(io::Error::from(io::ErrorKind::ConnectionRefused).into());
        }

        let mut chunks: Vec<Result<Bytes, TransportFailure>> = vec![Ok(Bytes::from(scripted.body))];
        if scripted.broken_body {
            chunks.push(Err(io::Error::from(io::ErrorKind::ConnectionReset).into()));
        }

        Ok(IncomingResponse {
            status: scripted.status,
            headers: scripted.headers,
            body: Box::pin(stream::iter(chunks)),
        })
    }
}
