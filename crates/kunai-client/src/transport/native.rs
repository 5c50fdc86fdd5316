//! reqwest-backed transport.

use futures::TryStreamExt;
use http::header::CONTENT_LENGTH;
use kunai_core::config::{ConnectionConfig, ProxySetting};

use super::{IncomingResponse, OutgoingBody, OutgoingRequest, Transport};
use crate::error::{ClientError, ClientResult, TransportFailure};

/// Sends requests through a [`reqwest::Client`].
///
/// Proxy selection, TLS validation and the timeout are fixed when the
/// transport is created and apply to this instance only.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// ## Summary
    /// Creates a transport configured from `config`.
    ///
    /// ## Errors
    /// Returns [`ClientError::BuildError`] if the proxy URL is invalid or the
    /// underlying client cannot be created.
    pub fn new(config: &ConnectionConfig) -> ClientResult<Self> {
        let mut builder = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .danger_accept_invalid_certs(config.accept_invalid_certs);

        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }

        builder = match &config.proxy {
            ProxySetting::System => builder,
            ProxySetting::Direct => builder.no_proxy(),
            ProxySetting::Url(url) => {
                let mut proxy = reqwest::Proxy::all(url.as_str())
                    .map_err(|e| ClientError::BuildError(format!("invalid proxy {url:?}: {e}")))?;
                if let (Some(user), Some(password)) = (&config.proxy_user, &config.proxy_password) {
                    proxy = proxy.basic_auth(user, password);
                }
                builder.proxy(proxy)
            }
        };

        let client = builder
            .build()
            .map_err(|e| ClientError::BuildError(format!("cannot create HTTP client: {e}")))?;

        Ok(Self { client })
    }

    /// Wraps an existing client.
    #[must_use]
    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Transport for HttpTransport {
    async fn send(&self, request: OutgoingRequest) -> Result<IncomingResponse, TransportFailure> {
        let OutgoingRequest {
            method,
            url,
            mut headers,
            body,
        } = request;

        let body = match body {
            OutgoingBody::Empty => None,
            OutgoingBody::Buffer(bytes) => Some(reqwest::Body::from(bytes)),
            OutgoingBody::Stream { length, chunks } => {
                headers.insert(CONTENT_LENGTH, length.into());
                Some(reqwest::Body::wrap_stream(chunks))
            }
        };

        let mut builder = self.client.request(method, url).headers(headers);
        if let Some(body) = body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = Box::pin(response.bytes_stream().map_err(TransportFailure::from));

        Ok(IncomingResponse {
            status,
            headers,
            body,
        })
    }
}
