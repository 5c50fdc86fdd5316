//! Request descriptors and the builder that produces them.
//!
//! Building never touches the network: everything that can be wrong with
//! a request is reported here, before the exchange starts.

use std::path::PathBuf;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use bytes::Bytes;
use http::header::{
    AUTHORIZATION, CONTENT_TYPE, COOKIE, EXPECT, HeaderMap, HeaderName, HeaderValue, USER_AGENT,
};
use kunai_core::config::ConnectionConfig;
use kunai_rfc::rfc::dav::DavMethod;
use reqwest::Url;

use crate::error::{ClientError, ClientResult};

/// Content type of XML request bodies.
pub const XML_CONTENT_TYPE: &str = "text/xml; charset=\"utf-8\"";

/// Body of an outgoing request.
#[derive(Debug, Clone, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    /// In-memory bytes.
    Buffer(Bytes),
    /// Local file streamed at send time.
    File(PathBuf),
}

impl RequestBody {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

/// A ready-to-send request.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    pub method: DavMethod,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: RequestBody,
    /// Declared content type, also present in `headers`.
    pub content_type: Option<String>,
}

/// ## Summary
/// Builds a request descriptor for `method` on `url`.
///
/// Configured default headers are applied first and `extra_headers` override
/// them. Credentials are attached up front: a cookie session wins over a
/// bearer token, which wins over basic credentials. XML bodies default to
/// `text/xml` for `PROPFIND`.
///
/// ## Errors
/// Returns [`ClientError::BuildError`] if both `body` and `upload_file` are
/// given, or if a header name or value is not valid HTTP.
pub fn build(
    config: &ConnectionConfig,
    method: DavMethod,
    url: Url,
    extra_headers: &[(String, String)],
    body: Option<Bytes>,
    upload_file: Option<PathBuf>,
    content_type: Option<&str>,
) -> ClientResult<RequestDescriptor> {
    let body = match (body, upload_file) {
        (Some(_), Some(file)) => {
            return Err(ClientError::BuildError(format!(
                "request body and upload file {} are mutually exclusive",
                file.display()
            )));
        }
        (Some(bytes), None) => RequestBody::Buffer(bytes),
        (None, Some(file)) => RequestBody::File(file),
        (None, None) => RequestBody::Empty,
    };

    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, header_value(&config.user_agent)?);

    let merged = config
        .headers
        .iter()
        .map(|(name, value)| (name.as_str(), value.as_str()))
        .chain(extra_headers.iter().map(|(n, v)| (n.as_str(), v.as_str())));
    for (name, value) in merged {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| ClientError::BuildError(format!("invalid header name {name:?}: {e}")))?;
        headers.insert(name, header_value(value)?);
    }

    apply_credentials(config, &mut headers)?;

    let content_type = content_type
        .map(str::to_owned)
        .or_else(|| (method == DavMethod::Propfind && !body.is_empty()).then(|| XML_CONTENT_TYPE.to_owned()));
    if let Some(content_type) = &content_type {
        headers.insert(CONTENT_TYPE, header_value(content_type)?);
    }

    if config.expect_continue && !body.is_empty() {
        headers.insert(EXPECT, HeaderValue::from_static("100-continue"));
    }

    tracing::debug!(method = %method, url = %url, headers = headers.len(), "Built request");

    Ok(RequestDescriptor {
        method,
        url,
        headers,
        body,
        content_type,
    })
}

fn apply_credentials(config: &ConnectionConfig, headers: &mut HeaderMap) -> ClientResult<()> {
    if config.has_cookie_session() {
        headers.insert(COOKIE, header_value(&config.cookies.join("; "))?);
        return Ok(());
    }

    if let Some(token) = config.bearer_token.as_deref().filter(|t| !t.is_empty()) {
        let mut value = header_value(&format!("Bearer {token}"))?;
        value.set_sensitive(true);
        headers.insert(AUTHORIZATION, value);
        return Ok(());
    }

    if let (Some(user), Some(password)) = (&config.user, &config.password)
        && config.has_basic_credentials()
    {
        let user = match config.domain.as_deref().filter(|d| !d.is_empty()) {
            Some(domain) => format!("{domain}\\{user}"),
            None => user.clone(),
        };
        let encoded = STANDARD.encode(format!("{user}:{password}"));
        let mut value = header_value(&format!("Basic {encoded}"))?;
        value.set_sensitive(true);
        headers.insert(AUTHORIZATION, value);
    }

    Ok(())
}

fn header_value(value: &str) -> ClientResult<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|e| ClientError::BuildError(format!("invalid header value: {e}")))
}
