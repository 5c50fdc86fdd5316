use http::StatusCode;
use thiserror::Error;

use kunai_core::error::CoreError;
use kunai_rfc::rfc::dav::parse::ParseError;

use crate::exchange::ExchangeState;

/// Client errors
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Invalid request: {0}")]
    BuildError(String),

    #[error("Transport failure in state {state}: {source}")]
    TransportError {
        state: ExchangeState,
        #[source]
        source: TransportFailure,
    },

    #[error("Malformed response body: {0}")]
    ParseError(ParseError),

    #[error("Protocol violation: {0}")]
    ProtocolError(String),

    #[error(transparent)]
    CoreError(#[from] CoreError),
}

impl ClientError {
    /// Returns the HTTP status carried by a transport failure, if any.
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::TransportError { source, .. } => source.status(),
            _ => None,
        }
    }

    /// Returns whether the failure was caused by cancellation.
    #[must_use]
    pub fn is_aborted(&self) -> bool {
        matches!(
            self,
            Self::TransportError {
                source: TransportFailure::Aborted,
                ..
            }
        )
    }
}

impl From<ParseError> for ClientError {
    fn from(err: ParseError) -> Self {
        if err.is_missing_element() {
            Self::ProtocolError(err.message)
        } else {
            Self::ParseError(err)
        }
    }
}

/// Failure reported by a [`Transport`](crate::transport::Transport) or while
/// moving body bytes.
#[derive(Error, Debug)]
pub enum TransportFailure {
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Unexpected status {0}")]
    Status(StatusCode),

    #[error("Exchange aborted")]
    Aborted,
}

impl TransportFailure {
    /// Returns the HTTP status associated with the failure.
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Http(err) => err.status(),
            Self::Status(status) => Some(*status),
            Self::Io(_) | Self::Aborted => None,
        }
    }

    /// Returns whether the failure happened before the request was fully sent.
    #[must_use]
    pub fn is_send_failure(&self) -> bool {
        match self {
            Self::Http(err) => err.is_connect() || err.is_body() || err.is_builder(),
            Self::Io(_) => true,
            Self::Status(_) | Self::Aborted => false,
        }
    }
}

pub type ClientResult<T> = std::result::Result<T, ClientError>;
