//! HTTP and `WebDAV` request methods.

use std::fmt;

/// Request methods the client can issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DavMethod {
    Propfind,
    Proppatch,
    Mkcol,
    Get,
    Put,
    Delete,
    Head,
    Copy,
    Move,
}

impl DavMethod {
    /// Returns the method token.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Propfind => "PROPFIND",
            Self::Proppatch => "PROPPATCH",
            Self::Mkcol => "MKCOL",
            Self::Get => "GET",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Head => "HEAD",
            Self::Copy => "COPY",
            Self::Move => "MOVE",
        }
    }

    /// Returns whether the response to this method carries no body.
    #[must_use]
    pub const fn is_bodiless_response(self) -> bool {
        matches!(self, Self::Head)
    }

    /// Converts to an [`http::Method`].
    ///
    /// ## Errors
    /// Returns an error if the token is rejected by `http`, which does not
    /// happen for the tokens defined here.
    pub fn to_http(self) -> Result<http::Method, http::method::InvalidMethod> {
        match self {
            Self::Get => Ok(http::Method::GET),
            Self::Put => Ok(http::Method::PUT),
            Self::Delete => Ok(http::Method::DELETE),
            Self::Head => Ok(http::Method::HEAD),
            Self::Propfind | Self::Proppatch | Self::Mkcol | Self::Copy | Self::Move => {
                http::Method::from_bytes(self.as_str().as_bytes())
            }
        }
    }
}

impl fmt::Display for DavMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
