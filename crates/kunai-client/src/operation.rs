//! The verbs the client performs and how each one shapes its exchange.

use std::path::PathBuf;

use bytes::Bytes;
use kunai_rfc::rfc::dav::build::serialize_propfind;
use kunai_rfc::rfc::dav::{DavMethod, Depth, PropfindRequest};

use crate::error::{ClientError, ClientResult};
use crate::exchange::{ExchangeOptions, StatusPolicy};

/// Content type sent with uploads.
pub const UPLOAD_CONTENT_TYPE: &str = "application/octet-stream";

/// Where an upload reads its bytes from.
#[derive(Debug, Clone)]
pub enum UploadSource {
    File(PathBuf),
    Bytes(Bytes),
}

/// A client operation.
#[derive(Debug, Clone)]
pub enum Operation {
    /// `PROPFIND` with an optional `Depth` header.
    PropertyFind {
        depth: Option<Depth>,
        request: PropfindRequest,
    },
    /// `GET`.
    Download,
    /// `PUT`.
    Upload { source: UploadSource },
    /// `MKCOL`.
    CreateCollection,
    /// `DELETE`.
    Delete,
    /// `HEAD`.
    Exists,
}

impl Operation {
    #[must_use]
    pub fn method(&self) -> DavMethod {
        match self {
            Self::PropertyFind { .. } => DavMethod::Propfind,
            Self::Download => DavMethod::Get,
            Self::Upload { .. } => DavMethod::Put,
            Self::CreateCollection => DavMethod::Mkcol,
            Self::Delete => DavMethod::Delete,
            Self::Exists => DavMethod::Head,
        }
    }

    /// Returns whether the request URL for `path` ends with `/`.
    ///
    /// Listings always address a collection. Deletes keep whatever the
    /// caller wrote, since collections need the slash.
    #[must_use]
    pub fn append_trailing_slash(&self, path: &str) -> bool {
        match self {
            Self::PropertyFind { .. } => true,
            Self::Delete => path.ends_with('/'),
            Self::Download | Self::Upload { .. } | Self::CreateCollection | Self::Exists => false,
        }
    }

    /// Returns the verb-specific request headers.
    #[must_use]
    pub fn headers(&self) -> Vec<(String, String)> {
        match self {
            Self::PropertyFind {
                depth: Some(depth),
                ..
            } => vec![("Depth".to_owned(), depth.header_value())],
            _ => Vec::new(),
        }
    }

    /// ## Summary
    /// Returns the request body, either in memory or as a file to stream.
    ///
    /// ## Errors
    /// Returns [`ClientError::BuildError`] if the PROPFIND body cannot be serialized.
    pub fn body(&self) -> ClientResult<(Option<Bytes>, Option<PathBuf>)> {
        match self {
            Self::PropertyFind { request, .. } => {
                let xml = serialize_propfind(request)
                    .map_err(|e| ClientError::BuildError(e.to_string()))?;
                Ok((Some(Bytes::from(xml)), None))
            }
            Self::Upload {
                source: UploadSource::Bytes(bytes),
            } => Ok((Some(bytes.clone()), None)),
            Self::Upload {
                source: UploadSource::File(path),
            } => Ok((None, Some(path.clone()))),
            Self::Download | Self::CreateCollection | Self::Delete | Self::Exists => Ok((None, None)),
        }
    }

    #[must_use]
    pub fn content_type(&self) -> Option<&'static str> {
        match self {
            Self::Upload { .. } => Some(UPLOAD_CONTENT_TYPE),
            _ => None,
        }
    }

    /// Returns how the exchange treats statuses and bodies for this verb.
    #[must_use]
    pub fn options(&self) -> ExchangeOptions {
        let policy = match self {
            Self::PropertyFind { .. } | Self::Download => StatusPolicy::RequireSuccess,
            Self::Exists => StatusPolicy::SuccessOrNotFound,
            Self::Upload { .. } | Self::CreateCollection | Self::Delete => StatusPolicy::AcceptAny,
        };
        ExchangeOptions {
            policy,
            verify_length: matches!(self, Self::Download),
            trace_response_body: matches!(self, Self::PropertyFind { .. }),
        }
    }
}

/// ## Summary
/// Converts a signed depth where `-1` means `infinity`.
///
/// ## Errors
/// Returns [`ClientError::BuildError`] for values below `-1`.
pub fn depth_from_i32(depth: i32) -> ClientResult<Depth> {
    Depth::from_i32(depth)
        .ok_or_else(|| ClientError::BuildError(format!("invalid depth {depth}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn propfind(depth: Option<Depth>) -> Operation {
        Operation::PropertyFind {
            depth,
            request: PropfindRequest::propname(),
        }
    }

    #[test]
    fn depth_header_values() {
        assert_eq!(
            propfind(Some(depth_from_i32(-1).unwrap())).headers(),
            vec![("Depth".to_owned(), "infinity".to_owned())]
        );
        assert_eq!(
            propfind(Some(depth_from_i32(0).unwrap())).headers(),
            vec![("Depth".to_owned(), "0".to_owned())]
        );
        assert_eq!(
            propfind(Some(depth_from_i32(3).unwrap())).headers(),
            vec![("Depth".to_owned(), "3".to_owned())]
        );
        assert!(propfind(None).headers().is_empty());
        assert!(matches!(depth_from_i32(-2), Err(ClientError::BuildError(_))));
    }

    #[test]
    fn trailing_slash_policy() {
        assert!(propfind(None).append_trailing_slash("docs"));
        assert!(Operation::Delete.append_trailing_slash("docs/"));
        assert!(!Operation::Delete.append_trailing_slash("docs/a.txt"));
        assert!(!Operation::CreateCollection.append_trailing_slash("new"));
        assert!(!Operation::Exists.append_trailing_slash("a.txt"));
    }

    #[test]
    fn status_policies() {
        let exists = Operation::Exists.options();
        assert_eq!(exists.policy, StatusPolicy::SuccessOrNotFound);
        assert!(!exists.verify_length);

        let download = Operation::Download.options();
        assert_eq!(download.policy, StatusPolicy::RequireSuccess);
        assert!(download.verify_length);

        assert_eq!(Operation::CreateCollection.options().policy, StatusPolicy::AcceptAny);
        assert!(propfind(None).options().trace_response_body);
    }

    #[test]
    fn bodies() {
        let (body, file) = propfind(None).body().unwrap();
        assert!(file.is_none());
        let body = body.unwrap();
        assert!(std::str::from_utf8(&body).unwrap().contains("<D:propname/>"));

        let upload = Operation::Upload {
            source: UploadSource::File(PathBuf::from("/tmp/a.bin")),
        };
        assert_eq!(upload.body().unwrap(), (None, Some(PathBuf::from("/tmp/a.bin"))));
        assert_eq!(upload.content_type(), Some(UPLOAD_CONTENT_TYPE));
        assert_eq!(Operation::Delete.body().unwrap(), (None, None));
    }
}
