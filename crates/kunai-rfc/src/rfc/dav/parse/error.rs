//! Errors raised while reading response XML.

use std::fmt;

use thiserror::Error;

pub type ParseResult<T> = Result<T, ParseError>;

/// The class of a [`ParseError`].
///
/// Callers mostly care about one distinction: [`ParseErrorKind::MissingElement`]
/// means the document was well-formed but incomplete, everything else means
/// it could not be read at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    XmlError,
    MissingElement,
    UnexpectedElement,
    InvalidValue,
    UnsupportedNamespace,
    EncodingError,
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::XmlError => "malformed XML",
            Self::MissingElement => "missing element",
            Self::UnexpectedElement => "unexpected element",
            Self::InvalidValue => "invalid value",
            Self::UnsupportedNamespace => "undeclared namespace prefix",
            Self::EncodingError => "bad encoding",
        })
    }
}

/// A response body that could not be read as the expected XML.
#[derive(Debug, Error)]
#[error("{kind}: {message}{}", .position.map(|p| format!(" (at byte {p})")).unwrap_or_default())]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub message: String,
    /// Byte offset into the document, when the reader knew it.
    pub position: Option<u64>,
}

impl ParseError {
    #[must_use]
    pub fn new(kind: ParseErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            position: None,
        }
    }

    #[must_use]
    pub fn xml(message: impl Into<String>) -> Self {
        Self::new(ParseErrorKind::XmlError, message)
    }

    /// A required child element is absent.
    #[must_use]
    pub fn missing_element(name: &str) -> Self {
        Self::new(ParseErrorKind::MissingElement, format!("<{name}> is required"))
    }

    #[must_use]
    pub fn unexpected_element(name: &str) -> Self {
        Self::new(ParseErrorKind::UnexpectedElement, format!("<{name}>"))
    }

    #[must_use]
    pub fn invalid_value(message: impl Into<String>) -> Self {
        Self::new(ParseErrorKind::InvalidValue, message)
    }

    #[must_use]
    pub fn unsupported_namespace(prefix: &str) -> Self {
        Self::new(ParseErrorKind::UnsupportedNamespace, format!("{prefix:?}"))
    }

    /// Records where in the document the error was detected, keeping an
    /// earlier, more precise position if one is already set.
    #[must_use]
    pub fn at(mut self, position: u64) -> Self {
        self.position.get_or_insert(position);
        self
    }

    /// Returns whether the document was well-formed but lacked a required element.
    #[must_use]
    pub fn is_missing_element(&self) -> bool {
        self.kind == ParseErrorKind::MissingElement
    }
}

impl From<quick_xml::Error> for ParseError {
    fn from(err: quick_xml::Error) -> Self {
        Self::xml(err.to_string())
    }
}

impl From<std::str::Utf8Error> for ParseError {
    fn from(err: std::str::Utf8Error) -> Self {
        Self::new(ParseErrorKind::EncodingError, err.to_string())
    }
}

impl From<quick_xml::encoding::EncodingError> for ParseError {
    fn from(err: quick_xml::encoding::EncodingError) -> Self {
        Self::new(ParseErrorKind::EncodingError, err.to_string())
    }
}
