//! `WebDAV` XML parsing.
//!
//! This module provides parsing for `WebDAV` XML response bodies
//! using the `quick-xml` crate.

mod error;
pub mod multistatus;
mod tree;

pub use error::{ParseError, ParseErrorKind, ParseResult};
pub use multistatus::parse_multistatus;
pub use tree::parse_document;
