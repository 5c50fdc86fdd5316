//! `WebDAV` XML types and processing.
//!
//! This module provides types, parsing, and serialization for the `WebDAV`
//! XML a client exchanges with a server: `PROPFIND` request bodies and
//! multistatus responses.
//!
//! ## Submodules
//!
//! - [`core`] - Core types (`Href`, `QName`, `Multistatus`, etc.)
//! - [`parse`] - XML parsing for response bodies
//! - [`build`] - XML serialization for request bodies

pub mod build;
pub mod core;
pub mod parse;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use core::{
    DAV_NS, DavMethod, Depth, Href, Multistatus, NEXTCLOUD_NS, Namespace, OWNCLOUD_NS,
    PropertyStatus, PropfindRequest, PropfindType, QName, ResourceType, Response, XmlElement,
    parse_status_line,
};
