//! `WebDAV` XML types.
//!
//! This module defines the core types for the `WebDAV` XML elements a
//! client sends in `PROPFIND` requests and reads back from multistatus
//! responses.

mod depth;
mod element;
mod href;
mod method;
mod multistatus;
mod namespace;
mod propfind;
mod status;

pub use depth::Depth;
pub use element::XmlElement;
pub use href::Href;
pub use method::DavMethod;
pub use multistatus::{Multistatus, PropertyStatus, ResourceType, Response};
pub use namespace::{DAV_NS, NEXTCLOUD_NS, Namespace, OWNCLOUD_NS, QName, dav_names};
pub use propfind::{PropfindRequest, PropfindType};
pub use status::parse_status_line;
