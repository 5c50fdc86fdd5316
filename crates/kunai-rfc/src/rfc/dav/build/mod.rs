//! `WebDAV` XML serialization for request bodies.

pub mod propfind;

pub use propfind::serialize_propfind;
