//! RFC 4918 (`WebDAV`) protocol vocabulary for the `kunai` client.
//!
//! Pure data and XML handling: no I/O happens in this crate.

pub mod error;
pub mod rfc;
