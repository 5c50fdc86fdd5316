//! Async `WebDAV` client: listing, transfers and collection management
//! over a pluggable HTTP transport.

pub mod cancel;
pub mod client;
pub mod entry;
pub mod error;
pub mod exchange;
pub mod operation;
pub mod path;
pub mod request;
pub mod transport;

#[cfg(test)]
mod testing;

pub use cancel::{CancelHandle, cancellable};
pub use client::Client;
pub use entry::{Entry, Listing};
pub use error::{ClientError, ClientResult, TransportFailure};
pub use exchange::{ExchangeState, ResponseMeta};
pub use operation::depth_from_i32;
pub use path::EntryType;
pub use transport::{HttpTransport, Transport};

pub use kunai_core::config::{ConnectionConfig, ProxySetting};
pub use kunai_rfc::rfc::dav::{Depth, PropfindRequest, QName};
