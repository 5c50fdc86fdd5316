//! Shared configuration and error types for the `kunai` `WebDAV` client.

pub mod config;
pub mod constants;
pub mod error;
pub mod trace;
