//! Multistatus documents captured from real server implementations.
