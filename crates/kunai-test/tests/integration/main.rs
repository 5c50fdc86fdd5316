#![allow(clippy::unwrap_used, clippy::expect_used)]
//! End-to-end tests: the client, the reqwest transport and a loopback server.

mod delete;
mod exists;
mod mkcol;
mod propfind;
mod transfer;

use kunai_client::Client;
use kunai_client::transport::HttpTransport;
use kunai_test::TestServer;

/// Starts a server and a client pointing at it.
pub async fn setup() -> (TestServer, Client<HttpTransport>) {
    let server = TestServer::start().await.expect("Failed to start test server");
    let client = Client::new(server.config()).expect("Failed to create client");
    (server, client)
}
