//! Listing and raw PROPFIND.

use std::sync::Arc;

use kunai_client::{Client, ClientError, Depth, EntryType, PropfindRequest};
use kunai_core::trace::MemorySink;
use kunai_rfc::rfc::dav::ResourceType;
use kunai_test::{Reply, TestServer};

use super::setup;

fn seed(server: &TestServer) {
    server.add_file("/docs/a.txt", b"hello");
    server.add_file("/docs/My File.txt", b"spaces");
    server.add_file("/docs/sub/deep.txt", b"deep");
}

fn names(client_entries: impl Iterator<Item = kunai_client::Entry>) -> Vec<String> {
    let mut names: Vec<String> = client_entries.map(|e| e.path).collect();
    names.sort();
    names
}

#[test_log::test(tokio::test)]
async fn list_depth_one_excludes_queried_collection() {
    let (server, client) = setup().await;
    seed(&server);

    let listing = client.list("docs", Some(Depth::One)).await.unwrap();

    assert_eq!(
        names(listing),
        vec!["/docs/My File.txt", "/docs/a.txt", "/docs/sub/"]
    );

    let request = server.last_request();
    assert_eq!(request.method, "PROPFIND");
    assert_eq!(request.path, "/docs/");
    assert_eq!(request.header("depth"), Some("1"));
    assert!(request.header("content-type").unwrap().starts_with("text/xml"));
    assert!(String::from_utf8_lossy(&request.body).contains("<D:propname/>"));
}

#[test_log::test(tokio::test)]
async fn list_infinity_reaches_descendants() {
    let (server, client) = setup().await;
    seed(&server);

    let entries: Vec<_> = client
        .list("/docs/", Some(Depth::Infinity))
        .await
        .unwrap()
        .collect();

    let deep = entries.iter().find(|e| e.name == "deep.txt").unwrap();
    assert_eq!(deep.directory, "/docs/sub/");
    assert_eq!(deep.entry_type, EntryType::File);
    assert_eq!(server.last_request().header("depth"), Some("infinity"));
}

#[test_log::test(tokio::test)]
async fn list_with_allprop_carries_values() {
    let (server, client) = setup().await;
    seed(&server);

    let entries: Vec<_> = client
        .list_with("docs", Some(Depth::One), PropfindRequest::allprop())
        .await
        .unwrap()
        .collect();

    let file = entries.iter().find(|e| e.name == "a.txt").unwrap();
    assert_eq!(file.content_length, Some(5));
    assert_eq!(file.resource_type, Some(ResourceType::Default));
    assert_eq!(file.last_modified.unwrap().timestamp(), 1_709_288_100);

    let dir = entries.iter().find(|e| e.name == "sub").unwrap();
    assert_eq!(dir.resource_type, Some(ResourceType::Collection));
    assert!(dir.is_directory());
    assert!(String::from_utf8_lossy(&server.last_request().body).contains("<D:allprop/>"));
}

#[test_log::test(tokio::test)]
async fn list_under_base_path() {
    let server = TestServer::start().await.unwrap();
    server.add_file("/remote.php/dav/docs/a.txt", b"x");
    let client = Client::new(server.config().with_base_path("remote.php/dav")).unwrap();

    let entries: Vec<_> = client.list("docs", Some(Depth::One)).await.unwrap().collect();

    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].path, "/docs/a.txt");
    assert_eq!(entries[0].directory, "/docs/");
    assert_eq!(server.last_request().path, "/remote.php/dav/docs/");
}

#[test_log::test(tokio::test)]
async fn list_under_server_url_path() {
    let server = TestServer::start().await.unwrap();
    server.add_file("/nextcloud/remote.php/dav/docs/a.txt", b"x");
    let mut config = server.config().with_base_path("remote.php/dav");
    config.server = format!("{}/nextcloud/", server.url());
    let client = Client::new(config).unwrap();

    let entries: Vec<_> = client.list("docs", Some(Depth::One)).await.unwrap().collect();

    assert_eq!(server.last_request().path, "/nextcloud/remote.php/dav/docs/");
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].path, "/docs/a.txt");
}

#[test_log::test(tokio::test)]
async fn raw_propfind_returns_multistatus() {
    let (server, client) = setup().await;
    seed(&server);

    let multistatus = client
        .propfind("docs/a.txt", Some(Depth::Zero), PropfindRequest::allprop())
        .await
        .unwrap();

    assert_eq!(multistatus.len(), 1);
    let response = multistatus.response_for("/docs/a.txt").unwrap();
    assert_eq!(response.content_length(), Some(5));
    assert_eq!(server.last_request().header("depth"), Some("0"));
}

#[test_log::test(tokio::test)]
async fn missing_collection_is_transport_error() {
    let (_server, client) = setup().await;

    let err = client.list("nowhere", Some(Depth::One)).await.unwrap_err();

    assert_eq!(err.status(), Some(http::StatusCode::NOT_FOUND));
}

#[test_log::test(tokio::test)]
async fn credentials_and_rejection() {
    let server = TestServer::start().await.unwrap();
    server.reply("PROPFIND", "/docs/", Reply::new(401).with_header("WWW-Authenticate", "Basic"));
    let client = Client::new(server.config().with_credentials("alice", "secret")).unwrap();

    let err = client.list("docs", Some(Depth::One)).await.unwrap_err();

    assert_eq!(err.status(), Some(http::StatusCode::UNAUTHORIZED));
    let auth = server.last_request().header("authorization").unwrap().to_owned();
    assert_eq!(auth, "Basic YWxpY2U6c2VjcmV0");
}

#[test_log::test(tokio::test)]
async fn malformed_body_is_parse_error() {
    let server = TestServer::start().await.unwrap();
    server.reply(
        "PROPFIND",
        "/docs/",
        Reply::new(207).with_body("<D:multistatus xmlns:D=\"DAV:\"><D:response>"),
    );
    let client = Client::new(server.config()).unwrap();

    let err = client.list("docs", Some(Depth::One)).await.unwrap_err();

    assert!(matches!(err, ClientError::ParseError(_)), "{err:?}");
}

#[test_log::test(tokio::test)]
async fn wire_trace_masks_credentials() {
    let server = TestServer::start().await.unwrap();
    server.add_collection("/docs");
    let trace = Arc::new(MemorySink::new());
    let config = server
        .config()
        .with_credentials("alice", "secret")
        .with_trace_sink(trace.clone());
    let client = Client::new(config).unwrap();

    client.list("docs", Some(Depth::One)).await.unwrap();

    assert!(trace.contains("PROPFIND http://"));
    assert!(trace.contains("207 Multi-Status"));
    assert!(trace.contains("<D:multistatus"));
    assert!(trace.contains("authorization: ***"));
    assert!(!trace.contains("YWxpY2U6c2VjcmV0"));
}
