use std::time::Duration;

use kunai_test::Reply;

use super::setup;

#[test_log::test(tokio::test)]
async fn exists_reports_presence() {
    let (server, client) = setup().await;
    server.add_file("/docs/a.txt", b"hello");

    assert!(client.exists("docs/a.txt").await.unwrap());
    assert!(client.exists("docs").await.unwrap());
    assert!(!client.exists("docs/missing.txt").await.unwrap());

    let requests = server.requests();
    assert!(requests.iter().all(|r| r.method == "HEAD"));
    assert_eq!(requests[0].path, "/docs/a.txt");
}

#[test_log::test(tokio::test)]
async fn server_error_is_not_absence() {
    let (server, client) = setup().await;
    server.reply("HEAD", "/flaky.txt", Reply::new(503));

    let err = client.exists("flaky.txt").await.unwrap_err();

    assert_eq!(err.status(), Some(http::StatusCode::SERVICE_UNAVAILABLE));
}

#[test_log::test(tokio::test)]
async fn unreachable_server_is_transport_error() {
    let (server, _) = setup().await;
    let client = kunai_client::Client::new(server.config().with_port(1)).unwrap();

    let err = client.exists("a.txt").await.unwrap_err();

    assert!(err.status().is_none());
    assert!(matches!(err, kunai_client::ClientError::TransportError { .. }));
    assert!(server.requests().is_empty());
}

#[test_log::test(tokio::test)]
async fn sub_second_timeout_is_honored() {
    let (server, _) = setup().await;
    server.add_file("/a.txt", b"x");
    let client =
        kunai_client::Client::new(server.config().with_timeout(Duration::from_millis(500))).unwrap();

    assert_eq!(client.config().timeout(), Some(Duration::from_millis(500)));
    assert!(client.exists("a.txt").await.unwrap());
}
