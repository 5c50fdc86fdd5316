use super::setup;

#[test_log::test(tokio::test)]
async fn delete_file() {
    let (server, client) = setup().await;
    server.add_file("/docs/a.txt", b"hello");

    assert_eq!(client.delete("docs/a.txt").await.unwrap().as_u16(), 204);

    assert!(!server.contains("/docs/a.txt"));
    assert!(server.contains("/docs"));
    assert_eq!(server.last_request().path, "/docs/a.txt");
}

#[test_log::test(tokio::test)]
async fn delete_collection_keeps_trailing_slash() {
    let (server, client) = setup().await;
    server.add_file("/docs/sub/a.txt", b"hello");

    assert_eq!(client.delete("docs/").await.unwrap().as_u16(), 204);

    assert_eq!(server.last_request().method, "DELETE");
    assert_eq!(server.last_request().path, "/docs/");
    assert!(!server.contains("/docs/sub/a.txt"));
    assert!(!server.contains("/docs"));
}

#[test_log::test(tokio::test)]
async fn delete_missing_returns_status() {
    let (_server, client) = setup().await;

    assert_eq!(client.delete("ghost.txt").await.unwrap().as_u16(), 404);
}
