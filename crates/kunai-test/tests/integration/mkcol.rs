use super::setup;

#[test_log::test(tokio::test)]
async fn create_directory_returns_status() {
    let (server, client) = setup().await;

    assert_eq!(client.create_directory("new").await.unwrap().as_u16(), 201);
    assert!(server.is_collection("/new"));

    assert_eq!(client.create_directory("new").await.unwrap().as_u16(), 405);
    assert_eq!(client.create_directory("a/b/c").await.unwrap().as_u16(), 409);
    assert!(!server.contains("/a"));

    let request = server.last_request();
    assert_eq!(request.method, "MKCOL");
    assert_eq!(request.path, "/a/b/c");
    assert!(request.body.is_empty());
}

#[test_log::test(tokio::test)]
async fn create_directory_under_base_path() {
    let (server, _) = setup().await;
    server.add_collection("/dav");
    let client = kunai_client::Client::new(server.config().with_base_path("/dav/")).unwrap();

    assert_eq!(client.create_directory("/photos/").await.unwrap().as_u16(), 201);
    assert!(server.is_collection("/dav/photos"));
    assert_eq!(server.last_request().path, "/dav/photos");
}
