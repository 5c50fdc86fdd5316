//! Uploads and downloads.

use futures::future::join_all;
use kunai_client::cancellable;
use tokio::io::AsyncWriteExt;

use super::setup;

fn payload(len: usize) -> Vec<u8> {
    (0..len).map(|i| u8::try_from(i % 251).unwrap()).collect()
}

#[test_log::test(tokio::test)]
async fn upload_file_streams_contents() {
    let (server, client) = setup().await;
    let dir = tempfile::tempdir().unwrap();
    let local = dir.path().join("big.bin");
    let data = payload(200_000);
    let mut file = tokio::fs::File::create(&local).await.unwrap();
    file.write_all(&data).await.unwrap();
    file.flush().await.unwrap();
    drop(file);

    let status = client.upload(&local, "big.bin").await.unwrap();

    assert_eq!(status.as_u16(), 201);
    assert_eq!(server.file("/big.bin").unwrap(), data);
    let request = server.last_request();
    assert_eq!(request.method, "PUT");
    assert_eq!(request.header("content-type"), Some("application/octet-stream"));
}

#[test_log::test(tokio::test)]
async fn upload_overwrite_and_conflict() {
    let (server, client) = setup().await;
    server.add_file("/a.txt", b"old");

    assert_eq!(client.upload_bytes(&b"new"[..], "a.txt").await.unwrap().as_u16(), 204);
    assert_eq!(server.file("/a.txt").unwrap(), b"new");

    assert_eq!(
        client.upload_bytes(&b"x"[..], "missing/a.txt").await.unwrap().as_u16(),
        409
    );
}

#[test_log::test(tokio::test)]
async fn upload_missing_local_file_fails_before_sending() {
    let (server, client) = setup().await;

    let err = client
        .upload("/definitely/not/here.bin", "here.bin")
        .await
        .unwrap_err();

    assert!(matches!(err, kunai_client::ClientError::TransportError { .. }));
    assert!(server.requests().is_empty());
}

#[test_log::test(tokio::test)]
async fn expect_continue_upload() {
    let server = kunai_test::TestServer::start().await.unwrap();
    let client = kunai_client::Client::new(server.config().with_expect_continue(true)).unwrap();

    client.upload_bytes(&b"body"[..], "e.txt").await.unwrap();

    assert_eq!(server.last_request().header("expect"), Some("100-continue"));
    assert_eq!(server.file("/e.txt").unwrap(), b"body");
}

#[test_log::test(tokio::test)]
async fn download_to_file() {
    let (server, client) = setup().await;
    let data = payload(100_000);
    server.add_file("/docs/data.bin", &data);
    let dir = tempfile::tempdir().unwrap();
    let local = dir.path().join("data.bin");

    let status = client.download("docs/data.bin", &local).await.unwrap();

    assert_eq!(status.as_u16(), 200);
    assert_eq!(tokio::fs::read(&local).await.unwrap(), data);
    assert_eq!(server.last_request().method, "GET");
}

#[test_log::test(tokio::test)]
async fn download_missing_leaves_no_file() {
    let (_server, client) = setup().await;
    let dir = tempfile::tempdir().unwrap();
    let local = dir.path().join("ghost.bin");

    let err = client.download("ghost.bin", &local).await.unwrap_err();

    assert_eq!(err.status(), Some(http::StatusCode::NOT_FOUND));
    assert!(!local.exists());
}

#[test_log::test(tokio::test)]
async fn download_into_memory_and_writer() {
    let (server, client) = setup().await;
    server.add_file("/a.txt", b"hello");

    assert_eq!(&client.download_bytes("a.txt").await.unwrap()[..], b"hello");

    let mut out: Vec<u8> = Vec::new();
    let meta = client.download_to("a.txt", &mut out).await.unwrap();
    assert_eq!(out, b"hello");
    assert_eq!(meta.content_length, Some(5));
    assert_eq!(meta.bytes_received, 5);
    assert!(!meta.length_mismatch);
    assert_eq!(meta.content_type.as_deref(), Some("application/octet-stream"));
}

#[test_log::test(tokio::test)]
async fn round_trip_with_names_needing_escapes() {
    let (server, client) = setup().await;
    server.add_collection("/my docs");

    client
        .upload_bytes(&b"report"[..], "my docs/Q1 report #1.txt")
        .await
        .unwrap();

    assert_eq!(server.file("/my docs/Q1 report #1.txt").unwrap(), b"report");
    assert_eq!(
        &client.download_bytes("my docs/Q1 report #1.txt").await.unwrap()[..],
        b"report"
    );
}

#[test_log::test(tokio::test)]
async fn concurrent_operations_share_client() {
    let (server, client) = setup().await;
    for i in 0..8 {
        server.add_file(&format!("/f{i}.txt"), format!("file {i}").as_bytes());
    }

    let downloads = (0..8).map(|i| {
        let client = &client;
        async move { client.download_bytes(&format!("f{i}.txt")).await }
    });
    let results = join_all(downloads).await;

    for (i, result) in results.into_iter().enumerate() {
        assert_eq!(result.unwrap(), format!("file {i}").into_bytes());
    }
}

#[test_log::test(tokio::test)]
async fn cancel_one_of_two_operations() {
    let (server, client) = setup().await;
    server.add_file("/a.txt", b"a");

    let (handle, cancelled) = cancellable(client.download_bytes("a.txt"));
    let (_, kept) = cancellable(client.download_bytes("a.txt"));
    handle.cancel();

    let (cancelled, kept) = tokio::join!(cancelled, kept);
    assert!(cancelled.unwrap_err().is_aborted());
    assert_eq!(&kept.unwrap()[..], b"a");
}
