//! In-process `WebDAV` server for the `kunai` integration tests.
//!
//! [`TestServer`] listens on a loopback port and keeps an in-memory tree of
//! files and collections. It understands just enough HTTP/1.1 (keep-alive,
//! `Content-Length` and chunked bodies, `Expect: 100-continue`) and just
//! enough `WebDAV` (`PROPFIND`, `GET`, `HEAD`, `PUT`, `MKCOL`, `DELETE`) to
//! exercise the client end to end. Every request is recorded, and canned
//! replies can be registered per method and path to simulate failures.

use std::collections::{BTreeMap, HashMap};
use std::io;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};

use http::StatusCode;
use kunai_core::config::{ConnectionConfig, ProxySetting};
use percent_encoding::{AsciiSet, CONTROLS, percent_decode_str, utf8_percent_encode};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

/// Characters escaped in generated hrefs.
const HREF: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Fixed modification time reported for every file.
pub const LAST_MODIFIED: &str = "Fri, 01 Mar 2024 10:15:00 GMT";

/// A request as the server received it.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    /// Request target without query, still percent-encoded.
    pub path: String,
    /// Header names are lowercase.
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl RecordedRequest {
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// A canned reply.
#[derive(Debug, Clone)]
pub struct Reply {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl Reply {
    #[must_use]
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_owned(), value.to_owned()));
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }
}

#[derive(Debug, Clone)]
enum Node {
    File(Vec<u8>),
    Collection,
}

#[derive(Default)]
struct State {
    /// Keyed by decoded path without trailing slash; the root is `/`.
    nodes: BTreeMap<String, Node>,
    overrides: HashMap<(String, String), Reply>,
    requests: Vec<RecordedRequest>,
}

/// A loopback `WebDAV` server, stopped on drop.
pub struct TestServer {
    addr: SocketAddr,
    state: Arc<Mutex<State>>,
    task: JoinHandle<()>,
}

impl TestServer {
    /// ## Summary
    /// Binds a free loopback port and starts serving an empty root collection.
    ///
    /// ## Errors
    /// Returns an error if the listener cannot be bound.
    pub async fn start() -> io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let mut state = State::default();
        state.nodes.insert("/".to_owned(), Node::Collection);
        let state = Arc::new(Mutex::new(state));

        let task = tokio::spawn(accept_loop(listener, Arc::clone(&state)));
        tracing::debug!(%addr, "Test server listening");

        Ok(Self { addr, state, task })
    }

    #[must_use]
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Returns a configuration pointing at this server, bypassing any
    /// proxy set in the environment.
    #[must_use]
    pub fn config(&self) -> ConnectionConfig {
        ConnectionConfig::new(self.url()).with_proxy(ProxySetting::Direct)
    }

    /// Adds a collection, creating missing parents.
    pub fn add_collection(&self, path: &str) {
        let mut state = self.lock();
        let key = node_key(path);
        for parent in ancestors(&key) {
            state.nodes.entry(parent).or_insert(Node::Collection);
        }
        state.nodes.insert(key, Node::Collection);
    }

    /// Adds a file, creating missing parent collections.
    pub fn add_file(&self, path: &str, contents: &[u8]) {
        let mut state = self.lock();
        let key = node_key(path);
        for parent in ancestors(&key) {
            state.nodes.entry(parent).or_insert(Node::Collection);
        }
        state.nodes.insert(key, Node::File(contents.to_vec()));
    }

    /// Returns the contents of a stored file.
    #[must_use]
    pub fn file(&self, path: &str) -> Option<Vec<u8>> {
        match self.lock().nodes.get(&node_key(path)) {
            Some(Node::File(contents)) => Some(contents.clone()),
            Some(Node::Collection) | None => None,
        }
    }

    #[must_use]
    pub fn is_collection(&self, path: &str) -> bool {
        matches!(self.lock().nodes.get(&node_key(path)), Some(Node::Collection))
    }

    #[must_use]
    pub fn contains(&self, path: &str) -> bool {
        self.lock().nodes.contains_key(&node_key(path))
    }

    /// Answers `method` on the exact request target `path` with `reply`
    /// instead of consulting the tree.
    pub fn reply(&self, method: &str, path: &str, reply: Reply) {
        self.lock()
            .overrides
            .insert((method.to_owned(), path.to_owned()), reply);
    }

    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.lock().requests.clone()
    }

    /// ## Summary
    /// Returns the most recent request.
    ///
    /// ## Panics
    /// Panics if no request was received yet.
    #[must_use]
    pub fn last_request(&self) -> RecordedRequest {
        match self.lock().requests.last() {
            Some(request) => request.clone(),
            None => panic!("test server received no request"),
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        lock_state(&self.state)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Locks the server state and recovers from poisoning.
fn lock_state(state: &Mutex<State>) -> MutexGuard<'_, State> {
    match state.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            state.clear_poison();
            poisoned.into_inner()
        }
    }
}

async fn accept_loop(listener: TcpListener, state: Arc<Mutex<State>>) {
    loop {
        match listener.accept().await {
            Ok((stream, peer)) => {
                let state = Arc::clone(&state);
                tokio::spawn(async move {
                    if let Err(err) = serve(stream, state).await {
                        tracing::debug!(%peer, error = %err, "Connection closed with error");
                    }
                });
            }
            Err(err) => {
                tracing::warn!(error = %err, "Accept failed");
            }
        }
    }
}

/// Serves requests on one connection until the peer closes it.
async fn serve(stream: TcpStream, state: Arc<Mutex<State>>) -> io::Result<()> {
    let (read, mut write) = stream.into_split();
    let mut reader = BufReader::new(read);

    while let Some(request) = read_request(&mut reader, &mut write).await? {
        tracing::debug!(method = %request.method, path = %request.path, "Test server request");
        let is_head = request.method == "HEAD";
        let reply = {
            let mut state = lock_state(&state);
            let reply = respond(&mut state, &request);
            state.requests.push(request);
            reply
        };
        write_reply(&mut write, &reply, is_head).await?;
    }

    Ok(())
}

async fn read_request<R, W>(
    reader: &mut BufReader<R>,
    writer: &mut W,
) -> io::Result<Option<RecordedRequest>>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut line = String::new();
    if reader.read_line(&mut line).await? == 0 {
        return Ok(None);
    }

    let mut parts = line.split_whitespace();
    let (Some(method), Some(target)) = (parts.next(), parts.next()) else {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("malformed request line {line:?}"),
        ));
    };
    let method = method.to_owned();
    let path = target.split('?').next().unwrap_or_default().to_owned();

    let mut headers = Vec::new();
    loop {
        let mut header = String::new();
        if reader.read_line(&mut header).await? == 0 {
            return Err(io::ErrorKind::UnexpectedEof.into());
        }
        let header = header.trim_end();
        if header.is_empty() {
            break;
        }
        if let Some((name, value)) = header.split_once(':') {
            headers.push((name.trim().to_ascii_lowercase(), value.trim().to_owned()));
        }
    }

    let find = |name: &str| {
        headers
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.clone())
    };

    if find("expect").is_some_and(|v| v.eq_ignore_ascii_case("100-continue")) {
        writer.write_all(b"HTTP/1.1 100 Continue\r\n\r\n").await?;
        writer.flush().await?;
    }

    let body = if find("transfer-encoding").is_some_and(|v| v.eq_ignore_ascii_case("chunked")) {
        read_chunked(reader).await?
    } else {
        let length = find("content-length")
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or_default();
        let mut body = vec![0u8; length];
        reader.read_exact(&mut body).await?;
        body
    };

    Ok(Some(RecordedRequest {
        method,
        path,
        headers,
        body,
    }))
}

async fn read_chunked<R: AsyncRead + Unpin>(reader: &mut BufReader<R>) -> io::Result<Vec<u8>> {
    let mut body = Vec::new();
    loop {
        let mut size_line = String::new();
        reader.read_line(&mut size_line).await?;
        let size = size_line.trim().split(';').next().unwrap_or_default();
        let size = usize::from_str_radix(size, 16)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        if size == 0 {
            // Trailers end with an empty line.
            loop {
                let mut trailer = String::new();
                if reader.read_line(&mut trailer).await? == 0 || trailer.trim().is_empty() {
                    return Ok(body);
                }
            }
        }

        let start = body.len();
        body.resize(start + size, 0);
        reader.read_exact(&mut body[start..]).await?;
        let mut crlf = String::new();
        reader.read_line(&mut crlf).await?;
    }
}

async fn write_reply<W: AsyncWrite + Unpin>(writer: &mut W, reply: &Reply, is_head: bool) -> io::Result<()> {
    let reason = StatusCode::from_u16(reply.status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("Unknown");

    let mut head = format!("HTTP/1.1 {} {reason}\r\n", reply.status);
    for (name, value) in &reply.headers {
        head.push_str(&format!("{name}: {value}\r\n"));
    }
    if !reply
        .headers
        .iter()
        .any(|(n, _)| n.eq_ignore_ascii_case("content-length"))
    {
        head.push_str(&format!("Content-Length: {}\r\n", reply.body.len()));
    }
    head.push_str("\r\n");

    writer.write_all(head.as_bytes()).await?;
    if !is_head {
        writer.write_all(&reply.body).await?;
    }
    writer.flush().await
}

fn respond(state: &mut State, request: &RecordedRequest) -> Reply {
    if let Some(reply) = state
        .overrides
        .get(&(request.method.clone(), request.path.clone()))
    {
        return reply.clone();
    }

    let key = node_key(&request.path);
    match request.method.as_str() {
        "PROPFIND" => propfind(state, &key, request.header("depth")),
        "GET" | "HEAD" => match state.nodes.get(&key) {
            Some(Node::File(contents)) => Reply::new(200)
                .with_header("Content-Type", "application/octet-stream")
                .with_header("Last-Modified", LAST_MODIFIED)
                .with_body(contents.clone()),
            Some(Node::Collection) => Reply::new(200).with_header("Content-Type", "text/html"),
            None => Reply::new(404),
        },
        "PUT" => {
            if !has_parent_collection(state, &key) {
                return Reply::new(409);
            }
            match state.nodes.get(&key) {
                Some(Node::Collection) => Reply::new(405),
                Some(Node::File(_)) => {
                    state.nodes.insert(key, Node::File(request.body.clone()));
                    Reply::new(204)
                }
                None => {
                    state.nodes.insert(key, Node::File(request.body.clone()));
                    Reply::new(201)
                }
            }
        }
        "MKCOL" => {
            if state.nodes.contains_key(&key) {
                Reply::new(405)
            } else if !has_parent_collection(state, &key) {
                Reply::new(409)
            } else {
                state.nodes.insert(key, Node::Collection);
                Reply::new(201)
            }
        }
        "DELETE" => {
            if key == "/" || !state.nodes.contains_key(&key) {
                return Reply::new(404);
            }
            let prefix = format!("{key}/");
            state
                .nodes
                .retain(|path, _| path != &key && !path.starts_with(&prefix));
            Reply::new(204)
        }
        _ => Reply::new(405),
    }
}

fn propfind(state: &State, key: &str, depth: Option<&str>) -> Reply {
    let Some(node) = state.nodes.get(key) else {
        return Reply::new(404);
    };

    let mut xml = String::from(r#"<?xml version="1.0" encoding="utf-8"?><D:multistatus xmlns:D="DAV:">"#);
    write_response(&mut xml, key, node);

    if matches!(node, Node::Collection) {
        let prefix = if key == "/" {
            "/".to_owned()
        } else {
            format!("{key}/")
        };
        let max_levels = match depth.map(str::trim) {
            Some("0") => 0,
            Some("1") => 1,
            _ => usize::MAX,
        };
        for (path, child) in &state.nodes {
            let Some(rest) = path.strip_prefix(&prefix) else {
                continue;
            };
            if !rest.is_empty() && rest.split('/').count() <= max_levels {
                write_response(&mut xml, path, child);
            }
        }
    }

    xml.push_str("</D:multistatus>");
    Reply::new(207)
        .with_header("Content-Type", r#"application/xml; charset="utf-8""#)
        .with_body(xml)
}

fn write_response(xml: &mut String, key: &str, node: &Node) {
    let mut href = utf8_percent_encode(key, HREF).to_string();
    let props = match node {
        Node::Collection => {
            if !href.ends_with('/') {
                href.push('/');
            }
            "<D:resourcetype><D:collection/></D:resourcetype>".to_owned()
        }
        Node::File(contents) => format!(
            "<D:resourcetype/><D:getcontentlength>{}</D:getcontentlength>\
             <D:getlastmodified>{LAST_MODIFIED}</D:getlastmodified>",
            contents.len()
        ),
    };
    xml.push_str(&format!(
        "<D:response><D:href>{href}</D:href><D:propstat><D:prop>{props}</D:prop>\
         <D:status>HTTP/1.1 200 OK</D:status></D:propstat></D:response>"
    ));
}

/// Decodes a request target into a tree key.
fn node_key(path: &str) -> String {
    let decoded = percent_decode_str(path).decode_utf8_lossy();
    let trimmed = decoded.trim_matches('/');
    if trimmed.is_empty() {
        "/".to_owned()
    } else {
        format!("/{trimmed}")
    }
}

fn parent_key(key: &str) -> String {
    match key.rfind('/') {
        Some(0) | None => "/".to_owned(),
        Some(i) => key[..i].to_owned(),
    }
}

fn ancestors(key: &str) -> Vec<String> {
    let mut parents = Vec::new();
    let mut current = key.to_owned();
    while current != "/" {
        current = parent_key(&current);
        parents.push(current.clone());
    }
    parents
}

fn has_parent_collection(state: &State, key: &str) -> bool {
    matches!(state.nodes.get(&parent_key(key)), Some(Node::Collection))
}
