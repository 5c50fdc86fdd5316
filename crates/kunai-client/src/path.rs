//! Path algebra between caller paths, request URLs and listing hrefs.
//!
//! Callers address resources relative to the configured base path. Listing
//! hrefs come back as server paths (or absolute URIs) and are mapped back
//! into that caller-relative space.

use kunai_core::config::{ConnectionConfig, normalize_base_path};
use kunai_rfc::rfc::dav::Href;
use percent_encoding::percent_decode_str;
use reqwest::Url;

use crate::error::{ClientError, ClientResult};

/// Whether an [`EntryPath`] names a file or a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryType {
    File,
    Directory,
}

/// The decomposition of a listing href into caller-relative parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryPath {
    /// Parent path, ending in `/`.
    pub directory: String,
    /// Last segment without slashes.
    pub name: String,
    /// `directory + name`, with the trailing `/` kept for directories.
    pub path: String,
    pub entry_type: EntryType,
}

/// ## Summary
/// Builds the request URL for a path relative to the configured base path.
///
/// The relative path is trimmed of surrounding slashes and appended to the
/// server URL's own path followed by the base path; a trailing `/` is added
/// when requested. Characters that cannot appear in a URL path (spaces, `?`,
/// `#`, non-ASCII) are percent-encoded, existing `%XX` escapes are kept as
/// they are.
///
/// ## Errors
/// Returns [`ClientError::BuildError`] if the server URL cannot be parsed or
/// cannot carry a path or port.
pub fn resolve(
    config: &ConnectionConfig,
    relative: &str,
    append_trailing_slash: bool,
) -> ClientResult<Url> {
    let mut url = server_url(config)?;

    let mut path = collection_root(&url, config);
    path.push_str(relative.trim().trim_matches('/'));
    if append_trailing_slash && !path.ends_with('/') {
        path.push('/');
    }

    if let Some(port) = config.port {
        url.set_port(Some(port)).map_err(|()| {
            ClientError::BuildError(format!("server URL {:?} cannot carry a port", config.server))
        })?;
    }
    url.set_path(&path);
    url.set_query(None);
    url.set_fragment(None);

    Ok(url)
}

/// ## Summary
/// Returns the server path that listing hrefs are reported under: the path
/// of the server URL followed by the base path, still escaped.
///
/// ## Errors
/// Same as [`resolve`].
pub fn listing_root(config: &ConnectionConfig) -> ClientResult<String> {
    let url = server_url(config)?;
    Ok(collection_root(&url, config))
}

fn server_url(config: &ConnectionConfig) -> ClientResult<Url> {
    let url = Url::parse(&config.server)
        .map_err(|e| ClientError::BuildError(format!("invalid server URL {:?}: {e}", config.server)))?;
    if url.cannot_be_a_base() {
        return Err(ClientError::BuildError(format!(
            "server URL {:?} cannot carry a path",
            config.server
        )));
    }
    Ok(url)
}

fn collection_root(server: &Url, config: &ConnectionConfig) -> String {
    format!("{}{}", server.path().trim_end_matches('/'), config.root_path())
}

/// ## Summary
/// Splits a listing href into directory, name, path and type.
///
/// The href is percent-decoded (absolute URIs are reduced to their path) and
/// the base path prefix is stripped, so the result lives in the same space
/// as the paths callers pass in. Returns `None` for the queried collection
/// itself, identified by an empty remainder or a path equal to `query_root`
/// modulo surrounding slashes. `base_path` and `query_root` may be given
/// escaped or unescaped.
#[must_use]
pub fn split_entry(href: &Href, base_path: &str, query_root: &str) -> Option<EntryPath> {
    let decoded = href.decoded_path();
    let base = normalize_base_path(&decode(base_path));
    let query_root = decode(query_root);
    let remainder = decoded
        .strip_prefix(base.as_str())
        .or_else(|| (decoded == base.trim_end_matches('/')).then_some(""))
        .unwrap_or(&decoded);

    let remainder = remainder.trim_start_matches('/');
    if remainder.is_empty() || remainder.trim_end_matches('/') == query_root.trim_matches('/') {
        return None;
    }

    let path = format!("/{remainder}");
    let entry_type = if path.ends_with('/') {
        EntryType::Directory
    } else {
        EntryType::File
    };

    // For directories skip the trailing slash before looking for the parent separator.
    let search = match entry_type {
        EntryType::Directory => &path[..path.len() - 1],
        EntryType::File => path.as_str(),
    };
    let end_dir = search.rfind('/').map_or(0, |i| i + 1);

    Some(EntryPath {
        directory: path[..end_dir].to_owned(),
        name: path[end_dir..].trim_end_matches('/').to_owned(),
        path,
        entry_type,
    })
}

fn decode(path: &str) -> String {
    percent_decode_str(path).decode_utf8_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(base: &str) -> ConnectionConfig {
        ConnectionConfig::new("https://dav.example.com/").with_base_path(base)
    }

    #[test]
    fn resolve_joins_base_and_relative() {
        let url = resolve(&config("/dav/"), "/docs/a.txt", false).unwrap();
        assert_eq!(url.as_str(), "https://dav.example.com/dav/docs/a.txt");

        let url = resolve(&config("dav"), "docs", true).unwrap();
        assert_eq!(url.as_str(), "https://dav.example.com/dav/docs/");

        let url = resolve(&config("/"), "/", true).unwrap();
        assert_eq!(url.as_str(), "https://dav.example.com/");

        let url = resolve(&config("/"), "docs/", false).unwrap();
        assert_eq!(url.as_str(), "https://dav.example.com/docs");
    }

    #[test]
    fn resolve_encodes_once() {
        let url = resolve(&config("/"), "a b/c%20d.txt", false).unwrap();
        assert_eq!(url.path(), "/a%20b/c%20d.txt");

        let url = resolve(&config("/"), "what?#now", false).unwrap();
        assert_eq!(url.path(), "/what%3F%23now");
        assert_eq!(url.query(), None);
    }

    #[test]
    fn resolve_applies_port() {
        let url = resolve(&config("/").with_port(8443), "x", false).unwrap();
        assert_eq!(url.as_str(), "https://dav.example.com:8443/x");
    }

    #[test]
    fn resolve_keeps_server_path() {
        let config = ConnectionConfig::new("https://cloud.example.com/nextcloud")
            .with_base_path("/remote.php/dav/");
        let url = resolve(&config, "docs/a.txt", false).unwrap();
        assert_eq!(url.as_str(), "https://cloud.example.com/nextcloud/remote.php/dav/docs/a.txt");
        assert_eq!(listing_root(&config).unwrap(), "/nextcloud/remote.php/dav/");

        let config = ConnectionConfig::new("https://cloud.example.com/my%20cloud/");
        let url = resolve(&config, "a b", true).unwrap();
        assert_eq!(url.path(), "/my%20cloud/a%20b/");
        assert_eq!(listing_root(&config).unwrap(), "/my%20cloud/");
    }

    #[test]
    fn resolve_rejects_bad_server() {
        let err = resolve(&ConnectionConfig::new("not a url"), "x", false).unwrap_err();
        assert!(matches!(err, ClientError::BuildError(_)));
    }

    #[test]
    fn split_file_and_directory() {
        let file = split_entry(&Href::new("/docs/a.txt"), "/", "/docs/").unwrap();
        assert_eq!(file.entry_type, EntryType::File);
        assert_eq!(file.directory, "/docs/");
        assert_eq!(file.name, "a.txt");
        assert_eq!(format!("{}{}", file.directory, file.name), file.path);

        let dir = split_entry(&Href::new("/docs/sub/"), "/", "/docs/").unwrap();
        assert_eq!(dir.entry_type, EntryType::Directory);
        assert_eq!(dir.directory, "/docs/");
        assert_eq!(dir.name, "sub");
        assert_eq!(dir.path, "/docs/sub/");
        assert_eq!(format!("{}{}/", dir.directory, dir.name), dir.path);
    }

    #[test]
    fn split_excludes_query_root() {
        assert!(split_entry(&Href::new("/docs/"), "/", "/docs/").is_none());
        assert!(split_entry(&Href::new("/docs/"), "/", "docs").is_none());
        assert!(split_entry(&Href::new("/"), "/", "/").is_none());
        assert!(split_entry(&Href::new("/dav/"), "/dav/", "/").is_none());
        assert!(split_entry(&Href::new("/dav"), "/dav/", "").is_none());
    }

    #[test]
    fn split_accepts_escaped_roots() {
        assert!(split_entry(&Href::new("/dav/My%20Folder/"), "/dav/", "My%20Folder").is_none());
        assert!(split_entry(&Href::new("/my%20cloud/"), "/my%20cloud/", "/").is_none());

        let entry = split_entry(&Href::new("/my%20cloud/x/a%231.txt"), "/my%20cloud/", "x%2F").unwrap();
        assert_eq!(entry.path, "/x/a#1.txt");
    }

    #[test]
    fn split_strips_base_path_and_decodes() {
        let entry = split_entry(&Href::new("/dav/my%20docs/r%C3%A9sum%C3%A9.pdf"), "/dav/", "/my docs/")
            .unwrap();
        assert_eq!(entry.path, "/my docs/résumé.pdf");
        assert_eq!(entry.directory, "/my docs/");
        assert_eq!(entry.name, "résumé.pdf");

        let outside = split_entry(&Href::new("/davx/f"), "/dav/", "/").unwrap();
        assert_eq!(outside.path, "/davx/f");
    }

    #[test]
    fn split_absolute_uri_href() {
        let entry = split_entry(
            &Href::new("https://dav.example.com/dav/docs/sub/"),
            "/dav/",
            "/docs/",
        )
        .unwrap();
        assert_eq!(entry.path, "/docs/sub/");
        assert_eq!(entry.name, "sub");
    }

    #[test]
    fn split_top_level_entries() {
        let entry = split_entry(&Href::new("/readme.md"), "/", "/").unwrap();
        assert_eq!(entry.directory, "/");
        assert_eq!(entry.name, "readme.md");

        let entry = split_entry(&Href::new("/photos/"), "/", "/").unwrap();
        assert_eq!(entry.directory, "/");
        assert_eq!(entry.name, "photos");
        assert_eq!(entry.entry_type, EntryType::Directory);
    }

    #[test]
    fn split_deep_listing() {
        let entry = split_entry(&Href::new("/docs/sub/deeper/x.bin"), "/", "/docs/").unwrap();
        assert_eq!(entry.directory, "/docs/sub/deeper/");
        assert_eq!(entry.name, "x.bin");
    }
}
