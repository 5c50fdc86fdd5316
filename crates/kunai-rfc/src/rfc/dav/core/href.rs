//! DAV href type.

use std::fmt;

use percent_encoding::percent_decode_str;

/// A `WebDAV` href (URL reference) as sent by the server.
///
/// Servers send either an absolute path (`/dav/file.txt`) or an absolute
/// URI (`https://host/dav/file.txt`); both are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Href(pub String);

impl Href {
    /// Creates a new href.
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// Returns the href as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns whether the href is an absolute URI (has a scheme).
    #[must_use]
    pub fn is_absolute_uri(&self) -> bool {
        self.0.contains("://")
    }

    /// Returns the path component, dropping scheme and authority of an
    /// absolute URI as well as any query or fragment.
    #[must_use]
    pub fn path(&self) -> &str {
        let path = match self.0.split_once("://") {
            Some((_, rest)) => rest.find('/').map_or("/", |i| &rest[i..]),
            None => self.0.as_str(),
        };
        path.split(['?', '#']).next().unwrap_or(path)
    }

    /// Returns whether this href ends with a slash.
    #[must_use]
    pub fn is_collection(&self) -> bool {
        self.path().ends_with('/')
    }

    /// Returns the last path segment (resource name), still escaped.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        let path = self.path().trim_end_matches('/');
        path.rsplit('/').next().filter(|name| !name.is_empty())
    }

    /// URL-decodes the path component.
    #[must_use]
    pub fn decoded_path(&self) -> String {
        percent_decode_str(self.path())
            .decode_utf8_lossy()
            .into_owned()
    }
}

impl fmt::Display for Href {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for Href {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for Href {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for Href {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn href_path_of_absolute_uri() {
        let href = Href::new("https://dav.example.com:8443/dav/a%20b.txt?x=1");
        assert!(href.is_absolute_uri());
        assert_eq!(href.path(), "/dav/a%20b.txt");

        assert_eq!(Href::new("http://host").path(), "/");
        assert_eq!(Href::new("/plain/path/").path(), "/plain/path/");
    }

    #[test]
    fn href_is_collection() {
        assert!(Href::new("/docs/").is_collection());
        assert!(!Href::new("/docs/a.txt").is_collection());
        assert!(Href::new("http://host/docs/").is_collection());
    }

    #[test]
    fn href_name() {
        assert_eq!(Href::new("/docs/sub/").name(), Some("sub"));
        assert_eq!(Href::new("/docs/a.txt").name(), Some("a.txt"));
        assert_eq!(Href::new("/").name(), None);
    }

    #[test]
    fn href_decode() {
        assert_eq!(
            Href::new("/path%20with%20spaces/").decoded_path(),
            "/path with spaces/"
        );
        assert_eq!(Href::new("/caf%C3%A9.txt").decoded_path(), "/café.txt");
        assert_eq!(Href::new("/a+b").decoded_path(), "/a+b");
    }
}
