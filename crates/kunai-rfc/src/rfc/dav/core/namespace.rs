//! XML namespace and qualified name types.

use std::borrow::Cow;

/// `DAV:` namespace URI.
pub const DAV_NS: &str = "DAV:";

/// ownCloud extension properties (`fileid`, `size`, `permissions`, ...).
pub const OWNCLOUD_NS: &str = "http://owncloud.org/ns";

/// Nextcloud extension properties.
pub const NEXTCLOUD_NS: &str = "http://nextcloud.org/ns";

/// An XML namespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Namespace(pub Cow<'static, str>);

impl Namespace {
    /// `DAV:` namespace.
    pub const DAV: Self = Self(Cow::Borrowed(DAV_NS));

    /// Creates a new namespace from a string.
    #[must_use]
    pub fn new(uri: impl Into<Cow<'static, str>>) -> Self {
        Self(uri.into())
    }

    /// Returns the namespace URI.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the conventional prefix for this namespace.
    #[must_use]
    pub fn default_prefix(&self) -> Option<&'static str> {
        match self.0.as_ref() {
            DAV_NS => Some("D"),
            OWNCLOUD_NS => Some("oc"),
            NEXTCLOUD_NS => Some("nc"),
            _ => None,
        }
    }
}

impl From<&'static str> for Namespace {
    fn from(s: &'static str) -> Self {
        Self(Cow::Borrowed(s))
    }
}

impl From<String> for Namespace {
    fn from(s: String) -> Self {
        Self(Cow::Owned(s))
    }
}

/// A qualified XML name (namespace + local name).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QName {
    /// The namespace URI.
    pub namespace: Namespace,
    /// The local name.
    pub local_name: Cow<'static, str>,
}

impl QName {
    /// Creates a new qualified name.
    #[must_use]
    pub fn new(namespace: impl Into<Namespace>, local_name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            namespace: namespace.into(),
            local_name: local_name.into(),
        }
    }

    /// Creates a `DAV:` qualified name.
    #[must_use]
    pub fn dav(local_name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            namespace: Namespace::DAV,
            local_name: local_name.into(),
        }
    }

    /// Returns the local name.
    #[must_use]
    pub fn local_name(&self) -> &str {
        &self.local_name
    }

    /// Returns the namespace URI.
    #[must_use]
    pub fn namespace_uri(&self) -> &str {
        self.namespace.as_str()
    }

    /// Returns whether this is a DAV: element.
    #[must_use]
    pub fn is_dav(&self) -> bool {
        self.namespace == Namespace::DAV
    }

    /// Returns whether this is the `DAV:` element with the given local name.
    #[must_use]
    pub fn is_dav_named(&self, local_name: &str) -> bool {
        self.is_dav() && self.local_name == local_name
    }
}

impl std::fmt::Display for QName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{{}}}{}", self.namespace.as_str(), self.local_name)
    }
}

/// `DAV:` element and property names read from or written to the wire.
pub mod dav_names {
    use super::QName;

    #[must_use]
    pub fn multistatus() -> QName {
        QName::dav("multistatus")
    }
    #[must_use]
    pub fn response() -> QName {
        QName::dav("response")
    }
    #[must_use]
    pub fn href() -> QName {
        QName::dav("href")
    }
    #[must_use]
    pub fn propstat() -> QName {
        QName::dav("propstat")
    }
    #[must_use]
    pub fn prop() -> QName {
        QName::dav("prop")
    }
    #[must_use]
    pub fn status() -> QName {
        QName::dav("status")
    }
    #[must_use]
    pub fn error() -> QName {
        QName::dav("error")
    }
    #[must_use]
    pub fn responsedescription() -> QName {
        QName::dav("responsedescription")
    }
    #[must_use]
    pub fn location() -> QName {
        QName::dav("location")
    }
    #[must_use]
    pub fn propfind() -> QName {
        QName::dav("propfind")
    }
    #[must_use]
    pub fn propname() -> QName {
        QName::dav("propname")
    }
    #[must_use]
    pub fn allprop() -> QName {
        QName::dav("allprop")
    }
    #[must_use]
    pub fn include() -> QName {
        QName::dav("include")
    }
    #[must_use]
    pub fn collection() -> QName {
        QName::dav("collection")
    }
    #[must_use]
    pub fn resourcetype() -> QName {
        QName::dav("resourcetype")
    }
    #[must_use]
    pub fn displayname() -> QName {
        QName::dav("displayname")
    }
    #[must_use]
    pub fn getcontenttype() -> QName {
        QName::dav("getcontenttype")
    }
    #[must_use]
    pub fn getcontentlength() -> QName {
        QName::dav("getcontentlength")
    }
    #[must_use]
    pub fn getlastmodified() -> QName {
        QName::dav("getlastmodified")
    }
    #[must_use]
    pub fn getetag() -> QName {
        QName::dav("getetag")
    }
    #[must_use]
    pub fn creationdate() -> QName {
        QName::dav("creationdate")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn qname_display() {
        let qname = QName::dav("resourcetype");
        assert_eq!(qname.to_string(), "{DAV:}resourcetype");
    }

    #[test]
    fn qname_is_dav() {
        let qname = QName::dav("displayname");
        assert!(qname.is_dav());
        assert!(qname.is_dav_named("displayname"));
        assert!(!QName::new("http://owncloud.org/ns", "fileid").is_dav());
    }

    #[test]
    fn namespace_prefix() {
        assert_eq!(Namespace::DAV.default_prefix(), Some("D"));
        assert_eq!(Namespace::new(OWNCLOUD_NS).default_prefix(), Some("oc"));
        assert_eq!(Namespace::new("urn:example:custom").default_prefix(), None);
    }

    #[test]
    fn qnames_compare_across_owned_and_borrowed() {
        let owned = QName::new(Namespace::new(DAV_NS.to_owned()), "href".to_owned());
        assert_eq!(owned, dav_names::href());
    }
}
