//! Minimal XML element tree.
//!
//! Every lookup returns an `Option`; a missing optional element is never an error.

use super::namespace::QName;

/// A parsed XML element with its resolved name, text content and child elements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlElement {
    /// Namespace-resolved element name.
    pub name: QName,
    /// Text directly inside this element (not trimmed).
    pub text: String,
    /// Child elements in document order.
    pub children: Vec<XmlElement>,
}

impl XmlElement {
    /// Creates an empty element.
    #[must_use]
    pub fn new(name: QName) -> Self {
        Self {
            name,
            text: String::new(),
            children: Vec::new(),
        }
    }

    /// Adds a child element.
    #[must_use]
    pub fn with_child(mut self, child: Self) -> Self {
        self.children.push(child);
        self
    }

    /// Sets the text content.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Returns whether this element has the given name.
    #[must_use]
    pub fn is(&self, name: &QName) -> bool {
        self.name == *name
    }

    /// Returns the first child with the given name.
    #[must_use]
    pub fn child(&self, name: &QName) -> Option<&Self> {
        self.children.iter().find(|c| c.is(name))
    }

    /// Returns all children with the given name.
    pub fn children_named<'a>(&'a self, name: &'a QName) -> impl Iterator<Item = &'a Self> + 'a {
        self.children.iter().filter(move |c| c.is(name))
    }

    /// Returns the first child element, whatever its name.
    #[must_use]
    pub fn first_child(&self) -> Option<&Self> {
        self.children.first()
    }

    /// Follows a path of child names, taking the first match at each step.
    #[must_use]
    pub fn path(&self, path: &[QName]) -> Option<&Self> {
        path.iter().try_fold(self, |current, name| current.child(name))
    }

    /// Returns the trimmed [`value`](Self::value) of the element at `path`.
    #[must_use]
    pub fn path_value(&self, path: &[QName]) -> Option<String> {
        self.path(path).map(Self::value)
    }

    /// Returns the trimmed text of this element and all descendants, concatenated.
    #[must_use]
    pub fn value(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out.trim().to_owned()
    }

    /// Returns whether the element has neither children nor non-whitespace text.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.children.is_empty() && self.text.trim().is_empty()
    }

    fn collect_text(&self, out: &mut String) {
        out.push_str(&self.text);
        for child in &self.children {
            child.collect_text(out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rfc::dav::core::dav_names;

    fn location() -> XmlElement {
        XmlElement::new(dav_names::location())
            .with_child(XmlElement::new(dav_names::href()).with_text("  /moved/to  "))
    }

    #[test]
    fn path_lookup() {
        let el = location();
        assert_eq!(
            el.path_value(&[dav_names::href()]).as_deref(),
            Some("/moved/to")
        );
        assert!(el.path(&[dav_names::href(), dav_names::status()]).is_none());
        assert!(el.path(&[dav_names::status()]).is_none());
    }

    #[test]
    fn empty_path_is_self() {
        let el = location();
        assert_eq!(el.path(&[]), Some(&el));
    }

    #[test]
    fn value_concatenates_descendants() {
        let el = XmlElement::new(dav_names::prop())
            .with_child(XmlElement::new(dav_names::displayname()).with_text("Docs"));
        assert_eq!(el.value(), "Docs");
        assert!(!el.is_empty());
        assert!(XmlElement::new(dav_names::resourcetype()).is_empty());
    }
}
