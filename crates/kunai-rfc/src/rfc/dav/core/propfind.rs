//! What a `PROPFIND` asks the server for.

use super::namespace::{QName, dav_names};

/// The body of a `PROPFIND` request.
///
/// Listings default to [`PropfindRequest::propname`], which only learns
/// which properties exist. Use [`PropfindRequest::entry_properties`] or
/// [`PropfindRequest::allprop`] to get sizes, types and timestamps back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropfindRequest {
    pub propfind_type: PropfindType,
}

/// The three request shapes of RFC 4918 section 14.20.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropfindType {
    /// `<allprop/>`, optionally followed by `<include>` for properties
    /// servers leave out of allprop.
    AllProp { include: Vec<QName> },
    /// `<propname/>`.
    PropName,
    /// `<prop>` with an explicit list.
    Prop(Vec<QName>),
}

impl PropfindRequest {
    #[must_use]
    pub fn allprop() -> Self {
        Self::allprop_with_include(Vec::new())
    }

    #[must_use]
    pub fn allprop_with_include(include: Vec<QName>) -> Self {
        Self {
            propfind_type: PropfindType::AllProp { include },
        }
    }

    #[must_use]
    pub fn propname() -> Self {
        Self {
            propfind_type: PropfindType::PropName,
        }
    }

    #[must_use]
    pub fn prop(properties: Vec<QName>) -> Self {
        Self {
            propfind_type: PropfindType::Prop(properties),
        }
    }

    /// Asks for exactly what a listing entry is built from: resource type,
    /// length and modification time.
    #[must_use]
    pub fn entry_properties() -> Self {
        Self::prop(vec![
            dav_names::resourcetype(),
            dav_names::getcontentlength(),
            dav_names::getlastmodified(),
        ])
    }

    /// Adds a property to a `prop` or `allprop` request.
    ///
    /// A `propname` request becomes a `prop` request for just that property.
    #[must_use]
    pub fn with_property(mut self, name: QName) -> Self {
        match &mut self.propfind_type {
            PropfindType::Prop(names) | PropfindType::AllProp { include: names } => {
                if !names.contains(&name) {
                    names.push(name);
                }
            }
            PropfindType::PropName => self.propfind_type = PropfindType::Prop(vec![name]),
        }
        self
    }

    /// Returns the explicitly named properties: the `prop` list or the
    /// allprop `include` list. Empty for `propname`.
    #[must_use]
    pub fn named_properties(&self) -> &[QName] {
        match &self.propfind_type {
            PropfindType::Prop(names) | PropfindType::AllProp { include: names } => names,
            PropfindType::PropName => &[],
        }
    }
}

impl Default for PropfindRequest {
    fn default() -> Self {
        Self::propname()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_propname() {
        let request = PropfindRequest::default();
        assert_eq!(request.propfind_type, PropfindType::PropName);
        assert!(request.named_properties().is_empty());
    }

    #[test]
    fn with_property_extends_or_converts() {
        let fileid = QName::new("http://owncloud.org/ns", "fileid");

        let request = PropfindRequest::entry_properties()
            .with_property(fileid.clone())
            .with_property(dav_names::getcontentlength());
        assert_eq!(request.named_properties().len(), 4);

        let request = PropfindRequest::allprop().with_property(fileid.clone());
        assert_eq!(
            request.propfind_type,
            PropfindType::AllProp {
                include: vec![fileid.clone()]
            }
        );

        let request = PropfindRequest::propname().with_property(fileid.clone());
        assert_eq!(request, PropfindRequest::prop(vec![fileid]));
    }
}
