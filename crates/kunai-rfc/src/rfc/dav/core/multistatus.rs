//! Multistatus response types.
//!
//! Read-only views over a parsed `DAV:multistatus` document (RFC 4918 §13).
//! The derived accessors on [`Response`] only look at properties reported
//! under a `200` property status; a property the server answered with, say,
//! `404` never surfaces as a value.

use chrono::{DateTime, FixedOffset};
use http::StatusCode;

use super::element::XmlElement;
use super::href::Href;
use super::namespace::{QName, dav_names};
use super::status::parse_status_line;

/// A multistatus response (RFC 4918 §13).
#[derive(Debug, Clone, Default)]
pub struct Multistatus {
    /// Individual responses, in document order.
    pub responses: Vec<Response>,
    /// Optional top-level response description.
    pub description: Option<String>,
}

impl Multistatus {
    /// Returns true if there are no responses.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.responses.is_empty()
    }

    /// Returns the number of responses.
    #[must_use]
    pub fn len(&self) -> usize {
        self.responses.len()
    }

    /// Finds the response whose primary href matches `href` exactly.
    #[must_use]
    pub fn response_for(&self, href: &str) -> Option<&Response> {
        self.responses.iter().find(|r| r.href.as_str() == href)
    }
}

impl IntoIterator for Multistatus {
    type Item = Response;
    type IntoIter = std::vec::IntoIter<Response>;

    fn into_iter(self) -> Self::IntoIter {
        self.responses.into_iter()
    }
}

/// A single `DAV:response` element.
///
/// A response either carries extra `hrefs` plus a response-level `status`
/// (multi-target results), or a list of property statuses, never both.
#[derive(Debug, Clone)]
pub struct Response {
    /// Primary resource href.
    pub href: Href,
    /// Additional hrefs sharing the response-level status.
    pub hrefs: Vec<Href>,
    /// Response-level status line.
    pub status: Option<String>,
    /// Per-property statuses. Empty when `hrefs` is not.
    pub propstats: Vec<PropertyStatus>,
    /// First child of the `DAV:error` element (the failed precondition).
    pub error: Option<XmlElement>,
    /// Optional response description.
    pub description: Option<String>,
    /// Target of a redirect (`DAV:location/DAV:href`).
    pub location: Option<Href>,
}

impl Response {
    /// Creates a response with only an href.
    #[must_use]
    pub fn new(href: impl Into<Href>) -> Self {
        Self {
            href: href.into(),
            hrefs: Vec::new(),
            status: None,
            propstats: Vec::new(),
            error: None,
            description: None,
            location: None,
        }
    }

    /// Returns the code parsed from the response-level status line.
    #[must_use]
    pub fn status_code(&self) -> Option<StatusCode> {
        self.status.as_deref().and_then(parse_status_line)
    }

    /// Returns every property element named `name` reported with a `200` status.
    pub fn ok_properties<'a>(&'a self, name: &QName) -> impl Iterator<Item = &'a XmlElement> {
        self.propstats
            .iter()
            .filter(|ps| ps.status_code() == Some(StatusCode::OK))
            .flat_map(move |ps| ps.properties.iter().filter(move |p| p.is(name)))
    }

    /// Returns the first `200` property element named `name`.
    #[must_use]
    pub fn property(&self, name: &QName) -> Option<&XmlElement> {
        self.ok_properties(name).next()
    }

    /// Returns the trimmed value of the first `200` property named `name`,
    /// or `None` when it is missing or empty.
    #[must_use]
    pub fn property_value(&self, name: &QName) -> Option<String> {
        self.property(name)
            .map(XmlElement::value)
            .filter(|v| !v.is_empty())
    }

    /// Returns `DAV:creationdate` (RFC 3339).
    #[must_use]
    pub fn creation_date(&self) -> Option<DateTime<FixedOffset>> {
        let value = self.property_value(&dav_names::creationdate())?;
        parse_date(&value, "creationdate")
    }

    /// Returns `DAV:getlastmodified` (RFC 1123).
    #[must_use]
    pub fn last_modified(&self) -> Option<DateTime<FixedOffset>> {
        let value = self.property_value(&dav_names::getlastmodified())?;
        parse_date(&value, "getlastmodified")
    }

    /// Returns the resource type.
    ///
    /// `Collection` if any `DAV:resourcetype` contains `DAV:collection`,
    /// `Default` if resource types exist but none is a collection, and
    /// `None` if the property does not appear at all.
    #[must_use]
    pub fn resource_type(&self) -> Option<ResourceType> {
        let name = dav_names::resourcetype();
        let collection = dav_names::collection();
        let mut seen = false;
        for rt in self.ok_properties(&name) {
            if rt.child(&collection).is_some() {
                return Some(ResourceType::Collection);
            }
            seen = true;
        }
        seen.then_some(ResourceType::Default)
    }

    /// Returns `DAV:getcontentlength`.
    #[must_use]
    pub fn content_length(&self) -> Option<u64> {
        let value = self.property_value(&dav_names::getcontentlength())?;
        match value.parse::<u64>() {
            Ok(length) => Some(length),
            Err(err) => {
                tracing::warn!(href = %self.href, value = %value, error = %err, "Invalid getcontentlength");
                None
            }
        }
    }

    /// Returns `DAV:getcontenttype`.
    #[must_use]
    pub fn content_type(&self) -> Option<String> {
        self.property_value(&dav_names::getcontenttype())
    }

    /// Returns `DAV:getetag`.
    #[must_use]
    pub fn etag(&self) -> Option<String> {
        self.property_value(&dav_names::getetag())
    }

    /// Returns `DAV:displayname`.
    #[must_use]
    pub fn display_name(&self) -> Option<String> {
        self.property_value(&dav_names::displayname())
    }
}

fn parse_date(value: &str, property: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(value)
        .or_else(|_| DateTime::parse_from_rfc2822(value))
        .map_err(|err| {
            tracing::warn!(property, value, error = %err, "Unparsable date property");
        })
        .ok()
}

/// One `DAV:propstat` block.
#[derive(Debug, Clone, Default)]
pub struct PropertyStatus {
    /// Property elements inside `DAV:prop`.
    pub properties: Vec<XmlElement>,
    /// Status line covering these properties.
    pub status: Option<String>,
    /// First child of the `DAV:error` element.
    pub error: Option<XmlElement>,
    /// Optional description.
    pub description: Option<String>,
}

impl PropertyStatus {
    /// Creates a property status.
    #[must_use]
    pub fn new(status: impl Into<String>, properties: Vec<XmlElement>) -> Self {
        Self {
            properties,
            status: Some(status.into()),
            error: None,
            description: None,
        }
    }

    /// Returns the code parsed from the status line.
    #[must_use]
    pub fn status_code(&self) -> Option<StatusCode> {
        self.status.as_deref().and_then(parse_status_line)
    }
}

/// Resource type derived from `DAV:resourcetype`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceType {
    /// A non-collection resource.
    Default,
    /// A collection (directory).
    Collection,
}
