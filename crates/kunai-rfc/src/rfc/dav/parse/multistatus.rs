//! `DAV:multistatus` response body parsing.

use super::error::{ParseError, ParseResult};
use super::tree::parse_document;
use crate::rfc::dav::core::{Href, Multistatus, PropertyStatus, QName, Response, XmlElement, dav_names};

/// Parses a multistatus response body.
///
/// ## Summary
/// Builds the typed [`Multistatus`] view over the document. A multistatus
/// without any `response` children is valid and yields an empty result.
///
/// ## Errors
/// Returns an error if the XML is malformed, if the root element is not
/// `DAV:multistatus`, or if a `response` has no `href`
/// ([`ParseErrorKind::MissingElement`](super::ParseErrorKind::MissingElement)).
#[tracing::instrument(skip(xml), fields(xml_len = xml.len()))]
pub fn parse_multistatus(xml: &[u8]) -> ParseResult<Multistatus> {
    let root = parse_document(xml)?;
    if !root.is(&dav_names::multistatus()) {
        return Err(ParseError::unexpected_element(&root.name.to_string()));
    }

    let responses = root
        .children_named(&dav_names::response())
        .map(parse_response)
        .collect::<ParseResult<Vec<_>>>()?;

    tracing::debug!(count = responses.len(), "Parsed multistatus");

    Ok(Multistatus {
        responses,
        description: text_child(&root, &dav_names::responsedescription()),
    })
}

fn parse_response(element: &XmlElement) -> ParseResult<Response> {
    let href_name = dav_names::href();
    let mut hrefs = element
        .children_named(&href_name)
        .map(|h| Href::new(h.value()));
    let href = hrefs
        .next()
        .ok_or_else(|| ParseError::missing_element("href"))?;
    let hrefs: Vec<Href> = hrefs.collect();

    // The two response shapes are exclusive: extra hrefs share the
    // response-level status and carry no propstats.
    let propstats = if hrefs.is_empty() {
        element
            .children_named(&dav_names::propstat())
            .map(parse_propstat)
            .collect()
    } else {
        Vec::new()
    };

    Ok(Response {
        href,
        hrefs,
        status: text_child(element, &dav_names::status()),
        propstats,
        error: error_condition(element),
        description: text_child(element, &dav_names::responsedescription()),
        location: element
            .path_value(&[dav_names::location(), href_name])
            .map(Href::new),
    })
}

fn parse_propstat(element: &XmlElement) -> PropertyStatus {
    let properties = element
        .child(&dav_names::prop())
        .map(|prop| prop.children.clone())
        .unwrap_or_default();

    PropertyStatus {
        properties,
        status: text_child(element, &dav_names::status()),
        error: error_condition(element),
        description: text_child(element, &dav_names::responsedescription()),
    }
}

fn text_child(element: &XmlElement, name: &QName) -> Option<String> {
    element.child(name).map(XmlElement::value)
}

fn error_condition(element: &XmlElement) -> Option<XmlElement> {
    element
        .child(&dav_names::error())
        .and_then(XmlElement::first_child)
        .cloned()
}
