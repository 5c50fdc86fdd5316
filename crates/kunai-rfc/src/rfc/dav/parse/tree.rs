//! Namespace-aware XML document parsing into an [`XmlElement`] tree.

use quick_xml::NsReader;
use quick_xml::events::Event;
use quick_xml::name::ResolveResult;

use super::error::{ParseError, ParseResult};
use crate::rfc::dav::core::{DAV_NS, Namespace, QName, XmlElement};

/// Parses a complete XML document and returns its root element.
///
/// ## Summary
/// Element names are resolved against the in-scope namespace declarations.
/// Unprefixed elements without a default namespace are treated as `DAV:`,
/// which keeps sloppy servers readable.
///
/// ## Errors
/// Returns an error carrying the byte offset it was detected at if the
/// document is not well-formed, has no root element, uses an undeclared
/// prefix, or contains an unknown entity.
pub fn parse_document(xml: &[u8]) -> ParseResult<XmlElement> {
    let mut reader = NsReader::from_reader(xml);
    reader.config_mut().expand_empty_elements = true;

    build_tree(&mut reader).map_err(|err| err.at(reader.buffer_position()))
}

fn build_tree(reader: &mut NsReader<&[u8]>) -> ParseResult<XmlElement> {
    let mut buf = Vec::new();
    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;

    loop {
        let (resolved, event) = reader.read_resolved_event_into(&mut buf)?;
        let namespace = owned_namespace(resolved);

        match event {
            Event::Start(ref e) | Event::Empty(ref e) => {
                if root.is_some() {
                    return Err(ParseError::xml("multiple root elements"));
                }
                let local_name = std::str::from_utf8(e.local_name().as_ref())?.to_owned();
                let name = QName::new(Namespace::new(namespace?), local_name);
                let element = XmlElement::new(name);
                if matches!(event, Event::Empty(_)) {
                    attach(&mut stack, &mut root, element);
                } else {
                    stack.push(element);
                }
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| ParseError::xml("unexpected closing tag"))?;
                attach(&mut stack, &mut root, element);
            }
            Event::Text(ref e) => {
                if let Some(current) = stack.last_mut() {
                    let decoded = reader.decoder().decode(e.as_ref())?;
                    current.text.push_str(&decoded);
                }
            }
            Event::CData(ref e) => {
                if let Some(current) = stack.last_mut() {
                    let text = std::str::from_utf8(e.as_ref())?;
                    current.text.push_str(text);
                }
            }
            Event::GeneralRef(ref e) => {
                let resolved = if let Some(ch) = e
                    .resolve_char_ref()
                    .map_err(|err| ParseError::invalid_value(err.to_string()))?
                {
                    ch.to_string()
                } else {
                    let entity = e.decode().map_err(|err| ParseError::xml(err.to_string()))?;
                    quick_xml::escape::resolve_predefined_entity(&entity)
                        .ok_or_else(|| {
                            ParseError::invalid_value(format!("unknown entity: &{entity};"))
                        })?
                        .to_owned()
                };
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&resolved);
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if !stack.is_empty() {
        return Err(ParseError::xml("unexpected end of document"));
    }

    root.ok_or_else(|| ParseError::xml("document has no root element"))
}

/// Places a finished element under its parent, or makes it the root.
fn attach(stack: &mut [XmlElement], root: &mut Option<XmlElement>, element: XmlElement) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None => *root = Some(element),
    }
}

/// Converts a resolved namespace into an owned URI, releasing the reader borrow.
fn owned_namespace(resolved: ResolveResult<'_>) -> ParseResult<String> {
    match resolved {
        ResolveResult::Bound(ns) => Ok(std::str::from_utf8(ns.as_ref())?.to_owned()),
        ResolveResult::Unbound => Ok(DAV_NS.to_owned()),
        ResolveResult::Unknown(prefix) => Err(ParseError::unsupported_namespace(
            &String::from_utf8_lossy(&prefix),
        )),
    }
}
