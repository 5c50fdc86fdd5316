//! PROPFIND request body serialization.

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};

use crate::error::{RfcError, RfcResult};
use crate::rfc::dav::core::{PropfindRequest, PropfindType, QName};

/// Serializes a PROPFIND request body.
///
/// ## Summary
/// The root carries `xmlns:D="DAV:"`. Each foreign namespace used by a
/// requested property is declared on the root, under its conventional
/// prefix when it has one and a generated `nsN` prefix otherwise.
///
/// ## Errors
/// Returns an error if XML writing fails.
pub fn serialize_propfind(request: &PropfindRequest) -> RfcResult<String> {
    let prefixes = Prefixes::collect(request);
    let mut writer = Writer::new(Vec::new());

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;

    let mut root = BytesStart::new("D:propfind");
    root.push_attribute(("xmlns:D", "DAV:"));
    for (uri, prefix) in &prefixes.foreign {
        root.push_attribute((format!("xmlns:{prefix}").as_str(), uri.as_str()));
    }
    writer.write_event(Event::Start(root))?;

    match &request.propfind_type {
        PropfindType::PropName => {
            writer.write_event(Event::Empty(BytesStart::new("D:propname")))?;
        }
        PropfindType::AllProp { include } => {
            writer.write_event(Event::Empty(BytesStart::new("D:allprop")))?;
            if !include.is_empty() {
                write_names(&mut writer, "D:include", include, &prefixes)?;
            }
        }
        PropfindType::Prop(properties) => {
            write_names(&mut writer, "D:prop", properties, &prefixes)?;
        }
    }

    writer.write_event(Event::End(BytesEnd::new("D:propfind")))?;

    String::from_utf8(writer.into_inner())
        .map_err(|e| RfcError::SerializeError(format!("invalid UTF-8 in PROPFIND body: {e}")))
}

/// Writes `container` holding one empty element per name.
fn write_names<W: std::io::Write>(
    writer: &mut Writer<W>,
    container: &str,
    names: &[QName],
    prefixes: &Prefixes,
) -> Result<(), quick_xml::Error> {
    writer.write_event(Event::Start(BytesStart::new(container)))?;
    for name in names {
        let elem_name = format!("{}:{}", prefixes.prefix_for(name), name.local_name());
        writer.write_event(Event::Empty(BytesStart::new(elem_name.as_str())))?;
    }
    writer.write_event(Event::End(BytesEnd::new(container)))?;
    Ok(())
}

/// Prefix assignment for the namespaces a request mentions.
struct Prefixes {
    foreign: Vec<(String, String)>,
}

impl Prefixes {
    fn collect(request: &PropfindRequest) -> Self {
        let mut foreign: Vec<(String, String)> = Vec::new();
        let mut generated = 0;
        for name in request.named_properties().iter().filter(|n| !n.is_dav()) {
            let uri = name.namespace_uri();
            if foreign.iter().any(|(known, _)| known == uri) {
                continue;
            }
            let prefix = if let Some(prefix) = name.namespace.default_prefix() {
                prefix.to_owned()
            } else {
                generated += 1;
                format!("ns{generated}")
            };
            foreign.push((uri.to_owned(), prefix));
        }
        Self { foreign }
    }

    fn prefix_for(&self, name: &QName) -> &str {
        if name.is_dav() {
            return "D";
        }
        self.foreign
            .iter()
            .find(|(uri, _)| uri == name.namespace_uri())
            .map_or("D", |(_, prefix)| prefix.as_str())
    }
}
