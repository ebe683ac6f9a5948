//! Writing a [`Document`] back to markup text.

use std::borrow::Cow;
use std::io::Write;

use quick_xml::events::attributes::Attribute;
use quick_xml::events::{BytesCData, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::name::QName;
use quick_xml::Writer;

use super::dom::{Document, Element, Node, RawKind};
use crate::error::MarkupError;

/// Serializes a document to a string.
pub fn write_document(document: &Document) -> Result<String, MarkupError> {
    let mut buffer = Vec::new();
    write_document_to(document, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| MarkupError::Write(e.to_string()))
}

/// Serializes a document into any writer.
pub fn write_document_to(document: &Document, out: impl Write) -> Result<(), MarkupError> {
    let mut writer = Writer::new(out);
    for node in &document.nodes {
        write_node(&mut writer, node)?;
    }
    Ok(())
}

fn write_node<W: Write>(writer: &mut Writer<W>, node: &Node) -> Result<(), MarkupError> {
    match node {
        Node::Element(element) => write_element(writer, element),
        Node::Text(raw) => emit(writer, Event::Text(BytesText::from_escaped(raw.as_str()))),
        Node::Comment(raw) => emit(
            writer,
            Event::Comment(BytesText::from_escaped(raw.as_str())),
        ),
        Node::CData(text) => emit(writer, Event::CData(BytesCData::new(text.as_str()))),
        Node::Raw(kind, content) => {
            let text = match kind {
                RawKind::Declaration | RawKind::ProcessingInstruction => {
                    format!("<?{}?>", content)
                }
                RawKind::DocType => format!("<!DOCTYPE {}>", content),
            };
            writer
                .get_mut()
                .write_all(text.as_bytes())
                .map_err(|e| MarkupError::Write(e.to_string()))
        }
    }
}

fn write_element<W: Write>(writer: &mut Writer<W>, element: &Element) -> Result<(), MarkupError> {
    let mut start = BytesStart::new(element.name.as_str());
    for (name, raw) in &element.attributes {
        start.push_attribute(Attribute {
            key: QName(name.as_bytes()),
            value: Cow::Borrowed(raw.as_bytes()),
        });
    }

    if element.self_closing && element.children.is_empty() {
        return emit(writer, Event::Empty(start));
    }

    emit(writer, Event::Start(start))?;
    for child in &element.children {
        write_node(writer, child)?;
    }
    emit(writer, Event::End(BytesEnd::new(element.name.as_str())))
}

fn emit<W: Write>(writer: &mut Writer<W>, event: Event<'_>) -> Result<(), MarkupError> {
    writer
        .write_event(event)
        .map_err(|e| MarkupError::Write(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::parse::parse_document;

    fn round_trip(text: &str) -> String {
        write_document(&parse_document(text).unwrap()).unwrap()
    }

    #[test]
    fn untouched_markup_round_trips() {
        let source = "<html>\n  <body class=\"main\">\n    <p title=\"a &amp; b\">x &lt; y</p>\n    <br/>\n    <!-- note -->\n  </body>\n</html>";
        assert_eq!(round_trip(source), source);
    }

    #[test]
    fn cdata_and_declaration_round_trip() {
        let source = "<?xml version=\"1.0\"?><doc><![CDATA[<raw>]]></doc>";
        assert_eq!(round_trip(source), source);
    }

    #[test]
    fn built_elements_are_escaped() {
        let mut p = Element::new("p");
        p.set_attribute("title", "\"quoted\"");
        p.set_text("1 < 2");
        let doc = Document::new(vec![p.into()]);
        assert_eq!(
            write_document(&doc).unwrap(),
            "<p title=\"&quot;quoted&quot;\">1 &lt; 2</p>"
        );
    }
}
