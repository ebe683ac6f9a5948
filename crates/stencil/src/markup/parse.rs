//! Parsing markup into a [`Document`].

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use super::dom::{Document, Element, Node, RawKind};
use crate::error::MarkupError;

/// Parses well-formed XML or XHTML.
///
/// Whitespace text is kept, and text and attribute values stay escaped.
///
/// # Errors
///
/// Returns [`MarkupError::Parse`] for malformed input and
/// [`MarkupError::Unbalanced`] when elements are left open.
pub fn parse_document(text: &str) -> Result<Document, MarkupError> {
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(false);

    // The bottom frame collects top-level nodes.
    let mut stack: Vec<Element> = vec![Element::default()];

    loop {
        let event = reader.read_event().map_err(|e| MarkupError::Parse {
            position: reader.buffer_position() as u64,
            message: e.to_string(),
        })?;

        match event {
            Event::Start(start) => {
                stack.push(element_from(&start)?);
            }
            Event::Empty(start) => {
                let mut element = element_from(&start)?;
                element.self_closing = true;
                push_node(&mut stack, Node::Element(element));
            }
            Event::End(end) => {
                if stack.len() < 2 {
                    return Err(MarkupError::Unbalanced(format!(
                        "unexpected closing tag </{}>",
                        lossy(end.name().as_ref())
                    )));
                }
                if let Some(element) = stack.pop() {
                    push_node(&mut stack, Node::Element(element));
                }
            }
            Event::Text(text) => push_node(&mut stack, Node::Text(lossy(&text))),
            Event::CData(data) => push_node(&mut stack, Node::CData(lossy(&data))),
            Event::Comment(comment) => push_node(&mut stack, Node::Comment(lossy(&comment))),
            Event::Decl(decl) => {
                push_node(&mut stack, Node::Raw(RawKind::Declaration, lossy(&decl)))
            }
            Event::PI(pi) => push_node(
                &mut stack,
                Node::Raw(RawKind::ProcessingInstruction, lossy(&pi)),
            ),
            Event::DocType(doctype) => {
                push_node(&mut stack, Node::Raw(RawKind::DocType, lossy(&doctype)))
            }
            Event::Eof => break,
        }
    }

    if stack.len() > 1 {
        let open: Vec<_> = stack[1..].iter().map(|e| e.name.as_str()).collect();
        return Err(MarkupError::Unbalanced(format!(
            "unclosed elements: {}",
            open.join(" > ")
        )));
    }

    let root = stack.pop().unwrap_or_default();
    Ok(Document::new(root.children))
}

fn element_from(start: &BytesStart<'_>) -> Result<Element, MarkupError> {
    let mut element = Element::new(lossy(start.name().as_ref()));
    for attribute in start.attributes() {
        let attribute = attribute.map_err(|e| MarkupError::Parse {
            position: 0,
            message: e.to_string(),
        })?;
        element.attributes.push((
            lossy(attribute.key.as_ref()),
            lossy(attribute.value.as_ref()),
        ));
    }
    Ok(element)
}

fn push_node(stack: &mut [Element], node: Node) {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(node);
    }
}

fn lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}
