//! A minimal element tree.
//!
//! Text and attribute values are stored in their escaped source form, so a
//! document that is parsed and written back without substitutions comes out
//! byte for byte the same (modulo self-closing tag spelling).

use quick_xml::escape::{escape, unescape};

/// A node in the tree.
#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    Element(Element),
    /// Escaped character data.
    Text(String),
    Comment(String),
    CData(String),
    /// Declarations, processing instructions and doctypes, written back
    /// verbatim (without their angle brackets).
    Raw(RawKind, String),
}

/// Kind of a [`Node::Raw`] node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RawKind {
    Declaration,
    ProcessingInstruction,
    DocType,
}

impl Node {
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            Node::Element(e) => Some(e),
            _ => None,
        }
    }

    /// Builds a text node from unescaped text.
    pub fn text(text: &str) -> Self {
        Node::Text(escape(text).into_owned())
    }
}

/// An element with its attributes and children.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Element {
    pub name: String,
    /// Attribute names with their escaped values, in source order.
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
    /// Written as `<name/>` when it has no children.
    pub self_closing: bool,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Element {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_attribute(mut self, name: &str, value: &str) -> Self {
        self.set_attribute(name, value);
        self
    }

    pub fn with_child(mut self, child: impl Into<Node>) -> Self {
        self.children.push(child.into());
        self
    }

    /// Raw (escaped) attribute value.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Unescaped attribute value. Undecodable values are returned raw.
    pub fn attribute_text(&self, name: &str) -> Option<String> {
        self.attribute(name).map(|raw| {
            unescape(raw)
                .map(|v| v.into_owned())
                .unwrap_or_else(|_| raw.to_string())
        })
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.iter().any(|(n, _)| n == name)
    }

    /// Sets an attribute from unescaped text, replacing any previous value.
    pub fn set_attribute(&mut self, name: &str, value: &str) {
        let escaped = escape(value).into_owned();
        match self.attributes.iter_mut().find(|(n, _)| n == name) {
            Some((_, v)) => *v = escaped,
            None => self.attributes.push((name.to_string(), escaped)),
        }
    }

    /// Removes an attribute, returning its raw value.
    pub fn remove_attribute(&mut self, name: &str) -> Option<String> {
        let index = self.attributes.iter().position(|(n, _)| n == name)?;
        Some(self.attributes.remove(index).1)
    }

    pub fn insert_child(&mut self, index: usize, child: Node) {
        let index = index.min(self.children.len());
        self.children.insert(index, child);
    }

    pub fn remove_child(&mut self, index: usize) -> Option<Node> {
        (index < self.children.len()).then(|| self.children.remove(index))
    }

    /// Replaces all children with a single text node.
    pub fn set_text(&mut self, text: &str) {
        self.children = vec![Node::text(text)];
    }

    /// Concatenated unescaped text of all descendants.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(&self.children, &mut out);
        out
    }

    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(Node::as_element)
    }

    /// First descendant element (depth-first) with the given name.
    pub fn find(&self, name: &str) -> Option<&Element> {
        self.child_elements()
            .find_map(|e| if e.name == name { Some(e) } else { e.find(name) })
    }

    pub(crate) fn find_mut(&mut self, name: &str) -> Option<&mut Element> {
        for child in self.children.iter_mut().filter_map(Node::as_element_mut) {
            if child.name == name {
                return Some(child);
            }
            if let Some(found) = child.find_mut(name) {
                return Some(found);
            }
        }
        None
    }
}

fn collect_text(nodes: &[Node], out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(raw) => match unescape(raw) {
                Ok(text) => out.push_str(&text),
                Err(_) => out.push_str(raw),
            },
            Node::CData(text) => out.push_str(text),
            Node::Element(e) => collect_text(&e.children, out),
            Node::Comment(_) | Node::Raw(..) => {}
        }
    }
}

impl From<Element> for Node {
    fn from(e: Element) -> Self {
        Node::Element(e)
    }
}

/// A parsed markup document: the top-level nodes in order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Document {
    pub nodes: Vec<Node>,
}

impl Document {
    pub fn new(nodes: Vec<Node>) -> Self {
        Document { nodes }
    }

    /// The first top-level element.
    pub fn root(&self) -> Option<&Element> {
        self.nodes.iter().find_map(Node::as_element)
    }

    /// First element with the given name anywhere in the document.
    pub fn find(&self, name: &str) -> Option<&Element> {
        self.nodes
            .iter()
            .filter_map(Node::as_element)
            .find_map(|e| if e.name == name { Some(e) } else { e.find(name) })
    }

    pub(crate) fn find_mut(&mut self, name: &str) -> Option<&mut Element> {
        for element in self.nodes.iter_mut().filter_map(Node::as_element_mut) {
            if element.name == name {
                return Some(element);
            }
            if let Some(found) = element.find_mut(name) {
                return Some(found);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attributes_are_escaped_on_set() {
        let mut e = Element::new("a");
        e.set_attribute("title", "Tom & Jerry");
        assert_eq!(e.attribute("title"), Some("Tom &amp; Jerry"));
        assert_eq!(e.attribute_text("title").as_deref(), Some("Tom & Jerry"));
        e.set_attribute("title", "x");
        assert_eq!(e.attributes.len(), 1);
    }

    #[test]
    fn remove_attribute_returns_raw_value() {
        let mut e = Element::new("p").with_attribute("template-if", "A");
        assert_eq!(e.remove_attribute("template-if").as_deref(), Some("A"));
        assert!(!e.has_attribute("template-if"));
        assert_eq!(e.remove_attribute("template-if"), None);
    }

    #[test]
    fn text_content_unescapes() {
        let e = Element::new("p")
            .with_child(Node::text("a < b"))
            .with_child(Element::new("b").with_child(Node::text(" & c")));
        assert_eq!(e.text_content(), "a < b & c");
    }

    #[test]
    fn insert_and_remove_children() {
        let mut e = Element::new("ul");
        e.insert_child(5, Element::new("li").into());
        e.insert_child(0, Node::text("x"));
        assert_eq!(e.children.len(), 2);
        assert!(matches!(e.remove_child(0), Some(Node::Text(_))));
        assert_eq!(e.remove_child(3), None);
    }

    #[test]
    fn find_searches_depth_first() {
        let doc = Document::new(vec![Element::new("html")
            .with_child(Element::new("head"))
            .with_child(Element::new("body").with_child(Element::new("p")))
            .into()]);
        assert_eq!(doc.root().map(|e| e.name.as_str()), Some("html"));
        assert!(doc.find("p").is_some());
        assert!(doc.find("table").is_none());
    }
}
