//! Building a template from head and body fragments.

use std::fs;
use std::path::PathBuf;

use super::dom::{Document, Element, Node};
use super::parse::parse_document;
use crate::error::{ConfigError, ExportError, MarkupError, Result};

/// An empty `<html><head></head><body></body></html>` document.
pub fn skeleton() -> Document {
    Document::new(vec![Element::new("html")
        .with_child(Element::new("head"))
        .with_child(Element::new("body"))
        .into()])
}

/// Appends parsed fragments to the skeleton's `<head>` and `<body>`, in
/// the order given.
pub fn compose_fragments(head: &[&str], body: &[&str]) -> std::result::Result<Document, MarkupError> {
    let mut document = skeleton();
    append(&mut document, "head", head)?;
    append(&mut document, "body", body)?;
    Ok(document)
}

/// Reads fragment files and composes them.
///
/// # Errors
///
/// [`ConfigError::TemplateUnreadable`] for a file that cannot be read,
/// [`MarkupError`] for a fragment that does not parse.
pub fn compose_files(head: &[PathBuf], body: &[PathBuf]) -> Result<Document> {
    let head = read_all(head)?;
    let body = read_all(body)?;
    let head: Vec<&str> = head.iter().map(String::as_str).collect();
    let body: Vec<&str> = body.iter().map(String::as_str).collect();
    Ok(compose_fragments(&head, &body)?)
}

fn read_all(paths: &[PathBuf]) -> Result<Vec<String>> {
    paths
        .iter()
        .map(|path| {
            fs::read_to_string(path).map_err(|source| {
                ExportError::from(ConfigError::TemplateUnreadable {
                    path: path.clone(),
                    source,
                })
            })
        })
        .collect()
}

fn append(
    document: &mut Document,
    section: &str,
    fragments: &[&str],
) -> std::result::Result<(), MarkupError> {
    let mut nodes: Vec<Node> = Vec::new();
    for fragment in fragments {
        nodes.extend(parse_document(fragment)?.nodes);
    }
    if let Some(target) = document.find_mut(section) {
        target.children.extend(nodes);
    }
    Ok(())
}
