//! Markup templates.
//!
//! Tokens are substituted inside text and ordinary attribute values.
//! Three attributes drive structure: a loop marker repeats its element
//! once per collection member, a conditional marker keeps or prunes its
//! element, and an alternative marker on the next element sibling is kept
//! only when the condition was false.
//!
//! ```
//! use stencil::markup::{parse_document, render_document, write_document};
//! use stencil::RenderOptions;
//! use stencil_data::{DataSets, MapRecord};
//!
//! let template = parse_document(
//!     r#"<ul><li template-for="L">{{L::Name}}</li></ul>"#,
//! ).unwrap();
//! let data = DataSets::new().with("L", vec![
//!     MapRecord::new().with("Name", "A"),
//!     MapRecord::new().with("Name", "B"),
//! ]);
//!
//! let out = render_document(&template, &data, &RenderOptions::default()).unwrap();
//! assert_eq!(write_document(&out).unwrap(), "<ul><li>A</li><li>B</li></ul>");
//! ```

mod compose;
mod dom;
mod expand;
mod parse;
mod write;

pub use compose::{compose_files, compose_fragments, skeleton};
pub use dom::{Document, Element, Node, RawKind};
pub use expand::MarkupExpander;
pub use parse::parse_document;
pub use write::{write_document, write_document_to};

use std::io::Write;

use stencil_data::DataSets;

use crate::config::{PageSettings, RenderOptions};
use crate::error::Result;
use crate::resolve::TokenMiss;

/// Renders a markup template into a new document.
///
/// # Errors
///
/// Fails only under strict aggregation.
pub fn render_document(
    template: &Document,
    data: &DataSets,
    options: &RenderOptions,
) -> Result<Document> {
    MarkupExpander::new(data, options)
        .render(template)
        .map(|(document, _)| document)
}

/// Runs a full render and reports every token that resolved to nothing.
pub fn validate_document(
    template: &Document,
    data: &DataSets,
    options: &RenderOptions,
) -> Result<Vec<TokenMiss>> {
    MarkupExpander::new(data, options)
        .render(template)
        .map(|(_, misses)| misses)
}

/// Turns a rendered document into output bytes.
///
/// The built-in [`MarkupSerializer`] writes markup text. Renderers that
/// produce paged output (PDF and the like) receive the page settings from
/// the render options.
pub trait MarkupRenderer {
    fn render(&self, document: &Document, page: &PageSettings, out: &mut dyn Write) -> Result<()>;
}

/// Writes the document as markup text; page settings are ignored.
#[derive(Clone, Copy, Debug, Default)]
pub struct MarkupSerializer;

impl MarkupRenderer for MarkupSerializer {
    fn render(&self, document: &Document, _page: &PageSettings, out: &mut dyn Write) -> Result<()> {
        write_document_to(document, out)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stencil_data::MapRecord;

    #[test]
    fn validate_lists_misses_without_failing() {
        let template = parse_document("<p>{{P::Name}} {{P::Age}}</p>").unwrap();
        let data = DataSets::new().with("P", MapRecord::new().with("Name", "John"));
        let misses = validate_document(&template, &data, &RenderOptions::default()).unwrap();
        assert_eq!(misses.len(), 1);
        assert_eq!(misses[0].token, "{{P::Age}}");
    }

    #[test]
    fn serializer_writes_markup() {
        let document = parse_document("<p>x</p>").unwrap();
        let mut out = Vec::new();
        MarkupSerializer
            .render(&document, &PageSettings::default(), &mut out)
            .unwrap();
        assert_eq!(out, b"<p>x</p>");
    }
}
