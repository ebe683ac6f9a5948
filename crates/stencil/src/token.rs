//! Placeholder token parsing.
//!
//! A token is text framed by a start and an end delimiter, holding up to
//! three segments joined by a separator:
//!
//! ```text
//! {{Name}}                      whole data set
//! {{Name::Property}}            property of a data set (dotted paths allowed)
//! {{Name::Property::Sum}}       aggregation over a collection
//! ```
//!
//! Parsing never fails. Text that is not framed is a literal; framed text
//! with an empty data-set name is malformed and also treated as a literal.

use std::ops::Range;

use serde::{Deserialize, Serialize};

/// Aggregation applied to a collection-valued data set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Aggregation {
    Sum,
    Average,
    Count,
}

impl Aggregation {
    /// Parses an aggregation tag. Matching is exact and case-sensitive;
    /// unknown tags yield `None`.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "Sum" => Some(Aggregation::Sum),
            "Average" => Some(Aggregation::Average),
            "Count" => Some(Aggregation::Count),
            _ => None,
        }
    }

    pub fn as_tag(self) -> &'static str {
        match self {
            Aggregation::Sum => "Sum",
            Aggregation::Average => "Average",
            Aggregation::Count => "Count",
        }
    }
}

/// A parsed reference to a data set, a property path and an optional
/// aggregation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldReference {
    dataset_name: String,
    property_path: Option<String>,
    aggregation: Option<Aggregation>,
}

impl FieldReference {
    pub fn dataset_name(&self) -> &str {
        &self.dataset_name
    }

    pub fn property_path(&self) -> Option<&str> {
        self.property_path.as_deref()
    }

    pub fn aggregation(&self) -> Option<Aggregation> {
        self.aggregation
    }
}

/// A token found by [`TokenSyntax::scan`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    /// Byte range of the framed text, delimiters included.
    pub range: Range<usize>,
    /// The framed text, delimiters included.
    pub text: String,
    /// The parsed reference, or `None` when malformed.
    pub reference: Option<FieldReference>,
}

/// Delimiters and separator used to recognise tokens.
///
/// # Example
///
/// ```
/// use stencil::{Aggregation, TokenSyntax};
///
/// let syntax = TokenSyntax::default();
/// let reference = syntax.parse_cell("{{Lines::Price::Sum}}").unwrap();
///
/// assert_eq!(reference.dataset_name(), "Lines");
/// assert_eq!(reference.property_path(), Some("Price"));
/// assert_eq!(reference.aggregation(), Some(Aggregation::Sum));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenSyntax {
    pub start: String,
    pub end: String,
    pub separator: String,
}

impl Default for TokenSyntax {
    fn default() -> Self {
        TokenSyntax {
            start: "{{".to_string(),
            end: "}}".to_string(),
            separator: "::".to_string(),
        }
    }
}

impl TokenSyntax {
    pub fn new(
        start: impl Into<String>,
        end: impl Into<String>,
        separator: impl Into<String>,
    ) -> Self {
        TokenSyntax {
            start: start.into(),
            end: end.into(),
            separator: separator.into(),
        }
    }

    /// Parses the text between the delimiters.
    ///
    /// Returns `None` when the data-set name is empty after trimming.
    pub fn parse_reference(&self, inner: &str) -> Option<FieldReference> {
        let inner = inner.trim();
        let mut segments = inner.split(self.separator.as_str()).map(str::trim);

        let dataset_name = segments.next().unwrap_or_default();
        if dataset_name.is_empty() {
            return None;
        }

        let property_path = segments
            .next()
            .filter(|p| !p.is_empty())
            .map(str::to_string);
        let aggregation = segments.next().and_then(Aggregation::from_tag);

        Some(FieldReference {
            dataset_name: dataset_name.to_string(),
            property_path,
            aggregation,
        })
    }

    /// Unwraps the delimiters when `text` is framed by them.
    pub fn unframe<'t>(&self, text: &'t str) -> Option<&'t str> {
        if self.start.is_empty() || self.end.is_empty() {
            return None;
        }
        let text = text.trim();
        if text.len() < self.start.len() + self.end.len() {
            return None;
        }
        text.strip_prefix(self.start.as_str())?
            .strip_suffix(self.end.as_str())
    }

    /// Returns `true` if `text` is framed by the delimiters.
    pub fn is_framed(&self, text: &str) -> bool {
        self.unframe(text).is_some()
    }

    /// Parses a tabular cell. The whole text must be one framed token.
    pub fn parse_cell(&self, text: &str) -> Option<FieldReference> {
        self.parse_reference(self.unframe(text)?)
    }

    /// Parses a structural attribute value. Framing is optional, so
    /// `Items` and `{{Items}}` are the same reference.
    pub fn parse_marker(&self, value: &str) -> Option<FieldReference> {
        match self.unframe(value) {
            Some(inner) => self.parse_reference(inner),
            None => self.parse_reference(value),
        }
    }

    /// Finds every token inside free text.
    ///
    /// Each start delimiter is paired with the nearest following end
    /// delimiter and scanning resumes after that end. A start delimiter
    /// with no end is not a token. There is no escaping.
    pub fn scan(&self, text: &str) -> Vec<Token> {
        let mut tokens = Vec::new();
        if self.start.is_empty() || self.end.is_empty() {
            return tokens;
        }

        let mut cursor = 0;
        while let Some(found) = text[cursor..].find(self.start.as_str()) {
            let open = cursor + found;
            let inner_start = open + self.start.len();
            let Some(close) = text[inner_start..].find(self.end.as_str()) else {
                break;
            };
            let inner_end = inner_start + close;
            let end = inner_end + self.end.len();

            tokens.push(Token {
                range: open..end,
                text: text[open..end].to_string(),
                reference: self.parse_reference(&text[inner_start..inner_end]),
            });
            cursor = end;
        }

        tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn syntax() -> TokenSyntax {
        TokenSyntax::default()
    }

    #[test]
    fn aggregation_tags_are_exact() {
        assert_eq!(Aggregation::from_tag("Sum"), Some(Aggregation::Sum));
        assert_eq!(Aggregation::from_tag("Average"), Some(Aggregation::Average));
        assert_eq!(Aggregation::from_tag("Count"), Some(Aggregation::Count));
        assert_eq!(Aggregation::from_tag("sum"), None);
        assert_eq!(Aggregation::from_tag("Max"), None);
    }

    #[test]
    fn parse_full_reference() {
        let r = syntax().parse_cell("{{Lines::Price::Average}}").unwrap();
        assert_eq!(r.dataset_name(), "Lines");
        assert_eq!(r.property_path(), Some("Price"));
        assert_eq!(r.aggregation(), Some(Aggregation::Average));
    }

    #[test]
    fn parse_bare_dataset() {
        let r = syntax().parse_cell("{{Title}}").unwrap();
        assert_eq!(r.dataset_name(), "Title");
        assert_eq!(r.property_path(), None);
        assert_eq!(r.aggregation(), None);
    }

    #[test]
    fn parse_trims_segments() {
        let r = syntax().parse_cell("  {{ P :: Name }} ").unwrap();
        assert_eq!(r.dataset_name(), "P");
        assert_eq!(r.property_path(), Some("Name"));
    }

    #[test]
    fn unknown_tag_is_ignored() {
        let r = syntax().parse_cell("{{L::Price::Max}}").unwrap();
        assert_eq!(r.property_path(), Some("Price"));
        assert_eq!(r.aggregation(), None);
    }

    #[test]
    fn empty_property_with_tag() {
        let r = syntax().parse_cell("{{L::::Count}}").unwrap();
        assert_eq!(r.property_path(), None);
        assert_eq!(r.aggregation(), Some(Aggregation::Count));
    }

    #[test]
    fn empty_dataset_is_malformed() {
        assert_eq!(syntax().parse_cell("{{}}"), None);
        assert_eq!(syntax().parse_cell("{{  ::Name}}"), None);
    }

    #[test]
    fn unframed_cell_is_literal() {
        assert_eq!(syntax().parse_cell("Total"), None);
        assert_eq!(syntax().parse_cell("Total {{P::Name}}"), None);
        assert_eq!(syntax().parse_cell("{{P::Name"), None);
        assert_eq!(syntax().parse_cell("{}"), None);
    }

    #[test]
    fn marker_framing_is_optional() {
        let framed = syntax().parse_marker("{{Items}}");
        let bare = syntax().parse_marker("Items");
        assert_eq!(framed, bare);
        assert_eq!(bare.unwrap().dataset_name(), "Items");
        assert_eq!(syntax().parse_marker(""), None);
    }

    #[test]
    fn custom_syntax() {
        let s = TokenSyntax::new("[%", "%]", ".");
        let r = s.parse_cell("[%Order.Total.Sum%]").unwrap();
        assert_eq!(r.dataset_name(), "Order");
        assert_eq!(r.property_path(), Some("Total"));
        assert_eq!(r.aggregation(), Some(Aggregation::Sum));
    }

    #[test]
    fn scan_finds_all_tokens() {
        let tokens = syntax().scan("Hi {{P::Name}}, you are {{P::Age}}.");
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].text, "{{P::Name}}");
        assert_eq!(tokens[0].range, 3..14);
        assert_eq!(tokens[1].text, "{{P::Age}}");
    }

    #[test]
    fn scan_pairs_nearest_end() {
        let tokens = syntax().scan("{{A {{B}} }}");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].text, "{{A {{B}}");
        assert_eq!(tokens[0].reference.as_ref().unwrap().dataset_name(), "A {{B");
    }

    #[test]
    fn scan_skips_unterminated() {
        let tokens = syntax().scan("{{P::Name}} and {{open");
        assert_eq!(tokens.len(), 1);
    }

    #[test]
    fn scan_reports_malformed_without_reference() {
        let tokens = syntax().scan("x {{}} y");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].reference, None);
    }

    #[test]
    fn scan_with_empty_delimiter_finds_nothing() {
        let s = TokenSyntax::new("", "}}", "::");
        assert!(s.scan("{{A}}").is_empty());
    }
}
