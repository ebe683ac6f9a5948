//! Stencil - render spreadsheet and markup templates from in-memory data.
//!
//! A template holds placeholder tokens such as `{{P::Name}}`. Rendering
//! resolves each token against named data sets and expands the units that
//! refer to collections:
//!
//! - **Workbooks**: a template row that refers to a collection is repeated
//!   once per member, with styles, merged cells and row heights following
//!   the copies.
//! - **Markup**: `template-for`, `template-if` and `template-else`
//!   attributes repeat, keep or prune elements; tokens in text and
//!   attribute values are substituted.
//!
//! Tokens that resolve to nothing are never errors. They are left in place
//! (or blanked, for spreadsheet properties) and can be listed with
//! [`tabular::validate_workbook`] or [`markup::validate_document`].
//!
//! # Quick Start
//!
//! ```rust
//! use stencil::markup::{parse_document, render_document, write_document};
//! use stencil::{DataSets, Record, RenderOptions};
//!
//! #[derive(Clone, Record)]
//! #[record(rename_all = "PascalCase")]
//! struct Line {
//!     name: String,
//!     qty: i64,
//! }
//!
//! let data = DataSets::new().with("L", vec![
//!     Line { name: "Bolt".into(), qty: 4 },
//!     Line { name: "Nut".into(), qty: 6 },
//! ]);
//! let template = parse_document(
//!     r#"<ul><li template-for="L">{{L::Name}} x{{L::Qty}}</li><li>{{L::Qty::Sum}}</li></ul>"#,
//! ).unwrap();
//!
//! let out = render_document(&template, &data, &RenderOptions::default()).unwrap();
//! assert_eq!(
//!     write_document(&out).unwrap(),
//!     "<ul><li>Bolt x4</li><li>Nut x6</li><li>10</li></ul>"
//! );
//! ```
//!
//! # Modules
//!
//! - [`token`]: token syntax and parsing
//! - [`resolve`](mod@resolve): looking references up in a scope chain
//! - [`aggregate`](mod@aggregate): Sum, Average and Count over collections
//! - [`tabular`]: workbook model, adapters and row expansion
//! - [`markup`]: element tree, parsing, writing and structural expansion
//! - [`config`]: render options and export configuration

pub mod aggregate;
pub mod config;
pub mod error;
pub mod export;
pub mod markup;
pub mod resolve;
pub mod tabular;
pub mod token;

pub use aggregate::aggregate;
pub use config::{
    AggregationPolicy, ExportConfig, ExportConfigBuilder, LayoutOptions, MarkupOptions,
    Orientation, OutputTarget, PageSettings, PageSize, RenderOptions, RenderOptionsBuilder,
    TemplateSource,
};
pub use error::{AggregateError, ConfigError, ExportError, MarkupError, Result};
pub use export::{export_markup, export_markup_with, export_workbook};
pub use markup::{MarkupRenderer, MarkupSerializer};
pub use resolve::{resolve, Lookup, Miss, TokenMiss};
pub use token::{Aggregation, FieldReference, Token, TokenSyntax};

pub use stencil_data::{Collection, DataSets, DataValue, MapRecord, Number, Record, Scope};

/// Derive macro implementing [`Record`] for a struct with named fields.
///
/// See the `stencil-macros` crate for the supported attributes.
pub use stencil_macros::Record;
