//! Error types for template export.
//!
//! Only configuration problems, structural template conflicts, unsupported
//! content, I/O failures and (opt-in) strict aggregation failures are
//! errors. Unresolvable tokens are soft misses and never surface here.

use std::path::PathBuf;

use thiserror::Error;

/// Invalid or incomplete export configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Neither an output path nor an output stream was given.
    #[error("no output target: set either an output path or an output stream")]
    MissingOutput,

    /// Both an output path and an output stream were given.
    #[error("ambiguous output target: set an output path or an output stream, not both")]
    AmbiguousOutput,

    /// No template was given.
    #[error("no template source configured")]
    MissingTemplate,

    /// The template file could not be read.
    #[error("cannot read template {path}: {source}")]
    TemplateUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file extension does not name a supported format.
    #[error("unknown file format for {path}: expected .json, .yaml, .yml or .csv")]
    UnknownFormat { path: PathBuf },

    /// The template source does not fit the requested export.
    #[error("{kind} export cannot use {source_kind} as its template")]
    TemplateMismatch {
        kind: &'static str,
        source_kind: &'static str,
    },

    /// A token delimiter or separator is empty.
    #[error("token {part} must not be empty")]
    EmptyDelimiter { part: &'static str },

    /// Autofit and preserve were both explicitly enabled for one axis.
    #[error("autofit and preserve are both enabled for {axis}")]
    ConflictingLayout { axis: &'static str },
}

/// Strict aggregation found a member with no numeric value.
#[derive(Debug, Error, PartialEq)]
pub enum AggregateError {
    #[error("collection member {index} has no numeric value{}", describe_property(.property))]
    NonNumeric {
        index: usize,
        property: Option<String>,
    },
}

fn describe_property(property: &Option<String>) -> String {
    match property {
        Some(name) => format!(" for property '{}'", name),
        None => String::new(),
    }
}

/// Markup that could not be parsed or written.
#[derive(Debug, Error)]
pub enum MarkupError {
    #[error("malformed markup at byte {position}: {message}")]
    Parse { position: u64, message: String },

    #[error("unbalanced markup: {0}")]
    Unbalanced(String),

    #[error("cannot write markup: {0}")]
    Write(String),
}

/// Errors that abort an export.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A single template row referenced two different collections.
    #[error(
        "sheet '{sheet}' row {row}: references collection '{second}' but is already bound to '{first}'"
    )]
    TemplateConflict {
        sheet: String,
        row: u32,
        first: String,
        second: String,
    },

    /// A template cell holds content the engine cannot carry over.
    #[error("sheet '{sheet}' cell {}: formulas are not supported in templates", cell_name(*.row, *.col))]
    UnsupportedContent { sheet: String, row: u32, col: u32 },

    #[error(transparent)]
    Aggregate(#[from] AggregateError),

    #[error(transparent)]
    Markup(#[from] MarkupError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Workbook (de)serialization failure.
    #[error("format error: {0}")]
    Format(String),
}

impl From<serde_json::Error> for ExportError {
    fn from(err: serde_json::Error) -> Self {
        ExportError::Format(err.to_string())
    }
}

impl From<serde_yaml::Error> for ExportError {
    fn from(err: serde_yaml::Error) -> Self {
        ExportError::Format(err.to_string())
    }
}

impl From<csv::Error> for ExportError {
    fn from(err: csv::Error) -> Self {
        ExportError::Format(err.to_string())
    }
}

/// Result type for export operations.
pub type Result<T> = std::result::Result<T, ExportError>;

/// Spreadsheet column letters for a 1-based column index (`1` is `A`,
/// `27` is `AA`).
pub fn column_name(col: u32) -> String {
    let mut n = col;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = ((n - 1) % 26) as u8;
        letters.push((b'A' + rem) as char);
        n = (n - 1) / 26;
    }
    letters.iter().rev().collect()
}

/// A1-style cell name for 1-based coordinates.
pub fn cell_name(row: u32, col: u32) -> String {
    format!("{}{}", column_name(col), row)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_names() {
        assert_eq!(column_name(1), "A");
        assert_eq!(column_name(26), "Z");
        assert_eq!(column_name(27), "AA");
        assert_eq!(column_name(52), "AZ");
        assert_eq!(column_name(703), "AAA");
    }

    #[test]
    fn unsupported_content_names_the_cell() {
        let err = ExportError::UnsupportedContent {
            sheet: "Report".into(),
            row: 4,
            col: 3,
        };
        assert_eq!(
            err.to_string(),
            "sheet 'Report' cell C4: formulas are not supported in templates"
        );
    }

    #[test]
    fn aggregate_error_mentions_property() {
        let err = AggregateError::NonNumeric {
            index: 2,
            property: Some("Price".into()),
        };
        assert_eq!(
            err.to_string(),
            "collection member 2 has no numeric value for property 'Price'"
        );
    }

    #[test]
    fn config_errors_convert() {
        let err: ExportError = ConfigError::MissingOutput.into();
        assert!(matches!(err, ExportError::Config(ConfigError::MissingOutput)));
    }
}
