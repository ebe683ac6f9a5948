//! Render and export configuration.
//!
//! Both [`RenderOptions`] and [`ExportConfig`] are immutable once built.
//! Their builders validate on `build()`, so a configuration that exists is
//! one the engine can run.

use std::fmt;
use std::io::Write;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use stencil_data::{DataSets, DataValue};

use crate::error::ConfigError;
use crate::tabular::{GridFormat, Workbook};
use crate::token::TokenSyntax;

/// How Sum and Average treat collection members with no numeric value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregationPolicy {
    /// Leave non-numeric members out of the sum and the average.
    #[default]
    SkipNonNumeric,
    /// Fail the export on the first non-numeric member.
    Strict,
}

/// Geometry carried from the template into the output (tabular only).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutOptions {
    pub preserve_row_height: bool,
    pub preserve_column_width: bool,
    pub preserve_merged_cells: bool,
    pub preserve_cell_styles: bool,
    pub autofit_rows: bool,
    pub autofit_columns: bool,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        LayoutOptions {
            preserve_row_height: true,
            preserve_column_width: true,
            preserve_merged_cells: true,
            preserve_cell_styles: true,
            autofit_rows: false,
            autofit_columns: false,
        }
    }
}

/// Paper sizes for rendered markup.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageSize {
    A3,
    #[default]
    A4,
    A5,
    Letter,
    Legal,
}

impl PageSize {
    /// Portrait width and height in millimetres.
    pub fn portrait_mm(self) -> (f64, f64) {
        match self {
            PageSize::A3 => (297.0, 420.0),
            PageSize::A4 => (210.0, 297.0),
            PageSize::A5 => (148.0, 210.0),
            PageSize::Letter => (215.9, 279.4),
            PageSize::Legal => (215.9, 355.6),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

/// Page settings handed to a [`MarkupRenderer`](crate::MarkupRenderer).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageSettings {
    pub size: PageSize,
    pub orientation: Orientation,
}

impl PageSettings {
    pub fn new(size: PageSize, orientation: Orientation) -> Self {
        PageSettings { size, orientation }
    }

    /// Width and height in millimetres, after orientation.
    pub fn dimensions_mm(&self) -> (f64, f64) {
        let (w, h) = self.size.portrait_mm();
        match self.orientation {
            Orientation::Portrait => (w, h),
            Orientation::Landscape => (h, w),
        }
    }
}

/// Structural attribute names and page settings (markup only).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkupOptions {
    pub for_attribute: String,
    pub if_attribute: String,
    pub else_attribute: String,
    pub page: PageSettings,
}

impl Default for MarkupOptions {
    fn default() -> Self {
        MarkupOptions {
            for_attribute: "template-for".to_string(),
            if_attribute: "template-if".to_string(),
            else_attribute: "template-else".to_string(),
            page: PageSettings::default(),
        }
    }
}

/// Options shared by every render call.
///
/// # Example
///
/// ```
/// use stencil::RenderOptions;
///
/// let options = RenderOptions::builder()
///     .delimiters("[[", "]]")
///     .autofit_columns(true)
///     .build()
///     .unwrap();
///
/// assert_eq!(options.syntax().start, "[[");
/// assert!(!options.layout().preserve_column_width);
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RenderOptions {
    syntax: TokenSyntax,
    layout: LayoutOptions,
    markup: MarkupOptions,
    aggregation: AggregationPolicy,
}

impl RenderOptions {
    pub fn builder() -> RenderOptionsBuilder {
        RenderOptionsBuilder::default()
    }

    pub fn syntax(&self) -> &TokenSyntax {
        &self.syntax
    }

    pub fn layout(&self) -> &LayoutOptions {
        &self.layout
    }

    pub fn markup(&self) -> &MarkupOptions {
        &self.markup
    }

    pub fn aggregation(&self) -> AggregationPolicy {
        self.aggregation
    }
}

/// Builder for [`RenderOptions`].
///
/// Preserve toggles left unset follow the defaults, except that enabling
/// autofit on an axis turns that axis' preserve toggle off. Explicitly
/// enabling both on one axis is an error.
#[derive(Clone, Debug, Default)]
pub struct RenderOptionsBuilder {
    syntax: TokenSyntax,
    preserve_row_height: Option<bool>,
    preserve_column_width: Option<bool>,
    preserve_merged_cells: Option<bool>,
    preserve_cell_styles: Option<bool>,
    autofit_rows: bool,
    autofit_columns: bool,
    markup: MarkupOptions,
    aggregation: AggregationPolicy,
}

impl RenderOptionsBuilder {
    /// Set the complete token syntax.
    pub fn syntax(mut self, syntax: TokenSyntax) -> Self {
        self.syntax = syntax;
        self
    }

    /// Set the start and end delimiters.
    pub fn delimiters(mut self, start: impl Into<String>, end: impl Into<String>) -> Self {
        self.syntax.start = start.into();
        self.syntax.end = end.into();
        self
    }

    /// Set the segment separator.
    pub fn separator(mut self, separator: impl Into<String>) -> Self {
        self.syntax.separator = separator.into();
        self
    }

    pub fn preserve_row_height(mut self, on: bool) -> Self {
        self.preserve_row_height = Some(on);
        self
    }

    pub fn preserve_column_width(mut self, on: bool) -> Self {
        self.preserve_column_width = Some(on);
        self
    }

    pub fn preserve_merged_cells(mut self, on: bool) -> Self {
        self.preserve_merged_cells = Some(on);
        self
    }

    pub fn preserve_cell_styles(mut self, on: bool) -> Self {
        self.preserve_cell_styles = Some(on);
        self
    }

    /// Size rows from their content instead of the template.
    pub fn autofit_rows(mut self, on: bool) -> Self {
        self.autofit_rows = on;
        self
    }

    /// Size columns from their content instead of the template.
    pub fn autofit_columns(mut self, on: bool) -> Self {
        self.autofit_columns = on;
        self
    }

    /// Set the loop attribute name (default `template-for`).
    pub fn for_attribute(mut self, name: impl Into<String>) -> Self {
        self.markup.for_attribute = name.into();
        self
    }

    /// Set the conditional attribute name (default `template-if`).
    pub fn if_attribute(mut self, name: impl Into<String>) -> Self {
        self.markup.if_attribute = name.into();
        self
    }

    /// Set the alternative attribute name (default `template-else`).
    pub fn else_attribute(mut self, name: impl Into<String>) -> Self {
        self.markup.else_attribute = name.into();
        self
    }

    pub fn page(mut self, page: PageSettings) -> Self {
        self.markup.page = page;
        self
    }

    pub fn aggregation_policy(mut self, policy: AggregationPolicy) -> Self {
        self.aggregation = policy;
        self
    }

    /// Validates and builds the options.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::EmptyDelimiter`] if a delimiter or the separator is empty
    /// - [`ConfigError::ConflictingLayout`] if autofit and preserve were both
    ///   explicitly enabled on the same axis
    pub fn build(self) -> Result<RenderOptions, ConfigError> {
        for (part, value) in [
            ("start delimiter", &self.syntax.start),
            ("end delimiter", &self.syntax.end),
            ("separator", &self.syntax.separator),
        ] {
            if value.is_empty() {
                return Err(ConfigError::EmptyDelimiter { part });
            }
        }

        let preserve_row_height =
            resolve_axis("rows", self.autofit_rows, self.preserve_row_height)?;
        let preserve_column_width =
            resolve_axis("columns", self.autofit_columns, self.preserve_column_width)?;

        let layout = LayoutOptions {
            preserve_row_height,
            preserve_column_width,
            preserve_merged_cells: self.preserve_merged_cells.unwrap_or(true),
            preserve_cell_styles: self.preserve_cell_styles.unwrap_or(true),
            autofit_rows: self.autofit_rows,
            autofit_columns: self.autofit_columns,
        };

        Ok(RenderOptions {
            syntax: self.syntax,
            layout,
            markup: self.markup,
            aggregation: self.aggregation,
        })
    }
}

fn resolve_axis(
    axis: &'static str,
    autofit: bool,
    preserve: Option<bool>,
) -> Result<bool, ConfigError> {
    match (autofit, preserve) {
        (true, Some(true)) => Err(ConfigError::ConflictingLayout { axis }),
        (true, _) => Ok(false),
        (false, explicit) => Ok(explicit.unwrap_or(true)),
    }
}

/// Where the template comes from.
#[derive(Clone, Debug)]
pub enum TemplateSource {
    /// A template file.
    Path(PathBuf),
    /// Markup text held in memory.
    Inline(String),
    /// A workbook held in memory.
    Workbook(Workbook),
    /// Markup fragments appended into an empty `<html>` skeleton.
    Fragments { head: Vec<PathBuf>, body: Vec<PathBuf> },
}

impl TemplateSource {
    /// Short description for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            TemplateSource::Path(_) => "a template file",
            TemplateSource::Inline(_) => "inline markup",
            TemplateSource::Workbook(_) => "an in-memory workbook",
            TemplateSource::Fragments { .. } => "markup fragments",
        }
    }
}

/// Where the rendered document goes.
pub enum OutputTarget {
    Path(PathBuf),
    Writer(Box<dyn Write + Send>),
}

impl fmt::Debug for OutputTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputTarget::Path(path) => f.debug_tuple("Path").field(path).finish(),
            OutputTarget::Writer(_) => f.write_str("Writer(..)"),
        }
    }
}

/// A complete, validated export request.
///
/// # Example
///
/// ```
/// use stencil::ExportConfig;
///
/// let config = ExportConfig::builder()
///     .template_inline("<p>{{Title}}</p>")
///     .output_writer(Vec::<u8>::new())
///     .dataset("Title", "Report")
///     .build()
///     .unwrap();
///
/// assert_eq!(config.data().len(), 1);
/// ```
#[derive(Debug)]
pub struct ExportConfig {
    pub(crate) template: TemplateSource,
    pub(crate) output: OutputTarget,
    pub(crate) workbook_format: Option<GridFormat>,
    pub(crate) data: DataSets,
    pub(crate) options: RenderOptions,
}

impl ExportConfig {
    pub fn builder() -> ExportConfigBuilder {
        ExportConfigBuilder::default()
    }

    pub fn template(&self) -> &TemplateSource {
        &self.template
    }

    pub fn output(&self) -> &OutputTarget {
        &self.output
    }

    /// Output format override; when unset the format follows the output
    /// path extension, then the template path extension.
    pub fn workbook_format(&self) -> Option<GridFormat> {
        self.workbook_format
    }

    pub fn data(&self) -> &DataSets {
        &self.data
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }
}

/// Builder for [`ExportConfig`].
///
/// An explicit template source takes precedence over fragments.
#[derive(Default)]
pub struct ExportConfigBuilder {
    template: Option<TemplateSource>,
    head_fragments: Vec<PathBuf>,
    body_fragments: Vec<PathBuf>,
    output_path: Option<PathBuf>,
    output_writer: Option<Box<dyn Write + Send>>,
    workbook_format: Option<GridFormat>,
    data: DataSets,
    options: RenderOptions,
}

impl ExportConfigBuilder {
    pub fn template(mut self, source: TemplateSource) -> Self {
        self.template = Some(source);
        self
    }

    /// Read the template from a file.
    pub fn template_path(self, path: impl Into<PathBuf>) -> Self {
        self.template(TemplateSource::Path(path.into()))
    }

    /// Use markup text as the template.
    pub fn template_inline(self, markup: impl Into<String>) -> Self {
        self.template(TemplateSource::Inline(markup.into()))
    }

    /// Use an in-memory workbook as the template.
    pub fn template_workbook(self, workbook: Workbook) -> Self {
        self.template(TemplateSource::Workbook(workbook))
    }

    /// Append a fragment file to the `<head>` of a composed template.
    pub fn head_fragment(mut self, path: impl Into<PathBuf>) -> Self {
        self.head_fragments.push(path.into());
        self
    }

    /// Append a fragment file to the `<body>` of a composed template.
    pub fn body_fragment(mut self, path: impl Into<PathBuf>) -> Self {
        self.body_fragments.push(path.into());
        self
    }

    pub fn output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = Some(path.into());
        self
    }

    pub fn output_writer(mut self, writer: impl Write + Send + 'static) -> Self {
        self.output_writer = Some(Box::new(writer));
        self
    }

    pub fn workbook_format(mut self, format: GridFormat) -> Self {
        self.workbook_format = Some(format);
        self
    }

    /// Replace all data sets.
    pub fn data(mut self, data: DataSets) -> Self {
        self.data = data;
        self
    }

    /// Register one data set.
    pub fn dataset(mut self, name: impl Into<String>, value: impl Into<DataValue>) -> Self {
        self.data.insert(name, value);
        self
    }

    pub fn options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }

    /// Validates and builds the configuration.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::MissingTemplate`] if no template was set
    /// - [`ConfigError::MissingOutput`] if neither output was set
    /// - [`ConfigError::AmbiguousOutput`] if both outputs were set
    pub fn build(self) -> Result<ExportConfig, ConfigError> {
        let has_fragments = !self.head_fragments.is_empty() || !self.body_fragments.is_empty();
        let template = match self.template {
            Some(source) => source,
            None if has_fragments => TemplateSource::Fragments {
                head: self.head_fragments,
                body: self.body_fragments,
            },
            None => return Err(ConfigError::MissingTemplate),
        };

        let output = match (self.output_path, self.output_writer) {
            (Some(path), None) => OutputTarget::Path(path),
            (None, Some(writer)) => OutputTarget::Writer(writer),
            (Some(_), Some(_)) => return Err(ConfigError::AmbiguousOutput),
            (None, None) => return Err(ConfigError::MissingOutput),
        };

        Ok(ExportConfig {
            template,
            output,
            workbook_format: self.workbook_format,
            data: self.data,
            options: self.options,
        })
    }
}
