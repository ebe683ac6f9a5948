//! End-to-end exports: load a template, render it, write the result.
//!
//! The rendered output is always built completely in memory before the
//! destination is opened, so a failed export never leaves a partial file.

use std::fs;
use std::io::Write;

use tracing::debug;

use crate::config::{ExportConfig, OutputTarget, TemplateSource};
use crate::error::{ConfigError, ExportError, Result};
use crate::markup::{
    compose_files, parse_document, Document, MarkupExpander, MarkupRenderer, MarkupSerializer,
};
use crate::resolve::TokenMiss;
use crate::tabular::{render_with_misses, GridFormat};

/// Renders a workbook template and writes it out.
///
/// The template is a workbook file (`.json`, `.yaml`, `.yml` or `.csv`)
/// or an in-memory workbook. The output format is the configured one.
/// Without one, an output path decides by its extension and an unknown
/// extension is an error. Writer outputs take the template path's format,
/// or JSON for in-memory templates.
///
/// Returns the tokens that resolved to nothing.
///
/// # Example
///
/// ```
/// use stencil::tabular::{Sheet, Workbook};
/// use stencil::{export_workbook, ExportConfig};
/// use stencil_data::MapRecord;
///
/// let mut sheet = Sheet::new("S");
/// sheet.set_value(1, 1, "{{P::Name}}");
///
/// let config = ExportConfig::builder()
///     .template_workbook(Workbook::new().with_sheet(sheet))
///     .output_writer(std::io::sink())
///     .dataset("P", MapRecord::new().with("Name", "John"))
///     .build()
///     .unwrap();
///
/// let misses = export_workbook(config).unwrap();
/// assert!(misses.is_empty());
/// ```
pub fn export_workbook(config: ExportConfig) -> Result<Vec<TokenMiss>> {
    let ExportConfig {
        template,
        output,
        workbook_format,
        data,
        options,
    } = config;

    let format = match workbook_format {
        Some(format) => format,
        None => output_format(&template, &output)?,
    };
    let loaded;
    let workbook = match &template {
        TemplateSource::Path(path) => {
            loaded = GridFormat::load(path)?;
            &loaded
        }
        TemplateSource::Workbook(workbook) => workbook,
        other => return Err(mismatch("workbook", other)),
    };
    debug!(sheets = workbook.sheets.len(), ?format, "workbook export started");

    let (rendered, misses) = render_with_misses(workbook, &data, &options)?;
    let mut buffer = Vec::new();
    format.write(&rendered, &mut buffer)?;

    deliver(output, &buffer)?;
    debug!(bytes = buffer.len(), misses = misses.len(), "workbook export finished");
    Ok(misses)
}

/// Renders a markup template and writes it as markup text.
///
/// Returns the tokens that resolved to nothing.
pub fn export_markup(config: ExportConfig) -> Result<Vec<TokenMiss>> {
    export_markup_with(config, &MarkupSerializer)
}

/// Renders a markup template and hands it to `renderer`, together with the
/// page settings from the render options.
pub fn export_markup_with(
    config: ExportConfig,
    renderer: &dyn MarkupRenderer,
) -> Result<Vec<TokenMiss>> {
    let ExportConfig {
        template,
        output,
        data,
        options,
        ..
    } = config;

    let document = load_markup(&template)?;
    debug!(template = template.kind(), "markup export started");

    let (rendered, misses) = MarkupExpander::new(&data, &options).render(&document)?;
    let mut buffer = Vec::new();
    renderer.render(&rendered, &options.markup().page, &mut buffer)?;

    deliver(output, &buffer)?;
    debug!(bytes = buffer.len(), misses = misses.len(), "markup export finished");
    Ok(misses)
}

fn load_markup(template: &TemplateSource) -> Result<Document> {
    match template {
        TemplateSource::Path(path) => {
            let text = fs::read_to_string(path).map_err(|source| ConfigError::TemplateUnreadable {
                path: path.clone(),
                source,
            })?;
            Ok(parse_document(&text)?)
        }
        TemplateSource::Inline(text) => Ok(parse_document(text)?),
        TemplateSource::Fragments { head, body } => compose_files(head, body),
        TemplateSource::Workbook(_) => Err(mismatch("markup", template)),
    }
}

fn output_format(template: &TemplateSource, output: &OutputTarget) -> Result<GridFormat> {
    if let OutputTarget::Path(path) = output {
        return Ok(GridFormat::from_path(path)?);
    }
    match template {
        TemplateSource::Path(path) => Ok(GridFormat::from_path(path)?),
        _ => Ok(GridFormat::Json),
    }
}

fn deliver(output: OutputTarget, bytes: &[u8]) -> Result<()> {
    match output {
        OutputTarget::Path(path) => {
            fs::write(&path, bytes)?;
            Ok(())
        }
        OutputTarget::Writer(mut writer) => {
            writer.write_all(bytes)?;
            writer.flush()?;
            Ok(())
        }
    }
}

fn mismatch(kind: &'static str, template: &TemplateSource) -> ExportError {
    ConfigError::TemplateMismatch {
        kind,
        source_kind: template.kind(),
    }
    .into()
}
