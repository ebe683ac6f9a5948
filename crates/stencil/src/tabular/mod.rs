//! Spreadsheet templates.
//!
//! Each template row is a unit. Cells whose whole text is a token are
//! resolved against the data sets; a row that refers to a collection is
//! repeated once per member, with styles, merged regions and row heights
//! following the copies.
//!
//! ```
//! use stencil::tabular::{render_workbook, CellValue, Sheet, Workbook};
//! use stencil::RenderOptions;
//! use stencil_data::{DataSets, MapRecord};
//!
//! let mut sheet = Sheet::new("People");
//! sheet.set_value(1, 1, "{{L::Name}}");
//!
//! let data = DataSets::new().with("L", vec![
//!     MapRecord::new().with("Name", "A"),
//!     MapRecord::new().with("Name", "B"),
//! ]);
//!
//! let out = render_workbook(&Workbook::new().with_sheet(sheet), &data, &RenderOptions::default()).unwrap();
//! let people = &out.sheets[0];
//! assert_eq!(people.row_values(1), vec![CellValue::text("A")]);
//! assert_eq!(people.row_values(2), vec![CellValue::text("B")]);
//! ```

mod adapter;
mod expand;
mod format;
mod layout;
mod sheet;

pub use adapter::{GridSink, GridSource, LINE_HEIGHT};
pub use expand::{Expansion, SheetExpander};
pub use format::{GridFormat, CSV_SHEET_NAME};
pub use layout::{LayoutTracker, Placement, RemappedLayout};
pub use sheet::{Align, Cell, CellStyle, CellValue, Extent, MergedRegion, Sheet, Workbook};

use stencil_data::DataSets;
use tracing::debug;

use crate::config::RenderOptions;
use crate::error::Result;
use crate::resolve::TokenMiss;

/// Renders one sheet from `source` into `sink`.
///
/// The whole sheet is expanded in memory first; `sink` is only touched
/// once expansion succeeded. Returns the soft misses found on the way.
pub fn render_sheet<G, K>(
    source: &G,
    sink: &mut K,
    data: &DataSets,
    options: &RenderOptions,
) -> Result<Vec<TokenMiss>>
where
    G: GridSource,
    K: GridSink<Style = G::Style>,
{
    let Expansion {
        rows,
        layout,
        misses,
    } = SheetExpander::new(source, data, options).expand()?;
    let toggles = options.layout();

    debug!(
        sheet = source.name(),
        template_rows = source.last_row(),
        output_rows = rows.len(),
        misses = misses.len(),
        "sheet expanded"
    );

    sink.write_block(1, 1, rows);

    for (row, col, style) in layout.styles {
        sink.set_style(row, col, style);
    }
    for region in layout.merges {
        sink.merge(region);
    }
    for (row, height) in layout.row_heights {
        sink.set_row_height(row, height);
    }
    if toggles.preserve_column_width {
        for col in 1..=source.last_column() {
            if let Some(width) = source.column_width(col) {
                sink.set_column_width(col, width);
            }
        }
    }
    if toggles.autofit_rows {
        sink.autofit_rows();
    }
    if toggles.autofit_columns {
        sink.autofit_columns();
    }

    Ok(misses)
}

/// Renders every sheet of a workbook into a new workbook.
///
/// # Errors
///
/// Fails on the first sheet with a structural conflict, a formula cell or
/// a strict aggregation failure; no partial workbook is returned.
pub fn render_workbook(
    template: &Workbook,
    data: &DataSets,
    options: &RenderOptions,
) -> Result<Workbook> {
    render_with_misses(template, data, options).map(|(workbook, _)| workbook)
}

/// Runs a full render and reports every token that resolved to nothing.
///
/// Callers that want strict templates can fail on a non-empty result.
pub fn validate_workbook(
    template: &Workbook,
    data: &DataSets,
    options: &RenderOptions,
) -> Result<Vec<TokenMiss>> {
    render_with_misses(template, data, options).map(|(_, misses)| misses)
}

pub(crate) fn render_with_misses(
    template: &Workbook,
    data: &DataSets,
    options: &RenderOptions,
) -> Result<(Workbook, Vec<TokenMiss>)> {
    let mut output = Workbook::new();
    let mut misses = Vec::new();

    for source in &template.sheets {
        let mut sink = Sheet::new(source.name());
        misses.extend(render_sheet(source, &mut sink, data, options)?);
        output.sheets.push(sink);
    }

    Ok((output, misses))
}
