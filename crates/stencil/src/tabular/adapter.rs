//! The seam between the expander and a concrete spreadsheet model.
//!
//! The expander reads a template through [`GridSource`] and writes the
//! rendered sheet through [`GridSink`]. [`Sheet`] implements both; other
//! spreadsheet backends only need these two traits.

use unicode_width::UnicodeWidthStr;

use super::sheet::{CellStyle, CellValue, Extent, MergedRegion, Sheet};

/// Points of height per line of text when autofitting rows.
pub const LINE_HEIGHT: f64 = 15.0;

/// Read access to a template sheet.
pub trait GridSource {
    /// Opaque style object carried from template to output.
    type Style: Clone;

    fn name(&self) -> &str;

    /// Last used row (1-based), 0 for an empty sheet.
    fn last_row(&self) -> u32;

    /// Last used column (1-based), 0 for an empty sheet.
    fn last_column(&self) -> u32;

    /// Non-blank cells of a row, and cells holding formulas, in column order.
    fn row_cells(&self, row: u32) -> Vec<(u32, CellValue)>;

    fn has_formula(&self, row: u32, col: u32) -> bool;

    fn style(&self, row: u32, col: u32) -> Option<Self::Style>;

    /// Extent of the merged region anchored at this cell, if any.
    fn merged_extent(&self, row: u32, col: u32) -> Option<Extent>;

    fn row_height(&self, row: u32) -> Option<f64>;

    fn column_width(&self, col: u32) -> Option<f64>;
}

/// Write access to the rendered sheet.
pub trait GridSink {
    type Style;

    /// Writes a rectangular block whose top-left cell is `(top, left)`.
    fn write_block(&mut self, top: u32, left: u32, block: Vec<Vec<CellValue>>);

    fn set_style(&mut self, row: u32, col: u32, style: Self::Style);

    fn merge(&mut self, region: MergedRegion);

    /// Inserts `count` empty rows below `row`.
    fn insert_rows_below(&mut self, row: u32, count: u32);

    fn set_row_height(&mut self, row: u32, height: f64);

    fn set_column_width(&mut self, col: u32, width: f64);

    /// Sizes every used row from its content.
    fn autofit_rows(&mut self);

    /// Sizes every used column from its content.
    fn autofit_columns(&mut self);
}

impl GridSource for Sheet {
    type Style = CellStyle;

    fn name(&self) -> &str {
        Sheet::name(self)
    }

    fn last_row(&self) -> u32 {
        Sheet::last_row(self)
    }

    fn last_column(&self) -> u32 {
        Sheet::last_column(self)
    }

    fn row_cells(&self, row: u32) -> Vec<(u32, CellValue)> {
        self.cells()
            .filter(|((r, _), cell)| {
                *r == row && (!cell.value.is_blank() || cell.formula.is_some())
            })
            .map(|((_, col), cell)| (*col, cell.value.clone()))
            .collect()
    }

    fn has_formula(&self, row: u32, col: u32) -> bool {
        self.cell(row, col).is_some_and(|c| c.formula.is_some())
    }

    fn style(&self, row: u32, col: u32) -> Option<CellStyle> {
        self.cell_style(row, col).cloned()
    }

    fn merged_extent(&self, row: u32, col: u32) -> Option<Extent> {
        self.merges()
            .iter()
            .find(|m| m.row == row && m.col == col)
            .map(|m| m.extent)
    }

    fn row_height(&self, row: u32) -> Option<f64> {
        self.height(row)
    }

    fn column_width(&self, col: u32) -> Option<f64> {
        self.width(col)
    }
}

impl GridSink for Sheet {
    type Style = CellStyle;

    fn write_block(&mut self, top: u32, left: u32, block: Vec<Vec<CellValue>>) {
        for (r, values) in (top..).zip(block) {
            for (c, value) in (left..).zip(values) {
                if value != CellValue::Empty || self.cell(r, c).is_some() {
                    self.set_value(r, c, value);
                }
            }
        }
    }

    fn set_style(&mut self, row: u32, col: u32, style: CellStyle) {
        self.set_cell_style(row, col, style);
    }

    fn merge(&mut self, region: MergedRegion) {
        self.add_merge(region);
    }

    fn insert_rows_below(&mut self, row: u32, count: u32) {
        Sheet::insert_rows_below(self, row, count);
    }

    fn set_row_height(&mut self, row: u32, height: f64) {
        self.set_height(row, height);
    }

    fn set_column_width(&mut self, col: u32, width: f64) {
        self.set_width(col, width);
    }

    fn autofit_rows(&mut self) {
        for row in 1..=self.last_row() {
            let lines = (1..=self.last_column())
                .map(|col| self.value(row, col).display_text().lines().count().max(1))
                .max()
                .unwrap_or(1);
            self.set_height(row, lines as f64 * LINE_HEIGHT);
        }
    }

    fn autofit_columns(&mut self) {
        for col in 1..=self.last_column() {
            let widest = (1..=self.last_row())
                .flat_map(|row| {
                    self.value(row, col)
                        .display_text()
                        .lines()
                        .map(UnicodeWidthStr::width)
                        .collect::<Vec<_>>()
                })
                .max()
                .unwrap_or(0);
            if widest > 0 {
                self.set_width(col, widest as f64);
            }
        }
    }
}
