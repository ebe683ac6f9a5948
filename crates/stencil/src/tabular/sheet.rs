//! In-memory workbook model.
//!
//! A [`Workbook`] is an ordered list of [`Sheet`]s. Coordinates are 1-based
//! `(row, col)` pairs. Sheets serialize with `serde`, cells as a flat list of
//! entries so the files stay readable and diffable.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use stencil_data::{DataValue, Number};

/// Text alignment within a cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    #[default]
    Left,
    Right,
    Center,
}

/// A typed cell value.
///
/// Conversion from [`DataValue`] follows one rule per kind: booleans,
/// integers, floats and date-times keep their type; records use their
/// textual form; everything else becomes text or empty.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    #[default]
    Empty,
    Bool(bool),
    Integer(i64),
    Number(f64),
    DateTime(NaiveDateTime),
    Text(String),
}

impl CellValue {
    pub fn text(s: impl Into<String>) -> Self {
        CellValue::Text(s.into())
    }

    /// Returns `true` for empty cells and empty text.
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// The text a spreadsheet would display, used for CSV and autofit.
    pub fn display_text(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Bool(b) => b.to_string(),
            CellValue::Integer(n) => n.to_string(),
            CellValue::Number(n) => n.to_string(),
            CellValue::DateTime(dt) => dt.format(stencil_data::DATE_TIME_FORMAT).to_string(),
            CellValue::Text(s) => s.clone(),
        }
    }
}

impl From<Number> for CellValue {
    fn from(n: Number) -> Self {
        match n.as_i64() {
            Some(i) => CellValue::Integer(i),
            None => CellValue::Number(n.to_f64()),
        }
    }
}

impl From<DataValue> for CellValue {
    fn from(value: DataValue) -> Self {
        match value {
            DataValue::Null => CellValue::Empty,
            DataValue::Bool(b) => CellValue::Bool(b),
            DataValue::Number(n) => n.into(),
            DataValue::Text(s) => CellValue::Text(s),
            DataValue::DateTime(dt) => CellValue::DateTime(dt),
            DataValue::Record(record) => record
                .to_text()
                .map(CellValue::Text)
                .unwrap_or(CellValue::Empty),
            DataValue::List(_) => CellValue::Empty,
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<i64> for CellValue {
    fn from(n: i64) -> Self {
        CellValue::Integer(n)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Bool(b)
    }
}

/// Visual formatting of a cell.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CellStyle {
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub bold: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub italic: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub align: Option<Align>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number_format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_color: Option<String>,
}

impl CellStyle {
    pub fn bold() -> Self {
        CellStyle {
            bold: true,
            ..Default::default()
        }
    }
}

/// Size of a merged region in rows and columns.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extent {
    pub rows: u32,
    pub cols: u32,
}

impl Extent {
    pub fn new(rows: u32, cols: u32) -> Self {
        Extent { rows, cols }
    }
}

/// A merged region anchored at its top-left cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergedRegion {
    pub row: u32,
    pub col: u32,
    #[serde(flatten)]
    pub extent: Extent,
}

impl MergedRegion {
    pub fn new(row: u32, col: u32, extent: Extent) -> Self {
        MergedRegion { row, col, extent }
    }
}

/// One stored cell: a value, an optional formula and an optional style.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Cell {
    pub value: CellValue,
    pub formula: Option<String>,
    pub style: Option<CellStyle>,
}

/// A single worksheet.
///
/// ```
/// use stencil::tabular::{CellValue, Sheet};
///
/// let mut sheet = Sheet::new("Report");
/// sheet.set_value(1, 1, "Name");
/// sheet.set_value(2, 1, "{{P::Name}}");
///
/// assert_eq!(sheet.last_row(), 2);
/// assert_eq!(sheet.value(2, 1), &CellValue::text("{{P::Name}}"));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SheetRepr", into = "SheetRepr")]
pub struct Sheet {
    name: String,
    cells: BTreeMap<(u32, u32), Cell>,
    merges: Vec<MergedRegion>,
    row_heights: BTreeMap<u32, f64>,
    column_widths: BTreeMap<u32, f64>,
}

static EMPTY: CellValue = CellValue::Empty;

impl Sheet {
    pub fn new(name: impl Into<String>) -> Self {
        Sheet {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Stores a value, keeping any style already on the cell.
    pub fn set_value(&mut self, row: u32, col: u32, value: impl Into<CellValue>) {
        self.cells.entry((row, col)).or_default().value = value.into();
    }

    /// Stores a formula; the cached value is left as is.
    pub fn set_formula(&mut self, row: u32, col: u32, formula: impl Into<String>) {
        self.cells.entry((row, col)).or_default().formula = Some(formula.into());
    }

    pub fn set_cell_style(&mut self, row: u32, col: u32, style: CellStyle) {
        self.cells.entry((row, col)).or_default().style = Some(style);
    }

    pub fn cell(&self, row: u32, col: u32) -> Option<&Cell> {
        self.cells.get(&(row, col))
    }

    /// The cell value, `Empty` when nothing is stored.
    pub fn value(&self, row: u32, col: u32) -> &CellValue {
        self.cell(row, col).map(|c| &c.value).unwrap_or(&EMPTY)
    }

    pub fn cell_style(&self, row: u32, col: u32) -> Option<&CellStyle> {
        self.cell(row, col).and_then(|c| c.style.as_ref())
    }

    /// Values of one row from column 1 to its last non-blank column.
    pub fn row_values(&self, row: u32) -> Vec<CellValue> {
        let last = self
            .cells
            .range((row, 0)..=(row, u32::MAX))
            .filter(|(_, cell)| !cell.value.is_blank())
            .map(|((_, col), _)| *col)
            .max()
            .unwrap_or(0);
        (1..=last).map(|col| self.value(row, col).clone()).collect()
    }

    /// Adds a merged region, replacing any region with the same anchor.
    pub fn add_merge(&mut self, region: MergedRegion) {
        self.merges
            .retain(|m| (m.row, m.col) != (region.row, region.col));
        self.merges.push(region);
        self.merges.sort_by_key(|m| (m.row, m.col));
    }

    pub fn merges(&self) -> &[MergedRegion] {
        &self.merges
    }

    pub fn set_height(&mut self, row: u32, height: f64) {
        self.row_heights.insert(row, height);
    }

    pub fn height(&self, row: u32) -> Option<f64> {
        self.row_heights.get(&row).copied()
    }

    pub fn set_width(&mut self, col: u32, width: f64) {
        self.column_widths.insert(col, width);
    }

    pub fn width(&self, col: u32) -> Option<f64> {
        self.column_widths.get(&col).copied()
    }

    /// Highest row holding a value, formula or style, or covered by a merge.
    pub fn last_row(&self) -> u32 {
        let cells = self.cells.keys().map(|(row, _)| *row).max().unwrap_or(0);
        let merges = self
            .merges
            .iter()
            .map(|m| m.row + m.extent.rows.saturating_sub(1))
            .max()
            .unwrap_or(0);
        cells.max(merges)
    }

    /// Highest column holding a value, formula or style, or covered by a merge.
    pub fn last_column(&self) -> u32 {
        let cells = self.cells.keys().map(|(_, col)| *col).max().unwrap_or(0);
        let merges = self
            .merges
            .iter()
            .map(|m| m.col + m.extent.cols.saturating_sub(1))
            .max()
            .unwrap_or(0);
        cells.max(merges)
    }

    /// Inserts `count` empty rows below `row`, shifting everything under it
    /// down. Merges that straddle `row` grow to cover the new rows.
    pub fn insert_rows_below(&mut self, row: u32, count: u32) {
        if count == 0 {
            return;
        }
        let shift = |r: u32| if r > row { r + count } else { r };

        self.cells = std::mem::take(&mut self.cells)
            .into_iter()
            .map(|((r, c), cell)| ((shift(r), c), cell))
            .collect();
        self.row_heights = std::mem::take(&mut self.row_heights)
            .into_iter()
            .map(|(r, h)| (shift(r), h))
            .collect();
        for merge in &mut self.merges {
            let last = merge.row + merge.extent.rows.saturating_sub(1);
            if merge.row > row {
                merge.row += count;
            } else if last > row {
                merge.extent.rows += count;
            }
        }
    }

    pub(crate) fn cells(&self) -> impl Iterator<Item = (&(u32, u32), &Cell)> {
        self.cells.iter()
    }
}

/// An ordered collection of sheets.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Workbook {
    pub sheets: Vec<Sheet>,
}

impl Workbook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sheet(mut self, sheet: Sheet) -> Self {
        self.sheets.push(sheet);
        self
    }

    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name() == name)
    }
}

#[derive(Serialize, Deserialize)]
struct SheetRepr {
    name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    cells: Vec<CellEntry>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    merges: Vec<MergedRegion>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    row_heights: BTreeMap<u32, f64>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    column_widths: BTreeMap<u32, f64>,
}

#[derive(Serialize, Deserialize)]
struct CellEntry {
    row: u32,
    col: u32,
    #[serde(default, skip_serializing_if = "CellValue::is_empty_variant")]
    value: CellValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    formula: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    style: Option<CellStyle>,
}

impl CellValue {
    fn is_empty_variant(&self) -> bool {
        matches!(self, CellValue::Empty)
    }
}

impl TryFrom<SheetRepr> for Sheet {
    type Error = String;

    /// Rejects 0-based coordinates; rows and columns start at 1.
    fn try_from(repr: SheetRepr) -> Result<Self, Self::Error> {
        let zero_based = |what: &str| {
            format!(
                "sheet '{}': {} uses a 0 coordinate; rows and columns start at 1",
                repr.name, what
            )
        };
        if let Some(entry) = repr.cells.iter().find(|e| e.row == 0 || e.col == 0) {
            return Err(zero_based(&format!(
                "cell at row {} column {}",
                entry.row, entry.col
            )));
        }
        if repr.merges.iter().any(|m| m.row == 0 || m.col == 0) {
            return Err(zero_based("a merged region"));
        }
        if repr.row_heights.contains_key(&0) {
            return Err(zero_based("a row height"));
        }
        if repr.column_widths.contains_key(&0) {
            return Err(zero_based("a column width"));
        }

        let cells = repr
            .cells
            .into_iter()
            .map(|entry| {
                (
                    (entry.row, entry.col),
                    Cell {
                        value: entry.value,
                        formula: entry.formula,
                        style: entry.style,
                    },
                )
            })
            .collect();
        let mut sheet = Sheet {
            name: repr.name,
            cells,
            merges: Vec::new(),
            row_heights: repr.row_heights,
            column_widths: repr.column_widths,
        };
        for region in repr.merges {
            sheet.add_merge(region);
        }
        Ok(sheet)
    }
}

impl From<Sheet> for SheetRepr {
    fn from(sheet: Sheet) -> Self {
        SheetRepr {
            name: sheet.name,
            cells: sheet
                .cells
                .into_iter()
                .map(|((row, col), cell)| CellEntry {
                    row,
                    col,
                    value: cell.value,
                    formula: cell.formula,
                    style: cell.style,
                })
                .collect(),
            merges: sheet.merges,
            row_heights: sheet.row_heights,
            column_widths: sheet.column_widths,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stencil_data::MapRecord;

    #[test]
    fn data_value_conversion() {
        assert_eq!(CellValue::from(DataValue::Null), CellValue::Empty);
        assert_eq!(CellValue::from(DataValue::from(30)), CellValue::Integer(30));
        assert_eq!(CellValue::from(DataValue::from(30u8)), CellValue::Integer(30));
        assert_eq!(CellValue::from(DataValue::from(2.5)), CellValue::Number(2.5));
        assert_eq!(CellValue::from(DataValue::from(true)), CellValue::Bool(true));
        assert_eq!(CellValue::from(DataValue::from("x")), CellValue::text("x"));
        assert_eq!(
            CellValue::from(DataValue::from(MapRecord::new())),
            CellValue::Empty
        );
        assert_eq!(CellValue::from(DataValue::from(vec![1])), CellValue::Empty);
    }

    #[test]
    fn large_unsigned_becomes_float() {
        assert_eq!(
            CellValue::from(Number::U64(u64::MAX)),
            CellValue::Number(u64::MAX as f64)
        );
    }

    #[test]
    fn value_keeps_style() {
        let mut sheet = Sheet::new("S");
        sheet.set_cell_style(1, 1, CellStyle::bold());
        sheet.set_value(1, 1, "x");
        assert_eq!(sheet.cell_style(1, 1), Some(&CellStyle::bold()));
        assert_eq!(sheet.value(1, 1), &CellValue::text("x"));
        assert_eq!(sheet.value(9, 9), &CellValue::Empty);
    }

    #[test]
    fn extent_includes_styles_and_merges() {
        let mut sheet = Sheet::new("S");
        sheet.set_value(2, 2, 1i64);
        sheet.set_cell_style(4, 1, CellStyle::bold());
        sheet.add_merge(MergedRegion::new(1, 3, Extent::new(1, 2)));
        assert_eq!(sheet.last_row(), 4);
        assert_eq!(sheet.last_column(), 4);
    }

    #[test]
    fn row_values_trim_trailing_blanks() {
        let mut sheet = Sheet::new("S");
        sheet.set_value(1, 2, "b");
        sheet.set_cell_style(1, 5, CellStyle::bold());
        assert_eq!(
            sheet.row_values(1),
            vec![CellValue::Empty, CellValue::text("b")]
        );
        assert!(sheet.row_values(2).is_empty());
    }

    #[test]
    fn insert_rows_below_shifts_content() {
        let mut sheet = Sheet::new("S");
        sheet.set_value(1, 1, "top");
        sheet.set_value(2, 1, "bottom");
        sheet.set_height(2, 30.0);
        sheet.add_merge(MergedRegion::new(1, 2, Extent::new(2, 1)));
        sheet.add_merge(MergedRegion::new(3, 1, Extent::new(1, 2)));

        sheet.insert_rows_below(1, 2);

        assert_eq!(sheet.value(1, 1), &CellValue::text("top"));
        assert_eq!(sheet.value(2, 1), &CellValue::Empty);
        assert_eq!(sheet.value(4, 1), &CellValue::text("bottom"));
        assert_eq!(sheet.height(4), Some(30.0));
        assert_eq!(
            sheet.merges(),
            &[
                MergedRegion::new(1, 2, Extent::new(4, 1)),
                MergedRegion::new(5, 1, Extent::new(1, 2)),
            ]
        );
    }

    #[test]
    fn merge_with_same_anchor_replaces() {
        let mut sheet = Sheet::new("S");
        sheet.add_merge(MergedRegion::new(1, 1, Extent::new(1, 2)));
        sheet.add_merge(MergedRegion::new(1, 1, Extent::new(1, 3)));
        assert_eq!(sheet.merges(), &[MergedRegion::new(1, 1, Extent::new(1, 3))]);
    }

    #[test]
    fn sheet_serde_round_trip() {
        let mut sheet = Sheet::new("Report");
        sheet.set_value(1, 1, "Name");
        sheet.set_value(1, 2, 3i64);
        sheet.set_formula(2, 1, "=SUM(B1:B1)");
        sheet.set_cell_style(1, 1, CellStyle::bold());
        sheet.add_merge(MergedRegion::new(3, 1, Extent::new(1, 2)));
        sheet.set_height(1, 20.0);
        sheet.set_width(2, 12.5);

        let json = serde_json::to_string(&sheet).unwrap();
        let back: Sheet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, sheet);
    }

    #[test]
    fn zero_based_coordinates_are_rejected() {
        for json in [
            r#"{"name":"S","cells":[{"row":1,"col":0,"value":"x"}]}"#,
            r#"{"name":"S","cells":[{"row":0,"col":1,"value":"x"}]}"#,
            r#"{"name":"S","merges":[{"row":0,"col":1,"rows":1,"cols":2}]}"#,
            r#"{"name":"S","row_heights":{"0":12.0}}"#,
        ] {
            let err = serde_json::from_str::<Sheet>(json).unwrap_err();
            assert!(err.to_string().contains("start at 1"), "{}", err);
        }
    }

    #[test]
    fn untagged_values_deserialize_by_shape() {
        let values: Vec<CellValue> =
            serde_json::from_str(r#"[null, true, 3, 2.5, "text"]"#).unwrap();
        assert_eq!(
            values,
            vec![
                CellValue::Empty,
                CellValue::Bool(true),
                CellValue::Integer(3),
                CellValue::Number(2.5),
                CellValue::text("text"),
            ]
        );
    }
}
