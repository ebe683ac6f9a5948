//! Layout capture and positional remap.
//!
//! Styles, merged regions and row heights are recorded at their template
//! coordinates while the expander walks the sheet. Each template row is
//! then placed in the output with a number of copies; the cumulative
//! offset of all earlier placements gives every record its output row.

use std::collections::BTreeMap;

use super::adapter::GridSource;
use super::sheet::{Extent, MergedRegion};
use crate::config::LayoutOptions;

#[derive(Clone, Debug)]
struct LayoutRecord<S> {
    row: u32,
    col: u32,
    style: Option<S>,
    merged: Option<Extent>,
}

/// Where a template row landed in the output.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Placement {
    /// Output row of the first copy.
    pub first_row: u32,
    /// Number of copies; zero when the row was removed.
    pub copies: u32,
}

/// Geometry ready to be written to the output sheet.
#[derive(Clone, Debug, PartialEq)]
pub struct RemappedLayout<S> {
    pub styles: Vec<(u32, u32, S)>,
    pub merges: Vec<MergedRegion>,
    pub row_heights: Vec<(u32, f64)>,
}

/// Records template geometry and the placement of every template row.
///
/// The offset counter lives here, so one tracker serves exactly one sheet
/// of one render call.
#[derive(Clone, Debug)]
pub struct LayoutTracker<S> {
    records: Vec<LayoutRecord<S>>,
    heights: BTreeMap<u32, f64>,
    placements: BTreeMap<u32, Placement>,
    offset: i64,
}

impl<S> Default for LayoutTracker<S> {
    fn default() -> Self {
        LayoutTracker {
            records: Vec::new(),
            heights: BTreeMap::new(),
            placements: BTreeMap::new(),
            offset: 0,
        }
    }
}

impl<S: Clone> LayoutTracker<S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the style and merged extent of every column of a template
    /// row, and its height, as enabled by `options`.
    pub fn capture_row<G>(&mut self, source: &G, row: u32, options: &LayoutOptions)
    where
        G: GridSource<Style = S>,
    {
        if options.preserve_cell_styles || options.preserve_merged_cells {
            for col in 1..=source.last_column() {
                let style = options
                    .preserve_cell_styles
                    .then(|| source.style(row, col))
                    .flatten();
                let merged = options
                    .preserve_merged_cells
                    .then(|| source.merged_extent(row, col))
                    .flatten();
                if style.is_some() || merged.is_some() {
                    self.records.push(LayoutRecord {
                        row,
                        col,
                        style,
                        merged,
                    });
                }
            }
        }

        if options.preserve_row_height {
            if let Some(height) = source.row_height(row) {
                self.heights.insert(row, height);
            }
        }
    }

    /// Places a template row with `copies` copies and returns its first
    /// output row. Rows must be placed in template order.
    pub fn place(&mut self, template_row: u32, copies: u32) -> Placement {
        let first_row = (i64::from(template_row) + self.offset).max(1) as u32;
        self.offset += i64::from(copies) - 1;
        let placement = Placement { first_row, copies };
        self.placements.insert(template_row, placement);
        placement
    }

    /// Output rows shifted so far (negative when rows were removed).
    pub fn offset(&self) -> i64 {
        self.offset
    }

    pub fn placement(&self, template_row: u32) -> Option<Placement> {
        self.placements.get(&template_row).copied()
    }

    /// Translates every record to its output rows, one per copy. Merged
    /// regions keep their extent; records of removed rows are dropped.
    pub fn remap(&self) -> RemappedLayout<S> {
        let mut layout = RemappedLayout {
            styles: Vec::new(),
            merges: Vec::new(),
            row_heights: Vec::new(),
        };

        for record in &self.records {
            for row in self.output_rows(record.row) {
                if let Some(style) = &record.style {
                    layout.styles.push((row, record.col, style.clone()));
                }
                if let Some(extent) = record.merged {
                    layout
                        .merges
                        .push(MergedRegion::new(row, record.col, extent));
                }
            }
        }

        for (&template_row, &height) in &self.heights {
            for row in self.output_rows(template_row) {
                layout.row_heights.push((row, height));
            }
        }

        layout
    }

    fn output_rows(&self, template_row: u32) -> std::ops::Range<u32> {
        match self.placements.get(&template_row) {
            Some(p) => p.first_row..p.first_row + p.copies,
            None => 0..0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tabular::sheet::{CellStyle, Sheet};

    fn template() -> Sheet {
        let mut sheet = Sheet::new("T");
        for row in 1..=6 {
            sheet.set_value(row, 1, format!("r{}", row));
        }
        sheet.set_cell_style(5, 2, CellStyle::bold());
        sheet.add_merge(MergedRegion::new(5, 1, Extent::new(1, 3)));
        sheet.set_height(5, 30.0);
        sheet.set_cell_style(6, 1, CellStyle::bold());
        sheet
    }

    fn track(sheet: &Sheet, copies: &[(u32, u32)]) -> LayoutTracker<CellStyle> {
        let mut tracker = LayoutTracker::new();
        for &(row, n) in copies {
            tracker.capture_row(sheet, row, &LayoutOptions::default());
            tracker.place(row, n);
        }
        tracker
    }

    #[test]
    fn merge_on_expanded_row_is_repeated_per_copy() {
        let sheet = template();
        let tracker = track(&sheet, &[(1, 1), (2, 1), (3, 1), (4, 1), (5, 3), (6, 1)]);
        let layout = tracker.remap();

        assert_eq!(
            layout.merges,
            vec![
                MergedRegion::new(5, 1, Extent::new(1, 3)),
                MergedRegion::new(6, 1, Extent::new(1, 3)),
                MergedRegion::new(7, 1, Extent::new(1, 3)),
            ]
        );
        assert_eq!(layout.row_heights, vec![(5, 30.0), (6, 30.0), (7, 30.0)]);
    }

    #[test]
    fn later_rows_shift_by_inserted_copies() {
        let sheet = template();
        let tracker = track(&sheet, &[(5, 3), (6, 1)]);
        let layout = tracker.remap();
        assert!(layout
            .styles
            .contains(&(8, 1, CellStyle::bold())));
        assert_eq!(tracker.offset(), 2);
    }

    #[test]
    fn removed_row_drops_its_records_and_pulls_rows_up() {
        let sheet = template();
        let tracker = track(&sheet, &[(5, 0), (6, 1)]);
        let layout = tracker.remap();

        assert!(layout.merges.is_empty());
        assert!(layout.row_heights.is_empty());
        assert_eq!(layout.styles, vec![(5, 1, CellStyle::bold())]);
        assert_eq!(tracker.placement(6), Some(Placement { first_row: 5, copies: 1 }));
    }

    #[test]
    fn disabled_toggles_capture_nothing() {
        let sheet = template();
        let options = LayoutOptions {
            preserve_cell_styles: false,
            preserve_merged_cells: false,
            preserve_row_height: false,
            ..LayoutOptions::default()
        };
        let mut tracker = LayoutTracker::<CellStyle>::new();
        tracker.capture_row(&sheet, 5, &options);
        tracker.place(5, 2);
        let layout = tracker.remap();
        assert!(layout.styles.is_empty());
        assert!(layout.merges.is_empty());
        assert!(layout.row_heights.is_empty());
    }
}
