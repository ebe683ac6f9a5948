//! Row expansion for one worksheet.

use std::sync::Arc;

use stencil_data::{Collection, DataSets, DataValue, Scope};
use tracing::debug;

use super::adapter::GridSource;
use super::layout::{LayoutTracker, RemappedLayout};
use super::sheet::CellValue;
use crate::config::RenderOptions;
use crate::error::{cell_name, ExportError, Result};
use crate::resolve::{resolve, Lookup, Miss, TokenMiss};
use crate::token::FieldReference;

/// Result of expanding one sheet, ready to be written to a sink.
#[derive(Debug)]
pub struct Expansion<S> {
    /// Output rows, top to bottom, each as wide as the template.
    pub rows: Vec<Vec<CellValue>>,
    pub layout: RemappedLayout<S>,
    pub misses: Vec<TokenMiss>,
}

/// The collection a row is bound to and every data-set name that refers
/// to it.
struct Binding {
    collection: Collection,
    origin: Option<Origin>,
    names: Vec<String>,
}

impl Binding {
    fn is_same(&self, collection: &Collection, origin: &Option<Origin>) -> bool {
        self.collection.ptr_eq(collection) || (origin.is_some() && self.origin == *origin)
    }
}

/// A collection read from a record property: the record's identity and the
/// property path. Records may build a fresh collection on every read, so
/// two reads of one property are matched by origin.
#[derive(PartialEq, Eq)]
struct Origin {
    record: *const (),
    path: String,
}

impl Origin {
    fn of(reference: &FieldReference, scope: &Scope<'_>) -> Option<Origin> {
        let path = reference.property_path()?;
        match scope.lookup(reference.dataset_name())? {
            DataValue::Record(record) => Some(Origin {
                record: Arc::as_ptr(record).cast::<()>(),
                path: path.to_string(),
            }),
            _ => None,
        }
    }
}

/// A template cell after parsing.
enum TemplateCell {
    /// Plain content, copied as is.
    Literal(CellValue),
    /// A framed token; `None` when malformed.
    Token {
        text: String,
        reference: Option<FieldReference>,
    },
}

/// Walks a template sheet once and produces the expanded output.
///
/// The expander owns all per-sheet state: the output buffer, the layout
/// tracker and its offset counter, and the list of soft misses.
pub struct SheetExpander<'a, G: GridSource> {
    source: &'a G,
    data: &'a DataSets,
    options: &'a RenderOptions,
    tracker: LayoutTracker<G::Style>,
    rows: Vec<Vec<CellValue>>,
    misses: Vec<TokenMiss>,
    width: usize,
}

impl<'a, G: GridSource> SheetExpander<'a, G> {
    pub fn new(source: &'a G, data: &'a DataSets, options: &'a RenderOptions) -> Self {
        SheetExpander {
            source,
            data,
            options,
            tracker: LayoutTracker::new(),
            rows: Vec::new(),
            misses: Vec::new(),
            width: source.last_column() as usize,
        }
    }

    /// Expands every template row in order.
    ///
    /// # Errors
    ///
    /// - [`ExportError::UnsupportedContent`] for a formula cell
    /// - [`ExportError::TemplateConflict`] when one row refers to two
    ///   different collections
    /// - [`ExportError::Aggregate`] under strict aggregation
    pub fn expand(mut self) -> Result<Expansion<G::Style>> {
        let root = Scope::root(self.data);

        for row in 1..=self.source.last_row() {
            let cells = self.parse_row(row)?;
            let binding = self.bind_row(row, &cells, &root)?;
            self.tracker
                .capture_row(self.source, row, self.options.layout());

            match binding {
                Some(binding) => {
                    let copies = binding.collection.len() as u32;
                    let placement = self.tracker.place(row, copies);
                    debug!(
                        sheet = self.source.name(),
                        row,
                        collection = binding.names.first().map(String::as_str),
                        copies,
                        first_row = placement.first_row,
                        "expanding collection row"
                    );
                    for member in binding.collection.iter() {
                        let values =
                            self.render_member(row, &cells, &root, &binding.names, member)?;
                        self.rows.push(values);
                    }
                }
                None => {
                    self.tracker.place(row, 1);
                    let values = self.render_cells(row, &cells, &root)?;
                    self.rows.push(values);
                }
            }
        }

        Ok(Expansion {
            rows: self.rows,
            layout: self.tracker.remap(),
            misses: self.misses,
        })
    }

    fn parse_row(&self, row: u32) -> Result<Vec<(u32, TemplateCell)>> {
        let syntax = self.options.syntax();
        self.source
            .row_cells(row)
            .into_iter()
            .map(|(col, value)| {
                if self.source.has_formula(row, col) {
                    return Err(ExportError::UnsupportedContent {
                        sheet: self.source.name().to_string(),
                        row,
                        col,
                    });
                }
                let cell = match value.as_text().filter(|text| syntax.is_framed(text)) {
                    Some(text) => TemplateCell::Token {
                        text: text.to_string(),
                        reference: syntax.parse_cell(text),
                    },
                    None => TemplateCell::Literal(value),
                };
                Ok((col, cell))
            })
            .collect()
    }

    /// Finds the single collection a row refers to, if any.
    fn bind_row(
        &self,
        row: u32,
        cells: &[(u32, TemplateCell)],
        root: &Scope<'_>,
    ) -> Result<Option<Binding>> {
        let mut binding: Option<Binding> = None;

        for (_, cell) in cells {
            let TemplateCell::Token {
                reference: Some(reference),
                ..
            } = cell
            else {
                continue;
            };
            let Lookup::Collection(collection) =
                resolve(reference, root, self.options.aggregation())?
            else {
                continue;
            };
            let name = reference.dataset_name().to_string();
            let origin = Origin::of(reference, root);

            match &mut binding {
                None => {
                    binding = Some(Binding {
                        collection,
                        origin,
                        names: vec![name],
                    })
                }
                Some(bound) if bound.is_same(&collection, &origin) => {
                    if !bound.names.contains(&name) {
                        bound.names.push(name);
                    }
                }
                Some(bound) => {
                    return Err(ExportError::TemplateConflict {
                        sheet: self.source.name().to_string(),
                        row,
                        first: bound.names[0].clone(),
                        second: name,
                    });
                }
            }
        }

        Ok(binding)
    }

    /// Renders one copy of a row with every bound name pointing at `member`.
    fn render_member(
        &mut self,
        row: u32,
        cells: &[(u32, TemplateCell)],
        scope: &Scope<'_>,
        names: &[String],
        member: &DataValue,
    ) -> Result<Vec<CellValue>> {
        match names.split_first() {
            Some((name, rest)) => {
                let child = scope.push(name, member.clone());
                self.render_member(row, cells, &child, rest, member)
            }
            None => self.render_cells(row, cells, scope),
        }
    }

    fn render_cells(
        &mut self,
        row: u32,
        cells: &[(u32, TemplateCell)],
        scope: &Scope<'_>,
    ) -> Result<Vec<CellValue>> {
        let mut values = vec![CellValue::Empty; self.width];

        for (col, cell) in cells {
            let value = match cell {
                TemplateCell::Literal(value) => value.clone(),
                TemplateCell::Token {
                    text,
                    reference: None,
                } => CellValue::text(text.as_str()),
                TemplateCell::Token {
                    text,
                    reference: Some(reference),
                } => match resolve(reference, scope, self.options.aggregation())? {
                    Lookup::Value(value) => CellValue::from(value),
                    Lookup::Aggregate(result) => {
                        result.map(CellValue::from).unwrap_or(CellValue::Empty)
                    }
                    Lookup::Collection(_) => CellValue::Empty,
                    Lookup::Miss(miss) => {
                        self.record_miss(row, *col, text, miss);
                        match miss {
                            Miss::UnknownDataset => CellValue::text(text.as_str()),
                            Miss::MissingProperty => CellValue::Empty,
                        }
                    }
                },
            };
            let slot = (*col as usize)
                .checked_sub(1)
                .and_then(|index| values.get_mut(index));
            if let Some(slot) = slot {
                *slot = value;
            }
        }

        Ok(values)
    }

    fn record_miss(&mut self, row: u32, col: u32, token: &str, miss: Miss) {
        let location = format!("{}!{}", self.source.name(), cell_name(row, col));
        debug!(%location, token, reason = miss.describe(), "unresolved token");
        self.misses.push(TokenMiss {
            location,
            token: token.to_string(),
            reason: miss,
        });
    }
}
