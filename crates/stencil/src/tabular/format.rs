//! Workbook file formats.
//!
//! Workbooks are stored as JSON or YAML (the full model: values, formulas,
//! styles, merges and sizes) or as CSV (values of a single sheet only).

use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::sheet::{CellValue, Sheet, Workbook};
use crate::error::{ConfigError, ExportError, Result};

/// Supported workbook file formats.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GridFormat {
    Json,
    Yaml,
    Csv,
}

/// Sheet name given to workbooks read from CSV.
pub const CSV_SHEET_NAME: &str = "Sheet1";

impl GridFormat {
    /// Picks the format from a file extension.
    pub fn from_path(path: &Path) -> std::result::Result<Self, ConfigError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("json") => Ok(GridFormat::Json),
            Some("yaml") | Some("yml") => Ok(GridFormat::Yaml),
            Some("csv") => Ok(GridFormat::Csv),
            _ => Err(ConfigError::UnknownFormat {
                path: path.to_path_buf(),
            }),
        }
    }

    /// Reads a workbook from any reader.
    pub fn read(self, reader: impl Read) -> Result<Workbook> {
        match self {
            GridFormat::Json => Ok(serde_json::from_reader(reader)?),
            GridFormat::Yaml => Ok(serde_yaml::from_reader(reader)?),
            GridFormat::Csv => read_csv(reader),
        }
    }

    /// Opens and reads a workbook file, picking the format from its
    /// extension.
    pub fn load(path: &Path) -> Result<Workbook> {
        let format = GridFormat::from_path(path)?;
        let file = File::open(path).map_err(|source| ConfigError::TemplateUnreadable {
            path: path.to_path_buf(),
            source,
        })?;
        format.read(BufReader::new(file))
    }

    /// Writes a workbook. CSV accepts exactly one sheet.
    pub fn write(self, workbook: &Workbook, writer: impl Write) -> Result<()> {
        match self {
            GridFormat::Json => Ok(serde_json::to_writer_pretty(writer, workbook)?),
            GridFormat::Yaml => Ok(serde_yaml::to_writer(writer, workbook)?),
            GridFormat::Csv => write_csv(workbook, writer),
        }
    }
}

fn read_csv(reader: impl Read) -> Result<Workbook> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut sheet = Sheet::new(CSV_SHEET_NAME);
    for (row, record) in (1..).zip(csv_reader.records()) {
        for (col, field) in (1..).zip(record?.iter()) {
            let value = parse_field(field);
            if !value.is_blank() {
                sheet.set_value(row, col, value);
            }
        }
    }

    Ok(Workbook::new().with_sheet(sheet))
}

fn parse_field(field: &str) -> CellValue {
    if field.is_empty() {
        CellValue::Empty
    } else if let Ok(n) = field.parse::<i64>() {
        CellValue::Integer(n)
    } else if let Ok(n) = field.parse::<f64>() {
        CellValue::Number(n)
    } else {
        CellValue::text(field)
    }
}

fn write_csv(workbook: &Workbook, writer: impl Write) -> Result<()> {
    let sheet = match workbook.sheets.as_slice() {
        [sheet] => sheet,
        sheets => {
            return Err(ExportError::Format(format!(
                "CSV holds exactly one sheet, workbook has {}",
                sheets.len()
            )))
        }
    };

    let mut wtr = csv::WriterBuilder::new().flexible(true).from_writer(writer);
    for row in 1..=sheet.last_row() {
        let record: Vec<String> = (1..=sheet.last_column())
            .map(|col| sheet.value(row, col).display_text())
            .collect();
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}
