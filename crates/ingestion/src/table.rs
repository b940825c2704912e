//! Tabular file reading.
//!
//! Reads delimited text and Excel workbooks into a small untyped table
//! (header row plus cells) that the auction and forecast loaders clean up
//! and type.

use calamine::{open_workbook_auto, Data, Reader};
use ida_core::{Error, Result};
use std::io::Read;
use std::path::Path;

/// A single cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
}

impl Cell {
    /// Build a cell from raw text; blank text is empty.
    pub fn from_text(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            Cell::Empty
        } else {
            Cell::Text(trimmed.to_string())
        }
    }

    /// True for empty cells.
    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    /// True for empty cells and the literal `NA` marker.
    pub fn is_missing(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s == "NA",
            Cell::Number(_) => false,
        }
    }

    /// Numeric value, parsing text if necessary.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Number(v) => Some(*v),
            Cell::Text(s) => s.parse().ok(),
            Cell::Empty => None,
        }
    }

    /// Text value (numbers are formatted).
    pub fn as_text(&self) -> Option<String> {
        match self {
            Cell::Text(s) => Some(s.clone()),
            Cell::Number(v) => Some(v.to_string()),
            Cell::Empty => None,
        }
    }
}

impl From<&Data> for Cell {
    fn from(data: &Data) -> Self {
        match data {
            Data::Empty => Cell::Empty,
            Data::Int(v) => Cell::Number(*v as f64),
            Data::Float(v) => Cell::Number(*v),
            Data::String(s) => Cell::from_text(s),
            other => Cell::from_text(&other.to_string()),
        }
    }
}

/// Header row plus data rows. Short rows are padded with empty cells.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl RawTable {
    /// Create a table, padding or truncating rows to the header width.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        let width = headers.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, Cell::Empty);
                row
            })
            .collect();
        Self { headers, rows }
    }

    /// Read a CSV or Excel file, chosen by extension.
    pub fn read(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        match ext.as_str() {
            "csv" | "txt" => Self::read_csv(path),
            "xlsx" | "xlsm" | "xls" | "ods" => Self::read_excel(path),
            _ => Err(Error::read(path, format!("unsupported file extension '{ext}'"))),
        }
    }

    /// Read a comma-separated file with a header row.
    pub fn read_csv(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path).map_err(|e| Error::read(path, e))?;
        Self::from_csv_reader(file).map_err(|e| match e {
            Error::Data(msg) => Error::read(path, msg),
            other => other,
        })
    }

    /// Parse CSV from any reader.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers = csv_reader
            .headers()
            .map_err(|e| Error::data(format!("invalid CSV header: {e}")))?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let mut rows = Vec::new();
        for (line, record) in csv_reader.records().enumerate() {
            let record = record.map_err(|e| Error::data(format!("row {}: {e}", line + 1)))?;
            rows.push(record.iter().map(Cell::from_text).collect());
        }

        Ok(Self::new(headers, rows))
    }

    /// Read the first worksheet of a workbook.
    pub fn read_excel(path: &Path) -> Result<Self> {
        let mut workbook = open_workbook_auto(path).map_err(|e| Error::read(path, e))?;
        let sheet = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| Error::read(path, "workbook has no sheets"))?;
        let range = workbook
            .worksheet_range(&sheet)
            .map_err(|e| Error::read(path, e))?;

        let mut rows = range.rows();
        let headers = match rows.next() {
            Some(header_row) => header_row
                .iter()
                .map(|cell| Cell::from(cell).as_text().unwrap_or_default())
                .collect(),
            None => return Err(Error::read(path, "worksheet is empty")),
        };
        let rows = rows.map(|row| row.iter().map(Cell::from).collect()).collect();

        Ok(Self::new(headers, rows))
    }

    /// Number of data rows.
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Index of a column, matched case-insensitively.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(name.trim()))
    }

    /// Drop every row holding an empty cell.
    pub fn drop_incomplete_rows(&mut self) {
        self.rows.retain(|row| !row.iter().any(Cell::is_empty));
    }

    /// Drop every row holding an empty or `NA` cell.
    pub fn drop_missing_rows(&mut self) {
        self.rows.retain(|row| !row.iter().any(Cell::is_missing));
    }

    /// Drop index/placeholder columns: blank headers or headers containing `unnamed`.
    pub fn drop_unnamed_columns(&mut self) {
        let keep: Vec<bool> = self
            .headers
            .iter()
            .map(|h| !(h.is_empty() || h.to_ascii_lowercase().contains("unnamed")))
            .collect();
        if keep.iter().all(|&k| k) {
            return;
        }

        self.headers = retain_columns(std::mem::take(&mut self.headers), &keep);
        for row in &mut self.rows {
            *row = retain_columns(std::mem::take(row), &keep);
        }
    }
}

fn retain_columns<T>(values: Vec<T>, keep: &[bool]) -> Vec<T> {
    values
        .into_iter()
        .zip(keep)
        .filter_map(|(v, &k)| k.then_some(v))
        .collect()
}
