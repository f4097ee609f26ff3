//! Workbook loading on top of calamine. A loaded sheet becomes a dense
//! [`SheetGrid`] addressed in absolute spreadsheet coordinates (row 0 =
//! spreadsheet row 1), so callers can use the row numbers the source
//! institutions document their layouts with.

use crate::error::{IngestError, Result};
use calamine::{open_workbook_auto, Data, Reader};
use chrono::NaiveDateTime;
use std::path::Path;

/// A typed cell value decoupled from the reader library.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    DateTime(NaiveDateTime),
}

static EMPTY_CELL: CellValue = CellValue::Empty;

impl CellValue {
    fn from_data(data: &Data) -> Self {
        match data {
            Data::Empty => CellValue::Empty,
            Data::String(s) => CellValue::Text(s.clone()),
            Data::Float(f) => CellValue::Number(*f),
            Data::Int(i) => CellValue::Number(*i as f64),
            Data::Bool(b) => CellValue::Bool(*b),
            Data::DateTime(dt) => dt
                .as_datetime()
                .map_or(CellValue::Empty, CellValue::DateTime),
            Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
            // Formula error cells carry no usable value.
            Data::Error(_) => CellValue::Empty,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }
}

/// One worksheet as a dense grid. Out-of-range reads yield empty cells, so
/// callers never have to bounds-check ragged sheet tails.
#[derive(Debug, Clone)]
pub struct SheetGrid {
    name: String,
    rows: Vec<Vec<CellValue>>,
}

impl SheetGrid {
    /// Builds a grid directly from rows, padding them to a uniform width.
    pub fn new(name: &str, mut rows: Vec<Vec<CellValue>>) -> Self {
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        for row in &mut rows {
            row.resize(width, CellValue::Empty);
        }
        SheetGrid {
            name: name.to_string(),
            rows,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of rows up to and including the last non-empty one.
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns up to and including the last non-empty one.
    pub fn width(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    pub fn cell(&self, row: usize, col: usize) -> &CellValue {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&EMPTY_CELL)
    }
}

/// Loads the first sheet of the workbook, the convention for single-table
/// exports.
pub fn load_first_sheet(path: &Path) -> Result<SheetGrid> {
    load_inner(path, None)
}

/// Loads a sheet by name.
pub fn load_sheet(path: &Path, sheet: &str) -> Result<SheetGrid> {
    load_inner(path, Some(sheet))
}

fn load_inner(path: &Path, sheet: Option<&str>) -> Result<SheetGrid> {
    let mut workbook = open_workbook_auto(path).map_err(|source| IngestError::WorkbookOpen {
        path: path.to_path_buf(),
        source,
    })?;

    let sheet_names = workbook.sheet_names().to_vec();
    let name = match sheet {
        Some(requested) => requested.to_string(),
        None => sheet_names
            .first()
            .cloned()
            .ok_or_else(|| IngestError::NoSheets {
                path: path.to_path_buf(),
            })?,
    };

    let range = workbook
        .worksheet_range(&name)
        .map_err(|source| IngestError::SheetRead {
            path: path.to_path_buf(),
            sheet: name.clone(),
            source,
        })?;

    // Data may not begin at A1; pad so grid coordinates stay absolute.
    let (start_row, start_col) = range
        .start()
        .map_or((0, 0), |(r, c)| (r as usize, c as usize));
    let (data_height, data_width) = range.get_size();
    let height = if data_height == 0 {
        0
    } else {
        start_row + data_height
    };
    let width = if data_width == 0 {
        0
    } else {
        start_col + data_width
    };

    let mut rows = vec![vec![CellValue::Empty; width]; height];
    for (row_idx, row) in range.rows().enumerate() {
        for (col_idx, cell) in row.iter().enumerate() {
            rows[start_row + row_idx][start_col + col_idx] = CellValue::from_data(cell);
        }
    }

    Ok(SheetGrid { name, rows })
}
