//! Excel (XLSX/XLSM/XLS/XLSB) reading through calamine
//!
//! Excel files have no repetition markers, so every cell maps to one logical
//! column. A range that does not start at A1 is padded with repeated empty
//! rows/cells so positions line up with the ODS reader.

use anyhow::{Context, Result};
use calamine::{Data, Range, Reader, Sheets, open_workbook_auto};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use super::{RawCell, Row, Sheet, WorkbookReader};

pub struct ExcelReader {
    workbook: Sheets<BufReader<File>>,
}

impl ExcelReader {
    pub fn open(path: &Path) -> Result<Self> {
        let workbook = open_workbook_auto(path)
            .with_context(|| format!("Failed to open workbook: {}", path.display()))?;
        Ok(Self { workbook })
    }
}

impl WorkbookReader for ExcelReader {
    fn read_sheets(&mut self) -> Result<Vec<Sheet>> {
        let mut sheets = Vec::new();
        for name in self.workbook.sheet_names() {
            let range = self
                .workbook
                .worksheet_range(&name)
                .with_context(|| format!("Failed to read sheet '{}'", name))?;
            sheets.push(Sheet {
                rows: rows_from_range(&range),
                name,
            });
        }
        Ok(sheets)
    }
}

fn rows_from_range(range: &Range<Data>) -> Vec<Row> {
    let Some((start_row, start_col)) = range.start() else {
        return Vec::new();
    };

    let mut rows = Vec::new();
    if start_row > 0 {
        rows.push(Row {
            cells: Vec::new(),
            repeated: start_row,
        });
    }
    for cells in range.rows() {
        let mut row_cells = Vec::with_capacity(cells.len() + 1);
        if start_col > 0 {
            row_cells.push(RawCell::empty().repeated(start_col));
        }
        row_cells.extend(cells.iter().map(cell_from_data));
        rows.push(Row::new(row_cells));
    }
    rows
}

fn cell_from_data(data: &Data) -> RawCell {
    match data {
        Data::Empty => RawCell::empty(),
        Data::String(s) => RawCell::text(s.clone()),
        Data::Int(i) => RawCell::text(i.to_string()).with_value(i.to_string()),
        Data::Float(f) => RawCell::text(f.to_string()).with_value(f.to_string()),
        Data::Bool(b) => RawCell::text(b.to_string()),
        other => RawCell::text(other.to_string()),
    }
}
