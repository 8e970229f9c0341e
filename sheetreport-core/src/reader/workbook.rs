//! Workbook data structures

use std::iter;
use std::path::PathBuf;

/// Represents a complete workbook, loaded fully into memory
#[derive(Debug, Clone, Default)]
pub struct Workbook {
    pub path: PathBuf,
    /// Sheets in document order
    pub sheets: Vec<Sheet>,
}

impl Workbook {
    /// Get a sheet by name
    pub fn get_sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    /// Get all sheet names
    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }
}

/// Represents a worksheet as authored: rows keep their repetition markers
#[derive(Debug, Clone, Default)]
pub struct Sheet {
    pub name: String,
    pub rows: Vec<Row>,
}

impl Sheet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rows: Vec::new(),
        }
    }

    /// Iterate rows with row repetition expanded.
    ///
    /// Trailing filler rows in ODS files are often repeated a million times, so
    /// the expansion is lazy and yields references.
    pub fn logical_rows(&self) -> impl Iterator<Item = &Row> {
        self.rows
            .iter()
            .flat_map(|row| iter::repeat_n(row, row.repeated as usize))
    }

    /// Number of logical rows
    pub fn row_count(&self) -> u64 {
        self.rows
            .iter()
            .fold(0u64, |acc, row| acc.saturating_add(u64::from(row.repeated)))
    }
}

/// One authored row element
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub cells: Vec<RawCell>,
    /// How many logical rows this element stands for
    pub repeated: u32,
}

impl Row {
    pub fn new(cells: Vec<RawCell>) -> Self {
        Self { cells, repeated: 1 }
    }

    /// True when no cell carries text or a typed value
    pub fn is_blank(&self) -> bool {
        self.cells
            .iter()
            .all(|c| c.content.trim().is_empty() && c.value.is_none())
    }
}

impl Default for Row {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

/// A single cell as authored, before column repetition is expanded
#[derive(Debug, Clone, PartialEq)]
pub struct RawCell {
    /// Paragraph texts joined with a single space
    pub content: String,
    /// Typed numeric value (`office:value`) when the cell declares one
    pub value: Option<String>,
    /// How many logical columns this cell represents
    pub repeated: u32,
}

impl RawCell {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            value: None,
            repeated: 1,
        }
    }

    pub fn empty() -> Self {
        Self::text("")
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn repeated(mut self, repeated: u32) -> Self {
        self.repeated = repeated;
        self
    }

    /// The textual content extraction should see
    pub fn resolved(&self, prefer_typed: bool) -> &str {
        match (&self.value, prefer_typed) {
            (Some(value), true) => value,
            _ => &self.content,
        }
    }
}

impl Default for RawCell {
    fn default() -> Self {
        Self::empty()
    }
}
