//! Non-fatal extraction findings with hierarchical scope

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::reader::parser_utils::col_to_letter;

pub const MISSING_COST_TABLE: &str = "COST001";
pub const DUPLICATE_PERSON_ID: &str = "COST002";
pub const SHORT_TIME_SHEET: &str = "TIME001";
pub const MISSING_PERSON_SHEET: &str = "TIME002";
pub const UNPARSED_EXPENSE_COST: &str = "EXP001";

/// How much a finding matters to the reader of the report
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// Where a diagnostic applies.
///
/// Variant order is the report order: book findings first, then per-sheet,
/// then per-cell, each level sorted by sheet name and cell position.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DiagnosticScope {
    Book,
    Sheet(String),
    Cell(String, CellReference),
}

/// Zero-based cell position shown as a spreadsheet reference ("A8")
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellReference {
    pub row: u32,
    pub col: u32,
}

impl CellReference {
    pub fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    /// Build from 0-based usize indices, clamping to the u32 range
    pub fn at(row: usize, col: usize) -> Self {
        Self::new(
            u32::try_from(row).unwrap_or(u32::MAX),
            u32::try_from(col).unwrap_or(u32::MAX),
        )
    }

    pub fn to_excel_ref(&self) -> String {
        format!("{}{}", col_to_letter(self.col), u64::from(self.row) + 1)
    }
}

impl fmt::Display for CellReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_excel_ref())
    }
}

/// A finding that did not stop the extraction.
///
/// Sorted by scope, then code, then message; the field order drives the
/// derived ordering, which therefore always agrees with equality.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Diagnostic {
    pub scope: DiagnosticScope,
    /// Stable finding code, e.g. "TIME001"
    pub code: String,
    pub message: String,
    pub severity: Severity,
}

impl Diagnostic {
    pub fn new(
        code: impl Into<String>,
        scope: DiagnosticScope,
        message: impl Into<String>,
        severity: Severity,
    ) -> Self {
        Self {
            scope,
            code: code.into(),
            message: message.into(),
            severity,
        }
    }
}
