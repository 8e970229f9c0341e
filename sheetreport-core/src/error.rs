//! Fatal extraction errors

use thiserror::Error;

use crate::diagnostic::CellReference;

/// Errors that abort a whole extraction run
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ExtractError {
    #[error("sheet '{sheet}' cell {cell}: month '{value}' is not an integer")]
    InvalidMonth {
        sheet: String,
        cell: CellReference,
        value: String,
    },

    #[error("sheet '{sheet}' cell {cell}: hours '{value}' for task {task} are not a non-negative number")]
    InvalidHours {
        sheet: String,
        cell: CellReference,
        task: String,
        value: String,
    },
}
