//! Extraction of the cost, time and other-expense tables

pub mod cells;
pub mod costs;
pub mod expenses;
pub mod time;

pub use cells::{extract_cells, extract_cells_padded};
pub use costs::{CostTable, PersonCostRecord, extract_cost_table};
pub use expenses::{
    ExpenseEntry, ExpenseReport, UnparsedCost, read_expenses, read_expenses_file,
};
pub use time::{
    PersonSheets, SkippedSheet, TimeEntry, TimeReport, extract_time_entries, resolve_person_sheets,
};
