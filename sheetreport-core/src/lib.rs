//! sheetreport-core: cost and time report extraction for project workbooks
//!
//! Reads a spreadsheet holding a wide per-person cost table and one time
//! sheet per person, and reshapes them into two flat tables: monthly costs per
//! person and monthly hours per person and task. An invoice CSV export can be
//! read alongside as a third table of other expenses.

pub mod config;
pub mod diagnostic;
pub mod error;
pub mod extract;
pub mod reader;
pub mod report;
pub mod reshape;

use anyhow::Result;
use std::io::Read;
use std::path::Path;
use tracing::info;

pub use config::ReportConfig;
pub use diagnostic::{Diagnostic, DiagnosticScope, Severity};
pub use error::ExtractError;
pub use extract::{ExpenseEntry, PersonCostRecord, TimeEntry};
pub use reader::Workbook;
pub use report::{Extraction, Report};
pub use reshape::PersonCostEntry;

use diagnostic::{
    DUPLICATE_PERSON_ID, MISSING_COST_TABLE, MISSING_PERSON_SHEET, SHORT_TIME_SHEET,
    UNPARSED_EXPENSE_COST,
};
use extract::{
    CostTable, ExpenseReport, extract_cost_table, extract_time_entries, read_expenses,
    read_expenses_file, resolve_person_sheets,
};

/// Main extraction interface
///
/// Holds only configuration; every call works on its own workbook instance.
pub struct ReportBuilder {
    config: ReportConfig,
}

impl ReportBuilder {
    /// Create a builder with the default workbook layout
    pub fn new() -> Self {
        Self::with_config(ReportConfig::default())
    }

    /// Create a builder with custom configuration
    pub fn with_config(config: ReportConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ReportConfig {
        &self.config
    }

    /// Load a workbook from disk and extract the reports from it.
    ///
    /// When `expenses.file` is configured, the invoice CSV is read as well.
    pub fn build_file<P: AsRef<Path>>(&self, path: P) -> Result<Extraction> {
        let workbook = reader::read_workbook(path)?;
        let mut extraction = self.build(&workbook)?;

        if let Some(expenses) = &self.config.expenses.file {
            let report =
                read_expenses_file(expenses, &self.config.expenses, &self.config.currency)?;
            attach_expenses(&mut extraction, report);
        }
        Ok(extraction)
    }

    /// Read an invoice CSV from any source into an existing extraction
    pub fn add_expenses<R: Read>(&self, extraction: &mut Extraction, source: R) -> Result<()> {
        let report = read_expenses(source, &self.config.expenses, &self.config.currency)?;
        attach_expenses(extraction, report);
        Ok(())
    }

    /// Extract the reports from an already loaded workbook
    pub fn build(&self, workbook: &Workbook) -> Result<Extraction, ExtractError> {
        let config = &self.config;
        let prefer_typed = config.prefer_typed_values;
        let mut diagnostics = Vec::new();

        let cost_table = match extract_cost_table(workbook, &config.cost, prefer_typed) {
            Some(table) => table,
            None => {
                diagnostics.push(Diagnostic::new(
                    MISSING_COST_TABLE,
                    DiagnosticScope::Book,
                    format!("Table '{}' not found in the document", config.cost.table),
                    Severity::Warning,
                ));
                CostTable::default()
            }
        };

        for (id, cell) in cost_table.duplicate_ids() {
            diagnostics.push(Diagnostic::new(
                DUPLICATE_PERSON_ID,
                DiagnosticScope::Cell(cost_table.sheet.clone(), cell),
                format!("Person id '{}' appears on more than one row", id),
                Severity::Info,
            ));
        }

        let ids = cost_table.person_ids();
        let person_sheets = resolve_person_sheets(workbook, &ids);
        for id in &person_sheets.missing {
            diagnostics.push(Diagnostic::new(
                MISSING_PERSON_SHEET,
                DiagnosticScope::Book,
                format!("Person '{}' has no time sheet", id),
                Severity::Info,
            ));
        }

        let time = extract_time_entries(
            &person_sheets,
            &config.time,
            config.time.months,
            prefer_typed,
        )?;
        for skipped in &time.skipped {
            diagnostics.push(Diagnostic::new(
                SHORT_TIME_SHEET,
                DiagnosticScope::Sheet(skipped.name.clone()),
                format!(
                    "Sheet has {} rows, {} needed for a {}-month window; skipped",
                    skipped.rows, skipped.required, config.time.months
                ),
                Severity::Warning,
            ));
        }

        let costs = reshape::pivot_costs(&cost_table.records, &config.currency);
        let report = report::assemble(costs, time.entries);

        info!(
            costs = report.costs_report.len(),
            time = report.time_report.len(),
            diagnostics = diagnostics.len(),
            "report assembled"
        );

        diagnostics.sort();

        Ok(Extraction {
            report,
            team: cost_table.records,
            diagnostics,
        })
    }
}

fn attach_expenses(extraction: &mut Extraction, expenses: ExpenseReport) {
    for unparsed in expenses.unparsed {
        extraction.diagnostics.push(Diagnostic::new(
            UNPARSED_EXPENSE_COST,
            DiagnosticScope::Book,
            format!(
                "Expense line {} ({}): amount '{}' is not a number",
                unparsed.line, unparsed.document_number, unparsed.value
            ),
            Severity::Warning,
        ));
    }
    extraction.diagnostics.sort();
    extraction.report.other_report = expenses.entries;
}

impl Default for ReportBuilder {
    fn default() -> Self {
        Self::new()
    }
}
