//! Other-expenses (invoice) extraction from a CSV export

use anyhow::{Context, Result};
use csv::{ReaderBuilder, StringRecord, Trim};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{info, warn};

use crate::config::ExpenseSchema;

/// One invoice line charged to the project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseEntry {
    pub document_number: String,
    pub date: String,
    pub description: String,
    /// `None` when the amount is blank or not a plain number
    pub cost: Option<f64>,
    pub task_name: String,
    pub cost_type: String,
    pub currency: String,
}

/// An invoice line whose amount could not be read
#[derive(Debug, Clone, PartialEq)]
pub struct UnparsedCost {
    /// 1-based line in the CSV file
    pub line: u64,
    pub document_number: String,
    pub value: String,
}

/// Result of an expense extraction pass
#[derive(Debug, Clone, Default)]
pub struct ExpenseReport {
    pub entries: Vec<ExpenseEntry>,
    pub unparsed: Vec<UnparsedCost>,
}

/// Positions of the configured columns in the header record
struct Columns {
    document: usize,
    date: usize,
    description: usize,
    cost: usize,
    task: usize,
    cost_type: usize,
}

impl Columns {
    fn locate(headers: &StringRecord, schema: &ExpenseSchema) -> Result<Self> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h == name)
                .with_context(|| format!("Expense file has no '{}' column", name))
        };
        Ok(Self {
            document: find(&schema.document_column)?,
            date: find(&schema.date_column)?,
            description: find(&schema.description_column)?,
            cost: find(&schema.cost_column)?,
            task: find(&schema.task_column)?,
            cost_type: find(&schema.cost_type_column)?,
        })
    }
}

/// Read invoice lines from a CSV export with a header row.
///
/// Columns are found by header name, so their order in the file does not
/// matter. Lines without a date (totals, notes) are dropped. A non-blank amount
/// that is not a number keeps its line with no cost and is listed in
/// `unparsed`.
pub fn read_expenses<R: Read>(
    source: R,
    schema: &ExpenseSchema,
    currency: &str,
) -> Result<ExpenseReport> {
    let delimiter = schema
        .delimiter_byte()
        .with_context(|| format!("Invalid expense delimiter '{}'", schema.delimiter))?;
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(source);

    let headers = reader
        .headers()
        .context("Failed to read expense file header")?
        .clone();
    let columns = Columns::locate(&headers, schema)?;

    let mut report = ExpenseReport::default();
    for record in reader.records() {
        let record = record.context("Failed to read expense record")?;
        let field = |index: usize| record.get(index).unwrap_or_default().to_string();

        let date = field(columns.date);
        if date.is_empty() {
            continue;
        }

        let document_number = field(columns.document);
        let raw_cost = field(columns.cost);
        let cost = parse_amount(&raw_cost);
        if cost.is_none() && !raw_cost.is_empty() {
            let line = record.position().map(|p| p.line()).unwrap_or_default();
            warn!(line, document = %document_number, value = %raw_cost, "expense amount is not a number");
            report.unparsed.push(UnparsedCost {
                line,
                document_number: document_number.clone(),
                value: raw_cost,
            });
        }

        report.entries.push(ExpenseEntry {
            document_number,
            date,
            description: field(columns.description),
            cost,
            task_name: field(columns.task),
            cost_type: field(columns.cost_type),
            currency: currency.to_string(),
        });
    }

    info!("Extracted {} expense entries", report.entries.len());
    Ok(report)
}

/// Read invoice lines from a CSV file on disk
pub fn read_expenses_file<P: AsRef<Path>>(
    path: P,
    schema: &ExpenseSchema,
    currency: &str,
) -> Result<ExpenseReport> {
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open expense file: {}", path.display()))?;
    read_expenses(file, schema, currency)
        .with_context(|| format!("Failed to read expense file: {}", path.display()))
}

fn parse_amount(raw: &str) -> Option<f64> {
    raw.parse::<f64>().ok().filter(|amount| amount.is_finite())
}
