//! Configuration system for the workbook schema
//!
//! The column layout of the cost table and of the per-person time sheets is
//! declared here instead of being hard-coded in the extractors.

use anyhow::Result;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Largest row/column count a spreadsheet document can hold
pub const MAX_SHEET_ROWS: usize = 1_048_576;

/// Identity fields every cost row must declare a column for
pub const IDENTITY_FIELDS: [&str; 5] = ["id", "first_name", "last_name", "position", "comment"];

/// Main report configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Currency attached to every cost entry
    pub currency: String,
    /// Use the typed cell value (`office:value`) instead of the displayed text
    pub prefer_typed_values: bool,
    pub cost: CostSchema,
    pub time: TimeSchema,
    pub expenses: ExpenseSchema,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            currency: "PLN".to_string(),
            prefer_typed_values: false,
            cost: CostSchema::default(),
            time: TimeSchema::default(),
            expenses: ExpenseSchema::default(),
        }
    }
}

impl ReportConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: ReportConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Validate the declared schema
    pub fn validate(&self) -> Result<()> {
        if self.cost.table.trim().is_empty() {
            anyhow::bail!("Configuration error: cost.table must not be empty");
        }
        for field in IDENTITY_FIELDS {
            let count = self.cost.columns.iter().filter(|c| *c == field).count();
            if count != 1 {
                anyhow::bail!(
                    "Configuration error: cost.columns must contain '{}' exactly once (found {})",
                    field,
                    count
                );
            }
        }
        check_range("cost.months", self.cost.months, 1)?;
        check_range("cost.header_rows", self.cost.header_rows, 0)?;
        check_range("time.months", self.time.months, 1)?;
        check_range("time.row_offset", self.time.row_offset, 0)?;
        if self.time.row_offset + self.time.months >= MAX_SHEET_ROWS {
            anyhow::bail!(
                "Configuration error: time.row_offset + time.months must stay below {} rows",
                MAX_SHEET_ROWS
            );
        }
        if self.time.tasks.is_empty() {
            anyhow::bail!("Configuration error: time.tasks must not be empty");
        }

        let mut seen = HashSet::new();
        for task in &self.time.tasks {
            if task_work_package(task).is_none() {
                anyhow::bail!(
                    "Configuration error: task code '{}' is not of the form T<package>.<task>",
                    task
                );
            }
            if !seen.insert(task.as_str()) {
                anyhow::bail!("Configuration error: task code '{}' is listed twice", task);
            }
        }

        self.expenses.validate()
    }
}

fn check_range(name: &str, value: usize, min: usize) -> Result<()> {
    if value < min || value > MAX_SHEET_ROWS {
        anyhow::bail!(
            "Configuration error: {} must be between {} and {} (got {})",
            name,
            min,
            MAX_SHEET_ROWS,
            value
        );
    }
    Ok(())
}

/// Layout of the wide per-person cost table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostSchema {
    /// Sheet name holding the cost table
    pub table: String,
    /// Leading header/title rows to skip
    pub header_rows: usize,
    /// Identity field names in column order, starting at column A
    pub columns: Vec<String>,
    /// Month columns following the identity columns
    pub months: usize,
}

impl Default for CostSchema {
    fn default() -> Self {
        Self {
            table: "Team_total_cost".to_string(),
            header_rows: 2,
            columns: IDENTITY_FIELDS.iter().map(|f| f.to_string()).collect(),
            months: 29,
        }
    }
}

impl CostSchema {
    /// Number of logical columns kept per row (34 with the defaults: A..AH)
    pub fn width(&self) -> usize {
        self.columns.len() + self.months
    }

    /// Column index of an identity field
    pub fn column_of(&self, field: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == field)
    }
}

/// Layout of the per-person time sheets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeSchema {
    /// 0-based index of the first month row (7 = row 8)
    pub row_offset: usize,
    /// Month window size
    pub months: usize,
    /// Task codes in column order, starting at column B
    pub tasks: Vec<String>,
}

impl Default for TimeSchema {
    fn default() -> Self {
        Self {
            row_offset: 7,
            months: 29,
            tasks: DEFAULT_TASKS.iter().map(|t| t.to_string()).collect(),
        }
    }
}

impl TimeSchema {
    /// Number of logical columns kept per row (19 with the defaults: A..S)
    pub fn width(&self) -> usize {
        1 + self.tasks.len()
    }

    /// Smallest row count a sheet needs to be processed with `months`
    pub fn min_rows(&self, months: usize) -> usize {
        self.row_offset.saturating_add(months).saturating_add(1)
    }
}

/// Layout of the other-expenses (invoice) CSV export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpenseSchema {
    /// CSV file to read; none means no expenses report
    pub file: Option<PathBuf>,
    /// Single-byte field delimiter
    pub delimiter: String,
    /// Header names of the source columns
    pub document_column: String,
    pub date_column: String,
    pub description_column: String,
    pub cost_column: String,
    pub task_column: String,
    pub cost_type_column: String,
}

impl Default for ExpenseSchema {
    fn default() -> Self {
        Self {
            file: None,
            delimiter: ",".to_string(),
            document_column: "Dokument".to_string(),
            date_column: "Data dok.".to_string(),
            description_column: "Treść".to_string(),
            cost_column: "Suma".to_string(),
            task_column: "Task".to_string(),
            cost_type_column: "Cost type".to_string(),
        }
    }
}

impl ExpenseSchema {
    /// The delimiter as the byte the CSV reader expects
    pub fn delimiter_byte(&self) -> Option<u8> {
        match self.delimiter.as_bytes() {
            [byte] if byte.is_ascii() => Some(*byte),
            _ => None,
        }
    }

    fn validate(&self) -> Result<()> {
        if self.delimiter_byte().is_none() {
            anyhow::bail!(
                "Configuration error: expenses.delimiter must be a single ASCII character (got '{}')",
                self.delimiter
            );
        }
        let columns = [
            &self.document_column,
            &self.date_column,
            &self.description_column,
            &self.cost_column,
            &self.task_column,
            &self.cost_type_column,
        ];
        if columns.iter().any(|c| c.trim().is_empty()) {
            anyhow::bail!("Configuration error: expenses column names must not be empty");
        }
        Ok(())
    }
}

pub const DEFAULT_TASKS: [&str; 18] = [
    "T1.1", "T1.2", "T2.1", "T2.2", "T2.3", "T3.1", "T3.2", "T3.3", "T4.1", "T4.2", "T5.1", "T5.2",
    "T5.3", "T6.1", "T6.2", "T6.3", "T6.4", "T6.5",
];

fn task_code_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^T(\d+)\.(\d+)$").expect("valid task code regex"))
}

/// Work package number of a task code ("T3.2" -> 3)
pub fn task_work_package(task: &str) -> Option<u32> {
    task_code_pattern()
        .captures(task)
        .and_then(|caps| caps[1].parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_workbook_layout() {
        let config = ReportConfig::default();
        assert_eq!(config.cost.table, "Team_total_cost");
        assert_eq!(config.cost.header_rows, 2);
        assert_eq!(config.cost.width(), 34);
        assert_eq!(config.time.width(), 19);
        assert_eq!(config.time.row_offset, 7);
        assert_eq!(config.time.min_rows(29), 37);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: ReportConfig = toml::from_str(
            r#"
            currency = "EUR"
            [time]
            months = 12
            "#,
        )
        .unwrap();
        assert_eq!(config.currency, "EUR");
        assert_eq!(config.time.months, 12);
        assert_eq!(config.time.tasks.len(), 18);
        assert_eq!(config.cost, CostSchema::default());
    }

    #[test]
    fn test_empty_toml_is_default() {
        let config: ReportConfig = toml::from_str("").unwrap();
        assert_eq!(config, ReportConfig::default());
    }

    #[test]
    fn test_task_work_package() {
        assert_eq!(task_work_package("T1.1"), Some(1));
        assert_eq!(task_work_package("T6.5"), Some(6));
        assert_eq!(task_work_package("T12.3"), Some(12));
        assert_eq!(task_work_package("month"), None);
        assert_eq!(task_work_package("T1"), None);
    }

    #[test]
    fn test_validation() {
        let config = ReportConfig::default();

        let mut bad = config.clone();
        bad.cost.columns.retain(|c| c != "comment");
        assert!(bad.validate().is_err());

        let mut bad = config.clone();
        bad.cost.columns.push("id".to_string());
        assert!(bad.validate().is_err());

        let mut bad = config.clone();
        bad.time.tasks.push("T1.1".to_string());
        assert!(bad.validate().is_err());

        let mut bad = config.clone();
        bad.time.tasks[0] = "Task one".to_string();
        assert!(bad.validate().is_err());

        let mut bad = config.clone();
        bad.time.months = 0;
        assert!(bad.validate().is_err());

        let mut bad = config.clone();
        bad.cost.table = " ".to_string();
        assert!(bad.validate().is_err());

        let mut bad = config.clone();
        bad.expenses.delimiter = ";;".to_string();
        assert!(bad.validate().is_err());

        let mut bad = config;
        bad.expenses.cost_column = String::new();
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_oversized_windows_rejected() {
        let config = ReportConfig::default();

        let mut bad = config.clone();
        bad.time.months = usize::MAX;
        assert!(bad.validate().is_err());

        let mut bad = config.clone();
        bad.time.row_offset = usize::MAX;
        assert!(bad.validate().is_err());

        let mut bad = config.clone();
        bad.cost.months = MAX_SHEET_ROWS + 1;
        assert!(bad.validate().is_err());

        let mut bad = config.clone();
        bad.time.months = MAX_SHEET_ROWS - 7;
        assert!(bad.validate().is_err());

        let mut ok = config;
        ok.time.months = MAX_SHEET_ROWS - 8;
        assert!(ok.validate().is_ok());

        assert_eq!(TimeSchema::default().min_rows(usize::MAX), usize::MAX);
    }

    #[test]
    fn test_expense_schema_from_toml() {
        let config: ReportConfig = toml::from_str(
            r#"
            [expenses]
            file = "invoices.csv"
            delimiter = ";"
            "#,
        )
        .unwrap();
        assert_eq!(config.expenses.file, Some(PathBuf::from("invoices.csv")));
        assert_eq!(config.expenses.delimiter_byte(), Some(b';'));
        assert_eq!(config.expenses.date_column, "Data dok.");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sheetreport.toml");
        fs::write(&path, "[cost]\ntable = \"Costs\"\nheader_rows = 1\n").unwrap();

        let config = ReportConfig::from_file(&path).unwrap();
        assert_eq!(config.cost.table, "Costs");
        assert_eq!(config.cost.header_rows, 1);
        assert_eq!(config.cost.months, 29);
    }
}
