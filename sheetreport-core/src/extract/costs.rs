//! Wide per-person cost table extraction

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, warn};

use super::cells::extract_cells_padded;
use crate::config::CostSchema;
use crate::diagnostic::CellReference;
use crate::reader::Workbook;

/// One row of the cost table: identity fields plus raw month values
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PersonCostRecord {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub position: String,
    pub comment: String,
    /// Raw cell texts for months 1..N, index 0 is month 1
    pub months: Vec<String>,
}

impl PersonCostRecord {
    /// Raw value of a 1-based month
    pub fn month(&self, month: usize) -> Option<&str> {
        month
            .checked_sub(1)
            .and_then(|i| self.months.get(i))
            .map(String::as_str)
    }
}

/// Extracted cost rows with their source positions
#[derive(Debug, Clone, Default)]
pub struct CostTable {
    /// Sheet the rows were read from
    pub sheet: String,
    pub records: Vec<PersonCostRecord>,
    /// 0-based logical row of each record
    pub rows: Vec<usize>,
}

impl CostTable {
    /// Person ids in first-seen order, without repeats
    pub fn person_ids(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.records
            .iter()
            .map(|r| r.id.as_str())
            .filter(|id| seen.insert(*id))
            .collect()
    }

    /// Records whose id already appeared on an earlier row
    pub fn duplicate_ids(&self) -> Vec<(&str, CellReference)> {
        let mut first_row: HashMap<&str, usize> = HashMap::new();
        let mut duplicates = Vec::new();
        for (record, &row) in self.records.iter().zip(&self.rows) {
            if first_row.contains_key(record.id.as_str()) {
                duplicates.push((record.id.as_str(), CellReference::at(row, 0)));
            } else {
                first_row.insert(record.id.as_str(), row);
            }
        }
        duplicates
    }
}

/// Locate the cost table and extract one record per data row with an id.
///
/// Returns `None` when the workbook has no sheet named `schema.table`. An id
/// holding only whitespace counts as empty and drops its row. Rows sharing an
/// id are all kept.
pub fn extract_cost_table(
    workbook: &Workbook,
    schema: &CostSchema,
    prefer_typed: bool,
) -> Option<CostTable> {
    let Some(sheet) = workbook.get_sheet(&schema.table) else {
        warn!(table = %schema.table, "cost table not found in the document");
        return None;
    };

    let width = schema.width();
    let identity = schema.columns.len();
    let mut table = CostTable {
        sheet: sheet.name.clone(),
        ..Default::default()
    };

    for (index, row) in sheet.logical_rows().enumerate().skip(schema.header_rows) {
        if row.is_blank() {
            continue;
        }

        let values = extract_cells_padded(row, width, prefer_typed);
        let field = |name: &str| {
            schema
                .column_of(name)
                .and_then(|i| values.get(i))
                .cloned()
                .unwrap_or_default()
        };

        let id = field("id");
        if id.trim().is_empty() {
            continue;
        }

        table.records.push(PersonCostRecord {
            first_name: field("first_name"),
            last_name: field("last_name"),
            position: field("position"),
            comment: field("comment"),
            months: values[identity..].to_vec(),
            id,
        });
        table.rows.push(index);
    }

    debug!(table = %schema.table, rows = ?table.rows, "cost rows located");
    info!("Extracted {} rows of data", table.records.len());
    Some(table)
}
