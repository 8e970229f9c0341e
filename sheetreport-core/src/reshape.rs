//! Wide-to-long pivot of the cost table

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::extract::PersonCostRecord;

/// Cost of one person in one month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonCostEntry {
    pub person_id: String,
    pub first_name: String,
    pub last_name: String,
    pub position: String,
    pub comment: String,
    pub month: u32,
    pub cost: f64,
    pub currency: String,
}

/// Parse a raw cost cell; blanks, text, zero and non-finite values mean "no cost"
pub fn parse_cost(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|cost| cost.is_finite() && *cost != 0.0)
}

/// Pivot month columns into one entry per (person, month) with a cost.
///
/// Entries come out month-major: every person for month 1, then month 2, and
/// so on. Identity fields are carried along unchanged.
pub fn pivot_costs(records: &[PersonCostRecord], currency: &str) -> Vec<PersonCostEntry> {
    let months = records.iter().map(|r| r.months.len()).max().unwrap_or(0);
    let mut entries = Vec::new();

    for month in 1..=months {
        for record in records {
            let Some(cost) = record.month(month).and_then(parse_cost) else {
                continue;
            };
            entries.push(PersonCostEntry {
                person_id: record.id.clone(),
                first_name: record.first_name.clone(),
                last_name: record.last_name.clone(),
                position: record.position.clone(),
                comment: record.comment.clone(),
                month: u32::try_from(month).unwrap_or(u32::MAX),
                cost,
                currency: currency.to_string(),
            });
        }
    }

    info!("Transformed cost report: {} rows", entries.len());
    entries
}
