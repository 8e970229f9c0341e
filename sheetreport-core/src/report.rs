//! Report assembly: the structures handed to the serving layer

use serde::{Deserialize, Serialize};

use crate::diagnostic::{Diagnostic, Severity};
use crate::extract::{ExpenseEntry, PersonCostRecord, TimeEntry};
use crate::reshape::PersonCostEntry;

/// Normalized cost and time tables, in extraction order
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Report {
    pub costs_report: Vec<PersonCostEntry>,
    pub time_report: Vec<TimeEntry>,
    /// Invoice lines; only present when an expense file was read
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub other_report: Vec<ExpenseEntry>,
}

impl Report {
    pub fn is_empty(&self) -> bool {
        self.costs_report.is_empty() && self.time_report.is_empty() && self.other_report.is_empty()
    }
}

/// Combine the long cost table and the time table. No aggregation happens here.
pub fn assemble(costs_report: Vec<PersonCostEntry>, time_report: Vec<TimeEntry>) -> Report {
    Report {
        costs_report,
        time_report,
        other_report: Vec::new(),
    }
}

/// Everything one extraction run produced
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    pub report: Report,
    /// Wide cost records, one per data row
    pub team: Vec<PersonCostRecord>,
    pub diagnostics: Vec<Diagnostic>,
}

impl Extraction {
    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity >= Severity::Warning)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_under_stable_keys() {
        let report = assemble(
            vec![PersonCostEntry {
                person_id: "A1".into(),
                first_name: "Ada".into(),
                last_name: "Lovelace".into(),
                position: "Engineer".into(),
                comment: String::new(),
                month: 29,
                cost: 50.0,
                currency: "PLN".into(),
            }],
            vec![TimeEntry {
                user_id: "A1".into(),
                task_name: "T1.1".into(),
                timespent_h: 2.0,
                month: 1,
            }],
        );

        let json = serde_json::to_value(&report).unwrap();
        let keys: Vec<_> = json.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys.len(), 2);
        assert!(keys.contains(&"costs_report".to_string()));
        assert!(keys.contains(&"time_report".to_string()));

        assert_eq!(json["costs_report"][0]["person_id"], "A1");
        assert_eq!(json["costs_report"][0]["month"], 29);
        assert_eq!(json["costs_report"][0]["cost"], 50.0);
        assert_eq!(json["time_report"][0]["user_id"], "A1");
        assert_eq!(json["time_report"][0]["task_name"], "T1.1");
        assert_eq!(json["time_report"][0]["timespent_h"], 2.0);
        assert_eq!(json["time_report"][0]["month"], 1);
    }

    #[test]
    fn test_empty_report() {
        let report = assemble(Vec::new(), Vec::new());
        assert!(report.is_empty());
        assert_eq!(
            serde_json::to_string(&report).unwrap(),
            r#"{"costs_report":[],"time_report":[]}"#
        );
    }

    #[test]
    fn test_other_report_serialized_when_present() {
        let mut report = assemble(Vec::new(), Vec::new());
        report.other_report.push(ExpenseEntry {
            document_number: "FV/1/2025".into(),
            date: "2025-01-14".into(),
            description: "Laptop".into(),
            cost: None,
            task_name: "T2.1".into(),
            cost_type: "equipment".into(),
            currency: "PLN".into(),
        });
        assert!(!report.is_empty());

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["other_report"][0]["document_number"], "FV/1/2025");
        assert!(json["other_report"][0]["cost"].is_null());

        let back: Report = serde_json::from_str(r#"{"costs_report":[],"time_report":[]}"#).unwrap();
        assert!(back.other_report.is_empty());
    }
}
