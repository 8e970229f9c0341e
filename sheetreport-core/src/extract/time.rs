//! Per-person time sheet extraction

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, info, warn};

use super::cells::extract_cells;
use crate::config::TimeSchema;
use crate::diagnostic::CellReference;
use crate::error::ExtractError;
use crate::reader::{Sheet, Workbook};

/// Hours one person spent on one task in one month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeEntry {
    pub user_id: String,
    pub task_name: String,
    pub timespent_h: f64,
    pub month: u32,
}

/// Person id -> time sheet mapping, resolved once per extraction
#[derive(Debug, Default)]
pub struct PersonSheets<'a> {
    /// Matched sheets in document order
    pub sheets: Vec<&'a Sheet>,
    /// Known person ids with no sheet of that name
    pub missing: Vec<String>,
}

/// Match known person ids against sheet names.
///
/// Sheets whose name is not a known id are ignored.
pub fn resolve_person_sheets<'a>(workbook: &'a Workbook, ids: &[&str]) -> PersonSheets<'a> {
    let known: HashSet<&str> = ids.iter().copied().collect();
    let mut matched = HashSet::new();
    let mut sheets = Vec::new();

    for sheet in &workbook.sheets {
        if known.contains(sheet.name.as_str()) && matched.insert(sheet.name.as_str()) {
            sheets.push(sheet);
        }
    }

    let mut missing = Vec::new();
    for id in ids {
        if !matched.contains(id) && !missing.iter().any(|m| m == id) {
            missing.push(id.to_string());
        }
    }

    PersonSheets { sheets, missing }
}

/// A person sheet that was too short to hold the month window
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedSheet {
    pub name: String,
    pub rows: u64,
    pub required: usize,
}

/// Result of a time extraction pass
#[derive(Debug, Clone, Default)]
pub struct TimeReport {
    pub entries: Vec<TimeEntry>,
    pub skipped: Vec<SkippedSheet>,
}

/// Extract time entries from every resolved person sheet.
///
/// Rows `row_offset ..= row_offset + months` are read; column A is the month
/// number and each following column belongs to the task at the same position
/// in `schema.tasks`. Task cells that are empty or hold only whitespace
/// produce no entry; any other value must parse as hours, and a month or hours
/// value that does not parse aborts the whole run.
pub fn extract_time_entries(
    person_sheets: &PersonSheets<'_>,
    schema: &TimeSchema,
    months: usize,
    prefer_typed: bool,
) -> Result<TimeReport, ExtractError> {
    let mut report = TimeReport::default();
    let required = schema.min_rows(months);
    let width = schema.width();

    for sheet in &person_sheets.sheets {
        let rows = sheet.row_count();
        if rows < required as u64 {
            warn!(
                "Table {} doesn't have enough rows to extract row {} ({} < {})",
                sheet.name,
                schema.row_offset + 1,
                rows,
                required
            );
            report.skipped.push(SkippedSheet {
                name: sheet.name.clone(),
                rows,
                required,
            });
            continue;
        }

        let before = report.entries.len();
        let window = sheet
            .logical_rows()
            .enumerate()
            .skip(schema.row_offset)
            .take(months.saturating_add(1));

        for (index, row) in window {
            let values = extract_cells(row, width, prefer_typed);
            let mut month = None;

            for (col, raw) in values.iter().enumerate().skip(1) {
                if raw.trim().is_empty() {
                    continue;
                }
                let month = match month {
                    Some(m) => m,
                    None => {
                        let m = parse_month(&sheet.name, index, &values[0])?;
                        month = Some(m);
                        m
                    }
                };
                let task = &schema.tasks[col - 1];
                let timespent_h = parse_hours(&sheet.name, index, col, task, raw)?;

                report.entries.push(TimeEntry {
                    user_id: sheet.name.clone(),
                    task_name: task.clone(),
                    timespent_h,
                    month,
                });
            }
        }

        debug!(
            sheet = %sheet.name,
            entries = report.entries.len() - before,
            "time sheet processed"
        );
    }

    info!(
        "Extracted {} time entries from {} sheets",
        report.entries.len(),
        person_sheets.sheets.len() - report.skipped.len()
    );
    Ok(report)
}

fn parse_month(sheet: &str, row: usize, raw: &str) -> Result<u32, ExtractError> {
    raw.trim()
        .parse::<u32>()
        .map_err(|_| ExtractError::InvalidMonth {
            sheet: sheet.to_string(),
            cell: CellReference::at(row, 0),
            value: raw.to_string(),
        })
}

fn parse_hours(
    sheet: &str,
    row: usize,
    col: usize,
    task: &str,
    raw: &str,
) -> Result<f64, ExtractError> {
    match raw.trim().parse::<f64>() {
        Ok(hours) if hours.is_finite() && hours >= 0.0 => Ok(hours),
        _ => Err(ExtractError::InvalidHours {
            sheet: sheet.to_string(),
            cell: CellReference::at(row, col),
            task: task.to_string(),
            value: raw.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::{RawCell, Row};

    fn time_sheet(name: &str, block: Vec<Row>, trailing: u32) -> Sheet {
        let mut preamble = Row::new(vec![RawCell::text("header")]);
        preamble.repeated = 7;
        let mut rows = vec![preamble];
        rows.extend(block);
        if trailing > 0 {
            let mut filler = Row::default();
            filler.repeated = trailing;
            rows.push(filler);
        }
        Sheet {
            name: name.to_string(),
            rows,
        }
    }

    fn month_row(cells: &[&str]) -> Row {
        Row::new(cells.iter().map(|c| RawCell::text(*c)).collect())
    }

    fn extract_time_report(
        workbook: &Workbook,
        ids: &[&str],
        schema: &TimeSchema,
        months: usize,
        prefer_typed: bool,
    ) -> Result<TimeReport, ExtractError> {
        let person_sheets = resolve_person_sheets(workbook, ids);
        extract_time_entries(&person_sheets, schema, months, prefer_typed)
    }

    fn workbook(sheets: Vec<Sheet>) -> Workbook {
        Workbook {
            sheets,
            ..Default::default()
        }
    }

    #[test]
    fn test_resolve_person_sheets() {
        let workbook = workbook(vec![
            Sheet::new("Team_total_cost"),
            Sheet::new("B2"),
            Sheet::new("Notes"),
            Sheet::new("A1"),
        ]);
        let resolved = resolve_person_sheets(&workbook, &["A1", "B2", "C3", "A1"]);
        let names: Vec<_> = resolved.sheets.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["B2", "A1"]);
        assert_eq!(resolved.missing, vec!["C3"]);
    }

    #[test]
    fn test_entries_for_non_empty_task_cells() {
        let workbook = workbook(vec![time_sheet(
            "A1",
            vec![
                month_row(&["1", "", "2"]),
                month_row(&["2", "5", "", "", "1.5"]),
            ],
            0,
        )]);

        let report =
            extract_time_report(&workbook, &["A1"], &TimeSchema::default(), 1, false).unwrap();
        assert!(report.skipped.is_empty());
        assert_eq!(
            report.entries,
            vec![
                TimeEntry {
                    user_id: "A1".into(),
                    task_name: "T1.2".into(),
                    timespent_h: 2.0,
                    month: 1,
                },
                TimeEntry {
                    user_id: "A1".into(),
                    task_name: "T1.1".into(),
                    timespent_h: 5.0,
                    month: 2,
                },
                TimeEntry {
                    user_id: "A1".into(),
                    task_name: "T2.2".into(),
                    timespent_h: 1.5,
                    month: 2,
                },
            ]
        );
    }

    #[test]
    fn test_short_sheet_skipped_others_processed() {
        let short = time_sheet("A1", vec![month_row(&["1", "8"])], 0);
        let full = time_sheet("B2", vec![month_row(&["1", "8"])], 30);
        let workbook = workbook(vec![short, full]);

        let report =
            extract_time_report(&workbook, &["A1", "B2"], &TimeSchema::default(), 29, false)
                .unwrap();
        assert_eq!(
            report.skipped,
            vec![SkippedSheet {
                name: "A1".into(),
                rows: 8,
                required: 37,
            }]
        );
        assert_eq!(report.entries.len(), 1);
        assert_eq!(report.entries[0].user_id, "B2");
    }

    #[test]
    fn test_huge_window_skips_instead_of_overflowing() {
        let sheet = time_sheet("A1", vec![month_row(&["1", "8"])], 1_000);
        let workbook = workbook(vec![sheet]);

        let report =
            extract_time_report(&workbook, &["A1"], &TimeSchema::default(), usize::MAX, false)
                .unwrap();
        assert!(report.entries.is_empty());
        assert_eq!(report.skipped[0].required, usize::MAX);
    }

    #[test]
    fn test_rows_outside_window_ignored() {
        let sheet = time_sheet(
            "A1",
            vec![
                month_row(&["1", "1"]),
                month_row(&["2", "2"]),
                month_row(&["3", "3"]),
            ],
            0,
        );
        let workbook = workbook(vec![sheet]);

        let report =
            extract_time_report(&workbook, &["A1"], &TimeSchema::default(), 1, false).unwrap();
        let months: Vec<_> = report.entries.iter().map(|e| e.month).collect();
        assert_eq!(months, vec![1, 2]);
    }

    #[test]
    fn test_blank_month_row_without_tasks_is_fine() {
        let sheet = time_sheet("A1", vec![month_row(&["Total"]), month_row(&[""])], 0);
        let workbook = workbook(vec![sheet]);

        let report =
            extract_time_report(&workbook, &["A1"], &TimeSchema::default(), 1, false).unwrap();
        assert!(report.entries.is_empty());
    }

    #[test]
    fn test_unparsable_month_is_fatal() {
        let sheet = time_sheet(
            "A1",
            vec![month_row(&["1", "4"]), month_row(&["Total", "4"])],
            0,
        );
        let workbook = workbook(vec![sheet]);

        let err = extract_time_report(&workbook, &["A1"], &TimeSchema::default(), 1, false)
            .unwrap_err();
        assert_eq!(
            err,
            ExtractError::InvalidMonth {
                sheet: "A1".into(),
                cell: CellReference::new(8, 0),
                value: "Total".into(),
            }
        );
    }

    #[test]
    fn test_unparsable_hours_are_fatal() {
        for bad in ["four", "-1", "NaN"] {
            let sheet = time_sheet("A1", vec![month_row(&["1", "", "", bad])], 1);
            let workbook = workbook(vec![sheet]);

            let err = extract_time_report(&workbook, &["A1"], &TimeSchema::default(), 1, false)
                .unwrap_err();
            match err {
                ExtractError::InvalidHours { cell, task, .. } => {
                    assert_eq!(cell.to_string(), "D8");
                    assert_eq!(task, "T2.1");
                }
                other => panic!("unexpected error: {other:?}"),
            }
        }
    }

    #[test]
    fn test_whitespace_cells_are_empty() {
        let sheet = time_sheet("A1", vec![month_row(&[" 3 ", "  ", " 7.25 "])], 1);
        let workbook = workbook(vec![sheet]);

        let report =
            extract_time_report(&workbook, &["A1"], &TimeSchema::default(), 1, false).unwrap();
        assert_eq!(report.entries.len(), 1);
        assert_eq!(report.entries[0].month, 3);
        assert_eq!(report.entries[0].task_name, "T1.2");
        assert_eq!(report.entries[0].timespent_h, 7.25);
    }

    #[test]
    fn test_columns_past_last_task_ignored() {
        let mut row = month_row(&["1"]);
        row.cells.push(RawCell::text("").repeated(18));
        row.cells.push(RawCell::text("99"));
        let workbook = workbook(vec![time_sheet("A1", vec![row], 1)]);

        let report =
            extract_time_report(&workbook, &["A1"], &TimeSchema::default(), 1, false).unwrap();
        assert!(report.entries.is_empty());
    }
}
