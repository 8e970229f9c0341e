//! Output formatters for extraction results

use anyhow::Result;
use colored::*;
use sheetreport_core::config::task_work_package;
use sheetreport_core::{Diagnostic, DiagnosticScope, Extraction, Report, Severity};
use std::collections::{BTreeMap, HashSet};
use std::fmt::Write;
use std::path::Path;

/// Render a per-person summary followed by the diagnostics, grouped by scope
pub fn render_human(file_path: &Path, extraction: &Extraction) -> String {
    let mut out = String::new();
    let report = &extraction.report;

    let _ = writeln!(out, "{}", format!("Report: {}", file_path.display()).bold());
    let _ = writeln!(out);

    let mut seen = HashSet::new();
    let people: Vec<_> = extraction
        .team
        .iter()
        .filter(|r| seen.insert(r.id.as_str()))
        .collect();

    if people.is_empty() {
        let _ = writeln!(out, "{}", "No team members found".yellow().bold());
    }

    for person in people {
        let _ = writeln!(
            out,
            "{} {} {} {}",
            "Person:".bold(),
            person.id.cyan().bold(),
            person.first_name,
            person.last_name
        );
        if !person.position.is_empty() {
            let _ = writeln!(out, "  {} {}", "Position:".bold(), person.position);
        }

        let costs: Vec<_> = report
            .costs_report
            .iter()
            .filter(|c| c.person_id == person.id)
            .collect();
        if let Some(first) = costs.first() {
            let total: f64 = costs.iter().map(|c| c.cost).sum();
            let _ = writeln!(
                out,
                "  {} {:.2} {} over {} months",
                "Cost:".bold(),
                total,
                first.currency,
                costs.len()
            );
        }

        // Hours per work package; tasks outside the T<wp>.<n> form go under 0
        let mut packages: BTreeMap<u32, f64> = BTreeMap::new();
        for entry in report.time_report.iter().filter(|t| t.user_id == person.id) {
            let package = task_work_package(&entry.task_name).unwrap_or(0);
            *packages.entry(package).or_default() += entry.timespent_h;
        }
        if packages.is_empty() {
            let _ = writeln!(out, "  {} {}", "Hours:".bold(), "none".bright_black());
        } else {
            let hours: Vec<_> = packages
                .iter()
                .map(|(wp, h)| format!("WP{} {:.1}h", wp, h))
                .collect();
            let _ = writeln!(out, "  {} {}", "Hours:".bold(), hours.join(", "));
        }
    }
    let _ = writeln!(out);

    render_diagnostics(&mut out, &extraction.diagnostics);

    let _ = writeln!(out, "{}", "Summary:".bold().underline());
    let _ = writeln!(
        out,
        "  {} {}",
        "Cost entries:".bold(),
        report.costs_report.len()
    );
    let _ = writeln!(
        out,
        "  {} {}",
        "Time entries:".bold(),
        report.time_report.len()
    );
    if !report.other_report.is_empty() {
        let mut totals: BTreeMap<&str, f64> = BTreeMap::new();
        for entry in &report.other_report {
            *totals.entry(entry.currency.as_str()).or_default() += entry.cost.unwrap_or(0.0);
        }
        let totals: Vec<_> = totals
            .iter()
            .map(|(currency, total)| format!("{:.2} {}", total, currency))
            .collect();
        let _ = writeln!(
            out,
            "  {} {} (total {})",
            "Other expenses:".bold(),
            report.other_report.len(),
            totals.join(", ")
        );
    }
    let warning_count = extraction.warnings().count();
    if warning_count > 0 {
        let _ = writeln!(out, "  {} {}", "Warnings:".yellow().bold(), warning_count);
    }

    out
}

fn render_diagnostics(out: &mut String, diagnostics: &[Diagnostic]) {
    if diagnostics.is_empty() {
        return;
    }

    let mut book = Vec::new();
    let mut sheets: BTreeMap<&str, Vec<&Diagnostic>> = BTreeMap::new();
    let mut cells: BTreeMap<&str, BTreeMap<String, Vec<&Diagnostic>>> = BTreeMap::new();

    for diagnostic in diagnostics {
        match &diagnostic.scope {
            DiagnosticScope::Book => book.push(diagnostic),
            DiagnosticScope::Sheet(sheet) => {
                sheets.entry(sheet.as_str()).or_default().push(diagnostic);
            }
            DiagnosticScope::Cell(sheet, cell_ref) => {
                cells
                    .entry(sheet.as_str())
                    .or_default()
                    .entry(cell_ref.to_string())
                    .or_default()
                    .push(diagnostic);
            }
        }
    }

    if !book.is_empty() {
        let _ = writeln!(out, "{}", "Book-level diagnostics:".bold().underline());
        for diagnostic in book {
            render_diagnostic(out, diagnostic, 1);
        }
        let _ = writeln!(out);
    }

    for (sheet_name, diagnostics) in &sheets {
        let _ = writeln!(out, "{} {}", "Sheet:".bold(), sheet_name.cyan().bold());
        for diagnostic in diagnostics {
            render_diagnostic(out, diagnostic, 1);
        }
        let _ = writeln!(out);
    }

    for (sheet_name, cells) in &cells {
        let _ = writeln!(out, "{} {}", "Sheet:".bold(), sheet_name.cyan().bold());
        for (cell_ref, diagnostics) in cells {
            let _ = writeln!(out, "  {} {}", "Cell:".bold(), cell_ref.yellow());
            for diagnostic in diagnostics {
                render_diagnostic(out, diagnostic, 2);
            }
        }
        let _ = writeln!(out);
    }
}

fn render_diagnostic(out: &mut String, diagnostic: &Diagnostic, indent: usize) {
    let indent_str = "  ".repeat(indent);
    let severity_str = match diagnostic.severity {
        Severity::Error => "ERROR".red().bold(),
        Severity::Warning => "WARN".yellow().bold(),
        Severity::Info => "INFO".blue().bold(),
    };

    let _ = writeln!(
        out,
        "{}{} [{}] {}",
        indent_str,
        severity_str,
        diagnostic.code.bright_black(),
        diagnostic.message
    );
}

/// Render the report as pretty JSON with `costs_report` and `time_report` keys,
/// plus `other_report` when invoice lines were read
pub fn render_json(report: &Report) -> Result<String> {
    let mut json = serde_json::to_string_pretty(report)?;
    json.push('\n');
    Ok(json)
}
