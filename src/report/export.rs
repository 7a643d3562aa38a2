// src/report/export.rs
// =============================================================================
// Writes the combined results of every scanned target to a file (-o).
//
// Formats:
// - Text: a short header with totals, then every endpoint, then the
//   interesting ones
// - Json: { timestamp, total, interesting, results: [...] } where each result
//   carries its own "interesting" flag
//
// The file is written to a temporary sibling first and renamed into place,
// so an interrupted run never leaves a half-written report behind.
// =============================================================================

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use serde::Serialize;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::classify::is_interesting;
use crate::config::OutputFormat;
use crate::probe::ProbeOutcome;
use crate::scan::ScanReport;

#[derive(Debug, Serialize)]
struct ExportRecord<'a> {
    timestamp: String,
    total: usize,
    interesting: usize,
    results: Vec<ExportEntry<'a>>,
}

#[derive(Debug, Serialize)]
struct ExportEntry<'a> {
    #[serde(flatten)]
    outcome: &'a ProbeOutcome,
    interesting: bool,
}

pub fn export_results(reports: &[ScanReport], path: &Path, format: OutputFormat) -> Result<()> {
    let results: Vec<&ProbeOutcome> = reports.iter().flat_map(|r| r.outcomes.iter()).collect();
    let interesting: Vec<&ProbeOutcome> = reports.iter().flat_map(|r| r.interesting.iter()).collect();
    let now = Local::now();

    let contents = match format {
        OutputFormat::Json => render_json(&results, interesting.len(), now)?,
        OutputFormat::Text => render_text(&results, &interesting, now),
    };

    write_atomically(path, &contents)?;
    debug!(path = %path.display(), total = results.len(), "results exported");
    Ok(())
}

pub fn render_json(results: &[&ProbeOutcome], interesting: usize, now: DateTime<Local>) -> Result<String> {
    let record = ExportRecord {
        timestamp: now.to_rfc3339(),
        total: results.len(),
        interesting,
        results: results
            .iter()
            .map(|&outcome| ExportEntry {
                outcome,
                interesting: is_interesting(outcome),
            })
            .collect(),
    };

    Ok(serde_json::to_string_pretty(&record)?)
}

pub fn render_text(results: &[&ProbeOutcome], interesting: &[&ProbeOutcome], now: DateTime<Local>) -> String {
    let mut out = String::new();

    // Writing into a String can't fail
    let _ = writeln!(out, "ROBOTS-SCOUT Scan Results");
    let _ = writeln!(out, "{}", "=".repeat(50));
    let _ = writeln!(out, "Scan Time: {}", now.format("%Y-%m-%d %H:%M:%S"));
    let _ = writeln!(out, "Total Endpoints: {}", results.len());
    let _ = writeln!(out, "Interesting Endpoints: {}", interesting.len());
    let _ = writeln!(out);

    let _ = writeln!(out, "ALL ENDPOINTS:");
    let _ = writeln!(out, "{}", "-".repeat(30));
    for outcome in results {
        let _ = writeln!(out, "{}", text_line(outcome));
    }

    if !interesting.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out);
        let _ = writeln!(out, "INTERESTING ENDPOINTS:");
        let _ = writeln!(out, "{}", "-".repeat(30));
        for outcome in interesting {
            let _ = writeln!(out, "{}", text_line(outcome));
        }
    }

    out
}

fn text_line(outcome: &ProbeOutcome) -> String {
    let status = outcome
        .status
        .map(|s| s.to_string())
        .unwrap_or_else(|| "ERR".to_string());
    format!("{} | Status: {} | Size: {}", outcome.url, status, outcome.size)
}

fn write_atomically(path: &Path, contents: &str) -> Result<()> {
    let tmp = temp_path(path);
    std::fs::write(&tmp, contents).with_context(|| format!("Failed to write {}", tmp.display()))?;
    if let Err(e) = std::fs::rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(e).with_context(|| format!("Failed to move results into {}", path.display()));
    }
    Ok(())
}

// "results.json" -> "results.json.tmp" in the same directory
fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
