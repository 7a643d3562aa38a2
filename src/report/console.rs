// src/report/console.rs
// =============================================================================
// Terminal output.
//
// Everything the user is meant to read goes to stdout through a Console.
// Colors:
//   200          green
//   3xx          yellow
//   4xx / 5xx    red
//   no response  gray, shown as "ERR"
//
// --no-color turns them all off. Padding is applied before coloring so the
// columns line up either way.
// =============================================================================

use colored::{Color, Colorize};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;

use crate::probe::ProbeOutcome;
use crate::scan::{ScanReport, TargetError};

const RULE_WIDTH: usize = 60;
const URL_WIDTH: usize = 60;
const PROGRESS_ENDPOINT_WIDTH: usize = 50;

fn status_color(status: Option<u16>) -> Color {
    match status {
        Some(200) => Color::Green,
        Some(300..=399) => Color::Yellow,
        Some(400..) => Color::Red,
        _ => Color::BrightBlack,
    }
}

fn status_text(status: Option<u16>) -> String {
    status.map(|s| s.to_string()).unwrap_or_else(|| "ERR".to_string())
}

// The live progress bar for one target
//
// Hidden when `visible` is false so tests and piped runs stay quiet.
pub fn progress_bar(total: usize, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }

    let bar = ProgressBar::new(total as u64);
    let style = ProgressStyle::with_template("[{pos}/{len}] {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    bar.set_style(style);
    bar
}

// "Checking: /admin/                ... 403"
pub fn progress_line(outcome: &ProbeOutcome) -> String {
    let endpoint: String = outcome.endpoint.chars().take(PROGRESS_ENDPOINT_WIDTH).collect();
    format!(
        "Checking: {:<width$} {}",
        endpoint,
        status_text(outcome.status).color(status_color(outcome.status)),
        width = PROGRESS_ENDPOINT_WIDTH
    )
}

#[derive(Debug, Clone, Copy)]
pub struct Console {
    color: bool,
}

impl Console {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    fn paint(&self, text: &str, color: Color) -> String {
        if self.color {
            text.color(color).to_string()
        } else {
            text.to_string()
        }
    }

    fn bold(&self, text: &str) -> String {
        if self.color {
            text.bold().to_string()
        } else {
            text.to_string()
        }
    }

    fn rule(&self) -> String {
        self.paint(&"=".repeat(RULE_WIDTH), Color::BrightBlack)
    }

    pub fn banner(&self) {
        let lines = [
            "╔══════════════════════════════════════════╗",
            "║              ROBOTS-SCOUT                ║",
            "║     Robots.txt Endpoint Checker Tool     ║",
            "╚══════════════════════════════════════════╝",
        ];
        println!();
        for line in lines {
            println!("{}", self.paint(line, Color::Cyan));
        }
        println!();
    }

    pub fn info(&self, message: &str) {
        println!("{} {}", self.paint("[*]", Color::BrightBlack), message);
    }

    pub fn success(&self, message: &str) {
        println!("{} {}", self.paint("[+]", Color::Green), message);
    }

    pub fn error(&self, message: &str) {
        println!("{} {}", self.paint("[!]", Color::Red), message);
    }

    pub fn scanning(&self, target: &str) {
        println!();
        println!("{} Scanning: {}", self.bold("[>]"), self.paint(target, Color::Cyan));
    }

    pub fn robots_found(&self, url: &str) {
        self.success(&format!("Found robots.txt at: {}", url));
    }

    pub fn endpoints_found(&self, count: usize) {
        self.success(&format!("Found {} endpoints to check", count));
        println!();
    }

    pub fn target_skipped(&self, error: &TargetError) {
        match error {
            TargetError::NoEndpoints => {
                println!("{} {}", self.paint("[-]", Color::Yellow), error);
            }
            _ => self.error(&error.to_string()),
        }
    }

    pub fn interrupted(&self) {
        println!();
        println!("{} Scan interrupted by user", self.paint("[!]", Color::Yellow));
    }

    pub fn completed(&self, target: &str) {
        println!();
        self.info(&format!("Scan completed for {}", target));
    }

    pub fn exported(&self, path: &Path) {
        println!();
        self.success(&format!("Results exported to {}", path.display()));
    }

    pub fn export_failed(&self, error: &anyhow::Error) {
        println!();
        self.error(&format!("Failed to export results: {:#}", error));
    }

    // One table row: url | status | size
    pub fn format_row(&self, outcome: &ProbeOutcome) -> String {
        let status = format!("{:>4}", status_text(outcome.status));
        let size = format!("{:>6}", outcome.size);
        format!(
            "{:<width$} | {} | {} bytes",
            outcome.url,
            self.paint(&status, status_color(outcome.status)),
            self.paint(&size, Color::White),
            width = URL_WIDTH
        )
    }

    // Compact row for the interesting section
    pub fn format_finding(&self, outcome: &ProbeOutcome) -> String {
        format!(
            "{} | {} | {} bytes",
            self.paint(&outcome.url, Color::Yellow),
            self.paint(&status_text(outcome.status), status_color(outcome.status)),
            outcome.size
        )
    }

    // Prints the results of one target
    //
    // interesting_only: list only the interesting endpoints. Otherwise list
    // everything, followed by the interesting ones if there are any.
    pub fn print_report(&self, report: &ScanReport, interesting_only: bool) {
        println!();

        let (title, rows) = if interesting_only {
            ("Interesting Endpoints", &report.interesting)
        } else {
            ("All Endpoints", &report.outcomes)
        };

        println!("{}", self.bold(&format!("[*] {} ({}):", title, rows.len())));
        println!("{}", self.rule());
        for outcome in rows {
            println!("{}", self.format_row(outcome));
        }

        if !interesting_only && !report.interesting.is_empty() {
            println!();
            println!(
                "{}",
                self.bold(&format!("[!] Interesting Findings ({}):", report.interesting.len()))
            );
            println!("{}", self.rule());
            for outcome in &report.interesting {
                println!("{}", self.format_finding(outcome));
            }
        }
    }
}
