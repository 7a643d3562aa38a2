// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// There are no subcommands: you either pass one target as a positional
// argument, or a file of targets with -f. Everything else is a flag that
// tweaks how the scan runs or where the results go.
//
// The parsed Cli struct is turned into a ScanConfig (see config.rs) before
// anything else uses it, so the rest of the program never touches clap.
// =============================================================================

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "robots-scout",
    version = "0.1.0",
    about = "Probe every path a site discloses in robots.txt and flag the interesting ones",
    long_about = "robots-scout fetches robots.txt from each target, extracts the Disallow/Allow/Sitemap \
                  paths, requests every one of them concurrently and reports status codes and sizes. \
                  Paths that look security-relevant are listed separately.",
    after_help = "Examples:\n  robots-scout example.com\n  robots-scout -f targets.txt\n  \
                  robots-scout example.com -t 20 -o results.txt\n  \
                  robots-scout example.com --format json -o results.json\n  \
                  robots-scout example.com --interesting-only"
)]
pub struct Cli {
    /// Target domain or URL (e.g., example.com or https://example.com)
    pub target: Option<String>,

    /// File containing targets, one per line
    #[arg(short = 'f', long = "file")]
    pub file: Option<PathBuf>,

    /// Number of concurrent workers per target
    #[arg(short = 't', long, default_value_t = 10, value_parser = clap::value_parser!(u16).range(1..))]
    pub threads: u16,

    /// Write the combined results of all targets to this file
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,

    /// Format of the output file
    #[arg(long, value_enum, default_value_t = FormatArg::Text)]
    pub format: FormatArg,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Only list interesting endpoints
    #[arg(long)]
    pub interesting_only: bool,

    /// Use a local robots.txt file instead of fetching one from each target
    #[arg(short = 'r', long)]
    pub robots: Option<PathBuf>,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: u64,

    /// User-Agent header sent with every request
    #[arg(long, default_value = "Mozilla/5.0")]
    pub user_agent: String,

    /// Maximum number of redirects followed per request (0 disables following)
    #[arg(long, default_value_t = 10)]
    pub max_redirects: usize,

    /// Log what the scanner is doing to stderr
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Log every request to stderr
    #[arg(long)]
    pub debug: bool,
}

// Output file formats
//
// "txt" and "structured" are accepted as aliases so older invocations keep working
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormatArg {
    /// Human-readable report
    #[value(alias = "txt")]
    Text,
    /// Machine-readable JSON record
    #[value(alias = "structured")]
    Json,
}
