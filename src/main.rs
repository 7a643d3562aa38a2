// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Set up logging, colors and the Ctrl-C handler
// 3. Scan every target (see scan.rs)
// 4. Export the combined results if -o was given
// 5. Exit with proper code
//
// Exit codes:
//   0 = run finished (even if some targets were skipped or the user hit Ctrl-C)
//   1 = no target given, the targets file couldn't be read, or an
//       unexpected error
// =============================================================================

// Module declarations - tells Rust about our other source files
mod classify; // src/classify.rs - sorting and "interesting" heuristics
mod cli; // src/cli.rs - command-line parsing
mod config; // src/config.rs - runtime configuration and target loading
mod logging; // src/logging.rs - tracing setup
mod probe; // src/probe/ - the concurrent probing pipeline
mod report; // src/report/ - console output and file export
mod robots; // src/robots/ - fetching and parsing robots.txt
mod scan; // src/scan.rs - one scan per target

#[cfg(test)]
mod test_support;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use colored::Colorize;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use cli::Cli;
use config::{load_targets, ScanConfig};
use probe::HttpProber;
use report::Console;

#[tokio::main]
async fn main() {
    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!();
            eprintln!("{} Unexpected error: {:#}", "[!]".red(), e);
            1
        }
    };

    std::process::exit(exit_code);
}

async fn run() -> Result<i32> {
    let cli = Cli::parse();

    if cli.target.is_none() && cli.file.is_none() {
        Cli::command().print_help()?;
        return Ok(1);
    }

    logging::init(logging::level_from_cli(&cli))?;

    let config = ScanConfig::from_cli(&cli);
    if !config.color {
        colored::control::set_override(false);
    }

    let console = Console::new(config.color);
    console.banner();

    let targets = match load_targets(cli.target.as_deref(), cli.file.as_deref()) {
        Ok(targets) => targets,
        Err(e) => {
            console.error(&format!("{:#}", e));
            return Ok(1);
        }
    };
    if let Some(file) = &cli.file {
        console.info(&format!("Loaded {} targets from {}", targets.len(), file.display()));
    }

    let cancel = CancellationToken::new();
    watch_for_interrupt(cancel.clone());

    let client = config.http_client()?;
    let prober = Arc::new(HttpProber::new(client.clone()));
    info!(targets = targets.len(), workers = config.workers, "starting run");

    let reports = scan::scan_all(&config, &client, prober, &targets, &cancel, &console).await;

    // Export failures are reported but don't change the exit code
    if let Some(path) = &config.output {
        match report::export_results(&reports, path, config.format) {
            Ok(()) => console.exported(path),
            Err(e) => console.export_failed(&e),
        }
    }

    Ok(0)
}

// First Ctrl-C: stop handing out new probes and let the current ones finish.
// Second Ctrl-C: quit right away. Exports are written atomically, so the output
// file is never half-written, but quitting mid-export can leave a stray
// <output>.tmp next to it.
fn watch_for_interrupt(cancel: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_err() {
            debug!("could not listen for Ctrl-C");
            return;
        }
        cancel.cancel();

        if tokio::signal::ctrl_c().await.is_ok() {
            println!();
            println!("{} Scan interrupted by user", "[!]".yellow());
            std::process::exit(0);
        }
    });
}
