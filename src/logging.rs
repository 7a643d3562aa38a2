// src/logging.rs
// =============================================================================
// Diagnostic logging setup.
//
// Results go to stdout with println!; diagnostics (which requests failed and
// why, when a worker starts and stops) go through `tracing` to stderr, so
// piping the output somewhere never mixes the two.
//
// Default level is WARN. -v raises it to INFO, --debug to DEBUG. When RUST_LOG
// is set it replaces those flags entirely.
// =============================================================================

use anyhow::{anyhow, Result};
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::cli::Cli;

pub fn level_from_cli(cli: &Cli) -> Level {
    if cli.debug {
        Level::DEBUG
    } else if cli.verbose {
        Level::INFO
    } else {
        Level::WARN
    }
}

pub fn init(level: Level) -> Result<()> {
    let env = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter = build_filter(level, env.as_deref())?;

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .try_init()
        .map_err(|e| anyhow!("Failed to initialize logging: {}", e))
}

fn build_filter(level: Level, env: Option<&str>) -> Result<EnvFilter> {
    match env {
        Some(directives) if !directives.trim().is_empty() => Ok(EnvFilter::try_new(directives)?),
        _ => Ok(EnvFilter::try_new(format!("warn,robots_scout={}", level))?),
    }
}
