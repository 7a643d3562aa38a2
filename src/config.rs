// src/config.rs
// =============================================================================
// Runtime configuration for a scan.
//
// The CLI struct is convenient for parsing but awkward to pass around, so we
// convert it once into a ScanConfig. A ScanConfig is read-only for the whole
// run and is shared with every worker behind an Arc, so it needs no locking.
//
// Also lives here:
// - loading the list of targets (positional argument or -f file)
// - turning a bare domain like "example.com" into a base URL
// =============================================================================

use anyhow::{anyhow, Context, Result};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use crate::cli::{Cli, FormatArg};

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_WORKERS: usize = 10;
pub const DEFAULT_MAX_REDIRECTS: usize = 10;

// Serialization used by the exporter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Text => OutputFormat::Text,
            FormatArg::Json => OutputFormat::Json,
        }
    }
}

// Where robots.txt comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RobotsSource {
    /// GET <target>/robots.txt
    Remote,
    /// Read the same local file for every target
    LocalFile(PathBuf),
}

#[derive(Debug, Clone)]
pub struct ScanConfig {
    pub workers: usize,
    pub timeout: Duration,
    pub user_agent: String,
    pub max_redirects: usize,
    pub robots: RobotsSource,
    pub interesting_only: bool,
    pub color: bool,
    pub output: Option<PathBuf>,
    pub format: OutputFormat,
    // Draw the live progress bar (turned off in tests)
    pub show_progress: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            max_redirects: DEFAULT_MAX_REDIRECTS,
            robots: RobotsSource::Remote,
            interesting_only: false,
            color: true,
            output: None,
            format: OutputFormat::Text,
            show_progress: true,
        }
    }
}

impl ScanConfig {
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            workers: usize::from(cli.threads),
            timeout: Duration::from_secs(cli.timeout),
            user_agent: cli.user_agent.clone(),
            max_redirects: cli.max_redirects,
            robots: match &cli.robots {
                Some(path) => RobotsSource::LocalFile(path.clone()),
                None => RobotsSource::Remote,
            },
            interesting_only: cli.interesting_only,
            color: !cli.no_color,
            output: cli.output.clone(),
            format: cli.format.into(),
            show_progress: true,
        }
    }

    // Builds the one HTTP client shared by the robots fetcher and every worker
    //
    // reqwest::Client is reference counted internally, so cloning it per
    // worker reuses the same connection pool.
    pub fn http_client(&self) -> Result<reqwest::Client> {
        let redirect = if self.max_redirects == 0 {
            reqwest::redirect::Policy::none()
        } else {
            reqwest::redirect::Policy::limited(self.max_redirects)
        };

        reqwest::Client::builder()
            .user_agent(self.user_agent.as_str())
            .timeout(self.timeout)
            .redirect(redirect)
            .build()
            .context("Failed to create HTTP client")
    }
}

// Returns the raw target strings to scan
//
// -f wins over the positional target, same as before. Blank lines in the file
// are skipped and every line is trimmed.
pub fn load_targets(target: Option<&str>, file: Option<&Path>) -> Result<Vec<String>> {
    if let Some(path) = file {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Error reading file {}", path.display()))?;
        return Ok(parse_target_list(&content));
    }

    match target {
        Some(t) => Ok(vec![t.to_string()]),
        None => Err(anyhow!("No target or target file given")),
    }
}

fn parse_target_list(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

// Turns "example.com" or "https://example.com/" into a base URL
//
// No scheme -> https is assumed. Trailing slashes are dropped so the robots
// URL is always "<base>/robots.txt".
pub fn normalize_target(raw: &str) -> Result<Url> {
    let raw = raw.trim();
    let with_scheme = if raw.starts_with("http://") || raw.starts_with("https://") {
        raw.to_string()
    } else {
        format!("https://{}", raw)
    };

    let trimmed = with_scheme.trim_end_matches('/');
    Url::parse(trimmed).map_err(|e| anyhow!("Invalid target '{}': {}", raw, e))
}
