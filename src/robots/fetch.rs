// src/robots/fetch.rs
// =============================================================================
// This module gets the robots.txt content for a target.
//
// Two sources:
// - Remote: GET <target>/robots.txt with the shared client (same User-Agent
//   and timeout as the probes)
// - Local: a file passed with -r, read once per target
//
// A robots.txt that can't be fetched is not an error for the program as a
// whole. We hand back `content: None` and the scanner skips the target.
// =============================================================================

use anyhow::{Context, Result};
use reqwest::Client;
use std::path::Path;
use tracing::debug;
use url::Url;

// What we got back when asking for robots.txt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RobotsFetch {
    /// File content, or None if it couldn't be fetched (or was empty)
    pub content: Option<String>,
    /// Where we looked for it (shown to the user either way)
    pub url: String,
}

// Builds "<base>/robots.txt", keeping any path the target already has
//
// Example:
//   https://example.com      -> https://example.com/robots.txt
//   https://example.com/blog -> https://example.com/blog/robots.txt
pub fn robots_url(base: &Url) -> String {
    format!("{}/robots.txt", base.as_str().trim_end_matches('/'))
}

pub async fn fetch_robots_txt(client: &Client, base: &Url) -> RobotsFetch {
    let url = robots_url(base);

    let content = match fetch_text(client, &url).await {
        Ok(text) if !text.is_empty() => Some(text),
        Ok(_) => {
            debug!(%url, "robots.txt is empty");
            None
        }
        Err(e) => {
            debug!(%url, error = %e, "robots.txt fetch failed");
            None
        }
    };

    RobotsFetch { content, url }
}

async fn fetch_text(client: &Client, url: &str) -> Result<String> {
    let response = client.get(url).send().await?.error_for_status()?;
    let bytes = response.bytes().await?;
    // Invalid UTF-8 is replaced rather than rejected
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

// Reads a robots.txt the user supplied with -r
pub fn read_local_robots(path: &Path) -> Result<RobotsFetch> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("Error reading custom robots.txt {}", path.display()))?;
    let text = String::from_utf8_lossy(&bytes).into_owned();

    Ok(RobotsFetch {
        content: (!text.is_empty()).then_some(text),
        url: path.display().to_string(),
    })
}
