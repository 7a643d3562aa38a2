// src/robots/parse.rs
// =============================================================================
// This module extracts probe-able paths from robots.txt content.
//
// robots.txt is line based. We only care about three directives:
//   Disallow: /admin/
//   Allow: /public
//   Sitemap: https://example.com/sitemap.xml
// The directive name is matched case-insensitively. The value is whatever
// follows the first ':' with surrounding whitespace removed.
//
// User-agent groups are ignored on purpose: a path disallowed for any bot is
// still a path the site told us about.
// =============================================================================

use url::Url;

const DIRECTIVES: [&str; 3] = ["disallow:", "allow:", "sitemap:"];

// Returns the raw directive values, in file order
//
// Empty values ("Disallow:") and values that are just a comment are skipped.
pub fn parse_robots_txt(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| {
            let lower = line.to_lowercase();
            DIRECTIVES.iter().any(|d| lower.starts_with(d))
        })
        .filter_map(|line| line.split_once(':'))
        .map(|(_, value)| value.trim())
        .filter(|value| !value.is_empty() && !value.starts_with('#'))
        .map(str::to_string)
        .collect()
}

// Reduces absolute URLs (mostly Sitemap entries) to their path
//
// "https://example.com/sitemap.xml" -> "/sitemap.xml"
// "https://example.com"             -> "/"
// "/admin/"                         -> "/admin/" (unchanged)
//
// The host of an absolute URL is dropped even when it differs from the
// target, so the path is probed against the target we're scanning.
pub fn normalize_endpoint(raw: &str) -> String {
    if raw.starts_with("http") {
        if let Ok(url) = Url::parse(raw) {
            let path = url.path();
            return if path.is_empty() { "/".to_string() } else { path.to_string() };
        }
    }
    raw.to_string()
}

// parse + normalize, which is what the scanner actually wants
pub fn extract_endpoints(content: &str) -> Vec<String> {
    parse_robots_txt(content)
        .iter()
        .map(|raw| normalize_endpoint(raw))
        .collect()
}
