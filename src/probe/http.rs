// src/probe/http.rs
// =============================================================================
// This module requests a single endpoint and records what came back.
//
// Key points:
// - One GET per endpoint, no retries
// - Redirects are followed by the client (up to --max-redirects) and the
//   final status is reported
// - Any HTTP status, including 4xx and 5xx, is a normal result
// - Transport failures (timeout, DNS, refused connection, TLS, a body that
//   stalls or breaks off) become an outcome with no status and size 0. They
//   are never returned as errors.
// - The body is only counted, never kept
//
// The Prober trait is the seam between the worker pool and the network, so
// the pool can be tested with a fake prober that never opens a socket.
// =============================================================================

use reqwest::Client;
use std::future::Future;
use tracing::debug;
use url::Url;

use super::ProbeOutcome;

// Anything that can turn (base URL, endpoint) into a ProbeOutcome
//
// Implementations must not fail: every call produces exactly one outcome.
pub trait Prober: Send + Sync + 'static {
    fn probe(&self, base: &Url, endpoint: &str) -> impl Future<Output = ProbeOutcome> + Send;
}

// The real prober, backed by a shared reqwest client
//
// The client carries the User-Agent, timeout and redirect policy (see
// ScanConfig::http_client), so every worker requests things the same way.
#[derive(Debug, Clone)]
pub struct HttpProber {
    client: Client,
}

impl HttpProber {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl Prober for HttpProber {
    async fn probe(&self, base: &Url, endpoint: &str) -> ProbeOutcome {
        let Some(url) = resolve_url(base, endpoint) else {
            debug!(endpoint, "endpoint does not form a valid URL");
            return ProbeOutcome::failed(endpoint, display_url(base, endpoint));
        };

        let mut response = match self.client.get(url.clone()).send().await {
            Ok(response) => response,
            Err(e) => {
                debug!(%url, reason = categorize_error(&e), "probe failed");
                return ProbeOutcome::failed(endpoint, url.as_str());
            }
        };

        let status = response.status().as_u16();

        // Count the body chunk by chunk. A timeout or dropped connection
        // here means the request never completed, so it is a failure even
        // though the status line already arrived.
        let mut size = 0u64;
        loop {
            match response.chunk().await {
                Ok(Some(chunk)) => size += chunk.len() as u64,
                Ok(None) => break,
                Err(e) => {
                    debug!(%url, status, reason = categorize_error(&e), "body read failed");
                    return ProbeOutcome::failed(endpoint, url.as_str());
                }
            }
        }

        debug!(%url, status, size, "probed");
        ProbeOutcome::new(endpoint, url.as_str(), status, size)
    }
}

// Resolves an endpoint against the target with normal URL-join rules
//
// Examples (base = https://example.com):
//   "/admin/"                -> https://example.com/admin/
//   "admin"                  -> https://example.com/admin
//   "https://other.com/x"    -> https://other.com/x (absolute wins)
pub fn resolve_url(base: &Url, endpoint: &str) -> Option<Url> {
    base.join(endpoint).ok()
}

// What to show for an endpoint that couldn't be joined onto the base
fn display_url(base: &Url, endpoint: &str) -> String {
    format!("{}{}", base.as_str().trim_end_matches('/'), endpoint)
}

// Short reason for a transport failure, only used in debug logs
fn categorize_error(error: &reqwest::Error) -> &'static str {
    let error_string = error.to_string().to_lowercase();

    if error.is_timeout() {
        "timeout"
    } else if error.is_redirect() {
        "too many redirects"
    } else if error.is_connect() {
        if error_string.contains("dns") {
            "dns"
        } else {
            "connect"
        }
    } else if error_string.contains("certificate") || error_string.contains("ssl") {
        "tls"
    } else if error.is_body() || error.is_decode() {
        "body"
    } else {
        "other"
    }
}
