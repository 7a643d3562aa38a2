// src/probe/mod.rs
// =============================================================================
// This module is the concurrent probing pipeline.
//
// Submodules:
// - http: The Prober trait and the reqwest-backed HttpProber
// - dispatch: The Dispatcher, a work queue that knows when every item is done
// - pool: The WorkerPool, N tasks pulling from the Dispatcher
// - aggregate: The Aggregator, where workers publish their outcomes
//
// How the pieces fit together for one target:
//
//   Dispatcher --next_item()--> worker --probe()--> Prober
//        ^                        |
//        +------complete()--------+--publish()--> Aggregator
//
// The Dispatcher and the Aggregator are the only shared mutable state. Each
// one guards its data with a single Mutex, and nothing awaits while holding
// either lock.
// =============================================================================

mod aggregate;
mod dispatch;
mod http;
mod pool;

use serde::Serialize;

pub use aggregate::{Aggregator, Progress};
pub use dispatch::Dispatcher;
pub use http::{resolve_url, HttpProber, Prober};
pub use pool::WorkerPool;

// The result of probing one endpoint
//
// Built exactly once by the worker that probed the endpoint and never
// changed afterwards. Whether it's "interesting" is decided later by the
// classifier and is not stored here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProbeOutcome {
    /// The path as it appeared in robots.txt (after normalization)
    pub endpoint: String,
    /// The URL that was actually requested
    #[serde(rename = "full_url")]
    pub url: String,
    /// HTTP status code, or None when no response came back at all
    pub status: Option<u16>,
    /// Response body size in bytes (0 when the request failed)
    pub size: u64,
}

impl ProbeOutcome {
    pub fn new(endpoint: impl Into<String>, url: impl Into<String>, status: u16, size: u64) -> Self {
        Self {
            endpoint: endpoint.into(),
            url: url.into(),
            status: Some(status),
            size,
        }
    }

    // An outcome for a request that never got a response (timeout, DNS, ...)
    pub fn failed(endpoint: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            url: url.into(),
            status: None,
            size: 0,
        }
    }

    pub fn is_failure(&self) -> bool {
        self.status.is_none()
    }
}
