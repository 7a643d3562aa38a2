// src/probe/pool.rs
// =============================================================================
// The WorkerPool runs the probes for one target.
//
// Each worker is a tokio task on the multi-threaded runtime and runs the same
// loop:
//   1. take the next endpoint from the Dispatcher (stop when there is none)
//   2. probe it
//   3. publish the outcome to the Aggregator
//   4. tell the Dispatcher the endpoint is complete
//
// The pool is sized min(workers, endpoints) and lives for exactly one target:
// start() it, wait on the Dispatcher, then join() it before the next target.
//
// A probe that panics is caught and recorded as a failed outcome, so the
// "one outcome per endpoint" count still holds and the Dispatcher still
// reaches completion.
// =============================================================================

use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use url::Url;

use super::{resolve_url, Aggregator, Dispatcher, ProbeOutcome, Prober};

pub struct WorkerPool {
    handles: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    pub fn start<P: Prober>(
        prober: Arc<P>,
        base: Arc<Url>,
        dispatcher: Arc<Dispatcher>,
        aggregator: Arc<Aggregator>,
        workers: usize,
    ) -> Self {
        let count = workers.min(dispatcher.total());
        debug!(workers = count, endpoints = dispatcher.total(), "starting worker pool");

        let handles = (0..count)
            .map(|id| {
                tokio::spawn(worker(
                    id,
                    prober.clone(),
                    base.clone(),
                    dispatcher.clone(),
                    aggregator.clone(),
                ))
            })
            .collect();

        Self { handles }
    }

    pub fn size(&self) -> usize {
        self.handles.len()
    }

    // Waits for every worker to exit
    pub async fn join(self) {
        for handle in self.handles {
            if let Err(e) = handle.await {
                warn!(error = %e, "worker task ended abnormally");
            }
        }
    }
}

async fn worker<P: Prober>(
    id: usize,
    prober: Arc<P>,
    base: Arc<Url>,
    dispatcher: Arc<Dispatcher>,
    aggregator: Arc<Aggregator>,
) {
    debug!(worker = id, "worker started");
    let mut probed = 0usize;

    while let Some(endpoint) = dispatcher.next_item() {
        let result = AssertUnwindSafe(prober.probe(&base, &endpoint))
            .catch_unwind()
            .await;

        let outcome = match result {
            Ok(outcome) => outcome,
            Err(_) => {
                warn!(worker = id, %endpoint, "probe panicked, recording as failed");
                let url = resolve_url(&base, &endpoint)
                    .map(|u| u.to_string())
                    .unwrap_or_else(|| endpoint.clone());
                ProbeOutcome::failed(endpoint, url)
            }
        };

        aggregator.publish(outcome);
        dispatcher.complete();
        probed += 1;
    }

    debug!(worker = id, probed, "worker finished");
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why Arc everywhere?
//    - tokio::spawn needs 'static futures, so a task can't borrow from us
//    - Arc<T> is a shared, reference-counted pointer: each worker gets its
//      own clone pointing at the same Dispatcher/Aggregator/Prober
//
// 2. What does catch_unwind do here?
//    - A panic inside a spawned task normally kills only that task
//    - But then its endpoint would never be published or completed, and
//      wait_for_completion() would hang forever
//    - catch_unwind turns the panic into an Err we can record as a failure
//
// 3. Why AssertUnwindSafe?
//    - catch_unwind wants proof that state seen after a panic is sane
//    - The probe future only touches the Prober through &self, and the
//      shared state is behind Mutexes that tolerate poisoning
// -----------------------------------------------------------------------------
