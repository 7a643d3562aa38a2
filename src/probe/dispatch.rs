// src/probe/dispatch.rs
// =============================================================================
// The Dispatcher hands endpoints to workers and tracks when they're all done.
//
// Life of one endpoint:
//   enqueue_all()  -> queued
//   next_item()    -> in flight (owned by exactly one worker)
//   complete()     -> done (the worker has published its outcome)
//
// The whole endpoint list is loaded up front, before any worker starts, so an
// empty queue means "nothing left to hand out" and next_item() can return
// None straight away. Workers never poll or sleep waiting for work.
//
// "Queue is empty" is not the same as "scan is finished": items can still be
// in flight. wait_for_completion() only resolves when the number of
// outstanding items (queued + in flight) reaches zero.
// =============================================================================

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::Notify;

#[derive(Debug, Default)]
struct DispatchState {
    queue: VecDeque<String>,
    // queued + in flight
    outstanding: usize,
    total: usize,
}

#[derive(Debug, Default)]
pub struct Dispatcher {
    state: Mutex<DispatchState>,
    done: Notify,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    // Loads the endpoints for this target
    //
    // Called once, before the pool starts.
    pub fn enqueue_all<I>(&self, endpoints: I)
    where
        I: IntoIterator<Item = String>,
    {
        let mut state = self.lock();
        for endpoint in endpoints {
            state.queue.push_back(endpoint);
            state.outstanding += 1;
            state.total += 1;
        }
    }

    // Hands out the next endpoint, or None once the queue is exhausted
    pub fn next_item(&self) -> Option<String> {
        self.lock().queue.pop_front()
    }

    // Marks one handed-out endpoint as finished
    pub fn complete(&self) {
        let mut state = self.lock();
        state.outstanding = state.outstanding.saturating_sub(1);
        if state.outstanding == 0 {
            drop(state);
            self.done.notify_waiters();
        }
    }

    // Stops handing out work
    //
    // Everything still queued is dropped; items already in flight are left
    // alone and still need complete(). Returns how many items were dropped.
    pub fn close(&self) -> usize {
        let mut state = self.lock();
        let dropped = state.queue.len();
        state.queue.clear();
        state.outstanding -= dropped;
        let finished = state.outstanding == 0;
        drop(state);

        if finished {
            self.done.notify_waiters();
        }
        dropped
    }

    pub fn total(&self) -> usize {
        self.lock().total
    }

    pub fn is_complete(&self) -> bool {
        self.lock().outstanding == 0
    }

    // Resolves once every enqueued endpoint has been completed (or dropped by
    // close())
    pub async fn wait_for_completion(&self) {
        loop {
            // Register interest before checking, so a notify_waiters() that
            // lands between the check and the await isn't missed
            let notified = self.done.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if self.is_complete() {
                return;
            }
            notified.await;
        }
    }

    // A poisoned lock only means another worker panicked mid-update; the
    // queue itself is still consistent, so keep going
    fn lock(&self) -> MutexGuard<'_, DispatchState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why std::sync::Mutex and not tokio::sync::Mutex?
//    - We never .await while holding the lock
//    - Every critical section is a few pointer moves
//    - A std Mutex is cheaper and can't be held across an await by accident
//
// 2. What is Notify?
//    - A tokio primitive for "wake up whoever is waiting"
//    - notify_waiters() wakes every task currently waiting on notified()
//    - It does not remember the call, which is why wait_for_completion()
//      registers with enable() before checking the counter
//
// 3. What is PoisonError::into_inner?
//    - If a thread panics while holding a Mutex, the Mutex is "poisoned"
//    - lock() then returns Err, but the data is still inside
//    - into_inner() gives us the guard anyway instead of panicking too
// -----------------------------------------------------------------------------
