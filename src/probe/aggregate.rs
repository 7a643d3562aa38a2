// src/probe/aggregate.rs
// =============================================================================
// The Aggregator collects outcomes from all workers for one target.
//
// publish() is the one place where workers meet: it appends the outcome and
// bumps the completed counter under a single Mutex, so two workers finishing
// at the same moment can never lose or double-count an update.
//
// The live progress bar is updated inside the same lock, which keeps the
// on-screen [completed/total] counter in step with the real one.
// =============================================================================

use indicatif::ProgressBar;
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::ProbeOutcome;
use crate::report::progress_line;

// A consistent (completed, total) snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
}

impl Progress {
    pub fn is_done(&self) -> bool {
        self.completed >= self.total
    }
}

#[derive(Default)]
struct AggregateState {
    outcomes: Vec<ProbeOutcome>,
    completed: usize,
}

pub struct Aggregator {
    state: Mutex<AggregateState>,
    total: usize,
    bar: ProgressBar,
}

impl Aggregator {
    pub fn new(total: usize) -> Self {
        Self {
            state: Mutex::new(AggregateState {
                outcomes: Vec::with_capacity(total),
                completed: 0,
            }),
            total,
            bar: ProgressBar::hidden(),
        }
    }

    pub fn with_progress_bar(mut self, bar: ProgressBar) -> Self {
        bar.set_length(self.total as u64);
        self.bar = bar;
        self
    }

    // Records one outcome and returns the progress right after it
    pub fn publish(&self, outcome: ProbeOutcome) -> Progress {
        let mut state = self.lock();

        self.bar.set_message(progress_line(&outcome));
        self.bar.inc(1);

        state.outcomes.push(outcome);
        state.completed += 1;

        Progress {
            completed: state.completed,
            total: self.total,
        }
    }

    pub fn progress(&self) -> Progress {
        Progress {
            completed: self.lock().completed,
            total: self.total,
        }
    }

    // Takes the collected outcomes (in arrival order) and closes the bar
    //
    // Call this after the Dispatcher reports completion.
    pub fn take_outcomes(&self) -> Vec<ProbeOutcome> {
        let outcomes = std::mem::take(&mut self.lock().outcomes);
        self.bar.finish_and_clear();
        outcomes
    }

    // See Dispatcher::lock
    fn lock(&self) -> MutexGuard<'_, AggregateState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
