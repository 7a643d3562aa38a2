// src/classify.rs
// =============================================================================
// Post-processing of a finished scan: sorting and picking the interesting
// endpoints.
//
// Sort order:
//   status ascending, with "no response" ranked as 999 (after every real
//   status), then endpoint path ascending. The sort is stable.
//
// Interesting:
//   Only 200, 401, 403 and 500 responses are considered at all. Of those,
//   an endpoint is interesting when its lowercased path matches one of the
//   name patterns below, and every 200 is interesting no matter what.
//
// The patterns are regexes, so "." matches any character: ".git" also
// matches "/digits". That is the long-standing behaviour and is kept.
// =============================================================================

use regex::RegexSet;
use std::sync::OnceLock;

use crate::probe::ProbeOutcome;

// Rank given to outcomes that have no status at all
pub const FAILED_STATUS_RANK: u16 = 999;

const CANDIDATE_STATUSES: [u16; 4] = [200, 401, 403, 500];

const INTERESTING_PATTERNS: [&str; 17] = [
    "admin", "login", "api", "backup", "config", "db", "wp-", ".git", ".env", "secret", "private",
    "dev", "test", "staging", "debug", "console", "dashboard",
];

fn patterns() -> &'static RegexSet {
    static PATTERNS: OnceLock<RegexSet> = OnceLock::new();
    // The patterns are constants; if they don't compile that's a programming error
    PATTERNS.get_or_init(|| RegexSet::new(INTERESTING_PATTERNS).expect("interesting patterns are valid regexes"))
}

pub fn sort_key(outcome: &ProbeOutcome) -> (u16, &str) {
    (outcome.status.unwrap_or(FAILED_STATUS_RANK), outcome.endpoint.as_str())
}

pub fn sort_outcomes(outcomes: &mut [ProbeOutcome]) {
    outcomes.sort_by(|a, b| sort_key(a).cmp(&sort_key(b)));
}

pub fn is_interesting(outcome: &ProbeOutcome) -> bool {
    let Some(status) = outcome.status else {
        return false;
    };
    if !CANDIDATE_STATUSES.contains(&status) {
        return false;
    }

    status == 200 || patterns().is_match(&outcome.endpoint.to_lowercase())
}

// Returns the interesting outcomes, in the same order as the input
pub fn classify(outcomes: &[ProbeOutcome]) -> Vec<ProbeOutcome> {
    outcomes.iter().filter(|o| is_interesting(o)).cloned().collect()
}
