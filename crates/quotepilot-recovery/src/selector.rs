//! Candidate selection.
//!
//! The store query narrows to unclaimed sent estimates; age and
//! follow-up checks run in memory so timestamp parsing stays in one
//! place. An estimate's age is measured from `sent_at`, falling back
//! to `created_at` when the send time was never recorded.

use chrono::{DateTime, Duration, Utc};
use quotepilot_core::error::Result;
use quotepilot_core::types::{CandidateEstimate, parse_timestamp};
use quotepilot_store::Store;
use std::collections::HashSet;

/// Rows fetched from the store before in-memory filtering.
pub const CANDIDATE_FETCH_LIMIT: usize = 250;
/// Per-run processing cap.
pub const MAX_CANDIDATES: usize = 50;

/// True when the estimate is old enough and has never been followed up.
pub fn is_recovery_candidate(
    estimate: &CandidateEstimate,
    now: DateTime<Utc>,
    lookback: Duration,
) -> bool {
    if estimate.first_followed_up_at.is_some() || estimate.last_followed_up_at.is_some() {
        return false;
    }
    let reference = parse_timestamp(estimate.sent_at.as_deref())
        .or_else(|| parse_timestamp(estimate.created_at.as_deref()));
    match reference {
        Some(ts) => ts <= now - lookback,
        None => false,
    }
}

/// Eligible candidates, oldest first, deduplicated and capped at
/// [`MAX_CANDIDATES`].
pub fn select_candidates(
    store: &Store,
    estimate_id: Option<&str>,
    user_id: Option<&str>,
    now: DateTime<Utc>,
    lookback: Duration,
) -> Result<Vec<CandidateEstimate>> {
    let rows = store.unclaimed_sent_estimates(estimate_id, user_id, CANDIDATE_FETCH_LIMIT)?;

    let mut seen: HashSet<String> = HashSet::new();
    let mut selected = Vec::new();
    for estimate in rows {
        if !is_recovery_candidate(&estimate, now, lookback) {
            continue;
        }
        if !seen.insert(estimate.id.clone()) {
            continue;
        }
        selected.push(estimate);
        if selected.len() >= MAX_CANDIDATES {
            break;
        }
    }
    Ok(selected)
}
