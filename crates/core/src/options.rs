// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Mutex configuration snapshot
//!
//! [`MutexOptions`] is the serializable subset of a mutex's configuration,
//! suitable for embedding in an application's own config file. Strategies
//! that cannot be serialized (custom delay functions, token generators) are
//! applied on the builder instead.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Lock TTL written to each store
pub const DEFAULT_EXPIRY: Duration = Duration::from_secs(8);
/// Maximum acquisition attempts
pub const DEFAULT_TRIES: u32 = 32;
/// Lower bound of the default random retry delay
pub const MIN_RETRY_DELAY: Duration = Duration::from_millis(50);
/// Upper bound of the default random retry delay
pub const MAX_RETRY_DELAY: Duration = Duration::from_millis(250);
/// Clock-drift allowance as a fraction of expiry
pub const DEFAULT_DRIFT_FACTOR: f64 = 0.01;
/// Per-store call timeout as a fraction of expiry
pub const DEFAULT_TIMEOUT_FACTOR: f64 = 0.05;
/// Fixed margin added to the drift allowance to absorb RPC overhead.
/// A heuristic safety margin, not a derived bound.
pub const DEFAULT_DRIFT_BOUND: Duration = Duration::from_millis(2);

/// Serializable mutex configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MutexOptions {
    /// Lock TTL written to each store
    #[serde(with = "humantime_serde")]
    pub expiry: Duration,
    /// Maximum acquisition attempts
    pub tries: u32,
    /// Lower bound of the random inter-attempt delay
    #[serde(with = "humantime_serde")]
    pub retry_delay_min: Duration,
    /// Upper bound of the random inter-attempt delay
    #[serde(with = "humantime_serde")]
    pub retry_delay_max: Duration,
    /// Clock-drift allowance as a fraction of expiry
    pub drift_factor: f64,
    /// Per-store call timeout as a fraction of expiry
    pub timeout_factor: f64,
    /// Fixed margin added to the drift allowance
    #[serde(with = "humantime_serde")]
    pub drift_bound: Duration,
    /// Stop waiting for stragglers once quorum is reached
    pub fail_fast: bool,
    /// Randomize store order once, at construction
    pub shuffle_stores: bool,
    /// Extend falls back to a fresh acquire when the key is gone
    pub set_nx_on_extend: bool,
    /// Explicit quorum override; `None` derives a strict majority
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quorum: Option<usize>,
}

impl Default for MutexOptions {
    fn default() -> Self {
        Self {
            expiry: DEFAULT_EXPIRY,
            tries: DEFAULT_TRIES,
            retry_delay_min: MIN_RETRY_DELAY,
            retry_delay_max: MAX_RETRY_DELAY,
            drift_factor: DEFAULT_DRIFT_FACTOR,
            timeout_factor: DEFAULT_TIMEOUT_FACTOR,
            drift_bound: DEFAULT_DRIFT_BOUND,
            fail_fast: false,
            shuffle_stores: false,
            set_nx_on_extend: false,
            quorum: None,
        }
    }
}

#[cfg(test)]
#[path = "options_tests.rs"]
mod tests;
