// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lock manager and mutex builder
//!
//! The manager owns the shared store set; each mutex is configured through
//! a builder whose options apply in call order over the documented
//! defaults. Quorum invariants are enforced here, at construction, so the
//! algorithm itself never runs with a quorum below strict majority.

use crate::clock::{Clock, SystemClock};
use crate::delay::{DelayStrategy, FixedDelay, RandomDelay};
use crate::mutex::Mutex;
use crate::options::MutexOptions;
use crate::store::LockStore;
use crate::token::{RandomTokenGen, TokenGen};
use rand::seq::SliceRandom;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Configuration rejected at construction
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("at least one lock store is required")]
    NoStores,
    /// A quorum below strict majority would break mutual exclusion; one
    /// above the store count could never be reached.
    #[error("quorum {requested} invalid for {stores} stores (majority is {majority})")]
    InvalidQuorum {
        requested: usize,
        stores: usize,
        majority: usize,
    },
}

/// Factory for mutexes over a fixed set of stores
#[derive(Clone)]
pub struct LockManager<C: Clock = SystemClock> {
    stores: Vec<Arc<dyn LockStore>>,
    clock: C,
}

impl LockManager<SystemClock> {
    pub fn new(stores: Vec<Arc<dyn LockStore>>) -> Self {
        Self::with_clock(stores, SystemClock)
    }
}

impl<C: Clock> LockManager<C> {
    pub fn with_clock(stores: Vec<Arc<dyn LockStore>>, clock: C) -> Self {
        Self { stores, clock }
    }

    pub fn store_count(&self) -> usize {
        self.stores.len()
    }

    /// Start building a mutex for the given lock name
    pub fn mutex(&self, name: impl Into<String>) -> MutexBuilder<C> {
        MutexBuilder {
            name: name.into(),
            stores: self.stores.clone(),
            clock: self.clock.clone(),
            opts: MutexOptions::default(),
            delay: None,
            token_gen: Arc::new(RandomTokenGen),
            token: None,
        }
    }
}

/// Builder applying configuration options in call order
pub struct MutexBuilder<C: Clock = SystemClock> {
    name: String,
    stores: Vec<Arc<dyn LockStore>>,
    clock: C,
    opts: MutexOptions,
    delay: Option<Arc<dyn DelayStrategy>>,
    token_gen: Arc<dyn TokenGen>,
    token: Option<String>,
}

impl<C: Clock> MutexBuilder<C> {
    /// Lock TTL written to each store. Default 8s.
    pub fn with_expiry(mut self, expiry: Duration) -> Self {
        self.opts.expiry = expiry;
        self
    }

    /// Maximum acquisition attempts. Default 32.
    pub fn with_tries(mut self, tries: u32) -> Self {
        self.opts.tries = tries;
        self
    }

    /// Constant inter-attempt delay. Default is random in [50ms, 250ms).
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(Arc::new(FixedDelay(delay)));
        self
    }

    /// Custom inter-attempt delay strategy
    pub fn with_retry_delay_fn(mut self, strategy: impl DelayStrategy + 'static) -> Self {
        self.delay = Some(Arc::new(strategy));
        self
    }

    /// Clock-drift allowance as a fraction of expiry. Default 0.01.
    pub fn with_drift_factor(mut self, factor: f64) -> Self {
        self.opts.drift_factor = factor;
        self
    }

    /// Per-store call timeout as a fraction of expiry. Default 0.05.
    pub fn with_timeout_factor(mut self, factor: f64) -> Self {
        self.opts.timeout_factor = factor;
        self
    }

    /// Fixed margin added to the drift allowance. Default 2ms.
    ///
    /// A heuristic safety margin for RPC overhead, not a derived bound.
    pub fn with_drift_bound(mut self, bound: Duration) -> Self {
        self.opts.drift_bound = bound;
        self
    }

    /// Custom ownership-token generator. Default is a random UUID.
    pub fn with_token_gen(mut self, token_gen: impl TokenGen + 'static) -> Self {
        self.token_gen = Arc::new(token_gen);
        self
    }

    /// Pre-assigned ownership token, skipping generation
    ///
    /// Allows ownership of a lock to be handed over: a mutex built with
    /// the same token can extend or unlock what another acquired.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Stop waiting for stragglers once quorum is reached. Default off.
    pub fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.opts.fail_fast = fail_fast;
        self
    }

    /// Randomize store order once, at build time. Default off.
    pub fn with_shuffle_stores(mut self, shuffle: bool) -> Self {
        self.opts.shuffle_stores = shuffle;
        self
    }

    /// Extend falls back to a fresh acquire when the key is gone. Default off.
    pub fn with_set_nx_on_extend(mut self, set_nx: bool) -> Self {
        self.opts.set_nx_on_extend = set_nx;
        self
    }

    /// Explicit quorum override. Default is a strict majority of the stores.
    pub fn with_quorum(mut self, quorum: usize) -> Self {
        self.opts.quorum = Some(quorum);
        self
    }

    /// Apply a whole options snapshot, overriding everything it covers
    pub fn apply(mut self, opts: &MutexOptions) -> Self {
        self.opts = opts.clone();
        // The snapshot's delay bounds govern again
        self.delay = None;
        self
    }

    /// Validate the configuration and build the mutex
    pub fn build(self) -> Result<Mutex<C>, ConfigError> {
        if self.stores.is_empty() {
            return Err(ConfigError::NoStores);
        }

        let majority = self.stores.len() / 2 + 1;
        let quorum = match self.opts.quorum {
            None => majority,
            Some(requested) => {
                if requested < majority || requested > self.stores.len() {
                    return Err(ConfigError::InvalidQuorum {
                        requested,
                        stores: self.stores.len(),
                        majority,
                    });
                }
                requested
            }
        };

        let mut stores = self.stores;
        if self.opts.shuffle_stores {
            stores.shuffle(&mut rand::rng());
        }

        let delay = self.delay.unwrap_or_else(|| {
            Arc::new(RandomDelay::new(
                self.opts.retry_delay_min,
                self.opts.retry_delay_max,
            ))
        });

        Ok(Mutex {
            name: self.name,
            token: self.token,
            until: None,
            expiry: self.opts.expiry,
            tries: self.opts.tries,
            delay,
            token_gen: self.token_gen,
            drift_factor: self.opts.drift_factor,
            timeout_factor: self.opts.timeout_factor,
            drift_bound: self.opts.drift_bound,
            quorum,
            fail_fast: self.opts.fail_fast,
            set_nx_on_extend: self.opts.set_nx_on_extend,
            stores,
            clock: self.clock,
        })
    }
}

#[cfg(test)]
#[path = "manager_tests.rs"]
mod tests;
