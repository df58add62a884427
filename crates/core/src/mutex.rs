// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Distributed mutex over a set of independent lock stores
//!
//! Ownership is established by writing the same token into a strict
//! majority of stores within a bounded validity window. The window is the
//! requested TTL minus the time the round itself took minus a clock-drift
//! allowance, so a lock that was slow to acquire is never believed held for
//! longer than the stores will actually keep it.
//!
//! A `Mutex` is one logical owner. Methods take `&mut self`; callers that
//! share an instance across tasks must serialize Lock/Extend/Unlock
//! themselves.

use crate::clock::{Clock, SystemClock};
use crate::delay::DelayStrategy;
use crate::round::{run_round, Round, StoreVote};
use crate::store::{ExtendStatus, LockStore};
use crate::token::{TokenError, TokenGen};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Errors from lock operations
///
/// The quorum variants carry the final round's per-store votes so callers
/// can see which stores granted, refused, or failed.
#[derive(Debug, Error)]
pub enum LockError {
    #[error("lock {name:?} not acquired: {granted}/{quorum} stores granted after {tries} attempts")]
    Failed {
        name: String,
        tries: u32,
        granted: usize,
        quorum: usize,
        votes: Vec<StoreVote>,
    },
    #[error("lock {name:?} not extended: {granted}/{quorum} stores confirmed")]
    ExtendFailed {
        name: String,
        granted: usize,
        quorum: usize,
        votes: Vec<StoreVote>,
    },
    #[error("lock {name:?} not released: {granted}/{quorum} stores confirmed")]
    UnlockFailed {
        name: String,
        granted: usize,
        quorum: usize,
        votes: Vec<StoreVote>,
    },
    /// Extend or unlock was called without a held token
    #[error("no ownership token held")]
    NotHeld,
    #[error(transparent)]
    Token(#[from] TokenError),
}

/// Distributed mutex
///
/// Built by [`crate::manager::LockManager`]; see [`crate::options::MutexOptions`]
/// for the configuration surface and defaults.
pub struct Mutex<C: Clock = SystemClock> {
    pub(crate) name: String,
    pub(crate) token: Option<String>,
    pub(crate) until: Option<Instant>,
    pub(crate) expiry: Duration,
    pub(crate) tries: u32,
    pub(crate) delay: Arc<dyn DelayStrategy>,
    pub(crate) token_gen: Arc<dyn TokenGen>,
    pub(crate) drift_factor: f64,
    pub(crate) timeout_factor: f64,
    pub(crate) drift_bound: Duration,
    pub(crate) quorum: usize,
    pub(crate) fail_fast: bool,
    pub(crate) set_nx_on_extend: bool,
    pub(crate) stores: Vec<Arc<dyn LockStore>>,
    pub(crate) clock: C,
}

// The token is deliberately left out: it is the proof of ownership and has
// no business in logs.
impl<C: Clock> std::fmt::Debug for Mutex<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mutex")
            .field("name", &self.name)
            .field("quorum", &self.quorum)
            .field("stores", &self.stores.len())
            .field("expiry", &self.expiry)
            .field("tries", &self.tries)
            .field("fail_fast", &self.fail_fast)
            .field("until", &self.until)
            .finish_non_exhaustive()
    }
}

impl<C: Clock> Mutex<C> {
    /// Name of the lock, shared across all stores
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current ownership token, if held
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Deadline up to which the lock is believed valid
    pub fn until(&self) -> Option<Instant> {
        self.until
    }

    /// Minimum number of stores that must agree
    pub fn quorum(&self) -> usize {
        self.quorum
    }

    /// Whether the lock is still believed held. Purely local, no I/O.
    ///
    /// A cheap pre-check before protected work, not a substitute for
    /// [`extend`](Self::extend) when more time is needed.
    pub fn valid(&self) -> bool {
        matches!(self.until, Some(until) if self.clock.now() < until)
    }

    /// Acquire the lock
    ///
    /// Writes the ownership token to every store concurrently, up to
    /// `tries` attempts. Succeeds once a quorum of stores granted and the
    /// remaining validity window is still positive; partial grants from a
    /// failed attempt are released best-effort before the next one.
    pub async fn lock(&mut self) -> Result<(), LockError> {
        let token = match self.token.clone() {
            Some(token) => token,
            None => {
                let token = self.token_gen.generate()?;
                self.token = Some(token.clone());
                token
            }
        };

        let mut last_round: Option<Round> = None;
        for attempt in 0..self.tries {
            if attempt > 0 {
                tokio::time::sleep(self.delay.delay(attempt)).await;
            }

            let start = self.clock.now();
            let round = self.cast_acquire(&token).await;
            let validity = self.validity_window(start);

            if round.granted() >= self.quorum && !validity.is_zero() {
                self.until = Some(start + validity);
                tracing::debug!(
                    name = %self.name,
                    granted = round.granted(),
                    quorum = self.quorum,
                    validity_ms = validity.as_millis() as u64,
                    attempt,
                    "lock acquired"
                );
                return Ok(());
            }

            tracing::debug!(
                name = %self.name,
                granted = round.granted(),
                quorum = self.quorum,
                attempt,
                "attempt failed, releasing partial grants"
            );
            self.release_subset(&token, round.granted_stores()).await;
            last_round = Some(round);
        }

        let (granted, votes) = match last_round {
            Some(round) => (round.granted(), round.into_votes()),
            None => (0, Vec::new()),
        };
        Err(LockError::Failed {
            name: self.name.clone(),
            tries: self.tries,
            granted,
            quorum: self.quorum,
            votes,
        })
    }

    /// Renew the TTL of an already-held lock
    ///
    /// On success the validity deadline advances; on failure it is left
    /// untouched and the previous deadline still governs. Extend never
    /// invalidates existing grants, so no rollback is needed.
    pub async fn extend(&mut self) -> Result<(), LockError> {
        let token = self.token.clone().ok_or(LockError::NotHeld)?;

        let start = self.clock.now();
        let round = self.cast_extend(&token).await;
        let validity = self.validity_window(start);

        if round.granted() >= self.quorum && !validity.is_zero() {
            self.until = Some(start + validity);
            tracing::debug!(
                name = %self.name,
                granted = round.granted(),
                quorum = self.quorum,
                validity_ms = validity.as_millis() as u64,
                "lock extended"
            );
            return Ok(());
        }

        Err(LockError::ExtendFailed {
            name: self.name.clone(),
            granted: round.granted(),
            quorum: self.quorum,
            votes: round.into_votes(),
        })
    }

    /// Release the lock
    ///
    /// Always attempts the release regardless of the believed validity;
    /// the caller may be cleaning up a lock it suspects has expired.
    /// Returns `Ok(true)` when a quorum confirmed the delete, `Ok(false)`
    /// when every store answered but nothing was left to delete (already
    /// expired or taken over — not an error). Local ownership state is
    /// cleared in both cases.
    pub async fn unlock(&mut self) -> Result<bool, LockError> {
        let token = self.token.clone().ok_or(LockError::NotHeld)?;

        let round = run_round(
            &self.stores,
            self.store_timeout(),
            self.early_quorum(),
            |_, store| {
                let key = self.name.clone();
                let token = token.clone();
                Box::pin(async move { store.try_release(&key, &token).await })
            },
        )
        .await;

        if round.granted() >= self.quorum {
            self.token = None;
            self.until = None;
            tracing::debug!(name = %self.name, "lock released");
            return Ok(true);
        }

        if round.is_complete() && !round.has_errors() {
            self.token = None;
            self.until = None;
            tracing::debug!(name = %self.name, "nothing to release");
            return Ok(false);
        }

        Err(LockError::UnlockFailed {
            name: self.name.clone(),
            granted: round.granted(),
            quorum: self.quorum,
            votes: round.into_votes(),
        })
    }

    fn store_timeout(&self) -> Duration {
        self.expiry.mul_f64(self.timeout_factor)
    }

    fn drift(&self) -> Duration {
        self.expiry.mul_f64(self.drift_factor) + self.drift_bound
    }

    /// Remaining validity window for a round started at `start`
    ///
    /// Zero means the round took too long: a quorum may have been written,
    /// but it cannot be trusted for any useful amount of time.
    fn validity_window(&self, start: Instant) -> Duration {
        let elapsed = self.clock.now().saturating_duration_since(start);
        self.expiry
            .saturating_sub(elapsed)
            .saturating_sub(self.drift())
    }

    fn early_quorum(&self) -> Option<usize> {
        self.fail_fast.then_some(self.quorum)
    }

    async fn cast_acquire(&self, token: &str) -> Round {
        run_round(
            &self.stores,
            self.store_timeout(),
            self.early_quorum(),
            |_, store| {
                let key = self.name.clone();
                let token = token.to_string();
                let ttl = self.expiry;
                Box::pin(async move { store.try_acquire(&key, &token, ttl).await })
            },
        )
        .await
    }

    async fn cast_extend(&self, token: &str) -> Round {
        let set_nx = self.set_nx_on_extend;
        run_round(
            &self.stores,
            self.store_timeout(),
            self.early_quorum(),
            |_, store| {
                let key = self.name.clone();
                let token = token.to_string();
                let ttl = self.expiry;
                Box::pin(async move {
                    match store.try_extend(&key, &token, ttl).await? {
                        ExtendStatus::Extended => Ok(true),
                        // Single fallback within the same round: the key is
                        // gone, so a fresh conditional write is still safe.
                        ExtendStatus::NotFound if set_nx => {
                            store.try_acquire(&key, &token, ttl).await
                        }
                        ExtendStatus::NotFound | ExtendStatus::TokenMismatch => Ok(false),
                    }
                })
            },
        )
        .await
    }

    /// Best-effort release against the given store indexes
    ///
    /// Used to clean up partial grants after a failed attempt. Failures are
    /// logged and dropped; the affected keys self-expire via their TTL.
    async fn release_subset(&self, token: &str, indexes: Vec<usize>) {
        if indexes.is_empty() {
            return;
        }
        let subset: Vec<Arc<dyn LockStore>> = indexes
            .iter()
            .map(|&index| Arc::clone(&self.stores[index]))
            .collect();

        let round = run_round(&subset, self.store_timeout(), None, |_, store| {
            let key = self.name.clone();
            let token = token.to_string();
            Box::pin(async move { store.try_release(&key, &token).await })
        })
        .await;

        for vote in round.votes() {
            if let Err(error) = &vote.result {
                tracing::debug!(
                    name = %self.name,
                    store = %vote.name,
                    %error,
                    "cleanup release failed"
                );
            }
        }
    }
}

#[cfg(test)]
#[path = "mutex_tests.rs"]
mod tests;
