// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Quorum voting round
//!
//! One lock operation fans out to every store concurrently and tallies the
//! answers as they arrive. Each store call runs in its own task bounded by
//! the per-store timeout; a timeout becomes a [`StoreError::Timeout`] vote
//! rather than an abort. In fail-fast mode collection stops at the first
//! affirmative quorum and stragglers are left to finish in the background —
//! their store-side effects are safe because every write carries a TTL.

use crate::store::{LockStore, StoreError};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Owned per-store operation future, spawnable on the runtime
pub(crate) type StoreOp = Pin<Box<dyn Future<Output = Result<bool, StoreError>> + Send>>;

/// One store's answer within a round
#[derive(Debug, Clone)]
pub struct StoreVote {
    /// Index of the store in the mutex's store set
    pub store: usize,
    /// Diagnostic label of the store
    pub name: String,
    /// `Ok(true)` grants the operation; anything else does not
    pub result: Result<bool, StoreError>,
}

impl StoreVote {
    pub fn granted(&self) -> bool {
        matches!(self.result, Ok(true))
    }
}

/// Tally of one voting round
#[derive(Debug)]
pub struct Round {
    total: usize,
    votes: Vec<StoreVote>,
}

impl Round {
    pub(crate) fn new(total: usize) -> Self {
        Self {
            total,
            votes: Vec::with_capacity(total),
        }
    }

    pub(crate) fn record(&mut self, vote: StoreVote) {
        self.votes.push(vote);
    }

    /// Number of affirmative votes received
    pub fn granted(&self) -> usize {
        self.votes.iter().filter(|vote| vote.granted()).count()
    }

    /// Indexes of the stores that granted, for targeted cleanup
    pub fn granted_stores(&self) -> Vec<usize> {
        self.votes
            .iter()
            .filter(|vote| vote.granted())
            .map(|vote| vote.store)
            .collect()
    }

    /// Whether any store answered with an error (including timeouts)
    pub fn has_errors(&self) -> bool {
        self.votes.iter().any(|vote| vote.result.is_err())
    }

    /// Whether every store's answer was collected
    pub fn is_complete(&self) -> bool {
        self.votes.len() == self.total
    }

    pub fn votes(&self) -> &[StoreVote] {
        &self.votes
    }

    pub fn into_votes(self) -> Vec<StoreVote> {
        self.votes
    }
}

/// Fan an operation out to every store and collect votes
///
/// `early_quorum` switches on fail-fast collection: once that many grants
/// have arrived the round returns without waiting for the rest. Outstanding
/// tasks keep running; their sends land in a closed channel and are dropped.
pub(crate) async fn run_round<F>(
    stores: &[Arc<dyn LockStore>],
    per_op_timeout: Duration,
    early_quorum: Option<usize>,
    op: F,
) -> Round
where
    F: Fn(usize, Arc<dyn LockStore>) -> StoreOp,
{
    let (tx, mut rx) = mpsc::channel(stores.len().max(1));

    for (index, store) in stores.iter().enumerate() {
        let name = store.name().to_string();
        let fut = op(index, Arc::clone(store));
        let tx = tx.clone();
        tokio::spawn(async move {
            let result = match tokio::time::timeout(per_op_timeout, fut).await {
                Ok(result) => result,
                Err(_) => Err(StoreError::Timeout),
            };
            let _ = tx
                .send(StoreVote {
                    store: index,
                    name,
                    result,
                })
                .await;
        });
    }
    drop(tx);

    let mut round = Round::new(stores.len());
    while let Some(vote) = rx.recv().await {
        round.record(vote);
        if let Some(quorum) = early_quorum {
            if round.granted() >= quorum {
                break;
            }
        }
    }
    round
}

#[cfg(test)]
#[path = "round_tests.rs"]
mod tests;
