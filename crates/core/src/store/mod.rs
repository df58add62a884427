// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lock store contract and bundled implementations
//!
//! A lock store is one independent key-value backend. Each operation is an
//! atomic conditional write: acquire only if the key is absent, extend or
//! release only if the stored value still matches the caller's token. The
//! mutex algorithm never trusts any single store; it counts affirmative
//! answers across the whole set.

mod memory;

pub use memory::MemoryStore;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeStore, StoreCall};

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Errors from a single store
///
/// Individual store failures are recorded as votes and never abort a round
/// on their own; the aggregate quorum decides.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// The store did not answer within its per-call budget
    #[error("store call timed out")]
    Timeout,
    /// The store could not be reached or refused the call
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Outcome of a conditional extend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtendStatus {
    /// TTL was reset; the stored value matched the token
    Extended,
    /// The key is gone (expired or deleted); an acquire may be retried
    NotFound,
    /// The key exists but belongs to someone else
    TokenMismatch,
}

/// One independent key-value backend holding `key -> token` pairs with a TTL
///
/// Implementations must be safe for concurrent use by multiple mutexes
/// locking different names. Callers bound every operation with their own
/// timeout; dropping the future cancels the call.
#[async_trait]
pub trait LockStore: Send + Sync + 'static {
    /// Atomically set `key = token` with expiry `ttl`, only if `key` is absent
    async fn try_acquire(&self, key: &str, token: &str, ttl: Duration)
        -> Result<bool, StoreError>;

    /// Atomically reset the TTL of `key`, only if its value equals `token`
    async fn try_extend(
        &self,
        key: &str,
        token: &str,
        ttl: Duration,
    ) -> Result<ExtendStatus, StoreError>;

    /// Atomically delete `key`, only if its value equals `token`
    async fn try_release(&self, key: &str, token: &str) -> Result<bool, StoreError>;

    /// Diagnostic label for logs and vote reports
    fn name(&self) -> &str;
}
