// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! qlock-core: distributed mutual exclusion over unreliable key-value stores
//!
//! This crate provides:
//! - The quorum-voting lock algorithm (acquire, extend, release, validity)
//! - The lock store contract and bundled in-memory implementation
//! - Injectable clock, token, and backoff strategies
//!
//! A lock is held when a strict majority of independent stores carry the
//! same ownership token, so the loss of a minority of stores is tolerated.
//! This is advisory locking: adequate for avoiding duplicate work, not a
//! replacement for a strongly consistent coordination service.

pub mod clock;
pub mod delay;
pub mod manager;
pub mod mutex;
pub mod options;
pub mod round;
pub mod store;
pub mod token;

// Re-exports
pub use clock::{Clock, ManualClock, SystemClock};
pub use delay::{DelayStrategy, FixedDelay, RandomDelay};
pub use manager::{ConfigError, LockManager, MutexBuilder};
pub use mutex::{LockError, Mutex};
pub use options::MutexOptions;
pub use round::{Round, StoreVote};
pub use store::{ExtendStatus, LockStore, MemoryStore, StoreError};
pub use token::{RandomTokenGen, SequentialTokenGen, TokenError, TokenGen};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use store::{FakeStore, StoreCall};
