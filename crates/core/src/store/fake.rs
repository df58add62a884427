// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fault-injecting store for tests
//!
//! Wraps a [`MemoryStore`], records every call, and injects the failure
//! modes the algorithm has to survive: refused acquires, unreachable
//! backends, and stores that answer too slowly.

use super::{ExtendStatus, LockStore, MemoryStore, StoreError};
use crate::clock::{Clock, SystemClock};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Recorded call to a store method
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    Acquire { key: String, token: String },
    Extend { key: String, token: String },
    Release { key: String, token: String },
}

#[derive(Default)]
struct Behavior {
    refuse_acquires: bool,
    fail_operations: bool,
    stall: Option<Duration>,
}

#[derive(Default)]
struct FakeState {
    behavior: Behavior,
    calls: Vec<StoreCall>,
}

/// Store wrapper with call recording and configurable failure modes
#[derive(Clone)]
pub struct FakeStore<C: Clock = SystemClock> {
    inner: MemoryStore<C>,
    state: Arc<Mutex<FakeState>>,
}

impl FakeStore<SystemClock> {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_clock(name, SystemClock)
    }
}

impl<C: Clock> FakeStore<C> {
    pub fn with_clock(name: impl Into<String>, clock: C) -> Self {
        Self {
            inner: MemoryStore::with_clock(name, clock),
            state: Arc::new(Mutex::new(FakeState::default())),
        }
    }

    /// Answer every acquire with "already held" without touching state
    pub fn refuse_acquires(&self, refuse: bool) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.behavior.refuse_acquires = refuse;
    }

    /// Fail every operation with [`StoreError::Unavailable`]
    pub fn fail_operations(&self, fail: bool) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.behavior.fail_operations = fail;
    }

    /// Delay every answer by `latency`
    pub fn stall_for(&self, latency: Duration) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.behavior.stall = Some(latency);
    }

    /// All calls recorded so far
    pub fn calls(&self) -> Vec<StoreCall> {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.calls.clone()
    }

    /// Number of acquire calls recorded so far
    pub fn acquire_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, StoreCall::Acquire { .. }))
            .count()
    }

    /// The wrapped store, for inspecting surviving state
    pub fn memory(&self) -> &MemoryStore<C> {
        &self.inner
    }

    fn record(&self, call: StoreCall) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.calls.push(call);
    }

    async fn gate(&self) -> Result<(), StoreError> {
        let (stall, fail) = {
            let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
            (state.behavior.stall, state.behavior.fail_operations)
        };
        if let Some(latency) = stall {
            tokio::time::sleep(latency).await;
        }
        if fail {
            return Err(StoreError::Unavailable("injected failure".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl<C: Clock> LockStore for FakeStore<C> {
    async fn try_acquire(
        &self,
        key: &str,
        token: &str,
        ttl: Duration,
    ) -> Result<bool, StoreError> {
        self.record(StoreCall::Acquire {
            key: key.to_string(),
            token: token.to_string(),
        });
        self.gate().await?;

        let refuse = {
            let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
            state.behavior.refuse_acquires
        };
        if refuse {
            return Ok(false);
        }
        self.inner.try_acquire(key, token, ttl).await
    }

    async fn try_extend(
        &self,
        key: &str,
        token: &str,
        ttl: Duration,
    ) -> Result<ExtendStatus, StoreError> {
        self.record(StoreCall::Extend {
            key: key.to_string(),
            token: token.to_string(),
        });
        self.gate().await?;
        self.inner.try_extend(key, token, ttl).await
    }

    async fn try_release(&self, key: &str, token: &str) -> Result<bool, StoreError> {
        self.record(StoreCall::Release {
            key: key.to_string(),
            token: token.to_string(),
        });
        self.gate().await?;
        self.inner.try_release(key, token).await
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
