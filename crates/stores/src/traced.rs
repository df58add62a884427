// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced store wrapper for consistent observability

use async_trait::async_trait;
use qlock_core::store::{ExtendStatus, LockStore, StoreError};
use std::time::Duration;

/// Wrapper that adds tracing to any LockStore
#[derive(Clone)]
pub struct TracedStore<S> {
    inner: S,
}

impl<S> TracedStore<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<S: LockStore> LockStore for TracedStore<S> {
    async fn try_acquire(
        &self,
        key: &str,
        token: &str,
        ttl: Duration,
    ) -> Result<bool, StoreError> {
        let span = tracing::debug_span!("store.acquire", store = self.inner.name(), key);
        let _guard = span.enter();

        let start = std::time::Instant::now();
        let result = self.inner.try_acquire(key, token, ttl).await;
        let elapsed = start.elapsed();

        match &result {
            Ok(acquired) => tracing::debug!(
                acquired,
                ttl_ms = ttl.as_millis() as u64,
                elapsed_ms = elapsed.as_millis() as u64,
                "acquire answered"
            ),
            Err(e) => tracing::warn!(
                elapsed_ms = elapsed.as_millis() as u64,
                error = %e,
                "acquire failed"
            ),
        }

        result
    }

    async fn try_extend(
        &self,
        key: &str,
        token: &str,
        ttl: Duration,
    ) -> Result<ExtendStatus, StoreError> {
        let span = tracing::debug_span!("store.extend", store = self.inner.name(), key);
        let _guard = span.enter();

        let result = self.inner.try_extend(key, token, ttl).await;

        match &result {
            Ok(status) => tracing::debug!(status = ?status, "extend answered"),
            Err(e) => tracing::warn!(error = %e, "extend failed"),
        }

        result
    }

    async fn try_release(&self, key: &str, token: &str) -> Result<bool, StoreError> {
        let span = tracing::debug_span!("store.release", store = self.inner.name(), key);
        let _guard = span.enter();

        let result = self.inner.try_release(key, token).await;

        match &result {
            Ok(released) => tracing::debug!(released, "release answered"),
            // release failing is often acceptable (key already expired)
            Err(e) => tracing::warn!(error = %e, "release failed (may be expected)"),
        }

        result
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
