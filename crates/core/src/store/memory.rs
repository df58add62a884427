// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-process lock store
//!
//! A real store for single-machine deployments and the honest backend for
//! tests: the TTL and compare-then-mutate semantics match the external
//! contract exactly. Expired entries are treated as absent on every
//! operation, the same way a networked store would report them.

use super::{ExtendStatus, LockStore, StoreError};
use crate::clock::{Clock, SystemClock};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

struct Entry {
    token: String,
    expires_at: Instant,
}

/// In-memory `key -> token` store with TTL expiry
///
/// Clones share the same underlying map, so a test can hand a clone to a
/// mutex and inspect the surviving state through another.
#[derive(Clone)]
pub struct MemoryStore<C: Clock = SystemClock> {
    name: String,
    entries: Arc<Mutex<HashMap<String, Entry>>>,
    clock: C,
}

impl MemoryStore<SystemClock> {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_clock(name, SystemClock)
    }
}

impl<C: Clock> MemoryStore<C> {
    pub fn with_clock(name: impl Into<String>, clock: C) -> Self {
        Self {
            name: name.into(),
            entries: Arc::new(Mutex::new(HashMap::new())),
            clock,
        }
    }

    /// Current live token for `key`, if any
    pub fn holder(&self, key: &str) -> Option<String> {
        let now = self.clock.now();
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries
            .get(key)
            .filter(|entry| entry.expires_at > now)
            .map(|entry| entry.token.clone())
    }

    /// Number of live (unexpired) entries
    pub fn live_count(&self) -> usize {
        let now = self.clock.now();
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.retain(|_, entry| entry.expires_at > now);
        entries.len()
    }

    /// Plant a value directly, bypassing the acquire check
    ///
    /// Used to model a key owned by another party or handed over out of band.
    pub fn seed(&self, key: impl Into<String>, token: impl Into<String>, ttl: Duration) {
        let expires_at = self.clock.now() + ttl;
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.insert(
            key.into(),
            Entry {
                token: token.into(),
                expires_at,
            },
        );
    }

    fn drop_if_expired(entries: &mut HashMap<String, Entry>, key: &str, now: Instant) {
        if entries
            .get(key)
            .is_some_and(|entry| entry.expires_at <= now)
        {
            entries.remove(key);
        }
    }
}

#[async_trait]
impl<C: Clock> LockStore for MemoryStore<C> {
    async fn try_acquire(
        &self,
        key: &str,
        token: &str,
        ttl: Duration,
    ) -> Result<bool, StoreError> {
        let now = self.clock.now();
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        Self::drop_if_expired(&mut entries, key, now);

        if entries.contains_key(key) {
            return Ok(false);
        }
        entries.insert(
            key.to_string(),
            Entry {
                token: token.to_string(),
                expires_at: now + ttl,
            },
        );
        Ok(true)
    }

    async fn try_extend(
        &self,
        key: &str,
        token: &str,
        ttl: Duration,
    ) -> Result<ExtendStatus, StoreError> {
        let now = self.clock.now();
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        Self::drop_if_expired(&mut entries, key, now);

        match entries.get_mut(key) {
            None => Ok(ExtendStatus::NotFound),
            Some(entry) if entry.token == token => {
                entry.expires_at = now + ttl;
                Ok(ExtendStatus::Extended)
            }
            Some(_) => Ok(ExtendStatus::TokenMismatch),
        }
    }

    async fn try_release(&self, key: &str, token: &str) -> Result<bool, StoreError> {
        let now = self.clock.now();
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        Self::drop_if_expired(&mut entries, key, now);

        match entries.get(key) {
            Some(entry) if entry.token == token => {
                entries.remove(key);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
