// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Ownership token generation
//!
//! The token written to each store is the proof of ownership: extend and
//! release are conditional on the stored value still matching it. Generators
//! are injectable so tests can use predictable tokens and deployments can
//! supply their own scheme.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use thiserror::Error;

/// Error from a token generator
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("token generation failed: {0}")]
    Generation(String),
}

/// Produces ownership tokens
pub trait TokenGen: Send + Sync {
    fn generate(&self) -> Result<String, TokenError>;
}

/// Closures work as generators directly
impl<F> TokenGen for F
where
    F: Fn() -> Result<String, TokenError> + Send + Sync,
{
    fn generate(&self) -> Result<String, TokenError> {
        self()
    }
}

/// Default generator: a cryptographically random UUID v4
///
/// Unguessable to other lock holders, which is what makes the
/// compare-then-delete release safe against accidental cross-owner deletes.
#[derive(Clone, Default)]
pub struct RandomTokenGen;

impl TokenGen for RandomTokenGen {
    fn generate(&self) -> Result<String, TokenError> {
        Ok(uuid::Uuid::new_v4().to_string())
    }
}

/// Deterministic `prefix-N` tokens for tests
#[derive(Clone)]
pub struct SequentialTokenGen {
    prefix: String,
    counter: Arc<AtomicU64>,
}

impl SequentialTokenGen {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            counter: Arc::new(AtomicU64::new(1)),
        }
    }
}

impl Default for SequentialTokenGen {
    fn default() -> Self {
        Self::new("token")
    }
}

impl TokenGen for SequentialTokenGen {
    fn generate(&self) -> Result<String, TokenError> {
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        Ok(format!("{}-{}", self.prefix, n))
    }
}

#[cfg(test)]
#[path = "token_tests.rs"]
mod tests;
