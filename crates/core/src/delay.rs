// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Inter-attempt backoff strategies
//!
//! The delay between acquisition attempts is injectable. The default is a
//! uniformly random delay, which spreads out retries from competing clients
//! so they do not keep colliding on the same schedule.

use rand::Rng;
use std::time::Duration;

/// Computes the delay before retry number `attempt` (1-based)
pub trait DelayStrategy: Send + Sync {
    fn delay(&self, attempt: u32) -> Duration;
}

/// Closures work as strategies directly
impl<F> DelayStrategy for F
where
    F: Fn(u32) -> Duration + Send + Sync,
{
    fn delay(&self, attempt: u32) -> Duration {
        self(attempt)
    }
}

/// Uniformly random delay in `[min, max)`
#[derive(Clone, Debug)]
pub struct RandomDelay {
    min: Duration,
    max: Duration,
}

impl RandomDelay {
    pub fn new(min: Duration, max: Duration) -> Self {
        Self { min, max }
    }
}

impl DelayStrategy for RandomDelay {
    fn delay(&self, _attempt: u32) -> Duration {
        if self.min >= self.max {
            return self.min;
        }
        let span = (self.max - self.min).as_millis() as u64;
        self.min + Duration::from_millis(rand::rng().random_range(0..span))
    }
}

/// Constant delay between attempts
#[derive(Clone, Debug)]
pub struct FixedDelay(pub Duration);

impl DelayStrategy for FixedDelay {
    fn delay(&self, _attempt: u32) -> Duration {
        self.0
    }
}

#[cfg(test)]
#[path = "delay_tests.rs"]
mod tests;
