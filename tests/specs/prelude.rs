//! Shared harness for behavioral specs

pub use qlock_core::{
    FakeStore, LockError, LockManager, LockStore, ManualClock, MemoryStore,
};
pub use std::sync::Arc;
pub use std::time::Duration;

/// A set of in-memory stores sharing one manual clock
pub struct Cluster {
    pub clock: ManualClock,
    pub stores: Vec<MemoryStore<ManualClock>>,
}

impl Cluster {
    pub fn new(size: usize) -> Self {
        let clock = ManualClock::new();
        let stores = (0..size)
            .map(|i| MemoryStore::with_clock(format!("node-{}", i), clock.clone()))
            .collect();
        Self { clock, stores }
    }

    pub fn manager(&self) -> LockManager<ManualClock> {
        LockManager::with_clock(as_dyn(&self.stores), self.clock.clone())
    }

    /// Live token per store for `key`, in store order
    pub fn holders(&self, key: &str) -> Vec<Option<String>> {
        self.stores.iter().map(|s| s.holder(key)).collect()
    }

    /// How many stores currently hold a live value for `key`
    pub fn held_count(&self, key: &str) -> usize {
        self.holders(key).iter().filter(|h| h.is_some()).count()
    }
}

pub fn as_dyn<S: LockStore + Clone>(stores: &[S]) -> Vec<Arc<dyn LockStore>> {
    stores
        .iter()
        .map(|s| Arc::new(s.clone()) as Arc<dyn LockStore>)
        .collect()
}

pub fn fake_stores(size: usize, clock: &ManualClock) -> Vec<FakeStore<ManualClock>> {
    (0..size)
        .map(|i| FakeStore::with_clock(format!("flaky-{}", i), clock.clone()))
        .collect()
}

/// Manager over an explicit mixed store set
pub fn manager_over(
    stores: Vec<Arc<dyn LockStore>>,
    clock: &ManualClock,
) -> LockManager<ManualClock> {
    LockManager::with_clock(stores, clock.clone())
}
