//! Lock acquisition specs
//!
//! Verify quorum acquisition, failure below quorum, and token hand-off.

use crate::prelude::*;

#[tokio::test]
async fn acquire_writes_the_same_token_to_every_store() {
    let cluster = Cluster::new(5);
    let mut mutex = cluster.manager().mutex("batch-17").build().unwrap();

    mutex.lock().await.unwrap();

    let token = mutex.token().unwrap().to_string();
    assert_eq!(cluster.holders("batch-17"), vec![Some(token); 5]);
    assert!(mutex.valid());
}

#[tokio::test]
async fn acquire_tolerates_a_minority_of_unreachable_stores() {
    let clock = ManualClock::new();
    let healthy = Cluster {
        clock: clock.clone(),
        stores: (0..3)
            .map(|i| MemoryStore::with_clock(format!("node-{}", i), clock.clone()))
            .collect(),
    };
    let broken = fake_stores(2, &clock);
    for store in &broken {
        store.fail_operations(true);
    }

    let mut set = as_dyn(&healthy.stores);
    set.extend(as_dyn(&broken));
    let mgr = manager_over(set, &clock);

    let mut mutex = mgr.mutex("batch-17").build().unwrap();
    mutex.lock().await.unwrap();

    assert_eq!(healthy.held_count("batch-17"), 3);
    assert!(mutex.valid());
}

#[tokio::test]
async fn acquire_below_quorum_fails_and_cleans_up() {
    let clock = ManualClock::new();
    let healthy = Cluster {
        clock: clock.clone(),
        stores: (0..2)
            .map(|i| MemoryStore::with_clock(format!("node-{}", i), clock.clone()))
            .collect(),
    };
    let broken = fake_stores(3, &clock);
    for store in &broken {
        store.fail_operations(true);
    }

    let mut set = as_dyn(&healthy.stores);
    set.extend(as_dyn(&broken));
    let mgr = manager_over(set, &clock);

    let mut mutex = mgr
        .mutex("batch-17")
        .with_tries(2)
        .with_retry_delay(Duration::from_millis(1))
        .build()
        .unwrap();

    let err = mutex.lock().await.unwrap_err();
    assert!(matches!(
        err,
        LockError::Failed {
            granted: 2,
            quorum: 3,
            tries: 2,
            ..
        }
    ));
    // The two grants from the final attempt were rolled back
    assert_eq!(healthy.held_count("batch-17"), 0);
}

#[tokio::test]
async fn failure_reports_each_store_outcome() {
    let clock = ManualClock::new();
    let broken = fake_stores(3, &clock);
    for store in &broken {
        store.fail_operations(true);
    }
    let mgr = manager_over(as_dyn(&broken), &clock);

    let mut mutex = mgr
        .mutex("batch-17")
        .with_tries(1)
        .build()
        .unwrap();

    match mutex.lock().await.unwrap_err() {
        LockError::Failed { votes, .. } => {
            assert_eq!(votes.len(), 3);
            assert!(votes.iter().all(|vote| vote.result.is_err()));
        }
        other => panic!("expected Failed, got {:?}", other),
    }
}

#[tokio::test]
async fn a_preassigned_token_is_honored_across_instances() {
    let cluster = Cluster::new(3);
    let mgr = cluster.manager();

    let mut original = mgr.mutex("batch-17").build().unwrap();
    original.lock().await.unwrap();
    let token = original.token().unwrap().to_string();

    // A different instance, handed the same token, owns the same lock
    let mut inheritor = mgr.mutex("batch-17").with_token(token).build().unwrap();
    assert!(inheritor.unlock().await.unwrap());
    assert_eq!(cluster.held_count("batch-17"), 0);
}
