//! Release specs
//!
//! Unlock always attempts the release, even when the lock is believed gone.

use crate::prelude::*;

#[tokio::test]
async fn unlock_removes_the_token_from_every_store() {
    let cluster = Cluster::new(5);
    let mut mutex = cluster.manager().mutex("compact").build().unwrap();

    mutex.lock().await.unwrap();
    assert_eq!(cluster.held_count("compact"), 5);

    assert!(mutex.unlock().await.unwrap());
    assert_eq!(cluster.held_count("compact"), 0);
    assert_eq!(mutex.token(), None);
    assert!(!mutex.valid());
}

#[tokio::test]
async fn unlock_after_expiry_is_cleanup_not_an_error() {
    let cluster = Cluster::new(5);
    let mut mutex = cluster.manager().mutex("compact").build().unwrap();

    mutex.lock().await.unwrap();
    // The lock expired everywhere before the owner got around to unlocking
    cluster.clock.advance(Duration::from_secs(9));
    assert!(!mutex.valid());

    // Nothing left to delete: reported as "already unlocked", not a failure
    assert!(!mutex.unlock().await.unwrap());
    assert_eq!(mutex.token(), None);
}

#[tokio::test]
async fn unlock_leaves_a_foreign_owner_untouched() {
    let cluster = Cluster::new(5);
    let mgr = cluster.manager();

    let mut original = mgr.mutex("compact").build().unwrap();
    original.lock().await.unwrap();
    cluster.clock.advance(Duration::from_secs(9));

    // Someone else took the name over after the TTL lapsed
    let mut next = mgr.mutex("compact").build().unwrap();
    next.lock().await.unwrap();
    let next_token = next.token().unwrap().to_string();

    // The stale owner's late unlock must not delete the new owner's keys
    assert!(!original.unlock().await.unwrap());
    assert_eq!(cluster.holders("compact"), vec![Some(next_token); 5]);
    assert!(next.valid());
}
