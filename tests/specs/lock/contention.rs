//! Contention specs
//!
//! Two owners over the same store set: only one can hold a name at a time.

use crate::prelude::*;

#[tokio::test]
async fn second_owner_cannot_acquire_a_held_name() {
    let cluster = Cluster::new(5);
    let mgr = cluster.manager();

    let mut first = mgr.mutex("deploy").build().unwrap();
    first.lock().await.unwrap();

    let mut second = mgr
        .mutex("deploy")
        .with_tries(3)
        .with_retry_delay(Duration::from_millis(1))
        .build()
        .unwrap();

    assert!(second.lock().await.is_err());
    assert!(first.valid());
    assert!(!second.valid());
}

#[tokio::test]
async fn ownership_passes_after_unlock() {
    let cluster = Cluster::new(5);
    let mgr = cluster.manager();

    let mut first = mgr.mutex("deploy").build().unwrap();
    let mut second = mgr
        .mutex("deploy")
        .with_tries(1)
        .build()
        .unwrap();

    first.lock().await.unwrap();
    assert!(second.lock().await.is_err());

    first.unlock().await.unwrap();
    second.lock().await.unwrap();
    assert!(second.valid());
    assert_eq!(
        cluster.holders("deploy"),
        vec![Some(second.token().unwrap().to_string()); 5]
    );
}

#[tokio::test]
async fn ownership_passes_after_ttl_expiry() {
    let cluster = Cluster::new(5);
    let mgr = cluster.manager();

    let mut first = mgr.mutex("deploy").build().unwrap();
    first.lock().await.unwrap();

    // The first owner goes silent past the stores' TTL
    cluster.clock.advance(Duration::from_secs(9));
    assert!(!first.valid());

    let mut second = mgr.mutex("deploy").with_tries(1).build().unwrap();
    second.lock().await.unwrap();
    assert!(second.valid());
}

#[tokio::test]
async fn different_names_do_not_contend() {
    let cluster = Cluster::new(3);
    let mgr = cluster.manager();

    let mut one = mgr.mutex("deploy").build().unwrap();
    let mut other = mgr.mutex("backup").build().unwrap();

    one.lock().await.unwrap();
    other.lock().await.unwrap();

    assert!(one.valid());
    assert!(other.valid());
    assert_eq!(cluster.held_count("deploy"), 3);
    assert_eq!(cluster.held_count("backup"), 3);
}
