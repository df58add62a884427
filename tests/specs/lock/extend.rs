//! Renewal specs
//!
//! Extend keeps a lock alive past its initial TTL without ever releasing it.

use crate::prelude::*;

#[tokio::test]
async fn extend_keeps_the_lock_alive_past_the_initial_ttl() {
    let cluster = Cluster::new(5);
    let mut mutex = cluster.manager().mutex("reindex").build().unwrap();

    mutex.lock().await.unwrap();
    let token = mutex.token().unwrap().to_string();

    // Renew twice, each time near the end of the window
    for _ in 0..2 {
        cluster.clock.advance(Duration::from_secs(6));
        mutex.extend().await.unwrap();
        assert!(mutex.valid());
    }

    // Twelve seconds in, well past the original 8s TTL, still held everywhere
    assert_eq!(cluster.holders("reindex"), vec![Some(token); 5]);
}

#[tokio::test]
async fn extend_fails_once_the_keys_are_gone() {
    let cluster = Cluster::new(5);
    let mut mutex = cluster.manager().mutex("reindex").build().unwrap();

    mutex.lock().await.unwrap();
    cluster.clock.advance(Duration::from_secs(9));

    let err = mutex.extend().await.unwrap_err();
    assert!(matches!(err, LockError::ExtendFailed { granted: 0, .. }));
    assert_eq!(cluster.held_count("reindex"), 0);
}

#[tokio::test]
async fn extend_reacquires_lost_keys_with_set_nx() {
    let cluster = Cluster::new(5);
    let mut mutex = cluster
        .manager()
        .mutex("reindex")
        .with_set_nx_on_extend(true)
        .build()
        .unwrap();

    mutex.lock().await.unwrap();
    let token = mutex.token().unwrap().to_string();
    cluster.clock.advance(Duration::from_secs(9));
    assert_eq!(cluster.held_count("reindex"), 0);

    mutex.extend().await.unwrap();
    assert!(mutex.valid());
    assert_eq!(cluster.holders("reindex"), vec![Some(token); 5]);
}

#[tokio::test]
async fn extend_cannot_touch_a_foreign_owner() {
    let cluster = Cluster::new(5);
    for store in &cluster.stores {
        store.seed("reindex", "someone-else", Duration::from_secs(60));
    }

    let mut mutex = cluster
        .manager()
        .mutex("reindex")
        .with_token("mine")
        .build()
        .unwrap();

    assert!(mutex.extend().await.is_err());
    assert_eq!(
        cluster.holders("reindex"),
        vec![Some("someone-else".to_string()); 5]
    );
}
