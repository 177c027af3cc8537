//! The advisory lock protocol end to end, through the store's lock manager.

mod common;

use cachestore_rediscluster::PurgeMode;
use common::mock_store;

#[tokio::test]
async fn full_ownership_protocol() {
    let (store, _backend) = mock_store(PurgeMode::Lazy);
    let locks = store.locks().unwrap();

    // First acquire wins, second owner is refused.
    assert!(locks.acquire("build", "owner-1").await.unwrap());
    assert!(!locks.acquire("build", "owner-2").await.unwrap());

    // Tri-state check.
    assert_eq!(locks.check("build", "owner-1").await.unwrap(), Some(true));
    assert_eq!(locks.check("build", "owner-2").await.unwrap(), Some(false));
    assert_eq!(locks.check("other", "owner-1").await.unwrap(), None);

    // Wrong owner cannot release; the lock stays held.
    assert!(!locks.release("build", "owner-2").await.unwrap());
    assert_eq!(locks.check("build", "owner-1").await.unwrap(), Some(true));

    // The owner releases, the lock is free again.
    assert!(locks.release("build", "owner-1").await.unwrap());
    assert_eq!(locks.check("build", "owner-1").await.unwrap(), None);
}

#[tokio::test]
async fn lock_reacquired_by_another_owner_is_protected() {
    let (store, _backend) = mock_store(PurgeMode::Lazy);
    let locks = store.locks().unwrap();

    locks.acquire("build", "owner-1").await.unwrap();
    locks.release("build", "owner-1").await.unwrap();
    locks.acquire("build", "owner-2").await.unwrap();

    // owner-1's stale release attempt must not evict owner-2.
    assert!(!locks.release("build", "owner-1").await.unwrap());
    assert_eq!(locks.check("build", "owner-2").await.unwrap(), Some(true));
}

#[tokio::test]
async fn locks_are_independent_of_bucket_data() {
    let (store, backend) = mock_store(PurgeMode::Del);
    let locks = store.locks().unwrap();

    store.set("flange", b"pipe").await.unwrap();
    locks.acquire("build", "owner-1").await.unwrap();

    store.purge().await.unwrap();

    // Purging the bucket does not disturb lock keys.
    assert_eq!(locks.check("build", "owner-1").await.unwrap(), Some(true));
    assert!(!store.has("flange").await.unwrap());
    assert!(backend.string_value("mdl-appcache-build").is_some());
}
