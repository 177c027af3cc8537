//! Bucket operation semantics: round-trips, existence checks, bulk reads and
//! writes, and the best-effort degradation contract of `get_many`.

mod common;

use cachestore_rediscluster::{BackendError, PurgeMode};
use common::{keys, mock_store};
use proptest::prelude::*;

#[tokio::test]
async fn set_then_get_returns_value() {
    let (store, _backend) = mock_store(PurgeMode::Lazy);

    assert!(store.set("flange", b"pipe").await.unwrap());
    assert_eq!(store.get("flange").await.unwrap(), Some(b"pipe".to_vec()));
}

#[tokio::test]
async fn empty_string_values_round_trip() {
    let (store, _backend) = mock_store(PurgeMode::Lazy);

    assert!(store.set("empty", b"").await.unwrap());
    assert_eq!(store.get("empty").await.unwrap(), Some(Vec::new()));
    assert!(store.has("empty").await.unwrap());
}

#[tokio::test]
async fn get_of_absent_key_is_none_not_error() {
    let (store, _backend) = mock_store(PurgeMode::Lazy);
    assert_eq!(store.get("missing").await.unwrap(), None);
}

#[tokio::test]
async fn has_delete_lifecycle() {
    let (store, _backend) = mock_store(PurgeMode::Lazy);

    assert!(!store.has("k").await.unwrap());
    store.set("k", b"v").await.unwrap();
    assert!(store.has("k").await.unwrap());
    assert!(store.delete("k").await.unwrap());
    assert!(!store.has("k").await.unwrap());
    // Deleting again removes nothing.
    assert!(!store.delete("k").await.unwrap());
}

#[tokio::test]
async fn delete_many_reports_count_removed() {
    let (store, _backend) = mock_store(PurgeMode::Lazy);
    store.set("a", b"1").await.unwrap();
    store.set("b", b"2").await.unwrap();

    let removed = store.delete_many(&keys(&["a", "b", "ghost"])).await.unwrap();
    assert_eq!(removed, 2);
}

#[tokio::test]
async fn get_many_preserves_order_and_reports_missing() {
    let (store, _backend) = mock_store(PurgeMode::Lazy);
    store.set("a", b"1").await.unwrap();
    store.set("c", b"3").await.unwrap();

    let values = store.get_many(&keys(&["a", "b", "c"])).await.unwrap();
    assert_eq!(
        values,
        vec![Some(b"1".to_vec()), None, Some(b"3".to_vec())]
    );
}

#[tokio::test]
async fn get_many_degrades_to_missing_on_backend_error() {
    let (store, backend) = mock_store(PurgeMode::Lazy);
    store.set("a", b"1").await.unwrap();

    backend.inject_failure(BackendError::Command {
        operation: "hmget".to_string(),
        message: "connection reset".to_string(),
    });

    // Documented best-effort behavior: the bulk read swallows the failure
    // and reports every key missing instead of propagating.
    let values = store.get_many(&keys(&["a", "b"])).await.unwrap();
    assert_eq!(values, vec![None, None]);
}

#[tokio::test]
async fn has_any_and_has_all_with_overlapping_and_disjoint_sets() {
    let (store, _backend) = mock_store(PurgeMode::Lazy);
    store.set("a", b"1").await.unwrap();
    store.set("b", b"2").await.unwrap();

    // Overlapping: some present, some absent.
    assert!(store.has_any(&keys(&["ghost", "a"])).await.unwrap());
    assert!(!store.has_all(&keys(&["a", "ghost"])).await.unwrap());

    // Fully present.
    assert!(store.has_all(&keys(&["a", "b"])).await.unwrap());

    // Fully disjoint.
    assert!(!store.has_any(&keys(&["x", "y"])).await.unwrap());
    assert!(!store.has_all(&keys(&["x", "y"])).await.unwrap());
}

#[tokio::test]
async fn has_any_short_circuits_one_round_trip_per_key() {
    let (store, backend) = mock_store(PurgeMode::Lazy);
    store.set("a", b"1").await.unwrap();

    let before = backend.call_count("hexists");
    assert!(store.has_any(&keys(&["a", "b", "c"])).await.unwrap());
    // First key hits, so exactly one existence check went out.
    assert_eq!(backend.call_count("hexists") - before, 1);
}

#[tokio::test]
async fn has_all_short_circuits_on_first_miss() {
    let (store, backend) = mock_store(PurgeMode::Lazy);
    store.set("a", b"1").await.unwrap();

    let before = backend.call_count("hexists");
    assert!(!store.has_all(&keys(&["ghost", "a", "b"])).await.unwrap());
    assert_eq!(backend.call_count("hexists") - before, 1);
}

proptest! {
    #[test]
    fn set_get_round_trip_for_arbitrary_values(
        key in "[a-zA-Z0-9_:/.-]{1,48}",
        value in proptest::collection::vec(any::<u8>(), 0..256),
    ) {
        tokio_test::block_on(async {
            let (store, _backend) = mock_store(PurgeMode::Lazy);
            prop_assert!(store.set(&key, &value).await.unwrap());
            prop_assert_eq!(store.get(&key).await.unwrap(), Some(value));
            Ok(())
        })?;
    }
}
