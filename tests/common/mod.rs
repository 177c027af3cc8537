//! Shared setup for integration tests: stores wired over the in-process mock
//! backend, no live cluster required.

#![allow(dead_code)] // not every test binary uses every helper

use std::sync::Arc;

use cachestore_rediscluster::test_helpers::MockBackend;
use cachestore_rediscluster::{PurgeMode, RedisClusterStore, StoreConfig};

pub const DEFINITION: &str = "core/string";

/// An initialised store over a fresh mock backend.
pub fn mock_store(purge_mode: PurgeMode) -> (RedisClusterStore, MockBackend) {
    cachestore_rediscluster::logging::init_structured_logging();
    let backend = MockBackend::new();
    let config = StoreConfig {
        prefix: "mdl-".to_string(),
        purge_mode,
        ..StoreConfig::default()
    };
    let mut store = RedisClusterStore::for_testing("appcache", config, Arc::new(backend.clone()));
    store.initialise(DEFINITION);
    (store, backend)
}

pub fn keys(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}

/// The remote hash key the test store's bucket lands on.
pub fn bucket_key() -> String {
    cachestore_rediscluster::BucketHandle::new("mdl-appcache-", DEFINITION)
        .key()
        .to_string()
}
