//! # Redis Cluster Cache Store
//!
//! The store maps one logical cache "bucket" per cache definition onto a
//! single remote hash, prefixed for isolation. All reads, writes and deletes
//! are hash-field operations against that one hash, funneled through the
//! retrying [`CommandExecutor`].
//!
//! ## Lifecycle
//!
//! The host framework constructs the store from a name and an option map
//! (connection is established eagerly; an unreachable cluster is fatal for
//! the construction attempt), then calls [`RedisClusterStore::initialise`]
//! with the cache definition identity. Operations before `initialise` fail
//! with [`StoreError::NotInitialised`]. `instance_deleted` purges the bucket
//! and releases the connection; `close` only releases the connection.
//!
//! Absence is never an error: `get` returns `None` and `has` returns `false`
//! for keys that simply are not there.

use std::collections::HashMap;

use futures::FutureExt;
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use crate::backend::BackendClient;
use crate::config::StoreConfig;
use crate::connector::ClusterConnector;
use crate::error::{Result, StoreError};
use crate::executor::CommandExecutor;
use crate::lock::LockManager;
use crate::purge::PurgeEngine;

/// Identifies the remote hash used for one cache definition: the store's key
/// prefix plus a digest of the definition identity. The digest is stable
/// across process restarts, so every instance of the same definition lands on
/// the same bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketHandle {
    key: String,
}

impl BucketHandle {
    pub fn new(key_prefix: &str, definition_id: &str) -> Self {
        let digest = Sha256::digest(definition_id.as_bytes());
        let mut hash = String::with_capacity(digest.len() * 2);
        for byte in digest {
            hash.push_str(&format!("{byte:02x}"));
        }
        Self {
            key: format!("{key_prefix}{hash}"),
        }
    }

    /// The fully-prefixed remote hash key.
    pub fn key(&self) -> &str {
        &self.key
    }
}

/// Resilient cache store over a clustered hash-based backend.
pub struct RedisClusterStore {
    name: String,
    config: StoreConfig,
    key_prefix: String,
    executor: Option<CommandExecutor>,
    bucket: Option<BucketHandle>,
}

impl std::fmt::Debug for RedisClusterStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisClusterStore")
            .field("name", &self.name)
            .field("key_prefix", &self.key_prefix)
            .field("initialised", &self.bucket.is_some())
            .field("ready", &self.executor.is_some())
            .finish()
    }
}

impl RedisClusterStore {
    /// Construct a store from the host framework's option map and connect to
    /// the cluster.
    ///
    /// Connection failure (after the optional secondary seed-list retry) is
    /// [`StoreError::Unavailable`]: this store instance can never become
    /// ready, and the embedding boundary should surface its
    /// service-unavailable response.
    pub async fn new(name: impl Into<String>, options: &HashMap<String, String>) -> Result<Self> {
        let name = name.into();
        let config = StoreConfig::resolve(options)?;
        let backend = ClusterConnector::new(config.clone()).connect().await?;
        info!(store = %name, "🚀 Cache store ready");
        Ok(Self::assemble(name, config, backend))
    }

    /// Construct a store over an injected backend, bypassing the connector.
    /// This is the testing seam; production code always goes through
    /// [`RedisClusterStore::new`].
    pub fn for_testing(
        name: impl Into<String>,
        config: StoreConfig,
        backend: std::sync::Arc<dyn BackendClient>,
    ) -> Self {
        Self::assemble(name.into(), config, backend)
    }

    fn assemble(
        name: String,
        config: StoreConfig,
        backend: std::sync::Arc<dyn BackendClient>,
    ) -> Self {
        let key_prefix = config.key_prefix(&name);
        Self {
            name,
            config,
            key_prefix,
            executor: Some(CommandExecutor::new(backend)),
            bucket: None,
        }
    }

    /// Bind this store to one cache definition. The bucket handle is fixed
    /// for the lifetime of the instance; repeated calls are ignored.
    pub fn initialise(&mut self, definition_id: &str) {
        if self.bucket.is_some() {
            warn!(store = %self.name, "initialise called twice, keeping existing bucket");
            return;
        }
        let bucket = BucketHandle::new(&self.key_prefix, definition_id);
        debug!(store = %self.name, bucket = bucket.key(), "Store initialised");
        self.bucket = Some(bucket);
    }

    pub fn is_initialised(&self) -> bool {
        self.bucket.is_some()
    }

    /// True once a connection was established and not yet released.
    pub fn is_ready(&self) -> bool {
        self.executor.is_some()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Round-trip a ping over the live connection.
    pub async fn check_connection(&self) -> Result<()> {
        let value = self
            .executor()?
            .execute("ping", 0, |backend| {
                async move { backend.ping().await }.boxed()
            })
            .await?;
        Ok(value)
    }

    // Feature and mode negotiation for the host framework.

    /// The backend confirms writes, so data-guarantee semantics hold.
    pub fn supports_data_guarantee() -> bool {
        true
    }

    /// Values cross a serialization boundary; callers always receive copies,
    /// never shared mutable references.
    pub fn dereferences_objects() -> bool {
        true
    }

    /// Application-level caching only at the generic level; the internal
    /// session flag changes key prefixing, nothing else.
    pub fn supports_session_mode() -> bool {
        false
    }

    fn executor(&self) -> Result<&CommandExecutor> {
        self.executor.as_ref().ok_or_else(|| StoreError::Unavailable {
            message: "connection released".to_string(),
        })
    }

    fn bucket(&self) -> Result<&BucketHandle> {
        self.bucket.as_ref().ok_or_else(|| StoreError::NotInitialised {
            operation: "bucket operation before initialise".to_string(),
        })
    }

    /// Read one field from the bucket; `None` when absent.
    pub async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let bucket = self.bucket()?.key().to_string();
        let field = key.to_string();
        let value = self
            .executor()?
            .execute("hget", 0, move |backend| {
                let bucket = bucket.clone();
                let field = field.clone();
                async move { backend.hget(&bucket, &field).await }.boxed()
            })
            .await?;
        Ok(value)
    }

    /// Bulk read preserving input order and count; absent keys come back as
    /// `None`. A backend failure degrades to all-missing rather than
    /// propagating, matching the best-effort contract of single-key reads.
    pub async fn get_many(&self, keys: &[String]) -> Result<Vec<Option<Vec<u8>>>> {
        let bucket = self.bucket()?.key().to_string();
        let fields = keys.to_vec();
        let result = self
            .executor()?
            .execute("hmget", 0, move |backend| {
                let bucket = bucket.clone();
                let fields = fields.clone();
                async move { backend.hmget(&bucket, &fields).await }.boxed()
            })
            .await;

        match result {
            Ok(values) => Ok(values),
            Err(error) => {
                warn!(store = %self.name, error = %error, "Bulk read failed, degrading to all-missing");
                Ok(vec![None; keys.len()])
            }
        }
    }

    /// Write one field; true when the backend acknowledged the write.
    pub async fn set(&self, key: &str, value: &[u8]) -> Result<bool> {
        let bucket = self.bucket()?.key().to_string();
        let field = key.to_string();
        let value = value.to_vec();
        let acknowledged = self
            .executor()?
            .execute("hset", 0, move |backend| {
                let bucket = bucket.clone();
                let field = field.clone();
                let value = value.clone();
                async move { backend.hset(&bucket, &field, &value).await }.boxed()
            })
            .await?;
        Ok(acknowledged)
    }

    /// Bulk write. Duplicate keys collapse to last-write-wins before sending;
    /// returns the number of pairs sent (not individually verified).
    pub async fn set_many(&self, pairs: &[(String, Vec<u8>)]) -> Result<usize> {
        let mut collapsed: HashMap<&str, &[u8]> = HashMap::with_capacity(pairs.len());
        for (key, value) in pairs {
            collapsed.insert(key.as_str(), value.as_slice());
        }
        let to_send: Vec<(String, Vec<u8>)> = collapsed
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_vec()))
            .collect();
        let sent = to_send.len();
        if sent == 0 {
            return Ok(0);
        }

        let bucket = self.bucket()?.key().to_string();
        self.executor()?
            .execute("hmset", 0, move |backend| {
                let bucket = bucket.clone();
                let to_send = to_send.clone();
                async move { backend.hmset(&bucket, &to_send).await }.boxed()
            })
            .await?;
        Ok(sent)
    }

    /// Delete one field; true when something was removed.
    pub async fn delete(&self, key: &str) -> Result<bool> {
        let keys = [key.to_string()];
        Ok(self.delete_many(&keys).await? > 0)
    }

    /// Delete several fields; returns the count removed.
    pub async fn delete_many(&self, keys: &[String]) -> Result<u64> {
        if keys.is_empty() {
            return Ok(0);
        }
        let bucket = self.bucket()?.key().to_string();
        let fields = keys.to_vec();
        let removed = self
            .executor()?
            .execute("hdel", 0, move |backend| {
                let bucket = bucket.clone();
                let fields = fields.clone();
                async move { backend.hdel(&bucket, &fields).await }.boxed()
            })
            .await?;
        Ok(removed)
    }

    /// Field existence check; absence is a value, not an error.
    pub async fn has(&self, key: &str) -> Result<bool> {
        let bucket = self.bucket()?.key().to_string();
        let field = key.to_string();
        let exists = self
            .executor()?
            .execute("hexists", 0, move |backend| {
                let bucket = bucket.clone();
                let field = field.clone();
                async move { backend.hexists(&bucket, &field).await }.boxed()
            })
            .await?;
        Ok(exists)
    }

    /// True iff at least one key exists. Issued as sequential `has` checks
    /// that short-circuit on the first hit — one round trip per key by
    /// design, which keeps small lookups cheap but does not scale to large
    /// key sets.
    pub async fn has_any(&self, keys: &[String]) -> Result<bool> {
        for key in keys {
            if self.has(key).await? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// True iff every key exists. Sequential `has` checks, short-circuiting
    /// on the first miss; same round-trip trade-off as [`Self::has_any`].
    pub async fn has_all(&self, keys: &[String]) -> Result<bool> {
        for key in keys {
            if !self.has(key).await? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Evict the whole bucket using the configured purge strategy.
    pub async fn purge(&self) -> Result<bool> {
        let engine = PurgeEngine::new(self.executor()?.clone(), self.config.purge_mode);
        engine.purge(self.bucket()?).await
    }

    /// Advisory locks under this store's key prefix.
    pub fn locks(&self) -> Result<LockManager> {
        Ok(LockManager::new(
            self.executor()?.clone(),
            self.key_prefix.clone(),
        ))
    }

    /// Release the connection without purging.
    pub fn close(&mut self) {
        if self.executor.take().is_some() {
            debug!(store = %self.name, "Cache store connection released");
        }
    }

    /// The definition instance is being deleted: purge the bucket, then
    /// release the connection.
    pub async fn instance_deleted(mut self) -> Result<()> {
        self.purge().await?;
        self.close();
        Ok(())
    }
}
