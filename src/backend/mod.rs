//! # Backend Capability Layer
//!
//! [`BackendClient`] is the closed capability set the store needs from the
//! clustered key-value backend: hash-map operations for bucket fields, a
//! handful of primitive key operations for purge and locking, and a ping.
//! The store never names commands as strings; every capability is a typed
//! method on this trait, and the production implementation
//! ([`redis_cluster::RedisClusterBackend`]) is swapped for a mock in tests.
//!
//! All methods take logical (already prefixed) keys and raw byte values; the
//! serialization codec is the connection's concern, not the trait's.

pub mod redis_cluster;

use async_trait::async_trait;
use thiserror::Error;

pub use redis_cluster::RedisClusterBackend;

/// Errors raised by the backend wire layer.
#[derive(Error, Debug, Clone)]
pub enum BackendError {
    /// Connection could not be established from a seed list.
    #[error("Connection failed for seed list [{seed_list}]: {message}")]
    Connection { seed_list: String, message: String },

    /// The cluster is reorganizing its slots; the command may succeed if
    /// retried shortly.
    #[error("Cluster is reorganizing, try later: {message}")]
    ClusterReorganizing { message: String },

    /// A source key required by the command does not exist (e.g. rename).
    #[error("No such key: {key}")]
    NoSuchKey { key: String },

    /// Any other command failure: network blip, malformed command, codec
    /// error inside the client library.
    #[error("Backend command failed: {operation}: {message}")]
    Command { operation: String, message: String },
}

impl BackendError {
    /// True for the transient slot-migration condition the executor is
    /// allowed to retry immediately.
    pub fn is_cluster_reorganizing(&self) -> bool {
        matches!(self, BackendError::ClusterReorganizing { .. })
    }

    /// True when a required source key was simply absent.
    pub fn is_no_such_key(&self) -> bool {
        matches!(self, BackendError::NoSuchKey { .. })
    }
}

/// Capability contract over the clustered backend.
///
/// One live implementation exists per store instance; the executor routes
/// every command through it. Implementations must be safe to share behind an
/// `Arc` (the client library owns any internal synchronization) and
/// debug-printable so results carrying a connection handle are too.
#[async_trait]
pub trait BackendClient: Send + Sync + std::fmt::Debug {
    // Hash-map operations (bucket fields).

    async fn hget(&self, key: &str, field: &str) -> Result<Option<Vec<u8>>, BackendError>;

    /// Bulk field read; the result has the same length and order as `fields`.
    async fn hmget(
        &self,
        key: &str,
        fields: &[String],
    ) -> Result<Vec<Option<Vec<u8>>>, BackendError>;

    /// Returns true when the write was acknowledged by the backend.
    async fn hset(&self, key: &str, field: &str, value: &[u8]) -> Result<bool, BackendError>;

    async fn hmset(&self, key: &str, pairs: &[(String, Vec<u8>)]) -> Result<(), BackendError>;

    /// Returns the number of fields actually removed.
    async fn hdel(&self, key: &str, fields: &[String]) -> Result<u64, BackendError>;

    async fn hexists(&self, key: &str, field: &str) -> Result<bool, BackendError>;

    // Primitive key operations (locks, purge).

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, BackendError>;

    /// Atomic set-if-not-exists; true iff this call created the key.
    async fn setnx(&self, key: &str, value: &[u8]) -> Result<bool, BackendError>;

    /// Synchronous delete; true iff the key existed.
    async fn del(&self, key: &str) -> Result<bool, BackendError>;

    /// Asynchronous delete; true iff the key existed when unlinked.
    async fn unlink(&self, key: &str) -> Result<bool, BackendError>;

    /// Atomic rename; both keys must route to the same cluster slot.
    /// Fails with [`BackendError::NoSuchKey`] when `source` is absent.
    async fn rename(&self, source: &str, destination: &str) -> Result<(), BackendError>;

    /// Add a member to a set; true iff the member was newly added.
    async fn sadd(&self, key: &str, member: &str) -> Result<bool, BackendError>;

    async fn ping(&self) -> Result<(), BackendError>;
}
