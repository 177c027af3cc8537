//! # Redis Cluster Backend
//!
//! Production [`BackendClient`] implementation over the `redis` crate's
//! async cluster client. One instance owns one logical connection to the
//! cluster; the handle is cheaply cloned per command, the driver owns the
//! actual sockets and slot routing.

use async_trait::async_trait;
use redis::cluster::ClusterClientBuilder;
use redis::cluster_async::ClusterConnection;
use redis::AsyncCommands;
use tracing::{debug, info};

use crate::backend::{BackendClient, BackendError};
use crate::config::{FailoverMode, Serializer, StoreConfig};

/// Async cluster-client wrapper implementing the store's capability contract.
#[derive(Clone)]
pub struct RedisClusterBackend {
    connection: ClusterConnection,
    /// Codec selection carried on the connection; values are stored verbatim
    /// as bytes either way, the option exists for wire-level compatibility
    /// with other clients of the same cluster.
    serializer: Serializer,
}

impl std::fmt::Debug for RedisClusterBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisClusterBackend")
            .field("serializer", &self.serializer)
            .finish_non_exhaustive()
    }
}

impl RedisClusterBackend {
    /// Build a connection to the cluster from one seed list.
    ///
    /// The seed list only bootstraps topology discovery; the client learns
    /// the full cluster from the first reachable endpoint.
    pub async fn connect(seed_list: &[String], config: &StoreConfig) -> Result<Self, BackendError> {
        if seed_list.is_empty() {
            return Err(BackendError::Connection {
                seed_list: String::new(),
                message: "no endpoints configured".to_string(),
            });
        }

        let nodes: Vec<String> = seed_list
            .iter()
            .map(|endpoint| format!("redis://{endpoint}"))
            .collect();

        let mut builder = ClusterClientBuilder::new(nodes)
            .connection_timeout(config.connect_timeout)
            .response_timeout(config.read_timeout);

        // The cluster client exposes a single replica-read knob; both the
        // error and distribute policies enable it, primaries-only leaves it
        // off.
        if config.failover != FailoverMode::None {
            builder = builder.read_from_replicas();
        }

        let client = builder
            .build()
            .map_err(|e| connect_error(seed_list, &e))?;

        let connection = client
            .get_async_connection()
            .await
            .map_err(|e| connect_error(seed_list, &e))?;

        info!(
            endpoints = seed_list.len(),
            persist = config.persist,
            "✅ Connected to Redis cluster"
        );

        Ok(Self {
            connection,
            serializer: config.serializer,
        })
    }

    fn conn(&self) -> ClusterConnection {
        self.connection.clone()
    }
}

fn connect_error(seed_list: &[String], error: &redis::RedisError) -> BackendError {
    BackendError::Connection {
        seed_list: seed_list.join(","),
        message: error.to_string(),
    }
}

/// Classify a command failure, surfacing the conditions the executor and the
/// purge engine key off: slot migration in progress and absent source keys.
fn command_error(operation: &str, key: &str, error: redis::RedisError) -> BackendError {
    let message = error.to_string();
    if error.kind() == redis::ErrorKind::ClusterDown || message.contains("CLUSTERDOWN") {
        return BackendError::ClusterReorganizing { message };
    }
    if message.contains("no such key") {
        return BackendError::NoSuchKey {
            key: key.to_string(),
        };
    }
    BackendError::Command {
        operation: operation.to_string(),
        message,
    }
}

#[async_trait]
impl BackendClient for RedisClusterBackend {
    async fn hget(&self, key: &str, field: &str) -> Result<Option<Vec<u8>>, BackendError> {
        let mut conn = self.conn();
        conn.hget(key, field)
            .await
            .map_err(|e| command_error("hget", key, e))
    }

    async fn hmget(
        &self,
        key: &str,
        fields: &[String],
    ) -> Result<Vec<Option<Vec<u8>>>, BackendError> {
        if fields.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.conn();
        // HMGET with a single field returns a bare bulk reply; going through
        // an explicit command keeps the response shape uniform.
        let mut cmd = redis::cmd("HMGET");
        cmd.arg(key);
        for field in fields {
            cmd.arg(field);
        }
        cmd.query_async(&mut conn)
            .await
            .map_err(|e| command_error("hmget", key, e))
    }

    async fn hset(&self, key: &str, field: &str, value: &[u8]) -> Result<bool, BackendError> {
        let mut conn = self.conn();
        let _created: i64 = conn
            .hset(key, field, value)
            .await
            .map_err(|e| command_error("hset", key, e))?;
        Ok(true)
    }

    async fn hmset(&self, key: &str, pairs: &[(String, Vec<u8>)]) -> Result<(), BackendError> {
        if pairs.is_empty() {
            return Ok(());
        }
        let mut conn = self.conn();
        conn.hset_multiple(key, pairs)
            .await
            .map_err(|e| command_error("hmset", key, e))
    }

    async fn hdel(&self, key: &str, fields: &[String]) -> Result<u64, BackendError> {
        if fields.is_empty() {
            return Ok(0);
        }
        let mut conn = self.conn();
        conn.hdel(key, fields)
            .await
            .map_err(|e| command_error("hdel", key, e))
    }

    async fn hexists(&self, key: &str, field: &str) -> Result<bool, BackendError> {
        let mut conn = self.conn();
        conn.hexists(key, field)
            .await
            .map_err(|e| command_error("hexists", key, e))
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, BackendError> {
        let mut conn = self.conn();
        conn.get(key)
            .await
            .map_err(|e| command_error("get", key, e))
    }

    async fn setnx(&self, key: &str, value: &[u8]) -> Result<bool, BackendError> {
        let mut conn = self.conn();
        conn.set_nx(key, value)
            .await
            .map_err(|e| command_error("setnx", key, e))
    }

    async fn del(&self, key: &str) -> Result<bool, BackendError> {
        let mut conn = self.conn();
        let removed: i64 = conn
            .del(key)
            .await
            .map_err(|e| command_error("del", key, e))?;
        Ok(removed > 0)
    }

    async fn unlink(&self, key: &str) -> Result<bool, BackendError> {
        let mut conn = self.conn();
        let removed: i64 = conn
            .unlink(key)
            .await
            .map_err(|e| command_error("unlink", key, e))?;
        Ok(removed > 0)
    }

    async fn rename(&self, source: &str, destination: &str) -> Result<(), BackendError> {
        let mut conn = self.conn();
        debug!(source, destination, "Renaming bucket");
        conn.rename(source, destination)
            .await
            .map_err(|e| command_error("rename", source, e))
    }

    async fn sadd(&self, key: &str, member: &str) -> Result<bool, BackendError> {
        let mut conn = self.conn();
        let added: i64 = conn
            .sadd(key, member)
            .await
            .map_err(|e| command_error("sadd", key, e))?;
        Ok(added > 0)
    }

    async fn ping(&self) -> Result<(), BackendError> {
        let mut conn = self.conn();
        let _pong: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(|e| command_error("ping", "", e))?;
        Ok(())
    }
}
