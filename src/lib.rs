#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Redis Cluster Cache Store
//!
//! Resilient client layer over a clustered, hash-based key-value backend,
//! designed to sit behind a generic caching abstraction as a pluggable store.
//! Each cache definition gets one logical "bucket" backed by a single remote
//! hash, prefixed for isolation.
//!
//! ## Architecture
//!
//! Control flow: caller → [`store::RedisClusterStore`] (or
//! [`lock::LockManager`]) → [`executor::CommandExecutor`] → the live
//! [`backend::BackendClient`] connection. Configuration feeds the
//! [`connector::ClusterConnector`] at construction time only.
//!
//! - **Connection** — one per store instance, built from a primary seed list
//!   with an optional secondary-list failover. Both lists failing is
//!   unrecoverable ([`error::StoreError::Unavailable`]); the embedding
//!   boundary decides what "service unavailable" means for its transport.
//! - **Retries** — every backend command passes through the executor, which
//!   owns the bounded-retry budget and the forced immediate retry for the
//!   transient "cluster is reorganizing" condition.
//! - **Purge** — three strategies for evicting a whole bucket: lazy
//!   rename-and-queue (default), asynchronous unlink, synchronous del.
//! - **Locks** — advisory single-owner locks built from primitive
//!   set-if-not-exists / get / delete key operations.
//!
//! ## Module Organization
//!
//! - [`config`] - option-map resolution into a typed [`config::StoreConfig`]
//! - [`backend`] - the backend capability trait and the redis-rs cluster client
//! - [`connector`] - seed-list connection establishment and failover
//! - [`executor`] - the single retrying choke-point for backend commands
//! - [`store`] - store lifecycle and bucket get/set/delete/has operations
//! - [`purge`] - bucket eviction strategies and the lazy GC record
//! - [`lock`] - advisory lock acquire/check/release
//! - [`error`] - structured error handling
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::collections::HashMap;
//! use cachestore_rediscluster::RedisClusterStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let options = HashMap::from([
//!     ("server".to_string(), "redis1:7000,redis2:7000".to_string()),
//!     ("prefix".to_string(), "mdl-".to_string()),
//! ]);
//!
//! let mut store = RedisClusterStore::new("appcache", &options).await?;
//! store.initialise("core/string");
//!
//! store.set("flange", b"pipe").await?;
//! assert_eq!(store.get("flange").await?, Some(b"pipe".to_vec()));
//! store.purge().await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Concurrency Model
//!
//! One command in flight per store instance: callers await each operation to
//! completion, and the only intentional sleep is the short randomized pause
//! before a forced cluster-reorganization retry. A store instance is meant
//! for a single logical caller; concurrent callers should hold one instance
//! each (the backend cluster handles cross-client concurrency).

pub mod backend;
pub mod config;
pub mod connector;
pub mod constants;
pub mod error;
pub mod executor;
pub mod lock;
pub mod logging;
pub mod purge;
pub mod store;
pub mod test_helpers;

pub use backend::{BackendClient, BackendError, RedisClusterBackend};
pub use config::{FailoverMode, PurgeMode, Serializer, StoreConfig};
pub use connector::ClusterConnector;
pub use error::{Result, StoreError};
pub use executor::CommandExecutor;
pub use lock::LockManager;
pub use purge::PurgeEngine;
pub use store::{BucketHandle, RedisClusterStore};
