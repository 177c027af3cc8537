//! # Purge Engine
//!
//! Evicts an entire bucket using one of three mutually exclusive strategies:
//!
//! - **Lazy** (default): atomically rename the bucket to a uniquely generated
//!   garbage key and register that key in the well-known pending-collection
//!   set. An out-of-band sweeper reclaims the renamed hash later, so the
//!   caller never waits on the deletion of a large hash.
//! - **Unlink**: asynchronous delete primitive; the backend reclaims memory
//!   off the command path.
//! - **Del**: synchronous delete.
//!
//! The lazy garbage key embeds the full bucket key inside a routing tag
//! (`gc:{<bucket>}:<uuid>`), which pins it to the bucket's cluster slot so
//! the rename stays a same-slot atomic operation.

use futures::FutureExt;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::PurgeMode;
use crate::constants::GC_PENDING_SET;
use crate::error::Result;
use crate::executor::CommandExecutor;
use crate::store::BucketHandle;

/// Applies the configured purge strategy to a bucket.
#[derive(Debug, Clone)]
pub struct PurgeEngine {
    executor: CommandExecutor,
    mode: PurgeMode,
}

impl PurgeEngine {
    pub fn new(executor: CommandExecutor, mode: PurgeMode) -> Self {
        Self { executor, mode }
    }

    /// Evict the whole bucket. A bucket that does not exist counts as a
    /// successful purge — there was nothing to remove.
    pub async fn purge(&self, bucket: &BucketHandle) -> Result<bool> {
        match self.mode {
            PurgeMode::Lazy => self.purge_lazy(bucket).await,
            PurgeMode::Unlink => self.purge_unlink(bucket).await,
            PurgeMode::Del => self.purge_del(bucket).await,
        }
    }

    /// Rename-and-queue. The rename is the critical step and gets one extra
    /// retry; the set registration rides on the default budget.
    async fn purge_lazy(&self, bucket: &BucketHandle) -> Result<bool> {
        let garbage_key = gc_key(bucket);

        let source = bucket.key().to_string();
        let destination = garbage_key.clone();
        let renamed = self
            .executor
            .execute("rename", 1, move |backend| {
                let source = source.clone();
                let destination = destination.clone();
                async move { backend.rename(&source, &destination).await }.boxed()
            })
            .await;

        match renamed {
            Ok(()) => {}
            Err(error) if error.is_no_such_key() => {
                debug!(bucket = bucket.key(), "Purge found no bucket to rename");
                return Ok(true);
            }
            Err(error) => {
                warn!(bucket = bucket.key(), error = %error, "❌ Lazy purge rename failed");
                return Err(error.into());
            }
        }

        let member = garbage_key.clone();
        self.executor
            .execute("sadd", 0, move |backend| {
                let member = member.clone();
                async move { backend.sadd(GC_PENDING_SET, &member).await }.boxed()
            })
            .await?;

        debug!(bucket = bucket.key(), garbage_key = %garbage_key, "🧹 Bucket queued for lazy collection");
        Ok(true)
    }

    async fn purge_unlink(&self, bucket: &BucketHandle) -> Result<bool> {
        let key = bucket.key().to_string();
        self.executor
            .execute("unlink", 0, move |backend| {
                let key = key.clone();
                async move { backend.unlink(&key).await }.boxed()
            })
            .await?;
        debug!(bucket = bucket.key(), "🧹 Bucket unlinked");
        Ok(true)
    }

    async fn purge_del(&self, bucket: &BucketHandle) -> Result<bool> {
        let key = bucket.key().to_string();
        self.executor
            .execute("del", 0, move |backend| {
                let key = key.clone();
                async move { backend.del(&key).await }.boxed()
            })
            .await?;
        debug!(bucket = bucket.key(), "🧹 Bucket deleted");
        Ok(true)
    }
}

/// Garbage key for a lazily purged bucket: unique per purge, slot-pinned to
/// the bucket via the hash-tag braces.
fn gc_key(bucket: &BucketHandle) -> String {
    format!("gc:{{{}}}:{}", bucket.key(), Uuid::new_v4().simple())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{BackendClient, BackendError};
    use crate::test_helpers::MockBackend;
    use std::sync::Arc;

    fn engine(backend: &MockBackend, mode: PurgeMode) -> PurgeEngine {
        PurgeEngine::new(CommandExecutor::new(Arc::new(backend.clone())), mode)
    }

    fn bucket() -> BucketHandle {
        BucketHandle::new("mdl-appcache-", "core/string")
    }

    #[tokio::test]
    async fn lazy_purge_renames_and_registers_gc_record() {
        let backend = MockBackend::new();
        let bucket = bucket();
        backend
            .hset(bucket.key(), "flange", b"pipe")
            .await
            .unwrap();

        assert!(engine(&backend, PurgeMode::Lazy).purge(&bucket).await.unwrap());

        assert!(!backend.hash_exists(bucket.key()));
        let pending = backend.set_members(GC_PENDING_SET);
        assert_eq!(pending.len(), 1);
        let tag = format!("gc:{{{}}}:", bucket.key());
        assert!(pending[0].starts_with(&tag), "gc key must carry the slot tag: {}", pending[0]);
    }

    #[tokio::test]
    async fn lazy_purge_of_missing_bucket_succeeds() {
        let backend = MockBackend::new();
        assert!(engine(&backend, PurgeMode::Lazy).purge(&bucket()).await.unwrap());
        assert!(backend.set_members(GC_PENDING_SET).is_empty());
    }

    #[tokio::test]
    async fn lazy_purge_rename_gets_one_extra_retry() {
        let backend = MockBackend::new();
        let bucket = bucket();
        backend.hset(bucket.key(), "k", b"v").await.unwrap();

        // Queued after the setup write so the first rename attempt eats it.
        backend.inject_failure(BackendError::Command {
            operation: "rename".to_string(),
            message: "transient".to_string(),
        });

        assert!(engine(&backend, PurgeMode::Lazy).purge(&bucket).await.unwrap());
        assert_eq!(backend.call_count("rename"), 2);
        assert!(!backend.hash_exists(bucket.key()));
    }

    #[tokio::test]
    async fn unlink_purge_removes_bucket() {
        let backend = MockBackend::new();
        let bucket = bucket();
        backend.hset(bucket.key(), "k", b"v").await.unwrap();

        assert!(engine(&backend, PurgeMode::Unlink).purge(&bucket).await.unwrap());
        assert!(!backend.hash_exists(bucket.key()));
        assert_eq!(backend.call_count("unlink"), 1);
    }

    #[tokio::test]
    async fn del_purge_removes_bucket() {
        let backend = MockBackend::new();
        let bucket = bucket();
        backend.hset(bucket.key(), "k", b"v").await.unwrap();

        assert!(engine(&backend, PurgeMode::Del).purge(&bucket).await.unwrap());
        assert!(!backend.hash_exists(bucket.key()));
        assert_eq!(backend.call_count("del"), 1);
    }
}
