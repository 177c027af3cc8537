//! # Advisory Lock Manager
//!
//! Non-reentrant, single-owner distributed lock built from primitive key
//! operations. A lock is nothing more than a plain top-level key whose value
//! is the owner identifier: existence means held, value names the holder.
//! Lock keys live under the store prefix but are independent of the bucket
//! hash.
//!
//! No TTL is managed here; keys persist until released or expired by the
//! backend itself. `release` re-checks ownership first so a lock re-acquired
//! by someone else after this owner expired is never deleted from under them.

use futures::FutureExt;
use tracing::debug;

use crate::error::Result;
use crate::executor::CommandExecutor;

/// Acquire/check/release over prefixed top-level lock keys.
#[derive(Debug, Clone)]
pub struct LockManager {
    executor: CommandExecutor,
    prefix: String,
}

impl LockManager {
    pub fn new(executor: CommandExecutor, prefix: impl Into<String>) -> Self {
        Self {
            executor,
            prefix: prefix.into(),
        }
    }

    fn lock_key(&self, name: &str) -> String {
        format!("{}{}", self.prefix, name)
    }

    /// Atomic set-if-not-exists; true iff this call created the lock.
    pub async fn acquire(&self, name: &str, owner: &str) -> Result<bool> {
        let key = self.lock_key(name);
        let value = owner.as_bytes().to_vec();
        let acquired = self
            .executor
            .execute("setnx", 0, move |backend| {
                let key = key.clone();
                let value = value.clone();
                async move { backend.setnx(&key, &value).await }.boxed()
            })
            .await?;
        debug!(lock = name, owner, acquired, "🔒 Lock acquire");
        Ok(acquired)
    }

    /// Current lock state from this owner's point of view:
    /// `Some(true)` held by `owner`, `Some(false)` held by someone else,
    /// `None` free.
    pub async fn check(&self, name: &str, owner: &str) -> Result<Option<bool>> {
        let key = self.lock_key(name);
        let value = self
            .executor
            .execute("get", 0, move |backend| {
                let key = key.clone();
                async move { backend.get(&key).await }.boxed()
            })
            .await?;
        Ok(value.map(|holder| holder == owner.as_bytes()))
    }

    /// Delete the lock only when `owner` still holds it; false otherwise.
    pub async fn release(&self, name: &str, owner: &str) -> Result<bool> {
        if self.check(name, owner).await? != Some(true) {
            debug!(lock = name, owner, "🔒 Release refused, lock not held by owner");
            return Ok(false);
        }

        let key = self.lock_key(name);
        self.executor
            .execute("del", 0, move |backend| {
                let key = key.clone();
                async move { backend.del(&key).await }.boxed()
            })
            .await?;
        debug!(lock = name, owner, "🔓 Lock released");
        Ok(true)
    }
}
