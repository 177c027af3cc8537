//! # Retrying Command Executor
//!
//! The single choke-point through which every backend command passes. The
//! executor owns the bounded-retry policy: a caller-declared budget of extra
//! attempts for exactly one command, plus a forced immediate retry (after a
//! short randomized pause) when the cluster reports that its slots are being
//! reorganized.
//!
//! The retry budget is an explicit parameter on [`CommandExecutor::execute`],
//! scoped to that one call by construction — there is no setter to forget to
//! reset.

use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use rand::Rng;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::backend::{BackendClient, BackendError};
use crate::constants::CLUSTER_RETRY_DELAY_MS;

/// Routes all backend commands through one connection with bounded retries.
#[derive(Clone)]
pub struct CommandExecutor {
    backend: Arc<dyn BackendClient>,
}

impl std::fmt::Debug for CommandExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandExecutor").finish_non_exhaustive()
    }
}

impl CommandExecutor {
    pub fn new(backend: Arc<dyn BackendClient>) -> Self {
        Self { backend }
    }

    /// Shared handle to the live connection.
    pub fn backend(&self) -> Arc<dyn BackendClient> {
        Arc::clone(&self.backend)
    }

    /// Execute one backend command with `retries` extra attempts beyond the
    /// first.
    ///
    /// A failure classified as "cluster is reorganizing" forces exactly one
    /// additional immediate attempt after a randomized 100–200 ms pause,
    /// charged against the budget but taken regardless of whether any budget
    /// remains. Any other failure consumes the normal budget. The last error
    /// is propagated once all attempts are spent.
    pub async fn execute<T, F>(
        &self,
        operation: &str,
        retries: u32,
        call: F,
    ) -> Result<T, BackendError>
    where
        F: Fn(Arc<dyn BackendClient>) -> BoxFuture<'static, Result<T, BackendError>>,
    {
        let mut budget = i64::from(retries);
        let mut attempts: u32 = 0;
        let mut last_error: Option<BackendError> = None;

        while budget >= 0 {
            budget -= 1;
            attempts += 1;

            match call(self.backend()).await {
                Ok(value) => {
                    debug!(operation, attempts, "✅ Backend command succeeded");
                    return Ok(value);
                }
                Err(error) if error.is_cluster_reorganizing() => {
                    // Slot migration in progress: pause briefly and take one
                    // forced attempt outside the normal loop.
                    budget -= 1;
                    attempts += 1;
                    let delay = cluster_retry_delay();
                    warn!(
                        operation,
                        delay_ms = delay.as_millis() as u64,
                        "⚠️ Cluster reorganizing, forcing one immediate retry"
                    );
                    sleep(delay).await;

                    match call(self.backend()).await {
                        Ok(value) => {
                            debug!(operation, attempts, "✅ Backend command succeeded after forced retry");
                            return Ok(value);
                        }
                        Err(second) => last_error = Some(second),
                    }
                }
                Err(error) => {
                    debug!(operation, attempts, error = %error, "Backend command attempt failed");
                    last_error = Some(error);
                }
            }
        }

        let error = last_error.unwrap_or_else(|| BackendError::Command {
            operation: operation.to_string(),
            message: "no attempts were made".to_string(),
        });
        warn!(operation, attempts, error = %error, "❌ Backend command failed after all attempts");
        Err(error)
    }
}

/// Randomized pause before the forced retry; kept short because the slot
/// migration window is typically sub-second.
fn cluster_retry_delay() -> Duration {
    let (low, high) = CLUSTER_RETRY_DELAY_MS;
    let millis = rand::thread_rng().gen_range(low..=high);
    Duration::from_millis(millis)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::MockBackend;
    use futures::FutureExt;

    fn ping_call() -> impl Fn(Arc<dyn BackendClient>) -> BoxFuture<'static, Result<(), BackendError>>
    {
        |backend| async move { backend.ping().await }.boxed()
    }

    #[tokio::test]
    async fn succeeds_first_attempt_with_zero_retries() {
        let backend = MockBackend::new();
        let executor = CommandExecutor::new(Arc::new(backend.clone()));

        executor.execute("ping", 0, ping_call()).await.unwrap();
        assert_eq!(backend.call_count("ping"), 1);
    }

    #[tokio::test]
    async fn zero_retries_fails_after_single_attempt() {
        let backend = MockBackend::new().with_injected_failure(BackendError::Command {
            operation: "ping".to_string(),
            message: "boom".to_string(),
        });
        let executor = CommandExecutor::new(Arc::new(backend.clone()));

        let result = executor.execute("ping", 0, ping_call()).await;
        assert!(matches!(result, Err(BackendError::Command { .. })));
        assert_eq!(backend.call_count("ping"), 1);
    }

    #[tokio::test]
    async fn budget_consumes_ordinary_failures() {
        let backend = MockBackend::new()
            .with_injected_failure(BackendError::Command {
                operation: "ping".to_string(),
                message: "first".to_string(),
            })
            .with_injected_failure(BackendError::Command {
                operation: "ping".to_string(),
                message: "second".to_string(),
            });
        let executor = CommandExecutor::new(Arc::new(backend.clone()));

        executor.execute("ping", 2, ping_call()).await.unwrap();
        assert_eq!(backend.call_count("ping"), 3);
    }

    #[tokio::test]
    async fn cluster_reorganizing_forces_immediate_retry_without_budget() {
        let backend = MockBackend::new().with_injected_failure(BackendError::ClusterReorganizing {
            message: "CLUSTERDOWN The cluster is down".to_string(),
        });
        let executor = CommandExecutor::new(Arc::new(backend.clone()));

        // retries = 0, but the forced retry still happens and succeeds.
        executor.execute("ping", 0, ping_call()).await.unwrap();
        assert_eq!(backend.call_count("ping"), 2);
    }

    #[tokio::test]
    async fn forced_retry_failure_falls_back_to_remaining_budget() {
        let backend = MockBackend::new()
            .with_injected_failure(BackendError::ClusterReorganizing {
                message: "CLUSTERDOWN".to_string(),
            })
            .with_injected_failure(BackendError::ClusterReorganizing {
                message: "CLUSTERDOWN".to_string(),
            });
        let executor = CommandExecutor::new(Arc::new(backend.clone()));

        // Attempt 1 fails (cluster down), forced attempt 2 fails too; both
        // decrements drain a budget of 2, leaving one final attempt.
        executor.execute("ping", 2, ping_call()).await.unwrap();
        assert_eq!(backend.call_count("ping"), 3);
    }

    #[tokio::test]
    async fn exhaustion_propagates_last_error() {
        let backend = MockBackend::new()
            .with_injected_failure(BackendError::Command {
                operation: "ping".to_string(),
                message: "first".to_string(),
            })
            .with_injected_failure(BackendError::Command {
                operation: "ping".to_string(),
                message: "last".to_string(),
            });
        let executor = CommandExecutor::new(Arc::new(backend.clone()));

        let error = executor.execute("ping", 1, ping_call()).await.unwrap_err();
        match error {
            BackendError::Command { message, .. } => assert_eq!(message, "last"),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(backend.call_count("ping"), 2);
    }
}
