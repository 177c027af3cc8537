//! # Cluster Connector
//!
//! Builds the store's single live connection from the configured seed lists.
//! Failover here is seed-list-level only: when the primary list cannot
//! produce a connection and a secondary list is configured, the full
//! construction is retried once against the secondary (an entirely alternate
//! cluster topology). Command-level transients like slot reorganization are
//! the executor's job, never a reconnect.
//!
//! Both lists failing is unrecoverable for this store instance and surfaces
//! as [`StoreError::Unavailable`]; the embedding boundary owns the
//! service-unavailable response and any termination policy.

use std::sync::Arc;

use tracing::{info, warn};

use crate::backend::{BackendClient, RedisClusterBackend};
use crate::config::StoreConfig;
use crate::error::{Result, StoreError};

/// Produces a live connection or fails fatally.
#[derive(Debug, Clone)]
pub struct ClusterConnector {
    config: StoreConfig,
}

impl ClusterConnector {
    pub fn new(config: StoreConfig) -> Self {
        Self { config }
    }

    /// Connect using the primary seed list, falling back to the secondary
    /// list once when one is configured.
    pub async fn connect(&self) -> Result<Arc<dyn BackendClient>> {
        match RedisClusterBackend::connect(&self.config.servers, &self.config).await {
            Ok(backend) => {
                info!(seed_list = "primary", "🚀 Cache store connection established");
                Ok(Arc::new(backend))
            }
            Err(primary_error) => {
                let Some(secondary) = self.config.servers_secondary.as_deref() else {
                    return Err(StoreError::Unavailable {
                        message: format!("primary seed list failed: {primary_error}"),
                    });
                };

                warn!(
                    error = %primary_error,
                    "⚠️ Primary seed list failed, retrying against secondary"
                );

                match RedisClusterBackend::connect(secondary, &self.config).await {
                    Ok(backend) => {
                        info!(seed_list = "secondary", "🚀 Cache store connection established");
                        Ok(Arc::new(backend))
                    }
                    Err(secondary_error) => Err(StoreError::Unavailable {
                        message: format!(
                            "primary seed list failed: {primary_error}; secondary seed list failed: {secondary_error}"
                        ),
                    }),
                }
            }
        }
    }
}
