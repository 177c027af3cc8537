//! # Store Constants
//!
//! Option keys, default values, and well-known backend keys shared across the
//! store. Option keys mirror the names the host framework uses in its
//! configuration mapping.

use std::time::Duration;

/// Configuration option keys as supplied by the host framework.
pub mod options {
    pub const SERVER: &str = "server";
    pub const SERVER_SECONDARY: &str = "serversecondary";
    pub const FAILOVER: &str = "failover";
    pub const PERSIST: &str = "persist";
    pub const PREFIX: &str = "prefix";
    pub const PURGE_MODE: &str = "purgemode";
    pub const READ_TIMEOUT: &str = "readtimeout";
    pub const SERIALIZER: &str = "serializer";
    pub const SESSION: &str = "session";
    pub const TIMEOUT: &str = "timeout";
}

/// Connect timeout applied when the caller does not supply one.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_millis(3000);

/// Read timeout applied when the caller does not supply one.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_millis(3000);

/// Well-known set holding bucket keys renamed away by lazy purge and awaiting
/// collection by the out-of-band sweeper. Deliberately unprefixed so a single
/// sweeper serves every store instance on the cluster.
pub const GC_PENDING_SET: &str = "gc:pending";

/// Lower and upper bounds (milliseconds) for the randomized pause before the
/// forced retry after a "cluster is reorganizing" failure.
pub const CLUSTER_RETRY_DELAY_MS: (u64, u64) = (100, 200);
