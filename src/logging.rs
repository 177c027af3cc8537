//! # Structured Logging Module
//!
//! Environment-filtered tracing bootstrap for binaries and integration
//! tests. Library code only emits `tracing` events; installing a subscriber
//! is the embedding process's choice, and this helper is idempotent so test
//! binaries can call it freely.

use std::sync::OnceLock;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Initialize console logging honoring `RUST_LOG` (default `info`).
pub fn init_structured_logging() {
    LOGGER_INITIALIZED.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        // Don't panic when a subscriber is already installed (e.g. by the
        // test harness of an embedding crate).
        let _ = tracing_subscriber::registry()
            .with(fmt::layer().with_target(true).with_level(true))
            .with(filter)
            .try_init();
    });
}
