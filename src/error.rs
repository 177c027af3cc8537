//! # Store Error Types
//!
//! Crate-level error taxonomy for the cache store. Backend/wire failures live
//! in [`crate::backend::BackendError`]; this enum is what callers of the store
//! surface see.
//!
//! `Unavailable` is deliberately distinct from every other variant: it means
//! the store never obtained a connection (primary and, if configured,
//! secondary seed lists both failed) and cannot be used at all. The embedding
//! boundary is expected to turn it into its "service unavailable, try again
//! later" response rather than treating it as a recoverable operation error.

use thiserror::Error;

use crate::backend::BackendError;

/// Errors surfaced by the cache store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// No connection could be established from any configured seed list.
    /// Unrecoverable for this store instance; the caller decides whether that
    /// means terminating the request or the process.
    #[error("Cache backend unavailable: {message}")]
    Unavailable { message: String },

    /// A backend command failed after the retry policy was exhausted.
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// A caller-supplied option could not be parsed into its typed form.
    #[error("Configuration error: {option}: {message}")]
    Configuration { option: String, message: String },

    /// An operation was invoked before `initialise` completed successfully.
    #[error("Store not initialised: {operation}")]
    NotInitialised { operation: String },
}

impl StoreError {
    /// True when this error means the store never came up at all.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, StoreError::Unavailable { .. })
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
