//! # Store Configuration
//!
//! Resolves the host framework's option mapping into a typed, immutable
//! [`StoreConfig`]. Resolution is a pure overlay: caller-supplied values win
//! over defaults, but only when they are actually present and non-empty — an
//! empty string never overrides a default.
//!
//! ## Option keys
//!
//! `server`, `serversecondary`, `failover`, `persist`, `prefix`, `purgemode`,
//! `readtimeout`, `serializer`, `session`, `timeout` — see
//! [`crate::constants::options`].

use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{options, DEFAULT_CONNECT_TIMEOUT, DEFAULT_READ_TIMEOUT};
use crate::error::{Result, StoreError};

/// Policy governing whether commands may be served by replica nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailoverMode {
    /// Primaries only.
    #[default]
    None,
    /// Fall back to a replica when the primary errors.
    Error,
    /// Distribute reads across primaries and replicas.
    Distribute,
}

impl FromStr for FailoverMode {
    type Err = String;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        match value.to_lowercase().as_str() {
            "none" => Ok(Self::None),
            "error" => Ok(Self::Error),
            "distribute" => Ok(Self::Distribute),
            _ => Err(format!("Unknown failover mode: {value}")),
        }
    }
}

/// Strategy used when an entire bucket is evicted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PurgeMode {
    /// Rename the bucket to a garbage key and queue it for the sweeper.
    #[default]
    Lazy,
    /// Asynchronous delete (backend reclaims memory off the command path).
    Unlink,
    /// Synchronous delete.
    Del,
}

impl FromStr for PurgeMode {
    type Err = String;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        match value.to_lowercase().as_str() {
            "lazy" => Ok(Self::Lazy),
            "unlink" => Ok(Self::Unlink),
            "del" => Ok(Self::Del),
            _ => Err(format!("Unknown purge mode: {value}")),
        }
    }
}

/// Serialization codec option handed through to the backend connection.
///
/// The codec itself is the backend client's concern; the store only carries
/// the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Serializer {
    /// Backend-native binary codec.
    #[default]
    Binary,
    /// JSON codec for cross-language readability.
    Json,
}

impl FromStr for Serializer {
    type Err = String;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        match value.to_lowercase().as_str() {
            "binary" | "default" => Ok(Self::Binary),
            "json" => Ok(Self::Json),
            _ => Err(format!("Unknown serializer: {value}")),
        }
    }
}

/// Immutable store configuration, built once at construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Primary seed list: cluster entry-point endpoints (`host:port`).
    pub servers: Vec<String>,

    /// Optional secondary seed list tried when the primary list fails.
    pub servers_secondary: Option<Vec<String>>,

    /// Replica-read policy.
    pub failover: FailoverMode,

    /// Keep the connection alive across requests.
    pub persist: bool,

    /// Key prefix isolating this deployment's keys.
    pub prefix: String,

    /// Bucket eviction strategy.
    pub purge_mode: PurgeMode,

    /// Per-command read timeout.
    pub read_timeout: Duration,

    /// Connection establishment timeout.
    pub connect_timeout: Duration,

    /// Value codec selection, passed through to the backend connection.
    pub serializer: Serializer,

    /// Session mode: prefix keys with the bare prefix instead of
    /// `prefix + store name + "-"`.
    pub session: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            servers: Vec::new(),
            servers_secondary: None,
            failover: FailoverMode::None,
            persist: false,
            prefix: String::new(),
            purge_mode: PurgeMode::Lazy,
            read_timeout: DEFAULT_READ_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            serializer: Serializer::Binary,
            session: false,
        }
    }
}

impl StoreConfig {
    /// Overlay caller-supplied options onto the defaults.
    ///
    /// Only present, non-empty values override; unparsable values for typed
    /// options surface as [`StoreError::Configuration`].
    pub fn resolve(options_map: &HashMap<String, String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(servers) = non_empty(options_map, options::SERVER) {
            config.servers = parse_seed_list(servers);
        }
        if let Some(secondary) = non_empty(options_map, options::SERVER_SECONDARY) {
            config.servers_secondary = Some(parse_seed_list(secondary));
        }
        if let Some(failover) = non_empty(options_map, options::FAILOVER) {
            config.failover = parse_option(options::FAILOVER, failover)?;
        }
        if let Some(persist) = non_empty(options_map, options::PERSIST) {
            config.persist = parse_flag(persist);
        }
        if let Some(prefix) = non_empty(options_map, options::PREFIX) {
            config.prefix = prefix.to_string();
        }
        if let Some(purge_mode) = non_empty(options_map, options::PURGE_MODE) {
            config.purge_mode = parse_option(options::PURGE_MODE, purge_mode)?;
        }
        if let Some(read_timeout) = non_empty(options_map, options::READ_TIMEOUT) {
            if let Some(duration) = parse_seconds(options::READ_TIMEOUT, read_timeout)? {
                config.read_timeout = duration;
            }
        }
        if let Some(timeout) = non_empty(options_map, options::TIMEOUT) {
            if let Some(duration) = parse_seconds(options::TIMEOUT, timeout)? {
                config.connect_timeout = duration;
            }
        }
        if let Some(serializer) = non_empty(options_map, options::SERIALIZER) {
            config.serializer = parse_option(options::SERIALIZER, serializer)?;
        }
        if let Some(session) = non_empty(options_map, options::SESSION) {
            config.session = parse_flag(session);
        }

        Ok(config)
    }

    /// Key prefix installed for a store with the given name.
    ///
    /// Session-mode stores share the bare deployment prefix; ordinary stores
    /// get a per-store segment so two stores never collide.
    pub fn key_prefix(&self, store_name: &str) -> String {
        if self.session {
            self.prefix.clone()
        } else {
            format!("{}{}-", self.prefix, store_name)
        }
    }
}

fn non_empty<'a>(map: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    map.get(key).map(String::as_str).filter(|v| !v.is_empty())
}

/// Split a comma-separated seed list into endpoints, dropping blank entries.
fn parse_seed_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn parse_option<T: FromStr<Err = String>>(option: &str, value: &str) -> Result<T> {
    value.parse().map_err(|message| StoreError::Configuration {
        option: option.to_string(),
        message,
    })
}

/// Truthy parsing for flag options; mirrors the loose typing of the host
/// framework's form values.
fn parse_flag(value: &str) -> bool {
    matches!(value.to_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

/// Parse a timeout in (fractional) seconds. A zero value counts as absent —
/// like an empty string, it leaves the default in place.
fn parse_seconds(option: &str, value: &str) -> Result<Option<Duration>> {
    let seconds: f64 = value.parse().map_err(|_| StoreError::Configuration {
        option: option.to_string(),
        message: format!("not a number of seconds: {value}"),
    })?;
    if !seconds.is_finite() || seconds < 0.0 {
        return Err(StoreError::Configuration {
            option: option.to_string(),
            message: format!("timeout out of range: {value}"),
        });
    }
    if seconds == 0.0 {
        return Ok(None);
    }
    Ok(Some(Duration::from_secs_f64(seconds)))
}
