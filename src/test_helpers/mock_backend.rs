//! Mock Backend Implementation for Testing
//!
//! In-memory implementation of the [`BackendClient`] trait with a call log
//! and single-shot fault injection. Tests use the call log to pin round-trip
//! counts (e.g. the sequential `has_any` contract) and the injection queue to
//! exercise retry and degrade paths without a live cluster.

use std::collections::{BTreeSet, HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::backend::{BackendClient, BackendError};

/// Mock backend state for tracking calls and simulating behavior
#[derive(Debug, Default)]
pub struct MockBackendState {
    /// Remote hashes: bucket key -> field -> value
    pub hashes: HashMap<String, HashMap<String, Vec<u8>>>,
    /// Plain top-level keys (locks)
    pub strings: HashMap<String, Vec<u8>>,
    /// Sets (the GC pending-collection set)
    pub sets: HashMap<String, BTreeSet<String>>,
    /// Every operation invoked, in order ("hget", "setnx", ...)
    pub call_log: Vec<String>,
    /// Errors returned instead of executing, consumed one per command
    pub injected_failures: VecDeque<BackendError>,
}

/// Shareable mock backend; clones observe the same state.
#[derive(Debug, Clone, Default)]
pub struct MockBackend {
    state: Arc<Mutex<MockBackendState>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an error to be returned by the next command (FIFO across all
    /// operations).
    pub fn with_injected_failure(self, error: BackendError) -> Self {
        self.state.lock().unwrap().injected_failures.push_back(error);
        self
    }

    /// Queue an error after construction.
    pub fn inject_failure(&self, error: BackendError) {
        self.state.lock().unwrap().injected_failures.push_back(error);
    }

    /// Number of times `operation` was invoked (including failed attempts).
    pub fn call_count(&self, operation: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .call_log
            .iter()
            .filter(|entry| entry.as_str() == operation)
            .count()
    }

    /// Full ordered call log.
    pub fn call_log(&self) -> Vec<String> {
        self.state.lock().unwrap().call_log.clone()
    }

    /// True when a hash with this key currently exists.
    pub fn hash_exists(&self, key: &str) -> bool {
        self.state.lock().unwrap().hashes.contains_key(key)
    }

    /// Members of a set key, empty when absent.
    pub fn set_members(&self, key: &str) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .sets
            .get(key)
            .map(|members| members.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Current value of a plain key.
    pub fn string_value(&self, key: &str) -> Option<Vec<u8>> {
        self.state.lock().unwrap().strings.get(key).cloned()
    }

    /// Record the call and pop an injected failure when one is queued.
    fn enter(&self, operation: &str) -> Result<std::sync::MutexGuard<'_, MockBackendState>, BackendError> {
        let mut state = self.state.lock().unwrap();
        state.call_log.push(operation.to_string());
        if let Some(error) = state.injected_failures.pop_front() {
            return Err(error);
        }
        Ok(state)
    }
}

#[async_trait]
impl BackendClient for MockBackend {
    async fn hget(&self, key: &str, field: &str) -> Result<Option<Vec<u8>>, BackendError> {
        let state = self.enter("hget")?;
        Ok(state
            .hashes
            .get(key)
            .and_then(|fields| fields.get(field))
            .cloned())
    }

    async fn hmget(
        &self,
        key: &str,
        fields: &[String],
    ) -> Result<Vec<Option<Vec<u8>>>, BackendError> {
        let state = self.enter("hmget")?;
        let bucket = state.hashes.get(key);
        Ok(fields
            .iter()
            .map(|field| bucket.and_then(|b| b.get(field)).cloned())
            .collect())
    }

    async fn hset(&self, key: &str, field: &str, value: &[u8]) -> Result<bool, BackendError> {
        let mut state = self.enter("hset")?;
        state
            .hashes
            .entry(key.to_string())
            .or_default()
            .insert(field.to_string(), value.to_vec());
        Ok(true)
    }

    async fn hmset(&self, key: &str, pairs: &[(String, Vec<u8>)]) -> Result<(), BackendError> {
        let mut state = self.enter("hmset")?;
        let bucket = state.hashes.entry(key.to_string()).or_default();
        for (field, value) in pairs {
            bucket.insert(field.clone(), value.clone());
        }
        Ok(())
    }

    async fn hdel(&self, key: &str, fields: &[String]) -> Result<u64, BackendError> {
        let mut state = self.enter("hdel")?;
        let mut removed = 0;
        let mut now_empty = false;
        if let Some(bucket) = state.hashes.get_mut(key) {
            for field in fields {
                if bucket.remove(field).is_some() {
                    removed += 1;
                }
            }
            now_empty = bucket.is_empty();
        }
        if now_empty {
            state.hashes.remove(key);
        }
        Ok(removed)
    }

    async fn hexists(&self, key: &str, field: &str) -> Result<bool, BackendError> {
        let state = self.enter("hexists")?;
        Ok(state
            .hashes
            .get(key)
            .is_some_and(|fields| fields.contains_key(field)))
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, BackendError> {
        let state = self.enter("get")?;
        Ok(state.strings.get(key).cloned())
    }

    async fn setnx(&self, key: &str, value: &[u8]) -> Result<bool, BackendError> {
        let mut state = self.enter("setnx")?;
        if state.strings.contains_key(key) {
            return Ok(false);
        }
        state.strings.insert(key.to_string(), value.to_vec());
        Ok(true)
    }

    async fn del(&self, key: &str) -> Result<bool, BackendError> {
        let mut state = self.enter("del")?;
        let existed = state.strings.remove(key).is_some()
            | state.hashes.remove(key).is_some()
            | state.sets.remove(key).is_some();
        Ok(existed)
    }

    async fn unlink(&self, key: &str) -> Result<bool, BackendError> {
        let mut state = self.enter("unlink")?;
        let existed = state.strings.remove(key).is_some()
            | state.hashes.remove(key).is_some()
            | state.sets.remove(key).is_some();
        Ok(existed)
    }

    async fn rename(&self, source: &str, destination: &str) -> Result<(), BackendError> {
        let mut state = self.enter("rename")?;
        if let Some(bucket) = state.hashes.remove(source) {
            state.hashes.insert(destination.to_string(), bucket);
            return Ok(());
        }
        if let Some(value) = state.strings.remove(source) {
            state.strings.insert(destination.to_string(), value);
            return Ok(());
        }
        Err(BackendError::NoSuchKey {
            key: source.to_string(),
        })
    }

    async fn sadd(&self, key: &str, member: &str) -> Result<bool, BackendError> {
        let mut state = self.enter("sadd")?;
        Ok(state
            .sets
            .entry(key.to_string())
            .or_default()
            .insert(member.to_string()))
    }

    async fn ping(&self) -> Result<(), BackendError> {
        let _state = self.enter("ping")?;
        Ok(())
    }
}
