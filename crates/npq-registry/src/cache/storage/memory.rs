//! # Memory Storage Driver
//!
//! Volatile in-process storage backed by a concurrent hash map.

use async_trait::async_trait;
use dashmap::DashMap;
use npq_core::error::NpqResult;
use serde_json::Value;

use super::StorageDriver;

/// In-memory storage driver; the default for new caches
#[derive(Debug, Default)]
pub struct MemoryDriver {
    entries: DashMap<String, Value>,
}

impl MemoryDriver {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Number of stored entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl StorageDriver for MemoryDriver {
    async fn get(&self, key: &str) -> NpqResult<Option<Value>> {
        Ok(self.entries.get(key).map(|entry| entry.value().clone()))
    }

    async fn set(&self, key: &str, value: Value) -> NpqResult<()> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    async fn list_keys(&self) -> NpqResult<Vec<String>> {
        let mut keys: Vec<String> = self.entries.iter().map(|entry| entry.key().clone()).collect();
        keys.sort();
        Ok(keys)
    }

    async fn remove(&self, key: &str) -> NpqResult<()> {
        self.entries.remove(key);
        Ok(())
    }

    async fn clear(&self) -> NpqResult<()> {
        self.entries.clear();
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
