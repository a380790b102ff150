//! # Storage Drivers
//!
//! This module defines the storage driver trait every cache backend must follow.
//! The request path only uses [`StorageDriver::get`] and [`StorageDriver::set`];
//! the remaining operations serve tooling such as cache snapshots and clearing.

use async_trait::async_trait;
use npq_core::error::NpqResult;
use serde_json::Value;

pub mod fs;
pub mod memory;

pub use fs::FsDriver;
pub use memory::MemoryDriver;

/// Pluggable key/value persistence for validated responses.
///
/// Implementations must tolerate concurrent callers, including concurrent
/// writers to the same key (the last write wins).
#[async_trait]
pub trait StorageDriver: Send + Sync {
    /// Get the value stored under `key`, or `None` when there is none
    async fn get(&self, key: &str) -> NpqResult<Option<Value>>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// The value is persisted by the time this returns.
    async fn set(&self, key: &str, value: Value) -> NpqResult<()>;

    /// List every stored key
    async fn list_keys(&self) -> NpqResult<Vec<String>>;

    /// Remove the entry for `key`, if any
    async fn remove(&self, key: &str) -> NpqResult<()>;

    /// Remove every entry
    async fn clear(&self) -> NpqResult<()>;

    /// Short driver name for logs
    fn name(&self) -> &'static str;
}
