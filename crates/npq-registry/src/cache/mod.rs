//! Response cache attached to a [`RegistryClient`](crate::RegistryClient)
//!
//! A [`Cache`] pairs a [`KeySerializer`], which turns a request identity into
//! a stable key, with a [`StorageDriver`] that persists validated responses.
//! Entries never expire on their own; they stay until the caller clears them.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use npq_core::utils::hash::sha256_hex;
use serde::Serialize;

pub mod storage;

pub use storage::{FsDriver, MemoryDriver, StorageDriver};

/// Request headers, ordered by name so insertion order never matters
pub type Headers = BTreeMap<String, String>;

/// The parts of a request that determine its response
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct RequestIdentity {
    pub url: String,
    pub headers: Headers,
}

impl RequestIdentity {
    /// Build an identity; absent headers are the same as no headers
    pub fn new(url: impl Into<String>, headers: Option<&Headers>) -> Self {
        Self {
            url: url.into(),
            headers: headers.cloned().unwrap_or_default(),
        }
    }

    /// Canonical JSON form with every object key sorted
    pub fn canonical(&self) -> String {
        serde_json::json!({
            "url": self.url,
            "headers": self.headers,
        })
        .to_string()
    }
}

/// Derives a cache key from a request identity
pub trait KeySerializer: Send + Sync {
    fn serialize(&self, identity: &RequestIdentity) -> String;
}

impl<F> KeySerializer for F
where
    F: Fn(&RequestIdentity) -> String + Send + Sync,
{
    fn serialize(&self, identity: &RequestIdentity) -> String {
        self(identity)
    }
}

/// Default serializer: SHA-256 of the canonical identity, as hex
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256KeySerializer;

impl KeySerializer for Sha256KeySerializer {
    fn serialize(&self, identity: &RequestIdentity) -> String {
        sha256_hex(identity.canonical().as_bytes())
    }
}

/// Key serializer and storage driver used by a client
#[derive(Clone)]
pub struct Cache {
    serializer: Arc<dyn KeySerializer>,
    storage: Arc<dyn StorageDriver>,
}

impl Cache {
    /// Cache with the SHA-256 serializer and a fresh in-memory driver
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Cache backed by the given storage driver
    pub fn with_storage<S: StorageDriver + 'static>(storage: S) -> Self {
        Self::builder().storage(storage).build()
    }

    pub fn builder() -> CacheBuilder {
        CacheBuilder::default()
    }

    pub fn serializer(&self) -> &dyn KeySerializer {
        self.serializer.as_ref()
    }

    pub fn storage(&self) -> &dyn StorageDriver {
        self.storage.as_ref()
    }

    /// Key under which the response to `identity` is stored
    pub fn key_for(&self, identity: &RequestIdentity) -> String {
        self.serializer.serialize(identity)
    }
}

impl Default for Cache {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Cache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cache")
            .field("storage", &self.storage.name())
            .finish_non_exhaustive()
    }
}

/// Builder for [`Cache`] with optional overrides
#[derive(Default)]
pub struct CacheBuilder {
    serializer: Option<Arc<dyn KeySerializer>>,
    storage: Option<Arc<dyn StorageDriver>>,
}

impl CacheBuilder {
    /// Override the key serializer
    pub fn serializer<K: KeySerializer + 'static>(mut self, serializer: K) -> Self {
        self.serializer = Some(Arc::new(serializer));
        self
    }

    /// Override the storage driver
    pub fn storage<S: StorageDriver + 'static>(mut self, storage: S) -> Self {
        self.storage = Some(Arc::new(storage));
        self
    }

    /// Share an existing storage driver, e.g. between several caches
    pub fn shared_storage(mut self, storage: Arc<dyn StorageDriver>) -> Self {
        self.storage = Some(storage);
        self
    }

    pub fn build(self) -> Cache {
        Cache {
            serializer: self.serializer.unwrap_or_else(|| Arc::new(Sha256KeySerializer)),
            storage: self.storage.unwrap_or_else(|| Arc::new(MemoryDriver::new())),
        }
    }
}
