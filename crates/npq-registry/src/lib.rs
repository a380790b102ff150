//! Typed client for the npm registry
//!
//! This crate fetches registry documents (packuments, manifests, download
//! counts, search results, signing keys) and checks every response against a
//! declared shape before returning it. An optional [`Cache`] keyed by request
//! URL and headers keeps validated responses in memory or on disk.

pub mod api;
pub mod cache;
pub mod client;
pub mod snapshot;
pub mod validate;

// Re-export main types
pub use api::{
    AbbreviatedPackument, DownloadPeriod, PackageManifest, Packument, SearchCriteria, SearchResults,
};
pub use cache::{Cache, CacheBuilder, FsDriver, Headers, KeySerializer, MemoryDriver, RequestIdentity, StorageDriver};
pub use client::{
    ClientOptions, RegistryClient, MAX_BULK_PACKAGES, NPM_REGISTRY_API_URL, NPM_REGISTRY_DOWNLOADS_API_URL,
};
pub use validate::Shape;

use npq_core::error::NpqError;

/// Result type for registry operations
pub type RegistryResult<T> = Result<T, NpqError>;
