//! Cache snapshots
//!
//! A snapshot is the list of entries held by a cache's storage driver. It can
//! be written to a gzip-compressed JSON file and later imported into another
//! cache, for example to ship a warm cache with a CI job or to move entries
//! between the memory and filesystem drivers.

use std::io::{Read, Write};

use camino::Utf8Path;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use npq_core::error::{NpqError, NpqResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::cache::Cache;

/// Snapshot format version written to files
pub const SNAPSHOT_VERSION: u32 = 1;

/// Largest decompressed snapshot `decode` accepts (256 MiB)
pub const MAX_SNAPSHOT_BYTES: u64 = 256 * 1024 * 1024;

/// One stored response
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SnapshotEntry {
    pub key: String,
    pub value: Value,
}

#[derive(Debug, Deserialize, Serialize)]
struct SnapshotFile {
    version: u32,
    entries: Vec<SnapshotEntry>,
}

/// Collect every entry of `cache`, ordered by key
pub async fn export(cache: &Cache) -> NpqResult<Vec<SnapshotEntry>> {
    let storage = cache.storage();
    let mut entries = Vec::new();
    for key in storage.list_keys().await? {
        // An entry removed since listing is skipped
        if let Some(value) = storage.get(&key).await? {
            entries.push(SnapshotEntry { key, value });
        }
    }
    entries.sort_by(|a, b| a.key.cmp(&b.key));
    Ok(entries)
}

/// Store `entries` in `cache`, overwriting entries with the same key.
///
/// Returns the number of entries written.
pub async fn import(cache: &Cache, entries: Vec<SnapshotEntry>) -> NpqResult<usize> {
    let storage = cache.storage();
    let count = entries.len();
    for entry in entries {
        storage.set(&entry.key, entry.value).await?;
    }
    Ok(count)
}

/// Encode entries as gzip-compressed JSON
pub fn encode(entries: &[SnapshotEntry]) -> NpqResult<Vec<u8>> {
    let file = SnapshotFile {
        version: SNAPSHOT_VERSION,
        entries: entries.to_vec(),
    };
    let json = serde_json::to_vec(&file)
        .map_err(|e| NpqError::storage("Failed to encode snapshot".to_string(), e))?;

    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(&json)
        .map_err(|e| NpqError::io("Failed to compress snapshot".to_string(), e))?;
    encoder
        .finish()
        .map_err(|e| NpqError::io("Failed to compress snapshot".to_string(), e))
}

/// Decode entries from gzip-compressed JSON
pub fn decode(bytes: &[u8]) -> NpqResult<Vec<SnapshotEntry>> {
    decode_with_limit(bytes, MAX_SNAPSHOT_BYTES)
}

fn decode_with_limit(bytes: &[u8], limit: u64) -> NpqResult<Vec<SnapshotEntry>> {
    let mut json = Vec::new();
    GzDecoder::new(bytes)
        .take(limit.saturating_add(1))
        .read_to_end(&mut json)
        .map_err(|e| NpqError::io("Failed to decompress snapshot".to_string(), e))?;
    if json.len() as u64 > limit {
        return Err(NpqError::Storage {
            message: format!("Snapshot expands beyond {limit} bytes"),
            source: None,
        });
    }

    let file: SnapshotFile = serde_json::from_slice(&json)
        .map_err(|e| NpqError::storage("Snapshot is not valid JSON".to_string(), e))?;
    if file.version != SNAPSHOT_VERSION {
        return Err(NpqError::Storage {
            message: format!(
                "Unsupported snapshot version {} (expected {SNAPSHOT_VERSION})",
                file.version
            ),
            source: None,
        });
    }
    Ok(file.entries)
}

/// Export `cache` into a snapshot file at `path`
pub async fn write_snapshot(cache: &Cache, path: &Utf8Path) -> NpqResult<usize> {
    let entries = export(cache).await?;
    let bytes = encode(&entries)?;
    tokio::fs::write(path, bytes)
        .await
        .map_err(|e| NpqError::io(format!("Failed to write snapshot {path}"), e))?;
    info!(path = %path, entries = entries.len(), "Wrote cache snapshot");
    Ok(entries.len())
}

/// Import the snapshot file at `path` into `cache`
pub async fn read_snapshot(cache: &Cache, path: &Utf8Path) -> NpqResult<usize> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| NpqError::io(format!("Failed to read snapshot {path}"), e))?;
    let count = import(cache, decode(&bytes)?).await?;
    info!(path = %path, entries = count, "Imported cache snapshot");
    Ok(count)
}
