//! # Filesystem Storage Driver
//!
//! Persists each entry as `<root>/<name>.json`, where `<name>` is the key with
//! every byte outside `[A-Za-z0-9_-]` written as `%XX`. Writes go to a temporary file
//! in the same directory and are renamed into place, so readers and concurrent
//! writers only ever see complete values.

use std::io::ErrorKind as IoErrorKind;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use camino::{Utf8Path, Utf8PathBuf};
use npq_core::error::{NpqError, NpqResult};
use serde_json::Value;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use super::StorageDriver;

const ENTRY_EXTENSION: &str = "json";

/// On-disk storage driver
#[derive(Debug)]
pub struct FsDriver {
    /// Directory holding one file per entry
    root: Utf8PathBuf,
    /// Distinguishes temporary files of concurrent writers
    write_counter: AtomicU64,
}

impl FsDriver {
    /// Create a driver rooted at `root`; the directory is created on first write
    pub fn new<P: AsRef<Utf8Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            write_counter: AtomicU64::new(0),
        }
    }

    /// Get the root directory
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    fn entry_path(&self, key: &str) -> Utf8PathBuf {
        self.root.join(format!("{}.{ENTRY_EXTENSION}", encode_key(key)))
    }

    fn temp_path(&self, key: &str) -> Utf8PathBuf {
        let n = self.write_counter.fetch_add(1, Ordering::Relaxed);
        self.root
            .join(format!(".{}.{}.{n}.tmp", encode_key(key), std::process::id()))
    }

    /// Entry file names currently on disk
    async fn entry_files(&self) -> NpqResult<Vec<(String, Utf8PathBuf)>> {
        let mut dir = match fs::read_dir(&self.root).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == IoErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(NpqError::io(format!("Failed to read cache directory {}", self.root), e))
            }
        };

        let mut entries = Vec::new();
        while let Some(entry) = dir
            .next_entry()
            .await
            .map_err(|e| NpqError::io(format!("Failed to read cache directory {}", self.root), e))?
        {
            let Some(file_name) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            let Some(key) = file_name
                .strip_suffix(".json")
                .and_then(decode_key)
            else {
                continue;
            };
            entries.push((key, self.root.join(&file_name)));
        }
        entries.sort();
        Ok(entries)
    }
}

fn is_plain(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_')
}

/// File name for `key`. Dots are escaped too, so no key maps to `.`, `..` or a path.
fn encode_key(key: &str) -> String {
    let mut name = String::with_capacity(key.len());
    for byte in key.bytes() {
        if is_plain(byte) {
            name.push(char::from(byte));
        } else {
            name.push_str(&format!("%{byte:02X}"));
        }
    }
    name
}

/// Key stored under file name `name`; `None` for names this driver never writes
fn decode_key(name: &str) -> Option<String> {
    let mut bytes = Vec::with_capacity(name.len());
    let mut rest = name.as_bytes();
    while let Some((&byte, tail)) = rest.split_first() {
        if byte == b'%' {
            let hex = tail.get(..2)?;
            if !hex.iter().all(|&b| matches!(b, b'0'..=b'9' | b'A'..=b'F')) {
                return None;
            }
            let hex = std::str::from_utf8(hex).ok()?;
            bytes.push(u8::from_str_radix(hex, 16).ok()?);
            rest = &tail[2..];
        } else if is_plain(byte) {
            bytes.push(byte);
            rest = tail;
        } else {
            return None;
        }
    }
    String::from_utf8(bytes).ok()
}

#[async_trait]
impl StorageDriver for FsDriver {
    async fn get(&self, key: &str) -> NpqResult<Option<Value>> {
        let path = self.entry_path(key);
        let bytes = match fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == IoErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(NpqError::io(format!("Failed to read cache entry {path}"), e)),
        };

        let value = serde_json::from_slice(&bytes).map_err(|e| {
            warn!(path = %path, error = %e, "Corrupt cache entry");
            NpqError::storage(format!("Cache entry {path} is not valid JSON"), e)
        })?;
        Ok(Some(value))
    }

    async fn set(&self, key: &str, value: Value) -> NpqResult<()> {
        let path = self.entry_path(key);
        fs::create_dir_all(&self.root)
            .await
            .map_err(|e| NpqError::io(format!("Failed to create cache directory {}", self.root), e))?;

        let bytes = serde_json::to_vec(&value)
            .map_err(|e| NpqError::storage(format!("Failed to encode cache entry {key}"), e))?;

        let temp = self.temp_path(key);
        let mut file = fs::File::create(&temp)
            .await
            .map_err(|e| NpqError::io(format!("Failed to create {temp}"), e))?;
        file.write_all(&bytes)
            .await
            .map_err(|e| NpqError::io(format!("Failed to write {temp}"), e))?;
        file.sync_all()
            .await
            .map_err(|e| NpqError::io(format!("Failed to sync {temp}"), e))?;
        drop(file);

        if let Err(e) = fs::rename(&temp, &path).await {
            let _ = fs::remove_file(&temp).await;
            return Err(NpqError::io(format!("Failed to move cache entry into {path}"), e));
        }
        debug!(path = %path, size = bytes.len(), "Wrote cache entry");
        Ok(())
    }

    async fn list_keys(&self) -> NpqResult<Vec<String>> {
        Ok(self
            .entry_files()
            .await?
            .into_iter()
            .map(|(key, _)| key)
            .collect())
    }

    async fn remove(&self, key: &str) -> NpqResult<()> {
        let path = self.entry_path(key);
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == IoErrorKind::NotFound => Ok(()),
            Err(e) => Err(NpqError::io(format!("Failed to remove cache entry {path}"), e)),
        }
    }

    async fn clear(&self) -> NpqResult<()> {
        for (_, path) in self.entry_files().await? {
            match fs::remove_file(&path).await {
                Ok(()) => {}
                Err(e) if e.kind() == IoErrorKind::NotFound => {}
                Err(e) => {
                    return Err(NpqError::io(format!("Failed to remove cache entry {path}"), e))
                }
            }
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "fs"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use npq_core::error::ErrorKind;
    use serde_json::json;
    use std::sync::Arc;
    use tempfile::tempdir;

    fn driver_in(dir: &tempfile::TempDir) -> FsDriver {
        let root = Utf8PathBuf::from_path_buf(dir.path().join("cache")).unwrap();
        FsDriver::new(root)
    }

    #[tokio::test]
    async fn test_missing_directory_reads_as_empty() {
        let dir = tempdir().unwrap();
        let driver = driver_in(&dir);

        assert_eq!(driver.get("abc").await.unwrap(), None);
        assert!(driver.list_keys().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_set_persists_to_disk() {
        let dir = tempdir().unwrap();
        let driver = driver_in(&dir);
        driver.set("abc", json!({ "name": "npm" })).await.unwrap();

        let on_disk = std::fs::read_to_string(driver.root().join("abc.json")).unwrap();
        assert_eq!(serde_json::from_str::<Value>(&on_disk).unwrap(), json!({ "name": "npm" }));

        // A second driver on the same directory sees the entry
        let other = FsDriver::new(driver.root());
        assert_eq!(other.get("abc").await.unwrap(), Some(json!({ "name": "npm" })));
    }

    #[tokio::test]
    async fn test_overwrite_list_remove_clear() {
        let dir = tempdir().unwrap();
        let driver = driver_in(&dir);
        driver.set("b", json!(1)).await.unwrap();
        driver.set("b", json!(2)).await.unwrap();
        driver.set("a", json!(3)).await.unwrap();

        assert_eq!(driver.get("b").await.unwrap(), Some(json!(2)));
        assert_eq!(driver.list_keys().await.unwrap(), vec!["a", "b"]);

        driver.remove("a").await.unwrap();
        driver.remove("a").await.unwrap();
        assert_eq!(driver.list_keys().await.unwrap(), vec!["b"]);

        driver.clear().await.unwrap();
        assert!(driver.list_keys().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_any_key_round_trips_through_file_names() {
        let dir = tempdir().unwrap();
        let driver = driver_in(&dir);
        let keys = ["", ".", "..", ".hidden", "../escape", "k+/23=", "a b", "50%", "ünïcode"];

        for (i, key) in keys.iter().enumerate() {
            driver.set(key, json!(i)).await.unwrap();
        }
        for (i, key) in keys.iter().enumerate() {
            assert_eq!(driver.get(key).await.unwrap(), Some(json!(i)), "key {key:?}");
        }

        let mut expected: Vec<String> = keys.iter().map(|key| key.to_string()).collect();
        expected.sort();
        let mut listed = driver.list_keys().await.unwrap();
        listed.sort();
        assert_eq!(listed, expected);

        // Nothing escapes the root directory
        assert!(!dir.path().join("escape.json").exists());
        driver.remove("../escape").await.unwrap();
        assert_eq!(driver.get("../escape").await.unwrap(), None);
    }

    #[test]
    fn test_key_encoding() {
        assert_eq!(encode_key("3f9a-b_C"), "3f9a-b_C");
        assert_eq!(encode_key("k+/23="), "k%2B%2F23%3D");
        assert_eq!(encode_key(".."), "%2E%2E");
        assert_eq!(decode_key("k%2B%2F23%3D").as_deref(), Some("k+/23="));
        assert_eq!(decode_key("%2"), None);
        assert_eq!(decode_key("%zz"), None);
        assert_eq!(decode_key("k%2b"), None);
        assert_eq!(decode_key("has.dot"), None);
    }

    #[tokio::test]
    async fn test_foreign_files_are_not_listed() {
        let dir = tempdir().unwrap();
        let driver = driver_in(&dir);
        std::fs::create_dir_all(driver.root()).unwrap();
        std::fs::write(driver.root().join("notes.txt"), b"hi").unwrap();
        std::fs::write(driver.root().join("odd.name.json"), b"1").unwrap();
        driver.set("kept", json!(1)).await.unwrap();

        assert_eq!(driver.list_keys().await.unwrap(), vec!["kept"]);
    }

    #[tokio::test]
    async fn test_corrupt_entry_is_an_error() {
        let dir = tempdir().unwrap();
        let driver = driver_in(&dir);
        std::fs::create_dir_all(driver.root()).unwrap();
        std::fs::write(driver.root().join("bad.json"), b"{not json").unwrap();

        let err = driver.get("bad").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Storage);
    }

    #[tokio::test]
    async fn test_concurrent_writers_leave_complete_value() {
        let dir = tempdir().unwrap();
        let driver = Arc::new(driver_in(&dir));
        let mut handles = Vec::new();
        for i in 0..8 {
            let driver = Arc::clone(&driver);
            handles.push(tokio::spawn(async move {
                driver.set("shared", json!({ "writer": i })).await.unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let value = driver.get("shared").await.unwrap().unwrap();
        assert!(value["writer"].as_u64().unwrap() < 8);
        assert_eq!(driver.list_keys().await.unwrap(), vec!["shared"]);
    }
}
