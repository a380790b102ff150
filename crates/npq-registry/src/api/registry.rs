//! Documents describing the registry itself

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Metadata served at the registry root.
///
/// The public npm registry exposes CouchDB database information here; most
/// fields are optional because mirrors report only a subset.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct RegistryMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc_del_count: Option<u64>,
    /// Sequence numbers are integers or opaque strings depending on the engine
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_seq: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purge_seq: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compact_running: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sizes: Option<RegistrySizes>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disk_size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_start_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disk_format_version: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub committed_update_seq: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compacted_seq: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct RegistrySizes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<u64>,
}

/// Public keys the registry signs tarballs with.
///
/// See <https://docs.npmjs.com/about-registry-signatures>
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RegistrySigningKeys {
    pub keys: Vec<SigningKey>,
}

impl RegistrySigningKeys {
    /// Find a key by its fingerprint
    pub fn find(&self, keyid: &str) -> Option<&SigningKey> {
        self.keys.iter().find(|key| key.keyid == keyid)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SigningKey {
    /// Expiry in ISO 8601 format, or `null` for keys still in use
    pub expires: Option<String>,
    /// SHA-256 fingerprint of the public key
    pub keyid: String,
    /// Key type, e.g. `ecdsa-sha2-nistp256`
    pub keytype: String,
    /// Signature scheme, e.g. `ecdsa-sha2-nistp256`
    pub scheme: String,
    /// Base64-encoded public key
    pub key: String,
}
