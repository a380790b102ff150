//! Version manifests: the published `package.json` plus registry metadata

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::common::{Bin, Bugs, BundleDependencies, License, PeerDependencyMeta, Person, Repository};

/// Metadata for one specific version of a package (e.g. `react@18.2.0`).
///
/// See <https://github.com/npm/registry/blob/master/docs/responses/package-metadata.md>
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageManifest {
    /// Package name
    pub name: String,
    /// Version string
    pub version: String,
    /// `name@version`
    #[serde(rename = "_id")]
    pub id: String,
    /// Distribution information
    pub dist: Dist,
    /// Package description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Keywords
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keywords: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub homepage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bugs: Option<Bugs>,
    /// License
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<License>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<Person>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contributors: Option<Vec<Person>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maintainers: Option<Vec<Person>>,
    /// Repository information
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository: Option<Repository>,
    /// Module format (`module` or `commonjs`)
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub module_type: Option<String>,
    /// Main entry point
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub types: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exports: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bin: Option<Bin>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directories: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scripts: Option<BTreeMap<String, String>>,
    /// Dependencies
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependencies: Option<BTreeMap<String, String>>,
    /// Dev dependencies
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dev_dependencies: Option<BTreeMap<String, String>>,
    /// Peer dependencies
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub peer_dependencies: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub peer_dependencies_meta: Option<BTreeMap<String, PeerDependencyMeta>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optional_dependencies: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bundle_dependencies: Option<BundleDependencies>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engines: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu: Option<Vec<String>>,
    /// Deprecation message, present when the version is deprecated
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub git_head: Option<String>,
    /// npm version used to publish
    #[serde(rename = "_npmVersion", default, skip_serializing_if = "Option::is_none")]
    pub npm_version: Option<String>,
    /// Node.js version used to publish
    #[serde(rename = "_nodeVersion", default, skip_serializing_if = "Option::is_none")]
    pub node_version: Option<String>,
    /// Account that published this version
    #[serde(rename = "_npmUser", default, skip_serializing_if = "Option::is_none")]
    pub npm_user: Option<Person>,
    /// True if the tarball contains an `npm-shrinkwrap.json`
    #[serde(rename = "_hasShrinkwrap", default, skip_serializing_if = "Option::is_none")]
    pub has_shrinkwrap: Option<bool>,
}

impl PackageManifest {
    pub fn is_deprecated(&self) -> bool {
        self.deprecated.is_some()
    }
}

/// Distribution information for a package tarball
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dist {
    /// Tarball download URL
    pub tarball: String,
    /// SHA-1 checksum (legacy)
    pub shasum: String,
    /// Subresource integrity hash (preferred)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub integrity: Option<String>,
    /// File count
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_count: Option<u64>,
    /// Unpacked size in bytes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unpacked_size: Option<u64>,
    /// ECDSA registry signatures
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signatures: Option<Vec<DistSignature>>,
    /// Legacy PGP signature
    #[serde(rename = "npm-signature", default, skip_serializing_if = "Option::is_none")]
    pub npm_signature: Option<String>,
}

/// Registry signature over `name@version:integrity`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct DistSignature {
    /// Fingerprint of the signing key, see [`crate::api::SigningKey::keyid`]
    pub keyid: String,
    pub sig: String,
}
