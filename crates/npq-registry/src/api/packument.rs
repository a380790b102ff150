//! Package documents (packuments), full and abbreviated

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use super::common::{
    Bin, Bugs, BundleDependencies, DistTags, License, PeerDependencyMeta, Person, Repository,
};
use super::manifest::{Dist, PackageManifest};

/// Full package document with every version and every field.
///
/// See <https://github.com/npm/registry/blob/master/docs/responses/package-metadata.md#full-metadata-format>
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Packument {
    /// Package name
    pub name: String,
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "_rev", default, skip_serializing_if = "Option::is_none")]
    pub rev: Option<String>,
    /// Distribution tags
    #[serde(rename = "dist-tags")]
    pub dist_tags: DistTags,
    /// All versions metadata
    #[serde(default)]
    pub versions: HashMap<String, PackageManifest>,
    /// Publication time of each version, plus `created` and `modified`
    #[serde(default)]
    pub time: HashMap<String, String>,
    /// Package description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub homepage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keywords: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository: Option<Repository>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<Person>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bugs: Option<Bugs>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<License>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maintainers: Option<Vec<Person>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contributors: Option<Vec<Person>>,
    /// README of the `latest` version
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub readme: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub readme_filename: Option<String>,
    /// Users who starred the package
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub users: Option<BTreeMap<String, bool>>,
}

impl Packument {
    /// Manifest for a version or distribution tag
    pub fn manifest(&self, version_or_tag: &str) -> Option<&PackageManifest> {
        let version = self.dist_tags.get(version_or_tag).unwrap_or(version_or_tag);
        self.versions.get(version)
    }

    /// Manifest the `latest` tag points to
    pub fn latest(&self) -> Option<&PackageManifest> {
        self.versions.get(&self.dist_tags.latest)
    }
}

/// Reduced package document containing only what is needed to install.
///
/// Served when requesting with `Accept: application/vnd.npm.install-v1+json`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AbbreviatedPackument {
    /// Package name
    pub name: String,
    /// Last modification time in ISO 8601 format
    pub modified: String,
    #[serde(rename = "dist-tags")]
    pub dist_tags: DistTags,
    /// Install metadata keyed by version
    pub versions: HashMap<String, AbbreviatedManifest>,
}

impl AbbreviatedPackument {
    pub fn manifest(&self, version_or_tag: &str) -> Option<&AbbreviatedManifest> {
        let version = self.dist_tags.get(version_or_tag).unwrap_or(version_or_tag);
        self.versions.get(version)
    }
}

/// Install-time subset of a [`PackageManifest`]
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AbbreviatedManifest {
    pub name: String,
    pub version: String,
    pub dist: Dist,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependencies: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optional_dependencies: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dev_dependencies: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bundle_dependencies: Option<BundleDependencies>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub peer_dependencies: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub peer_dependencies_meta: Option<BTreeMap<String, PeerDependencyMeta>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bin: Option<Bin>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directories: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engines: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os: Option<Vec<String>>,
    #[serde(rename = "_hasShrinkwrap", default, skip_serializing_if = "Option::is_none")]
    pub has_shrinkwrap: Option<bool>,
    /// True if the package has an `install`, `preinstall` or `postinstall` script
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_install_script: Option<bool>,
}
