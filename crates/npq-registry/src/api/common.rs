//! Building blocks shared by several registry documents

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Mapping of distribution tags to versions (e.g. `{ "latest": "1.0.0" }`)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct DistTags {
    /// Version the `latest` tag points to
    pub latest: String,
    /// Every other tag (`next`, `beta`, ...)
    #[serde(flatten)]
    pub other: BTreeMap<String, String>,
}

impl DistTags {
    /// Resolve a tag name to a version
    pub fn get(&self, tag: &str) -> Option<&str> {
        if tag == "latest" {
            Some(&self.latest)
        } else {
            self.other.get(tag).map(String::as_str)
        }
    }
}

/// A person, either as an object or in the `Name <email> (url)` shorthand
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum Person {
    Shorthand(String),
    Detailed {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        email: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        url: Option<String>,
    },
}

impl Person {
    /// Display name, when one is present
    pub fn name(&self) -> Option<&str> {
        match self {
            Person::Shorthand(value) => value.split(" <").next().map(str::trim),
            Person::Detailed { name, .. } => name.as_deref(),
        }
    }
}

/// Source repository, either a URL/shorthand or an object
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum Repository {
    Shorthand(String),
    Detailed {
        /// Repository type (usually "git")
        #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
        repo_type: Option<String>,
        /// Repository URL
        url: String,
        /// Sub-directory of a monorepo
        #[serde(default, skip_serializing_if = "Option::is_none")]
        directory: Option<String>,
    },
}

impl Repository {
    pub fn url(&self) -> &str {
        match self {
            Repository::Shorthand(url) => url,
            Repository::Detailed { url, .. } => url,
        }
    }
}

/// Issue tracker
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum Bugs {
    Url(String),
    Detailed {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        url: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        email: Option<String>,
    },
}

/// Executables, either a single path or a mapping of command names to paths
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum Bin {
    Single(String),
    Commands(BTreeMap<String, String>),
}

/// License, either an SPDX expression or the legacy object form
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum License {
    Spdx(String),
    Legacy {
        #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
        license_type: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        url: Option<String>,
    },
}

/// `bundleDependencies` is either a list of names or `true` for all of them
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum BundleDependencies {
    All(bool),
    Names(Vec<String>),
}

/// Per-peer flags from `peerDependenciesMeta`
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct PeerDependencyMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optional: Option<bool>,
}

/// Deserialize any JSON value as a boolean using JavaScript truthiness
pub(crate) fn coerce_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(Some(truthy(&value)))
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(false, |n| n != 0.0 && !n.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
