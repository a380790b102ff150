//! Package search (`/-/v1/search`).
//!
//! See <https://github.com/npm/registry/blob/master/docs/REGISTRY-API.md#get-v1search>

use serde::{Deserialize, Serialize};

use super::common::coerce_bool;

/// Search criteria; every field that is set becomes a query parameter.
///
/// The `text` query understands qualifiers such as `author:<name>`,
/// `maintainer:<name>`, `keywords:<list>`, `not:unstable`, `is:insecure`
/// and `boost-exact:<bool>`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct SearchCriteria {
    /// Query text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Number of results to return (registry default 20, maximum 250)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,
    /// Offset of the first result
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<u32>,
    /// Quality weight, 0.0 to 1.0
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality: Option<f64>,
    /// Popularity weight, 0.0 to 1.0
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub popularity: Option<f64>,
    /// Maintenance weight, 0.0 to 1.0
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maintenance: Option<f64>,
}

impl SearchCriteria {
    /// Criteria with only the query text set
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    /// Query parameters in a stable order
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(text) = &self.text {
            pairs.push(("text", text.clone()));
        }
        if let Some(size) = self.size {
            pairs.push(("size", size.to_string()));
        }
        if let Some(from) = self.from {
            pairs.push(("from", from.to_string()));
        }
        if let Some(quality) = self.quality {
            pairs.push(("quality", quality.to_string()));
        }
        if let Some(popularity) = self.popularity {
            pairs.push(("popularity", popularity.to_string()));
        }
        if let Some(maintenance) = self.maintenance {
            pairs.push(("maintenance", maintenance.to_string()));
        }
        pairs
    }
}

/// Results returned for a search query
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SearchResults {
    pub objects: Vec<SearchResult>,
    /// Total number of matches; may exceed `objects.len()`
    pub total: u64,
    /// When the search ran
    pub time: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub package: SearchPackage,
    pub score: SearchScore,
    /// Search score; may differ from `score.final`
    pub search_score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flags: Option<SearchFlags>,
}

/// Package summary inside a search result
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SearchPackage {
    pub name: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keywords: Option<Vec<String>>,
    /// `unscoped`, or the scope without `@` for scoped packages
    pub scope: String,
    /// Publication time of the `latest` version
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<SearchAuthor>,
    pub publisher: SearchUser,
    pub maintainers: Vec<SearchUser>,
    pub links: SearchLinks,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SearchAuthor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SearchUser {
    pub username: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct SearchLinks {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub npm: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub homepage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bugs: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SearchScore {
    /// Final score, computed from the detail
    #[serde(rename = "final")]
    pub final_score: f64,
    pub detail: SearchScoreDetail,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SearchScoreDetail {
    pub quality: f64,
    pub popularity: f64,
    pub maintenance: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct SearchFlags {
    /// Semver version below 1.0.0
    #[serde(default, deserialize_with = "coerce_bool", skip_serializing_if = "Option::is_none")]
    pub unstable: Option<bool>,
    /// Package or one of its dependencies is vulnerable
    #[serde(default, deserialize_with = "coerce_bool", skip_serializing_if = "Option::is_none")]
    pub insecure: Option<bool>,
}
