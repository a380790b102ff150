//! npq.toml parsing
//!
//! Every field of a file is optional. A file is one layer: the fields it sets
//! replace the values of the layers below it.

use camino::Utf8Path;
use npq_core::error::NpqError;
use serde::{Deserialize, Serialize};

use crate::settings::CacheDriverKind;
use crate::ConfigResult;

/// Contents of an npq.toml file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NpqToml {
    /// Registry endpoints
    pub registry: RegistrySection,

    /// HTTP transport
    pub http: HttpSection,

    /// Response cache
    pub cache: CacheSection,
}

/// `[registry]` section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct RegistrySection {
    /// Registry API base URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Downloads API base URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub downloads_url: Option<String>,
}

/// `[http]` section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct HttpSection {
    /// Whole-request timeout in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

/// `[cache]` section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct CacheSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,

    /// Storage driver
    #[serde(skip_serializing_if = "Option::is_none")]
    pub driver: Option<CacheDriverKind>,

    /// Directory of the `fs` driver; relative paths are resolved against the
    /// directory holding the file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dir: Option<String>,
}

/// Parse TOML string to an npq.toml layer
pub fn parse_npq_toml(content: &str) -> ConfigResult<NpqToml> {
    let config: NpqToml = toml::from_str(content).map_err(|e| NpqError::TomlParse {
        message: e.to_string(),
    })?;
    validate_layer(&config)?;
    Ok(config)
}

/// Serialize an npq.toml layer
pub fn serialize_npq_toml(config: &NpqToml) -> ConfigResult<String> {
    toml::to_string_pretty(config).map_err(|e| NpqError::TomlParse {
        message: format!("TOML serialization error: {e}"),
    })
}

/// Load and parse npq.toml from file path
pub async fn load_from_file(path: &Utf8Path) -> ConfigResult<NpqToml> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| NpqError::io(format!("Failed to read {path}"), e))?;

    let mut config = parse_npq_toml(&content).map_err(|e| match e {
        NpqError::TomlParse { message } => NpqError::TomlParse {
            message: format!("In file {path}: {message}"),
        },
        NpqError::ConfigValidation { field, reason } => NpqError::ConfigValidation {
            field,
            reason: format!("In file {path}: {reason}"),
        },
        other => other,
    })?;

    if let (Some(dir), Some(parent)) = (config.cache.dir.as_deref(), path.parent()) {
        if Utf8Path::new(dir).is_relative() {
            config.cache.dir = Some(parent.join(dir).into_string());
        }
    }
    Ok(config)
}

/// Checks that only need the layer itself
fn validate_layer(config: &NpqToml) -> ConfigResult<()> {
    if config.http.timeout_secs == Some(0) {
        return Err(NpqError::ConfigValidation {
            field: "http.timeout-secs".to_string(),
            reason: "timeout must be at least one second".to_string(),
        });
    }
    if matches!(config.cache.dir.as_deref(), Some("")) {
        return Err(NpqError::ConfigValidation {
            field: "cache.dir".to_string(),
            reason: "cache directory cannot be empty".to_string(),
        });
    }
    Ok(())
}
