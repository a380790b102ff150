//! Resolved client settings

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use npq_core::error::NpqError;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::file::NpqToml;
use crate::ConfigResult;

/// Registry API base URL used when nothing else is configured
pub const DEFAULT_REGISTRY_URL: &str = "https://registry.npmjs.org";

/// Downloads API base URL used when nothing else is configured
pub const DEFAULT_DOWNLOADS_URL: &str = "https://api.npmjs.org";

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Storage driver selected for the response cache
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheDriverKind {
    /// In-process, lost when the process exits
    #[default]
    Memory,
    /// One JSON file per entry under the cache directory
    Fs,
}

impl CacheDriverKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheDriverKind::Memory => "memory",
            CacheDriverKind::Fs => "fs",
        }
    }
}

impl fmt::Display for CacheDriverKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CacheDriverKind {
    type Err = NpqError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "memory" => Ok(CacheDriverKind::Memory),
            "fs" => Ok(CacheDriverKind::Fs),
            _ => Err(NpqError::ConfigValidation {
                field: "cache.driver".to_string(),
                reason: format!("unknown cache driver '{s}', expected 'memory' or 'fs'"),
            }),
        }
    }
}

/// Cache settings after layering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheSettings {
    pub enabled: bool,
    pub driver: CacheDriverKind,
    /// Directory used by the `fs` driver
    pub dir: Utf8PathBuf,
}

/// Everything needed to build a registry client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub registry_url: String,
    pub downloads_url: String,
    pub timeout: Duration,
    pub user_agent: String,
    pub cache: CacheSettings,
}

impl ClientSettings {
    /// Built-in defaults; the cache directory lives under `home` when known
    pub fn defaults(home: Option<&Utf8Path>) -> Self {
        let dir = match home {
            Some(home) => home.join(".npq").join("cache"),
            None => Utf8PathBuf::from(".npq-cache"),
        };
        Self {
            registry_url: DEFAULT_REGISTRY_URL.to_string(),
            downloads_url: DEFAULT_DOWNLOADS_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: concat!("npq/", env!("CARGO_PKG_VERSION")).to_string(),
            cache: CacheSettings {
                enabled: true,
                driver: CacheDriverKind::Memory,
                dir,
            },
        }
    }

    /// Overlay the fields a file sets
    pub fn apply_layer(&mut self, layer: &NpqToml) {
        if let Some(url) = &layer.registry.url {
            self.registry_url = url.clone();
        }
        if let Some(url) = &layer.registry.downloads_url {
            self.downloads_url = url.clone();
        }
        if let Some(secs) = layer.http.timeout_secs {
            self.timeout = Duration::from_secs(secs);
        }
        if let Some(user_agent) = &layer.http.user_agent {
            self.user_agent = user_agent.clone();
        }
        if let Some(enabled) = layer.cache.enabled {
            self.cache.enabled = enabled;
        }
        if let Some(driver) = layer.cache.driver {
            self.cache.driver = driver;
        }
        if let Some(dir) = &layer.cache.dir {
            self.cache.dir = Utf8PathBuf::from(dir);
        }
    }

    /// Check the combined result of all layers
    pub fn validate(&self) -> ConfigResult<()> {
        check_url("registry.url", &self.registry_url)?;
        check_url("registry.downloads-url", &self.downloads_url)?;
        if self.timeout.is_zero() {
            return Err(NpqError::ConfigValidation {
                field: "http.timeout-secs".to_string(),
                reason: "timeout must be at least one second".to_string(),
            });
        }
        if self.user_agent.trim().is_empty() {
            return Err(NpqError::ConfigValidation {
                field: "http.user-agent".to_string(),
                reason: "user agent cannot be empty".to_string(),
            });
        }
        if self.cache.dir.as_str().is_empty() {
            return Err(NpqError::ConfigValidation {
                field: "cache.dir".to_string(),
                reason: "cache directory cannot be empty".to_string(),
            });
        }
        Ok(())
    }
}

fn check_url(field: &str, raw: &str) -> ConfigResult<()> {
    let url = Url::parse(raw).map_err(|e| NpqError::ConfigValidation {
        field: field.to_string(),
        reason: format!("'{raw}' is not a valid URL: {e}"),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(NpqError::ConfigValidation {
            field: field.to_string(),
            reason: format!("'{raw}' must use http or https"),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file::parse_npq_toml;
    use npq_core::error::ErrorKind;

    #[test]
    fn test_defaults() {
        let settings = ClientSettings::defaults(Some(Utf8Path::new("/home/dev")));
        assert_eq!(settings.registry_url, DEFAULT_REGISTRY_URL);
        assert_eq!(settings.downloads_url, DEFAULT_DOWNLOADS_URL);
        assert_eq!(settings.timeout, Duration::from_secs(30));
        assert!(settings.user_agent.starts_with("npq/"));
        assert!(settings.cache.enabled);
        assert_eq!(settings.cache.driver, CacheDriverKind::Memory);
        assert_eq!(settings.cache.dir, Utf8PathBuf::from("/home/dev/.npq/cache"));
        settings.validate().unwrap();

        let homeless = ClientSettings::defaults(None);
        assert_eq!(homeless.cache.dir, Utf8PathBuf::from(".npq-cache"));
    }

    #[test]
    fn test_layer_only_replaces_set_fields() {
        let mut settings = ClientSettings::defaults(None);
        let layer = parse_npq_toml("[cache]\ndriver = \"fs\"\n").unwrap();
        settings.apply_layer(&layer);

        assert_eq!(settings.cache.driver, CacheDriverKind::Fs);
        assert!(settings.cache.enabled);
        assert_eq!(settings.registry_url, DEFAULT_REGISTRY_URL);
    }

    #[test]
    fn test_driver_from_str() {
        assert_eq!("FS".parse::<CacheDriverKind>().unwrap(), CacheDriverKind::Fs);
        assert_eq!("memory".parse::<CacheDriverKind>().unwrap(), CacheDriverKind::Memory);
        assert_eq!(CacheDriverKind::Fs.to_string(), "fs");

        let err = "sqlite".parse::<CacheDriverKind>().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }

    #[test]
    fn test_validate_rejects_bad_urls() {
        for raw in ["registry.npmjs.org", "ftp://registry.npmjs.org", ""] {
            let mut settings = ClientSettings::defaults(None);
            settings.registry_url = raw.to_string();
            match settings.validate().unwrap_err() {
                NpqError::ConfigValidation { field, .. } => assert_eq!(field, "registry.url"),
                other => panic!("Expected ConfigValidation error, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_validate_rejects_empty_user_agent() {
        let mut settings = ClientSettings::defaults(None);
        settings.user_agent = "  ".to_string();
        assert_eq!(settings.validate().unwrap_err().kind(), ErrorKind::Config);
    }
}
