//! Configuration layering and environment overrides
//!
//! Layers apply in this order, later ones winning: built-in defaults, the
//! global `~/.npq/config.toml`, the project `npq.toml` found by walking up
//! from the working directory, `NPQ_*` environment variables, command-line
//! flags.

use std::collections::HashMap;

use camino::{Utf8Path, Utf8PathBuf};
use npq_core::error::NpqError;
use tracing::debug;

use crate::file::{load_from_file, NpqToml};
use crate::settings::{CacheDriverKind, ClientSettings};
use crate::{ConfigResult, PROJECT_CONFIG_FILE};

pub const ENV_REGISTRY_URL: &str = "NPQ_REGISTRY_URL";
pub const ENV_DOWNLOADS_URL: &str = "NPQ_DOWNLOADS_URL";
pub const ENV_CACHE_DIR: &str = "NPQ_CACHE_DIR";
pub const ENV_CACHE_DRIVER: &str = "NPQ_CACHE_DRIVER";
pub const ENV_NO_CACHE: &str = "NPQ_NO_CACHE";

/// Main configuration loading interface
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    /// Current working directory
    cwd: Utf8PathBuf,
    /// Home directory holding `.npq/config.toml`
    home: Option<Utf8PathBuf>,
}

/// Where a configuration value came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    Defaults,
    /// Global config file
    Global(Utf8PathBuf),
    /// Project npq.toml file
    Project(Utf8PathBuf),
    /// File named with `--config`
    Explicit(Utf8PathBuf),
    /// Environment variable
    Environment(String),
    /// CLI flag
    CommandLine,
}

/// Overrides given as command-line flags
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliOverrides {
    pub registry_url: Option<String>,
    pub downloads_url: Option<String>,
    pub cache_dir: Option<Utf8PathBuf>,
    pub cache_driver: Option<CacheDriverKind>,
    /// `--no-cache`
    pub no_cache: bool,
}

impl CliOverrides {
    fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Final settings and the layers that produced them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedConfig {
    pub settings: ClientSettings,
    /// Contributing layers, lowest priority first
    pub sources: Vec<ConfigSource>,
}

/// Configuration layering and merging
#[derive(Debug, Clone)]
pub struct ConfigLayering {
    settings: ClientSettings,
    sources: Vec<ConfigSource>,
}

impl ConfigLoader {
    /// Create a new configuration loader for the user's home directory
    pub fn new(cwd: Utf8PathBuf) -> Self {
        let home = dirs::home_dir().and_then(|home| Utf8PathBuf::try_from(home).ok());
        Self { cwd, home }
    }

    /// Use `home` instead of the user's home directory
    pub fn with_home(mut self, home: Option<Utf8PathBuf>) -> Self {
        self.home = home;
        self
    }

    /// Find configuration file in project (walks up directory tree)
    pub fn resolve_config_path(&self, filename: &str) -> Option<Utf8PathBuf> {
        self.cwd
            .ancestors()
            .map(|dir| dir.join(filename))
            .find(|path| path.is_file())
    }

    /// Location of the global configuration file
    pub fn global_config_path(&self) -> Option<Utf8PathBuf> {
        self.home
            .as_ref()
            .map(|home| home.join(".npq").join("config.toml"))
    }

    /// Load global configuration, if the file exists
    pub async fn load_global_config(&self) -> ConfigResult<Option<(NpqToml, Utf8PathBuf)>> {
        let Some(path) = self.global_config_path().filter(|path| path.is_file()) else {
            return Ok(None);
        };
        debug!(path = %path, "Loading global config");
        let config = load_from_file(&path).await?;
        Ok(Some((config, path)))
    }

    /// Load the nearest project npq.toml, if any
    pub async fn load_project_config(&self) -> ConfigResult<Option<(NpqToml, Utf8PathBuf)>> {
        let Some(path) = self.resolve_config_path(PROJECT_CONFIG_FILE) else {
            return Ok(None);
        };
        debug!(path = %path, "Loading project config");
        let config = load_from_file(&path).await?;
        Ok(Some((config, path)))
    }

    /// Load every layer into final settings.
    ///
    /// An `explicit` file replaces project discovery and must exist.
    pub async fn load(
        &self,
        explicit: Option<&Utf8Path>,
        env: &HashMap<String, String>,
        cli: &CliOverrides,
    ) -> ConfigResult<LoadedConfig> {
        let mut layering = ConfigLayering::new(ClientSettings::defaults(self.home.as_deref()));

        if let Some((config, path)) = self.load_global_config().await? {
            layering.layer(&config, ConfigSource::Global(path));
        }

        match explicit {
            Some(path) => {
                let path = if path.is_relative() {
                    self.cwd.join(path)
                } else {
                    path.to_path_buf()
                };
                let config = load_from_file(&path).await?;
                layering.layer(&config, ConfigSource::Explicit(path));
            }
            None => {
                if let Some((config, path)) = self.load_project_config().await? {
                    layering.layer(&config, ConfigSource::Project(path));
                }
            }
        }

        layering.apply_env_overrides(env)?;
        layering.apply_cli_overrides(cli);
        layering.finish()
    }
}

impl ConfigLayering {
    /// Start from `defaults`
    pub fn new(defaults: ClientSettings) -> Self {
        Self {
            settings: defaults,
            sources: vec![ConfigSource::Defaults],
        }
    }

    /// Apply a file layer
    pub fn layer(&mut self, config: &NpqToml, source: ConfigSource) {
        self.settings.apply_layer(config);
        self.sources.push(source);
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self, overrides: &HashMap<String, String>) -> ConfigResult<()> {
        // Sorted so the recorded sources are stable
        let mut keys: Vec<&String> = overrides.keys().collect();
        keys.sort();

        for key in keys {
            let value = &overrides[key];
            if value.is_empty() {
                continue;
            }
            match key.as_str() {
                ENV_REGISTRY_URL => self.settings.registry_url = value.clone(),
                ENV_DOWNLOADS_URL => self.settings.downloads_url = value.clone(),
                ENV_CACHE_DIR => self.settings.cache.dir = Utf8PathBuf::from(value),
                ENV_CACHE_DRIVER => {
                    self.settings.cache.driver =
                        value.parse().map_err(|_| NpqError::ConfigValidation {
                            field: ENV_CACHE_DRIVER.to_string(),
                            reason: format!("unknown cache driver '{value}', expected 'memory' or 'fs'"),
                        })?;
                }
                ENV_NO_CACHE => {
                    if parse_flag(ENV_NO_CACHE, value)? {
                        self.settings.cache.enabled = false;
                    }
                }
                _ => {
                    // Unknown environment variable, ignore
                    continue;
                }
            }
            self.sources.push(ConfigSource::Environment(key.clone()));
        }

        Ok(())
    }

    /// Apply CLI flag overrides
    pub fn apply_cli_overrides(&mut self, overrides: &CliOverrides) {
        if overrides.is_empty() {
            return;
        }
        if let Some(url) = &overrides.registry_url {
            self.settings.registry_url = url.clone();
        }
        if let Some(url) = &overrides.downloads_url {
            self.settings.downloads_url = url.clone();
        }
        if let Some(dir) = &overrides.cache_dir {
            self.settings.cache.dir = dir.clone();
        }
        if let Some(driver) = overrides.cache_driver {
            self.settings.cache.driver = driver;
        }
        if overrides.no_cache {
            self.settings.cache.enabled = false;
        }
        self.sources.push(ConfigSource::CommandLine);
    }

    /// Validate and return the merged settings
    pub fn finish(self) -> ConfigResult<LoadedConfig> {
        self.settings.validate()?;
        Ok(LoadedConfig {
            settings: self.settings,
            sources: self.sources,
        })
    }

    /// Collect environment variable overrides
    pub fn collect_env_overrides() -> HashMap<String, String> {
        std::env::vars()
            .filter(|(key, _)| key.starts_with("NPQ_"))
            .collect()
    }
}

fn parse_flag(field: &str, value: &str) -> ConfigResult<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(NpqError::ConfigValidation {
            field: field.to_string(),
            reason: format!("'{value}' is not a boolean"),
        }),
    }
}
