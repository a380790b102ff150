//! Command implementations and dispatch logic.
//!
//! Each handler takes the shared [`CommandContext`] and returns the JSON
//! document to print.

use camino::Utf8PathBuf;
use npq_config::{CacheDriverKind, CliOverrides, ClientSettings, ConfigLayering, ConfigLoader};
use npq_core::error::{NpqError, NpqResult};
use npq_registry::{Cache, ClientOptions, FsDriver, RegistryClient};
use serde_json::Value;
use tracing::debug;

pub mod cache;
pub mod downloads;
pub mod name;
pub mod registry;


use crate::output::OutputHandler;
use crate::{CacheCommand, Commands, GlobalOptions};

/// Shared context for all commands
pub struct CommandContext {
    pub settings: ClientSettings,
    pub client: RegistryClient,
    /// Cache built from the settings, even when the client does not use it
    pub cache: Cache,
    pub output: OutputHandler,
}

impl CommandContext {
    /// Load configuration and build the registry client
    pub async fn new(global: &GlobalOptions) -> NpqResult<Self> {
        let cwd = std::env::current_dir()
            .map_err(|e| NpqError::io("Failed to get current directory".to_string(), e))?;
        let cwd = Utf8PathBuf::try_from(cwd).map_err(|e| NpqError::ConfigValidation {
            field: "cwd".to_string(),
            reason: format!("current directory is not valid UTF-8: {e}"),
        })?;

        let overrides = CliOverrides {
            registry_url: global.registry_url.clone(),
            downloads_url: global.downloads_url.clone(),
            cache_dir: global.cache_dir.clone(),
            cache_driver: global.cache_driver,
            no_cache: global.no_cache,
        };
        let loaded = ConfigLoader::new(cwd)
            .load(
                global.config.as_deref(),
                &ConfigLayering::collect_env_overrides(),
                &overrides,
            )
            .await?;
        debug!(sources = ?loaded.sources, "Loaded configuration");

        Self::from_settings(loaded.settings)
    }

    /// Build the context for already resolved settings
    pub fn from_settings(settings: ClientSettings) -> NpqResult<Self> {
        let cache = match settings.cache.driver {
            CacheDriverKind::Memory => Cache::new(),
            CacheDriverKind::Fs => Cache::with_storage(FsDriver::new(&settings.cache.dir)),
        };
        let client = RegistryClient::with_options(ClientOptions {
            registry_api_url: settings.registry_url.clone(),
            downloads_api_url: settings.downloads_url.clone(),
            cache: settings.cache.enabled.then(|| cache.clone()),
            timeout: settings.timeout,
            user_agent: settings.user_agent.clone(),
        })?;

        Ok(Self {
            settings,
            client,
            cache,
            output: OutputHandler::new(),
        })
    }
}

/// Dispatch a command to its handler
pub async fn dispatch_command(command: Commands, ctx: &CommandContext) -> NpqResult<Value> {
    match command {
        Commands::Metadata => registry::metadata(ctx).await,
        Commands::Keys => registry::keys(ctx).await,
        Commands::Packument { name, abbreviated } => {
            registry::packument(ctx, &name, abbreviated).await
        }
        Commands::Manifest { name, version } => {
            registry::manifest(ctx, &name, version.as_deref()).await
        }
        Commands::Downloads { names, period, daily } => {
            downloads::packages(ctx, &names, period, daily).await
        }
        Commands::RegistryDownloads { period, daily } => {
            downloads::registry(ctx, period, daily).await
        }
        Commands::VersionsDownloads { name } => downloads::versions(ctx, &name).await,
        Commands::Search {
            text,
            size,
            from,
            quality,
            popularity,
            maintenance,
        } => {
            let criteria = npq_registry::SearchCriteria {
                text: Some(text),
                size,
                from,
                quality,
                popularity,
                maintenance,
            };
            registry::search(ctx, &criteria).await
        }
        Commands::CheckName { name, strict } => name::check(&name, strict),
        Commands::Cache { command } => match command {
            CacheCommand::List => cache::list(ctx).await,
            CacheCommand::Clear => cache::clear(ctx).await,
            CacheCommand::Export { file } => cache::export(ctx, &file).await,
            CacheCommand::Import { file } => cache::import(ctx, &file).await,
        },
    }
}

/// Serialize a command result
pub(crate) fn to_json<T: serde::Serialize>(value: &T) -> NpqResult<Value> {
    serde_json::to_value(value)
        .map_err(|e| NpqError::storage("Failed to encode output".to_string(), e))
}
