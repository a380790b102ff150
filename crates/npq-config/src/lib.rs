//! Configuration for npq
//!
//! This crate parses `npq.toml` files and layers them with environment
//! variables and command-line flags into the [`ClientSettings`] used to build
//! a registry client.

pub mod file;
pub mod merge;
pub mod settings;

// Re-export main types
pub use file::{CacheSection, HttpSection, NpqToml, RegistrySection};
pub use merge::{CliOverrides, ConfigLayering, ConfigLoader, ConfigSource, LoadedConfig};
pub use settings::{CacheDriverKind, CacheSettings, ClientSettings};

use npq_core::error::NpqError;

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, NpqError>;

/// File name of project configuration
pub const PROJECT_CONFIG_FILE: &str = "npq.toml";
