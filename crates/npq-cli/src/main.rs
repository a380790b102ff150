//! # npq
//!
//! Command-line client for the npm registry.
//!
//! Parses arguments, loads configuration, sets up logging and dispatches to
//! the command handlers. Results are printed to stdout as pretty JSON; logs
//! and errors go to stderr.

use std::process::ExitCode;

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};
use npq_config::CacheDriverKind;
use npq_core::error::NpqError;
use npq_registry::DownloadPeriod;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

mod commands;
mod output;

use commands::CommandContext;
use output::errors::ErrorFormatter;

/// Query the npm registry from the command line
#[derive(Debug, Parser)]
#[command(name = "npq", version, about = "Typed npm registry queries")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOptions,
}

#[derive(Debug, Clone, Default, Args)]
pub struct GlobalOptions {
    /// Configuration file to use instead of the nearest npq.toml
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<Utf8PathBuf>,

    /// Registry API base URL
    #[arg(long, global = true, value_name = "URL")]
    pub registry_url: Option<String>,

    /// Downloads API base URL
    #[arg(long, global = true, value_name = "URL")]
    pub downloads_url: Option<String>,

    /// Directory of the fs cache driver
    #[arg(long, global = true, value_name = "DIR")]
    pub cache_dir: Option<Utf8PathBuf>,

    /// Cache storage driver (memory or fs)
    #[arg(long, global = true, value_name = "DRIVER")]
    pub cache_driver: Option<CacheDriverKind>,

    /// Always fetch from the registry
    #[arg(long, global = true)]
    pub no_cache: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show registry metadata
    Metadata,
    /// Show the registry's signing keys
    Keys,
    /// Show a package's packument
    Packument {
        name: String,
        /// Fetch the abbreviated (install) form
        #[arg(long)]
        abbreviated: bool,
    },
    /// Show the manifest of one package version
    Manifest {
        name: String,
        /// Version or distribution tag [default: latest]
        version: Option<String>,
    },
    /// Show download counts of one or more packages
    Downloads {
        #[arg(required = true, num_args = 1..)]
        names: Vec<String>,
        #[arg(long, default_value_t = DownloadPeriod::LastWeek)]
        period: DownloadPeriod,
        /// Break the counts down per day
        #[arg(long)]
        daily: bool,
    },
    /// Show download counts of all packages
    RegistryDownloads {
        #[arg(long, default_value_t = DownloadPeriod::LastWeek)]
        period: DownloadPeriod,
        #[arg(long)]
        daily: bool,
    },
    /// Show last week's downloads of each version of a package
    VersionsDownloads { name: String },
    /// Search for packages
    Search {
        text: String,
        #[arg(long)]
        size: Option<u32>,
        #[arg(long)]
        from: Option<u32>,
        #[arg(long)]
        quality: Option<f64>,
        #[arg(long)]
        popularity: Option<f64>,
        #[arg(long)]
        maintenance: Option<f64>,
    },
    /// Check whether a package name is valid
    CheckName {
        name: String,
        /// Apply the rules for new packages
        #[arg(long)]
        strict: bool,
    },
    /// Inspect or manage the response cache
    Cache {
        #[command(subcommand)]
        command: CacheCommand,
    },
}

#[derive(Debug, Subcommand)]
pub enum CacheCommand {
    /// List cache keys
    List,
    /// Remove every cache entry
    Clear,
    /// Write all entries to a gzip snapshot file
    Export { file: Utf8PathBuf },
    /// Load entries from a gzip snapshot file
    Import { file: Utf8PathBuf },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    setup_logging(cli.global.verbose);
    setup_panic_handler();

    debug!("Starting npq v{}", env!("CARGO_PKG_VERSION"));

    match run_cli(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let formatter = ErrorFormatter::new();
            match err.downcast_ref::<NpqError>() {
                Some(npq_error) => eprint!("{}", formatter.format_error(npq_error)),
                None => eprintln!("{}", formatter.format_simple(&format!("{err:#}"))),
            }
            ExitCode::FAILURE
        }
    }
}

fn run_cli(cli: Cli) -> anyhow::Result<()> {
    // Create Tokio runtime for async operations
    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| NpqError::io("Failed to create async runtime".to_string(), e))?;

    rt.block_on(async {
        let ctx = CommandContext::new(&cli.global).await?;
        let value = commands::dispatch_command(cli.command, &ctx).await?;
        ctx.output.json(&value)?;
        Ok(())
    })
}

fn setup_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "npq={level},npq_cli={level},npq_registry={level},npq_config={level}"
        ))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn setup_panic_handler() {
    std::panic::set_hook(Box::new(|panic_info| {
        error!("npq encountered an unexpected error: {}", panic_info);
        eprintln!("npq crashed! This is a bug.");
        eprintln!("Please report this at: https://github.com/npq-rs/npq/issues");
        eprintln!("Error: {}", panic_info);
    }));
}
