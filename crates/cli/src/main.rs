//! Cirrus CLI
//!
//! A command-line interface for a Cloudinary-backed filesystem disk.

mod commands;
mod config;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use cirrus_adapter::CloudAdapter;
use cirrus_cloudinary::CloudinaryStore;
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::{CLOUDINARY_URL_ENV, DiskConfig};

/// Manage files on a Cloudinary disk.
#[derive(Parser, Debug)]
#[command(name = "cirrus", version, about)]
struct Cli {
    /// Disk configuration file (TOML).
    #[arg(long, env = "CIRRUS_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Output format.
    #[arg(long, default_value = "text", global = true)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check credentials and connectivity.
    Health,
    /// Upload a local file.
    Put(commands::files::PutArgs),
    /// Download a file.
    Get(commands::files::GetArgs),
    /// Delete a file.
    Rm(commands::files::PathArgs),
    /// Move a file.
    Mv(commands::files::TransferArgs),
    /// Copy a file.
    Cp(commands::files::TransferArgs),
    /// Show a file's metadata.
    Stat(commands::files::PathArgs),
    /// Check whether a file or directory exists.
    Exists(commands::files::ExistsArgs),
    /// Print a file's delivery URL.
    Url(commands::files::UrlArgs),
    /// List files under a prefix.
    Ls(commands::dirs::ListArgs),
    /// Create a directory.
    Mkdir(commands::dirs::DirArgs),
    /// Delete an empty directory.
    Rmdir(commands::dirs::DirArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let disk = DiskConfig::load(cli.config.as_deref())?;
    let env_url = std::env::var(CLOUDINARY_URL_ENV).ok();
    let store = Arc::new(CloudinaryStore::new(disk.cloudinary(env_url.as_deref())?)?);
    debug!(cloud = %store.config().cloud_name, command = ?cli.command, "running command");
    let fs = CloudAdapter::new(store.clone(), disk.disk);

    let format = &cli.format;
    match cli.command {
        Command::Health => commands::health::run(store.as_ref()).await?,
        Command::Put(args) => commands::files::put(&fs, &args, format).await?,
        Command::Get(args) => commands::files::get(&fs, &args).await?,
        Command::Rm(args) => commands::files::rm(&fs, &args, format).await?,
        Command::Mv(args) => commands::files::mv(&fs, &args, format).await?,
        Command::Cp(args) => commands::files::cp(&fs, &args, format).await?,
        Command::Stat(args) => commands::files::stat(&fs, &args, format).await?,
        Command::Exists(args) => return commands::files::exists(&fs, &args, format).await,
        Command::Url(args) => commands::files::url(&fs, &args)?,
        Command::Ls(args) => commands::dirs::ls(&fs, &args, format).await?,
        Command::Mkdir(args) => commands::dirs::mkdir(&fs, &args).await?,
        Command::Rmdir(args) => commands::dirs::rmdir(&fs, &args).await?,
    }
    Ok(ExitCode::SUCCESS)
}
