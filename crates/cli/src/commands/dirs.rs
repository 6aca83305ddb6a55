use chrono::DateTime;
use cirrus_adapter::CloudAdapter;
use clap::Args;
use tracing::{debug, info};

use crate::OutputFormat;

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Directory to list. Defaults to the disk root.
    #[arg(default_value = "")]
    pub prefix: String,
    /// Accepted for symmetry with other disks; listings are always recursive.
    #[arg(long, short)]
    pub recursive: bool,
}

#[derive(Args, Debug)]
pub struct DirArgs {
    pub path: String,
}

pub async fn ls(fs: &CloudAdapter, args: &ListArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let entries = fs.list_contents(&args.prefix, args.recursive).await?;
    debug!(prefix = %args.prefix, count = entries.len(), "listed directory");
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&entries)?),
        OutputFormat::Text => {
            if entries.is_empty() {
                println!("No files under `{}`.", args.prefix);
            }
            for entry in &entries {
                let created = DateTime::from_timestamp(entry.timestamp, 0).map_or_else(
                    || entry.timestamp.to_string(),
                    |t| t.format("%Y-%m-%d %H:%M").to_string(),
                );
                println!(
                    "{size:>10}  {created}  {mimetype:<16}  {path}",
                    size = entry.size,
                    mimetype = entry.mimetype,
                    path = entry.path,
                );
            }
        }
    }
    Ok(())
}

pub async fn mkdir(fs: &CloudAdapter, args: &DirArgs) -> anyhow::Result<()> {
    fs.create_directory(&args.path).await?;
    info!(path = %args.path, "created directory");
    println!("Created directory {}", args.path);
    Ok(())
}

pub async fn rmdir(fs: &CloudAdapter, args: &DirArgs) -> anyhow::Result<()> {
    fs.delete_directory(&args.path).await?;
    info!(path = %args.path, "deleted directory");
    println!("Deleted directory {}", args.path);
    Ok(())
}
