use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use chrono::DateTime;
use cirrus_adapter::CloudAdapter;
use cirrus_core::NormalizedMetadata;
use cirrus_store::DeliveryOptions;
use clap::Args;
use futures::StreamExt;
use tokio::io::AsyncWriteExt;
use tokio_util::io::ReaderStream;
use tracing::{debug, info};

use crate::OutputFormat;

#[derive(Args, Debug)]
pub struct PathArgs {
    /// Path on the disk.
    pub path: String,
}

#[derive(Args, Debug)]
pub struct PutArgs {
    /// Local file to upload.
    pub local: PathBuf,
    /// Destination path on the disk.
    pub path: String,
    /// Stream the file instead of reading it into memory first.
    #[arg(long)]
    pub stream: bool,
}

#[derive(Args, Debug)]
pub struct GetArgs {
    /// Path on the disk.
    pub path: String,
    /// Write to this file instead of stdout.
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct TransferArgs {
    pub from: String,
    pub to: String,
}

#[derive(Args, Debug)]
pub struct ExistsArgs {
    pub path: String,
    /// Check for a directory instead of a file.
    #[arg(long)]
    pub dir: bool,
}

#[derive(Args, Debug)]
pub struct UrlArgs {
    pub path: String,
    /// Delivery format, overriding the path's extension.
    #[arg(long, name = "as")]
    pub fetch_as: Option<String>,
    #[arg(long)]
    pub width: Option<u32>,
    #[arg(long)]
    pub height: Option<u32>,
    /// Crop mode, e.g. `fill` or `scale`.
    #[arg(long)]
    pub crop: Option<String>,
    /// Force an `http` URL.
    #[arg(long)]
    pub insecure: bool,
}

impl UrlArgs {
    fn delivery_options(&self) -> DeliveryOptions {
        DeliveryOptions {
            secure: self.insecure.then_some(false),
            format: self.fetch_as.clone(),
            width: self.width,
            height: self.height,
            crop: self.crop.clone(),
            ..DeliveryOptions::default()
        }
    }
}

pub async fn put(fs: &CloudAdapter, args: &PutArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let asset = if args.stream {
        let file = tokio::fs::File::open(&args.local)
            .await
            .with_context(|| format!("failed to open {}", args.local.display()))?;
        fs.write_stream(&args.path, Box::pin(ReaderStream::new(file)))
            .await?
    } else {
        let contents = tokio::fs::read(&args.local)
            .await
            .with_context(|| format!("failed to read {}", args.local.display()))?;
        fs.write(&args.path, contents.into()).await?
    };
    info!(public_id = %asset.public_id, bytes = asset.bytes, "uploaded file");

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&asset)?),
        OutputFormat::Text => println!(
            "Uploaded {} as {} ({}, {} bytes)",
            args.local.display(),
            asset.public_id,
            asset.resource_type,
            asset.bytes
        ),
    }
    Ok(())
}

pub async fn get(fs: &CloudAdapter, args: &GetArgs) -> anyhow::Result<()> {
    let mut stream = fs.read_stream(&args.path).await?;
    let mut out: Box<dyn tokio::io::AsyncWrite + Unpin + Send> = match &args.output {
        Some(path) => Box::new(
            tokio::fs::File::create(path)
                .await
                .with_context(|| format!("failed to create {}", path.display()))?,
        ),
        None => Box::new(tokio::io::stdout()),
    };

    while let Some(chunk) = stream.next().await {
        out.write_all(&chunk?).await?;
    }
    out.flush().await?;
    debug!(path = %args.path, "downloaded file");
    Ok(())
}

pub async fn rm(fs: &CloudAdapter, args: &PathArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let deleted = fs.delete(&args.path).await?;
    info!(path = %args.path, deleted, "delete finished");
    report(format, "deleted", deleted, || {
        if deleted {
            format!("Deleted {}", args.path)
        } else {
            format!("Nothing to delete at {}", args.path)
        }
    });
    Ok(())
}

pub async fn mv(
    fs: &CloudAdapter,
    args: &TransferArgs,
    format: &OutputFormat,
) -> anyhow::Result<()> {
    let moved = fs.rename(&args.from, &args.to).await?;
    info!(from = %args.from, to = %args.to, moved, "move finished");
    report(format, "moved", moved, || {
        if moved {
            format!("Moved {} to {}", args.from, args.to)
        } else {
            format!("Store did not confirm the move to {}", args.to)
        }
    });
    Ok(())
}

pub async fn cp(
    fs: &CloudAdapter,
    args: &TransferArgs,
    format: &OutputFormat,
) -> anyhow::Result<()> {
    let copied = fs.copy(&args.from, &args.to).await?;
    info!(from = %args.from, to = %args.to, copied, "copy finished");
    report(format, "copied", copied, || {
        if copied {
            format!("Copied {} to {}", args.from, args.to)
        } else {
            format!("Store did not confirm the copy to {}", args.to)
        }
    });
    Ok(())
}

/// Exits non-zero when nothing is found, so scripts can branch on it.
pub async fn exists(
    fs: &CloudAdapter,
    args: &ExistsArgs,
    format: &OutputFormat,
) -> anyhow::Result<ExitCode> {
    let found = if args.dir {
        fs.directory_exists(&args.path).await?
    } else {
        fs.file_exists(&args.path).await?
    };
    debug!(path = %args.path, dir = args.dir, found, "existence check");
    report(format, "exists", found, || {
        if found {
            format!("{} exists", args.path)
        } else {
            format!("{} does not exist", args.path)
        }
    });
    Ok(presence_code(found))
}

fn presence_code(found: bool) -> ExitCode {
    if found {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

pub async fn stat(fs: &CloudAdapter, args: &PathArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let metadata = fs.metadata(&args.path).await?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&metadata)?),
        OutputFormat::Text => print_metadata(&metadata),
    }
    Ok(())
}

pub fn url(fs: &CloudAdapter, args: &UrlArgs) -> anyhow::Result<()> {
    println!("{}", fs.url(&args.path, &args.delivery_options())?);
    Ok(())
}

fn print_metadata(metadata: &NormalizedMetadata) {
    let created = DateTime::from_timestamp(metadata.timestamp, 0)
        .map_or_else(|| metadata.timestamp.to_string(), |t| t.to_rfc3339());
    println!("Path:      {}", metadata.path);
    println!("Size:      {} bytes", metadata.size);
    println!("Type:      {}", metadata.mimetype);
    println!("Created:   {created}");
}

/// Print a boolean outcome as `{"<key>": <value>}` or as prose.
fn report(format: &OutputFormat, key: &str, value: bool, text: impl FnOnce() -> String) {
    match format {
        OutputFormat::Json => {
            let mut object = serde_json::Map::new();
            object.insert(key.to_owned(), value.into());
            println!("{}", serde_json::Value::Object(object));
        }
        OutputFormat::Text => println!("{}", text()),
    }
}
