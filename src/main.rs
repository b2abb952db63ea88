use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use s3facade::cli::commands;
use s3facade::s3::DEFAULT_SIGNED_URL_EXPIRY;
use s3facade::{config, StorageFacade};

#[derive(Parser)]
#[command(name = "s3facade")]
#[command(version, about = "List, create, upload, fetch and presign S3 objects", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path (environment variables are used when omitted)
    #[arg(long, global = true)]
    config: Option<String>,

    /// Profile to use from config
    #[arg(long, global = true)]
    profile: Option<String>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "info")]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// List buckets
    Buckets {
        /// Only buckets whose name starts with this prefix
        #[arg(long)]
        prefix: Option<String>,

        /// Maximum number of buckets to return
        #[arg(long)]
        max_buckets: Option<i32>,

        /// Print the raw result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Make bucket
    Mb {
        /// Bucket name
        bucket: String,

        /// Canned ACL (private, public-read, public-read-write, authenticated-read)
        #[arg(long)]
        acl: Option<String>,

        /// Location constraint (region)
        #[arg(long)]
        location: Option<String>,

        /// Enable object lock on the new bucket
        #[arg(long)]
        object_lock: bool,
    },

    /// Upload a file
    Put {
        /// Local file to upload
        file: PathBuf,

        /// Destination bucket
        bucket: String,

        /// Object key (defaults to the file name)
        #[arg(long)]
        key: Option<String>,

        /// Content type (guessed from the extension when omitted)
        #[arg(long)]
        content_type: Option<String>,

        /// Object metadata as key=value, repeatable
        #[arg(long = "meta")]
        meta: Vec<String>,
    },

    /// Fetch an object
    Get {
        /// Object key
        key: String,

        /// Bucket name
        bucket: String,

        /// Write the body to this file instead of describing the object
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print a presigned download URL
    Presign {
        /// Bucket name
        bucket: String,

        /// Object key
        key: String,

        /// Filename served through Content-Disposition: attachment
        #[arg(long)]
        filename: Option<String>,

        /// URL lifetime in seconds
        #[arg(long, default_value_t = DEFAULT_SIGNED_URL_EXPIRY)]
        expiry: u64,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| cli.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Each command issues at most one request
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async_main(cli))
}

async fn async_main(cli: Cli) -> Result<()> {
    let config = config::load_config(cli.config.as_deref(), cli.profile.as_deref())?;
    let facade = StorageFacade::from_config(&config)?;

    match cli.command {
        Commands::Buckets {
            prefix,
            max_buckets,
            json,
        } => {
            commands::cmd_buckets(&facade, prefix, max_buckets, json).await?;
        }
        Commands::Mb {
            bucket,
            acl,
            location,
            object_lock,
        } => {
            commands::cmd_mb(&facade, &bucket, acl.as_deref(), location.as_deref(), object_lock)
                .await?;
        }
        Commands::Put {
            file,
            bucket,
            key,
            content_type,
            meta,
        } => {
            commands::cmd_put(
                &facade,
                &file,
                &bucket,
                key.as_deref(),
                content_type.as_deref(),
                &meta,
            )
            .await?;
        }
        Commands::Get {
            key,
            bucket,
            output,
        } => {
            commands::cmd_get(&facade, &key, &bucket, output.as_deref()).await?;
        }
        Commands::Presign {
            bucket,
            key,
            filename,
            expiry,
        } => {
            commands::cmd_presign(&facade, &bucket, &key, filename.as_deref(), expiry)?;
        }
    }

    Ok(())
}
