//! catalog-sync - reconciles a work catalog with a directory of content folders.
//!
//! Removes catalog records whose `RJ######` folder disappeared, then fetches
//! metadata and covers for folders the catalog does not know yet. Exits with
//! status 1 when the run fails.

use anyhow::{Context, Result};
use bridge_desktop::{ReqwestHttpClient, TokioFileSystem};
use clap::Parser;
use core_library::{create_pool, DatabaseConfig, SqliteWorkRepository};
use core_metadata::{ArtworkService, FileCoverStore, HttpMetadataSource};
use core_runtime::logging::{init_logging, LogFormat, LogLevel, LoggingConfig};
use core_runtime::CoreConfigBuilder;
use core_sync::{SyncConfig, SyncCoordinator};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "catalog-sync")]
#[command(about = "Synchronize the work catalog with the content folders")]
struct Args {
    /// Configuration file
    #[arg(short, long, default_value = "config.json")]
    config: PathBuf,

    /// Content root, overriding `rootDir` from the config file
    #[arg(long)]
    root_dir: Option<PathBuf>,

    /// Log output format (pretty, json, compact)
    #[arg(long)]
    log_format: Option<LogFormat>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();

    let logging = LoggingConfig::default()
        .with_format(args.log_format.unwrap_or_default())
        .with_level(if args.debug {
            LogLevel::Debug
        } else {
            LogLevel::Info
        });
    if let Err(e) = init_logging(logging) {
        eprintln!("catalog-sync: {}", e);
        return ExitCode::FAILURE;
    }

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = ?e, "Sync aborted");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<()> {
    let mut builder = CoreConfigBuilder::from_json_file(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;
    if let Some(root_dir) = args.root_dir {
        builder = builder.root_dir(root_dir);
    }
    let config = builder.build().context("invalid configuration")?;

    info!(root = ?config.root_dir, database = ?config.database_path, "Configuration loaded");

    let pool = create_pool(DatabaseConfig::new(&config.database_path))
        .await
        .context("opening catalog database")?;
    let repository = Arc::new(SqliteWorkRepository::new(pool));

    let file_system = Arc::new(TokioFileSystem::new());
    let http_client = Arc::new(ReqwestHttpClient::new(&config.user_agent)?);

    let metadata = Arc::new(HttpMetadataSource::new(
        http_client.clone(),
        config.metadata_url_template.clone(),
    ));
    let covers = Arc::new(FileCoverStore::new(file_system.clone(), config.asset_dir()));
    let artwork = Arc::new(ArtworkService::new(
        http_client,
        covers,
        config.cover_url_template.clone(),
    ));

    let coordinator = SyncCoordinator::new(
        SyncConfig::from(&config),
        repository,
        file_system,
        metadata,
        artwork,
    );

    let outcome = coordinator.run().await;
    coordinator.wait_for_background_tasks().await;

    let summary = outcome?;
    info!(
        job_id = %summary.job_id,
        ingested = summary.ingested(),
        skipped = summary.skipped(),
        removed = summary.removed(),
        "Sync complete"
    );
    Ok(())
}
