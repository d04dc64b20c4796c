//! hansard-web - Hansard query service
//!
//! `serve` (the default) answers the JSON API over a read-only connection.
//! `import` loads exported JSON documents into the record store and
//! `materialize` refreshes the stored bill overviews; both open the
//! database read-write.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use hansard_common::config::{ConfigOverrides, ConfigResolver, HansardConfig, OverviewSource};
use hansard_common::db::{import_dir, init_database};
use hansard_common::time::today;
use hansard_web::overview::{refresh_all, refresh_overview};
use hansard_web::store::RecordStore;
use hansard_web::{build_router, AppState};
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for hansard-web
#[derive(Parser, Debug)]
#[command(name = "hansard-web")]
#[command(about = "Query service for Australian Hansard records")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Args, Debug)]
struct GlobalArgs {
    /// Config file (TOML)
    #[arg(long, global = true, env = "HANSARD_CONFIG")]
    config: Option<PathBuf>,

    /// Record store database file
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    /// Address to listen on
    #[arg(long, global = true)]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, global = true)]
    port: Option<u16>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Default source for bill overviews (live or materialized)
    #[arg(long, global = true, value_parser = parse_overview_source)]
    overview_source: Option<OverviewSource>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the JSON API
    Serve,
    /// Import talkers.json, parts.json and speech_stats.json from a directory
    Import {
        /// Directory holding the exported documents
        dir: PathBuf,
    },
    /// Recompute and store bill overviews
    Materialize {
        /// Refresh a single bill instead of all of them
        #[arg(long)]
        bill: Option<String>,
    },
}

fn parse_overview_source(value: &str) -> Result<OverviewSource, String> {
    OverviewSource::from_str(value)
        .ok_or_else(|| format!("expected 'live' or 'materialized', got '{value}'"))
}

impl From<GlobalArgs> for ConfigOverrides {
    fn from(args: GlobalArgs) -> Self {
        ConfigOverrides {
            config_file: args.config,
            database_path: args.database,
            host: args.host,
            port: args.port,
            log_level: args.log_level,
            overview_source: args.overview_source,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = ConfigResolver::new(cli.global.into()).resolve();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "hansard_web={level},hansard_common={level},tower_http={level}",
                    level = config.log_level
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting hansard-web v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    info!("Database path: {}", config.database_path.display());

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config).await,
        Command::Import { dir } => import(config, dir).await,
        Command::Materialize { bill } => materialize(config, bill).await,
    }
}

async fn serve(config: HansardConfig) -> Result<()> {
    let store = RecordStore::connect_readonly(&config.database_path, config.query_timeout)
        .await
        .context("Failed to open record store")?;

    let addr = config.bind_address();
    let state = AppState::new(store.clone(), config);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;
    info!("hansard-web listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    store.shutdown().await;
    info!("Server shutdown complete");
    Ok(())
}

async fn import(config: HansardConfig, dir: PathBuf) -> Result<()> {
    let pool = init_database(&config.database_path)
        .await
        .context("Failed to open database for writing")?;
    let summary = import_dir(&pool, &dir)
        .await
        .with_context(|| format!("Failed to import {}", dir.display()))?;

    info!(
        "Imported {} talkers, {} parts, {} speech stats",
        summary.talkers, summary.parts, summary.stats
    );
    pool.close().await;
    Ok(())
}

async fn materialize(config: HansardConfig, bill: Option<String>) -> Result<()> {
    let pool = init_database(&config.database_path)
        .await
        .context("Failed to open database for writing")?;
    let store = RecordStore::from_pool(pool, None);
    let ctx = store.context();
    let today = today();

    match bill {
        Some(bill_id) => {
            let doc = refresh_overview(&store, &ctx, &bill_id, &config.backfill, today)
                .await
                .with_context(|| format!("Failed to refresh overview of {bill_id}"))?;
            info!("Refreshed overview of {} at {}", doc.bill_id, doc.updated_at);
        }
        None => {
            let count = refresh_all(&store, &ctx, &config.backfill, today)
                .await
                .context("Failed to refresh bill overviews")?;
            info!("Materialized {} bill overviews", count);
        }
    }

    store.shutdown().await;
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install terminate handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
