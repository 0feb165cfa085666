//! # homesyncd — homesync daemon
//!
//! Composition root that wires all adapters together and runs a command.
//!
//! ## Responsibilities
//! - Parse configuration (CLI args, env vars, config file)
//! - Initialize the `SQLite` connection pool and run migrations
//! - Construct the hub client and entity cache (adapters)
//! - Construct application services, injecting adapters via port traits
//! - Keep the cache in sync until SIGINT, or run a one-shot command
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! Nothing here decides what a state means; that lives in the domain crate.

mod config;

use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio_stream::StreamExt;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use homesync_adapter_http_reqwest::HubClient;
use homesync_adapter_storage_sqlite_sqlx::{Config as StorageConfig, Database};
use homesync_app::event_bus::InProcessEventBus;
use homesync_app::ports::{HubApi, SyncNotification};
use homesync_app::services::cache_writer::CacheWriter;
use homesync_app::services::command_service::{CommandOutcome, CommandService};
use homesync_app::services::entity_service::EntityService;
use homesync_app::services::sync_driver::{SyncDriver, SyncOptions};
use homesync_domain::entity::Domain;
use homesync_domain::time::{HubTimeZone, TimestampTransform};

use crate::config::Config;

const BUS_CAPACITY: usize = 256;

/// Keep a local cache of a home-automation hub's entities.
#[derive(Debug, Parser)]
#[command(name = "homesyncd", version, about)]
struct Cli {
    /// Configuration file
    #[arg(long, short = 'c', env = "HOMESYNC_CONFIG", default_value = "homesync.toml")]
    config: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Follow the hub's event stream and keep the cache current (default)
    Sync,
    /// Execute a command URL, e.g. `homeassistant://call_service/light.turn_on?entity_id=light.kitchen`
    Open { url: String },
    /// Print cached entities
    Entities {
        /// Only this domain (e.g. `light`)
        domain: Option<String>,
    },
    /// Delete every cached entity
    Reset,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::load(&cli.config).context("failed to load configuration")?;
    init_tracing(&config.logging.filter);

    let db = StorageConfig {
        database_url: config.database_url().to_string(),
    }
    .build()
    .await
    .context("failed to open entity cache")?;

    match cli.command.unwrap_or(Command::Sync) {
        Command::Sync => sync(&config, &db).await,
        Command::Open { url } => open(&config, &db, &url).await,
        Command::Entities { domain } => entities(&config, &db, domain).await,
        Command::Reset => reset(&db).await,
    }
}

fn init_tracing(filter: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
}

/// Timestamp transform in the configured zone, else the hub's own.
///
/// An unknown zone is logged and replaced by the local zone.
async fn resolve_timestamps(config: &Config, client: &HubClient) -> TimestampTransform {
    let setting = match &config.hub.time_zone {
        Some(zone) => Some(zone.clone()),
        None => match client.get_config().await {
            Ok(hub) => hub.time_zone,
            Err(err) => {
                tracing::warn!(error = %err.report(), "could not read hub configuration");
                None
            }
        },
    };
    let zone = HubTimeZone::resolve(setting.as_deref()).unwrap_or_else(|err| {
        tracing::warn!(error = %err, "falling back to local time zone");
        HubTimeZone::Local
    });
    tracing::debug!(?zone, "timestamp zone resolved");
    TimestampTransform::new(zone)
}

async fn connect(config: &Config) -> anyhow::Result<(HubClient, TimestampTransform)> {
    let client = HubClient::new(&config.hub.url, &config.auth()).context("invalid hub settings")?;
    let timestamps = resolve_timestamps(config, &client).await;
    Ok((client.with_timestamps(timestamps), timestamps))
}

async fn sync(config: &Config, db: &Database) -> anyhow::Result<()> {
    let (client, timestamps) = connect(config).await?;
    let cache = Arc::new(db.entity_cache().with_timestamps(timestamps));
    let bus = Arc::new(InProcessEventBus::new(BUS_CAPACITY));

    let mut notifications = Box::pin(bus.stream());
    let observer = tokio::spawn(async move {
        while let Some(notification) = notifications.next().await {
            match notification {
                SyncNotification::Connected => tracing::info!("connected to hub"),
                SyncNotification::ConnectionError { message } => {
                    tracing::warn!(%message, "hub connection lost");
                }
                SyncNotification::EntityChanged(entity) => {
                    tracing::debug!(entity_id = %entity.id(), state = entity.state(), "entity changed");
                }
                SyncNotification::Disconnected => tracing::info!("disconnected from hub"),
            }
        }
    });

    let (writer, writer_task) = CacheWriter::spawn(Arc::clone(&cache), Arc::clone(&bus));
    let options = SyncOptions {
        backoff: config.backoff(),
        refresh_on_open: config.hub.refresh_on_open,
        timestamps,
    };
    let mut driver = SyncDriver::new(
        client.event_source(),
        client,
        Arc::clone(&bus),
        writer,
        options,
    );

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "cannot listen for shutdown signal");
            return;
        }
        tracing::info!("shutdown requested");
        on_signal.cancel();
    });

    let result = driver.run(cancel).await;

    // The writer stops once its last handle, held by the driver, is gone.
    drop(driver);
    writer_task.await.context("cache writer panicked")?;
    observer.abort();

    result.context("event stream gave up")
}

async fn open(config: &Config, db: &Database, url: &str) -> anyhow::Result<()> {
    let (client, timestamps) = connect(config).await?;
    let cache = db.entity_cache().with_timestamps(timestamps);
    let (writer, writer_task) = CacheWriter::spawn(cache, InProcessEventBus::new(BUS_CAPACITY));

    let service = CommandService::new(client, config.device.id.clone(), config.device_location())
        .with_writer(writer);
    let outcome = service.open_url(url).await.context("command failed")?;
    match outcome {
        CommandOutcome::ServiceCalled { changed } | CommandOutcome::LocationSent { changed } => {
            for entity in &changed {
                println!("{}\t{}", entity.id(), entity.state());
            }
        }
        CommandOutcome::EventFired { message } => println!("{message}"),
        CommandOutcome::AuthCallback { url } => println!("{url}"),
    }

    drop(service);
    writer_task.await.context("cache writer panicked")?;
    Ok(())
}

async fn entities(config: &Config, db: &Database, domain: Option<String>) -> anyhow::Result<()> {
    let timestamps = TimestampTransform::new(
        HubTimeZone::resolve(config.hub.time_zone.as_deref()).unwrap_or_default(),
    );
    let service = EntityService::new(db.entity_cache().with_timestamps(timestamps));
    let entities = match domain {
        Some(domain) => service.list_by_domain(&Domain::parse(&domain)).await?,
        None => service.list_entities().await?,
    };
    for entity in &entities {
        println!("{}\t{}\t{}", entity.id(), entity.cleaned_state(), entity.name());
        for member in service.resolve_members(entity).await? {
            println!("  {}\t{}", member.id(), member.cleaned_state());
        }
    }
    Ok(())
}

async fn reset(db: &Database) -> anyhow::Result<()> {
    let (writer, writer_task) =
        CacheWriter::spawn(db.entity_cache(), InProcessEventBus::new(BUS_CAPACITY));
    let removed = writer.reset().await?;
    println!("removed {removed} cached entities");
    drop(writer);
    writer_task.await.context("cache writer panicked")?;
    Ok(())
}

