#![forbid(unsafe_code)]

//! Lifeline daemon binary.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use lifeline_core::{LocationFix, PermissionGrant, TriggerEngine, TriggerTuning};
use lifeline_daemon::{
    api,
    collaborators::AlertSink,
    config::{load_tuning, DaemonConfig},
    dispatcher::Dispatcher,
    platform::{FixedLocationProvider, LogAlerts, LogTelephony, StaticPermissionGate},
    sequencer::{ActionSequencer, Collaborators},
    store::{load_emergency_config, ConfigStore, FileConfigStore, MemoryConfigStore},
    transport::HttpTransport,
};
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "lifeline-daemon", version, about = "Shake / volume-chord emergency trigger daemon")]
struct Cli {
    /// Listen address, e.g. 127.0.0.1:8787
    #[arg(long, default_value = "127.0.0.1:8787")]
    listen: SocketAddr,

    /// JSON file holding the emergency contacts. Kept in memory when omitted.
    #[arg(long)]
    store: Option<PathBuf>,

    /// Endpoint receiving `{latitude, longitude, email}` payloads.
    #[arg(long, default_value = "http://127.0.0.1:3000/send-location")]
    notify_url: String,

    /// Per-request timeout for location deliveries, in milliseconds.
    #[arg(long, default_value_t = 10_000)]
    notify_timeout_ms: u64,

    /// TOML file with trigger tuning overrides.
    #[arg(long)]
    tuning: Option<PathBuf>,

    /// Volume level read from the device at startup.
    #[arg(long)]
    initial_volume: Option<i32>,

    /// Fixed latitude reported by the location provider.
    #[arg(long, requires = "longitude", allow_hyphen_values = true)]
    latitude: Option<f64>,

    /// Fixed longitude reported by the location provider.
    #[arg(long, requires = "latitude", allow_hyphen_values = true)]
    longitude: Option<f64>,

    /// Answer call permission requests with "denied".
    #[arg(long)]
    deny_call: bool,

    /// Answer location permission requests with "denied".
    #[arg(long)]
    deny_location: bool,

    /// Dispatch queue capacity.
    #[arg(long, default_value_t = 1_024)]
    queue_capacity: usize,

    /// Log level (env-filter syntax).
    #[arg(long, default_value = "info")]
    log: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&cli.log))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let tuning = match &cli.tuning {
        Some(path) => load_tuning(path)?,
        None => TriggerTuning::default(),
    };
    let fixed_location = match (cli.latitude, cli.longitude) {
        (Some(latitude), Some(longitude)) => Some(LocationFix {
            latitude,
            longitude,
        }),
        _ => None,
    };

    let config = DaemonConfig {
        listen: cli.listen,
        store_path: cli.store,
        notify_url: cli.notify_url,
        notify_timeout_ms: cli.notify_timeout_ms,
        tuning,
        initial_volume: cli.initial_volume,
        fixed_location,
        grant: PermissionGrant {
            call: !cli.deny_call,
            location: !cli.deny_location,
        },
        queue_capacity: cli.queue_capacity,
    };

    info!("starting daemon with config: {:?}", config);

    let store: Arc<dyn ConfigStore> = match &config.store_path {
        Some(path) => {
            let file = FileConfigStore::new(path);
            info!(path = %file.path().display(), "using file contact store");
            Arc::new(file)
        }
        None => Arc::new(MemoryConfigStore::new()),
    };
    let contacts = load_emergency_config(store.as_ref())?;
    info!(configured = contacts.is_some(), "contacts loaded");

    let transport = HttpTransport::new(
        config.notify_url.clone(),
        Duration::from_millis(config.notify_timeout_ms),
    )?;
    info!(url = transport.url(), "location notifications enabled");

    let alerts: Arc<dyn AlertSink> = Arc::new(LogAlerts);
    let collaborators = Collaborators {
        location: Arc::new(FixedLocationProvider::new(config.fixed_location)),
        transport: Arc::new(transport),
        telephony: Arc::new(LogTelephony),
        permissions: Arc::new(StaticPermissionGate::new(config.grant)),
        alerts: Arc::clone(&alerts),
    };
    let sequencer = Arc::new(ActionSequencer::new(
        collaborators,
        config.tuning.location_timeout(),
    ));

    let engine = TriggerEngine::new(&config.tuning).with_initial_volume(config.initial_volume);
    let dispatcher = Dispatcher::spawn(engine, contacts, sequencer, alerts, config.queue_capacity);

    let app = api::router(api::AppState::new(dispatcher, store));

    info!("listening on http://{}", config.listen);
    axum::serve(tokio::net::TcpListener::bind(config.listen).await?, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let _ = signal::ctrl_c().await;
    info!("shutdown requested");
}
