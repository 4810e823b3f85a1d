// In app/src/main.rs

use anyhow::Result;
use clap::{Parser, Subcommand};
use core_types::{Asset, SignalType, Timeframe};
use engine::Engine;
use events::DashboardEvent;
use signals::{Selection, SignalCriteria};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::broadcast;
use tracing_subscriber::filter::Targets;
use tracing_subscriber::prelude::*;
use web_server::{AppState, WS_CACHE_SIZE, WsCache};

use self::tracing_layer::WsBroadcastLayer;
mod tracing_layer;

// --- Command-Line Interface Definition ---

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = "A trading-signal dashboard backend.")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Runs the refresh loops and serves the dashboard API.
    Serve,

    /// Runs the refresh loops and logs every dashboard update, without a server.
    Watch {
        /// Stop after this many seconds instead of waiting for Ctrl-C.
        #[arg(long)]
        duration_secs: Option<u64>,
    },

    /// Prints the signal list once, filtered like the signals page.
    Signals {
        /// Asset symbol (e.g., "EURUSD") or "all".
        #[arg(short, long, default_value = "all")]
        asset: Selection<Asset>,

        /// Timeframe (e.g., "15m", "1h") or "all".
        #[arg(short, long, default_value = "all")]
        timeframe: Selection<Timeframe>,

        /// "buy", "sell" or "all".
        #[arg(long = "type", default_value = "all")]
        signal_type: Selection<SignalType>,

        /// Only signals at or above this confidence.
        #[arg(long, default_value_t = 0.0)]
        min_confidence: f64,

        /// Extra refreshes to run before printing, each adding one signal.
        #[arg(long, default_value_t = 0)]
        refreshes: u32,
    },
}

// --- Main Application Entry Point ---

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from a .env file, if it exists.
    dotenvy::dotenv().ok();

    let settings = app_config::load_settings()?;

    // --- WebSocket and Tracing Setup ---
    let (ws_tx, _) = broadcast::channel::<DashboardEvent>(1024);
    let level = settings
        .app
        .log_level
        .parse::<tracing::Level>()
        .unwrap_or(tracing::Level::INFO);
    let ws_layer = WsBroadcastLayer::new(ws_tx.clone()).with_filter(
        Targets::new()
            .with_target("tower_http", tracing::Level::WARN)
            .with_default(tracing::Level::INFO),
    );
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_filter(Targets::new().with_default(level));
    tracing_subscriber::registry().with(fmt_layer).with(ws_layer).init();

    let cli = Cli::parse();

    tracing::info!(environment = %settings.app.environment, "Starting signal-desk");

    match cli.command {
        Commands::Serve => {
            run_server(settings, ws_tx).await?;
        }
        Commands::Watch { duration_secs } => {
            handle_watch(settings, ws_tx, duration_secs.map(Duration::from_secs)).await?;
        }
        Commands::Signals {
            asset,
            timeframe,
            signal_type,
            min_confidence,
            refreshes,
        } => {
            let criteria = SignalCriteria {
                asset,
                timeframe,
                signal_type,
                min_confidence,
            };
            handle_signals(settings, ws_tx, criteria, refreshes).await?;
        }
    }

    tracing::info!("signal-desk has finished successfully.");

    Ok(())
}

// --- "Serve" Subcommand Logic ---

/// Starts every page's refresh loop and the web server, and runs until
/// Ctrl-C or until the server stops.
async fn run_server(settings: app_config::Settings, ws_tx: broadcast::Sender<DashboardEvent>) -> Result<()> {
    let ws_cache: WsCache = Arc::new(Mutex::new(VecDeque::with_capacity(WS_CACHE_SIZE)));
    let recorder = web_server::record_events(&ws_tx, ws_cache.clone());

    let engine = Engine::from_settings(&settings, ws_tx.clone())?;
    tracing::info!(source = engine.source_name(), "Data source ready.");
    engine.check_source().await;

    let app_state = AppState::new(engine.views(), ws_tx, ws_cache);
    let notifier = web_server::spawn_notifier(&app_state.ws_tx, app_state.forms.notifications.clone());
    let engine_handle = engine.start();

    let server_handle = tokio::spawn(web_server::run(settings.server, app_state));

    let outcome = tokio::select! {
        server_result = server_handle => {
            tracing::error!(?server_result, "Web server task has terminated unexpectedly.");
            Err(anyhow::anyhow!("The web server terminated. Shutting down."))
        }
        signal = tokio::signal::ctrl_c() => {
            signal?;
            tracing::info!("Shutdown requested.");
            Ok(())
        }
    };

    engine_handle.shutdown().await;
    notifier.abort();
    recorder.abort();
    outcome
}

// --- "Watch" Subcommand Logic ---

async fn handle_watch(
    settings: app_config::Settings,
    ws_tx: broadcast::Sender<DashboardEvent>,
    duration: Option<Duration>,
) -> Result<()> {
    let mut rx = ws_tx.subscribe();
    let engine = Engine::from_settings(&settings, ws_tx)?;
    engine.check_source().await;
    let engine_handle = engine.start();

    let watch = async {
        loop {
            match rx.recv().await {
                Ok(DashboardEvent::Log(_)) => {}
                Ok(event) => log_event(&event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Watcher fell behind; updates skipped.");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    };

    let stop = async {
        match duration {
            Some(duration) => tokio::time::sleep(duration).await,
            None => {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    tracing::error!(error = %e, "Could not listen for Ctrl-C.");
                }
            }
        }
    };

    tokio::select! {
        _ = watch => {}
        _ = stop => tracing::info!("Stopping watch."),
    }

    engine_handle.shutdown().await;
    Ok(())
}

fn log_event(event: &DashboardEvent) {
    match event {
        DashboardEvent::DashboardUpdated(snapshot) => tracing::info!(
            active = snapshot.signals.active,
            buy = snapshot.signals.buy,
            sell = snapshot.signals.sell,
            success_rate = snapshot.stats.success_rate,
            "Dashboard updated."
        ),
        DashboardEvent::SignalAdded(added) => tracing::info!(
            id = added.signal.id,
            asset = %added.signal.asset,
            timeframe = %added.signal.timeframe,
            signal_type = %added.signal.signal_type,
            confidence = added.signal.confidence,
            dropped = added.dropped,
            "Signal added."
        ),
        DashboardEvent::AnalysisUpdated(snapshot) => tracing::info!(
            asset = %snapshot.asset,
            timeframe = %snapshot.timeframe,
            confidence = snapshot.confirmations.confidence,
            "Analysis updated."
        ),
        DashboardEvent::CollectionUpdated(overview) => tracing::info!(
            websocket = overview.status.websocket.active,
            apis = overview.status.apis.active,
            simulator = overview.status.simulator.active,
            "Collection status updated."
        ),
        DashboardEvent::Notification(notification) => tracing::info!(
            kind = ?notification.kind,
            id = notification.signal.id,
            asset = %notification.signal.asset,
            channels = ?notification.channels,
            "Notification issued."
        ),
        DashboardEvent::Log(_) => {}
    }
}

// --- "Signals" Subcommand Logic ---

async fn handle_signals(
    settings: app_config::Settings,
    ws_tx: broadcast::Sender<DashboardEvent>,
    criteria: SignalCriteria,
    refreshes: u32,
) -> Result<()> {
    let engine = Engine::from_settings(&settings, ws_tx)?;
    let signals_view = engine.views().signals;

    // The first refresh seeds the list.
    for _ in 0..=refreshes {
        signals_view.refresh().await;
    }

    let total = signals_view.all().await.len();
    let matching = signals_view.matching(&criteria).await;

    println!("{:>5}  {:<7} {:<4} {:<4} {:>6} {:>5}  {:<9}", "ID", "ASSET", "TF", "TYPE", "CONF", "CHECK", "STATUS");
    for signal in &matching {
        println!(
            "{:>5}  {:<7} {:<4} {:<4} {:>5.1}% {:>5}  {:<9}",
            signal.id,
            signal.asset.to_string(),
            signal.timeframe.to_string(),
            signal.signal_type.to_string(),
            signal.confidence,
            signal.confirmations,
            format!("{:?}", signal.status).to_lowercase(),
        );
    }
    println!("{} of {} signals match.", matching.len(), total);

    Ok(())
}
