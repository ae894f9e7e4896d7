//! Lassi Corner Server
//!
//! Storefront backend for the Lassi Corner cafe. Placed orders are relayed
//! to the counter kiosk over a WebSocket.

mod api;
mod config;
mod server;
mod shutdown;
mod state;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use lassi_core::relay::OrderRelay;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{ConfigLoader, get_database_url};
use crate::state::AppState;

const DEFAULT_LOG_FILTER: &str = "info,sqlx=warn,tower_http=debug";
const DB_MAX_CONNECTIONS: u32 = 10;

/// Lassi Corner - food ordering backend with kiosk order relay
#[derive(Parser, Debug)]
#[command(name = "lassi-server", version, about)]
struct Args {
    /// TOML configuration file
    #[arg(short, long, default_value = "./lassi-config.toml")]
    config: PathBuf,

    /// Listen address, overriding `server.listen`
    #[arg(short, long)]
    listen: Option<SocketAddr>,

    /// Apply pending migrations before serving
    #[arg(long)]
    migrate: bool,

    /// Write logs as JSON lines instead of text
    #[arg(long, env = "LASSI_LOG_JSON")]
    log_json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.log_json);

    let outcome = run(args).await;
    if let Err(e) = &outcome {
        tracing::error!("lassi-server stopped: {e:#}");
    }
    outcome
}

async fn run(args: Args) -> anyhow::Result<()> {
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "lassi-server starting");

    let loader = Arc::new(ConfigLoader::new(&args.config, args.listen));
    let loaded = loader
        .load()
        .with_context(|| format!("loading {}", args.config.display()))?;
    let listen = loaded.server.listen;
    tracing::info!(path = %args.config.display(), "configuration loaded");

    let db = connect_database(args.migrate).await?;
    let relay = OrderRelay::new();
    let state = AppState::new(db.clone(), loaded.into_shared(), relay.clone());

    let reload_stop = shutdown::spawn_config_reload_handler(state.clone(), loader);
    let served = server::run_server(server::build_router(state), listen)
        .await
        .with_context(|| format!("serving on {listen}"));
    reload_stop.notify_one();

    report_undelivered(&relay);
    db.close().await;
    tracing::info!("lassi-server stopped");
    served
}

/// Open the Postgres pool from `DATABASE_URL`, optionally migrating first.
async fn connect_database(migrate: bool) -> anyhow::Result<PgPool> {
    let url = get_database_url()?;
    let pool = PgPoolOptions::new()
        .max_connections(DB_MAX_CONNECTIONS)
        .connect(&url)
        .await
        .context("connecting to the database")?;
    tracing::info!(max_connections = DB_MAX_CONNECTIONS, "database pool ready");

    if migrate {
        sqlx::migrate!("../migrations")
            .run(&pool)
            .await
            .context("running database migrations")?;
        tracing::info!("database migrations applied");
    }
    Ok(pool)
}

/// The relay buffer lives in memory; whatever is still queued at exit is lost.
fn report_undelivered(relay: &OrderRelay) {
    let pending = relay.status().pending_orders;
    if pending > 0 {
        tracing::warn!(pending, "orders never reached the kiosk and are dropped");
    }
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with((!json).then(|| tracing_subscriber::fmt::layer()))
        .with(json.then(|| tracing_subscriber::fmt::layer().json()))
        .init();
}
