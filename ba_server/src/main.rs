//! Betting administration HTTP server.
//!
//! Serves the JSON API over PostgreSQL, or over the in-memory store with
//! `--memory` for local runs.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Error};
use ba_server::{
    api::{AppState, create_router},
    config::ServerConfig,
    logging, metrics,
};
use betting_admin::db::{Database, MemoryStore, SharedStore};
use log::{info, warn};
use pico_args::Arguments;

const HELP: &str = "\
Run the betting administration API server

USAGE:
  ba_server [OPTIONS]

OPTIONS:
  --bind       IP:PORT     Server socket bind address  [default: env SERVER_BIND or 127.0.0.1:8080]
  --db-url     URL         Database connection string  [default: env DATABASE_URL]

FLAGS:
  --memory                 Use the in-memory store instead of PostgreSQL
  -h, --help               Print help information

ENVIRONMENT:
  SERVER_BIND              Server bind address (e.g., 0.0.0.0:8080)
  DATABASE_URL             PostgreSQL connection string
  JWT_SECRET               JWT signing secret (at least 32 characters)
  PASSWORD_PEPPER          Password hashing pepper (at least 16 characters)
  ADMIN_EMAIL              Bootstrap admin email (with ADMIN_PASSWORD)
  DEFAULT_REFERRER_ID      User credited for signups without a promo code
  METRICS_BIND             Prometheus exporter address
  RUST_LOG                 Log filter [default: info,sqlx=warn,hyper=warn]
";

struct Args {
    bind: Option<SocketAddr>,
    database_url: Option<String>,
    memory: bool,
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let args = Args {
        bind: pargs
            .opt_value_from_str("--bind")
            .context("Invalid --bind address")?,
        database_url: pargs
            .opt_value_from_str("--db-url")
            .context("Invalid --db-url")?,
        memory: pargs.contains("--memory"),
    };

    logging::init();

    let config = ServerConfig::from_env(args.bind, args.database_url)?;

    let store: SharedStore = if args.memory {
        warn!("Using the in-memory store; data is lost on exit");
        Arc::new(MemoryStore::new())
    } else {
        info!("Connecting to database");
        let db = Database::new(&config.database)
            .await
            .context("Failed to connect to database")?;
        db.migrate().await.context("Failed to apply migrations")?;
        info!("Database connected successfully");
        Arc::new(db.store())
    };

    let state = AppState::new(store, &config.security, config.default_referrer);

    if let Some(admin) = &config.bootstrap_admin {
        match state
            .auth_manager
            .ensure_admin(&admin.email, &admin.password)
            .await?
        {
            Some(user) => info!("Created bootstrap admin {} ({})", user.email, user.user_id),
            None => info!("Bootstrap admin {} already exists", admin.email),
        }
    }

    if let Some(addr) = config.metrics_bind {
        metrics::init_metrics(addr).map_err(anyhow::Error::msg)?;
        info!("Metrics exporter listening on {}", addr);
    }

    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind))?;
    info!("Betting admin API listening on http://{}", config.bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Could not listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
