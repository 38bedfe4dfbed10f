//! Organization invitation reconciliation service.
//!
//! Reads purchase rows from a Feishu spreadsheet, invites the purchasers
//! into a GitHub organization, and records every attempt in a durable
//! Postgres ledger. Batches run on a fixed schedule and on demand via
//! `POST /invite`.

mod config;
mod logging;
mod scheduler;

use axum::{routing::get, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tracing::info;

use config::Config;
use orgbot_api::{invite_router, InviteState, PgLedger, ReconcileEngine};
use orgbot_github::GithubClient;
use orgbot_sheets::SheetsClient;

#[tokio::main]
async fn main() {
    // Load configuration (fail-fast on missing required values)
    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    logging::init_logging(&config.rust_log);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        host = %config.host,
        port = config.port,
        org = %config.github_org,
        "starting orgbot"
    );

    // Database pool and migrations
    let pool = match orgbot_db::connect(&config.database_url).await {
        Ok(pool) => {
            info!("database connection established");
            pool
        }
        Err(e) => {
            eprintln!("Failed to connect to database: {e}");
            std::process::exit(1);
        }
    };
    if let Err(e) = orgbot_db::run_migrations(&pool).await {
        eprintln!("Failed to run migrations: {e}");
        std::process::exit(1);
    }

    // External clients
    let github = match GithubClient::new(
        config.github_org.clone(),
        config.github_token.clone(),
        config.github_api_url.clone(),
    ) {
        Ok(c) => Arc::new(c),
        Err(e) => {
            eprintln!("Failed to create GitHub client: {e}");
            std::process::exit(1);
        }
    };
    let sheets = match SheetsClient::new(
        config.feishu_app_id.clone(),
        config.feishu_app_secret.clone(),
        config.feishu_spreadsheet_token.clone(),
        config.feishu_base_url.clone(),
    ) {
        Ok(c) => Arc::new(c),
        Err(e) => {
            eprintln!("Failed to create Feishu sheets client: {e}");
            std::process::exit(1);
        }
    };

    // Reconciliation engine wiring: the GitHub client acts as both the
    // membership oracle and the invitation sender.
    let ledger = Arc::new(PgLedger::new(pool.clone()));
    let engine = Arc::new(ReconcileEngine::new(
        ledger.clone(),
        github.clone(),
        Some(github.clone()),
    ));
    let state = InviteState::new(ledger, sheets.clone(), engine.clone());

    // Scheduled batch runs over the default range
    tokio::spawn(scheduler::run_scheduler(
        engine,
        sheets,
        config.sheet_range_start.clone(),
        config.sheet_range_end.clone(),
        config.schedule_times.clone(),
    ));

    let app = Router::new()
        .route("/healthz", get(|| async { "ok" }))
        .merge(invite_router(state));

    let addr: SocketAddr = match config.bind_addr().parse() {
        Ok(a) => a,
        Err(e) => {
            tracing::error!("Invalid bind address '{}': {e}", config.bind_addr());
            std::process::exit(1);
        }
    };

    info!(%addr, "server listening");

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!("Failed to bind to address {addr}: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!("Server error: {e}");
        std::process::exit(1);
    }

    info!("server shutdown complete");
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => {}
            Err(e) => {
                tracing::error!("Failed to install Ctrl+C handler: {e}");
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            info!("received SIGTERM, initiating graceful shutdown");
        }
    }
}
