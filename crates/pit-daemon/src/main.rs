//! pit-daemon entry point.
//!
//! Thin on purpose: sets up tracing, loads config, connects the pool, wires
//! middleware and starts the HTTP server. Handlers live in `routes.rs`.

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::http::{HeaderValue, Method};
use pit_config::{ConfigMode, ServiceConfig, UnusedKeyPolicy};
use pit_daemon::{routes, state};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::{info, warn, Level};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Dev convenience; production injects env vars directly.
    let _ = dotenvy::from_filename(".env.local");

    init_tracing();

    let loaded = pit_config::load_from_env().context("load config")?;
    let unused = pit_config::report_unused_keys(
        ConfigMode::Daemon,
        &loaded.config_json,
        UnusedKeyPolicy::Warn,
    )?;
    if !unused.is_clean() {
        warn!(keys = ?unused.unused_leaf_pointers, "unused config keys");
    }
    let cfg = ServiceConfig::from_json(&loaded.config_json)?;
    info!(config_hash = %loaded.config_hash, "config loaded");

    let pool = pit_db::connect(&cfg.database_url()?, cfg.db.max_connections).await?;
    if cfg.db.migrate_on_boot {
        pit_db::migrate(&pool).await?;
        info!("migrations applied");
    }

    let shared = Arc::new(state::AppState::new(pool, cfg.clock()?));

    let app = routes::build_router(Arc::clone(&shared))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors(&cfg.cors.allowed_origins));

    let addr = match bind_addr_from_env() {
        Some(a) => a,
        None => cfg
            .server
            .addr
            .parse::<SocketAddr>()
            .with_context(|| format!("invalid /server/addr {:?}", cfg.server.addr))?,
    };
    info!("pit-daemon listening on http://{}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server crashed")?;

    Ok(())
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();
}

fn bind_addr_from_env() -> Option<SocketAddr> {
    std::env::var("PIT_DAEMON_ADDR").ok()?.parse().ok()
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutdown requested");
    }
}

/// CORS: only the configured origins.
fn cors(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|o| HeaderValue::from_str(o).ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(tower_http::cors::Any)
}
