//! chatline-server – entry point.
//!
//! Startup order:
//! 1. Load `.env` (if present) and parse configuration; a missing
//!    `OPENAI_API_KEY` aborts startup.
//! 2. Initialise structured tracing (JSON or pretty).
//! 3. Open the SQLite database and run pending migrations.
//! 4. Build the provider clients and the reply resolver.
//! 5. Build the Axum router and start the HTTP server with graceful shutdown.

mod config;
mod entities;
mod error;
mod fetcher;
mod middleware;
mod routes;
mod schemas;
mod state;
#[cfg(test)]
mod testing;

use std::net::SocketAddr;
use std::sync::Arc;

use chatline_core::provider::{self, DisabledImageSearch, GoogleImageSearch, OpenAiClient};
use chatline_core::{ImageSearch, ReplyResolver};
use tracing::{info, warn};

use crate::config::Config;
use crate::entities::SqliteStore;
use crate::fetcher::ImageFetcher;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Configuration ───────────────────────────────────────────────────────
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("WARN: failed to load .env file: {e}");
        }
    }
    let cfg = Config::from_env()?;

    // ── 2. Tracing ─────────────────────────────────────────────────────────────
    let env_filter = match tracing_subscriber::EnvFilter::try_from_default_env() {
        Ok(f) => f,
        Err(_) => match cfg.log_level.parse::<tracing_subscriber::EnvFilter>() {
            Ok(f) => f,
            Err(e) => {
                eprintln!(
                    "WARN: CHATLINE_LOG='{}' is not a valid tracing filter ({}); \
                     falling back to 'info'",
                    cfg.log_level, e
                );
                tracing_subscriber::EnvFilter::new("info")
            }
        },
    };

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_thread_ids(true);

    if cfg.log_json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    info!(version = env!("CARGO_PKG_VERSION"), "chatline-server starting");

    // ── 3. Database ────────────────────────────────────────────────────────────
    let store = SqliteStore::connect(&cfg.database_url).await?;
    info!(database_url = %cfg.database_url, "database ready");

    // ── 4. Providers ───────────────────────────────────────────────────────────
    let http = provider::http_client(cfg.upstream_timeout)?;
    let openai = Arc::new(OpenAiClient::new(http.clone(), cfg.openai.clone()));
    let search: Arc<dyn ImageSearch> = match cfg.search.clone() {
        Some(settings) => Arc::new(GoogleImageSearch::new(http.clone(), settings)),
        None => {
            warn!("image search not configured; failed generations will not fall back");
            Arc::new(DisabledImageSearch)
        }
    };
    let resolver = ReplyResolver::new(cfg.resolver_config(), openai.clone(), openai, search);
    info!(
        chat_model = %cfg.openai.chat_model,
        image_model = %cfg.openai.image_model,
        "providers initialised"
    );

    // ── 5. Shared application state ────────────────────────────────────────────
    let state = Arc::new(AppState {
        config: Arc::new(cfg.clone()),
        store: Arc::new(store),
        resolver,
        fetcher: ImageFetcher::new(http),
    });

    // ── 6. HTTP server with graceful shutdown ──────────────────────────────────
    let app = routes::build(Arc::clone(&state));
    let addr: SocketAddr = cfg.bind_address.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "HTTP server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    state.store.close().await;
    info!("chatline-server stopped");
    Ok(())
}

/// Returns a future that resolves when SIGINT (Ctrl-C) or SIGTERM is received.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to install CTRL+C signal handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
            }
            Err(e) => warn!(error = %e, "failed to install SIGTERM handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c    => {}
        _ = terminate => {}
    }

    info!("shutdown signal received; starting graceful shutdown");
}
