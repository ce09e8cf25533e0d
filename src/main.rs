use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{info, warn};

use spotify_stats::auth::OAuthFlow;
use spotify_stats::spotify::SpotifyClient;
use spotify_stats::store::SqliteCredentialStore;
use spotify_stats::{api, providers, shell, AppState, Config, SharedState};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "spotify_stats=info,tower_http=info".into()),
        )
        .init();

    let config = Config::from_env()?;
    info!(
        "spotify-stats v{} ({} dashboard)",
        env!("CARGO_PKG_VERSION"),
        config.dashboard_mode
    );

    if !config.has_client_credentials() {
        warn!("SPOTIFY_CLIENT_ID / SPOTIFY_CLIENT_SECRET not set; login will fail");
    }
    if config.uses_dev_session_secret() {
        warn!("SESSION_SECRET not set; using the development default");
    }

    let store = SqliteCredentialStore::connect(&config.database_url)
        .await
        .with_context(|| format!("opening credential store {}", config.database_url))?;
    store.migrate().await.context("creating users table")?;
    info!("Credential store ready ✓");

    let provider = providers::spotify_from_config(&config);
    let flow = OAuthFlow::new(&config, Box::new(provider), Arc::new(store));
    let client = SpotifyClient::from_config(&config);
    let state: SharedState = Arc::new(AppState::new(config.clone(), flow, Box::new(client)));

    let app = api::router(state);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    let url = config.local_url();
    info!("Server ready on {url} ✓");

    let server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
    });

    // The window is the user's browser, so closing it does not stop the
    // server; the process ends on Ctrl-C or a server error.
    if config.open_window {
        tokio::spawn(shell::open_after(config.startup_delay, url));
    } else {
        info!("OPEN_WINDOW=false; running headless");
    }

    server
        .await
        .context("server task panicked")?
        .context("server error")?;

    info!("Shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl-C: {e}");
        std::future::pending::<()>().await;
    }
    info!("Ctrl-C received, shutting down");
}
