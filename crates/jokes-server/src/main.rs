mod config;

use std::sync::Arc;

use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

use jokes_api::auth::{AppState, AppStateInner};
use jokes_api::routes;
use jokes_api::session::SessionStore;
use jokes_db::Database;

use crate::config::Config;

const DEMO_PASSWORD: &str = "twixrox";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "jokes=debug,tower_http=debug".into()),
        )
        .init();

    let config = Config::from_env()?;

    // One store handle for the whole process
    let db = Database::shared(&config.db_path)?;

    if config.seed {
        let hash = jokes_crypto::password::hash_password(DEMO_PASSWORD)?;
        if jokes_db::seed::seed_demo_data(&db, &hash)? {
            info!(
                "Demo login: {} / {}",
                jokes_db::seed::DEMO_USERNAME,
                DEMO_PASSWORD
            );
        }
    }

    if !config.secure_cookies {
        info!("Session cookies are not marked Secure (plain HTTP development mode)");
    }

    let state: AppState = Arc::new(AppStateInner {
        db,
        sessions: SessionStore::new(&config.session_secret, config.secure_cookies),
    });

    let app = routes::router(state)
        .nest_service("/static", ServeDir::new(&config.public_dir))
        .layer(TraceLayer::new_for_http());

    info!("Jokes server listening on {}", config.addr);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        let mut sigterm =
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(signal) => signal,
                Err(e) => {
                    tracing::warn!("Failed to install SIGTERM handler: {}", e);
                    ctrl_c.await.ok();
                    info!("Received Ctrl+C, shutting down...");
                    return;
                }
            };
        tokio::select! {
            _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
            _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("Received Ctrl+C, shutting down...");
    }
}
