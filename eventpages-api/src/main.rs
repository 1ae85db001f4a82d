//! # Eventpages API Server
//!
//! Serves management and public endpoints for event content pages.
//!
//! ## Startup
//!
//! 1. Load configuration from the environment
//! 2. Initialize tracing (text or JSON)
//! 3. Connect the database pool and run migrations
//! 4. Serve until SIGINT / SIGTERM
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p eventpages-api
//! ```

use eventpages_api::{
    app::{build_router, AppState},
    config::Config,
};
use eventpages_shared::{
    auth::authorization::MembershipAuthorizer,
    db::{
        migrations::run_migrations,
        pool::{close_pool, create_pool, DatabaseConfig},
    },
    pages::{postgres::PgPageStore, PageService},
};
use std::sync::Arc;
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    let registry = tracing_subscriber::registry().with(
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "eventpages_api=debug,eventpages_shared=debug,tower_http=debug".into()),
    );
    if config.log_json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!(
        "Eventpages API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let pool = create_pool(DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        ..DatabaseConfig::default()
    })
    .await?;

    run_migrations(&pool).await?;

    let pages = PageService::new(
        Arc::new(PgPageStore::new(pool.clone())),
        Arc::new(MembershipAuthorizer::new(pool.clone())),
    );

    let bind_address = config.bind_address();
    let app = build_router(AppState::new(pages, config));

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutdown signal received, closing resources...");
    close_pool(pool).await;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
