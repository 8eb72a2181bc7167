mod actor_framework;
mod app_system;
mod auth;
mod clients;
mod config;
mod domain;
mod http;
mod order_actor;
mod product_actor;
mod user_actor;

#[cfg(test)]
mod mock_framework;

use std::sync::Arc;

use tokio::{net::TcpListener, signal};
use tracing::{error, info};

use crate::app_system::{setup_tracing, StoreSystem, SystemError};
use crate::config::Config;
use crate::http::AppState;

#[tokio::main]
async fn main() -> Result<(), SystemError> {
    // Setup tracing once for the entire application
    setup_tracing();

    let config = Arc::new(Config::from_env()?);
    info!(port = config.port, production = config.production, "Starting storefront");

    // Start the collection actors and seed the admin account
    let system = StoreSystem::new(&config)?;
    system.seed(&config).await?;

    let app = http::router(AppState::new(&system, config.clone()));

    let address = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&address).await?;
    info!("Server running on {address}");

    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;

    // The router and its client clones are gone; stop the actors
    system.shutdown().await?;

    info!("Application stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                error!(error = %e, "Failed to install Ctrl+C handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!(error = %e, "Failed to install signal handler");
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
