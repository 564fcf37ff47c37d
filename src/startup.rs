//! Application startup and server initialization.
//!
//! Builds the development proxy from the configuration and serves it until
//! the process is stopped.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use crate::config::ConfigV1;
use crate::routes;
use crate::state::ProxyState;

/// Initializes and runs the development proxy.
///
/// Binds to `proxy.bind_address` and forwards API calls to `proxy.target`.
///
/// # Errors
///
/// Returns an error if the server fails to bind to the specified address
/// or encounters a runtime error during execution.
pub async fn run(config: Arc<ConfigV1>) -> Result<(), Box<dyn std::error::Error>> {
    info!(
        event_name = "proxy.starting",
        event_domain = "proxy",
        bind_address = config.proxy.bind_address.as_str(),
        target = config.proxy.target.as_str(),
        "Starting proxy on {}",
        config.proxy.bind_address
    );

    let state = ProxyState::new(config.clone());
    let app = routes::create_router(state);

    let listener = TcpListener::bind(&config.proxy.bind_address)
        .await
        .map_err(|e| format!("could not bind to {}: {}", config.proxy.bind_address, e))?;

    axum::serve(listener, app).await?;

    Ok(())
}
