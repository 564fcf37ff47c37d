//! HTTP route definitions of the development proxy.
//!
//! Every path is handed to the forwarding handler; it decides what belongs
//! to the backend.

mod proxy_routes;

use crate::state::ProxyState;
use axum::Router;

/// Creates the proxy router and attaches the shared state.
pub fn create_router(state: ProxyState) -> Router {
    Router::new()
        .merge(proxy_routes::routes())
        .with_state(state)
}
