#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request};
use sessiongate::client::HttpTransport;
use sessiongate::config::{ApiConfig, ConfigV1, ProxyConfig};
use sessiongate::console::Console;
use sessiongate::routes::create_router;
use sessiongate::state::ProxyState;
use sessiongate::storage::{MemoryStorage, Storage};
use serde_json::{Value, json};

pub const LOGIN_PATH: &str = "/api/v1/auth/login";
pub const PROFILE_PATH: &str = "/api/v1/auth/me";

pub fn api_config(base_url: &str) -> ApiConfig {
    ApiConfig {
        base_url: base_url.to_string(),
        ..ApiConfig::default()
    }
}

/// A console talking to `base_url`, backed by `storage`.
pub fn console_with_storage(base_url: &str, storage: Arc<MemoryStorage>) -> Console {
    Console::with_parts(
        &api_config(base_url),
        storage,
        Arc::new(HttpTransport::new(base_url)),
    )
}

pub fn console(base_url: &str) -> Console {
    console_with_storage(base_url, Arc::new(MemoryStorage::new()))
}

/// Storage already holding a token, as left behind by an earlier run.
pub fn storage_with_token(token: &str) -> Arc<MemoryStorage> {
    let storage = Arc::new(MemoryStorage::new());
    storage
        .set_item("token", token)
        .expect("memory storage accepts writes");
    storage
}

pub fn user_json(username: &str, is_admin: bool) -> Value {
    json!({
        "id": 1,
        "username": username,
        "email": format!("{}@example.com", username),
        "is_active": true,
        "is_admin": is_admin,
        "created_at": "2024-01-01T00:00:00Z",
        "updated_at": null
    })
}

pub fn login_body(token: &str, username: &str, is_admin: bool) -> String {
    json!({
        "access_token": token,
        "token_type": "bearer",
        "user": user_json(username, is_admin)
    })
    .to_string()
}

pub fn build_proxy(target: &str, change_origin: bool) -> Router {
    let config = ConfigV1 {
        proxy: ProxyConfig {
            target: target.to_string(),
            change_origin,
            ..ProxyConfig::default()
        },
        ..ConfigV1::default()
    };
    create_router(ProxyState::new(Arc::new(config)))
}

pub fn request(method: Method, path: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(path)
        .body(Body::empty())
        .expect("failed to build request")
}
