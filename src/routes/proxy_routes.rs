//! Forwarding of API calls to the backend.

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::extract::{Request, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::Response;
use tracing::{debug, warn};

use crate::state::ProxyState;
use crate::utils::http_helpers::HTTPError;

/// Largest request body forwarded upstream.
const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

/// Headers that describe a single connection and are never forwarded.
const HOP_BY_HOP: [header::HeaderName; 8] = [
    header::CONNECTION,
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
    header::CONTENT_LENGTH,
];

/// Registers the catch-all forwarding handler.
pub fn routes() -> Router<ProxyState> {
    Router::new().fallback(forward)
}

/// Forwards an API call to `proxy.target`, rewriting its path to the
/// versioned prefix. Anything outside the API prefix is a 404.
async fn forward(
    State(state): State<ProxyState>,
    request: Request,
) -> Result<Response, HTTPError> {
    let (parts, body) = request.into_parts();
    let path = parts.uri.path();

    if !state.prefixes.is_api_path(path) {
        return Err(HTTPError::new(
            StatusCode::NOT_FOUND,
            format!("no proxy route for '{}'", path),
        ));
    }

    let rewritten = state.prefixes.rewrite(path);
    let mut url = format!(
        "{}{}",
        state.config.proxy.target.trim_end_matches('/'),
        rewritten
    );
    if let Some(query) = parts.uri.query() {
        url.push('?');
        url.push_str(query);
    }

    let declared = parts
        .headers
        .get(header::CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<usize>().ok());
    if declared.is_some_and(|size| size > MAX_BODY_BYTES) {
        return Err(too_large());
    }
    // Past the declared-length check, buffering only fails on the size limit.
    let body = to_bytes(body, MAX_BODY_BYTES).await.map_err(|e| {
        debug!("Could not buffer request body for {}: {}", path, e);
        too_large()
    })?;

    let mut headers = strip_hop_by_hop(parts.headers);
    if state.config.proxy.change_origin {
        // The client fills in the target's host when none is given.
        headers.remove(header::HOST);
    }

    debug!("Proxying {} {} -> {}", parts.method, path, url);

    let upstream = state
        .client
        .request(parts.method.clone(), &url)
        .headers(headers)
        .body(body)
        .send()
        .await
        .map_err(|e| upstream_failure(&state, &url, e))?;

    let status = upstream.status();
    let headers = strip_hop_by_hop(upstream.headers().clone());
    let bytes = upstream
        .bytes()
        .await
        .map_err(|e| upstream_failure(&state, &url, e))?;

    let mut response = Response::new(Body::from(bytes));
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    Ok(response)
}

fn too_large() -> HTTPError {
    HTTPError::new(
        StatusCode::PAYLOAD_TOO_LARGE,
        format!("request body exceeds {} bytes", MAX_BODY_BYTES),
    )
}

fn strip_hop_by_hop(mut headers: HeaderMap) -> HeaderMap {
    for name in HOP_BY_HOP.iter() {
        headers.remove(name);
    }
    headers.remove("keep-alive");
    headers
}

fn upstream_failure(state: &ProxyState, url: &str, error: reqwest::Error) -> HTTPError {
    if let Some(suppressed) = state
        .upstream_failures
        .should_emit(&state.config.proxy.target)
    {
        warn!(
            event_name = "proxy.upstream.failed",
            event_domain = "proxy",
            target = state.config.proxy.target.as_str(),
            suppressed_count = suppressed,
            error = %error,
            "upstream request to {} failed",
            url
        );
    }
    HTTPError::new(StatusCode::BAD_GATEWAY, "upstream unavailable")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigV1, ProxyConfig};
    use crate::state::ProxyState;
    use axum::http::{HeaderValue, Request};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn proxy() -> Router {
        let config = ConfigV1 {
            proxy: ProxyConfig {
                target: "http://127.0.0.1:9".to_string(),
                ..ProxyConfig::default()
            },
            ..ConfigV1::default()
        };
        routes().with_state(ProxyState::new(Arc::new(config)))
    }

    #[tokio::test]
    async fn declared_oversized_body_is_rejected() {
        let request = Request::builder()
            .method("POST")
            .uri("/api/devices")
            .header(header::CONTENT_LENGTH, (MAX_BODY_BYTES + 1).to_string())
            .body(Body::from("{}"))
            .unwrap();

        let response = proxy().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn oversized_body_without_length_is_rejected() {
        let request = Request::builder()
            .method("POST")
            .uri("/api/devices")
            .body(Body::from(vec![0u8; MAX_BODY_BYTES + 1]))
            .unwrap();

        let response = proxy().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[test]
    fn hop_by_hop_headers_are_dropped() {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));
        headers.insert("keep-alive", HeaderValue::from_static("timeout=5"));
        headers.insert(header::TRANSFER_ENCODING, HeaderValue::from_static("chunked"));
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer t"));
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));

        let kept = strip_hop_by_hop(headers);

        assert_eq!(kept.len(), 2);
        assert!(kept.contains_key(header::AUTHORIZATION));
        assert!(kept.contains_key(header::ACCEPT));
    }
}
