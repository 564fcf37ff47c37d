use async_trait::async_trait;
use tracing::debug;

use super::request::{OutboundRequest, RequestBody};
use super::response::ApiResponse;
use crate::error::ApiError;

/// Moves an already intercepted request over the wire.
///
/// Implementations report every received response as `Ok`, whatever its
/// status; `Err` is reserved for requests that got no response at all.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &OutboundRequest) -> Result<ApiResponse, ApiError>;
}

/// The reqwest-backed transport used against a real backend.
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        HttpTransport { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url_for(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &OutboundRequest) -> Result<ApiResponse, ApiError> {
        let url = self.url_for(&request.path);
        debug!("Sending {} request to: {}", request.method, url);

        let mut builder = self
            .client
            .request(request.method.clone(), &url)
            .headers(request.headers.clone());
        builder = match &request.body {
            RequestBody::Empty => builder,
            RequestBody::Form(fields) => builder.form(fields),
            RequestBody::Json(value) => builder.json(value),
        };

        let response = builder
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Transport(format!("Error reading response body: {}", e)))?;

        Ok(ApiResponse {
            status,
            headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;
    use mockito::{Matcher, Server};

    /// Test that a form body reaches the server url-encoded and the status is reported as-is.
    #[tokio::test]
    async fn sends_form_and_reports_non_success_status() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("POST", "/api/v1/auth/login")
            .match_header("content-type", "application/x-www-form-urlencoded")
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("username".into(), "admin".into()),
                Matcher::UrlEncoded("password".into(), "wrong".into()),
            ]))
            .with_status(401)
            .with_body(r#"{"detail": "Incorrect username or password"}"#)
            .create_async()
            .await;

        let transport = HttpTransport::new(format!("{}/", server.url()));
        let request = OutboundRequest::post("/api/v1/auth/login")
            .with_form([("username", "admin"), ("password", "wrong")]);
        let response = transport.send(&request).await.expect("response expected");

        m.assert_async().await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
        assert!(response.body.contains("Incorrect username"));
    }

    /// Test that an unreachable server is a transport error, not a status error.
    #[tokio::test]
    async fn unreachable_server_is_transport_error() {
        let transport = HttpTransport::new("http://127.0.0.1:1");
        let result = transport.send(&OutboundRequest::get("/api/v1/auth/me")).await;
        match result {
            Err(ApiError::Transport(message)) => {
                assert!(message.starts_with("error sending request"));
                assert!(!message.contains("Error sending request:"));
            }
            other => panic!("expected a transport error, got {:?}", other),
        }
    }
}
