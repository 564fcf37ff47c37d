use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::request::OutboundRequest;
use super::response::{ApiResponse, extract_detail};
use super::transport::Transport;
use crate::error::ApiError;
use crate::interceptors::Pipeline;

/// The client every API call goes through.
///
/// Outbound interceptors run exactly once per call, inbound handlers run
/// exactly once per failure response, and nothing is retried.
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    pipeline: Arc<Pipeline>,
}

impl ApiClient {
    pub fn new(transport: Arc<dyn Transport>, pipeline: Pipeline) -> Self {
        ApiClient {
            transport,
            pipeline: Arc::new(pipeline),
        }
    }

    /// Send a request, returning the response on 2xx and `ApiError::Status`
    /// for any other status.
    pub async fn send(&self, mut request: OutboundRequest) -> Result<ApiResponse, ApiError> {
        self.pipeline.apply_outbound(&mut request);

        let response = self.transport.send(&request).await?;
        if response.status.is_success() {
            return Ok(response);
        }

        debug!(
            "{} {} failed with status {}",
            request.method,
            request.route_path(),
            response.status
        );
        self.pipeline.apply_inbound(&request, &response);
        Err(ApiError::Status {
            status: response.status,
            detail: extract_detail(&response.body),
        })
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send(OutboundRequest::get(path)).await?.json()
    }

    pub async fn post_form<T: DeserializeOwned>(
        &self,
        path: &str,
        fields: &[(&str, &str)],
    ) -> Result<T, ApiError> {
        let request = OutboundRequest::post(path).with_form(fields.iter().copied());
        self.send(request).await?.json()
    }

    pub async fn post_json<T, B>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let body = serde_json::to_value(body).map_err(|e| ApiError::InvalidRequest(e.to_string()))?;
        self.send(OutboundRequest::post(path).with_json(body))
            .await?
            .json()
    }

    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.send(OutboundRequest::delete(path)).await.map(|_| ())
    }
}
