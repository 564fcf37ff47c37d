use std::sync::Arc;

use http::StatusCode;
use tracing::debug;

use super::{ApiPrefixes, ApiVersioning, BearerAuth, UnauthorizedHandler};
use crate::client::{ApiResponse, OutboundRequest};
use crate::config::ApiConfig;
use crate::navigation::Navigator;
use crate::session::Session;

/// A stage that may rewrite every request before it is transmitted.
pub trait OutboundInterceptor: Send + Sync {
    fn get_name(&self) -> &str;
    fn apply(&self, request: &mut OutboundRequest);
}

/// A stage that reacts to failure responses carrying one specific status.
pub trait InboundInterceptor: Send + Sync {
    fn get_name(&self) -> &str;
    /// The status this handler is keyed on.
    fn status(&self) -> StatusCode;
    fn on_failure(&self, request: &OutboundRequest, response: &ApiResponse);
}

/// The ordered outbound transforms and inbound handlers applied to every call.
#[derive(Default)]
pub struct Pipeline {
    outbound: Vec<Box<dyn OutboundInterceptor>>,
    inbound: Vec<Box<dyn InboundInterceptor>>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// The console's pipeline: bearer injection, then path versioning on the
    /// way out; session invalidation on 401 on the way back.
    pub fn standard(session: Arc<Session>, navigator: Arc<dyn Navigator>, api: &ApiConfig) -> Self {
        let prefixes = ApiPrefixes::new(&api.unversioned_prefix, &api.versioned_prefix);
        Pipeline::new()
            .with_outbound(BearerAuth::new(session.clone()))
            .with_outbound(ApiVersioning::new(prefixes.clone()))
            .with_inbound(UnauthorizedHandler::new(
                session,
                navigator,
                &api.login_path(),
                prefixes,
            ))
    }

    pub fn with_outbound(mut self, interceptor: impl OutboundInterceptor + 'static) -> Self {
        self.outbound.push(Box::new(interceptor));
        self
    }

    pub fn with_inbound(mut self, interceptor: impl InboundInterceptor + 'static) -> Self {
        self.inbound.push(Box::new(interceptor));
        self
    }

    /// Run every outbound stage once, in insertion order.
    pub fn apply_outbound(&self, request: &mut OutboundRequest) {
        for interceptor in &self.outbound {
            interceptor.apply(request);
        }
    }

    /// Run the inbound handlers keyed on the response's status.
    /// Successful responses are never passed here.
    pub fn apply_inbound(&self, request: &OutboundRequest, response: &ApiResponse) {
        for handler in self
            .inbound
            .iter()
            .filter(|handler| handler.status() == response.status)
        {
            debug!(
                "Inbound handler '{}' handling {} for {}",
                handler.get_name(),
                response.status,
                request.route_path()
            );
            handler.on_failure(request, response);
        }
    }
}
